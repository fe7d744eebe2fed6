// panel.rs - Ordered set of features compared in one run

use std::collections::HashSet;

use regex::Regex;
use tracing::info;

use crate::data::interval::Feature;

/// Ordered panel of genes or STR markers
#[derive(Debug, Clone, Default)]
pub struct Panel {
    features: Vec<Feature>,
}

/// Selection applied to a loaded panel
#[derive(Debug, Default)]
pub struct PanelFilter<'a> {
    pub include_names: Option<&'a Regex>,
    pub exclude_names: Option<&'a Regex>,
    pub chromosomes: Option<&'a HashSet<String>>,
}

impl Panel {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn marker_count(&self) -> usize {
        self.features.iter().filter(|f| f.is_marker()).count()
    }

    /// Total bases covered by the panel
    pub fn total_bases(&self) -> u64 {
        self.features.iter().map(|f| f.interval().len()).sum()
    }

    /// Keep only the features accepted by `filter`
    pub fn filtered(self, filter: &PanelFilter<'_>) -> Self {
        let before = self.features.len();
        let features: Vec<Feature> = self
            .features
            .into_iter()
            .filter(|feature| {
                if let Some(include) = filter.include_names {
                    if !include.is_match(feature.name()) {
                        return false;
                    }
                }
                if let Some(exclude) = filter.exclude_names {
                    if exclude.is_match(feature.name()) {
                        return false;
                    }
                }
                if let Some(chromosomes) = filter.chromosomes {
                    if !chromosomes.contains(feature.interval().chromosome()) {
                        return false;
                    }
                }
                true
            })
            .collect();

        if features.len() != before {
            info!("Panel filter kept {} of {} features", features.len(), before);
        }
        Self { features }
    }
}
