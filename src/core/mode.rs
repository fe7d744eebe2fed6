// mode.rs - Comparison mode selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Algorithm applied to every pair of sub-regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonMode {
    /// Levenshtein distance after removing unknown positions
    EditDistance,
    /// Position-wise mismatches, complement aware
    Hamming,
    /// Repeat-motif counting over STR markers
    Str,
}

impl FromStr for ComparisonMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "edit" | "edit-distance" | "levenshtein" => Ok(ComparisonMode::EditDistance),
            "hamming" => Ok(ComparisonMode::Hamming),
            "str" | "y-str" | "motif" => Ok(ComparisonMode::Str),
            _ => Err(format!("Invalid comparison mode: {}. Use: edit, hamming, str", s)),
        }
    }
}

impl ComparisonMode {
    pub fn description(&self) -> &str {
        match self {
            ComparisonMode::EditDistance => "Edit distance (unknown bases removed)",
            ComparisonMode::Hamming => "Hamming distance (strand complement aware)",
            ComparisonMode::Str => "STR repeat-motif counts",
        }
    }

    /// Modes producing per-gene difference counts rather than motif counts
    pub fn is_sequence_diff(&self) -> bool {
        !matches!(self, ComparisonMode::Str)
    }

    /// Whether long intervals are cut into bounded sub-regions.
    ///
    /// STR markers are kept whole so a repeat run is never cut in two.
    pub fn splits_regions(&self) -> bool {
        self.is_sequence_diff()
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComparisonMode::EditDistance => "edit",
            ComparisonMode::Hamming => "hamming",
            ComparisonMode::Str => "str",
        };
        write!(f, "{}", name)
    }
}
