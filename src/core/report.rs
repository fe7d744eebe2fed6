// report.rs - Comparison and trio reports with their plain-text rendering

use serde::Serialize;
use std::fmt;

use crate::core::aggregate::{MarkerAnalysis, SimilarityAnalysis};
use crate::core::classify::{chromosome_order, MarkerOwner};
use crate::core::mode::ComparisonMode;

/// Feature bookkeeping of one pairwise run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub features_total: usize,
    pub features_compared: usize,
    /// Features dropped because the persons' assemblies did not pair up
    pub features_skipped: usize,
    /// Features dropped because a comparison task failed
    pub features_failed: usize,
    pub outcomes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "analysis", rename_all = "snake_case")]
pub enum ReportBody {
    Similarity(SimilarityAnalysis),
    Markers(MarkerAnalysis),
}

/// Result of comparing two persons over a panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub first: String,
    pub second: String,
    pub mode: ComparisonMode,
    pub stats: RunStats,
    pub body: ReportBody,
}

impl ComparisonReport {
    pub fn similarity(&self) -> Option<&SimilarityAnalysis> {
        match &self.body {
            ReportBody::Similarity(analysis) => Some(analysis),
            ReportBody::Markers(_) => None,
        }
    }

    pub fn markers(&self) -> Option<&MarkerAnalysis> {
        match &self.body {
            ReportBody::Markers(analysis) => Some(analysis),
            ReportBody::Similarity(_) => None,
        }
    }

    /// Verdict sentence, e.g. "father and child are parent and child"
    pub fn verdict_line(&self) -> String {
        match &self.body {
            ReportBody::Similarity(a) => {
                format!("{} and {} are {}", self.first, self.second, a.summary.verdict)
            }
            ReportBody::Markers(a) => format!("{} and {} are {}", self.first, self.second, a.verdict),
        }
    }
}

fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => "NA".to_string(),
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Comparison: {} vs {}", self.first, self.second)?;
        writeln!(f, "Mode: {}", self.mode.description())?;
        writeln!(
            f,
            "Features: {}/{} compared ({} skipped, {} failed), {} sub-region results",
            self.stats.features_compared,
            self.stats.features_total,
            self.stats.features_skipped,
            self.stats.features_failed,
            self.stats.outcomes
        )?;
        writeln!(f)?;

        match &self.body {
            ReportBody::Similarity(analysis) => {
                writeln!(f, "Policy: {}", analysis.summary.policy.description())?;
                writeln!(f, "{:<14}{:>12}{:>12}  Call", "Chromosome", "Similarity", "Threshold")?;
                for chromosome in &analysis.chromosomes {
                    writeln!(
                        f,
                        "{:<14}{:>12}{:>11.1}%  {}",
                        chromosome.chromosome,
                        format_percent(Some(chromosome.similarity)),
                        chromosome.threshold,
                        if chromosome.similar { "similar" } else { "non-similar" }
                    )?;
                    for gene in &chromosome.genes {
                        writeln!(
                            f,
                            "    {:<10}{:>12}  ({}/{} differing)",
                            gene.gene,
                            format_percent(gene.similarity),
                            gene.differences,
                            gene.length
                        )?;
                    }
                }
                writeln!(f)?;
                for tally in &analysis.summary.tallies {
                    writeln!(
                        f,
                        "{}: {} similar, {} non-similar",
                        tally.class.label(),
                        tally.similar,
                        tally.non_similar
                    )?;
                }
                writeln!(
                    f,
                    "Total: {} similar, {} non-similar chromosomes",
                    analysis.summary.similar, analysis.summary.non_similar
                )?;
                writeln!(
                    f,
                    "Similarity bands: {} high, {} medium, {} low",
                    analysis.bands.high, analysis.bands.medium, analysis.bands.low
                )?;
            }
            ReportBody::Markers(analysis) => {
                writeln!(f, "{:<14}{:>8}{:>8}  Owner", "Marker", "First", "Second")?;
                for marker in &analysis.markers {
                    let owner = match marker.owner {
                        MarkerOwner::First => self.first.as_str(),
                        MarkerOwner::Second => self.second.as_str(),
                        MarkerOwner::Shared => "shared",
                    };
                    writeln!(
                        f,
                        "{:<14}{:>8}{:>8}  {}{}",
                        marker.marker,
                        marker.first,
                        marker.second,
                        owner,
                        if marker.differs { " *" } else { "" }
                    )?;
                }
                writeln!(f)?;
                writeln!(
                    f,
                    "Higher in {}: {}, higher in {}: {}, equal: {}",
                    self.first, analysis.first_owned, self.second, analysis.second_owned, analysis.shared
                )?;
                writeln!(
                    f,
                    "Markers differing by more than {}: {}",
                    analysis.tolerance, analysis.differing
                )?;
            }
        }
        writeln!(f, "Verdict: {}", self.verdict_line())
    }
}

/// Parent a child's chromosome is closest to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Father,
    Mother,
    Undetermined,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Father => write!(f, "father"),
            Provenance::Mother => write!(f, "mother"),
            Provenance::Undetermined => write!(f, "undetermined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChromosomeProvenance {
    pub chromosome: String,
    pub father_similarity: Option<f64>,
    pub mother_similarity: Option<f64>,
    pub source: Provenance,
}

/// Child compared against both parents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrioReport {
    pub father: ComparisonReport,
    pub mother: ComparisonReport,
    pub provenance: Vec<ChromosomeProvenance>,
}

impl TrioReport {
    /// Attribute each chromosome to the parent with the higher similarity.
    ///
    /// Equal similarities, or a chromosome seen against one parent only, stay undetermined.
    pub fn new(father: ComparisonReport, mother: ComparisonReport) -> Self {
        let mut names: Vec<String> = Vec::new();
        for report in [&father, &mother] {
            if let Some(analysis) = report.similarity() {
                for chromosome in &analysis.chromosomes {
                    if !names.contains(&chromosome.chromosome) {
                        names.push(chromosome.chromosome.clone());
                    }
                }
            }
        }
        names.sort_by(|a, b| chromosome_order(a, b));

        let lookup = |report: &ComparisonReport, name: &str| {
            report
                .similarity()
                .and_then(|a| a.chromosome(name))
                .map(|c| c.similarity)
        };

        let provenance = names
            .into_iter()
            .map(|chromosome| {
                let father_similarity = lookup(&father, &chromosome);
                let mother_similarity = lookup(&mother, &chromosome);
                let source = match (father_similarity, mother_similarity) {
                    (Some(f), Some(m)) if f > m => Provenance::Father,
                    (Some(f), Some(m)) if m > f => Provenance::Mother,
                    _ => Provenance::Undetermined,
                };
                ChromosomeProvenance {
                    chromosome,
                    father_similarity,
                    mother_similarity,
                    source,
                }
            })
            .collect();

        Self {
            father,
            mother,
            provenance,
        }
    }

    pub fn count(&self, source: Provenance) -> usize {
        self.provenance.iter().filter(|p| p.source == source).count()
    }
}

impl fmt::Display for TrioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.father)?;
        writeln!(f, "{}", self.mother)?;
        writeln!(f, "Chromosome provenance")?;
        writeln!(f, "{:<14}{:>12}{:>12}  Closest", "Chromosome", "Father", "Mother")?;
        for p in &self.provenance {
            writeln!(
                f,
                "{:<14}{:>12}{:>12}  {}",
                p.chromosome,
                format_percent(p.father_similarity),
                format_percent(p.mother_similarity),
                p.source
            )?;
        }
        writeln!(
            f,
            "From father: {}, from mother: {}, undetermined: {}",
            self.count(Provenance::Father),
            self.count(Provenance::Mother),
            self.count(Provenance::Undetermined)
        )
    }
}
