// classify.rs - Similarity thresholds and kinship verdicts

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Per-chromosome cutoff of the single-threshold scheme
pub const SINGLE_THRESHOLD_PERCENT: f64 = 99.7;

/// Tiered scheme cutoffs by chromosome class
pub const TIERED_MITOCHONDRIAL_PERCENT: f64 = 98.0;
pub const TIERED_X_PERCENT: f64 = 45.0;
pub const TIERED_AUTOSOMAL_PERCENT: f64 = 45.0;

/// Allowed repeat-count difference before an STR marker counts as differing
pub const DEFAULT_STR_TOLERANCE: u64 = 1;

/// Chromosome class used to pick a tiered threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChromosomeClass {
    Autosomal,
    /// X and Y
    Sex,
    Mitochondrial,
}

impl ChromosomeClass {
    pub fn from_name(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        let bare = upper.strip_prefix("CHR").unwrap_or(&upper);
        match bare {
            "M" | "MT" => ChromosomeClass::Mitochondrial,
            "X" | "Y" => ChromosomeClass::Sex,
            _ => ChromosomeClass::Autosomal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChromosomeClass::Autosomal => "autosomal",
            ChromosomeClass::Sex => "X/Y",
            ChromosomeClass::Mitochondrial => "mitochondrial",
        }
    }
}

/// Natural ordering for chromosome names: 1..22, X, Y, M, then anything else by name
pub fn chromosome_order(a: &str, b: &str) -> Ordering {
    fn key(name: &str) -> (u8, u64, String) {
        let upper = name.to_ascii_uppercase();
        let bare = upper.strip_prefix("CHR").unwrap_or(&upper).to_string();
        if let Ok(n) = bare.parse::<u64>() {
            return (0, n, bare);
        }
        match bare.as_str() {
            "X" => (1, 0, bare),
            "Y" => (2, 0, bare),
            "M" | "MT" => (3, 0, bare),
            _ => (4, 0, bare),
        }
    }
    key(a).cmp(&key(b))
}

/// How chromosome similarities are turned into similar / non-similar calls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// One cutoff for every chromosome
    Single { percent: f64 },
    /// Cutoff chosen by chromosome class
    Tiered {
        mitochondrial: f64,
        x: f64,
        autosomal: f64,
    },
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::tiered_default()
    }
}

impl ThresholdPolicy {
    pub fn single_default() -> Self {
        ThresholdPolicy::Single {
            percent: SINGLE_THRESHOLD_PERCENT,
        }
    }

    pub fn tiered_default() -> Self {
        ThresholdPolicy::Tiered {
            mitochondrial: TIERED_MITOCHONDRIAL_PERCENT,
            x: TIERED_X_PERCENT,
            autosomal: TIERED_AUTOSOMAL_PERCENT,
        }
    }

    pub fn threshold_for(&self, class: ChromosomeClass) -> f64 {
        match *self {
            ThresholdPolicy::Single { percent } => percent,
            ThresholdPolicy::Tiered { mitochondrial, x, autosomal } => match class {
                ChromosomeClass::Mitochondrial => mitochondrial,
                ChromosomeClass::Sex => x,
                ChromosomeClass::Autosomal => autosomal,
            },
        }
    }

    pub fn is_similar(&self, class: ChromosomeClass, similarity_percent: f64) -> bool {
        similarity_percent >= self.threshold_for(class)
    }

    /// Highest cutoff of any class
    pub fn strictest(&self) -> f64 {
        match *self {
            ThresholdPolicy::Single { percent } => percent,
            ThresholdPolicy::Tiered { mitochondrial, x, autosomal } => mitochondrial.max(x).max(autosomal),
        }
    }

    /// Lowest cutoff of any class
    pub fn loosest(&self) -> f64 {
        match *self {
            ThresholdPolicy::Single { percent } => percent,
            ThresholdPolicy::Tiered { mitochondrial, x, autosomal } => mitochondrial.min(x).min(autosomal),
        }
    }

    pub fn description(&self) -> String {
        match *self {
            ThresholdPolicy::Single { percent } => {
                format!("single threshold ({:.1}% per chromosome)", percent)
            }
            ThresholdPolicy::Tiered { mitochondrial, x, autosomal } => format!(
                "tiered thresholds (mitochondrial {:.1}%, X/Y {:.1}%, autosomal {:.1}%)",
                mitochondrial, x, autosomal
            ),
        }
    }
}

/// Scheme names accepted on the command line and in config files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdScheme {
    Single,
    Tiered,
}

impl FromStr for ThresholdScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(ThresholdScheme::Single),
            "tiered" => Ok(ThresholdScheme::Tiered),
            _ => Err(format!("Invalid threshold scheme: {}. Use: single, tiered", s)),
        }
    }
}

/// Final call of a sequence comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KinshipVerdict {
    ParentAndChild,
    NotParentAndChild,
}

impl fmt::Display for KinshipVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinshipVerdict::ParentAndChild => write!(f, "parent and child"),
            KinshipVerdict::NotParentAndChild => write!(f, "not parent and child"),
        }
    }
}

/// Similar / non-similar chromosome counts of one class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassTally {
    pub class: ChromosomeClass,
    pub similar: usize,
    pub non_similar: usize,
}

/// Chromosome counts by similarity band, independent of chromosome class.
///
/// High is at or above the policy's strictest cutoff and low is below its loosest.
/// A single cutoff leaves the medium band empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimilarityBands {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SimilarityBands {
    pub fn count(policy: ThresholdPolicy, similarities: impl IntoIterator<Item = f64>) -> Self {
        let (high_cut, low_cut) = (policy.strictest(), policy.loosest());
        let mut bands = Self::default();
        for similarity in similarities {
            if similarity >= high_cut {
                bands.high += 1;
            } else if similarity >= low_cut {
                bands.medium += 1;
            } else {
                bands.low += 1;
            }
        }
        bands
    }
}

/// Outcome of classifying every chromosome against the policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KinshipSummary {
    pub policy: ThresholdPolicy,
    pub tallies: Vec<ClassTally>,
    pub similar: usize,
    pub non_similar: usize,
    pub verdict: KinshipVerdict,
}

impl KinshipSummary {
    /// Tally `(class, is_similar)` calls; parent and child only if similar chromosomes outnumber the rest
    pub fn from_calls(policy: ThresholdPolicy, calls: impl IntoIterator<Item = (ChromosomeClass, bool)>) -> Self {
        let mut tallies: Vec<ClassTally> = Vec::new();
        for (class, similar) in calls {
            let position = match tallies.iter().position(|t| t.class == class) {
                Some(p) => p,
                None => {
                    tallies.push(ClassTally { class, similar: 0, non_similar: 0 });
                    tallies.len() - 1
                }
            };
            if similar {
                tallies[position].similar += 1;
            } else {
                tallies[position].non_similar += 1;
            }
        }
        tallies.sort_by_key(|t| std::cmp::Reverse(t.class));

        let similar: usize = tallies.iter().map(|t| t.similar).sum();
        let non_similar: usize = tallies.iter().map(|t| t.non_similar).sum();
        let verdict = if similar > non_similar {
            KinshipVerdict::ParentAndChild
        } else {
            KinshipVerdict::NotParentAndChild
        };

        Self { policy, tallies, similar, non_similar, verdict }
    }
}

/// Which person an STR marker's repeat count favours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerOwner {
    First,
    Second,
    Shared,
}

impl MarkerOwner {
    pub fn from_counts(first: u64, second: u64) -> Self {
        match first.cmp(&second) {
            Ordering::Greater => MarkerOwner::First,
            Ordering::Less => MarkerOwner::Second,
            Ordering::Equal => MarkerOwner::Shared,
        }
    }
}

/// Final call of an STR comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrVerdict {
    FatherAndSon,
    NotFatherAndSon,
}

impl fmt::Display for StrVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrVerdict::FatherAndSon => write!(f, "father and son"),
            StrVerdict::NotFatherAndSon => write!(f, "not father and son"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chromosome_class() {
        assert_eq!(ChromosomeClass::from_name("chrM"), ChromosomeClass::Mitochondrial);
        assert_eq!(ChromosomeClass::from_name("MT"), ChromosomeClass::Mitochondrial);
        assert_eq!(ChromosomeClass::from_name("chrX"), ChromosomeClass::Sex);
        assert_eq!(ChromosomeClass::from_name("Y"), ChromosomeClass::Sex);
        assert_eq!(ChromosomeClass::from_name("chr7"), ChromosomeClass::Autosomal);
        assert_eq!(ChromosomeClass::from_name("chrMX_random"), ChromosomeClass::Autosomal);
    }

    #[test]
    fn test_chromosome_order() {
        let mut names = vec!["chrM", "chr10", "chrX", "chr2", "chrUn", "chr1", "chrY"];
        names.sort_by(|a, b| chromosome_order(a, b));
        assert_eq!(names, vec!["chr1", "chr2", "chr10", "chrX", "chrY", "chrM", "chrUn"]);
    }

    #[test]
    fn test_policy_thresholds() {
        let single = ThresholdPolicy::single_default();
        assert_eq!(single.threshold_for(ChromosomeClass::Mitochondrial), 99.7);
        assert!(single.is_similar(ChromosomeClass::Autosomal, 99.7));
        assert!(!single.is_similar(ChromosomeClass::Autosomal, 99.69));

        let tiered = ThresholdPolicy::default();
        assert_eq!(tiered.threshold_for(ChromosomeClass::Mitochondrial), 98.0);
        assert_eq!(tiered.threshold_for(ChromosomeClass::Sex), 45.0);
        assert_eq!(tiered.threshold_for(ChromosomeClass::Autosomal), 45.0);
        assert!(tiered.is_similar(ChromosomeClass::Mitochondrial, 98.0));
        assert!(!tiered.is_similar(ChromosomeClass::Mitochondrial, 97.9));
    }

    #[test]
    fn test_summary_requires_strict_majority() {
        let policy = ThresholdPolicy::default();
        let tie = KinshipSummary::from_calls(
            policy,
            [(ChromosomeClass::Autosomal, true), (ChromosomeClass::Autosomal, false)],
        );
        assert_eq!(tie.verdict, KinshipVerdict::NotParentAndChild);

        let majority = KinshipSummary::from_calls(
            policy,
            [
                (ChromosomeClass::Autosomal, true),
                (ChromosomeClass::Sex, true),
                (ChromosomeClass::Mitochondrial, false),
            ],
        );
        assert_eq!(majority.verdict, KinshipVerdict::ParentAndChild);
        assert_eq!(majority.tallies.len(), 3);
        assert_eq!(majority.tallies[0].class, ChromosomeClass::Mitochondrial);
        assert_eq!(majority.tallies[0].non_similar, 1);
    }

    #[test]
    fn test_similarity_bands() {
        let tiered = SimilarityBands::count(ThresholdPolicy::default(), [98.0, 20.0, 1.0, 60.0]);
        assert_eq!(tiered, SimilarityBands { high: 1, medium: 1, low: 2 });

        let single = SimilarityBands::count(ThresholdPolicy::single_default(), [99.8, 99.0, 45.0]);
        assert_eq!(single, SimilarityBands { high: 1, medium: 0, low: 2 });
    }

    #[test]
    fn test_marker_owner() {
        assert_eq!(MarkerOwner::from_counts(5, 3), MarkerOwner::First);
        assert_eq!(MarkerOwner::from_counts(3, 5), MarkerOwner::Second);
        assert_eq!(MarkerOwner::from_counts(4, 4), MarkerOwner::Shared);
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("Tiered".parse::<ThresholdScheme>().unwrap(), ThresholdScheme::Tiered);
        assert_eq!("single".parse::<ThresholdScheme>().unwrap(), ThresholdScheme::Single);
        assert!("double".parse::<ThresholdScheme>().is_err());
    }
}
