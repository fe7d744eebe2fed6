// error.rs - Error taxonomy shared by the data model, engine and pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Invalid genomic interval or marker definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("empty chromosome name")]
    EmptyChromosome,

    #[error("invalid interval {chromosome}:{start}-{end}: start must be lower than end")]
    InvertedBounds {
        chromosome: String,
        start: u64,
        end: u64,
    },

    #[error("invalid name '{0}': only letters, digits and '.', '-', '_', '+' are allowed")]
    InvalidName(String),

    #[error("interval {chromosome}:{start}-{end} is longer than {max} bases")]
    TooLong {
        chromosome: String,
        start: u64,
        end: u64,
        max: u64,
    },

    #[error("invalid repeat motif '{motif}' for marker {marker}: {reason}")]
    InvalidMotif {
        marker: String,
        motif: String,
        reason: String,
    },
}

/// Invalid assembled region
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("sequence has {sequence} bases but quality has {quality} values")]
    QualityLength { sequence: usize, quality: usize },

    #[error("invalid base '{base}' at offset {offset} (expected A, C, G, T or *)")]
    InvalidBase { base: char, offset: usize },
}

/// Invalid comparison outcome
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutcomeError {
    #[error("difference count {differences} exceeds compared length {length} for {chromosome}/{gene}")]
    DifferencesExceedLength {
        chromosome: String,
        gene: String,
        differences: u64,
        length: u64,
    },
}

/// Failure of a single sub-region comparison
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("length mismatch: {first} vs {second} bases")]
    LengthMismatch { first: usize, second: usize },

    #[error("no comparable bases left after removing unknown positions")]
    EmptyAfterNormalization,

    #[error("regions are not paired: {first} vs {second}")]
    Unpaired { first: String, second: String },

    #[error("STR comparison requested for {0} but it has no repeat motif")]
    MissingMotif(String),

    #[error(transparent)]
    Outcome(#[from] OutcomeError),
}

/// Failure while folding outcomes or analysing the aggregate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("received a {received} outcome but the aggregator expects {expected} outcomes")]
    WrongOutcome {
        expected: &'static str,
        received: &'static str,
    },

    #[error("no data to analyze")]
    NoData,
}

/// Failure reported by a region assembler
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid record in {path}: {message}")]
    Format { path: PathBuf, message: String },

    #[error("assembled region for {interval} is invalid: {source}")]
    Region {
        interval: String,
        #[source]
        source: RegionError,
    },
}

/// Failure while loading a panel file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{path}:{line}: {source}")]
    Interval {
        path: PathBuf,
        line: usize,
        #[source]
        source: IntervalError,
    },

    #[error("{0} contains no usable entries")]
    Empty(PathBuf),
}

/// Failure of one panel feature, wrapping the first error raised by its tasks
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("feature {feature}: persons produced {first} and {second} assembled regions")]
    AssemblyMismatch {
        feature: String,
        first: usize,
        second: usize,
    },

    #[error("feature {feature}: sub-region {index} is not paired ({first} vs {second})")]
    PairingMismatch {
        feature: String,
        index: usize,
        first: String,
        second: String,
    },

    #[error("feature {feature}: assembly failed: {source}")]
    Assembly {
        feature: String,
        #[source]
        source: AssemblyError,
    },

    #[error("feature {feature}: comparison of sub-region {index} failed ({cancelled} sibling tasks cancelled): {source}")]
    Comparison {
        feature: String,
        index: usize,
        cancelled: usize,
        #[source]
        source: CompareError,
    },
}

impl FeatureError {
    /// Whether the run can continue without this feature
    pub fn is_recoverable(&self) -> bool {
        match self {
            FeatureError::AssemblyMismatch { .. } | FeatureError::PairingMismatch { .. } => true,
            FeatureError::Comparison { .. } => true,
            FeatureError::Assembly { .. } => false,
        }
    }
}

/// Failure of a whole comparison run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("analysis failed: {0}")]
    Aggregate(#[from] AggregateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_error_recoverability() {
        let mismatch = FeatureError::AssemblyMismatch {
            feature: "BRCA1".to_string(),
            first: 3,
            second: 2,
        };
        assert!(mismatch.is_recoverable());

        let fatal = FeatureError::Assembly {
            feature: "BRCA1".to_string(),
            source: AssemblyError::Format {
                path: PathBuf::from("a.fa"),
                message: "bad".to_string(),
            },
        };
        assert!(!fatal.is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        let err = IntervalError::InvertedBounds {
            chromosome: "chr1".to_string(),
            start: 10,
            end: 5,
        };
        assert!(err.to_string().contains("chr1:10-5"));
        assert_eq!(AggregateError::NoData.to_string(), "no data to analyze");
    }
}
