// mod.rs - Core logic module

pub mod aggregate;
pub mod classify;
pub mod distance;
pub mod mode;
pub mod outcome;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod tasks;

// Re-export main types for convenience
pub use aggregate::{ResultAggregator, SimilarityAnalysis, MarkerAnalysis};
pub use classify::{
    ChromosomeClass, KinshipVerdict, SimilarityBands, StrVerdict, ThresholdPolicy, ThresholdScheme,
};
pub use distance::{count_motif, edit_distance, hamming_distance, normalize, ComparisonEngine};
pub use mode::ComparisonMode;
pub use outcome::{ComparisonOutcome, EditOutcome, MotifOutcome};
pub use report::{ComparisonReport, Provenance, ReportBody, RunStats, TrioReport};
pub use runner::{compare_trio, compare_two, PoolPlan, RunConfig};
