// lib.rs - exome-kinship library root

//! # exome-kinship - Kinship inference from per-person consensus sequences
//!
//! This library compares the genomes of two or three related individuals over a
//! panel of genomic intervals and classifies the result as parent/child (or, for
//! Y-STR marker panels, father/son).
//!
//! ## Features
//!
//! - **Three comparison modes**: edit distance with unknown bases removed, strand
//!   complement aware Hamming distance, STR repeat-motif counting
//! - **Concurrent pipeline**: features run on one pool, sub-region comparisons on another
//! - **Threshold policies**: a single per-chromosome cutoff or tiered cutoffs by
//!   chromosome class (mitochondrial, X/Y, autosomal)
//! - **Trio mode**: child against both parents with per-chromosome provenance
//! - **Multiple formats**: text, TSV and JSON reports
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use exome_kinship::prelude::*;
//! use exome_kinship::data::loaders::load_bed_panel;
//! use std::path::Path;
//!
//! let panel = load_bed_panel(Path::new("exome.bed")).map_err(|e| e.to_string())?;
//! let father = ConsensusSequences::from_file(Path::new("father.fa"), 30).map_err(|e| e.to_string())?;
//! let child = ConsensusSequences::from_file(Path::new("child.fa"), 30).map_err(|e| e.to_string())?;
//!
//! let report = compare_two(&father, &child, &panel, &RunConfig::default()).map_err(|e| e.to_string())?;
//! println!("{}", report);
//! # Ok::<(), String>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod data;
pub mod error;
pub mod output;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{compare_trio, compare_two, ComparisonReport, RunConfig, TrioReport};
    pub use crate::core::{ComparisonEngine, ComparisonMode, ResultAggregator, ThresholdPolicy};
    pub use crate::data::{AssembledRegion, ConsensusSequences, Feature, GenomicInterval, Panel, PanelFilter};
    pub use crate::data::RegionAssembler;
    pub use crate::error::PipelineError;
    pub use crate::output::{write_report, ReportFormat};
}

// Re-export main types at the root level for convenience
pub use cli::{Args, ValidationResult};
pub use core::{compare_trio, compare_two, ComparisonMode, RunConfig, ThresholdPolicy};
pub use data::{ConsensusSequences, Panel, RegionAssembler};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "exome-kinship v{} - Kinship inference from exome consensus sequences",
        VERSION
    )
}
