// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    // Inputs
    pub first: Option<String>,
    pub second: Option<String>,
    pub father: Option<String>,
    pub mother: Option<String>,
    pub child: Option<String>,
    pub panel: Option<String>,
    pub output: Option<String>,

    // Core settings
    pub mode: Option<String>,
    pub format: Option<String>,
    pub max_region_length: Option<u64>,
    pub default_quality: Option<u8>,

    // Thresholds
    pub threshold_scheme: Option<String>,
    pub single_threshold: Option<f64>,
    pub mt_threshold: Option<f64>,
    pub x_threshold: Option<f64>,
    pub autosomal_threshold: Option<f64>,
    pub str_tolerance: Option<u64>,

    // Performance
    pub threads: Option<usize>,

    // Panel filtering
    pub include_genes: Option<String>,
    pub exclude_genes: Option<String>,
    pub chromosomes: Option<String>,
    pub chromosomes_list: Option<String>,

    // Flags
    pub progress: Option<bool>,
    pub dry_run: Option<bool>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config = Self::from_toml(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        eprintln!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        eprintln!("📄 Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# exome-kinship.toml - Configuration file for exome-kinship
# Command line arguments will override these settings

# =============================================================================
# INPUTS
# =============================================================================

# Pairwise comparison: consensus FASTA/FASTQ of each person
first = "/path/to/father.consensus.fa"
second = "/path/to/child.consensus.fa"

# Trio comparison (use instead of first/second)
# father = "/path/to/father.consensus.fa"
# mother = "/path/to/mother.consensus.fa"
# child = "/path/to/child.consensus.fa"

# Panel: BED intervals, or a marker table (chrom start end name motif) in str mode
panel = "/path/to/exome_panel.bed"

# Output report file (omit to print to stdout)
output = "kinship_report.txt"

# =============================================================================
# CORE SETTINGS
# =============================================================================

# Comparison mode: edit, hamming, str
mode = "edit"

# Output format: text, tsv, json
format = "text"

# Intervals longer than this are compared in sub-regions of this many bases
max_region_length = 20

# Phred quality assigned to FASTA bases
default_quality = 30

# =============================================================================
# THRESHOLDS
# =============================================================================

# Threshold scheme: single, tiered
threshold_scheme = "tiered"

# Single scheme: similarity percent every chromosome must reach
single_threshold = 99.7

# Tiered scheme: similarity percent per chromosome class
mt_threshold = 98.0
x_threshold = 45.0
autosomal_threshold = 45.0

# STR mode: repeat-count difference tolerated per marker
str_tolerance = 1

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of features processed at once; remaining cores compare sub-regions
threads = 2

# =============================================================================
# PANEL FILTERING
# =============================================================================

# Include only genes/markers matching regex pattern
# include_genes = "BRCA.*"

# Exclude genes/markers matching regex pattern
# exclude_genes = "HLA-.*"

# Keep only these chromosomes (comma-separated)
# chromosomes = "chr1,chr2,chrX,chrM"

# Keep only chromosomes listed in a file (one per line)
# chromosomes_list = "chromosomes.txt"

# =============================================================================
# FLAGS
# =============================================================================

# Show a progress bar
progress = false

# Validate inputs without comparing (dry run)
dry_run = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sample_config_parses() {
        let config = Config::from_toml(&Config::generate_sample()).unwrap();
        assert_eq!(config.mode.as_deref(), Some("edit"));
        assert_eq!(config.threshold_scheme.as_deref(), Some("tiered"));
        assert_eq!(config.mt_threshold, Some(98.0));
        assert_eq!(config.max_region_length, Some(20));
        assert_eq!(config.threads, Some(2));
        assert!(config.father.is_none());
        assert!(config.include_genes.is_none());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kinship.toml");
        let config = Config {
            mode: Some("hamming".to_string()),
            threads: Some(4),
            ..Config::new()
        };
        config.to_file(&path).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_unknown_value_type_rejected() {
        assert!(Config::from_toml("threads = \"many\"").is_err());
    }
}
