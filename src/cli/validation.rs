// validation.rs - Input validation utilities

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::str::FromStr;

use regex::Regex;

use crate::cli::args::Args;
use crate::core::classify::{
    ThresholdPolicy, ThresholdScheme, DEFAULT_STR_TOLERANCE, SINGLE_THRESHOLD_PERCENT,
    TIERED_AUTOSOMAL_PERCENT, TIERED_MITOCHONDRIAL_PERCENT, TIERED_X_PERCENT,
};
use crate::core::runner::{RunConfig, DEFAULT_THREADS};
use crate::core::ComparisonMode;
use crate::data::assembly::DEFAULT_FASTA_QUALITY;
use crate::data::interval::DEFAULT_MAX_REGION_LENGTH;
use crate::output::ReportFormat;

/// Consensus files of the persons being compared
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inputs {
    Pair {
        first: String,
        second: String,
    },
    Trio {
        father: String,
        mother: String,
        child: String,
    },
}

impl Inputs {
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Inputs::Pair { first, second } => vec![first.as_str(), second.as_str()],
            Inputs::Trio { father, mother, child } => vec![father.as_str(), mother.as_str(), child.as_str()],
        }
    }
}

pub struct ValidationResult {
    pub inputs: Inputs,
    pub panel: String,
    pub output: Option<String>,
    pub format: ReportFormat,
    pub run_config: RunConfig,
    pub default_quality: u8,
    pub gene_include_regex: Option<Regex>,
    pub gene_exclude_regex: Option<Regex>,
    pub chromosomes: Option<HashSet<String>>,
}

impl ValidationResult {
    pub fn output_path(&self) -> Option<&str> {
        self.output.as_deref()
    }
}

fn check_percent(name: &str, value: f64) -> Result<f64, String> {
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("{} must be between 0 and 100, got {}", name, value));
    }
    Ok(value)
}

fn validate_inputs(args: &Args) -> Result<Inputs, String> {
    if args.is_trio() {
        if args.first.is_some() || args.second.is_some() {
            return Err("--first/--second cannot be combined with --father/--mother/--child".to_string());
        }
        match (&args.father, &args.mother, &args.child) {
            (Some(father), Some(mother), Some(child)) => Ok(Inputs::Trio {
                father: father.clone(),
                mother: mother.clone(),
                child: child.clone(),
            }),
            _ => Err("Trio mode requires --father, --mother and --child".to_string()),
        }
    } else {
        match (&args.first, &args.second) {
            (Some(first), Some(second)) => Ok(Inputs::Pair {
                first: first.clone(),
                second: second.clone(),
            }),
            _ => Err("Both --first and --second are required (or --father, --mother and --child)".to_string()),
        }
    }
}

fn validate_policy(args: &Args) -> Result<ThresholdPolicy, String> {
    let scheme = ThresholdScheme::from_str(&args.threshold_scheme)?;
    let policy = match scheme {
        ThresholdScheme::Single => ThresholdPolicy::Single {
            percent: check_percent(
                "--single-threshold",
                args.single_threshold.unwrap_or(SINGLE_THRESHOLD_PERCENT),
            )?,
        },
        ThresholdScheme::Tiered => ThresholdPolicy::Tiered {
            mitochondrial: check_percent(
                "--mt-threshold",
                args.mt_threshold.unwrap_or(TIERED_MITOCHONDRIAL_PERCENT),
            )?,
            x: check_percent("--x-threshold", args.x_threshold.unwrap_or(TIERED_X_PERCENT))?,
            autosomal: check_percent(
                "--autosomal-threshold",
                args.autosomal_threshold.unwrap_or(TIERED_AUTOSOMAL_PERCENT),
            )?,
        },
    };
    Ok(policy)
}

fn compile(name: &str, pattern: &Option<String>) -> Result<Option<Regex>, String> {
    pattern
        .as_deref()
        .map(|p| Regex::new(p).map_err(|e| format!("Invalid {} regex: {}", name, e)))
        .transpose()
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    let inputs = validate_inputs(args)?;
    let panel = args
        .panel
        .clone()
        .ok_or_else(|| "--panel is required".to_string())?;

    let mode = ComparisonMode::from_str(&args.mode)?;
    if mode == ComparisonMode::Str && matches!(inputs, Inputs::Trio { .. }) {
        return Err("Trio comparison is not available in str mode; compare father and son with --first/--second".to_string());
    }
    let format = ReportFormat::from_str(&args.format)?;
    let policy = validate_policy(args)?;

    let threads = args.threads.unwrap_or(DEFAULT_THREADS);
    if threads == 0 {
        return Err("--threads must be at least 1".to_string());
    }
    let max_region_length = args.max_region_length.unwrap_or(DEFAULT_MAX_REGION_LENGTH);
    if max_region_length == 0 {
        return Err("--max-region-length must be at least 1".to_string());
    }

    let gene_include_regex = compile("include_genes", &args.include_genes)?;
    let gene_exclude_regex = compile("exclude_genes", &args.exclude_genes)?;

    let mut chromosomes: Option<HashSet<String>> = args.chromosomes.as_ref().map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect()
    });
    if let Some(file_path) = &args.chromosomes_list {
        let listed = load_set_from_file(file_path)?;
        chromosomes.get_or_insert_with(HashSet::new).extend(listed);
    }
    if chromosomes.as_ref().is_some_and(|c| c.is_empty()) {
        return Err("Chromosome filter is empty".to_string());
    }

    Ok(ValidationResult {
        inputs,
        panel,
        output: args.output.clone(),
        format,
        run_config: RunConfig {
            mode,
            policy,
            str_tolerance: args.str_tolerance.unwrap_or(DEFAULT_STR_TOLERANCE),
            max_region_length,
            threads,
            show_progress: args.progress,
        },
        default_quality: args.default_quality.unwrap_or(DEFAULT_FASTA_QUALITY),
        gene_include_regex,
        gene_exclude_regex,
        chromosomes,
    })
}

/// Load a set of strings from a file (one per line)
fn load_set_from_file(file_path: &str) -> Result<HashSet<String>, String> {
    let file = File::open(file_path)
        .map_err(|e| format!("Failed to open filter file '{}': {}", file_path, e))?;

    let reader = BufReader::new(file);
    let mut set = HashSet::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("Failed to read line {} from '{}': {}", line_num + 1, file_path, e))?;
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            set.insert(trimmed.to_string());
        }
    }

    eprintln!("📋 Loaded {} items from filter file '{}'", set.len(), file_path);
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;
    use std::io::Write;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["exome-kinship"], args).unwrap()
    }

    const PAIR: [&str; 6] = ["--first", "a.fa", "--second", "b.fa", "--panel", "panel.bed"];

    fn with_pair(extra: &[&str]) -> Args {
        let mut all: Vec<&str> = PAIR.to_vec();
        all.extend_from_slice(extra);
        parse(&all)
    }

    #[test]
    fn test_defaults() {
        let result = validate_args(&with_pair(&[])).unwrap();
        assert_eq!(
            result.inputs,
            Inputs::Pair { first: "a.fa".to_string(), second: "b.fa".to_string() }
        );
        assert_eq!(result.format, ReportFormat::Text);
        assert_eq!(result.run_config.mode, ComparisonMode::EditDistance);
        assert_eq!(result.run_config.policy, ThresholdPolicy::tiered_default());
        assert_eq!(result.run_config.threads, DEFAULT_THREADS);
        assert_eq!(result.run_config.max_region_length, 20);
        assert_eq!(result.default_quality, 30);
        assert!(result.chromosomes.is_none());
    }

    #[test]
    fn test_single_scheme() {
        let result = validate_args(&with_pair(&["--threshold-scheme", "single"])).unwrap();
        assert_eq!(result.run_config.policy, ThresholdPolicy::Single { percent: 99.7 });

        let result = validate_args(&with_pair(&[
            "--threshold-scheme",
            "single",
            "--single-threshold",
            "99.0",
        ]))
        .unwrap();
        assert_eq!(result.run_config.policy, ThresholdPolicy::Single { percent: 99.0 });
    }

    #[test]
    fn test_tiered_overrides() {
        let result = validate_args(&with_pair(&[
            "--mt-threshold",
            "99",
            "--x-threshold",
            "50",
            "--autosomal-threshold",
            "40",
        ]))
        .unwrap();
        assert_eq!(
            result.run_config.policy,
            ThresholdPolicy::Tiered { mitochondrial: 99.0, x: 50.0, autosomal: 40.0 }
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(validate_args(&with_pair(&["--mt-threshold", "101"])).is_err());
        assert!(validate_args(&with_pair(&["--threads", "0"])).is_err());
        assert!(validate_args(&with_pair(&["--max-region-length", "0"])).is_err());
        assert!(validate_args(&with_pair(&["--mode", "snps"])).is_err());
        assert!(validate_args(&with_pair(&["--format", "xml"])).is_err());
        assert!(validate_args(&with_pair(&["--include-genes", "("])).is_err());
        assert!(validate_args(&parse(&["--first", "a.fa", "--panel", "p.bed"])).is_err());
        assert!(validate_args(&parse(&["--first", "a.fa", "--second", "b.fa"])).is_err());
    }

    #[test]
    fn test_trio_inputs() {
        let trio = ["--father", "f.fa", "--mother", "m.fa", "--child", "c.fa", "--panel", "p.bed"];
        let result = validate_args(&parse(&trio)).unwrap();
        assert_eq!(result.inputs.paths(), vec!["f.fa", "m.fa", "c.fa"]);

        let mut str_trio = trio.to_vec();
        str_trio.extend_from_slice(&["--mode", "str"]);
        assert!(validate_args(&parse(&str_trio)).is_err());

        assert!(validate_args(&parse(&["--father", "f.fa", "--child", "c.fa", "--panel", "p.bed"])).is_err());
        let mut mixed = trio.to_vec();
        mixed.extend_from_slice(&["--first", "a.fa"]);
        assert!(validate_args(&parse(&mixed)).is_err());
    }

    #[test]
    fn test_chromosome_filters() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# wanted").unwrap();
        writeln!(file, "chrM").unwrap();
        writeln!(file).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let result = validate_args(&with_pair(&[
            "--chromosomes",
            "chr1, chrX",
            "--chromosomes-list",
            path.as_str(),
        ]))
        .unwrap();
        let chromosomes = result.chromosomes.unwrap();
        assert_eq!(chromosomes.len(), 3);
        assert!(chromosomes.contains("chrX"));
        assert!(chromosomes.contains("chrM"));
    }
}
