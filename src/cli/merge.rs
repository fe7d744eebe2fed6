// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

fn fill_default(slot: &mut String, default: &str, value: Option<String>) {
    if slot == default {
        if let Some(value) = value {
            *slot = value;
        }
    }
}

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Inputs
        fill(&mut self.first, config.first);
        fill(&mut self.second, config.second);
        fill(&mut self.father, config.father);
        fill(&mut self.mother, config.mother);
        fill(&mut self.child, config.child);
        fill(&mut self.panel, config.panel);
        fill(&mut self.output, config.output);

        // Core settings (only override defaults, not explicit CLI values)
        fill_default(&mut self.mode, "edit", config.mode);
        fill_default(&mut self.format, "text", config.format);
        fill_default(&mut self.threshold_scheme, "tiered", config.threshold_scheme);
        fill(&mut self.max_region_length, config.max_region_length);
        fill(&mut self.default_quality, config.default_quality);

        // Thresholds
        fill(&mut self.single_threshold, config.single_threshold);
        fill(&mut self.mt_threshold, config.mt_threshold);
        fill(&mut self.x_threshold, config.x_threshold);
        fill(&mut self.autosomal_threshold, config.autosomal_threshold);
        fill(&mut self.str_tolerance, config.str_tolerance);

        // Performance
        fill(&mut self.threads, config.threads);

        // Panel filtering
        fill(&mut self.include_genes, config.include_genes);
        fill(&mut self.exclude_genes, config.exclude_genes);
        fill(&mut self.chromosomes, config.chromosomes);
        fill(&mut self.chromosomes_list, config.chromosomes_list);

        // Flags (CLI flags take precedence, config only sets if not explicitly set)
        if !self.progress && config.progress.unwrap_or(false) {
            self.progress = true;
        }
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["exome-kinship"], args).unwrap()
    }

    #[test]
    fn test_cli_values_win() {
        let args = parse(&["--mode", "hamming", "--threads", "8", "--first", "a.fa"]);
        let config = Config {
            mode: Some("str".to_string()),
            threads: Some(2),
            first: Some("config.fa".to_string()),
            second: Some("b.fa".to_string()),
            format: Some("json".to_string()),
            progress: Some(true),
            ..Config::new()
        };

        let merged = args.merge_with_config(config);
        assert_eq!(merged.mode, "hamming");
        assert_eq!(merged.threads, Some(8));
        assert_eq!(merged.first.as_deref(), Some("a.fa"));
        assert_eq!(merged.second.as_deref(), Some("b.fa"));
        assert_eq!(merged.format, "json");
        assert!(merged.progress);
    }

    #[test]
    fn test_empty_config_keeps_defaults() {
        let merged = parse(&[]).merge_with_config(Config::new());
        assert_eq!(merged.mode, "edit");
        assert_eq!(merged.format, "text");
        assert_eq!(merged.threshold_scheme, "tiered");
        assert!(merged.threads.is_none());
        assert!(!merged.is_trio());
    }
}
