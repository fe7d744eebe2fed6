// runner.rs - Top-level pairwise and trio comparison runs

use indicatif::{ProgressBar, ProgressStyle};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{error, info, warn};

use crate::core::aggregate::ResultAggregator;
use crate::core::classify::{ThresholdPolicy, DEFAULT_STR_TOLERANCE};
use crate::core::distance::ComparisonEngine;
use crate::core::mode::ComparisonMode;
use crate::core::pipeline::{process_feature, FeatureContext};
use crate::core::report::{ComparisonReport, ReportBody, RunStats, TrioReport};
use crate::core::tasks::TaskGroup;
use crate::data::interval::DEFAULT_MAX_REGION_LENGTH;
use crate::data::{Feature, Panel, RegionAssembler};
use crate::error::{FeatureError, PipelineError};

/// Features processed at once unless configured otherwise
pub const DEFAULT_THREADS: usize = 2;

/// Settings of one comparison run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: ComparisonMode,
    pub policy: ThresholdPolicy,
    pub str_tolerance: u64,
    pub max_region_length: u64,
    /// Workers of the feature pool
    pub threads: usize,
    pub show_progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: ComparisonMode::EditDistance,
            policy: ThresholdPolicy::default(),
            str_tolerance: DEFAULT_STR_TOLERANCE,
            max_region_length: DEFAULT_MAX_REGION_LENGTH,
            threads: DEFAULT_THREADS,
            show_progress: false,
        }
    }
}

/// Worker counts of the feature and comparison pools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolPlan {
    pub feature_threads: usize,
    pub comparison_threads: usize,
}

impl PoolPlan {
    pub fn new(threads: usize) -> Self {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::with_available(threads, available)
    }

    /// Share `available` cores so that every feature worker gets its own comparison workers
    pub fn with_available(threads: usize, available: usize) -> Self {
        let feature_threads = threads.max(1);
        Self {
            feature_threads,
            comparison_threads: (available / feature_threads).max(1),
        }
    }

    fn build(&self) -> Result<ComparisonPools, PipelineError> {
        let features = ThreadPoolBuilder::new()
            .num_threads(self.feature_threads)
            .thread_name(|i| format!("kinship-feature-{}", i))
            .build()?;
        let comparisons = ThreadPoolBuilder::new()
            .num_threads(self.comparison_threads)
            .thread_name(|i| format!("kinship-compare-{}", i))
            .build()?;
        Ok(ComparisonPools { features, comparisons })
    }
}

/// Pools owned by one run and dropped with it
struct ComparisonPools {
    features: ThreadPool,
    comparisons: ThreadPool,
}

fn check_config(panel: &Panel, config: &RunConfig) -> Result<(), PipelineError> {
    if panel.is_empty() {
        return Err(PipelineError::Config("panel contains no features".to_string()));
    }
    if config.threads == 0 {
        return Err(PipelineError::Config("thread count must be at least 1".to_string()));
    }
    if config.max_region_length == 0 {
        return Err(PipelineError::Config("maximum region length must be at least 1".to_string()));
    }
    if config.mode == ComparisonMode::Str && panel.marker_count() != panel.len() {
        return Err(PipelineError::Config(format!(
            "STR mode needs a marker panel, but {} of {} features have no repeat motif",
            panel.len() - panel.marker_count(),
            panel.len()
        )));
    }
    Ok(())
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} features ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Compare `first` and `second` over every panel feature and fold the outcomes.
///
/// Features run on the feature pool and are collected in completion order by this
/// thread, the only writer of the aggregator.
fn run_pairwise(
    first: &dyn RegionAssembler,
    second: &dyn RegionAssembler,
    panel: &Panel,
    config: &RunConfig,
    pools: &ComparisonPools,
) -> Result<(ResultAggregator, RunStats), PipelineError> {
    info!(
        "Comparing {} and {} over {} features ({})",
        first.name(),
        second.name(),
        panel.len(),
        config.mode
    );

    let ctx = FeatureContext {
        first,
        second,
        engine: ComparisonEngine::new(config.mode),
        max_region_length: config.max_region_length,
        compare_pool: &pools.comparisons,
    };

    let pb = progress_bar(panel.len(), config.show_progress);
    let features: Vec<&Feature> = panel.features().iter().collect();
    let group = TaskGroup::new(&pools.features);
    let outcome = group.run_observed(
        features,
        |_, feature| process_feature(&ctx, feature),
        |e: &FeatureError| !e.is_recoverable(),
        |_, _| pb.inc(1),
    );
    pb.finish_and_clear();

    let mut stats = RunStats {
        features_total: panel.len(),
        ..RunStats::default()
    };
    let mut aggregator = ResultAggregator::for_mode(config.mode);
    for (_, outcomes) in outcome.completed {
        stats.features_compared += 1;
        stats.outcomes += outcomes.len();
        aggregator.extend(outcomes)?;
    }

    let mut fatal = None;
    let mut only_failure = None;
    for (_, e) in outcome.errors {
        if !e.is_recoverable() {
            error!("{}", e);
            if fatal.is_none() {
                fatal = Some(e);
            }
        } else if matches!(e, FeatureError::Comparison { .. }) {
            error!("Skipping {}", e);
            stats.features_failed += 1;
            only_failure = Some(e);
        } else {
            warn!("Skipping {}", e);
            stats.features_skipped += 1;
        }
    }
    if let Some(e) = fatal {
        if outcome.cancelled > 0 {
            warn!("{} feature(s) cancelled after a fatal error", outcome.cancelled);
        }
        return Err(e.into());
    }
    if panel.len() == 1 {
        if let Some(e) = only_failure {
            return Err(e.into());
        }
    }

    info!(
        "{} vs {}: {}/{} features compared, {} skipped, {} failed",
        first.name(),
        second.name(),
        stats.features_compared,
        stats.features_total,
        stats.features_skipped,
        stats.features_failed
    );
    Ok((aggregator, stats))
}

fn build_report(
    first: &dyn RegionAssembler,
    second: &dyn RegionAssembler,
    panel: &Panel,
    config: &RunConfig,
    pools: &ComparisonPools,
) -> Result<ComparisonReport, PipelineError> {
    let (aggregator, stats) = run_pairwise(first, second, panel, config, pools)?;
    let body = match config.mode {
        ComparisonMode::Str => ReportBody::Markers(aggregator.analyze_markers(config.str_tolerance)?),
        ComparisonMode::EditDistance | ComparisonMode::Hamming => {
            ReportBody::Similarity(aggregator.analyze_similarity(config.policy)?)
        }
    };
    Ok(ComparisonReport {
        first: first.name().to_string(),
        second: second.name().to_string(),
        mode: config.mode,
        stats,
        body,
    })
}

/// Compare two persons over `panel`
pub fn compare_two(
    first: &dyn RegionAssembler,
    second: &dyn RegionAssembler,
    panel: &Panel,
    config: &RunConfig,
) -> Result<ComparisonReport, PipelineError> {
    check_config(panel, config)?;
    let pools = PoolPlan::new(config.threads).build()?;
    build_report(first, second, panel, config, &pools)
}

/// Compare a child against both parents and attribute each chromosome to the closer one
pub fn compare_trio(
    father: &dyn RegionAssembler,
    mother: &dyn RegionAssembler,
    child: &dyn RegionAssembler,
    panel: &Panel,
    config: &RunConfig,
) -> Result<TrioReport, PipelineError> {
    check_config(panel, config)?;
    if config.mode == ComparisonMode::Str {
        return Err(PipelineError::Config(
            "trio comparison needs a sequence mode (edit or hamming)".to_string(),
        ));
    }

    let pools = PoolPlan::new(config.threads).build()?;
    let with_father = build_report(child, father, panel, config, &pools)?;
    let with_mother = build_report(child, mother, panel, config, &pools)?;
    Ok(TrioReport::new(with_father, with_mother))
}
