// pipeline.rs - Per-feature split, assemble, validate and compare stages

use rayon::ThreadPool;
use tracing::{debug, warn};

use crate::core::distance::ComparisonEngine;
use crate::core::mode::ComparisonMode;
use crate::core::outcome::ComparisonOutcome;
use crate::core::tasks::TaskGroup;
use crate::data::{AssembledRegion, Feature, GenomicInterval, RegionAssembler};
use crate::error::{AssemblyError, FeatureError};

/// Everything a feature task needs, shared by reference across the feature pool
pub struct FeatureContext<'a> {
    pub first: &'a dyn RegionAssembler,
    pub second: &'a dyn RegionAssembler,
    pub engine: ComparisonEngine,
    pub max_region_length: u64,
    pub compare_pool: &'a ThreadPool,
}

/// Sub-intervals processed for `feature` under `mode`
pub fn sub_intervals(feature: &Feature, mode: ComparisonMode, max_region_length: u64) -> Vec<GenomicInterval> {
    if mode.splits_regions() {
        feature.interval().split(max_region_length)
    } else {
        vec![feature.interval().clone()]
    }
}

/// Assemble every interval, dropping the ones the person has no data for
fn assemble_all(
    assembler: &dyn RegionAssembler,
    intervals: &[GenomicInterval],
) -> Result<Vec<AssembledRegion>, AssemblyError> {
    intervals
        .iter()
        .filter_map(|interval| assembler.assemble(interval).transpose())
        .collect()
}

/// Check both persons produced the same sub-regions in the same order
fn validate_pairs(
    feature: &Feature,
    first: &[AssembledRegion],
    second: &[AssembledRegion],
) -> Result<(), FeatureError> {
    if first.len() != second.len() {
        return Err(FeatureError::AssemblyMismatch {
            feature: feature.name().to_string(),
            first: first.len(),
            second: second.len(),
        });
    }
    for (index, (a, b)) in first.iter().zip(second).enumerate() {
        if !a.is_paired_with(b) {
            return Err(FeatureError::PairingMismatch {
                feature: feature.name().to_string(),
                index,
                first: a.to_string(),
                second: b.to_string(),
            });
        }
    }
    Ok(())
}

/// Run one feature through the pipeline and return its outcomes in completion order.
///
/// The two assemblies run side by side, then each sub-region pair becomes one task
/// on the comparison pool. The first failing comparison cancels its unstarted
/// siblings and is returned wrapped in [`FeatureError::Comparison`].
pub fn process_feature(ctx: &FeatureContext<'_>, feature: &Feature) -> Result<Vec<ComparisonOutcome>, FeatureError> {
    let intervals = sub_intervals(feature, ctx.engine.mode(), ctx.max_region_length);
    debug!("{}: {} sub-region(s)", feature, intervals.len());

    let (first, second) = rayon::join(
        || assemble_all(ctx.first, &intervals),
        || assemble_all(ctx.second, &intervals),
    );
    let wrap = |source| FeatureError::Assembly {
        feature: feature.name().to_string(),
        source,
    };
    let first = first.map_err(wrap)?;
    let second = second.map_err(wrap)?;

    validate_pairs(feature, &first, &second)?;
    if first.is_empty() {
        warn!("{}: no assembled data for either person", feature);
        return Ok(Vec::new());
    }

    let pairs: Vec<(AssembledRegion, AssembledRegion)> = first.into_iter().zip(second).collect();
    let group = TaskGroup::new(ctx.compare_pool);
    let outcome = group.run(
        pairs,
        |index, (a, b)| {
            debug!("{}: comparing sub-region {} at {}", feature.name(), index, a.start());
            ctx.engine.compare(feature, &a, &b)
        },
        |_| true,
    );

    if let Some((index, source)) = outcome.errors.into_iter().next() {
        return Err(FeatureError::Comparison {
            feature: feature.name().to_string(),
            index,
            cancelled: outcome.cancelled,
            source,
        });
    }

    Ok(outcome
        .completed
        .into_iter()
        .filter_map(|(_, outcome)| outcome)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::interval::MarkerInterval;
    use crate::data::ConsensusSequences;
    use crate::error::CompareError;
    use rayon::ThreadPoolBuilder;

    fn pool() -> ThreadPool {
        ThreadPoolBuilder::new().num_threads(2).build().unwrap()
    }

    fn person(name: &str, contig: &str, seq: &[u8]) -> ConsensusSequences {
        let mut person = ConsensusSequences::new(name);
        person.insert_contig(contig, seq, None, 30);
        person
    }

    fn gene(chrom: &str, start: u64, end: u64) -> Feature {
        Feature::Gene(GenomicInterval::new(chrom, start, end, "GENE").unwrap())
    }

    /// Fails every assembly, standing in for an unreadable input
    #[derive(Debug)]
    struct BrokenAssembler;

    impl RegionAssembler for BrokenAssembler {
        fn name(&self) -> &str {
            "broken"
        }

        fn assemble(&self, _interval: &GenomicInterval) -> Result<Option<AssembledRegion>, AssemblyError> {
            Err(AssemblyError::Format {
                path: "broken.fa".into(),
                message: "truncated record".to_string(),
            })
        }
    }

    #[test]
    fn test_sub_intervals_split_only_sequence_modes() {
        let feature = gene("chr1", 0, 45);
        assert_eq!(sub_intervals(&feature, ComparisonMode::EditDistance, 20).len(), 3);
        assert_eq!(sub_intervals(&feature, ComparisonMode::Str, 20).len(), 1);
    }

    #[test]
    fn test_process_feature_collects_all_sub_regions() {
        let first = person("a", "chr1", &[b'A'; 45]);
        let mut second_seq = vec![b'A'; 45];
        second_seq[0] = b'C';
        second_seq[44] = b'G';
        let second = person("b", "chr1", &second_seq);
        let pool = pool();
        let ctx = FeatureContext {
            first: &first,
            second: &second,
            engine: ComparisonEngine::new(ComparisonMode::EditDistance),
            max_region_length: 20,
            compare_pool: &pool,
        };

        let outcomes = process_feature(&ctx, &gene("chr1", 0, 45)).unwrap();
        assert_eq!(outcomes.len(), 3);
        let (diffs, length) = outcomes.iter().fold((0, 0), |(d, l), o| match o {
            ComparisonOutcome::Edit(e) => (d + e.difference_count(), l + e.compared_length()),
            ComparisonOutcome::Motif(_) => (d, l),
        });
        assert_eq!(diffs, 2);
        assert_eq!(length, 45);
    }

    #[test]
    fn test_missing_contig_is_a_mismatch() {
        let first = person("a", "chr1", &[b'A'; 30]);
        let second = person("b", "chr2", &[b'A'; 30]);
        let pool = pool();
        let ctx = FeatureContext {
            first: &first,
            second: &second,
            engine: ComparisonEngine::new(ComparisonMode::Hamming),
            max_region_length: 20,
            compare_pool: &pool,
        };

        let err = process_feature(&ctx, &gene("chr1", 0, 30)).unwrap_err();
        assert!(matches!(err, FeatureError::AssemblyMismatch { first: 2, second: 0, .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_assembly_failure_is_fatal() {
        let first = person("a", "chr1", &[b'A'; 30]);
        let pool = pool();
        let ctx = FeatureContext {
            first: &first,
            second: &BrokenAssembler,
            engine: ComparisonEngine::new(ComparisonMode::Hamming),
            max_region_length: 20,
            compare_pool: &pool,
        };

        let err = process_feature(&ctx, &gene("chr1", 0, 30)).unwrap_err();
        assert!(matches!(err, FeatureError::Assembly { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_comparison_failure_is_wrapped() {
        let first = person("a", "chrY", b"CACACAGT");
        let second = person("b", "chrY", b"CACAGTGT");
        let pool = pool();
        let ctx = FeatureContext {
            first: &first,
            second: &second,
            engine: ComparisonEngine::new(ComparisonMode::Str),
            max_region_length: 20,
            compare_pool: &pool,
        };
        let marker = Feature::Marker(MarkerInterval::new("chrY", 0, 8, "DYS1", "CA").unwrap());
        let outcomes = process_feature(&ctx, &marker).unwrap();
        assert_eq!(outcomes.len(), 1);

        // A plain gene feature in STR mode has no motif to count
        let err = process_feature(&ctx, &gene("chrY", 0, 8)).unwrap_err();
        match err {
            FeatureError::Comparison { index, source, .. } => {
                assert_eq!(index, 0);
                assert!(matches!(source, CompareError::MissingMotif(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
