// aggregate.rs - Folding comparison outcomes into per-chromosome and per-marker statistics

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::classify::{
    chromosome_order, ChromosomeClass, KinshipSummary, MarkerOwner, SimilarityBands, StrVerdict,
    ThresholdPolicy,
};
use crate::core::mode::ComparisonMode;
use crate::core::outcome::{ComparisonOutcome, EditOutcome, MotifOutcome};
use crate::error::AggregateError;

/// Summed differences over a gene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSums {
    pub differences: u64,
    pub length: u64,
}

impl DiffSums {
    fn add(&mut self, other: DiffSums) {
        self.differences += other.differences;
        self.length += other.length;
    }

    /// `100 - differences / length * 100`, or `None` when nothing was compared
    pub fn similarity_percent(&self) -> Option<f64> {
        if self.length == 0 {
            None
        } else {
            Some(100.0 - (self.differences as f64 * 100.0) / self.length as f64)
        }
    }
}

/// Summed motif counts of one marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MotifSums {
    pub first: u64,
    pub second: u64,
}

/// Accumulated statistics for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateStats {
    /// chromosome -> gene -> sums
    Sequence(BTreeMap<String, BTreeMap<String, DiffSums>>),
    /// marker -> sums
    Motif(BTreeMap<String, MotifSums>),
}

impl AggregateStats {
    fn kind(&self) -> &'static str {
        match self {
            AggregateStats::Sequence(_) => "edit",
            AggregateStats::Motif(_) => "motif",
        }
    }
}

/// Accumulates outcomes of one mode. Sums are commutative, so outcomes may arrive
/// in any order and partial aggregators may be merged in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultAggregator {
    stats: AggregateStats,
    outcome_count: usize,
}

/// Similarity of one gene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneSimilarity {
    pub gene: String,
    pub differences: u64,
    pub length: u64,
    pub similarity: Option<f64>,
}

/// Similarity of one chromosome and its call under the threshold policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChromosomeSimilarity {
    pub chromosome: String,
    pub class: ChromosomeClass,
    pub differences: u64,
    pub length: u64,
    pub similarity: f64,
    pub threshold: f64,
    pub similar: bool,
    pub genes: Vec<GeneSimilarity>,
}

/// Edit/Hamming mode analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityAnalysis {
    pub chromosomes: Vec<ChromosomeSimilarity>,
    pub bands: SimilarityBands,
    pub summary: KinshipSummary,
}

impl SimilarityAnalysis {
    pub fn chromosome(&self, name: &str) -> Option<&ChromosomeSimilarity> {
        self.chromosomes.iter().find(|c| c.chromosome == name)
    }
}

/// Repeat counts of one marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerSummary {
    pub marker: String,
    pub first: u64,
    pub second: u64,
    pub owner: MarkerOwner,
    pub differs: bool,
}

/// STR mode analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerAnalysis {
    pub markers: Vec<MarkerSummary>,
    pub first_owned: usize,
    pub second_owned: usize,
    pub shared: usize,
    pub tolerance: u64,
    pub differing: usize,
    pub verdict: StrVerdict,
}

impl ResultAggregator {
    pub fn for_mode(mode: ComparisonMode) -> Self {
        let stats = if mode.is_sequence_diff() {
            AggregateStats::Sequence(BTreeMap::new())
        } else {
            AggregateStats::Motif(BTreeMap::new())
        };
        Self { stats, outcome_count: 0 }
    }

    pub fn outcome_count(&self) -> usize {
        self.outcome_count
    }

    pub fn is_empty(&self) -> bool {
        self.outcome_count == 0
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    /// Fold one outcome into its bucket
    pub fn add(&mut self, outcome: ComparisonOutcome) -> Result<(), AggregateError> {
        match (&mut self.stats, outcome) {
            (AggregateStats::Sequence(chromosomes), ComparisonOutcome::Edit(edit)) => {
                add_edit(chromosomes, &edit);
            }
            (AggregateStats::Motif(markers), ComparisonOutcome::Motif(motif)) => {
                add_motif(markers, &motif);
            }
            (stats, outcome) => {
                return Err(AggregateError::WrongOutcome {
                    expected: stats.kind(),
                    received: outcome.kind(),
                });
            }
        }
        self.outcome_count += 1;
        Ok(())
    }

    pub fn extend<I>(&mut self, outcomes: I) -> Result<(), AggregateError>
    where
        I: IntoIterator<Item = ComparisonOutcome>,
    {
        for outcome in outcomes {
            self.add(outcome)?;
        }
        Ok(())
    }

    /// Combine a partial aggregator of the same mode into this one
    pub fn merge(&mut self, other: ResultAggregator) -> Result<(), AggregateError> {
        match (&mut self.stats, other.stats) {
            (AggregateStats::Sequence(mine), AggregateStats::Sequence(theirs)) => {
                for (chromosome, genes) in theirs {
                    let bucket = mine.entry(chromosome).or_default();
                    for (gene, sums) in genes {
                        bucket.entry(gene).or_default().add(sums);
                    }
                }
            }
            (AggregateStats::Motif(mine), AggregateStats::Motif(theirs)) => {
                for (marker, sums) in theirs {
                    let bucket = mine.entry(marker).or_default();
                    bucket.first += sums.first;
                    bucket.second += sums.second;
                }
            }
            (stats, theirs) => {
                return Err(AggregateError::WrongOutcome {
                    expected: stats.kind(),
                    received: theirs.kind(),
                });
            }
        }
        self.outcome_count += other.outcome_count;
        Ok(())
    }

    /// Per-chromosome similarity and kinship call (edit and Hamming modes)
    pub fn analyze_similarity(&self, policy: ThresholdPolicy) -> Result<SimilarityAnalysis, AggregateError> {
        let chromosomes = match &self.stats {
            AggregateStats::Sequence(chromosomes) => chromosomes,
            AggregateStats::Motif(_) => {
                return Err(AggregateError::WrongOutcome {
                    expected: "edit",
                    received: "motif",
                });
            }
        };
        if self.outcome_count == 0 {
            return Err(AggregateError::NoData);
        }

        let mut results = Vec::with_capacity(chromosomes.len());
        for (chromosome, genes) in chromosomes {
            let mut total = DiffSums::default();
            for sums in genes.values() {
                total.add(*sums);
            }
            let Some(similarity) = total.similarity_percent() else {
                continue;
            };

            let class = ChromosomeClass::from_name(chromosome);
            results.push(ChromosomeSimilarity {
                chromosome: chromosome.clone(),
                class,
                differences: total.differences,
                length: total.length,
                similarity,
                threshold: policy.threshold_for(class),
                similar: policy.is_similar(class, similarity),
                genes: genes
                    .iter()
                    .map(|(gene, sums)| GeneSimilarity {
                        gene: gene.clone(),
                        differences: sums.differences,
                        length: sums.length,
                        similarity: sums.similarity_percent(),
                    })
                    .collect(),
            });
        }

        if results.is_empty() {
            return Err(AggregateError::NoData);
        }
        results.sort_by(|a, b| chromosome_order(&a.chromosome, &b.chromosome));

        let bands = SimilarityBands::count(policy, results.iter().map(|c| c.similarity));
        let summary = KinshipSummary::from_calls(policy, results.iter().map(|c| (c.class, c.similar)));
        Ok(SimilarityAnalysis {
            chromosomes: results,
            bands,
            summary,
        })
    }

    /// Marker ownership and father/son call (STR mode)
    pub fn analyze_markers(&self, tolerance: u64) -> Result<MarkerAnalysis, AggregateError> {
        let markers = match &self.stats {
            AggregateStats::Motif(markers) => markers,
            AggregateStats::Sequence(_) => {
                return Err(AggregateError::WrongOutcome {
                    expected: "motif",
                    received: "edit",
                });
            }
        };
        if markers.is_empty() {
            return Err(AggregateError::NoData);
        }

        let summaries: Vec<MarkerSummary> = markers
            .iter()
            .map(|(marker, sums)| MarkerSummary {
                marker: marker.clone(),
                first: sums.first,
                second: sums.second,
                owner: MarkerOwner::from_counts(sums.first, sums.second),
                differs: sums.first.abs_diff(sums.second) > tolerance,
            })
            .collect();

        let count = |owner: MarkerOwner| summaries.iter().filter(|m| m.owner == owner).count();
        let first_owned = count(MarkerOwner::First);
        let second_owned = count(MarkerOwner::Second);
        let shared = count(MarkerOwner::Shared);
        let differing = summaries.iter().filter(|m| m.differs).count();

        Ok(MarkerAnalysis {
            markers: summaries,
            first_owned,
            second_owned,
            shared,
            tolerance,
            differing,
            verdict: if differing == 0 {
                StrVerdict::FatherAndSon
            } else {
                StrVerdict::NotFatherAndSon
            },
        })
    }
}

fn add_edit(chromosomes: &mut BTreeMap<String, BTreeMap<String, DiffSums>>, edit: &EditOutcome) {
    let sums = chromosomes
        .entry(edit.chromosome().to_string())
        .or_default()
        .entry(edit.gene().to_string())
        .or_default();
    sums.add(DiffSums {
        differences: edit.difference_count(),
        length: edit.compared_length(),
    });
}

fn add_motif(markers: &mut BTreeMap<String, MotifSums>, motif: &MotifOutcome) {
    let sums = markers.entry(motif.marker_name.clone()).or_default();
    sums.first += motif.first_count;
    sums.second += motif.second_count;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::KinshipVerdict;

    fn edit(chrom: &str, gene: &str, diffs: u64, len: u64) -> ComparisonOutcome {
        EditOutcome::new(chrom, gene, diffs, len).unwrap().into()
    }

    fn motif(marker: &str, first: u64, second: u64) -> ComparisonOutcome {
        MotifOutcome::new(marker, first, second).into()
    }

    #[test]
    fn test_tiered_scenario_98_20_1() {
        let mut aggregator = ResultAggregator::for_mode(ComparisonMode::EditDistance);
        aggregator
            .extend([
                edit("chrM", "MT-CO1", 2, 100),
                edit("chrX", "DMD", 80, 100),
                edit("chr1", "BRCA1", 99, 100),
            ])
            .unwrap();

        let analysis = aggregator.analyze_similarity(ThresholdPolicy::tiered_default()).unwrap();
        let mt = analysis.chromosome("chrM").unwrap();
        assert!((mt.similarity - 98.0).abs() < 1e-9);
        assert!(mt.similar);
        assert!(!analysis.chromosome("chrX").unwrap().similar);
        assert!(!analysis.chromosome("chr1").unwrap().similar);

        assert_eq!(analysis.summary.similar, 1);
        assert_eq!(analysis.summary.non_similar, 2);
        assert_eq!(analysis.summary.verdict, KinshipVerdict::NotParentAndChild);
    }

    #[test]
    fn test_single_threshold_scheme() {
        let mut aggregator = ResultAggregator::for_mode(ComparisonMode::Hamming);
        aggregator
            .extend([
                edit("chr1", "A", 1, 1000),
                edit("chr2", "B", 2, 1000),
                edit("chr3", "C", 4, 1000),
            ])
            .unwrap();

        let analysis = aggregator.analyze_similarity(ThresholdPolicy::single_default()).unwrap();
        // 99.9 and 99.8 pass the 99.7 cutoff, 99.6 does not
        assert_eq!(analysis.summary.similar, 2);
        assert_eq!(analysis.summary.non_similar, 1);
        assert_eq!(analysis.summary.verdict, KinshipVerdict::ParentAndChild);
    }

    #[test]
    fn test_gene_buckets_accumulate() {
        let mut aggregator = ResultAggregator::for_mode(ComparisonMode::EditDistance);
        aggregator
            .extend([
                edit("chr1", "A", 1, 20),
                edit("chr1", "A", 1, 20),
                edit("chr1", "B", 0, 10),
            ])
            .unwrap();
        assert_eq!(aggregator.outcome_count(), 3);

        let analysis = aggregator.analyze_similarity(ThresholdPolicy::default()).unwrap();
        let chr1 = analysis.chromosome("chr1").unwrap();
        assert_eq!(chr1.differences, 2);
        assert_eq!(chr1.length, 50);
        assert!((chr1.similarity - 96.0).abs() < 1e-9);
        assert_eq!(chr1.genes.len(), 2);
        assert_eq!(chr1.genes[0].gene, "A");
        assert_eq!(chr1.genes[0].length, 40);
    }

    #[test]
    fn test_order_independent_totals() {
        let outcomes = vec![
            edit("chr1", "A", 3, 20),
            edit("chr2", "B", 0, 20),
            edit("chr1", "C", 1, 15),
            edit("chrX", "D", 7, 20),
            edit("chr2", "B", 2, 18),
        ];

        let mut forward = ResultAggregator::for_mode(ComparisonMode::EditDistance);
        forward.extend(outcomes.clone()).unwrap();

        let mut backward = ResultAggregator::for_mode(ComparisonMode::EditDistance);
        backward.extend(outcomes.iter().rev().cloned()).unwrap();

        let mut merged = ResultAggregator::for_mode(ComparisonMode::EditDistance);
        let mut part = ResultAggregator::for_mode(ComparisonMode::EditDistance);
        part.extend(outcomes[3..].iter().cloned()).unwrap();
        merged.merge(part).unwrap();
        merged.extend(outcomes[..3].iter().cloned()).unwrap();

        let policy = ThresholdPolicy::default();
        let expected = forward.analyze_similarity(policy).unwrap();
        assert_eq!(expected, backward.analyze_similarity(policy).unwrap());
        assert_eq!(expected, merged.analyze_similarity(policy).unwrap());
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_zero_length_chromosomes_skipped() {
        let mut aggregator = ResultAggregator::for_mode(ComparisonMode::EditDistance);
        aggregator.extend([edit("chr1", "A", 0, 0), edit("chr2", "B", 0, 10)]).unwrap();
        let analysis = aggregator.analyze_similarity(ThresholdPolicy::default()).unwrap();
        assert_eq!(analysis.chromosomes.len(), 1);
        assert_eq!(analysis.chromosomes[0].chromosome, "chr2");

        let mut only_empty = ResultAggregator::for_mode(ComparisonMode::EditDistance);
        only_empty.add(edit("chr1", "A", 0, 0)).unwrap();
        assert_eq!(
            only_empty.analyze_similarity(ThresholdPolicy::default()),
            Err(AggregateError::NoData)
        );
    }

    #[test]
    fn test_empty_aggregator_has_no_data() {
        let aggregator = ResultAggregator::for_mode(ComparisonMode::EditDistance);
        assert_eq!(
            aggregator.analyze_similarity(ThresholdPolicy::default()),
            Err(AggregateError::NoData)
        );

        let markers = ResultAggregator::for_mode(ComparisonMode::Str);
        assert_eq!(markers.analyze_markers(1), Err(AggregateError::NoData));
    }

    #[test]
    fn test_wrong_outcome_rejected() {
        let mut aggregator = ResultAggregator::for_mode(ComparisonMode::EditDistance);
        let result = aggregator.add(motif("DYS19", 1, 1));
        assert_eq!(
            result,
            Err(AggregateError::WrongOutcome {
                expected: "edit",
                received: "motif"
            })
        );
        assert!(aggregator.is_empty());

        let mut markers = ResultAggregator::for_mode(ComparisonMode::Str);
        assert!(markers.add(edit("chr1", "A", 0, 1)).is_err());
        assert!(markers.merge(aggregator).is_err());
    }

    #[test]
    fn test_marker_analysis() {
        let mut aggregator = ResultAggregator::for_mode(ComparisonMode::Str);
        aggregator
            .extend([
                motif("DYS19", 10, 10),
                motif("DYS390", 12, 11),
                motif("DYS391", 9, 12),
                motif("DYS391", 1, 0),
            ])
            .unwrap();

        let analysis = aggregator.analyze_markers(1).unwrap();
        assert_eq!(analysis.markers.len(), 3);
        assert_eq!(analysis.shared, 1);
        assert_eq!(analysis.first_owned, 1);
        assert_eq!(analysis.second_owned, 1);

        let dys391 = analysis.markers.iter().find(|m| m.marker == "DYS391").unwrap();
        assert_eq!((dys391.first, dys391.second), (10, 12));
        assert!(dys391.differs);
        assert_eq!(analysis.differing, 1);
        assert_eq!(analysis.verdict, StrVerdict::NotFatherAndSon);
    }

    #[test]
    fn test_marker_analysis_within_tolerance() {
        let mut aggregator = ResultAggregator::for_mode(ComparisonMode::Str);
        aggregator.extend([motif("DYS19", 10, 11), motif("DYS390", 7, 7)]).unwrap();

        let analysis = aggregator.analyze_markers(1).unwrap();
        assert_eq!(analysis.differing, 0);
        assert_eq!(analysis.verdict, StrVerdict::FatherAndSon);

        let strict = aggregator.analyze_markers(0).unwrap();
        assert_eq!(strict.verdict, StrVerdict::NotFatherAndSon);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const CHROMOSOMES: [&str; 4] = ["chr1", "chr2", "chrX", "chrM"];
        const GENES: [&str; 3] = ["A", "B", "C"];

        fn outcome() -> impl Strategy<Value = ComparisonOutcome> {
            (0..CHROMOSOMES.len(), 0..GENES.len(), 1u64..50, any::<u64>()).prop_map(|(c, g, len, d)| {
                edit(CHROMOSOMES[c], GENES[g], d % (len + 1), len)
            })
        }

        fn outcomes_and_shuffle() -> impl Strategy<Value = (Vec<ComparisonOutcome>, Vec<ComparisonOutcome>)> {
            prop::collection::vec(outcome(), 1..60)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        }

        proptest! {
            #[test]
            fn prop_aggregation_order_independent((outcomes, shuffled) in outcomes_and_shuffle(), split in 0usize..60) {
                let mut forward = ResultAggregator::for_mode(ComparisonMode::EditDistance);
                forward.extend(outcomes.clone()).unwrap();

                let mut reordered = ResultAggregator::for_mode(ComparisonMode::EditDistance);
                reordered.extend(shuffled.clone()).unwrap();
                prop_assert_eq!(&forward, &reordered);

                let split = split.min(shuffled.len());
                let mut merged = ResultAggregator::for_mode(ComparisonMode::EditDistance);
                let mut part = ResultAggregator::for_mode(ComparisonMode::EditDistance);
                part.extend(shuffled[split..].iter().cloned()).unwrap();
                merged.extend(shuffled[..split].iter().cloned()).unwrap();
                merged.merge(part).unwrap();
                prop_assert_eq!(&forward, &merged);

                let policy = ThresholdPolicy::default();
                prop_assert_eq!(
                    forward.analyze_similarity(policy).unwrap(),
                    merged.analyze_similarity(policy).unwrap()
                );
            }
        }
    }
}
