// distance.rs - Sequence distance engine

use regex::bytes::Regex;
use tracing::debug;

use crate::core::mode::ComparisonMode;
use crate::core::outcome::{ComparisonOutcome, EditOutcome, MotifOutcome};
use crate::data::interval::Feature;
use crate::data::region::{AssembledRegion, UNKNOWN_BASE};
use crate::error::CompareError;

/// Differences and the length they were measured over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceScore {
    pub differences: u64,
    pub compared_length: u64,
}

/// Remove unknown positions before alignment.
///
/// Within the overlap a position is dropped from both sequences when either base is
/// unknown. Past the end of the shorter sequence, the longer one keeps its known bases.
pub fn normalize(first: &[u8], second: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let overlap = first.len().min(second.len());
    let mut f = Vec::with_capacity(first.len());
    let mut s = Vec::with_capacity(second.len());

    for (&a, &b) in first.iter().zip(second.iter()) {
        if a != UNKNOWN_BASE && b != UNKNOWN_BASE {
            f.push(a);
            s.push(b);
        }
    }

    let (longer, out) = if first.len() > second.len() {
        (first, &mut f)
    } else {
        (second, &mut s)
    };
    out.extend(longer[overlap..].iter().filter(|&&b| b != UNKNOWN_BASE));

    (f, s)
}

/// Classic Levenshtein distance with two rolling rows sized on the shorter input
pub fn levenshtein(first: &[u8], second: &[u8]) -> u64 {
    let (outer, inner) = if first.len() >= second.len() {
        (first, second)
    } else {
        (second, first)
    };

    let mut previous: Vec<u64> = (0..=inner.len() as u64).collect();
    let mut current = vec![0u64; inner.len() + 1];

    for (i, &a) in outer.iter().enumerate() {
        current[0] = i as u64 + 1;
        for (j, &b) in inner.iter().enumerate() {
            let substitution = previous[j] + u64::from(a != b);
            let deletion = previous[j + 1] + 1;
            let insertion = current[j] + 1;
            current[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[inner.len()]
}

/// Edit distance between two raw sequences, ignoring unknown bases
pub fn edit_distance(first: &[u8], second: &[u8]) -> Result<DistanceScore, CompareError> {
    let (f, s) = normalize(first, second);
    if f.is_empty() || s.is_empty() {
        return Err(CompareError::EmptyAfterNormalization);
    }

    Ok(DistanceScore {
        differences: levenshtein(&f, &s),
        compared_length: f.len().max(s.len()) as u64,
    })
}

/// Watson-Crick complement; unknown and other symbols have none
pub fn complement(base: u8) -> Option<u8> {
    match base {
        b'A' => Some(b'T'),
        b'T' => Some(b'A'),
        b'G' => Some(b'C'),
        b'C' => Some(b'G'),
        _ => None,
    }
}

/// Position-wise mismatches between equal-length sequences.
///
/// A position only counts when the bases differ both directly and by complement.
pub fn hamming_distance(first: &[u8], second: &[u8]) -> Result<DistanceScore, CompareError> {
    if first.len() != second.len() {
        return Err(CompareError::LengthMismatch {
            first: first.len(),
            second: second.len(),
        });
    }

    let differences = first
        .iter()
        .zip(second.iter())
        .filter(|&(&a, &b)| a != b && complement(b) != Some(a))
        .count();

    Ok(DistanceScore {
        differences: differences as u64,
        compared_length: first.len() as u64,
    })
}

/// Leftmost non-overlapping occurrences of `motif`
pub fn count_motif(motif: &Regex, sequence: &[u8]) -> u64 {
    motif.find_iter(sequence).count() as u64
}

/// Applies the configured algorithm to one pair of sub-regions
#[derive(Debug, Clone, Copy)]
pub struct ComparisonEngine {
    mode: ComparisonMode,
}

impl ComparisonEngine {
    pub fn new(mode: ComparisonMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    /// Compare two paired regions of `feature`.
    ///
    /// Returns `Ok(None)` when nothing comparable is left, i.e. one side is entirely
    /// unknown in edit-distance mode.
    pub fn compare(
        &self,
        feature: &Feature,
        first: &AssembledRegion,
        second: &AssembledRegion,
    ) -> Result<Option<ComparisonOutcome>, CompareError> {
        if !first.is_paired_with(second) {
            return Err(CompareError::Unpaired {
                first: first.to_string(),
                second: second.to_string(),
            });
        }

        let score = match self.mode {
            ComparisonMode::EditDistance => {
                match edit_distance(first.sequence(), second.sequence()) {
                    Ok(score) => score,
                    Err(CompareError::EmptyAfterNormalization) => {
                        debug!("Skipping {}: no called bases to compare", first);
                        return Ok(None);
                    }
                    Err(e) => return Err(e),
                }
            }
            ComparisonMode::Hamming => hamming_distance(first.sequence(), second.sequence())?,
            ComparisonMode::Str => {
                let motif = feature
                    .motif()
                    .ok_or_else(|| CompareError::MissingMotif(feature.name().to_string()))?;
                let outcome = MotifOutcome::new(
                    feature.name(),
                    count_motif(motif, first.sequence()),
                    count_motif(motif, second.sequence()),
                );
                return Ok(Some(outcome.into()));
            }
        };

        let outcome = EditOutcome::new(
            first.chromosome(),
            first.gene(),
            score.differences,
            score.compared_length,
        )?;
        Ok(Some(outcome.into()))
    }
}
