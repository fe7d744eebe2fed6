// interval.rs - Panel intervals (genes and STR markers)

use crate::error::IntervalError;
use regex::bytes::Regex;
use std::fmt;

/// Longest sub-region compared as one task
pub const DEFAULT_MAX_REGION_LENGTH: u64 = 20;

/// Longest panel interval accepted; assembly pads every interval to its full length
pub const MAX_INTERVAL_LENGTH: u64 = 10_000_000;

/// Label given to STR markers on the Y chromosome
pub const Y_STR_LABEL: &str = "Y_STR";

/// Label given to every other STR marker
pub const X_STR_LABEL: &str = "X_STR";

fn is_valid_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+'))
}

/// Half-open genomic interval `[start, end)` with a gene or marker label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenomicInterval {
    chromosome: String,
    start: u64,
    end: u64,
    label: String,
}

impl GenomicInterval {
    pub fn new(
        chromosome: impl Into<String>,
        start: u64,
        end: u64,
        label: impl Into<String>,
    ) -> Result<Self, IntervalError> {
        let chromosome = chromosome.into();
        let label = label.into();

        if chromosome.is_empty() {
            return Err(IntervalError::EmptyChromosome);
        }
        if start >= end {
            return Err(IntervalError::InvertedBounds { chromosome, start, end });
        }
        if end - start > MAX_INTERVAL_LENGTH {
            return Err(IntervalError::TooLong {
                chromosome,
                start,
                end,
                max: MAX_INTERVAL_LENGTH,
            });
        }
        if !is_valid_name(&label) {
            return Err(IntervalError::InvalidName(label));
        }

        Ok(Self { chromosome, start, end, label })
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Always false: construction rejects empty intervals
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Split into consecutive sub-intervals of at most `max_length` bases.
    ///
    /// Intervals no longer than `max_length` are returned unchanged. When splitting,
    /// a trailing remainder of a single base is dropped.
    pub fn split(&self, max_length: u64) -> Vec<GenomicInterval> {
        let max_length = max_length.max(1);
        if self.len() <= max_length {
            return vec![self.clone()];
        }

        let mut pieces = Vec::with_capacity((self.len() / max_length + 1) as usize);
        let mut cursor = self.start;
        while cursor < self.end {
            let piece_end = (cursor + max_length).min(self.end);
            if piece_end - cursor > 1 || piece_end - cursor == max_length {
                pieces.push(GenomicInterval {
                    chromosome: self.chromosome.clone(),
                    start: cursor,
                    end: piece_end,
                    label: self.label.clone(),
                });
            }
            cursor = piece_end;
        }
        pieces
    }
}

impl fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{} ({})", self.chromosome, self.start, self.end, self.label)
    }
}

/// STR marker: an interval plus the repeat motif counted inside it
#[derive(Debug, Clone)]
pub struct MarkerInterval {
    interval: GenomicInterval,
    marker_name: String,
    repeat_motif: Regex,
}

impl MarkerInterval {
    pub fn new(
        chromosome: impl Into<String>,
        start: u64,
        end: u64,
        marker_name: impl Into<String>,
        motif: &str,
    ) -> Result<Self, IntervalError> {
        let chromosome = chromosome.into();
        let marker_name = marker_name.into();

        if !is_valid_name(&marker_name) {
            return Err(IntervalError::InvalidName(marker_name));
        }
        if motif.is_empty() {
            return Err(IntervalError::InvalidMotif {
                marker: marker_name,
                motif: motif.to_string(),
                reason: "empty pattern".to_string(),
            });
        }

        let repeat_motif = Regex::new(motif).map_err(|e| IntervalError::InvalidMotif {
            marker: marker_name.clone(),
            motif: motif.to_string(),
            reason: e.to_string(),
        })?;

        let label = if chromosome.contains('Y') { Y_STR_LABEL } else { X_STR_LABEL };
        let interval = GenomicInterval::new(chromosome, start, end, label)?;

        Ok(Self { interval, marker_name, repeat_motif })
    }

    pub fn interval(&self) -> &GenomicInterval {
        &self.interval
    }

    pub fn marker_name(&self) -> &str {
        &self.marker_name
    }

    pub fn repeat_motif(&self) -> &Regex {
        &self.repeat_motif
    }
}

/// One panel entry handed to the comparison pipeline
#[derive(Debug, Clone)]
pub enum Feature {
    Gene(GenomicInterval),
    Marker(MarkerInterval),
}

impl Feature {
    pub fn interval(&self) -> &GenomicInterval {
        match self {
            Feature::Gene(interval) => interval,
            Feature::Marker(marker) => marker.interval(),
        }
    }

    /// Gene label or marker name
    pub fn name(&self) -> &str {
        match self {
            Feature::Gene(interval) => interval.label(),
            Feature::Marker(marker) => marker.marker_name(),
        }
    }

    pub fn motif(&self) -> Option<&Regex> {
        match self {
            Feature::Gene(_) => None,
            Feature::Marker(marker) => Some(marker.repeat_motif()),
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, Feature::Marker(_))
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Gene(interval) => write!(f, "{}", interval),
            Feature::Marker(marker) => write!(
                f,
                "{}:{}-{} ({})",
                marker.interval.chromosome(),
                marker.interval.start(),
                marker.interval.end(),
                marker.marker_name
            ),
        }
    }
}
