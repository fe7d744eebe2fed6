// region.rs - Assembled consensus sequence for one person over one interval

use crate::error::RegionError;
use std::fmt;

/// Sentinel for an uncalled base
pub const UNKNOWN_BASE: u8 = b'*';

/// Consensus sequence with per-base quality, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledRegion {
    chromosome: String,
    gene: String,
    start: u64,
    sequence: Vec<u8>,
    quality: Vec<u8>,
}

impl AssembledRegion {
    pub fn new(
        chromosome: impl Into<String>,
        gene: impl Into<String>,
        start: u64,
        sequence: Vec<u8>,
        quality: Vec<u8>,
    ) -> Result<Self, RegionError> {
        if sequence.len() != quality.len() {
            return Err(RegionError::QualityLength {
                sequence: sequence.len(),
                quality: quality.len(),
            });
        }
        if let Some((offset, &base)) = sequence
            .iter()
            .enumerate()
            .find(|&(_, &b)| !matches!(b, b'A' | b'C' | b'G' | b'T' | UNKNOWN_BASE))
        {
            return Err(RegionError::InvalidBase { base: base as char, offset });
        }

        Ok(Self {
            chromosome: chromosome.into(),
            gene: gene.into(),
            start,
            sequence,
            quality,
        })
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    pub fn quality(&self) -> &[u8] {
        &self.quality
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Number of uncalled positions
    pub fn unknown_bases(&self) -> usize {
        self.sequence.iter().filter(|&&b| b == UNKNOWN_BASE).count()
    }

    /// Two regions are comparable when they cover the same chromosome, gene and start
    pub fn is_paired_with(&self, other: &AssembledRegion) -> bool {
        self.chromosome == other.chromosome && self.gene == other.gene && self.start == other.start
    }
}

impl fmt::Display for AssembledRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({}, {} bp)", self.chromosome, self.start, self.gene, self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_length_must_match() {
        let result = AssembledRegion::new("chr1", "G", 0, b"ACGT".to_vec(), vec![30; 3]);
        assert_eq!(result, Err(RegionError::QualityLength { sequence: 4, quality: 3 }));
    }

    #[test]
    fn test_alphabet_checked() {
        let result = AssembledRegion::new("chr1", "G", 0, b"ACNT".to_vec(), vec![30; 4]);
        assert_eq!(result, Err(RegionError::InvalidBase { base: 'N', offset: 2 }));

        let ok = AssembledRegion::new("chr1", "G", 0, b"AC*T".to_vec(), vec![30, 30, 0, 30]).unwrap();
        assert_eq!(ok.unknown_bases(), 1);
        assert_eq!(ok.len(), 4);
    }

    #[test]
    fn test_pairing_contract() {
        let a = AssembledRegion::new("chr1", "G", 10, b"AC".to_vec(), vec![1, 1]).unwrap();
        let b = AssembledRegion::new("chr1", "G", 10, b"TT".to_vec(), vec![1, 1]).unwrap();
        let c = AssembledRegion::new("chr1", "G", 30, b"AC".to_vec(), vec![1, 1]).unwrap();
        let d = AssembledRegion::new("chr2", "G", 10, b"AC".to_vec(), vec![1, 1]).unwrap();

        assert!(a.is_paired_with(&b));
        assert!(!a.is_paired_with(&c));
        assert!(!a.is_paired_with(&d));
    }
}
