// outcome.rs - Per-region comparison results

use serde::Serialize;

use crate::error::OutcomeError;

/// Differences found between two paired sub-regions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    chromosome: String,
    gene: String,
    difference_count: u64,
    compared_length: u64,
}

impl EditOutcome {
    pub fn new(
        chromosome: impl Into<String>,
        gene: impl Into<String>,
        difference_count: u64,
        compared_length: u64,
    ) -> Result<Self, OutcomeError> {
        let chromosome = chromosome.into();
        let gene = gene.into();
        if difference_count > compared_length {
            return Err(OutcomeError::DifferencesExceedLength {
                chromosome,
                gene,
                differences: difference_count,
                length: compared_length,
            });
        }
        Ok(Self { chromosome, gene, difference_count, compared_length })
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn difference_count(&self) -> u64 {
        self.difference_count
    }

    pub fn compared_length(&self) -> u64 {
        self.compared_length
    }
}

/// Repeat-motif occurrences of one STR marker in both persons
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MotifOutcome {
    pub marker_name: String,
    pub first_count: u64,
    pub second_count: u64,
}

impl MotifOutcome {
    pub fn new(marker_name: impl Into<String>, first_count: u64, second_count: u64) -> Self {
        Self {
            marker_name: marker_name.into(),
            first_count,
            second_count,
        }
    }
}

/// Result of one comparison task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Edit(EditOutcome),
    Motif(MotifOutcome),
}

impl ComparisonOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            ComparisonOutcome::Edit(_) => "edit",
            ComparisonOutcome::Motif(_) => "motif",
        }
    }
}

impl From<EditOutcome> for ComparisonOutcome {
    fn from(outcome: EditOutcome) -> Self {
        ComparisonOutcome::Edit(outcome)
    }
}

impl From<MotifOutcome> for ComparisonOutcome {
    fn from(outcome: MotifOutcome) -> Self {
        ComparisonOutcome::Motif(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_outcome_bounds() {
        let ok = EditOutcome::new("chr1", "GENE", 3, 10).unwrap();
        assert_eq!(ok.difference_count(), 3);
        assert_eq!(ok.compared_length(), 10);

        let err = EditOutcome::new("chr1", "GENE", 11, 10);
        assert!(matches!(err, Err(OutcomeError::DifferencesExceedLength { differences: 11, .. })));
    }

    #[test]
    fn test_outcome_kind() {
        let edit: ComparisonOutcome = EditOutcome::new("chr1", "G", 0, 0).unwrap().into();
        let motif: ComparisonOutcome = MotifOutcome::new("DYS19", 3, 4).into();
        assert_eq!(edit.kind(), "edit");
        assert_eq!(motif.kind(), "motif");
    }
}
