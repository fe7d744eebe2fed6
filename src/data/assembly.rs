// assembly.rs - Region assembly interface and the consensus-file implementation

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use bio::io::{fasta, fastq};
use tracing::info;

use crate::data::interval::GenomicInterval;
use crate::data::region::{AssembledRegion, UNKNOWN_BASE};
use crate::error::AssemblyError;

/// Phred quality assigned to FASTA bases, which carry no quality of their own
pub const DEFAULT_FASTA_QUALITY: u8 = 30;

/// Source of per-person consensus sequence over panel intervals.
///
/// Implementations must be callable from several threads at once. Returning
/// `Ok(None)` means the person has no data over the interval; the pipeline then
/// notices the unequal region counts and skips the feature.
pub trait RegionAssembler: Send + Sync + Debug {
    /// Person or sample name used in logs and reports
    fn name(&self) -> &str;

    /// Reconstruct the consensus over `interval`
    fn assemble(&self, interval: &GenomicInterval) -> Result<Option<AssembledRegion>, AssemblyError>;
}

#[derive(Debug, Clone)]
struct ContigConsensus {
    sequence: Vec<u8>,
    quality: Vec<u8>,
}

/// Whole-contig consensus sequences of one person, typically the FASTA or FASTQ
/// written by `samtools consensus`
#[derive(Debug, Clone)]
pub struct ConsensusSequences {
    name: String,
    contigs: HashMap<String, ContigConsensus>,
}

impl ConsensusSequences {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contigs: HashMap::new(),
        }
    }

    /// Add one contig. Bases other than A, C, G, T become unknown with quality 0.
    pub fn insert_contig(
        &mut self,
        contig: impl Into<String>,
        sequence: &[u8],
        quality: Option<&[u8]>,
        default_quality: u8,
    ) {
        let mut bases = Vec::with_capacity(sequence.len());
        let mut quals = Vec::with_capacity(sequence.len());

        for (i, &raw) in sequence.iter().enumerate() {
            let base = raw.to_ascii_uppercase();
            if matches!(base, b'A' | b'C' | b'G' | b'T') {
                bases.push(base);
                quals.push(quality.and_then(|q| q.get(i).copied()).unwrap_or(default_quality));
            } else {
                bases.push(UNKNOWN_BASE);
                quals.push(0);
            }
        }

        self.contigs.insert(
            contig.into(),
            ContigConsensus {
                sequence: bases,
                quality: quals,
            },
        );
    }

    /// Load from a FASTA (`.fa`, `.fasta`, `.fna`) or FASTQ (`.fq`, `.fastq`) file
    pub fn from_file(path: &Path, default_quality: u8) -> Result<Self, AssemblyError> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let is_fastq = matches!(
            path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).as_deref(),
            Some("fq" | "fastq")
        );

        let file = File::open(path).map_err(|source| AssemblyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut consensus = Self::new(name);
        if is_fastq {
            consensus.read_fastq(path, file)?;
        } else {
            consensus.read_fasta(path, file, default_quality)?;
        }

        if consensus.contigs.is_empty() {
            return Err(AssemblyError::Format {
                path: path.to_path_buf(),
                message: "no sequence records".to_string(),
            });
        }

        info!(
            "Loaded consensus for {}: {} contigs, {} bases",
            consensus.name,
            consensus.contigs.len(),
            consensus.total_bases()
        );
        Ok(consensus)
    }

    fn read_fasta(&mut self, path: &Path, file: File, default_quality: u8) -> Result<(), AssemblyError> {
        let reader = fasta::Reader::new(BufReader::new(file));
        for record in reader.records() {
            let record = record.map_err(|e| AssemblyError::Format {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            self.insert_contig(record.id(), record.seq(), None, default_quality);
        }
        Ok(())
    }

    fn read_fastq(&mut self, path: &Path, file: File) -> Result<(), AssemblyError> {
        let reader = fastq::Reader::new(BufReader::new(file));
        for record in reader.records() {
            let record = record.map_err(|e| AssemblyError::Format {
                path: PathBuf::from(path),
                message: e.to_string(),
            })?;
            let phred: Vec<u8> = record.qual().iter().map(|q| q.saturating_sub(33)).collect();
            self.insert_contig(record.id(), record.seq(), Some(&phred), 0);
        }
        Ok(())
    }

    /// Rename the person, e.g. after a role was assigned on the command line
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn contig_count(&self) -> usize {
        self.contigs.len()
    }

    pub fn total_bases(&self) -> usize {
        self.contigs.values().map(|c| c.sequence.len()).sum()
    }
}

impl RegionAssembler for ConsensusSequences {
    fn name(&self) -> &str {
        &self.name
    }

    fn assemble(&self, interval: &GenomicInterval) -> Result<Option<AssembledRegion>, AssemblyError> {
        let Some(contig) = self.contigs.get(interval.chromosome()) else {
            return Ok(None);
        };

        let start = interval.start() as usize;
        if start >= contig.sequence.len() {
            return Ok(None);
        }

        let end = interval.end() as usize;
        let covered_end = end.min(contig.sequence.len());

        let mut sequence = contig.sequence[start..covered_end].to_vec();
        let mut quality = contig.quality[start..covered_end].to_vec();
        sequence.resize(end - start, UNKNOWN_BASE);
        quality.resize(end - start, 0);

        AssembledRegion::new(interval.chromosome(), interval.label(), interval.start(), sequence, quality)
            .map(Some)
            .map_err(|source| AssemblyError::Region {
                interval: interval.to_string(),
                source,
            })
    }
}
