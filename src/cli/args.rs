// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// exome-kinship - Kinship inference from per-person consensus sequences
pub struct Args {
    /// consensus FASTA/FASTQ of the first person (pairwise mode)
    #[argh(option)]
    pub first: Option<String>,

    /// consensus FASTA/FASTQ of the second person (pairwise mode)
    #[argh(option)]
    pub second: Option<String>,

    /// consensus FASTA/FASTQ of the father (trio mode)
    #[argh(option)]
    pub father: Option<String>,

    /// consensus FASTA/FASTQ of the mother (trio mode)
    #[argh(option)]
    pub mother: Option<String>,

    /// consensus FASTA/FASTQ of the child (trio mode)
    #[argh(option)]
    pub child: Option<String>,

    /// panel file: BED intervals, or a marker table (chrom, start, end, name, motif) in str mode
    #[argh(option)]
    pub panel: Option<String>,

    /// output report file (default: stdout)
    #[argh(option)]
    pub output: Option<String>,

    /// comparison mode: edit, hamming, str (default: edit)
    #[argh(option, default = "String::from(\"edit\")")]
    pub mode: String,

    /// output format: text, tsv, json (default: text)
    #[argh(option, default = "String::from(\"text\")")]
    pub format: String,

    /// threshold scheme: single, tiered (default: tiered)
    #[argh(option, default = "String::from(\"tiered\")")]
    pub threshold_scheme: String,

    /// similarity percent required per chromosome in the single scheme (default: 99.7)
    #[argh(option)]
    pub single_threshold: Option<f64>,

    /// mitochondrial similarity percent in the tiered scheme (default: 98)
    #[argh(option)]
    pub mt_threshold: Option<f64>,

    /// similarity percent for X/Y in the tiered scheme (default: 45)
    #[argh(option)]
    pub x_threshold: Option<f64>,

    /// autosomal similarity percent in the tiered scheme (default: 45)
    #[argh(option)]
    pub autosomal_threshold: Option<f64>,

    /// repeat-count difference tolerated per STR marker (default: 1)
    #[argh(option)]
    pub str_tolerance: Option<u64>,

    /// maximum sub-region length in bases (default: 20)
    #[argh(option)]
    pub max_region_length: Option<u64>,

    /// number of features processed at once (default: 2)
    #[argh(option)]
    pub threads: Option<usize>,

    /// phred quality assigned to FASTA bases (default: 30)
    #[argh(option)]
    pub default_quality: Option<u8>,

    /// include only genes/markers matching regex pattern
    #[argh(option)]
    pub include_genes: Option<String>,

    /// exclude genes/markers matching regex pattern
    #[argh(option)]
    pub exclude_genes: Option<String>,

    /// comma-separated chromosomes to keep (e.g. chr1,chrX,chrM)
    #[argh(option)]
    pub chromosomes: Option<String>,

    /// keep only chromosomes listed in a file (one per line)
    #[argh(option)]
    pub chromosomes_list: Option<String>,

    /// show a progress bar
    #[argh(switch)]
    pub progress: bool,

    /// enable debug logging
    #[argh(switch, short = 'v')]
    pub verbose: bool,

    /// validate inputs and load the panel without comparing
    #[argh(switch)]
    pub dry_run: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}

impl Args {
    /// Whether father, mother or child was given
    pub fn is_trio(&self) -> bool {
        self.father.is_some() || self.mother.is_some() || self.child.is_some()
    }
}
