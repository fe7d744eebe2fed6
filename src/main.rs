// main.rs - CLI entry point

use std::path::Path;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use exome_kinship::cli::validation::Inputs;
use exome_kinship::cli::Config;
use exome_kinship::data::loaders::{load_bed_panel, load_marker_panel};
use exome_kinship::output::{write_report, Report};
use exome_kinship::prelude::*;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "exome_kinship=debug" } else { "exome_kinship=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_person(path: &str, role: Option<&str>, default_quality: u8) -> Result<ConsensusSequences, String> {
    let consensus = ConsensusSequences::from_file(Path::new(path), default_quality)
        .map_err(|e| format!("loading consensus '{}': {}", path, e))?;
    eprintln!(
        "🧬 {}: {} contigs, {} bases",
        path,
        consensus.contig_count(),
        consensus.total_bases()
    );
    Ok(match role {
        Some(role) => consensus.with_name(role),
        None => consensus,
    })
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        eprintln!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    init_logging(args.verbose);
    let validation = validate_args(&args)?;
    let run_config = validation.run_config.clone();

    eprintln!("🚀 exome-kinship v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("🔬 Mode: {}", run_config.mode.description());
    if run_config.mode.is_sequence_diff() {
        eprintln!("📏 Policy: {}", run_config.policy.description());
    } else {
        eprintln!("📏 STR tolerance: {}", run_config.str_tolerance);
    }
    eprintln!("🧵 Feature threads: {}", run_config.threads);

    let total_start = Instant::now();

    // Load and filter the panel
    let panel_path = Path::new(&validation.panel);
    let panel = if run_config.mode == ComparisonMode::Str {
        load_marker_panel(panel_path)
    } else {
        load_bed_panel(panel_path)
    }
    .map_err(|e| e.to_string())?;
    let filter = PanelFilter {
        include_names: validation.gene_include_regex.as_ref(),
        exclude_names: validation.gene_exclude_regex.as_ref(),
        chromosomes: validation.chromosomes.as_ref(),
    };
    let panel = panel.filtered(&filter);
    if panel.is_empty() {
        return Err("No panel features left after filtering".to_string());
    }
    eprintln!(
        "📋 Panel: {} features ({} markers), {} bases",
        panel.len(),
        panel.marker_count(),
        panel.total_bases()
    );

    if args.dry_run {
        eprintln!("✅ Dry run completed successfully");
        return Ok(());
    }

    let quality = validation.default_quality;
    let output = validation.output_path();
    match &validation.inputs {
        Inputs::Pair { first, second } => {
            let first = load_person(first, None, quality)?;
            let second = load_person(second, None, quality)?;
            let report = compare_two(&first, &second, &panel, &run_config).map_err(|e| e.to_string())?;
            eprintln!("🧾 {}", report.verdict_line());
            write_report(output, validation.format, Report::Pair(&report), &command_line)?;
        }
        Inputs::Trio { father, mother, child } => {
            let father = load_person(father, Some("father"), quality)?;
            let mother = load_person(mother, Some("mother"), quality)?;
            let child = load_person(child, Some("child"), quality)?;
            let report = compare_trio(&father, &mother, &child, &panel, &run_config).map_err(|e| e.to_string())?;
            eprintln!("🧾 {}", report.father.verdict_line());
            eprintln!("🧾 {}", report.mother.verdict_line());
            write_report(output, validation.format, Report::Trio(&report), &command_line)?;
        }
    }

    eprintln!("⏱️  Total time: {:.2}s", total_start.elapsed().as_secs_f64());
    Ok(())
}
