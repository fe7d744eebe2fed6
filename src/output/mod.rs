// mod.rs - Report writers

use std::fmt;
use std::fs::{create_dir_all, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::core::report::{ComparisonReport, ReportBody, TrioReport};

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Tsv,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "tsv" => Ok(ReportFormat::Tsv),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("Unsupported output format: {}. Use: text, tsv, json", s)),
        }
    }
}

/// Report of either run kind
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Report<'a> {
    Pair(&'a ComparisonReport),
    Trio(&'a TrioReport),
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Pair(report) => write!(f, "{}", report),
            Report::Trio(report) => write!(f, "{}", report),
        }
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    command: &'a str,
    generated: String,
    version: &'static str,
    report: Report<'a>,
}

fn generated_at() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(file_path).parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)
                .map_err(|e| format!("Failed to create parent directory '{}': {}", parent.display(), e))?;
        }
    }
    Ok(())
}

fn write_header<W: Write>(writer: &mut W, command_line: &str) -> io::Result<()> {
    writeln!(writer, "# Command: {}", command_line)?;
    writeln!(writer, "# Generated: {}", generated_at())?;
    writeln!(writer, "# exome-kinship v{}", env!("CARGO_PKG_VERSION"))
}

/// Write the report as plain text
pub fn write_text<W: Write>(writer: &mut W, report: Report<'_>, command_line: &str) -> Result<(), String> {
    write_header(writer, command_line).map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer).map_err(|e| format!("Write error: {}", e))?;
    write!(writer, "{}", report).map_err(|e| format!("Write error: {}", e))?;
    Ok(())
}

fn tsv_rows(comparison: &ComparisonReport, label: &str, rows: &mut Vec<Vec<String>>) {
    match &comparison.body {
        ReportBody::Similarity(analysis) => {
            for chromosome in &analysis.chromosomes {
                rows.push(vec![
                    label.to_string(),
                    chromosome.chromosome.clone(),
                    "*".to_string(),
                    chromosome.differences.to_string(),
                    chromosome.length.to_string(),
                    format!("{:.4}", chromosome.similarity),
                    format!("{:.1}", chromosome.threshold),
                    if chromosome.similar { "similar" } else { "non-similar" }.to_string(),
                ]);
                for gene in &chromosome.genes {
                    rows.push(vec![
                        label.to_string(),
                        chromosome.chromosome.clone(),
                        gene.gene.clone(),
                        gene.differences.to_string(),
                        gene.length.to_string(),
                        gene.similarity.map_or_else(|| "NA".to_string(), |s| format!("{:.4}", s)),
                        String::new(),
                        String::new(),
                    ]);
                }
            }
        }
        ReportBody::Markers(analysis) => {
            for marker in &analysis.markers {
                rows.push(vec![
                    label.to_string(),
                    marker.marker.clone(),
                    marker.first.to_string(),
                    marker.second.to_string(),
                    serde_json::to_value(marker.owner)
                        .ok()
                        .and_then(|v| v.as_str().map(String::from))
                        .unwrap_or_default(),
                    if marker.differs { "differs" } else { "within-tolerance" }.to_string(),
                ]);
            }
        }
    }
}

const SIMILARITY_HEADER: [&str; 8] = [
    "Comparison",
    "Chromosome",
    "Gene",
    "Differences",
    "Length",
    "Similarity",
    "Threshold",
    "Call",
];
const MARKER_HEADER: [&str; 6] = ["Comparison", "Marker", "First", "Second", "Owner", "Status"];

fn comparison_label(report: &ComparisonReport) -> String {
    format!("{}_vs_{}", report.first, report.second)
}

/// Write the report as tab-separated rows, one per chromosome and gene or per marker
pub fn write_tsv<W: Write>(writer: &mut W, report: Report<'_>, command_line: &str) -> Result<(), String> {
    write_header(writer, command_line).map_err(|e| format!("Write error: {}", e))?;

    let mut tsv = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(writer);
    let mut rows: Vec<Vec<String>> = Vec::new();

    let comparisons: Vec<&ComparisonReport> = match report {
        Report::Pair(pair) => vec![pair],
        Report::Trio(trio) => vec![&trio.father, &trio.mother],
    };
    for comparison in &comparisons {
        tsv_rows(comparison, &comparison_label(comparison), &mut rows);
    }

    let header: &[&str] = match comparisons.first().map(|c| &c.body) {
        Some(ReportBody::Markers(_)) => &MARKER_HEADER,
        _ => &SIMILARITY_HEADER,
    };
    tsv.write_record(header).map_err(|e| format!("Write error: {}", e))?;
    for row in &rows {
        tsv.write_record(row).map_err(|e| format!("Write error: {}", e))?;
    }

    if let Report::Trio(trio) = report {
        tsv.write_record(["Provenance", "Chromosome", "Father", "Mother", "Closest"])
            .map_err(|e| format!("Write error: {}", e))?;
        for p in &trio.provenance {
            let percent = |v: Option<f64>| v.map_or_else(|| "NA".to_string(), |s| format!("{:.4}", s));
            tsv.write_record([
                "provenance".to_string(),
                p.chromosome.clone(),
                percent(p.father_similarity),
                percent(p.mother_similarity),
                p.source.to_string(),
            ])
            .map_err(|e| format!("Write error: {}", e))?;
        }
    }

    tsv.flush().map_err(|e| format!("Flush error: {}", e))?;
    Ok(())
}

/// Write the report as a JSON document with run metadata
pub fn write_json<W: Write>(writer: &mut W, report: Report<'_>, command_line: &str) -> Result<(), String> {
    let document = JsonDocument {
        command: command_line,
        generated: generated_at(),
        version: env!("CARGO_PKG_VERSION"),
        report,
    };
    serde_json::to_writer_pretty(&mut *writer, &document).map_err(|e| format!("Failed to serialize report: {}", e))?;
    writeln!(writer).map_err(|e| format!("Write error: {}", e))?;
    Ok(())
}

fn write_to<W: Write>(writer: &mut W, format: ReportFormat, report: Report<'_>, command_line: &str) -> Result<(), String> {
    match format {
        ReportFormat::Text => write_text(writer, report, command_line),
        ReportFormat::Tsv => write_tsv(writer, report, command_line),
        ReportFormat::Json => write_json(writer, report, command_line),
    }
}

/// Write the report to `file_path`, or to stdout when no path is given
pub fn write_report(
    file_path: Option<&str>,
    format: ReportFormat,
    report: Report<'_>,
    command_line: &str,
) -> Result<(), String> {
    match file_path {
        Some(file_path) => {
            ensure_parent_dir(file_path)?;
            let file = File::create(file_path)
                .map_err(|e| format!("Failed to create output file '{}': {}", file_path, e))?;
            let mut writer = BufWriter::new(file);
            write_to(&mut writer, format, report, command_line)?;
            writer.flush().map_err(|e| format!("Flush error: {}", e))?;
            eprintln!("✅ Report written to: {}", file_path);
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_to(&mut writer, format, report, command_line)?;
            writer.flush().map_err(|e| format!("Flush error: {}", e))?;
        }
    }
    Ok(())
}
