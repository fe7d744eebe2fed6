// bed.rs - BED loader for gene panels

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use super::is_skippable;
use crate::data::interval::{Feature, GenomicInterval};
use crate::data::panel::Panel;
use crate::error::LoadError;

fn parse_coordinate(value: &str, column: &str, path: &Path, line: usize) -> Result<u64, LoadError> {
    value.trim().parse::<u64>().map_err(|_| LoadError::Parse {
        path: path.to_path_buf(),
        line,
        message: format!("invalid {} '{}' (expected a non-negative integer)", column, value),
    })
}

/// Load a BED3+ file; the fourth column, when present, is the gene name.
///
/// Unnamed intervals are labelled `chrom_start_end`.
pub fn load_bed_panel(path: &Path) -> Result<Panel, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut features = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line_no = line_num + 1;
        let line = line.map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if is_skippable(&line) {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 3 {
            return Err(LoadError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message: format!("expected at least 3 tab-separated columns, found {}", parts.len()),
            });
        }

        let chromosome = parts[0].trim();
        let start = parse_coordinate(parts[1], "start", path, line_no)?;
        let end = parse_coordinate(parts[2], "end", path, line_no)?;
        let label = match parts.get(3).map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("{}_{}_{}", chromosome, start, end),
        };

        let interval = GenomicInterval::new(chromosome, start, end, label).map_err(|source| {
            LoadError::Interval {
                path: path.to_path_buf(),
                line: line_no,
                source,
            }
        })?;
        features.push(Feature::Gene(interval));
    }

    if features.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    let panel = Panel::new(features);
    info!(
        "Loaded BED panel {}: {} intervals, {} bases",
        path.display(),
        panel.len(),
        panel.total_bases()
    );
    Ok(panel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntervalError;
    use std::io::Write;

    fn write_bed(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_bed_panel() {
        let file = write_bed(
            "track name=exome\n# comment\nchr1\t100\t200\tBRCA1\tscore\nchrM\t0\t50\n\n",
        );
        let panel = load_bed_panel(file.path()).unwrap();

        assert_eq!(panel.len(), 2);
        assert_eq!(panel.features()[0].name(), "BRCA1");
        assert_eq!(panel.features()[0].interval().len(), 100);
        assert_eq!(panel.features()[1].name(), "chrM_0_50");
    }

    #[test]
    fn test_load_bed_inverted_interval_fails() {
        let file = write_bed("chr1\t10\t5\tGENE\n");
        let result = load_bed_panel(file.path());
        assert!(matches!(
            result,
            Err(LoadError::Interval {
                line: 1,
                source: IntervalError::InvertedBounds { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_load_bed_oversized_interval_fails() {
        let file = write_bed("chr1\t0\t5\tOK\nchr1\t0\t18446744073709551615\tHUGE\n");
        assert!(matches!(
            load_bed_panel(file.path()),
            Err(LoadError::Interval {
                line: 2,
                source: IntervalError::TooLong { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_load_bed_negative_start_fails() {
        let file = write_bed("chr1\t-1\t5\tGENE\n");
        assert!(matches!(load_bed_panel(file.path()), Err(LoadError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_load_bed_short_line_fails() {
        let file = write_bed("chr1\t10\n");
        assert!(matches!(load_bed_panel(file.path()), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_load_bed_empty_fails() {
        let file = write_bed("# only a header\n");
        assert!(matches!(load_bed_panel(file.path()), Err(LoadError::Empty(_))));
    }
}
