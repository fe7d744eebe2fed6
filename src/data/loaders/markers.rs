// markers.rs - STR marker table loader

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use super::is_skippable;
use crate::data::interval::{Feature, MarkerInterval};
use crate::data::panel::Panel;
use crate::error::LoadError;

/// Load a tab-separated marker table: `chrom  start  end  marker_name  motif`.
///
/// The motif column is a regular expression, usually the bare repeat unit
/// (`TCTA`) or an alternation of units (`TCTA|TCTG`).
pub fn load_marker_panel(path: &Path) -> Result<Panel, LoadError> {
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

        let parts: Vec<&str> = line.split('\t').map(|s| s.trim()).collect();
        if parts.len() != 5 {
            return Err(LoadError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message: format!(
                    "expected 5 columns (chrom, start, end, marker, motif), found {}",
                    parts.len()
                ),
            });
        }

        let coordinate = |value: &str, column: &str| {
            value.parse::<u64>().map_err(|_| LoadError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message: format!("invalid {} '{}'", column, value),
            })
        };
        let start = coordinate(parts[1], "start")?;
        let end = coordinate(parts[2], "end")?;

        let marker = MarkerInterval::new(parts[0], start, end, parts[3], parts[4]).map_err(
            |source| LoadError::Interval {
                path: path.to_path_buf(),
                line: line_no,
                source,
            },
        )?;
        features.push(Feature::Marker(marker));
    }

    if features.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    info!("Loaded {} STR markers from {}", features.len(), path.display());
    Ok(Panel::new(features))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntervalError;
    use std::io::Write;

    #[test]
    fn test_load_marker_panel() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# chrom\tstart\tend\tmarker\tmotif").unwrap();
        writeln!(file, "chrY\t2781480\t2781530\tDYS393\tAGAT").unwrap();
        writeln!(file, "chrX\t100\t160\tDXS7132\tTCTA|TCTG").unwrap();

        let panel = load_marker_panel(file.path()).unwrap();
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.marker_count(), 2);
        assert_eq!(panel.features()[0].name(), "DYS393");
        assert_eq!(panel.features()[0].interval().label(), "Y_STR");
        assert_eq!(panel.features()[1].interval().label(), "X_STR");
    }

    #[test]
    fn test_load_marker_bad_motif() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chrY\t10\t60\tDYS393\t(AGAT").unwrap();

        let result = load_marker_panel(file.path());
        assert!(matches!(
            result,
            Err(LoadError::Interval {
                source: IntervalError::InvalidMotif { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_load_marker_wrong_column_count() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chrY\t10\t60\tDYS393").unwrap();
        assert!(matches!(load_marker_panel(file.path()), Err(LoadError::Parse { .. })));
    }
}
