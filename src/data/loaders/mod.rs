// mod.rs - Panel file loaders

pub mod bed;
pub mod markers;

pub use bed::load_bed_panel;
pub use markers::load_marker_panel;

/// True for blank, comment and UCSC header lines
pub(crate) fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("track")
        || trimmed.starts_with("browser")
}
