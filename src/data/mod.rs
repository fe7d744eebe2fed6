// mod.rs - Data structures module

pub mod assembly;
pub mod interval;
pub mod loaders;
pub mod panel;
pub mod region;

// Re-export main types for convenience
pub use assembly::{ConsensusSequences, RegionAssembler};
pub use interval::{Feature, GenomicInterval, MarkerInterval};
pub use panel::{Panel, PanelFilter};
pub use region::AssembledRegion;
