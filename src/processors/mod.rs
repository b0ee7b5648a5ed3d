//! Pipeline stage processors.
//!
//! One module per stage of the region post-processing pipeline, in
//! data-flow order:
//!
//! * `geometry` - overlap, containment, and compactness measures
//! * `zones` - bottom/right/protected band classification
//! * `filter` - zone-dependent engineering-criteria filtering
//! * `dedup` - greedy overlap deduplication
//! * `proximity` - density-based clustering and merging
//! * `info_regions` - info-zone detection and the protected bottom band
//! * `expand` - zone-dependent context expansion
//! * `text_refine` - anisotropic text-region expansion
//! * `ranking` - composite importance scoring and truncation

pub mod dedup;
pub mod expand;
pub mod filter;
pub mod geometry;
pub mod info_regions;
pub mod proximity;
pub mod ranking;
pub mod text_refine;
pub mod zones;

pub use dedup::Deduplicator;
pub use expand::RegionExpander;
pub use filter::EngineeringFilter;
pub use geometry::{compactness, containment_ratio, is_inside, overlap_ratio};
pub use info_regions::InfoRegionDetector;
pub use proximity::ProximityMerger;
pub use ranking::ImportanceRanker;
pub use text_refine::TextRegionRefiner;
pub use zones::ZoneClassifier;
