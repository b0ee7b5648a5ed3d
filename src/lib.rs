//! # viewsplit
//!
//! A region post-processing pipeline that turns a noisy set of candidate
//! region proposals for an engineering-drawing image into a clean, ranked
//! list of non-overlapping view regions suitable for cropping.
//!
//! The pipeline operates purely on axis-aligned bounding boxes and scalar
//! quality metrics. Segmentation, image decoding, cropping, and
//! visualization are external collaborators: proposals come in through
//! the [`pipeline::ProposalSource`] seam and finalized regions go out as
//! a bounded, ranked list plus a serializable manifest.
//!
//! ## Stages
//!
//! 1. Engineering-criteria filtering (zone-dependent area/aspect/
//!    compactness bounds)
//! 2. Greedy overlap deduplication
//! 3. Density-based proximity merging
//! 4. Info-zone detection with an always-present protected bottom band
//! 5. Zone-dependent context expansion
//! 6. Anisotropic text refinement
//! 7. A second, looser dedup pass to absorb expansion overlaps
//! 8. Composite importance ranking, truncated to a hard output cap
//!
//! ## Quick start
//!
//! ```rust
//! use viewsplit::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = ViewSplitPipeline::new(PipelineConfig::default())?;
//!
//! let proposals = vec![RawProposal {
//!     bbox: BBox::new(100, 100, 400, 300),
//!     area: 120_000,
//!     stability_score: 0.95,
//!     predicted_iou: 0.93,
//! }];
//!
//! let regions = pipeline.run(proposals, 1000, 1000)?;
//! let manifest = pipeline.manifest(&regions);
//! println!("{}", serde_json::to_string_pretty(&manifest)?);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::core::{ConfigFormat, ConfigLoader, PipelineConfig, SplitError, SplitResult};
    pub use crate::domain::{BBox, RawProposal, Region, ZoneFlags};
    pub use crate::pipeline::{
        PassOutcome, ProposalSource, ViewManifest, ViewRecord, ViewSplitPipeline,
    };
}

pub use pipeline::ViewSplitPipeline;
