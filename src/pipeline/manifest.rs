//! Output manifest records.
//!
//! The finalized region list is serialized into a manifest that the
//! cropping and visualization collaborators consume. Writing the file is
//! their business; this module only defines the records.

use crate::domain::Region;
use crate::processors::ImportanceRanker;
use serde::{Deserialize, Serialize};

/// One finalized view region, ready for cropping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewRecord {
    /// 1-based position in the ranked output.
    pub view_id: usize,
    /// Bounding box as `[x, y, w, h]` in original-image pixels.
    pub bbox: [u32; 4],
    /// Region area.
    pub area: u64,
    /// Oracle stability score.
    pub stability_score: f32,
    /// Oracle predicted IoU.
    pub predicted_iou: f32,
    /// Derived quality score, `area * stability_score`.
    pub quality_score: f64,
    /// Derived composite importance score used for ordering.
    pub importance_score: f64,
}

impl ViewRecord {
    /// Builds a record for the region at the given output position,
    /// scoring it with the given ranker's weights.
    pub fn from_region(view_id: usize, region: &Region, ranker: &ImportanceRanker) -> Self {
        Self {
            view_id,
            bbox: [region.bbox.x, region.bbox.y, region.bbox.w, region.bbox.h],
            area: region.area,
            stability_score: region.stability_score,
            predicted_iou: region.predicted_iou,
            quality_score: region.quality_score(),
            importance_score: ranker.importance_score(region),
        }
    }
}

/// The full manifest for one processed drawing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewManifest {
    /// Number of views in the manifest.
    pub total_views: usize,
    /// Finalized views in ranked order.
    pub views: Vec<ViewRecord>,
}

impl ViewManifest {
    /// Builds a manifest from the finalized, ranked region list. The
    /// ranker must carry the same weights the pipeline ranked with;
    /// [`crate::ViewSplitPipeline::manifest`] does this wiring.
    pub fn from_regions(regions: &[Region], ranker: &ImportanceRanker) -> Self {
        let views: Vec<ViewRecord> = regions
            .iter()
            .enumerate()
            .map(|(i, region)| ViewRecord::from_region(i + 1, region, ranker))
            .collect();
        Self {
            total_views: views.len(),
            views,
        }
    }
}
