//! Informational-zone detection.
//!
//! Title blocks, notes, and revision tables live in the bottom and right
//! bands of an engineering sheet and tend to shatter into fragments under
//! segmentation. This stage merges bottom-band fragments into a single
//! envelope, tags right-band candidates individually, and always injects
//! a synthetic protected region spanning the bottom fifth of the sheet so
//! the title-block band survives even when the oracle produced nothing
//! there.

use crate::core::ZoneThresholds;
use crate::domain::{BBox, Region, ZoneFlags};
use crate::processors::zones::ZoneClassifier;

/// Horizontal padding applied to the merged bottom envelope, in pixels.
const BOTTOM_MERGE_PAD_X: i64 = 20;
/// Upward padding applied to the merged bottom envelope, in pixels.
const BOTTOM_MERGE_PAD_Y: i64 = 10;
/// Predicted IoU assigned to the merged bottom envelope.
const MERGED_PREDICTED_IOU: f32 = 0.9;
/// Scores assigned to the synthetic protected bottom region.
const PROTECTED_SCORE: f32 = 0.95;

/// Detects and consolidates informational zones.
#[derive(Debug, Clone, Copy)]
pub struct InfoRegionDetector {
    zones: ZoneClassifier,
}

impl InfoRegionDetector {
    /// Creates a detector for the given image geometry.
    pub fn new(image_w: u32, image_h: u32, thresholds: ZoneThresholds) -> Self {
        Self {
            zones: ZoneClassifier::new(image_w, image_h, thresholds),
        }
    }

    /// Classifies regions into informational zones and injects the
    /// protected bottom region. Output order: merged bottom envelope (if
    /// any), right-band candidates, untouched main-body regions, then the
    /// synthetic protected region.
    pub fn run(&self, regions: Vec<Region>) -> Vec<Region> {
        let mut bottom_candidates = Vec::new();
        let mut right_candidates = Vec::new();
        let mut other = Vec::new();

        for region in regions {
            let reasonable_size = self.zones.in_info_area_window(region.area);
            if self.zones.in_merge_bottom_band(&region.bbox) && reasonable_size {
                bottom_candidates.push(region);
            } else if self.zones.in_merge_right_band(&region.bbox) && reasonable_size {
                right_candidates.push(region);
            } else {
                other.push(region);
            }
        }

        let mut out = Vec::with_capacity(right_candidates.len() + other.len() + 2);

        if !bottom_candidates.is_empty() {
            tracing::debug!(
                fragments = bottom_candidates.len(),
                "merging bottom fragments into one info envelope"
            );
            out.push(self.merge_bottom_fragments(&bottom_candidates));
        }

        for mut region in right_candidates {
            region.flags.right_info = true;
            out.push(region);
        }

        out.extend(other);
        out.push(self.protected_bottom_region());
        out
    }

    /// Merges all bottom-band fragments into one envelope padded left,
    /// right, and up, and extended down to the exact bottom image edge.
    fn merge_bottom_fragments(&self, fragments: &[Region]) -> Region {
        let mut min_x = i64::MAX;
        let mut max_x = i64::MIN;
        let mut min_y = i64::MAX;
        let mut total_area = 0u64;
        let mut stability_sum = 0.0f64;

        for fragment in fragments {
            min_x = min_x.min(fragment.bbox.x as i64);
            max_x = max_x.max(fragment.bbox.right() as i64);
            min_y = min_y.min(fragment.bbox.y as i64);
            total_area += fragment.area;
            stability_sum += fragment.stability_score as f64;
        }

        let image_w = self.zones.image_w() as i64;
        let image_h = self.zones.image_h() as i64;
        let x = (min_x - BOTTOM_MERGE_PAD_X).max(0);
        let right = (max_x + BOTTOM_MERGE_PAD_X).min(image_w);
        let y = (min_y - BOTTOM_MERGE_PAD_Y).max(0);

        Region {
            bbox: BBox::new(x as u32, y as u32, (right - x) as u32, (image_h - y) as u32),
            area: total_area,
            stability_score: (stability_sum / fragments.len() as f64) as f32,
            predicted_iou: MERGED_PREDICTED_IOU,
            flags: ZoneFlags {
                bottom_info: true,
                merged_region: true,
                ..Default::default()
            },
            merged_from: fragments.len(),
            priority_boost: 1.0,
        }
    }

    /// The synthetic, always-present protected bottom region: full image
    /// width, bottom 20% of the height.
    fn protected_bottom_region(&self) -> Region {
        let image_w = self.zones.image_w();
        let image_h = self.zones.image_h();
        let top = self.zones.protected_band_top();
        let height = image_h - top;

        Region {
            bbox: BBox::new(0, top, image_w, height),
            area: image_w as u64 * height as u64,
            stability_score: PROTECTED_SCORE,
            predicted_iou: PROTECTED_SCORE,
            flags: ZoneFlags {
                bottom_info: true,
                protected_region: true,
                ..Default::default()
            },
            merged_from: 1,
            priority_boost: 1.0,
        }
    }
}
