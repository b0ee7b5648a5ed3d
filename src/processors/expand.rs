//! Context-aware region expansion.
//!
//! Informational regions are grown to capture the labels and annotations
//! hugging their borders. The merged bottom envelope already reaches the
//! bottom image edge, so it only gets a small horizontal margin and a
//! top-only vertical one; other bottom regions grow generously in both
//! axes; remaining info regions get a uniform margin. Non-info regions
//! pass through unchanged. Every expansion clamps to the image bounds and
//! recomputes the area from the new geometry.

use crate::core::ExpansionRatios;
use crate::domain::{BBox, Region};

/// Grows informational regions by zone-dependent margins.
#[derive(Debug, Clone, Copy)]
pub struct RegionExpander {
    image_w: u32,
    image_h: u32,
    ratios: ExpansionRatios,
}

impl RegionExpander {
    /// Creates an expander for the given image geometry.
    pub fn new(image_w: u32, image_h: u32, ratios: ExpansionRatios) -> Self {
        Self {
            image_w,
            image_h,
            ratios,
        }
    }

    /// Expands every info-flagged region; others pass through unchanged.
    pub fn run(&self, regions: Vec<Region>) -> Vec<Region> {
        regions
            .into_iter()
            .map(|region| {
                if region.flags.is_info() {
                    self.expand(region)
                } else {
                    region
                }
            })
            .collect()
    }

    fn expand(&self, region: Region) -> Region {
        let b = region.bbox;
        let (x, y, w, h) = (b.x as i64, b.y as i64, b.w as i64, b.h as i64);

        let (new_x, new_y, new_w, new_h) = if region.flags.merged_region {
            // Envelope already touches the bottom edge: no downward growth.
            let expand_x = (self.ratios.merged_w_min_px as i64)
                .max((b.w as f32 * self.ratios.merged_w_pct) as i64);
            let expand_y = (self.ratios.merged_h_min_px as i64)
                .max((b.h as f32 * self.ratios.merged_h_pct) as i64);
            let new_x = (x - expand_x).max(0);
            let new_y = (y - expand_y).max(0);
            (
                new_x,
                new_y,
                (w + 2 * expand_x).min(self.image_w as i64 - new_x),
                (h + expand_y).min(self.image_h as i64 - new_y),
            )
        } else {
            let (w_pct, h_pct) = if region.flags.bottom_info {
                (self.ratios.bottom_w_pct, self.ratios.bottom_h_pct)
            } else {
                (self.ratios.generic_pct, self.ratios.generic_pct)
            };
            let expand_x = (b.w as f32 * w_pct) as i64;
            let expand_y = (b.h as f32 * h_pct) as i64;
            let new_x = (x - expand_x).max(0);
            let new_y = (y - expand_y).max(0);
            (
                new_x,
                new_y,
                (w + 2 * expand_x).min(self.image_w as i64 - new_x),
                (h + 2 * expand_y).min(self.image_h as i64 - new_y),
            )
        };

        let bbox = BBox::new(new_x as u32, new_y as u32, new_w as u32, new_h as u32);
        let area = bbox.area_px();
        region.with_geometry(bbox, area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ZoneFlags;

    fn region(x: u32, y: u32, w: u32, h: u32, flags: ZoneFlags) -> Region {
        Region {
            bbox: BBox::new(x, y, w, h),
            area: w as u64 * h as u64,
            stability_score: 0.9,
            predicted_iou: 0.8,
            flags,
            merged_from: 1,
            priority_boost: 1.0,
        }
    }

    fn expander() -> RegionExpander {
        RegionExpander::new(1000, 1000, ExpansionRatios::default())
    }

    #[test]
    fn test_non_info_region_untouched() {
        let plain = region(200, 200, 300, 250, ZoneFlags::default());
        let out = expander().run(vec![plain.clone()]);
        assert_eq!(out[0].bbox, plain.bbox);
        assert_eq!(out[0].area, plain.area);
    }

    #[test]
    fn test_merged_envelope_minimal_expansion_top_only() {
        let flags = ZoneFlags {
            bottom_info: true,
            merged_region: true,
            ..Default::default()
        };
        // 400 wide: 5% = 20 px beats the 10 px floor. 100 tall: 2% = 2 px
        // loses to the 5 px floor.
        let envelope = region(300, 900, 400, 100, flags);
        let out = expander().run(vec![envelope]);
        assert_eq!(out[0].bbox.x, 280);
        assert_eq!(out[0].bbox.y, 895);
        assert_eq!(out[0].bbox.w, 440);
        // Grows upward only; the bottom edge stays at the image edge.
        assert_eq!(out[0].bbox.bottom(), 1000);
        assert_eq!(out[0].area, 440 * 105);
    }

    #[test]
    fn test_bottom_info_expands_both_axes() {
        let flags = ZoneFlags {
            bottom_info: true,
            ..Default::default()
        };
        let info = region(400, 800, 200, 100, flags);
        let out = expander().run(vec![info]);
        // 25% of width each side, 20% of height each side.
        assert_eq!(out[0].bbox, BBox::new(350, 780, 300, 140));
        assert_eq!(out[0].area, 300 * 140);
    }

    #[test]
    fn test_generic_info_uniform_expansion() {
        let flags = ZoneFlags {
            right_info: true,
            ..Default::default()
        };
        let info = region(800, 400, 100, 200, flags);
        let out = expander().run(vec![info]);
        // 15% per side on both axes.
        assert_eq!(out[0].bbox, BBox::new(785, 370, 130, 260));
    }

    #[test]
    fn test_expansion_clamped_to_image() {
        let flags = ZoneFlags {
            right_info: true,
            ..Default::default()
        };
        // Close to the right edge: the expansion must not spill out.
        let info = region(900, 100, 90, 100, flags);
        let out = expander().run(vec![info]);
        assert!(out[0].bbox.fits_in(1000, 1000));
        assert_eq!(out[0].area, out[0].bbox.area_px());
    }
}
