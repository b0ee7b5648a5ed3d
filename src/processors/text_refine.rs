//! Text-specific refinement of informational regions.
//!
//! Inside the looser bottom/right bands, the aspect ratio of a box tells
//! roughly what kind of text it holds: a wide box is a single line and
//! wants generous vertical context, a near-square box is a block and
//! wants uniform context, and a tall box is vertical text and wants
//! horizontal context. Each regime re-expands anisotropically; refined
//! regions are marked `text_optimized`. Band membership is tested on the
//! box origin, not the center.

use crate::core::TextRefineRatios;
use crate::domain::{BBox, Region};
use crate::processors::zones::ZoneClassifier;

/// Anisotropic text-region refinement.
#[derive(Debug, Clone, Copy)]
pub struct TextRegionRefiner {
    zones: ZoneClassifier,
    ratios: TextRefineRatios,
}

impl TextRegionRefiner {
    /// Creates a refiner for the given image geometry.
    pub fn new(zones: ZoneClassifier, ratios: TextRefineRatios) -> Self {
        Self { zones, ratios }
    }

    /// Refines regions in the informational bands; others pass through.
    pub fn run(&self, regions: Vec<Region>) -> Vec<Region> {
        regions
            .into_iter()
            .map(|region| {
                let in_band = self.zones.origin_in_bottom_band(&region.bbox)
                    || self.zones.origin_in_right_band(&region.bbox);
                if in_band { self.refine(region) } else { region }
            })
            .collect()
    }

    fn refine(&self, mut region: Region) -> Region {
        let b = region.bbox;
        let aspect = b.w.max(b.h) as f32 / b.w.min(b.h) as f32;

        let (w_pct, h_pct) = if aspect > self.ratios.line_aspect && b.w > b.h {
            // Horizontal text line.
            (self.ratios.line_w_pct, self.ratios.line_h_pct)
        } else if aspect <= self.ratios.line_aspect {
            // Text block.
            (self.ratios.block_pct, self.ratios.block_pct)
        } else {
            // Tall or vertical text.
            (self.ratios.vertical_w_pct, self.ratios.vertical_h_pct)
        };

        let expand_x = (b.w as f32 * w_pct) as i64;
        let expand_y = (b.h as f32 * h_pct) as i64;
        let new_x = (b.x as i64 - expand_x).max(0);
        let new_y = (b.y as i64 - expand_y).max(0);
        let new_w = (b.right() as i64 + expand_x).min(self.zones.image_w() as i64) - new_x;
        let new_h = (b.bottom() as i64 + expand_y).min(self.zones.image_h() as i64) - new_y;

        region.bbox = BBox::new(new_x as u32, new_y as u32, new_w as u32, new_h as u32);
        region.area = region.bbox.area_px();
        region.flags.text_optimized = true;
        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ZoneThresholds;
    use crate::domain::ZoneFlags;

    fn region(x: u32, y: u32, w: u32, h: u32) -> Region {
        Region {
            bbox: BBox::new(x, y, w, h),
            area: w as u64 * h as u64,
            stability_score: 0.9,
            predicted_iou: 0.8,
            flags: ZoneFlags::default(),
            merged_from: 1,
            priority_boost: 1.0,
        }
    }

    fn refiner() -> TextRegionRefiner {
        TextRegionRefiner::new(
            ZoneClassifier::new(1000, 1000, ZoneThresholds::default()),
            TextRefineRatios::default(),
        )
    }

    #[test]
    fn test_main_body_region_untouched() {
        let plain = region(200, 200, 300, 60);
        let out = refiner().run(vec![plain.clone()]);
        assert_eq!(out[0].bbox, plain.bbox);
        assert!(!out[0].flags.text_optimized);
    }

    #[test]
    fn test_horizontal_line_expansion() {
        // Aspect 10, wider than tall: 20% horizontal, 30% vertical.
        let line = region(100, 900, 200, 20);
        let out = refiner().run(vec![line]);
        assert_eq!(out[0].bbox, BBox::new(60, 894, 280, 32));
        assert!(out[0].flags.text_optimized);
        assert_eq!(out[0].area, 280 * 32);
    }

    #[test]
    fn test_text_block_uniform_expansion() {
        // Aspect 2: block regime, 25% both axes.
        let block = region(800, 400, 100, 50);
        let out = refiner().run(vec![block]);
        assert_eq!(out[0].bbox, BBox::new(775, 388, 150, 74));
        assert!(out[0].flags.text_optimized);
    }

    #[test]
    fn test_vertical_text_expansion() {
        // Aspect 5, taller than wide: 30% horizontal, 20% vertical.
        let vertical = region(900, 200, 20, 100);
        let out = refiner().run(vec![vertical]);
        assert_eq!(out[0].bbox, BBox::new(894, 180, 32, 140));
        assert!(out[0].flags.text_optimized);
    }

    #[test]
    fn test_band_tested_on_origin_not_center() {
        // Center is in the bottom band (cy = 745) but the origin is not
        // (y = 690): left alone.
        let straddling = region(100, 690, 200, 110);
        let out = refiner().run(vec![straddling.clone()]);
        assert_eq!(out[0].bbox, straddling.bbox);
        assert!(!out[0].flags.text_optimized);
    }

    #[test]
    fn test_refinement_clamped_to_image() {
        let line = region(700, 980, 250, 15);
        let out = refiner().run(vec![line]);
        assert!(out[0].bbox.fits_in(1000, 1000));
    }
}
