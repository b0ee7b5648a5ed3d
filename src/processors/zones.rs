//! Zone classification for drawing regions.
//!
//! Engineering drawings put their title block and notes in the bottom and
//! right bands of the sheet. The classifier answers, for a given image
//! size, whether a box falls into those bands. Two band widths are in
//! play: the merge phase uses 0.75 of the image extent while the filter
//! and text-refinement phases use the looser 0.70. Downstream results
//! depend on the split and tests pin both values; do not unify them.

use crate::core::ZoneThresholds;
use crate::domain::BBox;

/// Classifies regions by their position on the sheet.
#[derive(Debug, Clone, Copy)]
pub struct ZoneClassifier {
    image_w: u32,
    image_h: u32,
    thresholds: ZoneThresholds,
}

impl ZoneClassifier {
    /// Creates a classifier for an image of the given size.
    pub fn new(image_w: u32, image_h: u32, thresholds: ZoneThresholds) -> Self {
        Self {
            image_w,
            image_h,
            thresholds,
        }
    }

    /// Image width in pixels.
    pub fn image_w(&self) -> u32 {
        self.image_w
    }

    /// Image height in pixels.
    pub fn image_h(&self) -> u32 {
        self.image_h
    }

    /// Total image area in pixels.
    pub fn image_area(&self) -> u64 {
        self.image_w as u64 * self.image_h as u64
    }

    /// Area of the box as a fraction of the image area.
    pub fn area_ratio(&self, area: u64) -> f32 {
        area as f32 / self.image_area() as f32
    }

    /// Bottom band membership in the merge phase: center below 0.75 H.
    pub fn in_merge_bottom_band(&self, bbox: &BBox) -> bool {
        let (_, cy) = bbox.center();
        cy > self.thresholds.merge_band * self.image_h as f32
    }

    /// Right band membership in the merge phase: center right of 0.75 W.
    pub fn in_merge_right_band(&self, bbox: &BBox) -> bool {
        let (cx, _) = bbox.center();
        cx > self.thresholds.merge_band * self.image_w as f32
    }

    /// Bottom band membership in the filter phase: center below 0.70 H.
    pub fn in_filter_bottom_band(&self, bbox: &BBox) -> bool {
        let (_, cy) = bbox.center();
        cy > self.thresholds.filter_band * self.image_h as f32
    }

    /// Right band membership in the filter phase: center right of 0.70 W.
    pub fn in_filter_right_band(&self, bbox: &BBox) -> bool {
        let (cx, _) = bbox.center();
        cx > self.thresholds.filter_band * self.image_w as f32
    }

    /// Whether the box origin sits in the looser bottom band. The text
    /// refiner tests the origin, not the center.
    pub fn origin_in_bottom_band(&self, bbox: &BBox) -> bool {
        bbox.y as f32 > self.thresholds.filter_band * self.image_h as f32
    }

    /// Whether the box origin sits in the looser right band.
    pub fn origin_in_right_band(&self, bbox: &BBox) -> bool {
        bbox.x as f32 > self.thresholds.filter_band * self.image_w as f32
    }

    /// Strict protected band: box top edge below 0.80 H. Used only by the
    /// engineering filter to guard the title-block area.
    pub fn in_protected_band(&self, bbox: &BBox) -> bool {
        bbox.y as f32 > self.thresholds.protected_band * self.image_h as f32
    }

    /// Whether the area fraction falls in the informational-region window.
    pub fn in_info_area_window(&self, area: u64) -> bool {
        let ratio = self.area_ratio(area);
        ratio > self.thresholds.info_area_min && ratio < self.thresholds.info_area_max
    }

    /// Top edge of the protected bottom band, in pixels.
    pub fn protected_band_top(&self) -> u32 {
        (self.image_h as f32 * self.thresholds.protected_band) as u32
    }
}
