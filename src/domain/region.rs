//! Region value types flowing through the pipeline.
//!
//! A [`Region`] is an axis-aligned bounding box plus the quality metrics
//! the segmentation oracle reported for it, plus the zone flags the
//! pipeline attaches along the way. Regions are value objects: every
//! stage consumes a sequence and produces a new one, so a region owned by
//! an earlier stage's output is never mutated in place.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in image pixel space, top-left origin.
///
/// A constructed box always has `w > 0` and `h > 0`; operations that
/// could produce a degenerate box return `Option` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl BBox {
    /// Creates a new bounding box.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        debug_assert!(w > 0 && h > 0, "degenerate bbox {w}x{h}");
        Self { x, y, w, h }
    }

    /// Geometric area of the box in pixels.
    #[inline]
    pub fn area_px(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// Center of the box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }

    /// Exclusive right edge (`x + w`).
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    /// Exclusive bottom edge (`y + h`).
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    /// Perimeter of the box, `2 * (w + h)`.
    #[inline]
    pub fn perimeter(&self) -> u64 {
        2 * (self.w as u64 + self.h as u64)
    }

    /// Aspect ratio, long side over short side (short side floored at 1).
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.w.max(self.h) as f32 / self.w.min(self.h).max(1) as f32
    }

    /// Intersection of two boxes, or `None` if they do not overlap.
    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        let x_left = self.x.max(other.x);
        let y_top = self.y.max(other.y);
        let x_right = self.right().min(other.right());
        let y_bottom = self.bottom().min(other.bottom());

        if x_right <= x_left || y_bottom <= y_top {
            return None;
        }
        Some(BBox {
            x: x_left,
            y: y_top,
            w: x_right - x_left,
            h: y_bottom - y_top,
        })
    }

    /// The minimal box covering both `self` and `other`.
    pub fn envelope(&self, other: &BBox) -> BBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BBox {
            x,
            y,
            w: self.right().max(other.right()) - x,
            h: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Builds a box from possibly out-of-range coordinates, clamping it
    /// into the image. Returns `None` when the clamped box is degenerate.
    pub fn from_clamped(x: i64, y: i64, w: i64, h: i64, image_w: u32, image_h: u32) -> Option<BBox> {
        if image_w == 0 || image_h == 0 {
            return None;
        }
        let cx = x.clamp(0, image_w as i64 - 1);
        let cy = y.clamp(0, image_h as i64 - 1);
        let cw = w.min(image_w as i64 - cx);
        let ch = h.min(image_h as i64 - cy);
        if cw <= 0 || ch <= 0 {
            return None;
        }
        Some(BBox {
            x: cx as u32,
            y: cy as u32,
            w: cw as u32,
            h: ch as u32,
        })
    }

    /// Whether this box lies entirely inside the image.
    pub fn fits_in(&self, image_w: u32, image_h: u32) -> bool {
        self.right() <= image_w && self.bottom() <= image_h
    }
}

/// Zone membership flags attached to a region by the pipeline.
///
/// Flags are additive: a stage may set a flag but never clears one set by
/// an earlier stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneFlags {
    /// Region belongs to the bottom informational band.
    #[serde(default)]
    pub bottom_info: bool,
    /// Region belongs to the right informational band.
    #[serde(default)]
    pub right_info: bool,
    /// Region is an envelope merged from several bottom fragments.
    #[serde(default)]
    pub merged_region: bool,
    /// Region is the synthetic always-present protected bottom band.
    #[serde(default)]
    pub protected_region: bool,
    /// Region sits in the strict bottom protected band.
    #[serde(default)]
    pub bottom_protected: bool,
    /// Region was tagged as protected text by the engineering filter.
    #[serde(default)]
    pub protected_text: bool,
    /// Region went through text-specific refinement.
    #[serde(default)]
    pub text_optimized: bool,
}

impl ZoneFlags {
    /// Whether the region carries any informational-zone tag.
    ///
    /// Only the info-region detector sets these, so this also gates the
    /// region expander and the 1.8x ranking multiplier.
    #[inline]
    pub fn is_info(&self) -> bool {
        self.bottom_info || self.right_info
    }
}

/// A raw region proposal as produced by one segmentation oracle pass.
///
/// Coordinates may be in the space of a downscaled image; the oracle
/// boundary rescales them before any geometric policy applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProposal {
    /// Proposal bounding box.
    pub bbox: BBox,
    /// Mask area in pixels (not necessarily `w * h`).
    pub area: u64,
    /// Oracle stability score in [0, 1].
    pub stability_score: f32,
    /// Oracle predicted IoU in [0, 1].
    pub predicted_iou: f32,
}

/// A candidate view region flowing through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Bounding box in original-image pixel space.
    pub bbox: BBox,
    /// Region area. For merged regions this is the sum of member areas,
    /// which intentionally preserves a "total ink" signal over the
    /// envelope geometry; otherwise it is recomputed as `w * h` whenever
    /// the bbox changes.
    pub area: u64,
    /// Stability score in [0, 1]; arithmetic mean for merged regions.
    pub stability_score: f32,
    /// Predicted IoU in [0, 1]; arithmetic mean for merged regions.
    pub predicted_iou: f32,
    /// Zone membership flags.
    #[serde(default)]
    pub flags: ZoneFlags,
    /// Number of original proposals merged into this region.
    #[serde(default = "Region::default_merged_from")]
    pub merged_from: usize,
    /// Priority boost attached by the engineering filter, consumed by the
    /// importance ranker.
    #[serde(default = "Region::default_priority_boost")]
    pub priority_boost: f32,
}

impl Region {
    fn default_merged_from() -> usize {
        1
    }

    fn default_priority_boost() -> f32 {
        1.0
    }

    /// Builds a pipeline region from an oracle proposal.
    pub fn from_proposal(proposal: RawProposal) -> Self {
        Self {
            bbox: proposal.bbox,
            area: proposal.area,
            stability_score: proposal.stability_score,
            predicted_iou: proposal.predicted_iou,
            flags: ZoneFlags::default(),
            merged_from: 1,
            priority_boost: 1.0,
        }
    }

    /// Quality score used for dedup ordering: `area * stability_score`.
    #[inline]
    pub fn quality_score(&self) -> f64 {
        self.area as f64 * self.stability_score as f64
    }

    /// Returns a copy with a replaced bbox and area.
    pub fn with_geometry(&self, bbox: BBox, area: u64) -> Self {
        Self {
            bbox,
            area,
            ..self.clone()
        }
    }
}
