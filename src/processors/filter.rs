//! Engineering-criteria filtering of raw candidates.
//!
//! Discards candidates whose area fraction, aspect ratio, or compactness
//! fall outside zone-dependent bounds. The bottom protected band uses the
//! strictest bounds so the title-block area does not shatter into
//! fragments; informational zones tolerate the extreme aspect ratios of
//! text lines; the main body sits in between. Survivors in protected or
//! informational zones are tagged with a priority boost the ranker
//! consumes later.

use crate::core::{PipelineConfig, ZoneBounds};
use crate::domain::Region;
use crate::processors::geometry::compactness;
use crate::processors::zones::ZoneClassifier;

/// Zone-aware candidate filter.
#[derive(Debug, Clone)]
pub struct EngineeringFilter<'a> {
    config: &'a PipelineConfig,
    zones: ZoneClassifier,
}

impl<'a> EngineeringFilter<'a> {
    /// Creates a filter for the given image geometry.
    pub fn new(config: &'a PipelineConfig, zones: ZoneClassifier) -> Self {
        Self { config, zones }
    }

    /// Filters candidates, returning the survivors with zone tags applied.
    pub fn run(&self, regions: Vec<Region>) -> Vec<Region> {
        let total_area = self.zones.image_area();
        let mut kept = Vec::with_capacity(regions.len());

        for region in regions {
            let in_protected = self.zones.in_protected_band(&region.bbox);
            let in_info = self.zones.in_filter_bottom_band(&region.bbox)
                || self.zones.in_filter_right_band(&region.bbox);

            let bounds = self.bounds_for(in_protected, in_info);
            if !self.passes_bounds(&region, bounds) {
                continue;
            }
            if self.is_edge_artifact(&region, in_info, total_area) {
                continue;
            }

            let mut region = region;
            if in_protected {
                region.flags.bottom_protected = true;
                region.priority_boost = self.config.boosts.bottom_protected;
            } else if in_info {
                region.flags.protected_text = true;
                region.priority_boost = self.config.boosts.protected_text;
            }
            kept.push(region);
        }

        kept
    }

    fn bounds_for(&self, in_protected: bool, in_info: bool) -> &ZoneBounds {
        if in_protected {
            &self.config.bounds.bottom_protected
        } else if in_info {
            &self.config.bounds.info
        } else {
            &self.config.bounds.main
        }
    }

    fn passes_bounds(&self, region: &Region, bounds: &ZoneBounds) -> bool {
        let area_ratio = self.zones.area_ratio(region.area);
        if area_ratio < bounds.min_area_ratio || area_ratio > bounds.max_area_ratio {
            return false;
        }

        if region.bbox.aspect_ratio() > bounds.max_aspect_ratio {
            return false;
        }

        // Perimeter of a valid bbox is never zero; compactness() returning
        // None would mean the check is skipped.
        if let Some(c) = compactness(region.area, region.bbox.w, region.bbox.h) {
            if c < bounds.min_compactness {
                return false;
            }
        }

        true
    }

    /// Small regions hugging the left or top margin are scan artifacts,
    /// unless they are large enough to be a legitimate border-touching
    /// view. The left-margin check is waived for informational regions
    /// (title blocks legitimately sit flush left).
    fn is_edge_artifact(&self, region: &Region, in_info: bool, total_area: u64) -> bool {
        let margin = self.config.edge_margin_px;
        let touches_edge = (region.bbox.x < margin && !in_info) || region.bbox.y < margin;
        touches_edge && (region.area as f64) < total_area as f64 * self.config.edge_area_escape as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BBox, ZoneFlags};

    fn region(x: u32, y: u32, w: u32, h: u32) -> Region {
        Region {
            bbox: BBox::new(x, y, w, h),
            area: w as u64 * h as u64,
            stability_score: 0.9,
            predicted_iou: 0.9,
            flags: ZoneFlags::default(),
            merged_from: 1,
            priority_boost: 1.0,
        }
    }

    fn filter_on(config: &PipelineConfig) -> EngineeringFilter<'_> {
        let zones = ZoneClassifier::new(1000, 1000, config.zones);
        EngineeringFilter::new(config, zones)
    }

    #[test]
    fn test_extreme_aspect_dropped_in_main_body() {
        let config = PipelineConfig::default();
        let filter = filter_on(&config);
        // Aspect ratio 50 in the main body zone (max 15).
        let out = filter.run(vec![region(400, 200, 10, 500)]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_reasonable_view_kept() {
        let config = PipelineConfig::default();
        let filter = filter_on(&config);
        let out = filter.run(vec![region(200, 200, 300, 250)]);
        assert_eq!(out.len(), 1);
        assert!(!out[0].flags.bottom_protected);
        assert_eq!(out[0].priority_boost, 1.0);
    }

    #[test]
    fn test_too_small_area_dropped() {
        let config = PipelineConfig::default();
        let filter = filter_on(&config);
        // 0.09% of the image, below the 0.3% main-body floor.
        let out = filter.run(vec![region(400, 400, 30, 30)]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_protected_band_tagged_and_boosted() {
        let config = PipelineConfig::default();
        let filter = filter_on(&config);
        let out = filter.run(vec![region(100, 850, 300, 100)]);
        assert_eq!(out.len(), 1);
        assert!(out[0].flags.bottom_protected);
        assert_eq!(out[0].priority_boost, 1.5);
    }

    #[test]
    fn test_info_zone_tagged_protected_text() {
        let config = PipelineConfig::default();
        let filter = filter_on(&config);
        // Center at x = 850: right info band, but above the protected band.
        let out = filter.run(vec![region(800, 300, 100, 150)]);
        assert_eq!(out.len(), 1);
        assert!(out[0].flags.protected_text);
        assert!(!out[0].flags.bottom_protected);
        assert_eq!(out[0].priority_boost, 1.3);
    }

    #[test]
    fn test_boost_overridable_through_config() {
        let mut config = PipelineConfig::default();
        config.boosts.bottom_protected = 2.0;
        let filter = filter_on(&config);
        let out = filter.run(vec![region(100, 850, 300, 100)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].priority_boost, 2.0);
    }

    #[test]
    fn test_protected_band_stricter_aspect() {
        let config = PipelineConfig::default();
        let filter = filter_on(&config);
        // Aspect 10 passes the info bound (25) but not the protected bound (8).
        let out = filter.run(vec![region(100, 850, 500, 50)]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_small_edge_artifact_dropped() {
        let config = PipelineConfig::default();
        let filter = filter_on(&config);
        // Touches the top margin and covers well under 5% of the image.
        let out = filter.run(vec![region(300, 2, 100, 80)]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_large_edge_view_kept() {
        let config = PipelineConfig::default();
        let filter = filter_on(&config);
        // Touches the left margin but covers 12% of the image.
        let out = filter.run(vec![region(0, 200, 400, 300)]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_empty_input_passes_through() {
        let config = PipelineConfig::default();
        let filter = filter_on(&config);
        assert!(filter.run(Vec::new()).is_empty());
    }
}
