//! The view-splitting pipeline orchestrator.
//!
//! Sequences the post-processing stages over the raw proposals:
//! filter -> dedup -> proximity merge -> info detection -> expansion ->
//! text refinement -> dedup again -> rank. The second dedup pass runs
//! with the looser threshold and must come after expansion, which can
//! reintroduce overlaps between previously distinct regions. Finalized
//! regions get a last uniform context expansion and a clamp to the image
//! bounds before they are handed to the cropping collaborator.

pub mod manifest;
pub mod oracle;

pub use manifest::{ViewManifest, ViewRecord};
pub use oracle::{BoxError, PassOutcome, ProposalSource, collect_proposals, rescale_proposals};

use crate::core::{PipelineConfig, SplitError, SplitResult};
use crate::domain::{BBox, RawProposal, Region};
use crate::processors::{
    Deduplicator, EngineeringFilter, ImportanceRanker, InfoRegionDetector, ProximityMerger,
    RegionExpander, TextRegionRefiner, ZoneClassifier,
};
use std::sync::Arc;
use std::time::Duration;

/// The full region post-processing pipeline.
#[derive(Debug, Clone)]
pub struct ViewSplitPipeline {
    config: PipelineConfig,
}

impl ViewSplitPipeline {
    /// Creates a pipeline, failing fast on an invalid configuration.
    pub fn new(config: PipelineConfig) -> SplitResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The wall-clock deadline applied to each oracle pass.
    pub fn pass_deadline(&self) -> Duration {
        Duration::from_secs(self.config.pass_deadline_secs)
    }

    /// Collects proposals from the oracle (rescaling them back to the
    /// original coordinate space) and runs the pipeline over them.
    ///
    /// `scale` is the factor by which the image was downscaled before the
    /// oracle ran (1.0 when it ran at full resolution).
    pub fn run_from_source<S: ProposalSource>(
        &self,
        source: Arc<S>,
        scale: f64,
        image_w: u32,
        image_h: u32,
    ) -> SplitResult<Vec<Region>> {
        let proposals = collect_proposals(source, self.pass_deadline());
        let proposals = rescale_proposals(proposals, scale, self.config.parallel_threshold);
        self.run(proposals, image_w, image_h)
    }

    /// Runs the post-processing pipeline over raw proposals already in
    /// the original image's coordinate space.
    ///
    /// An empty proposal list is a valid input and yields an empty
    /// output; "no views found" is a terminal outcome, not an error.
    pub fn run(
        &self,
        proposals: Vec<RawProposal>,
        image_w: u32,
        image_h: u32,
    ) -> SplitResult<Vec<Region>> {
        if image_w == 0 || image_h == 0 {
            return Err(SplitError::invalid_input(format!(
                "image dimensions must be positive, got {image_w}x{image_h}"
            )));
        }

        let regions: Vec<Region> = proposals
            .into_iter()
            .filter_map(|p| Self::admit_proposal(p, image_w, image_h))
            .map(Region::from_proposal)
            .collect();

        if regions.is_empty() {
            tracing::warn!("no proposals to process, yielding empty result");
            return Ok(Vec::new());
        }
        tracing::info!(count = regions.len(), "starting region post-processing");

        let zones = ZoneClassifier::new(image_w, image_h, self.config.zones);

        let filtered = EngineeringFilter::new(&self.config, zones).run(regions);
        tracing::debug!(count = filtered.len(), "after engineering filter");

        let deduped = Deduplicator::new(
            self.config.overlap_threshold,
            self.config.containment_threshold,
        )
        .run(&filtered);
        tracing::debug!(count = deduped.len(), "after first dedup pass");

        let merged = ProximityMerger::new(self.config.proximity_distance).run(&deduped);
        tracing::debug!(count = merged.len(), "after proximity merge");

        let with_info =
            InfoRegionDetector::new(image_w, image_h, self.config.zones).run(merged);
        tracing::debug!(count = with_info.len(), "after info-region detection");

        let expanded =
            RegionExpander::new(image_w, image_h, self.config.expansion).run(with_info);
        let refined = TextRegionRefiner::new(zones, self.config.text).run(expanded);

        // Expansion can reintroduce overlaps; dedup again, looser.
        let final_deduped = Deduplicator::new(
            self.config.final_overlap_threshold,
            self.config.containment_threshold,
        )
        .run(&refined);
        tracing::debug!(count = final_deduped.len(), "after final dedup pass");

        let ranked = self.ranker().run(final_deduped);
        let finalized = self.finalize(ranked, image_w, image_h);
        tracing::info!(count = finalized.len(), "pipeline finished");
        Ok(finalized)
    }

    /// Builds the output manifest for a finalized region list, scored
    /// with the configured importance weights.
    pub fn manifest(&self, regions: &[Region]) -> ViewManifest {
        ViewManifest::from_regions(regions, &self.ranker())
    }

    fn ranker(&self) -> ImportanceRanker {
        ImportanceRanker::new(self.config.max_output_regions, self.config.importance)
    }

    /// Clamps a proposal into the image frame at the input boundary, so
    /// downstream geometry can rely on `x + w <= image_w` and
    /// `y + h <= image_h`. Proposals starting outside the frame are
    /// dropped and logged.
    fn admit_proposal(mut proposal: RawProposal, image_w: u32, image_h: u32) -> Option<RawProposal> {
        let b = proposal.bbox;
        if b.x >= image_w || b.y >= image_h {
            tracing::debug!(?b, "dropping proposal outside the image frame");
            return None;
        }
        let w = b.w.min(image_w - b.x);
        let h = b.h.min(image_h - b.y);
        if w != b.w || h != b.h {
            tracing::debug!(?b, w, h, "clamping proposal to the image frame");
            proposal.bbox = BBox::new(b.x, b.y, w, h);
            // A mask cannot cover more pixels than its clamped box.
            proposal.area = proposal.area.min(proposal.bbox.area_px());
        }
        Some(proposal)
    }

    /// Applies the uniform context expansion to each ranked region so the
    /// crop captures surrounding labels, clamps to the image, and drops
    /// anything degenerate.
    fn finalize(&self, regions: Vec<Region>, image_w: u32, image_h: u32) -> Vec<Region> {
        let ratio = self.config.context_expansion;
        regions
            .into_iter()
            .filter_map(|region| {
                let b = region.bbox;
                let expand_x = (b.w as f32 * ratio) as i64;
                let expand_y = (b.h as f32 * ratio) as i64;
                let clamped = BBox::from_clamped(
                    b.x as i64 - expand_x,
                    b.y as i64 - expand_y,
                    b.w as i64 + 2 * expand_x,
                    b.h as i64 + 2 * expand_y,
                    image_w,
                    image_h,
                );
                match clamped {
                    Some(bbox) => Some(region.with_geometry(bbox, bbox.area_px())),
                    None => {
                        tracing::debug!(?b, "dropping degenerate region after clamping");
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BBox;

    fn proposal(x: u32, y: u32, w: u32, h: u32, stability: f32) -> RawProposal {
        RawProposal {
            bbox: BBox::new(x, y, w, h),
            area: w as u64 * h as u64,
            stability_score: stability,
            predicted_iou: stability,
        }
    }

    fn pipeline() -> ViewSplitPipeline {
        ViewSplitPipeline::new(PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = PipelineConfig {
            containment_threshold: -0.5,
            ..Default::default()
        };
        assert!(ViewSplitPipeline::new(config).is_err());
    }

    #[test]
    fn test_zero_image_dimensions_rejected() {
        let result = pipeline().run(vec![proposal(0, 0, 10, 10, 0.9)], 0, 1000);
        assert!(matches!(result, Err(SplitError::InvalidInput { .. })));
    }

    #[test]
    fn test_empty_proposals_yield_empty_output() {
        // All generator passes failing is a valid terminal outcome: the
        // pipeline yields an empty list and no protected region is
        // fabricated out of nothing.
        let out = pipeline().run(Vec::new(), 1000, 1000).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_out_of_frame_proposal_dropped() {
        // A box starting past the right image edge must not reach the
        // geometry stages; wrapped arithmetic there would fabricate a
        // corrupt, image-sized region.
        let out = pipeline()
            .run(vec![proposal(1100, 400, 200, 100, 0.9)], 1000, 1000)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_overhanging_proposal_clamped_at_entry() {
        // Origin inside the frame, extent past the right edge: admitted
        // with box and area clamped, and every later stage stays in
        // bounds.
        let out = pipeline()
            .run(vec![proposal(700, 100, 400, 300, 0.9)], 1000, 1000)
            .unwrap();
        assert_eq!(out.len(), 2);
        let view = out.iter().find(|r| !r.flags.protected_region).unwrap();
        assert!(view.flags.right_info);
        for region in &out {
            assert!(region.bbox.fits_in(1000, 1000));
            assert!(region.bbox.w > 0 && region.bbox.h > 0);
        }
    }

    #[test]
    fn test_full_run_keeps_views_and_injects_protected_region() {
        let proposals = vec![
            // Two clean main-body views.
            proposal(100, 100, 400, 300, 0.95),
            proposal(600, 150, 250, 300, 0.90),
            // Two title-block fragments in the protected band, far enough
            // apart to stay out of one proximity cluster.
            proposal(700, 850, 100, 90, 0.90),
            proposal(850, 860, 110, 90, 0.90),
        ];

        let out = pipeline().run(proposals, 1000, 1000).unwrap();

        assert!(!out.is_empty());
        assert!(out.len() <= 20);
        // The synthetic protected band dominates the ranking.
        assert!(out[0].flags.protected_region);
        assert!(out[0].flags.bottom_info);
        // The two main views survive both dedup passes.
        assert!(out.len() >= 3);
        // Everything is clamped inside the image after final expansion.
        for region in &out {
            assert!(region.bbox.fits_in(1000, 1000));
            assert!(region.bbox.w > 0 && region.bbox.h > 0);
            assert_eq!(region.area, region.bbox.area_px());
        }
    }

    #[test]
    fn test_bottom_fragments_absorbed_by_protected_band() {
        // The merged bottom envelope ends up contained in the expanded
        // protected region and is absorbed by the final dedup pass.
        let proposals = vec![
            proposal(700, 850, 100, 90, 0.90),
            proposal(850, 860, 110, 90, 0.90),
        ];
        let out = pipeline().run(proposals, 1000, 1000).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].flags.protected_region);
    }

    #[test]
    fn test_output_never_exceeds_cap() {
        // A grid of disjoint, well-formed views, more than the cap.
        let mut proposals = Vec::new();
        for row in 0..5 {
            for col in 0..5 {
                proposals.push(proposal(col * 200 + 20, row * 200 + 20, 120, 110, 0.9));
            }
        }
        let config = PipelineConfig {
            max_output_regions: 10,
            ..Default::default()
        };
        let out = ViewSplitPipeline::new(config)
            .unwrap()
            .run(proposals, 1000, 1000)
            .unwrap();
        assert!(out.len() <= 10);
    }

    #[test]
    fn test_run_from_source_rescales_to_original_space() {
        struct HalfScaleSource;

        impl ProposalSource for HalfScaleSource {
            fn pass_count(&self) -> usize {
                1
            }

            fn generate(&self, _pass: usize) -> Result<Vec<RawProposal>, BoxError> {
                // Coordinates in the space of an image downscaled by 0.5.
                Ok(vec![RawProposal {
                    bbox: BBox::new(50, 50, 200, 150),
                    area: 30_000,
                    stability_score: 0.95,
                    predicted_iou: 0.95,
                }])
            }
        }

        let out = pipeline()
            .run_from_source(Arc::new(HalfScaleSource), 0.5, 1000, 1000)
            .unwrap();
        // The rescaled view plus the protected band.
        assert_eq!(out.len(), 2);
        let view = out.iter().find(|r| !r.flags.protected_region).unwrap();
        // (50,50,200,150) at half scale is (100,100,400,300) in the
        // original space, plus the 15% context margin.
        assert_eq!(view.bbox, BBox::new(40, 55, 520, 390));
    }
}
