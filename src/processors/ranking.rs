//! Importance ranking and output truncation.
//!
//! The composite score starts from `area * stability_score` and applies
//! exactly one zone multiplier path: protected regions beat merged
//! envelopes beat ordinary informational regions, with bottom-band and
//! bottom-protected sub-multipliers compounding on the informational
//! path. The filter's priority boost multiplies on top. All multipliers
//! come from [`ImportanceWeights`] in the configuration. The output is
//! truncated to a hard cap: downstream consumers rely on a bounded view
//! count, so the cap is a contract, not a performance knob.

use crate::core::ImportanceWeights;
use crate::domain::Region;

/// Ranks regions by composite importance and truncates the output.
#[derive(Debug, Clone, Copy)]
pub struct ImportanceRanker {
    max_output_regions: usize,
    weights: ImportanceWeights,
}

impl ImportanceRanker {
    /// Creates a ranker with the given output cap and zone multipliers.
    pub fn new(max_output_regions: usize, weights: ImportanceWeights) -> Self {
        Self {
            max_output_regions,
            weights,
        }
    }

    /// Composite importance score for a single region.
    pub fn importance_score(&self, region: &Region) -> f64 {
        let mut score = region.quality_score();

        if region.flags.protected_region {
            score *= self.weights.protected as f64;
        } else if region.flags.merged_region {
            score *= self.weights.merged as f64;
        } else if region.flags.is_info() {
            score *= self.weights.info as f64;
            if region.flags.bottom_info {
                score *= self.weights.bottom_info as f64;
            }
            if region.flags.bottom_protected {
                score *= self.weights.bottom_protected as f64;
            }
        }

        score * region.priority_boost as f64
    }

    /// Sorts descending by composite score and truncates to the cap.
    pub fn run(&self, mut regions: Vec<Region>) -> Vec<Region> {
        regions.sort_by(|a, b| {
            self.importance_score(b)
                .partial_cmp(&self.importance_score(a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        regions.truncate(self.max_output_regions);
        regions
    }
}
