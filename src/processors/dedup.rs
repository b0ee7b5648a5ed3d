//! Greedy overlap deduplication.
//!
//! Candidates are sorted by quality (area times stability) and accepted
//! greedily: a candidate overlapping an accepted region beyond the
//! threshold, or contained in one, is discarded; a candidate that itself
//! contains an accepted region replaces it. The greedy pass is not
//! globally optimal and deliberately so: given the quality-first sort it
//! is deterministic and cheap, and the replacement rule keeps whichever
//! box generalizes the other. Do not swap in a maximum-independent-set
//! solver; downstream expectations are pinned to this exact behavior.

use crate::domain::Region;
use crate::processors::geometry::{is_inside, overlap_ratio};
use itertools::Itertools;

/// Overlap-based deduplicator.
#[derive(Debug, Clone, Copy)]
pub struct Deduplicator {
    overlap_threshold: f32,
    containment_threshold: f32,
}

impl Deduplicator {
    /// Creates a deduplicator with the given thresholds.
    pub fn new(overlap_threshold: f32, containment_threshold: f32) -> Self {
        Self {
            overlap_threshold,
            containment_threshold,
        }
    }

    /// Removes overlapping and contained duplicates, keeping the
    /// highest-quality representative of each overlap cluster.
    pub fn run(&self, regions: &[Region]) -> Vec<Region> {
        if regions.is_empty() {
            return Vec::new();
        }

        // Stable sort: ties keep their input order.
        let sorted = regions.iter().sorted_by(|a, b| {
            b.quality_score()
                .partial_cmp(&a.quality_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut accepted: Vec<Region> = Vec::new();
        for candidate in sorted {
            let mut keep = true;
            let mut replace_at = None;

            for (idx, kept) in accepted.iter().enumerate() {
                let overlap = overlap_ratio(&candidate.bbox, &kept.bbox);
                if overlap > self.overlap_threshold
                    || is_inside(&candidate.bbox, &kept.bbox, self.containment_threshold)
                {
                    keep = false;
                    break;
                }
                if is_inside(&kept.bbox, &candidate.bbox, self.containment_threshold) {
                    // The candidate generalizes an accepted region.
                    replace_at = Some(idx);
                    break;
                }
            }

            if let Some(idx) = replace_at {
                accepted.remove(idx);
                accepted.push(candidate.clone());
            } else if keep {
                accepted.push(candidate.clone());
            }
        }

        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BBox, ZoneFlags};

    fn region(x: u32, y: u32, w: u32, h: u32, stability: f32) -> Region {
        Region {
            bbox: BBox::new(x, y, w, h),
            area: w as u64 * h as u64,
            stability_score: stability,
            predicted_iou: stability,
            flags: ZoneFlags::default(),
            merged_from: 1,
            priority_boost: 1.0,
        }
    }

    #[test]
    fn test_overlapping_pair_keeps_higher_quality() {
        // Two near-identical boxes; the first has the higher stability.
        let a = region(0, 0, 200, 200, 0.95);
        let b = region(10, 10, 200, 200, 0.80);
        assert!(overlap_ratio(&a.bbox, &b.bbox) > 0.3);

        let dedup = Deduplicator::new(0.3, 0.8);
        let out = dedup.run(&[a.clone(), b]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bbox, a.bbox);
        assert_eq!(out[0].stability_score, 0.95);
    }

    #[test]
    fn test_contained_candidate_discarded() {
        let outer = region(0, 0, 500, 500, 0.9);
        let inner = region(100, 100, 50, 50, 0.99);
        let dedup = Deduplicator::new(0.3, 0.8);
        // IoU of inner vs outer is tiny, but containment catches it.
        let out = dedup.run(&[outer.clone(), inner]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bbox, outer.bbox);
    }

    #[test]
    fn test_candidate_containing_accepted_replaces_it() {
        // The small box wins the quality sort; the large box that contains
        // it arrives second and takes its place.
        let small = region(100, 100, 50, 50, 1.0);
        let large = region(90, 90, 400, 70, 0.05);
        assert!(small.quality_score() > large.quality_score());
        assert!(overlap_ratio(&small.bbox, &large.bbox) <= 0.3);

        let dedup = Deduplicator::new(0.3, 0.8);
        let out = dedup.run(&[small, large.clone()]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bbox, large.bbox);
    }

    #[test]
    fn test_disjoint_regions_all_kept() {
        let a = region(0, 0, 100, 100, 0.9);
        let b = region(300, 0, 100, 100, 0.8);
        let c = region(600, 0, 100, 100, 0.7);
        let dedup = Deduplicator::new(0.3, 0.8);
        let out = dedup.run(&[a, b, c]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let regions = vec![
            region(0, 0, 200, 200, 0.95),
            region(10, 10, 200, 200, 0.80),
            region(400, 400, 150, 150, 0.85),
            region(420, 420, 100, 100, 0.99),
            region(700, 100, 120, 90, 0.75),
        ];
        let dedup = Deduplicator::new(0.3, 0.8);
        let once = dedup.run(&regions);
        let twice = dedup.run(&once);
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.bbox, b.bbox);
        }
    }

    #[test]
    fn test_looser_threshold_keeps_more() {
        let a = region(0, 0, 100, 100, 0.9);
        let b = region(60, 0, 100, 100, 0.8);
        // IoU is 40/160 = 0.25: kept at 0.4, not at 0.2.
        let strict = Deduplicator::new(0.2, 0.8).run(&[a.clone(), b.clone()]);
        let loose = Deduplicator::new(0.4, 0.8).run(&[a, b]);
        assert_eq!(strict.len(), 1);
        assert_eq!(loose.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let dedup = Deduplicator::new(0.3, 0.8);
        assert!(dedup.run(&[]).is_empty());
    }
}
