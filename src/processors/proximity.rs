//! Density-based proximity merging.
//!
//! Clusters region centers that lie within a fixed radius of one another,
//! transitively, with no predefined cluster count and a minimum cluster
//! size of one (DBSCAN with `min_samples = 1` reduces to connected
//! components of the radius graph). Singleton clusters pass through
//! unchanged; larger clusters are replaced by one enveloping region whose
//! area is the sum of member areas rather than the envelope geometry,
//! preserving a "total ink" signal.

use crate::domain::{Region, ZoneFlags};

/// Merges nearby regions into enveloping clusters.
#[derive(Debug, Clone, Copy)]
pub struct ProximityMerger {
    distance_threshold: f32,
}

impl ProximityMerger {
    /// Creates a merger with the given neighborhood radius in pixels.
    pub fn new(distance_threshold: f32) -> Self {
        Self { distance_threshold }
    }

    /// Clusters and merges the regions. Never increases the region count.
    pub fn run(&self, regions: &[Region]) -> Vec<Region> {
        if regions.len() < 2 {
            return regions.to_vec();
        }

        let labels = self.cluster_centers(regions);
        let cluster_count = labels.iter().copied().max().map_or(0, |m| m + 1);

        let mut clusters: Vec<Vec<&Region>> = vec![Vec::new(); cluster_count];
        for (region, &label) in regions.iter().zip(labels.iter()) {
            clusters[label].push(region);
        }

        clusters
            .into_iter()
            .map(|members| {
                if members.len() == 1 {
                    members[0].clone()
                } else {
                    Self::merge_cluster(&members)
                }
            })
            .collect()
    }

    /// Labels each region with a cluster id via transitive radius
    /// closure over the Euclidean distance between centers.
    fn cluster_centers(&self, regions: &[Region]) -> Vec<usize> {
        let centers: Vec<(f32, f32)> = regions.iter().map(|r| r.bbox.center()).collect();
        let eps_sq = self.distance_threshold * self.distance_threshold;

        let mut parent: Vec<usize> = (0..centers.len()).collect();

        fn find(parent: &mut [usize], i: usize) -> usize {
            let mut root = i;
            while parent[root] != root {
                root = parent[root];
            }
            let mut cur = i;
            while parent[cur] != root {
                let next = parent[cur];
                parent[cur] = root;
                cur = next;
            }
            root
        }

        for i in 0..centers.len() {
            for j in (i + 1)..centers.len() {
                let dx = centers[i].0 - centers[j].0;
                let dy = centers[i].1 - centers[j].1;
                if dx * dx + dy * dy <= eps_sq {
                    let ri = find(&mut parent, i);
                    let rj = find(&mut parent, j);
                    if ri != rj {
                        parent[rj] = ri;
                    }
                }
            }
        }

        // Compact root ids into dense cluster labels in first-seen order.
        let mut labels = vec![0usize; centers.len()];
        let mut next_label = 0usize;
        let mut root_to_label: Vec<Option<usize>> = vec![None; centers.len()];
        for i in 0..centers.len() {
            let root = find(&mut parent, i);
            let label = *root_to_label[root].get_or_insert_with(|| {
                let l = next_label;
                next_label += 1;
                l
            });
            labels[i] = label;
        }
        labels
    }

    /// Synthesizes one enveloping region from a cluster of two or more.
    fn merge_cluster(members: &[&Region]) -> Region {
        let mut envelope = members[0].bbox;
        let mut total_area = 0u64;
        let mut stability_sum = 0.0f64;
        let mut iou_sum = 0.0f64;

        for member in members {
            envelope = envelope.envelope(&member.bbox);
            total_area += member.area;
            stability_sum += member.stability_score as f64;
            iou_sum += member.predicted_iou as f64;
        }

        let count = members.len();
        Region {
            bbox: envelope,
            area: total_area,
            stability_score: (stability_sum / count as f64) as f32,
            predicted_iou: (iou_sum / count as f64) as f32,
            flags: ZoneFlags::default(),
            merged_from: count,
            priority_boost: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BBox;

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

    #[test]
    fn test_distant_regions_untouched() {
        let regions = vec![region(0, 0, 50, 50), region(500, 500, 50, 50)];
        let out = ProximityMerger::new(100.0).run(&regions);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].bbox, regions[0].bbox);
        assert_eq!(out[1].bbox, regions[1].bbox);
    }

    #[test]
    fn test_nearby_pair_merged_into_envelope() {
        let a = region(100, 100, 40, 40);
        let b = region(160, 100, 40, 40);
        let out = ProximityMerger::new(100.0).run(&[a, b]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bbox, BBox::new(100, 100, 100, 40));
        // Area is the sum of member areas, not the envelope geometry.
        assert_eq!(out[0].area, 1600 + 1600);
        assert_eq!(out[0].merged_from, 2);
    }

    #[test]
    fn test_transitive_chain_forms_one_cluster() {
        // a-b and b-c are within radius; a-c is not. DBSCAN semantics
        // still put all three in one cluster.
        let a = region(0, 0, 20, 20);
        let b = region(90, 0, 20, 20);
        let c = region(180, 0, 20, 20);
        let out = ProximityMerger::new(100.0).run(&[a, b, c]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].merged_from, 3);
        assert_eq!(out[0].bbox, BBox::new(0, 0, 200, 20));
    }

    #[test]
    fn test_merged_scores_are_means() {
        let mut a = region(0, 0, 20, 20);
        let mut b = region(50, 0, 20, 20);
        a.stability_score = 1.0;
        a.predicted_iou = 0.6;
        b.stability_score = 0.5;
        b.predicted_iou = 1.0;
        let out = ProximityMerger::new(100.0).run(&[a, b]);
        assert_eq!(out.len(), 1);
        assert!((out[0].stability_score - 0.75).abs() < 1e-6);
        assert!((out[0].predicted_iou - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_never_increases_count() {
        let regions: Vec<Region> = (0..10)
            .map(|i| region(i * 30, 0, 20, 20))
            .collect();
        let out = ProximityMerger::new(100.0).run(&regions);
        assert!(out.len() <= regions.len());
    }

    #[test]
    fn test_merged_area_at_least_max_member() {
        let a = region(0, 0, 10, 10);
        let b = region(40, 0, 60, 60);
        let out = ProximityMerger::new(100.0).run(&[a.clone(), b.clone()]);
        assert_eq!(out.len(), 1);
        assert!(out[0].area >= b.area);
        assert_eq!(out[0].area, a.area + b.area);
    }

    #[test]
    fn test_singleton_and_empty_inputs() {
        let merger = ProximityMerger::new(100.0);
        assert!(merger.run(&[]).is_empty());
        let single = vec![region(10, 10, 30, 30)];
        let out = merger.run(&single);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bbox, single[0].bbox);
    }
}
