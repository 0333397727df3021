//! Nearest-neighbor queries over atom positions, backed by a `kiddo` k-d tree.
//!
//! The index is built once and never updated. `kiddo` answers the radius query; results are
//! then re-checked against the exact squared distance and ordered by distance and build
//! order, so equal distances always come back in the same order.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;

/// Slack added to the squared radius handed to `kiddo`; hits are filtered exactly afterwards.
const RADIUS_SLACK: f64 = 1e-9;

/// A query hit: the stored item and its squared distance to the query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<T> {
    pub item: T,
    pub distance_squared: f64,
}

pub struct SpatialIndex<T> {
    items: Vec<T>,
    points: Vec<Point3<f64>>,
    tree: KdTree<f64, 3>,
}

impl<T: Copy> SpatialIndex<T> {
    /// Builds the index from `(item, position)` pairs.
    ///
    /// Among points at the same distance from a query, the one supplied first is reported
    /// first.
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (T, Point3<f64>)>,
    {
        let mut items = Vec::new();
        let mut points = Vec::new();
        let mut tree: KdTree<f64, 3> = KdTree::new();
        for (slot, (item, point)) in entries.into_iter().enumerate() {
            tree.add(&[point.x, point.y, point.z], slot as u64);
            items.push(item);
            points.push(point);
        }
        Self {
            items,
            points,
            tree,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns up to `k` items within `max_radius` of `point`, nearest first.
    ///
    /// The radius bound is inclusive. Ties in distance are broken by build order, so the
    /// result is deterministic for a given input.
    pub fn k_nearest(&self, point: &Point3<f64>, k: usize, max_radius: f64) -> Vec<Neighbor<T>> {
        if k == 0 || max_radius < 0.0 || self.is_empty() {
            return Vec::new();
        }
        let radius_squared = max_radius * max_radius;
        let query = [point.x, point.y, point.z];

        let mut hits: Vec<(f64, usize)> = self
            .tree
            .within::<SquaredEuclidean>(&query, radius_squared + RADIUS_SLACK)
            .into_iter()
            .filter_map(|neighbour| {
                let slot = usize::try_from(neighbour.item).ok()?;
                let distance_squared = (self.points.get(slot)? - point).norm_squared();
                (distance_squared <= radius_squared).then_some((distance_squared, slot))
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.truncate(k);

        hits.into_iter()
            .map(|(distance_squared, slot)| Neighbor {
                item: self.items[slot],
                distance_squared,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(points: &[Point3<f64>], query: &Point3<f64>, k: usize, radius: f64) -> Vec<usize> {
        let mut hits: Vec<(f64, usize)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| ((p - query).norm_squared(), i))
            .filter(|(d, _)| *d <= radius * radius)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().take(k).map(|(_, i)| i).collect()
    }

    fn pseudo_random_cloud(n: usize) -> Vec<Point3<f64>> {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 10_000) as f64 / 1000.0
        };
        (0..n).map(|_| Point3::new(next(), next(), next())).collect()
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index: SpatialIndex<usize> = SpatialIndex::build(std::iter::empty());
        assert!(index.is_empty());
        assert!(index.k_nearest(&Point3::origin(), 3, 10.0).is_empty());
    }

    #[test]
    fn zero_k_returns_nothing() {
        let index = SpatialIndex::build([(0usize, Point3::origin())]);
        assert!(index.k_nearest(&Point3::origin(), 0, 10.0).is_empty());
    }

    #[test]
    fn matches_brute_force_on_random_cloud() {
        let points = pseudo_random_cloud(200);
        let index = SpatialIndex::build(points.iter().copied().enumerate());
        for query in pseudo_random_cloud(20) {
            for (k, radius) in [(1, 1.0), (4, 2.0), (9, 3.5), (50, 100.0)] {
                let got: Vec<usize> = index
                    .k_nearest(&query, k, radius)
                    .into_iter()
                    .map(|n| n.item)
                    .collect();
                assert_eq!(got, brute_force(&points, &query, k, radius));
            }
        }
    }

    #[test]
    fn radius_bound_is_inclusive() {
        let index = SpatialIndex::build([
            (0usize, Point3::new(0.0, 0.0, 0.0)),
            (1, Point3::new(1.5, 0.0, 0.0)),
            (2, Point3::new(1.5000001, 0.0, 0.0)),
        ]);
        let hits = index.k_nearest(&Point3::origin(), 10, 1.5);
        assert_eq!(hits.iter().map(|n| n.item).collect::<Vec<_>>(), vec![0, 1]);
        assert!((hits[1].distance_squared - 2.25).abs() < 1e-12);
    }

    #[test]
    fn coincident_points_are_all_reported_in_build_order() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let index = SpatialIndex::build([(10usize, p), (11, p), (12, p), (13, p)]);
        let hits: Vec<usize> = index.k_nearest(&p, 3, 0.1).into_iter().map(|n| n.item).collect();
        assert_eq!(hits, vec![10, 11, 12]);
    }

    #[test]
    fn collinear_points_are_ordered_by_distance() {
        let index = SpatialIndex::build(
            (0..10usize).map(|i| (i, Point3::new(i as f64, 0.0, 0.0))),
        );
        let hits: Vec<usize> = index
            .k_nearest(&Point3::new(4.2, 0.0, 0.0), 4, 5.0)
            .into_iter()
            .map(|n| n.item)
            .collect();
        assert_eq!(hits, vec![4, 5, 3, 6]);
    }
}
