//! The cap tracker.
//!
//! A `CapSet` owns the selected points and the exclusion index derived from
//! them. Adding a point records, for every tracked odd length `k`, each
//! `k`-combination it forms with already selected points under the XOR of
//! that combination. A value is blocked once some selected triple XORs to it:
//! adding it would give four distinct points with zero sum.

use std::collections::BTreeSet;

use tracing::debug;

use crate::combinations::{for_each_combination, xor_sum};
use crate::error::CapError;
use crate::exclusion::{Combination, ExclusionIndex};
use crate::rank::affine_rank;

/// Largest supported dimension. Completion and random steps scan all
/// `2^dim` values.
pub const MAX_DIM: u32 = 24;

/// Combination length whose presence blocks a value.
const BLOCKING_LENGTH: usize = 3;

/// Which odd combination lengths the exclusion index maintains.
///
/// Only length 3 ever blocks `add`; longer lengths are reported through
/// `excludes_count`. Their number grows as `2^size`, keep them for small caps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tracking {
    #[default]
    Triples,
    /// Every odd length from 3 up to and including the bound.
    UpTo(usize),
    /// Every odd length up to the current size.
    AllOdd,
}

impl Tracking {
    fn validate(self) -> Result<(), CapError> {
        match self {
            Self::UpTo(max) if max < BLOCKING_LENGTH => Err(CapError::InvalidTracking(
                "maximum combination length must be at least 3",
            )),
            Self::UpTo(max) if max % 2 == 0 => Err(CapError::InvalidTracking(
                "maximum combination length must be odd",
            )),
            _ => Ok(()),
        }
    }

    /// Tracked lengths for combinations drawn from `members` points.
    fn lengths(self, members: usize) -> impl Iterator<Item = usize> {
        let bound = match self {
            Self::Triples => BLOCKING_LENGTH,
            Self::UpTo(max) => max,
            Self::AllOdd => usize::MAX,
        };
        (BLOCKING_LENGTH..=bound.min(members)).step_by(2)
    }
}

fn validate_dim(dim: u32) -> Result<(), CapError> {
    if dim == 0 || dim > MAX_DIM {
        return Err(CapError::InvalidDimension { dim });
    }
    Ok(())
}

/// `rest` with `point` inserted at its sorted position.
fn with_point(rest: &[u32], point: u32) -> Combination {
    let at = rest.partition_point(|&p| p < point);
    let mut combination = Vec::with_capacity(rest.len() + 1);
    combination.extend_from_slice(&rest[..at]);
    combination.push(point);
    combination.extend_from_slice(&rest[at..]);
    combination.into_boxed_slice()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapSet {
    dim: u32,
    tracking: Tracking,
    points: BTreeSet<u32>,
    index: ExclusionIndex,
}

impl CapSet {
    /// Empty cap in GF(2)^dim tracking triples only.
    pub fn new(dim: u32) -> Result<Self, CapError> {
        Self::with_tracking(dim, Tracking::default())
    }

    pub fn with_tracking(dim: u32, tracking: Tracking) -> Result<Self, CapError> {
        validate_dim(dim)?;
        tracking.validate()?;
        Ok(Self {
            dim,
            tracking,
            points: BTreeSet::new(),
            index: ExclusionIndex::new(),
        })
    }

    #[inline]
    pub fn dim(&self) -> u32 {
        self.dim
    }

    #[inline]
    pub fn tracking(&self) -> Tracking {
        self.tracking
    }

    /// Number of values in the universe, `2^dim`.
    #[inline]
    pub fn universe_size(&self) -> u32 {
        1u32 << self.dim
    }

    /// Adds `point` to the cap.
    ///
    /// Fails with `OutOfRange` if `point >= 2^dim` and with `Excluded` if a
    /// selected triple XORs to `point`. Adding a point already in the cap is a
    /// no-op.
    pub fn add(&mut self, point: u32) -> Result<(), CapError> {
        if point >= self.universe_size() {
            return Err(CapError::OutOfRange {
                point,
                dim: self.dim,
            });
        }
        if self.is_blocked(point) {
            return Err(CapError::Excluded { point });
        }
        if self.points.contains(&point) {
            return Ok(());
        }

        let others: Vec<u32> = self.points.iter().copied().collect();
        let index = &mut self.index;
        for length in self.tracking.lengths(others.len() + 1) {
            for_each_combination(&others, length - 1, |rest| {
                let value = xor_sum(rest) ^ point;
                if value != point && rest.binary_search(&value).is_err() {
                    let inserted = index.insert(value, with_point(rest, point));
                    debug_assert!(inserted, "combination recorded twice");
                }
            });
        }
        self.points.insert(point);
        Ok(())
    }

    /// Removes `point` and every combination that references it. Removing a
    /// point not in the cap is a no-op.
    pub fn remove(&mut self, point: u32) -> Result<(), CapError> {
        if !self.points.remove(&point) {
            return Ok(());
        }

        let others: Vec<u32> = self.points.iter().copied().collect();
        let index = &mut self.index;
        let mut missing = None;
        for length in self.tracking.lengths(others.len() + 1) {
            for_each_combination(&others, length - 1, |rest| {
                let value = xor_sum(rest) ^ point;
                if value == point || rest.binary_search(&value).is_ok() {
                    return;
                }
                if !index.remove(value, &with_point(rest, point)) && missing.is_none() {
                    missing = Some(CapError::Inconsistency {
                        point,
                        value,
                        length,
                    });
                }
            });
        }
        match missing {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn contains(&self, point: u32) -> bool {
        self.points.contains(&point)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Selected points in ascending order.
    pub fn points(&self) -> impl Iterator<Item = u32> + '_ {
        self.points.iter().copied()
    }

    pub fn index(&self) -> &ExclusionIndex {
        &self.index
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.index.clear();
    }

    /// Odd lengths `k` for which some `k` selected points XOR to `point`,
    /// ascending. Empty if nothing maps to `point`.
    pub fn excludes_count(&self, point: u32) -> Vec<usize> {
        self.index.lengths(point).collect()
    }

    /// Combinations of `length` selected points that XOR to `point`.
    pub fn exclusions(&self, point: u32, length: usize) -> impl Iterator<Item = &[u32]> + '_ {
        self.index.combinations(point, length)
    }

    pub fn exclusion_count(&self, point: u32, length: usize) -> usize {
        self.index.count(point, length)
    }

    /// True if three selected points XOR to `point`.
    #[inline]
    pub fn is_blocked(&self, point: u32) -> bool {
        self.index.has_length(point, BLOCKING_LENGTH)
    }

    /// True if `point` is in the universe and could be added right now.
    #[inline]
    pub fn is_free(&self, point: u32) -> bool {
        point < self.universe_size() && !self.contains(point) && !self.is_blocked(point)
    }

    /// Values that are neither selected nor blocked, ascending.
    pub fn free_points(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.universe_size()).filter(move |&v| self.is_free(v))
    }

    pub fn free_count(&self) -> usize {
        self.free_points().count()
    }

    /// True if every value of the universe is selected or blocked.
    ///
    /// Scans all `2^dim` values.
    pub fn is_complete(&self) -> bool {
        self.free_points().next().is_none()
    }

    /// Adds every free value in ascending order until the cap is complete.
    /// Returns how many points were added.
    pub fn complete(&mut self) -> Result<usize, CapError> {
        let mut added = 0;
        for value in 0..self.universe_size() {
            if self.is_free(value) {
                self.add(value)?;
                added += 1;
            }
        }
        debug!(dim = self.dim, added, size = self.len(), "completed cap");
        Ok(added)
    }

    /// Changes the dimension, dropping every point that no longer fits.
    pub fn resize_dimension(&mut self, new_dim: u32) -> Result<(), CapError> {
        validate_dim(new_dim)?;
        let bound = 1u32 << new_dim;
        let dropped: Vec<u32> = self.points.range(bound..).copied().collect();
        for &point in &dropped {
            self.remove(point)?;
        }
        debug!(
            from = self.dim,
            to = new_dim,
            dropped = dropped.len(),
            "resized universe"
        );
        self.dim = new_dim;
        Ok(())
    }

    /// Affine rank of the selected points over GF(2).
    pub fn rank(&self) -> usize {
        let points: Vec<u32> = self.points().collect();
        affine_rank(&points, self.dim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// No two distinct pairs share an XOR, i.e. no four distinct points sum to zero.
    fn pairwise_xors_distinct(points: &[u32]) -> bool {
        let mut seen = HashSet::new();
        for (i, &a) in points.iter().enumerate() {
            for &b in &points[i + 1..] {
                if !seen.insert(a ^ b) {
                    return false;
                }
            }
        }
        true
    }

    /// Feeds `candidates` to `add`, ignoring rejected ones.
    fn build(dim: u32, tracking: Tracking, candidates: &[u32]) -> CapSet {
        let mut cap = CapSet::with_tracking(dim, tracking).unwrap();
        for &p in candidates {
            let _ = cap.add(p % cap.universe_size());
        }
        cap
    }

    #[test]
    fn test_dim3_scenario() {
        let mut cap = CapSet::new(3).unwrap();
        cap.add(0).unwrap();
        assert_eq!(cap.len(), 1);
        cap.add(1).unwrap();
        assert_eq!(cap.len(), 2);
        cap.add(2).unwrap();
        assert_eq!(cap.len(), 3);

        assert_eq!(cap.excludes_count(3), vec![3]);
        assert!(cap.is_blocked(3));
        assert_eq!(
            cap.exclusions(3, 3).collect::<Vec<_>>(),
            vec![&[0u32, 1, 2][..]]
        );
        assert_eq!(cap.add(3), Err(CapError::Excluded { point: 3 }));
        assert_eq!(cap.len(), 3);

        cap.remove(2).unwrap();
        assert!(!cap.is_blocked(3));
        cap.add(3).unwrap();
        assert_eq!(cap.len(), 3);
        assert_eq!(cap.points().collect::<Vec<_>>(), vec![0, 1, 3]);
        assert!(cap.is_blocked(2));
    }

    #[test]
    fn test_add_out_of_range() {
        let mut cap = CapSet::new(3).unwrap();
        assert_eq!(cap.add(8), Err(CapError::OutOfRange { point: 8, dim: 3 }));
        assert!(cap.add(7).is_ok());
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut cap = CapSet::new(4).unwrap();
        for p in [1, 2, 4] {
            cap.add(p).unwrap();
        }
        let before = cap.clone();
        cap.add(2).unwrap();
        assert_eq!(cap, before);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cap = CapSet::new(4).unwrap();
        cap.add(5).unwrap();
        let before = cap.clone();
        cap.remove(6).unwrap();
        assert_eq!(cap, before);
    }

    #[test]
    fn test_invalid_dimension() {
        assert_eq!(
            CapSet::new(0).unwrap_err(),
            CapError::InvalidDimension { dim: 0 }
        );
        assert_eq!(
            CapSet::new(MAX_DIM + 1).unwrap_err(),
            CapError::InvalidDimension { dim: MAX_DIM + 1 }
        );
        assert!(CapSet::new(1).is_ok());
        assert!(CapSet::new(MAX_DIM).is_ok());
    }

    #[test]
    fn test_invalid_tracking() {
        assert!(matches!(
            CapSet::with_tracking(4, Tracking::UpTo(1)),
            Err(CapError::InvalidTracking(_))
        ));
        assert!(matches!(
            CapSet::with_tracking(4, Tracking::UpTo(4)),
            Err(CapError::InvalidTracking(_))
        ));
        assert!(CapSet::with_tracking(4, Tracking::UpTo(5)).is_ok());
    }

    #[test]
    fn test_clear() {
        let mut cap = build(4, Tracking::AllOdd, &[0, 1, 2, 4, 8]);
        assert!(!cap.index().is_empty());
        cap.clear();
        assert!(cap.is_empty());
        assert!(cap.index().is_empty());
        assert_eq!(cap, CapSet::with_tracking(4, Tracking::AllOdd).unwrap());
    }

    #[test]
    fn test_complete_dim2() {
        let mut cap = CapSet::new(2).unwrap();
        assert_eq!(cap.complete().unwrap(), 3);
        assert_eq!(cap.points().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(cap.is_complete());
        assert!(cap.is_blocked(3));
    }

    #[test]
    fn test_complete_is_idempotent() {
        for dim in 1..=6 {
            let mut cap = CapSet::new(dim).unwrap();
            cap.complete().unwrap();
            assert!(cap.is_complete(), "dim {dim}");
            let once = cap.clone();
            assert_eq!(cap.complete().unwrap(), 0);
            assert_eq!(cap, once);
        }
    }

    #[test]
    fn test_greedy_cap_sizes() {
        // Ascending greedy completion from empty.
        let expected = [2, 3, 4, 6, 7, 9];
        for (dim, &size) in (1..=6).zip(expected.iter()) {
            let mut cap = CapSet::new(dim).unwrap();
            cap.complete().unwrap();
            assert_eq!(cap.len(), size, "dim {dim}");
            let points: Vec<u32> = cap.points().collect();
            assert!(pairwise_xors_distinct(&points));
        }
    }

    #[test]
    fn test_free_points() {
        let mut cap = CapSet::new(2).unwrap();
        assert_eq!(cap.free_count(), 4);
        cap.add(0).unwrap();
        cap.add(1).unwrap();
        assert_eq!(cap.free_points().collect::<Vec<_>>(), vec![2, 3]);
        cap.add(3).unwrap();
        assert_eq!(cap.free_count(), 0);
        assert!(cap.is_complete());
        assert!(!cap.is_free(4));
    }

    #[test]
    fn test_higher_lengths_reported() {
        let mut cap = CapSet::with_tracking(4, Tracking::AllOdd).unwrap();
        for p in [0, 1, 2, 4, 8] {
            cap.add(p).unwrap();
        }
        // 0 ^ 1 ^ 2 ^ 4 ^ 8 = 15, and no triple reaches 15.
        assert_eq!(cap.excludes_count(15), vec![5]);
        assert!(!cap.is_blocked(15));
        assert_eq!(cap.exclusion_count(15, 5), 1);
        cap.add(15).unwrap();

        let triples = build(4, Tracking::Triples, &[0, 1, 2, 4, 8]);
        assert!(triples.excludes_count(15).is_empty());
    }

    #[test]
    fn test_resize_drops_points() {
        let mut cap = CapSet::new(4).unwrap();
        for p in [0, 1, 2, 8, 12] {
            let _ = cap.add(p);
        }
        let kept: Vec<u32> = cap.points().filter(|&p| p < 4).collect();
        cap.resize_dimension(2).unwrap();
        assert_eq!(cap.dim(), 2);
        assert_eq!(cap.points().collect::<Vec<_>>(), kept);
        assert_eq!(cap, build(2, Tracking::Triples, &kept));

        cap.resize_dimension(5).unwrap();
        assert_eq!(cap.universe_size(), 32);
        assert_eq!(cap.points().collect::<Vec<_>>(), kept);
    }

    #[test]
    fn test_resize_keeps_boundary_exclusive() {
        let mut cap = CapSet::new(3).unwrap();
        cap.add(4).unwrap();
        cap.resize_dimension(2).unwrap();
        assert!(!cap.contains(4));
        assert!(cap.resize_dimension(0).is_err());
        assert_eq!(cap.dim(), 2);
    }

    #[test]
    fn test_rank_small() {
        let mut cap = CapSet::new(4).unwrap();
        assert_eq!(cap.rank(), 0);
        cap.add(9).unwrap();
        assert_eq!(cap.rank(), 1);
        cap.add(1).unwrap();
        assert_eq!(cap.rank(), 2);
        cap.add(0).unwrap();
        assert_eq!(cap.rank(), 3);
    }

    fn tracking_strategy() -> impl Strategy<Value = Tracking> {
        prop_oneof![
            Just(Tracking::Triples),
            Just(Tracking::UpTo(5)),
            Just(Tracking::AllOdd),
        ]
    }

    /// Tracked lengths `k <= max_length` for which some `k` points XOR to a
    /// value outside the combination.
    fn brute_force_lengths(points: &[u32], value: u32, max_length: usize) -> Vec<usize> {
        let mut lengths = Vec::new();
        for length in (3..=points.len().min(max_length)).step_by(2) {
            let mut hit = false;
            for_each_combination(points, length, |c| {
                if xor_sum(c) == value && !c.contains(&value) {
                    hit = true;
                }
            });
            if hit {
                lengths.push(length);
            }
        }
        lengths
    }

    #[test]
    fn test_up_to_five_tracking() {
        let mut cap = build(6, Tracking::UpTo(5), &[0, 1, 2, 4, 8, 16, 32, 7]);
        let points: Vec<u32> = cap.points().collect();
        assert!(points.len() >= 7);
        for value in 0..cap.universe_size() {
            assert_eq!(
                cap.excludes_count(value),
                brute_force_lengths(&points, value, 5),
                "value {value}"
            );
        }
        assert!(points.iter().all(|&p| cap.excludes_count(p).iter().all(|&k| k <= 5)));

        for &p in &points {
            cap.remove(p).unwrap();
        }
        assert!(cap.is_empty());
        assert!(cap.index().is_empty());
    }

    proptest! {
        #[test]
        fn prop_no_four_points_sum_to_zero(
            dim in 1u32..=7,
            candidates in prop::collection::vec(any::<u32>(), 0..64),
        ) {
            let cap = build(dim, Tracking::Triples, &candidates);
            let points: Vec<u32> = cap.points().collect();
            prop_assert!(pairwise_xors_distinct(&points));
            prop_assert_eq!(cap.len(), points.len());
        }

        #[test]
        fn prop_add_remove_round_trip(
            dim in 2u32..=5,
            candidates in prop::collection::vec(any::<u32>(), 0..16),
            extra in any::<u32>(),
            tracking in tracking_strategy(),
        ) {
            let mut cap = build(dim, tracking, &candidates);
            let point = extra % cap.universe_size();
            prop_assume!(cap.is_free(point));
            let before = cap.clone();
            cap.add(point).unwrap();
            cap.remove(point).unwrap();
            prop_assert_eq!(cap, before);
        }

        #[test]
        fn prop_remove_any_point_matches_rebuild(
            dim in 2u32..=5,
            candidates in prop::collection::vec(any::<u32>(), 1..16),
            pick in any::<prop::sample::Index>(),
            tracking in tracking_strategy(),
        ) {
            let mut cap = build(dim, tracking, &candidates);
            let points: Vec<u32> = cap.points().collect();
            let victim = points[pick.index(points.len())];
            cap.remove(victim).unwrap();

            let rest: Vec<u32> = points.iter().copied().filter(|&p| p != victim).collect();
            prop_assert_eq!(cap, build(dim, tracking, &rest));
        }

        #[test]
        fn prop_excludes_count_matches_brute_force(
            dim in 2u32..=5,
            candidates in prop::collection::vec(any::<u32>(), 0..12),
            up_to_five in any::<bool>(),
        ) {
            let (tracking, max_length) = if up_to_five {
                (Tracking::UpTo(5), 5)
            } else {
                (Tracking::AllOdd, usize::MAX)
            };
            let cap = build(dim, tracking, &candidates);
            let points: Vec<u32> = cap.points().collect();
            for value in 0..cap.universe_size() {
                prop_assert_eq!(
                    cap.excludes_count(value),
                    brute_force_lengths(&points, value, max_length),
                    "value {}",
                    value
                );
            }
        }
    }
}
