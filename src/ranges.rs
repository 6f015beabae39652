//! Sorted, disjoint, coalesced sets of slot ranges.
//!
//! Invariants held by every method:
//!    - ranges are sorted by `start`
//!    - ranges neither overlap nor touch (`[1, 3)` and `[3, 5)` become `[1, 5)`)
//!    - every stored range is non-empty
//!
//! Lookups are `O(log n)` plus the number of ranges touched.

use crate::timegrid::SlotRange;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RangeSet {
    ranges: Vec<SlotRange>,
}

impl RangeSet {
    #[inline]
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Builds a set from arbitrary ranges, merging as it goes.
    pub fn from_ranges(ranges: impl IntoIterator<Item = SlotRange>) -> Self {
        let mut set = Self::new();
        for range in ranges {
            set.insert(range);
        }
        set
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[SlotRange] {
        &self.ranges
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotRange> + '_ {
        self.ranges.iter()
    }

    /// Whether any stored range overlaps `range`.
    pub fn overlaps(&self, range: &SlotRange) -> bool {
        if range.is_empty() {
            return false;
        }
        let idx = self.ranges.partition_point(|r| r.end <= range.start);
        self.ranges
            .get(idx)
            .is_some_and(|candidate| candidate.start < range.end)
    }

    /// Whether a single stored range contains all of `range`.
    pub fn covers(&self, range: &SlotRange) -> bool {
        let idx = self.ranges.partition_point(|r| r.end <= range.start);
        self.ranges
            .get(idx)
            .is_some_and(|candidate| candidate.contains(range))
    }

    pub fn insert(&mut self, range: SlotRange) {
        if range.is_empty() {
            return;
        }
        // everything in lo..hi overlaps or touches `range`
        let lo = self.ranges.partition_point(|r| r.end < range.start);
        let hi = self.ranges.partition_point(|r| r.start <= range.end);
        let merged = self.ranges[lo..hi]
            .iter()
            .fold(range, |acc, r| acc.hull(r));
        self.ranges.splice(lo..hi, std::iter::once(merged));
    }

    pub fn remove(&mut self, range: SlotRange) {
        if range.is_empty() {
            return;
        }
        let lo = self.ranges.partition_point(|r| r.end <= range.start);
        let hi = self.ranges.partition_point(|r| r.start < range.end);
        if lo >= hi {
            return;
        }
        let first = self.ranges[lo];
        let last = self.ranges[hi - 1];
        let mut remainder = Vec::with_capacity(2);
        if first.start < range.start {
            remainder.push(SlotRange::new(first.start, range.start));
        }
        if range.end < last.end {
            remainder.push(SlotRange::new(range.end, last.end));
        }
        self.ranges.splice(lo..hi, remainder);
    }

    /// Parts of the set that fall inside `within`.
    pub fn clip(&self, within: SlotRange) -> Vec<SlotRange> {
        let idx = self.ranges.partition_point(|r| r.end <= within.start);
        self.ranges[idx..]
            .iter()
            .take_while(|r| r.start < within.end)
            .filter_map(|r| r.intersection(&within))
            .collect()
    }

    /// Parts of `within` that the set does not cover.
    pub fn gaps(&self, within: SlotRange) -> Vec<SlotRange> {
        let mut gaps = Vec::new();
        let mut cursor = within.start;
        for taken in self.clip(within) {
            if cursor < taken.start {
                gaps.push(SlotRange::new(cursor, taken.start));
            }
            cursor = taken.end;
        }
        if cursor < within.end {
            gaps.push(SlotRange::new(cursor, within.end));
        }
        gaps
    }

    pub fn intersection(&self, other: &RangeSet) -> RangeSet {
        let (mut i, mut j) = (0, 0);
        let mut ranges = Vec::new();
        while i < self.ranges.len() && j < other.ranges.len() {
            let (a, b) = (self.ranges[i], other.ranges[j]);
            if let Some(both) = a.intersection(&b) {
                ranges.push(both);
            }
            if a.end <= b.end {
                i += 1;
            } else {
                j += 1;
            }
        }
        // pieces cut from disjoint inputs are already sorted and apart
        RangeSet { ranges }
    }
}
