use crate::table::MappingTable;
use log::debug;
use std::ops::RangeInclusive;

/// A contiguous run of codepoints `first..=last` with one folded value per
/// codepoint.
///
/// Codepoints inside the run that have no table entry carry their own value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interval {
    pub first: u32,
    pub last: u32,
    pub values: Vec<u32>,
}

impl Interval {
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn new(first: u32, values: Vec<u32>) -> Self {
        assert!(!values.is_empty(), "interval at U+{:04X} has no values", first);
        let last = first + values.len() as u32 - 1;
        Interval {
            first,
            last,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, codepoint: u32) -> bool {
        self.first <= codepoint && codepoint <= self.last
    }

    pub fn get(&self, codepoint: u32) -> Option<u32> {
        if self.contains(codepoint) {
            Some(self.values[(codepoint - self.first) as usize])
        } else {
            None
        }
    }

    /// `(codepoint, value)` pairs in ascending codepoint order.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.first..).zip(self.values.iter().copied())
    }
}

struct Accumulator {
    first: u32,
    last: u32,
    values: Vec<u32>,
}

impl Accumulator {
    fn start(codepoint: u32, target: u32) -> Self {
        Accumulator {
            first: codepoint,
            last: codepoint,
            values: vec![target],
        }
    }

    fn push(&mut self, codepoint: u32, target: u32) {
        while self.last + 1 < codepoint {
            self.last += 1;
            self.values.push(self.last);
        }
        self.values.push(target);
        self.last = codepoint;
    }

    fn finish(self) -> Interval {
        debug!(
            "interval {:04X}..={:04X}: {} codepoints",
            self.first,
            self.last,
            self.values.len(),
        );
        Interval {
            first: self.first,
            last: self.last,
            values: self.values,
        }
    }
}

/// Groups the entries of `table` within `range` into intervals.
///
/// Consecutive entries whose codepoints are at most `gap` apart land in the
/// same interval, the codepoints between them filled with identity values.
/// Identity entries at either end of the scan are dropped before grouping,
/// so no interval consists of identity values only.
pub fn build_intervals(
    table: &MappingTable,
    range: RangeInclusive<u32>,
    gap: u32,
) -> Vec<Interval> {
    let is_mapped = |&(codepoint, target): &(u32, u32)| codepoint != target;
    let start = match table.range(range.clone()).find(is_mapped) {
        Some((codepoint, _)) => codepoint,
        None => return Vec::new(),
    };
    let end = match table.range(range).rev().find(is_mapped) {
        Some((codepoint, _)) => codepoint,
        None => return Vec::new(),
    };

    let mut intervals = Vec::new();
    let mut current: Option<Accumulator> = None;
    for (codepoint, target) in table.range(start..=end) {
        if let Some(acc) = current.as_mut() {
            if codepoint <= acc.last.saturating_add(gap) {
                acc.push(codepoint, target);
                continue;
            }
        }
        intervals.extend(current.take().map(Accumulator::finish));
        current = Some(Accumulator::start(codepoint, target));
    }
    intervals.extend(current.map(Accumulator::finish));
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(u32, u32)]) -> MappingTable {
        entries.iter().copied().collect()
    }

    #[test]
    fn consecutive_entries_merge() {
        let table: MappingTable = (0x41..=0x5A).map(|c| (c, c + 32)).collect();
        let intervals = build_intervals(&table, 0..=0x10FFFF, 1);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].first, 0x41);
        assert_eq!(intervals[0].last, 0x5A);
        assert_eq!(intervals[0].len(), 26);
    }

    #[test]
    fn gaps_are_identity_filled() {
        let table = table(&[(0x100, 0x101), (0x104, 0x105)]);
        let intervals = build_intervals(&table, 0..=0x10FFFF, 4);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].values, [0x101, 0x101, 0x102, 0x103, 0x105]);
    }

    #[test]
    fn wide_gaps_split() {
        let table = table(&[(0x100, 0x101), (0x105, 0x106), (0x107, 0x108)]);
        let intervals = build_intervals(&table, 0..=0x10FFFF, 4);
        assert_eq!(intervals.len(), 2);
        assert_eq!((intervals[0].first, intervals[0].last), (0x100, 0x100));
        assert_eq!((intervals[1].first, intervals[1].last), (0x105, 0x107));
    }

    #[test]
    fn zero_gap_never_merges() {
        let table = table(&[(0x41, 0x61), (0x42, 0x62)]);
        let intervals = build_intervals(&table, 0..=0x10FFFF, 0);
        assert_eq!(intervals.len(), 2);
    }

    #[test]
    fn identity_ends_are_trimmed() {
        let table = table(&[(0x10, 0x10), (0x11, 0x21), (0x12, 0x22), (0x13, 0x13)]);
        let intervals = build_intervals(&table, 0..=0x10FFFF, 4);
        assert_eq!(intervals.len(), 1);
        assert_eq!((intervals[0].first, intervals[0].last), (0x11, 0x12));
    }

    #[test]
    fn restricted_range() {
        let table = table(&[(0x41, 0x61), (0x100, 0x101)]);
        let intervals = build_intervals(&table, 0x80..=0x7FF, 4);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].first, 0x100);
        assert!(build_intervals(&table, 0x800..=0xFFFF, 4).is_empty());
    }

    #[test]
    fn identity_only_range_is_empty() {
        let table = table(&[(0x41, 0x41), (0x42, 0x42)]);
        assert!(build_intervals(&table, 0..=0x10FFFF, 4).is_empty());
    }
}
