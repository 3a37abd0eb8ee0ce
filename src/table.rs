use std::collections::btree_map::{self, BTreeMap as Map};
use std::ops::RangeInclusive;

/// Ordered codepoint → folded codepoint mapping.
///
/// Keys are unique and iterate in ascending order. Codepoints without an
/// entry fold to themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MappingTable {
    map: Map<u32, u32>,
}

impl MappingTable {
    pub fn new() -> Self {
        MappingTable { map: Map::new() }
    }

    /// Loads the simple (`S`) and common (`C`) rows of a `CaseFolding.txt`.
    ///
    /// Comments, blank lines, full (`F`) and Turkic (`T`) rows, and anything
    /// that does not parse are skipped.
    pub fn parse_case_folding(contents: &str) -> Self {
        let mut table = MappingTable::new();
        for line in contents.lines() {
            if let Some((codepoint, target)) = parse_line(line) {
                table.insert(codepoint, target);
            }
        }
        table
    }

    pub fn insert(&mut self, codepoint: u32, target: u32) -> Option<u32> {
        self.map.insert(codepoint, target)
    }

    pub fn get(&self, codepoint: u32) -> Option<u32> {
        self.map.get(&codepoint).copied()
    }

    /// The folded value of `codepoint`, identity when there is no entry.
    pub fn fold(&self, codepoint: u32) -> u32 {
        self.get(codepoint).unwrap_or(codepoint)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> Entries {
        Entries {
            inner: self.map.range(..),
        }
    }

    /// Entries whose codepoint lies in `range`, in ascending order.
    pub fn range(&self, range: RangeInclusive<u32>) -> Entries {
        Entries {
            inner: self.map.range(range),
        }
    }
}

impl FromIterator<(u32, u32)> for MappingTable {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        MappingTable {
            map: iter.into_iter().collect(),
        }
    }
}

impl Extend<(u32, u32)> for MappingTable {
    fn extend<I: IntoIterator<Item = (u32, u32)>>(&mut self, iter: I) {
        self.map.extend(iter);
    }
}

/// Iterator over `(codepoint, target)` pairs of a [`MappingTable`].
#[derive(Clone)]
pub struct Entries<'a> {
    inner: btree_map::Range<'a, u32, u32>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(&k, &v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> DoubleEndedIterator for Entries<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(&k, &v)| (k, v))
    }
}

// <code>; <status>; <mapping>; # <name>
fn parse_line(line: &str) -> Option<(u32, u32)> {
    let line = line.split('#').next()?;
    let mut fields = line.split(';').map(str::trim);
    let codepoint = parse_codepoint(fields.next()?)?;
    let status = fields.next()?;
    if status != "C" && status != "S" {
        return None;
    }
    let target = parse_codepoint(fields.next()?)?;
    Some((codepoint, target))
}

fn parse_codepoint(s: &str) -> Option<u32> {
    u32::from_str_radix(s, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# CaseFolding-16.0.0.txt
#
# <code>; <status>; <mapping>; # <name>

0041; C; 0061; # LATIN CAPITAL LETTER A
00DF; F; 0073 0073; # LATIN SMALL LETTER SHARP S
0130; T; 0069; # LATIN CAPITAL LETTER I WITH DOT ABOVE
1E9E; S; 00DF; # LATIN CAPITAL LETTER SHARP S
1E9E; F; 0073 0073; # LATIN CAPITAL LETTER SHARP S
zzzz; C; 0061; # garbage
0042; C
";

    #[test]
    fn keeps_simple_and_common_rows() {
        let table = MappingTable::parse_case_folding(SAMPLE);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0x41), Some(0x61));
        assert_eq!(table.get(0x1E9E), Some(0xDF));
        assert_eq!(table.get(0xDF), None);
        assert_eq!(table.get(0x130), None);
    }

    #[test]
    fn fold_defaults_to_identity() {
        let table: MappingTable = [(0x41, 0x61)].into_iter().collect();
        assert_eq!(table.fold(0x41), 0x61);
        assert_eq!(table.fold(0x42), 0x42);
    }

    #[test]
    fn range_is_ordered_and_bounded() {
        let table: MappingTable = [(0x10, 1), (0x05, 2), (0x80, 3)].into_iter().collect();
        let entries: Vec<_> = table.range(0..=0x7F).collect();
        assert_eq!(entries, [(0x05, 2), (0x10, 1)]);
    }
}
