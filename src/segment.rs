use crate::config::Config;
use crate::emit::{self, AssignBreak, Generated};
use crate::table::MappingTable;
use crate::build_tree;
use std::ops::RangeInclusive;

/// The codepoint ranges that encode to 1, 2, 3 and 4 UTF-8 bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Utf8Class {
    One,
    Two,
    Three,
    Four,
}

impl Utf8Class {
    pub const ALL: [Utf8Class; 4] = [
        Utf8Class::One,
        Utf8Class::Two,
        Utf8Class::Three,
        Utf8Class::Four,
    ];

    pub fn range(self) -> RangeInclusive<u32> {
        match self {
            Utf8Class::One => 0x0..=0x7F,
            Utf8Class::Two => 0x80..=0x7FF,
            Utf8Class::Three => 0x800..=0xFFFF,
            Utf8Class::Four => 0x10000..=0x1FFFFF,
        }
    }

    pub fn byte_len(self) -> usize {
        match self {
            Utf8Class::One => 1,
            Utf8Class::Two => 2,
            Utf8Class::Three => 3,
            Utf8Class::Four => 4,
        }
    }

    pub fn of(codepoint: u32) -> Option<Self> {
        Utf8Class::ALL
            .iter()
            .copied()
            .find(|class| class.range().contains(&codepoint))
    }
}

/// Dispatch code for one UTF-8 length class.
pub struct Segment {
    pub class: Utf8Class,
    pub generated: Generated,
}

/// Generates one artifact per UTF-8 length class, each meant to be the body
/// of one arm in a `switch` over the encoded length. Results are assigned to
/// `target` followed by `break`.
///
/// Intervals never straddle a class boundary. A class with no mappings gets
/// a body that assigns `var` unchanged.
pub fn generate_segmented(
    table: &MappingTable,
    config: &Config,
    var: &str,
    target: &str,
) -> Vec<Segment> {
    let sink = AssignBreak { target };
    Utf8Class::ALL
        .iter()
        .map(|&class| {
            let tree = build_tree(table, class.range(), config.utf8_gap, config);
            Segment {
                class,
                generated: emit::emit_tree(&tree, var, &sink),
            }
        })
        .collect()
}
