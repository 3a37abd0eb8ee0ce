//! Compile a Unicode simple case folding table into range-dispatch code.
//!
//! The table is cut into intervals of nearby mapped codepoints, each interval
//! gets the cheapest closed form that reproduces it (a constant offset, the
//! `c | 1` pairing of upper and lower case, a lookup table, or one of those
//! with a small patch), and the intervals are arranged in a balanced search
//! tree that is emitted as C code: a chain of labeled blocks, each doing two
//! range comparisons and jumping to a child block or producing a result.
//!
//! ```
//! use casefold_dispatch::{generate, Config, MappingTable, Return};
//!
//! let table: MappingTable = (0x41..=0x5A).map(|c| (c, c + 32)).collect();
//! let generated = generate(&table, &Config::default(), "c", &Return);
//! assert!(generated.code.ends_with("\treturn c + 32;\n"));
//! assert_eq!(generated.stats.intervals, 1);
//! ```

#![allow(
    clippy::len_without_is_empty,
    clippy::module_name_repetitions,
    clippy::new_without_default
)]

mod config;
mod emit;
mod interval;
mod output;
mod segment;
mod strategy;
mod table;
mod tree;

pub use crate::config::{Config, Strategies, DEFAULT_GAP};
pub use crate::emit::{
    emit_tree, label, table_name, AssignBreak, Emitted, Generated, ResultSink, Return, Stats,
};
pub use crate::interval::{build_intervals, Interval};
pub use crate::output::Output;
pub use crate::segment::{generate_segmented, Segment, Utf8Class};
pub use crate::strategy::{
    sequentialize, Classifier, Mapping, MappingStrategy, StrategyKind, DELTA_EXCEPTION_MIN,
    MAX_PATCHES,
};
pub use crate::table::{Entries, MappingTable};
pub use crate::tree::DispatchTree;

use std::ops::RangeInclusive;

/// Largest codepoint the generated code distinguishes (21 bits).
pub const MAX_CODEPOINT: u32 = 0x1F_FFFF;

/// Builds intervals over `range`, classifies them, and collects them into a
/// balanced tree.
pub fn build_tree(
    table: &MappingTable,
    range: RangeInclusive<u32>,
    gap: u32,
    config: &Config,
) -> DispatchTree {
    let classifier = Classifier::new(config);
    let mut tree = DispatchTree::new();
    for interval in build_intervals(table, range, gap) {
        tree.insert(classifier.classify(interval));
    }
    tree
}

/// Generates single-width dispatch code for the whole table.
pub fn generate<S>(table: &MappingTable, config: &Config, var: &str, sink: &S) -> Generated
where
    S: ResultSink + ?Sized,
{
    let tree = build_tree(table, 0..=MAX_CODEPOINT, config.gap, config);
    emit_tree(&tree, var, sink)
}
