//! C code generation for a [`DispatchTree`].
//!
//! The tree is laid out as an implicit heap and each node becomes a labeled
//! block:
//!
//! ```text
//! range_0100_012F:
//! 	if (c < 0x0100) {
//! 		goto range_00C0_00DE;
//! 	}
//! 	if (c > 0x012F) {
//! 		return c;
//! 	}
//! 	return c | 1;
//! ```
//!
//! Every block ends in a result statement, so control never falls from one
//! block into the next.

use crate::output::Output;
use crate::strategy::{Mapping, MappingStrategy, StrategyKind};
use crate::tree::DispatchTree;
use std::collections::BTreeMap as Map;
use std::fmt::{self, Display};

/// How a computed result leaves the generated code.
pub trait ResultSink {
    /// Writes the statement(s) delivering `expr` at indentation `depth`.
    fn emit(&self, out: &mut Output, depth: usize, expr: &str);
}

/// `return <expr>;`, for a standalone function body.
#[derive(Copy, Clone, Debug, Default)]
pub struct Return;

impl ResultSink for Return {
    fn emit(&self, out: &mut Output, depth: usize, expr: &str) {
        out.indent(depth);
        writeln!(out, "return {};", expr);
    }
}

/// `<target> = <expr>; break;`, for a body embedded as one arm of an
/// enclosing `switch`.
#[derive(Copy, Clone, Debug)]
pub struct AssignBreak<'a> {
    pub target: &'a str,
}

impl<'a> ResultSink for AssignBreak<'a> {
    fn emit(&self, out: &mut Output, depth: usize, expr: &str) {
        out.indent(depth);
        writeln!(out, "{} = {};", self.target, expr);
        out.indent(depth);
        writeln!(out, "break;");
    }
}

/// Code for one tree node along with what it costs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Emitted {
    pub text: String,
    /// Comparisons on the path through this node: 1 for the bounding tests
    /// plus one per exception guard.
    pub branch_count: usize,
    /// Bytes of static lookup tables.
    pub data_size: usize,
}

/// Totals over a generated dispatch tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub intervals: usize,
    pub branches: usize,
    pub data_size: usize,
    pub height: usize,
    pub kinds: Map<StrategyKind, usize>,
}

impl Stats {
    fn record(&mut self, kind: StrategyKind, emitted: &Emitted) {
        self.intervals += 1;
        self.branches += emitted.branch_count;
        self.data_size += emitted.data_size;
        *self.kinds.entry(kind).or_insert(0) += 1;
    }

    pub fn count(&self, kind: StrategyKind) -> usize {
        self.kinds.get(&kind).copied().unwrap_or(0)
    }

    /// Adds the totals of another run, keeping the larger height.
    pub fn merge(&mut self, other: &Stats) {
        self.intervals += other.intervals;
        self.branches += other.branches;
        self.data_size += other.data_size;
        self.height = self.height.max(other.height);
        for (kind, count) in &other.kinds {
            *self.kinds.entry(*kind).or_insert(0) += count;
        }
    }
}

impl Display for Stats {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "{} intervals, {} branches, {} bytes of data, tree height {}",
            self.intervals, self.branches, self.data_size, self.height,
        )?;
        for (kind, count) in &self.kinds {
            write!(formatter, ", {} {}", count, kind)?;
        }
        Ok(())
    }
}

/// Generated code plus statistics.
#[derive(Clone, Debug)]
pub struct Generated {
    pub code: String,
    pub stats: Stats,
}

/// Emits the dispatch code for `tree`, testing the variable `var` and
/// delivering results through `sink`.
///
/// Codepoints outside every interval produce `var` unchanged. An empty tree
/// produces just that pass-through.
pub fn emit_tree<S>(tree: &DispatchTree, var: &str, sink: &S) -> Generated
where
    S: ResultSink + ?Sized,
{
    let mut out = Output::new();
    let mut stats = Stats {
        height: tree.height(),
        ..Stats::default()
    };

    let slots = tree.heap_order();
    if slots.is_empty() {
        sink.emit(&mut out, 1, var);
    }
    for (index, slot) in slots.iter().enumerate() {
        if let Some(mapping) = slot {
            let emitted = emit_node(&slots, index, mapping, var, sink);
            out.push_str(&emitted.text);
            stats.record(mapping.strategy.kind(), &emitted);
        }
    }

    Generated {
        code: out.into_string(),
        stats,
    }
}

fn emit_node<S>(
    slots: &[Option<&Mapping>],
    index: usize,
    mapping: &Mapping,
    var: &str,
    sink: &S,
) -> Emitted
where
    S: ResultSink + ?Sized,
{
    let mut out = Output::new();
    if index != 0 {
        writeln!(out, "{}:", label(mapping));
    }

    let child = |slot: usize| slots.get(slot).copied().flatten();
    writeln!(out, "\tif ({} < 0x{:04X}) {{", var, mapping.first);
    jump_or_pass(&mut out, child(2 * index + 1), var, sink);
    writeln!(out, "\t}}");
    writeln!(out, "\tif ({} > 0x{:04X}) {{", var, mapping.last);
    jump_or_pass(&mut out, child(2 * index + 2), var, sink);
    writeln!(out, "\t}}");

    let cost = emit_strategy(&mut out, 1, mapping, var, sink);
    Emitted {
        text: out.into_string(),
        branch_count: 1 + cost.guards,
        data_size: cost.data_size,
    }
}

fn jump_or_pass<S>(out: &mut Output, target: Option<&Mapping>, var: &str, sink: &S)
where
    S: ResultSink + ?Sized,
{
    match target {
        Some(target) => writeln!(out, "\t\tgoto {};", label(target)),
        None => sink.emit(out, 2, var),
    }
}

/// Label of a node's block.
pub fn label(mapping: &Mapping) -> String {
    format!("range_{:04X}_{:04X}", mapping.first, mapping.last)
}

/// Name of the static lookup table for a mapping's range.
pub fn table_name(mapping: &Mapping) -> String {
    format!("ucase_{:04X}_{:04X}", mapping.first, mapping.last)
}

#[derive(Default)]
struct Cost {
    guards: usize,
    data_size: usize,
}

fn emit_strategy<S>(out: &mut Output, depth: usize, mapping: &Mapping, var: &str, sink: &S) -> Cost
where
    S: ResultSink + ?Sized,
{
    let mut cost = Cost::default();
    match &mapping.strategy {
        MappingStrategy::Single { result } => {
            sink.emit(out, depth, &format!("0x{:04X}", result));
        }
        MappingStrategy::Delta { delta } => {
            sink.emit(out, depth, &offset_expr(var, *delta));
        }
        MappingStrategy::DeltaException {
            delta,
            exception,
            result,
        } => {
            out.indent(depth);
            writeln!(out, "if ({} == 0x{:04X}) {{", var, exception);
            sink.emit(out, depth + 1, &format!("0x{:04X}", result));
            out.indent(depth);
            writeln!(out, "}}");
            cost.guards += 1;
            sink.emit(out, depth, &offset_expr(var, *delta));
        }
        MappingStrategy::Set => {
            sink.emit(out, depth, &format!("{} | 1", var));
        }
        MappingStrategy::Reset { values } | MappingStrategy::Translation { values } => {
            cost.data_size += emit_table(out, depth, mapping, values);
            let expr = format!("{}[{} - 0x{:04X}]", table_name(mapping), var, mapping.first);
            sink.emit(out, depth, &expr);
        }
        MappingStrategy::SetException { patch } => {
            let mut conditions = Vec::new();
            if patch.first == patch.last {
                conditions.push(format!("{} == 0x{:04X}", var, patch.first));
            } else {
                if patch.first > mapping.first {
                    conditions.push(format!("{} >= 0x{:04X}", var, patch.first));
                }
                if patch.last < mapping.last {
                    conditions.push(format!("{} <= 0x{:04X}", var, patch.last));
                }
            }
            cost.guards += conditions.len();
            if conditions.is_empty() {
                let inner = emit_strategy(out, depth, patch, var, sink);
                cost.guards += inner.guards;
                cost.data_size += inner.data_size;
                return cost;
            }
            out.indent(depth);
            writeln!(out, "if ({}) {{", conditions.join(" && "));
            let inner = emit_strategy(out, depth + 1, patch, var, sink);
            cost.guards += inner.guards;
            cost.data_size += inner.data_size;
            out.indent(depth);
            writeln!(out, "}}");
            sink.emit(out, depth, &format!("{} | 1", var));
        }
    }
    cost
}

fn offset_expr(var: &str, delta: i64) -> String {
    match delta {
        0 => var.to_owned(),
        d if d > 0 => format!("{} + {}", var, d),
        d => format!("{} - {}", var, -d),
    }
}

/// Writes the lookup table declaration, returning its size in bytes.
fn emit_table(out: &mut Output, depth: usize, mapping: &Mapping, values: &[u32]) -> usize {
    let max = values.iter().copied().max().unwrap_or(0);
    let (ty, width) = if max <= 0xFF {
        ("uint8_t", 1)
    } else if max <= 0xFFFF {
        ("uint16_t", 2)
    } else {
        ("uint32_t", 4)
    };

    out.indent(depth);
    writeln!(out, "static const {} {}[] = {{", ty, table_name(mapping));
    for line in values.chunks(8) {
        out.indent(depth + 1);
        for (i, value) in line.iter().enumerate() {
            if i != 0 {
                write!(out, " ");
            }
            write!(out, "0x{:04X},", value);
        }
        writeln!(out);
    }
    out.indent(depth);
    writeln!(out, "}};");
    values.len() * width
}
