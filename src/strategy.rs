use crate::config::{Config, Strategies};
use crate::interval::Interval;
use log::{debug, warn};
use std::collections::BTreeMap as Map;
use std::fmt::{self, Display};

/// Most synthetic entries sequentialization may insert into an exception set
/// before giving up.
pub const MAX_PATCHES: usize = 4;

/// `DeltaException` needs strictly more conforming codepoints than this.
pub const DELTA_EXCEPTION_MIN: usize = 4;

/// An interval's codepoint range together with the closed form chosen for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mapping {
    pub first: u32,
    pub last: u32,
    pub strategy: MappingStrategy,
}

/// How the folded value of a codepoint `c` in `first..=last` is computed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MappingStrategy {
    /// The interval is one codepoint; fold to `result`.
    Single { result: u32 },
    /// `c + delta`.
    Delta { delta: i64 },
    /// `c + delta`, except `exception` which folds to `result`.
    DeltaException {
        delta: i64,
        exception: u32,
        result: u32,
    },
    /// `c | 1`.
    Set,
    /// Every value satisfies `value & !1 == c`.
    ///
    /// A contiguous run of two or more codepoints contains an odd codepoint,
    /// which never satisfies that test, so in practice this only matches runs
    /// that `Single` already claims. There is no closed form for it; it is
    /// emitted as a lookup over `values`.
    Reset { values: Vec<u32> },
    /// `c | 1`, except codepoints inside `patch`, which is a `Single` or
    /// `Translation` mapping over a sub-range of the interval.
    SetException { patch: Box<Mapping> },
    /// `values[c - first]`.
    Translation { values: Vec<u32> },
}

/// Fieldless mirror of [`MappingStrategy`] for reporting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StrategyKind {
    Single,
    Delta,
    DeltaException,
    Set,
    Reset,
    SetException,
    Translation,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 7] = [
        StrategyKind::Single,
        StrategyKind::Delta,
        StrategyKind::DeltaException,
        StrategyKind::Set,
        StrategyKind::Reset,
        StrategyKind::SetException,
        StrategyKind::Translation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Single => "single",
            StrategyKind::Delta => "delta",
            StrategyKind::DeltaException => "delta-exception",
            StrategyKind::Set => "set",
            StrategyKind::Reset => "reset",
            StrategyKind::SetException => "set-exception",
            StrategyKind::Translation => "translation",
        }
    }
}

impl Display for StrategyKind {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl MappingStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            MappingStrategy::Single { .. } => StrategyKind::Single,
            MappingStrategy::Delta { .. } => StrategyKind::Delta,
            MappingStrategy::DeltaException { .. } => StrategyKind::DeltaException,
            MappingStrategy::Set => StrategyKind::Set,
            MappingStrategy::Reset { .. } => StrategyKind::Reset,
            MappingStrategy::SetException { .. } => StrategyKind::SetException,
            MappingStrategy::Translation { .. } => StrategyKind::Translation,
        }
    }
}

impl Mapping {
    pub fn contains(&self, codepoint: u32) -> bool {
        self.first <= codepoint && codepoint <= self.last
    }

    pub fn len(&self) -> usize {
        (self.last - self.first) as usize + 1
    }

    /// Folds `codepoint`, which must lie in `first..=last`.
    pub fn apply(&self, codepoint: u32) -> u32 {
        debug_assert!(self.contains(codepoint));
        match &self.strategy {
            MappingStrategy::Single { result } => *result,
            MappingStrategy::Delta { delta } => offset(codepoint, *delta),
            MappingStrategy::DeltaException {
                delta,
                exception,
                result,
            } => {
                if codepoint == *exception {
                    *result
                } else {
                    offset(codepoint, *delta)
                }
            }
            MappingStrategy::Set => codepoint | 1,
            MappingStrategy::Reset { values } | MappingStrategy::Translation { values } => {
                values[(codepoint - self.first) as usize]
            }
            MappingStrategy::SetException { patch } => {
                if patch.contains(codepoint) {
                    patch.apply(codepoint)
                } else {
                    codepoint | 1
                }
            }
        }
    }
}

fn offset(codepoint: u32, delta: i64) -> u32 {
    (i64::from(codepoint) + delta) as u32
}

/// Picks a [`MappingStrategy`] for each interval.
///
/// Rules are tried in a fixed order and the first that applies wins:
/// single, delta, delta with one exception, set, reset, set with an
/// exception run, translation. Rules switched off in [`Strategies`] are
/// skipped.
#[derive(Copy, Clone, Debug)]
pub struct Classifier {
    strategies: Strategies,
}

impl Classifier {
    pub fn new(config: &Config) -> Self {
        Classifier {
            strategies: config.strategies,
        }
    }

    pub fn with_strategies(strategies: Strategies) -> Self {
        Classifier { strategies }
    }

    pub fn classify(&self, interval: Interval) -> Mapping {
        let (first, last) = (interval.first, interval.last);
        let strategy = self.select(interval);
        debug!("{:04X}..={:04X}: {}", first, last, strategy.kind());
        Mapping {
            first,
            last,
            strategy,
        }
    }

    fn select(&self, interval: Interval) -> MappingStrategy {
        if interval.len() == 1 {
            return MappingStrategy::Single {
                result: interval.values[0],
            };
        }

        let census = Census::of(&interval);
        census.report_partial(&interval);
        let len = interval.len();

        if self.strategies.delta {
            if let Some(delta) = census.uniform_delta(len) {
                return MappingStrategy::Delta { delta };
            }
        }
        if self.strategies.delta_exception {
            if let Some(strategy) = delta_exception(&interval, &census) {
                return strategy;
            }
        }
        if self.strategies.set && census.set == len {
            return MappingStrategy::Set;
        }
        if self.strategies.reset && census.reset == len {
            return MappingStrategy::Reset {
                values: interval.values,
            };
        }
        if self.strategies.set_exception {
            if let Some(patch) = set_exception(&interval, &census) {
                return MappingStrategy::SetException {
                    patch: Box::new(patch),
                };
            }
        }
        MappingStrategy::Translation {
            values: interval.values,
        }
    }
}

/// Per-rule match counts over one interval.
struct Census {
    deltas: Map<i64, usize>,
    set: usize,
    reset: usize,
}

impl Census {
    fn of(interval: &Interval) -> Self {
        let mut census = Census {
            deltas: Map::new(),
            set: 0,
            reset: 0,
        };
        for (codepoint, value) in interval.pairs() {
            let delta = i64::from(value) - i64::from(codepoint);
            *census.deltas.entry(delta).or_insert(0) += 1;
            if codepoint | 1 == value {
                census.set += 1;
            }
            if value & !1 == codepoint {
                census.reset += 1;
            }
        }
        census
    }

    fn uniform_delta(&self, len: usize) -> Option<i64> {
        match self.deltas.iter().next() {
            Some((&delta, &count)) if count == len => Some(delta),
            _ => None,
        }
    }

    fn report_partial(&self, interval: &Interval) {
        let len = interval.len();
        if self.set != 0 && self.set != len {
            warn!(
                "set: {:04X}: {} of {} codepoints",
                interval.first, self.set, len,
            );
        }
        if self.reset != 0 && self.reset != len {
            warn!(
                "reset: {:04X}: {} of {} codepoints",
                interval.first, self.reset, len,
            );
        }
    }
}

fn delta_exception(interval: &Interval, census: &Census) -> Option<MappingStrategy> {
    let conforming = interval.len() - 1;
    if conforming <= DELTA_EXCEPTION_MIN {
        return None;
    }
    let (&delta, _) = census
        .deltas
        .iter()
        .find(|&(_, &count)| count == conforming)?;
    let (exception, result) = interval
        .pairs()
        .find(|&(codepoint, value)| i64::from(value) - i64::from(codepoint) != delta)?;
    Some(MappingStrategy::DeltaException {
        delta,
        exception,
        result,
    })
}

fn set_exception(interval: &Interval, census: &Census) -> Option<Mapping> {
    let mut exceptions: Map<u32, u32> = interval
        .pairs()
        .filter(|&(codepoint, value)| codepoint | 1 != value)
        .collect();
    if exceptions.is_empty() {
        return None;
    }

    let patches = match sequentialize(&mut exceptions, |codepoint| codepoint | 1) {
        Some(patches) => patches,
        None => {
            debug!(
                "set-exception: {:04X}: exceptions not sequential within {} patches",
                interval.first, MAX_PATCHES,
            );
            return None;
        }
    };

    let conforming_outside = census.set - patches;
    if conforming_outside == 0 || exceptions.len() + conforming_outside != interval.len() {
        return None;
    }

    let first = *exceptions.keys().next()?;
    let values: Vec<u32> = exceptions.into_values().collect();
    let last = first + values.len() as u32 - 1;
    let strategy = if values.len() == 1 {
        MappingStrategy::Single { result: values[0] }
    } else {
        MappingStrategy::Translation { values }
    };
    Some(Mapping {
        first,
        last,
        strategy,
    })
}

/// Closes the gaps in `exceptions` by inserting entries computed by `rule`.
///
/// Returns the number of entries inserted once the keys are contiguous, or
/// `None` if that would take more than [`MAX_PATCHES`] insertions. On `None`
/// the map may hold some inserted entries.
pub fn sequentialize(exceptions: &mut Map<u32, u32>, rule: impl Fn(u32) -> u32) -> Option<usize> {
    let mut patches = 0;
    loop {
        let missing = exceptions
            .keys()
            .zip(exceptions.keys().skip(1))
            .find(|&(&lo, &hi)| hi > lo + 1)
            .map(|(&lo, _)| lo + 1);
        let missing = match missing {
            Some(missing) => missing,
            None => return Some(patches),
        };
        if patches == MAX_PATCHES {
            return None;
        }
        exceptions.insert(missing, rule(missing));
        patches += 1;
    }
}
