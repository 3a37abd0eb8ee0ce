/// Default merge gap: mapped codepoints at most this far apart share an
/// interval.
pub const DEFAULT_GAP: u32 = 4;

/// Settings for one generation run.
///
/// Built once and passed by reference into the interval builder and the
/// classifier; nothing mutates it during generation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Merge gap for single-width output.
    pub gap: u32,
    /// Merge gap for the UTF-8 byte-length segmented output.
    pub utf8_gap: u32,
    pub strategies: Strategies,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gap: DEFAULT_GAP,
            utf8_gap: DEFAULT_GAP,
            strategies: Strategies::default(),
        }
    }
}

/// Which classification rules may be selected.
///
/// `Single` and `Translation` have no switch: a single codepoint is always
/// cheapest as a constant, and the lookup table is the fallback every
/// interval can use.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Strategies {
    pub delta: bool,
    pub delta_exception: bool,
    pub set: bool,
    pub set_exception: bool,
    /// Off unless asked for. See [`MappingStrategy::Reset`].
    ///
    /// [`MappingStrategy::Reset`]: crate::MappingStrategy::Reset
    pub reset: bool,
}

impl Default for Strategies {
    fn default() -> Self {
        Strategies {
            delta: true,
            delta_exception: true,
            set: true,
            set_exception: true,
            reset: false,
        }
    }
}

impl Strategies {
    /// Only the unconditional rules: every interval of two or more
    /// codepoints becomes a lookup table.
    pub fn translation_only() -> Self {
        Strategies {
            delta: false,
            delta_exception: false,
            set: false,
            set_exception: false,
            reset: false,
        }
    }
}
