//! Table sizing configuration for `OpenHashMap`.

use crate::error::MapError;

/// Expected element count used by `OpenHashMap::new`.
pub const DEFAULT_INITIAL_SIZE: usize = 16;
/// Load factor used unless a config says otherwise.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;
/// Trades memory for shorter probe chains.
pub const FAST_LOAD_FACTOR: f32 = 0.5;
/// Trades more memory for even shorter probe chains.
pub const VERY_FAST_LOAD_FACTOR: f32 = 0.25;

/// Largest table (in slots) the sizing helpers will produce.
const MAX_TABLE_SIZE: usize = 1 << (usize::BITS - 2);

/// Construction parameters for an open-addressing map.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapConfig {
    /// Number of elements the map should hold without rehashing.
    pub expected: usize,
    /// Fraction of the table that may be occupied before it doubles.
    pub load_factor: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            expected: DEFAULT_INITIAL_SIZE,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expected(mut self, expected: usize) -> Self {
        self.expected = expected;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn validate(&self) -> Result<(), MapError> {
        // NaN fails both comparisons.
        if self.load_factor > 0.0 && self.load_factor < 1.0 {
            Ok(())
        } else {
            Err(MapError::InvalidLoadFactor(self.load_factor))
        }
    }

    /// Validated table size for this config.
    pub fn table_size(&self) -> Result<usize, MapError> {
        self.validate()?;
        array_size(self.expected, self.load_factor)
    }
}

/// Smallest power-of-two table (at least 2 slots) that holds `expected`
/// elements under load factor `f`.
pub fn array_size(expected: usize, f: f32) -> Result<usize, MapError> {
    let needed = (expected as f64 / f as f64).ceil();
    if needed > MAX_TABLE_SIZE as f64 {
        return Err(MapError::CapacityOverflow { expected });
    }
    Ok((needed as usize).max(2).next_power_of_two())
}

/// Like `array_size` but saturates at the largest table instead of failing.
pub(crate) fn array_size_saturating(expected: usize, f: f32) -> usize {
    array_size(expected, f).unwrap_or(MAX_TABLE_SIZE)
}

/// Number of elements a table of `n` slots accepts before it must grow.
/// Always leaves at least one free slot so probing terminates.
pub fn max_fill(n: usize, f: f32) -> usize {
    ((n as f64 * f as f64).ceil() as usize).min(n - 1)
}
