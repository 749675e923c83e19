//! Closed `[low, high]` parameter ranges and how operators draw from them.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// A closed numeric interval, serialized as a two-element array.
///
/// Bounds are stored as given. Inverted bounds are normalized when the range
/// is used, so `[3, 1]` behaves exactly like `[1, 3]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Range {
    pub low: f32,
    pub high: f32,
}

impl Range {
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    /// A degenerate range holding a single value.
    pub const fn fixed(value: f32) -> Self {
        Self::new(value, value)
    }

    /// Bounds ordered so that `low <= high`.
    pub fn ordered(&self) -> (f32, f32) {
        if self.low <= self.high {
            (self.low, self.high)
        } else {
            (self.high, self.low)
        }
    }

    pub fn midpoint(&self) -> f32 {
        (self.low + self.high) / 2.0
    }

    /// Draw uniformly from `[low, high)`; returns `low` for a degenerate range.
    pub fn sample(&self, rng: &mut dyn RngCore) -> f32 {
        let (low, high) = self.ordered();
        low + rng.gen::<f32>() * (high - low)
    }

    /// Draw a value according to `sampling`.
    pub fn draw(&self, sampling: Sampling, rng: &mut dyn RngCore) -> f32 {
        match sampling {
            Sampling::Midpoint => self.midpoint(),
            Sampling::Uniform => self.sample(rng),
        }
    }
}

impl From<[f32; 2]> for Range {
    fn from([low, high]: [f32; 2]) -> Self {
        Self { low, high }
    }
}

impl From<Range> for [f32; 2] {
    fn from(range: Range) -> Self {
        [range.low, range.high]
    }
}

/// Which end of a range to update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Low,
    High,
}

impl Bound {
    pub(crate) fn index(self) -> usize {
        match self {
            Bound::Low => 0,
            Bound::High => 1,
        }
    }

    /// Parse `"low"`/`"min"` or `"high"`/`"max"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" | "min" => Some(Self::Low),
            "high" | "max" => Some(Self::High),
            _ => None,
        }
    }
}

/// How a fixed-per-batch operator turns its range into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sampling {
    /// Use the middle of the range for every task
    #[default]
    Midpoint,
    /// Draw a fresh value per task
    Uniform,
}
