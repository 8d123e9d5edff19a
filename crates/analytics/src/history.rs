//! History synthesizers for snapshot-only metrics.
//!
//! Some metrics (total stock on hand) only have a current value; there is no
//! historical log to bucket. A [`HistorySynthesizer`] decides what the chart
//! shows for past buckets. Swap in a real implementation once historical
//! snapshots are persisted; the bucketing algorithm does not change.

use core::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces a per-bucket value from one current snapshot.
pub trait HistorySynthesizer: Send + Sync + fmt::Debug {
    /// Value for the bucket `periods_back` units before the latest one.
    ///
    /// `periods_back == 0` is the latest bucket.
    fn value_at(&self, current: f64, periods_back: usize) -> f64;
}

/// Repeats the current value across every bucket.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatHistory;

impl HistorySynthesizer for FlatHistory {
    fn value_at(&self, current: f64, _periods_back: usize) -> f64 {
        current
    }
}

/// Placeholder history: the current value perturbed by up to `±spread`
/// (a fraction, e.g. `0.1` for ±10%) on every historical bucket.
///
/// Historical values are rounded to whole units and never go below zero,
/// since stock is counted in items. The latest bucket is `current` unchanged.
///
/// This is a visual approximation, not data. Nothing downstream should make
/// decisions from it. Perturbation is seeded per bucket offset, so the same
/// seed always draws the same series.
#[derive(Debug, Clone, Copy)]
pub struct JitteredHistory {
    spread: f64,
    seed: u64,
}

impl JitteredHistory {
    pub const DEFAULT_SPREAD: f64 = 0.1;

    pub fn new(spread: f64, seed: u64) -> Self {
        let spread = if spread.is_finite() { spread.abs() } else { 0.0 };
        Self { spread, seed }
    }

    pub fn spread(&self) -> f64 {
        self.spread
    }
}

impl Default for JitteredHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SPREAD, 0)
    }
}

impl HistorySynthesizer for JitteredHistory {
    fn value_at(&self, current: f64, periods_back: usize) -> f64 {
        if periods_back == 0 {
            return current;
        }

        let mut rng = StdRng::seed_from_u64(
            self.seed ^ (periods_back as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15),
        );
        let factor = rng.gen_range(-self.spread..=self.spread);
        (current * (1.0 + factor)).round().max(0.0)
    }
}
