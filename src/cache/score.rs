//! Score Module
//!
//! Computes the retention score increment for one cache access.
//!
//! ```text
//! increment = (compute_cost / nbytes) * (1 + ε)^t
//! ε         = 2^(1 / halflife) - 1
//! ```
//!
//! Cost per byte rewards expensive, small results. The exponential term makes
//! later accesses worth more than earlier ones, so old history fades relative
//! to new accesses without any score ever being decreased.

use crate::error::{CacheError, Result};

/// Accesses over which the weight of a new access doubles, unless configured.
pub const DEFAULT_HALFLIFE: f64 = 1000.0;

/// Growth factor beyond which live scores are rescaled.
pub const REBASE_THRESHOLD: f64 = 1e100;

/// Largest cost per byte a score is computed from.
///
/// With growth capped at `REBASE_THRESHOLD`, each increment stays below 1e200.
pub const MAX_COST_RATIO: f64 = 1e100;

// == Score Function ==
/// Score increment calculator for a fixed halflife.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreFunction {
    halflife: f64,
    /// Natural log of `1 + ε`, cached so `growth` is a single `exp`.
    ln_base: f64,
}

impl ScoreFunction {
    // == Constructor ==
    /// Creates a score function for the given halflife (in accesses).
    pub fn new(halflife: f64) -> Result<Self> {
        if !halflife.is_finite() || halflife <= 0.0 {
            return Err(CacheError::InvalidConfig(format!(
                "halflife must be a positive finite number, got {}",
                halflife
            )));
        }

        Ok(Self {
            halflife,
            ln_base: std::f64::consts::LN_2 / halflife,
        })
    }

    /// Returns the configured halflife.
    pub fn halflife(&self) -> f64 {
        self.halflife
    }

    // == Epsilon ==
    /// Per-access growth rate, `2^(1/halflife) - 1`.
    pub fn epsilon(&self) -> f64 {
        self.ln_base.exp_m1()
    }

    // == Growth ==
    /// Returns `(1 + ε)^tick`.
    pub fn growth(&self, tick: u64) -> f64 {
        (self.ln_base * tick as f64).exp()
    }

    // == Increment ==
    /// Score contributed by one access at `tick`.
    ///
    /// Fails with `InvalidEntry` for zero-size entries and for costs that are
    /// negative or not finite.
    pub fn increment(&self, compute_cost: f64, nbytes: u64, tick: u64) -> Result<f64> {
        let ratio = cost_ratio(compute_cost, nbytes)?;
        Ok(self.weigh(ratio, tick))
    }

    /// Increment for an already validated cost ratio, capped at `MAX_COST_RATIO`.
    pub fn weigh(&self, ratio: f64, tick: u64) -> f64 {
        ratio.min(MAX_COST_RATIO) * self.growth(tick)
    }

    // == Needs Rebase ==
    /// True when scores computed at `tick` risk leaving the f64 range.
    pub fn needs_rebase(&self, tick: u64) -> bool {
        self.growth(tick) > REBASE_THRESHOLD
    }
}

impl Default for ScoreFunction {
    fn default() -> Self {
        Self {
            halflife: DEFAULT_HALFLIFE,
            ln_base: std::f64::consts::LN_2 / DEFAULT_HALFLIFE,
        }
    }
}

// == Cost Ratio ==
/// Validated `compute_cost / nbytes`.
pub fn cost_ratio(compute_cost: f64, nbytes: u64) -> Result<f64> {
    if nbytes == 0 {
        return Err(CacheError::InvalidEntry(
            "entry size must be at least one byte".to_string(),
        ));
    }
    if !compute_cost.is_finite() || compute_cost < 0.0 {
        return Err(CacheError::InvalidEntry(format!(
            "compute cost must be a non-negative finite number, got {}",
            compute_cost
        )));
    }

    Ok(compute_cost / nbytes as f64)
}
