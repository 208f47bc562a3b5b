//! Serving-based scaling

use serde::{Deserialize, Serialize};

/// Servings at or above this are rounded to the nearest ten
pub const COARSE_SERVINGS_THRESHOLD: f64 = 50.0;

/// Base and requested servings for one scaling request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Servings {
    pub base: f64,
    pub target: f64,
}

impl Servings {
    pub fn new(base: f64, target: f64) -> Self {
        Self { base, target }
    }

    /// Unscaled: target equals base
    pub fn unscaled(base: f64) -> Self {
        Self { base, target: base }
    }

    /// Multiplier applied to canonical grams
    pub fn ratio(&self) -> f64 {
        scale(1.0, self.base, self.target)
    }

    /// Scale grams, passing them through unchanged when `no_scale` is set
    pub fn apply(&self, qty_g: f64, no_scale: bool) -> f64 {
        if no_scale {
            qty_g
        } else {
            scale(qty_g, self.base, self.target)
        }
    }
}

/// `qty_g * target / base`. A base that is not a positive finite number counts as 1.
pub fn scale(qty_g: f64, base_servings: f64, target_servings: f64) -> f64 {
    let base = if base_servings.is_finite() && base_servings > 0.0 {
        base_servings
    } else {
        1.0
    };
    qty_g * target_servings / base
}

/// Clamp a requested serving count: at least 1, coarse steps for large batches
pub fn adjust_servings(requested: f64) -> f64 {
    if !requested.is_finite() || requested < 1.0 {
        return 1.0;
    }
    if requested >= COARSE_SERVINGS_THRESHOLD {
        (requested / 10.0).round() * 10.0
    } else {
        requested.round()
    }
}
