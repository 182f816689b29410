//! Parameters controlling adaptive patch tessellation.

use serde::{Deserialize, Serialize};
use tess_core::traits::Validate;
use tess_core::{Result, TessError, Tolerance};

/// Parameters for adaptive tessellation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationParams {
    /// Largest allowed deviation of a triangle from the true surface, in
    /// model units. Patches are split until their squared flatness falls
    /// below `resolution^2`. Default: 0.15
    pub resolution: f64,

    /// Fraction of `resolution` by which an edge midpoint is pushed outward
    /// the first time its boundary curve is found straight. Default: 0.1
    pub nudge_fraction: f64,

    /// Recursion ceiling. A patch reaching this depth is emitted as is.
    /// Default: 12
    pub max_depth: u32,

    /// Numerical fuzz for degenerate-normal detection.
    pub tolerance: Tolerance,
}

impl TessellationParams {
    /// Upper bound for `max_depth`; each level can quadruple the patch count.
    pub const MAX_DEPTH_LIMIT: u32 = 20;

    /// Create params with the given resolution and default everything else.
    #[must_use]
    pub fn with_resolution(resolution: f64) -> Self {
        Self {
            resolution,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Squared flatness threshold.
    pub fn threshold(&self) -> f64 {
        self.resolution * self.resolution
    }

    /// Absolute crack-avoidance offset.
    pub fn nudge(&self) -> f64 {
        self.nudge_fraction * self.resolution
    }
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            resolution: 0.15,
            nudge_fraction: 0.1,
            max_depth: 12,
            tolerance: Tolerance::default(),
        }
    }
}

impl Validate for TessellationParams {
    fn validate(&self) -> Result<()> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(TessError::InvalidInput(format!(
                "resolution must be positive and finite, got {}",
                self.resolution
            )));
        }
        if !(self.nudge_fraction.is_finite() && self.nudge_fraction >= 0.0) {
            return Err(TessError::InvalidInput(format!(
                "nudge_fraction must be non-negative and finite, got {}",
                self.nudge_fraction
            )));
        }
        if self.max_depth > Self::MAX_DEPTH_LIMIT {
            return Err(TessError::InvalidInput(format!(
                "max_depth {} exceeds limit {}",
                self.max_depth,
                Self::MAX_DEPTH_LIMIT
            )));
        }
        if !(self.tolerance.fuzz.is_finite() && self.tolerance.fuzz >= 0.0) {
            return Err(TessError::InvalidInput(format!(
                "tolerance fuzz must be non-negative and finite, got {}",
                self.tolerance.fuzz
            )));
        }
        Ok(())
    }
}
