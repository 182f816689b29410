/// Numerical fuzz used to decide when a derivative cross product is degenerate.
///
/// Normal estimation compares squared cross-product lengths against an epsilon
/// derived from the patch's own coordinate spread, so the same `fuzz` works for
/// patches of any size.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Relative fuzz factor (dimensionless)
    pub fuzz: f64,
}

impl Tolerance {
    pub const DEFAULT_FUZZ: f64 = 1000.0 * f64::EPSILON;

    pub fn default_precision() -> Self {
        Self {
            fuzz: Self::DEFAULT_FUZZ,
        }
    }

    pub fn fuzz2(self) -> f64 {
        self.fuzz * self.fuzz
    }

    /// Degeneracy epsilon for a patch whose largest squared control-point
    /// distance from its first corner is `spread2`.
    ///
    /// Compared against squared cross-product lengths, which grow with the
    /// fourth power of patch size, so the epsilon does too.
    pub fn degeneracy_epsilon(self, spread2: f64) -> f64 {
        spread2 * spread2 * self.fuzz2()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}
