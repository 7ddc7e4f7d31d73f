//! Parametric uncertainty.
//!
//! Physical parameters are never known exactly. Each run draws every uncertain
//! parameter independently as `nominal * (1 + alpha * U)` with `U` uniform on
//! `[-1, 1]`, so a controller designed from nominal values is exercised
//! against a slightly different plant.

use crate::error::{PlantError, PlantResult};
use ms_core::Real;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Uniform relative uncertainty applied to nominal parameters.
///
/// Serialized as the bare `alpha`; deserialization goes through
/// [`Uncertainty::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Real", into = "Real")]
pub struct Uncertainty {
    /// Maximum relative deviation, in `[0, 1)`.
    alpha: Real,
}

impl Default for Uncertainty {
    fn default() -> Self {
        Self { alpha: 0.2 }
    }
}

impl Uncertainty {
    pub fn new(alpha: Real) -> PlantResult<Self> {
        if !(0.0..1.0).contains(&alpha) {
            return Err(PlantError::InvalidParameter {
                what: "uncertainty alpha",
                value: alpha,
            });
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> Real {
        self.alpha
    }

    /// No perturbation: every draw returns the nominal value.
    pub fn none() -> Self {
        Self { alpha: 0.0 }
    }

    /// Draw one perturbed value around `nominal`.
    pub fn perturb<R: Rng + ?Sized>(&self, nominal: Real, rng: &mut R) -> Real {
        if self.alpha == 0.0 {
            return nominal;
        }
        let u: Real = rng.gen_range(-1.0..=1.0);
        nominal * (1.0 + self.alpha * u)
    }

    /// Inclusive range of values `perturb` can return for `nominal`.
    pub fn bounds(&self, nominal: Real) -> (Real, Real) {
        let a = nominal * (1.0 - self.alpha);
        let b = nominal * (1.0 + self.alpha);
        (a.min(b), a.max(b))
    }
}

impl TryFrom<Real> for Uncertainty {
    type Error = PlantError;

    fn try_from(alpha: Real) -> PlantResult<Self> {
        Self::new(alpha)
    }
}

impl From<Uncertainty> for Real {
    fn from(u: Uncertainty) -> Real {
        u.alpha
    }
}

/// Seeded generator for one run; draws a seed from entropy when none is given.
pub fn run_rng(seed: Option<u64>) -> (StdRng, u64) {
    let seed = seed.unwrap_or_else(|| {
        let drawn = rand::thread_rng().r#gen();
        tracing::info!(seed = drawn, "no seed configured, drew one from entropy");
        drawn
    });
    (StdRng::seed_from_u64(seed), seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perturbation_stays_in_bounds_with_unbiased_mean() {
        let unc = Uncertainty::new(0.2).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let m0 = 0.5;
        let n = 10_000;

        let mut sum = 0.0;
        for _ in 0..n {
            let m = unc.perturb(m0, &mut rng);
            assert!((0.8 * m0..=1.2 * m0).contains(&m), "draw {m} out of band");
            sum += m;
        }
        let mean = sum / n as Real;
        assert!((mean - m0).abs() < 0.01 * m0, "mean {mean}");
    }

    #[test]
    fn zero_alpha_is_nominal() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Uncertainty::none().perturb(9.8, &mut rng), 9.8);
    }

    #[test]
    fn same_seed_same_draws() {
        let unc = Uncertainty::default();
        let (mut a, seed) = run_rng(Some(7));
        let (mut b, _) = run_rng(Some(seed));
        for _ in 0..5 {
            assert_eq!(unc.perturb(1.0, &mut a), unc.perturb(1.0, &mut b));
        }
    }

    #[test]
    fn invalid_alpha_rejected() {
        assert!(Uncertainty::new(-0.1).is_err());
        assert!(Uncertainty::new(1.0).is_err());
        assert!(Uncertainty::new(Real::NAN).is_err());
    }

    #[test]
    fn alpha_only_enters_through_validation() {
        assert!(Uncertainty::try_from(3.0).is_err());
        let unc = Uncertainty::try_from(0.1).unwrap();
        assert_eq!(unc.alpha(), 0.1);
        assert_eq!(Real::from(unc), 0.1);
    }

    #[test]
    fn bounds_match_alpha() {
        let (lo, hi) = Uncertainty::new(0.2).unwrap().bounds(2.0);
        assert!((lo - 1.6).abs() < 1e-12);
        assert!((hi - 2.4).abs() < 1e-12);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn draws_respect_bounds(seed in any::<u64>(), alpha in 0.0_f64..0.99, nominal in 1e-3_f64..1e3) {
            let unc = Uncertainty::new(alpha).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let (lo, hi) = unc.bounds(nominal);
            let v = unc.perturb(nominal, &mut rng);
            prop_assert!(v >= lo - 1e-12 * nominal && v <= hi + 1e-12 * nominal);
        }
    }
}
