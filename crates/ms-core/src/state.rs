//! Fixed-size state vectors.
//!
//! States live on the stack as `nalgebra` static vectors; the dimension is a
//! const generic, so a state can never change length after construction.

use crate::{CoreError, Real};
use nalgebra::SVector;

/// Physical state of a plant: `N` generalized coordinates and rates.
pub type StateVector<const N: usize> = SVector<Real, N>;

/// Error if any component of `x` is NaN or infinite.
pub fn ensure_state_finite<const N: usize>(
    x: &StateVector<N>,
    what: &'static str,
) -> Result<(), CoreError> {
    match x.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(CoreError::NonFinite { what, value }),
        None => Ok(()),
    }
}
