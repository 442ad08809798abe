//! Zero damping.
//!
//! The r⁻ⁿ terms are multiplied by a switching function that drives them to zero at short range:
//!
//! ```text
//! f_n(r) = 1 / (1 + 6 · (rs_n · R0 / r)^α_n)
//! ```
//!
//! with `α6 = 14`, `α8 = 16` and `rs8 = 1`. `R0` is the tabulated cutoff radius of the element
//! pair; only the ratio `R0 / r` enters, so both must share a length unit.

use crate::math::constants::{ZERO_ALPHA6, ZERO_ALPHA8, ZERO_RS8};

/// Evaluates the zero-damping switching function.
///
/// # Arguments
///
/// * `distance` - The interatomic distance.
/// * `cutoff_radius` - The pair cutoff radius `R0`, in the same unit as `distance`.
/// * `scale` - The radius scaling factor `rs_n`.
/// * `alpha` - The steepness exponent `α_n`.
///
/// # Returns
///
/// A value in `[0, 1)` that tends to one for `r ≫ R0` and to zero for `r → 0`.
#[inline]
pub fn damping_factor(distance: f64, cutoff_radius: f64, scale: f64, alpha: f64) -> f64 {
    let ratio = scale * cutoff_radius / distance;
    1.0 / (1.0 + 6.0 * ratio.powf(alpha))
}

/// Returns the damped inverse sixth and eighth powers `(f6 / r⁶, f8 / r⁸)` of a pair.
///
/// `distance_bohr` sets the magnitude of the inverse powers; the switching functions use the
/// same distance against `cutoff_radius_bohr`.
#[inline]
pub fn damped_inverse_powers(distance_bohr: f64, cutoff_radius_bohr: f64, rs6: f64) -> (f64, f64) {
    let f6 = damping_factor(distance_bohr, cutoff_radius_bohr, rs6, ZERO_ALPHA6);
    let f8 = damping_factor(distance_bohr, cutoff_radius_bohr, ZERO_RS8, ZERO_ALPHA8);

    let r2 = distance_bohr * distance_bohr;
    let r6 = r2 * r2 * r2;
    (f6 / r6, f8 / (r6 * r2))
}
