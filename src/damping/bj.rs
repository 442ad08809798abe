//! Becke–Johnson (rational) damping.
//!
//! Instead of switching the r⁻ⁿ terms off, the distance is shifted by a pair cutoff so that the
//! terms tend to a finite constant as `r → 0`:
//!
//! ```text
//! E_n ∝ 1 / (rⁿ + R_cutⁿ),    R_cut = a1 · sqrt(C8 / C6) + a2
//! ```
//!
//! All lengths are in bohr.

/// Computes the rational-damping cutoff `R_cut = a1 · R0 + a2`.
#[inline]
pub fn cutoff_radius(a1: f64, r0: f64, a2: f64) -> f64 {
    a1 * r0 + a2
}

/// Computes the cutoff of a pair directly from its C6 and C8 coefficients.
///
/// `R0 = sqrt(C8 / C6)` is the critical radius at which the r⁻⁶ and r⁻⁸ terms are equal.
#[inline]
pub fn pair_cutoff_radius(c6: f64, c8: f64, a1: f64, a2: f64) -> f64 {
    cutoff_radius(a1, (c8 / c6).sqrt(), a2)
}

/// Evaluates the damped inverse power `1 / (rⁿ + R_cutⁿ)`.
#[inline]
pub fn damped_inverse_power(distance_bohr: f64, cutoff_bohr: f64, n: i32) -> f64 {
    1.0 / (distance_bohr.powi(n) + cutoff_bohr.powi(n))
}

/// Returns the damped inverse sixth and eighth powers of a pair.
#[inline]
pub fn damped_inverse_powers(distance_bohr: f64, cutoff_bohr: f64) -> (f64, f64) {
    (
        damped_inverse_power(distance_bohr, cutoff_bohr, 6),
        damped_inverse_power(distance_bohr, cutoff_bohr, 8),
    )
}
