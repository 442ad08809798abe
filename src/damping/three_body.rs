//! Damped Axilrod–Teller–Muto three-body term.
//!
//! The triple energy is
//!
//! ```text
//! E_abc = −C9 · (3 · cosθa · cosθb · cosθc + 1) · f(r̄) / (r_ab · r_bc · r_ac)³
//! ```
//!
//! where the angles are the interior angles of the triangle formed by the atoms and
//! `f = 1 / (1 + 6 · (rs9 · R̄0 / r̄)^16)` uses the geometric means of the three pair cutoff radii
//! and of the three distances.

use crate::math::constants::{THREE_BODY_RS9, ZERO_ALPHA8};

/// Evaluates the zero-damping function of a triple.
///
/// Radii and distances must share a length unit. Passing the products of the three values is
/// equivalent to passing geometric means raised to the third power.
#[inline]
pub fn damping_factor(cutoff_radii: [f64; 3], distances: [f64; 3]) -> f64 {
    let radius_product = cutoff_radii[0] * cutoff_radii[1] * cutoff_radii[2];
    let distance_product = distances[0] * distances[1] * distances[2];
    let ratio = THREE_BODY_RS9 * (radius_product / distance_product).cbrt();
    1.0 / (1.0 + 6.0 * ratio.powf(ZERO_ALPHA8))
}

/// Computes the angular factor `(3 · cosθa · cosθb · cosθc + 1) / (r_ab · r_bc · r_ac)³`.
///
/// The cosines follow from the law of cosines, so only the three side lengths are needed.
#[inline]
pub fn angular_factor(r_ab: f64, r_bc: f64, r_ac: f64) -> f64 {
    let (ab2, bc2, ac2) = (r_ab * r_ab, r_bc * r_bc, r_ac * r_ac);
    let r2 = ab2 * bc2 * ac2;
    let r3 = r2 * r2.sqrt();

    let cos_product = (ab2 + ac2 - bc2) * (ab2 + bc2 - ac2) * (ac2 + bc2 - ab2) / (8.0 * r2);
    (3.0 * cos_product + 1.0) / r3
}

/// Computes the damped three-body energy of a triple in Hartree.
///
/// # Arguments
///
/// * `c9` - The three-body coefficient (negative by construction).
/// * `distances_bohr` - The side lengths `[r_ab, r_bc, r_ac]` in bohr.
/// * `cutoff_radii_bohr` - The pair cutoff radii `[R0_ab, R0_bc, R0_ac]` in bohr.
#[inline]
pub fn triple_energy(c9: f64, distances_bohr: [f64; 3], cutoff_radii_bohr: [f64; 3]) -> f64 {
    let [r_ab, r_bc, r_ac] = distances_bohr;
    let damping = damping_factor(cutoff_radii_bohr, distances_bohr);
    -c9 * angular_factor(r_ab, r_bc, r_ac) * damping
}
