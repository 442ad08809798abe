//! Environment-dependent dispersion coefficients.
//!
//! C6 coefficients are interpolated between the tabulated reference states of an element pair
//! with Gaussian weights in coordination-number space. C8 follows from C6 through the
//! per-element `<r4>/<r2>` ratios and the three-body C9 from the three pair C6 values.

use crate::error::D3Error;
use crate::math::constants::C6_K3;
use crate::params::{ElementData, ReferenceData};

/// Canonical linear index of an unordered pair of positive integers.
///
/// `lin(i1, i2) = min + max·(max − 1)/2` enumerates the lower triangle row by row:
/// `(1,1) → 1`, `(1,2) → 2`, `(2,2) → 3`, `(1,3) → 4`, … It is injective for positive
/// arguments, so atomic-number pairs map to distinct slots of a triangular array.
#[inline]
pub fn lin(i1: usize, i2: usize) -> usize {
    let high = i1.max(i2);
    let low = i1.min(i2);
    low + high * (high.saturating_sub(1)) / 2
}

/// Interpolates the C6 coefficient of an element pair at the given coordination numbers.
///
/// Every populated reference with a strictly positive C6 contributes with weight
/// `exp(k3·((cn_a_ref − cn_a)² + (cn_b_ref − cn_b)²))`. When all weights underflow to zero the
/// most recently visited positive reference is returned instead. `None` means the pair has no
/// positive reference at all.
///
/// References are always visited in the canonical orientation (lighter element first, then
/// smaller coordination number first), so swapping the two atoms yields a bit-identical value.
/// The underflow fallback therefore follows this canonical element order, not the order in
/// which the caller passes the two atoms: with sparse references it is the last positive entry
/// in the lighter element's state-major order.
pub fn interpolate_c6(
    reference: &ReferenceData,
    z_a: u8,
    cn_a: f64,
    z_b: u8,
    cn_b: f64,
    k3: f64,
) -> Option<f64> {
    if z_a > z_b || (z_a == z_b && cn_a > cn_b) {
        return interpolate_c6(reference, z_b, cn_b, z_a, cn_a, k3);
    }

    let mut last_positive = None;
    let mut weight_total = 0.0;
    let mut weighted_sum = 0.0;

    for state_a in 0..reference.reference_count(z_a) {
        for state_b in 0..reference.reference_count(z_b) {
            let Some(entry) = reference.c6_reference(z_a, z_b, state_a, state_b) else {
                continue;
            };
            if entry.c6 <= 0.0 {
                continue;
            }
            last_positive = Some(entry.c6);

            let distance_sq = (entry.cn_a - cn_a).powi(2) + (entry.cn_b - cn_b).powi(2);
            let weight = (k3 * distance_sq).exp();
            weight_total += weight;
            weighted_sum += weight * entry.c6;
        }
    }

    if weight_total > 0.0 {
        Some(weighted_sum / weight_total)
    } else {
        last_positive
    }
}

/// Resolves the C6 coefficient between atoms `a` and `b` of a geometry.
///
/// # Errors
///
/// Returns `D3Error::MissingC6Reference` naming both atoms and elements if the element pair has
/// no strictly positive reference C6.
pub fn resolve_c6(
    reference: &ReferenceData,
    atomic_numbers: &[u8],
    coordination_numbers: &[f64],
    a: usize,
    b: usize,
) -> Result<f64, D3Error> {
    let (z_a, z_b) = (atomic_numbers[a], atomic_numbers[b]);
    interpolate_c6(
        reference,
        z_a,
        coordination_numbers[a],
        z_b,
        coordination_numbers[b],
        C6_K3,
    )
    .ok_or(D3Error::MissingC6Reference {
        atom_a: a,
        atom_b: b,
        z_a,
        z_b,
    })
}

/// The C8 scaling quantity `Q = ½ · sqrt(Z) · <r4>/<r2>` of an element.
#[inline]
pub fn q_factor(atomic_number: u8, data: &ElementData) -> f64 {
    0.5 * (atomic_number as f64).sqrt() * data.r4r2
}

/// Derives C8 from C6: `C8 = 3 · C6 · sqrt(Q_a · Q_b)`.
#[inline]
pub fn c8_from_c6(c6: f64, q_a: f64, q_b: f64) -> f64 {
    3.0 * c6 * (q_a * q_b).sqrt()
}

/// Approximates the three-body coefficient: `C9 = −sqrt(C6_ab · C6_ac · C6_bc)`.
#[inline]
pub fn c9_from_c6(c6_ab: f64, c6_ac: f64, c6_bc: f64) -> f64 {
    -(c6_ab * c6_ac * c6_bc).abs().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ReferenceC6;
    use approx::assert_relative_eq;

    fn two_state_reference() -> ReferenceData {
        let mut reference = ReferenceData::new();
        reference
            .insert_element(
                1,
                ElementData {
                    covalent_radius: 0.32,
                    r4r2: 8.0589,
                    references: 2,
                },
            )
            .unwrap();
        reference
            .insert_element(
                6,
                ElementData {
                    covalent_radius: 0.75,
                    r4r2: 7.8715,
                    references: 2,
                },
            )
            .unwrap();
        for (state_c, state_h, c6, cn_c, cn_h) in [
            (0, 0, 10.0, 0.0, 0.0),
            (0, 1, 12.0, 0.0, 1.0),
            (1, 0, 6.0, 4.0, 0.0),
            (1, 1, 8.0, 4.0, 1.0),
        ] {
            reference
                .insert_c6(
                    6,
                    1,
                    state_c,
                    state_h,
                    ReferenceC6 {
                        c6,
                        cn_a: cn_c,
                        cn_b: cn_h,
                    },
                )
                .unwrap();
        }
        reference
    }

    #[test]
    fn test_lin_enumerates_lower_triangle() {
        assert_eq!(lin(1, 1), 1);
        assert_eq!(lin(1, 2), 2);
        assert_eq!(lin(2, 2), 3);
        assert_eq!(lin(1, 3), 4);
        assert_eq!(lin(3, 3), 6);
        assert_eq!(lin(6, 1), lin(1, 6));
        assert_eq!(lin(8, 8), 36);

        let mut seen = std::collections::HashSet::new();
        for i in 1..=20 {
            for j in i..=20 {
                assert!(seen.insert(lin(i, j)), "collision at ({}, {})", i, j);
            }
        }
        assert_eq!(seen.len(), 210);
        assert_eq!(*seen.iter().max().unwrap(), 210);
    }

    #[test]
    fn test_interpolation_hits_reference_at_its_cn() {
        let reference = two_state_reference();
        let c6 = interpolate_c6(&reference, 6, 4.0, 1, 1.0, C6_K3).unwrap();
        // Neighbouring references are at least 1 CN unit away, so their weights are <= e^-4.
        assert!((c6 - 8.0).abs() < 0.2);
    }

    #[test]
    fn test_interpolation_is_symmetric_in_pair_order() {
        let reference = two_state_reference();
        let forward = interpolate_c6(&reference, 6, 2.7, 1, 0.4, C6_K3).unwrap();
        let backward = interpolate_c6(&reference, 1, 0.4, 6, 2.7, C6_K3).unwrap();
        assert_eq!(forward, backward);

        let mut homonuclear = two_state_reference();
        homonuclear
            .insert_c6(
                6,
                6,
                0,
                1,
                ReferenceC6 {
                    c6: 30.0,
                    cn_a: 0.0,
                    cn_b: 4.0,
                },
            )
            .unwrap();
        homonuclear
            .insert_c6(
                6,
                6,
                1,
                1,
                ReferenceC6 {
                    c6: 20.0,
                    cn_a: 4.0,
                    cn_b: 4.0,
                },
            )
            .unwrap();
        let forward = interpolate_c6(&homonuclear, 6, 3.1, 6, 0.7, C6_K3).unwrap();
        let backward = interpolate_c6(&homonuclear, 6, 0.7, 6, 3.1, C6_K3).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_interpolation_matches_weighted_mean() {
        let reference = two_state_reference();
        let (cn_c, cn_h) = (1.5, 0.5);
        let refs = [
            (10.0, 0.0, 0.0),
            (12.0, 0.0, 1.0),
            (6.0, 4.0, 0.0),
            (8.0, 4.0, 1.0),
        ];
        let (mut num, mut den) = (0.0, 0.0);
        for (c6, rc, rh) in refs {
            let w = (C6_K3 * ((rc - cn_c) * (rc - cn_c) + (rh - cn_h) * (rh - cn_h))).exp();
            num += w * c6;
            den += w;
        }
        let c6 = interpolate_c6(&reference, 6, cn_c, 1, cn_h, C6_K3).unwrap();
        assert_relative_eq!(c6, num / den, max_relative = 1e-14);
    }

    #[test]
    fn test_underflowing_weights_fall_back_to_last_positive_reference() {
        let reference = two_state_reference();
        let c6 = interpolate_c6(&reference, 6, 1.0e3, 1, 1.0e3, C6_K3).unwrap();
        // Hydrogen states form the outer loop; the last positive reference is (H1, C1).
        assert_eq!(c6, 8.0);

        // Same fallback when carbon is passed first.
        let swapped = interpolate_c6(&reference, 1, 1.0e3, 6, 1.0e3, C6_K3).unwrap();
        assert_eq!(swapped, 8.0);
    }

    #[test]
    fn test_non_positive_references_are_ignored() {
        let mut reference = two_state_reference();
        reference
            .insert_c6(
                6,
                1,
                1,
                1,
                ReferenceC6 {
                    c6: 0.0,
                    cn_a: 4.0,
                    cn_b: 1.0,
                },
            )
            .unwrap();
        let c6 = interpolate_c6(&reference, 6, 1.0e3, 1, 1.0e3, C6_K3).unwrap();
        assert_eq!(c6, 12.0);
    }

    #[test]
    fn test_missing_pair_reports_atoms_and_elements() {
        let reference = two_state_reference();
        let result = resolve_c6(&reference, &[6, 6], &[0.0, 0.0], 0, 1);
        match result {
            Err(D3Error::MissingC6Reference {
                atom_a,
                atom_b,
                z_a,
                z_b,
            }) => {
                assert_eq!((atom_a, atom_b), (0, 1));
                assert_eq!((z_a, z_b), (6, 6));
            }
            other => panic!("expected MissingC6Reference, got {:?}", other),
        }
    }

    #[test]
    fn test_c8_and_c9_relations() {
        assert_relative_eq!(c8_from_c6(2.0, 4.0, 9.0), 36.0);
        assert_relative_eq!(c9_from_c6(4.0, 9.0, 1.0), -6.0);

        let data = ElementData {
            covalent_radius: 0.63,
            r4r2: 4.7566,
            references: 3,
        };
        assert_relative_eq!(q_factor(8, &data), 0.5 * 8f64.sqrt() * 4.7566);
    }
}
