//! Fractional coordination numbers.
//!
//! The coordination number of atom `i` counts its neighbours with a logistic step function of
//! the distance relative to the scaled sum of covalent radii:
//!
//! ```text
//! CN_i = Σ_{j≠i} 1 / (1 + exp(−k1 · (k2 · (Rcov_i + Rcov_j) / r_ij − 1)))
//! ```
//!
//! Each bonded neighbour contributes close to one and distant atoms decay smoothly to zero.

use crate::error::D3Error;
use crate::geometry::DistanceMatrix;
use crate::math::constants::{CN_K1, CN_K2};
use crate::params::ReferenceData;
use crate::types::AtomView;
use rayon::prelude::*;

/// The counting function for a single neighbour.
#[inline]
pub fn counting_function(distance: f64, covalent_sum: f64, k1: f64, k2: f64) -> f64 {
    let ratio = k2 * covalent_sum / distance;
    1.0 / (1.0 + (-k1 * (ratio - 1.0)).exp())
}

/// Computes the coordination number of every atom from a validated distance matrix.
///
/// Rows are evaluated in parallel; within a row neighbours are summed in ascending index order,
/// so the result does not depend on the thread count.
///
/// # Errors
///
/// Returns `D3Error::ElementNotFound` if an element has no covalent radius in `reference`.
pub fn coordination_numbers(
    atomic_numbers: &[u8],
    distances: &DistanceMatrix,
    reference: &ReferenceData,
    k1: f64,
    k2: f64,
) -> Result<Vec<f64>, D3Error> {
    let radii = atomic_numbers
        .iter()
        .map(|&z| reference.element(z).map(|data| data.covalent_radius))
        .collect::<Result<Vec<f64>, D3Error>>()?;

    let n_atoms = atomic_numbers.len();
    let cn = (0..n_atoms)
        .into_par_iter()
        .map(|i| {
            (0..n_atoms)
                .filter(|&j| j != i)
                .map(|j| counting_function(distances.get(i, j), radii[i] + radii[j], k1, k2))
                .sum::<f64>()
        })
        .collect();

    Ok(cn)
}

/// Computes coordination numbers directly from atoms with the default `k1` and `k2`.
///
/// # Errors
///
/// Returns a geometry error for coinciding atoms or non-finite coordinates, and
/// `D3Error::ElementNotFound` for elements missing from `reference`.
///
/// # Examples
///
/// ```
/// use dftd3::{Atom, compute_coordination_numbers, get_default_reference_data};
///
/// let h2 = vec![
///     Atom { atomic_number: 1, position: [0.0, 0.0, 0.0] },
///     Atom { atomic_number: 1, position: [0.74, 0.0, 0.0] },
/// ];
/// let cn = compute_coordination_numbers(&h2, get_default_reference_data()).unwrap();
/// assert!(cn[0] > 0.9 && cn[0] < 1.0);
/// ```
pub fn compute_coordination_numbers<A: AtomView>(
    atoms: &[A],
    reference: &ReferenceData,
) -> Result<Vec<f64>, D3Error> {
    let distances = DistanceMatrix::from_atoms(atoms)?;
    let atomic_numbers: Vec<u8> = atoms.iter().map(AtomView::atomic_number).collect();
    coordination_numbers(&atomic_numbers, &distances, reference, CN_K1, CN_K2)
}
