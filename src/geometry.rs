//! Validated interatomic distances.
//!
//! Every stage of the pipeline works from the same symmetric distance matrix, so a geometry is
//! checked exactly once: finite coordinates, at least two atoms and no coinciding pair.

use crate::error::D3Error;
use crate::math::constants::DISTANCE_THRESHOLD_ANGSTROM;
use crate::types::AtomView;
use faer::Mat;

/// Symmetric matrix of interatomic distances in angstroms.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    distances: Mat<f64>,
}

impl DistanceMatrix {
    /// Builds the distance matrix of a geometry.
    ///
    /// # Errors
    ///
    /// * `D3Error::TooFewAtoms` for fewer than two atoms.
    /// * `D3Error::NonFiniteCoordinate` for a NaN or infinite coordinate.
    /// * `D3Error::DegenerateDistance` for the first pair (in ascending index order) whose
    ///   distance is not a finite value above the coincidence threshold.
    pub fn from_atoms<A: AtomView>(atoms: &[A]) -> Result<Self, D3Error> {
        let n_atoms = atoms.len();
        if n_atoms < 2 {
            return Err(D3Error::TooFewAtoms(n_atoms));
        }

        let positions: Vec<[f64; 3]> = atoms.iter().map(AtomView::position).collect();
        if let Some(index) = positions
            .iter()
            .position(|p| p.iter().any(|c| !c.is_finite()))
        {
            return Err(D3Error::NonFiniteCoordinate(index));
        }

        let mut distances = Mat::zeros(n_atoms, n_atoms);
        for i in 0..n_atoms {
            for j in (i + 1)..n_atoms {
                let distance = euclidean(positions[i], positions[j]);
                if !distance.is_finite() || distance < DISTANCE_THRESHOLD_ANGSTROM {
                    return Err(D3Error::DegenerateDistance { i, j, distance });
                }
                distances[(i, j)] = distance;
                distances[(j, i)] = distance;
            }
        }

        Ok(Self { distances })
    }

    /// Number of atoms covered by the matrix.
    #[inline]
    pub fn n_atoms(&self) -> usize {
        self.distances.nrows()
    }

    /// Distance between atoms `i` and `j` in angstroms (zero on the diagonal).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.distances[(i, j)]
    }
}

#[inline]
fn euclidean(a: [f64; 3], b: [f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}
