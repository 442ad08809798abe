//! Bond connectivity and molecule partitioning.
//!
//! Connectivity is a dense symmetric boolean matrix over atom indices. Molecules are the
//! connected components of that graph, found by closing the bond relation from a start atom
//! until a pass adds no new atom.

use crate::error::D3Error;
use crate::geometry::DistanceMatrix;
use crate::params::ReferenceData;
use std::collections::VecDeque;

/// Dense bond adjacency over the atoms of one geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondGraph {
    n_atoms: usize,
    bonds: Vec<bool>,
}

impl BondGraph {
    /// Creates a graph with `n_atoms` atoms and no bonds.
    pub fn new(n_atoms: usize) -> Self {
        Self {
            n_atoms,
            bonds: vec![false; n_atoms * n_atoms],
        }
    }

    /// Derives bonds from distances: atoms `i` and `j` are bonded when
    /// `r_ij < tolerance · (Rcov_i + Rcov_j)`.
    ///
    /// # Errors
    ///
    /// Returns `D3Error::ElementNotFound` if an element has no covalent radius.
    pub fn from_distances(
        atomic_numbers: &[u8],
        distances: &DistanceMatrix,
        reference: &ReferenceData,
        tolerance: f64,
    ) -> Result<Self, D3Error> {
        let radii = atomic_numbers
            .iter()
            .map(|&z| reference.element(z).map(|data| data.covalent_radius))
            .collect::<Result<Vec<f64>, D3Error>>()?;

        let n_atoms = atomic_numbers.len();
        let mut graph = Self::new(n_atoms);
        for i in 0..n_atoms {
            for j in (i + 1)..n_atoms {
                if distances.get(i, j) < tolerance * (radii[i] + radii[j]) {
                    graph.add_bond(i, j);
                }
            }
        }
        Ok(graph)
    }

    /// Number of atoms in the graph.
    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    /// Marks atoms `i` and `j` as bonded. Self-bonds are ignored.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn add_bond(&mut self, i: usize, j: usize) {
        assert!(i < self.n_atoms && j < self.n_atoms, "bond index out of range");
        if i == j {
            return;
        }
        self.bonds[i * self.n_atoms + j] = true;
        self.bonds[j * self.n_atoms + i] = true;
    }

    /// Whether atoms `i` and `j` are bonded.
    #[inline]
    pub fn is_bonded(&self, i: usize, j: usize) -> bool {
        self.bonds[i * self.n_atoms + j]
    }

    fn row(&self, i: usize) -> &[bool] {
        &self.bonds[i * self.n_atoms..(i + 1) * self.n_atoms]
    }

    /// Returns the sorted atom indices of the molecule containing `start`.
    ///
    /// Each atom's bond row is scanned once; the search ends when the frontier is empty, i.e.
    /// when a pass over the found set adds no new atom.
    ///
    /// # Errors
    ///
    /// Returns `D3Error::AtomIndexOutOfRange` if `start` is not an atom of the graph.
    pub fn molecule_containing(&self, start: usize) -> Result<Vec<usize>, D3Error> {
        if start >= self.n_atoms {
            return Err(D3Error::AtomIndexOutOfRange {
                index: start,
                n_atoms: self.n_atoms,
            });
        }

        Ok(self
            .component_of(start)
            .iter()
            .enumerate()
            .filter_map(|(index, &member)| member.then_some(index))
            .collect())
    }

    /// Assigns a molecule id to every atom.
    ///
    /// Ids are consecutive from zero, in the order of the lowest atom index of each molecule.
    pub fn partition(&self) -> Vec<usize> {
        const UNASSIGNED: usize = usize::MAX;
        let mut molecule_ids = vec![UNASSIGNED; self.n_atoms];
        let mut next_id = 0;

        for start in 0..self.n_atoms {
            if molecule_ids[start] != UNASSIGNED {
                continue;
            }
            for (atom, &member) in self.component_of(start).iter().enumerate() {
                if member {
                    molecule_ids[atom] = next_id;
                }
            }
            next_id += 1;
        }

        molecule_ids
    }

    /// Membership mask of the connected component containing `start` (which must be in range).
    fn component_of(&self, start: usize) -> Vec<bool> {
        let mut found = vec![false; self.n_atoms];
        found[start] = true;
        let mut frontier = VecDeque::from([start]);

        while let Some(atom) = frontier.pop_front() {
            for (neighbor, &bonded) in self.row(atom).iter().enumerate() {
                if bonded && !found[neighbor] {
                    found[neighbor] = true;
                    frontier.push_back(neighbor);
                }
            }
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::get_default_reference_data;
    use crate::types::Atom;

    fn chain(n_atoms: usize) -> BondGraph {
        let mut graph = BondGraph::new(n_atoms);
        for i in 1..n_atoms {
            graph.add_bond(i - 1, i);
        }
        graph
    }

    #[test]
    fn test_closure_spans_long_chains() {
        let graph = chain(250);
        let molecule = graph.molecule_containing(249).unwrap();
        assert_eq!(molecule.len(), 250);
        assert_eq!(molecule, (0..250).collect::<Vec<_>>());
    }

    #[test]
    fn test_closure_reaches_atoms_listed_before_start() {
        let mut graph = BondGraph::new(5);
        graph.add_bond(4, 0);
        graph.add_bond(0, 2);
        assert_eq!(graph.molecule_containing(4).unwrap(), vec![0, 2, 4]);
        assert_eq!(graph.molecule_containing(1).unwrap(), vec![1]);
    }

    #[test]
    fn test_partition_assigns_ids_by_lowest_index() {
        let mut graph = BondGraph::new(6);
        graph.add_bond(0, 3);
        graph.add_bond(1, 2);
        graph.add_bond(2, 5);
        assert_eq!(graph.partition(), vec![0, 1, 1, 0, 2, 1]);
    }

    #[test]
    fn test_partition_agrees_with_molecule_containing() {
        let mut graph = BondGraph::new(7);
        graph.add_bond(6, 1);
        graph.add_bond(1, 4);
        graph.add_bond(0, 5);
        let ids = graph.partition();
        for start in 0..7 {
            let molecule = graph.molecule_containing(start).unwrap();
            let expected: Vec<usize> = (0..7).filter(|&atom| ids[atom] == ids[start]).collect();
            assert_eq!(molecule, expected, "start {}", start);
        }
        assert_eq!(ids, vec![0, 1, 2, 3, 1, 0, 1]);
    }

    #[test]
    fn test_out_of_range_start_is_rejected() {
        let graph = chain(3);
        assert!(matches!(
            graph.molecule_containing(3),
            Err(D3Error::AtomIndexOutOfRange {
                index: 3,
                n_atoms: 3
            })
        ));
    }

    #[test]
    fn test_bonds_from_distances_split_water_dimer() {
        let atoms = vec![
            Atom {
                atomic_number: 8,
                position: [-1.551007, -0.114520, 0.000000],
            },
            Atom {
                atomic_number: 1,
                position: [-1.934259, 0.762503, 0.000000],
            },
            Atom {
                atomic_number: 1,
                position: [-0.599677, 0.040712, 0.000000],
            },
            Atom {
                atomic_number: 8,
                position: [1.350625, 0.111469, 0.000000],
            },
            Atom {
                atomic_number: 1,
                position: [1.680398, -0.373741, -0.758561],
            },
            Atom {
                atomic_number: 1,
                position: [1.680398, -0.373741, 0.758561],
            },
        ];
        let distances = DistanceMatrix::from_atoms(&atoms).unwrap();
        let numbers: Vec<u8> = atoms.iter().map(|a| a.atomic_number).collect();
        let graph =
            BondGraph::from_distances(&numbers, &distances, get_default_reference_data(), 1.1)
                .unwrap();

        assert!(graph.is_bonded(0, 1));
        assert!(graph.is_bonded(1, 0));
        assert!(!graph.is_bonded(2, 3));
        assert_eq!(graph.partition(), vec![0, 0, 0, 1, 1, 1]);
    }
}
