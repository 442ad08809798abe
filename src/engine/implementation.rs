//! This module implements the `DispersionEngine` that evaluates the D3 dispersion energy.
//!
//! The engine resolves the scaling parameters of the requested functional, validates the
//! geometry once into a distance matrix, derives coordination numbers and (optionally) molecule
//! ids, interpolates a C6 coefficient for every interacting pair, and finally sums the damped
//! pair and triple terms. Rows of the pair and triple loops run in parallel, but their partial
//! sums are reduced sequentially in ascending atom order, so results are bit-identical
//! regardless of the number of threads.

use super::options::EngineOptions;
use crate::{
    coefficients::{c8_from_c6, c9_from_c6, q_factor, resolve_c6},
    coordination::coordination_numbers,
    damping::{bj, three_body, zero},
    error::D3Error,
    functionals::{FunctionalTable, ScalingParameters},
    geometry::DistanceMatrix,
    math::constants::{BOHR_TO_ANGSTROM, CN_K1, CN_K2},
    params::ReferenceData,
    topology::BondGraph,
    types::{AtomView, EnergyResult, EnergyUnit, PairContribution, TripleContribution},
};
use faer::Mat;
use rayon::prelude::*;
use tracing::{debug, instrument, trace};

/// The main engine for dispersion energy calculations.
///
/// It borrows the reference coefficient table and the functional parameter table, so a single
/// pair of tables can serve any number of engines and evaluations.
pub struct DispersionEngine<'d> {
    /// Reference C6 coefficients, covalent radii and cutoff radii.
    reference: &'d ReferenceData,
    /// Scaling parameters per functional.
    functionals: &'d FunctionalTable,
    /// Configuration options, such as the damping scheme and optional terms.
    options: EngineOptions,
}

impl<'d> DispersionEngine<'d> {
    /// Creates a new `DispersionEngine` with default options.
    ///
    /// # Examples
    ///
    /// ```
    /// use dftd3::{DispersionEngine, get_default_functionals, get_default_reference_data};
    ///
    /// let engine = DispersionEngine::new(get_default_reference_data(), get_default_functionals());
    /// ```
    pub fn new(reference: &'d ReferenceData, functionals: &'d FunctionalTable) -> Self {
        Self {
            reference,
            functionals,
            options: EngineOptions::default(),
        }
    }

    /// Configures the engine with custom options.
    ///
    /// # Examples
    ///
    /// ```
    /// use dftd3::{DampingScheme, DispersionEngine, EngineOptions};
    /// use dftd3::{get_default_functionals, get_default_reference_data};
    ///
    /// let options = EngineOptions {
    ///     damping: DampingScheme::BeckeJohnson,
    ///     three_body: true,
    ///     ..Default::default()
    /// };
    /// let engine = DispersionEngine::new(get_default_reference_data(), get_default_functionals())
    ///     .with_options(options);
    /// ```
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// The options this engine evaluates with.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Computes the dispersion energy of a geometry.
    ///
    /// # Arguments
    ///
    /// * `atoms` - The geometry, with positions in angstroms.
    /// * `functional` - The functional whose scaling parameters to use. May be `None` when the
    ///   options carry a complete set of overrides.
    ///
    /// # Errors
    ///
    /// * Configuration errors when the scaling parameters cannot be resolved.
    /// * Geometry errors for fewer than two atoms, non-finite coordinates or coinciding atoms.
    /// * Reference data errors for elements, C6 references or cutoff radii missing from the
    ///   reference table.
    /// * `D3Error::NonFiniteEnergy` if any contribution overflows, naming the atoms involved.
    ///
    /// # Examples
    ///
    /// ```
    /// use dftd3::{Atom, DispersionEngine, get_default_functionals, get_default_reference_data};
    ///
    /// let engine = DispersionEngine::new(get_default_reference_data(), get_default_functionals());
    /// let atoms = vec![
    ///     Atom { atomic_number: 8, position: [0.0, 0.0, 0.0] },
    ///     Atom { atomic_number: 8, position: [3.0, 0.0, 0.0] },
    /// ];
    ///
    /// let result = engine.compute(&atoms, Some("b3lyp")).unwrap();
    /// assert!(result.total < 0.0);
    /// assert_eq!(result.total, result.r6 + result.r8 + result.three_body);
    /// ```
    #[instrument(skip_all, name = "dispersion_energy", fields(n_atoms = atoms.len(), damping = %self.options.damping))]
    pub fn compute<A: AtomView>(
        &self,
        atoms: &[A],
        functional: Option<&str>,
    ) -> Result<EnergyResult, D3Error> {
        let parameters =
            self.functionals
                .resolve(functional, self.options.damping, &self.options.overrides)?;
        debug!(%parameters, "Resolved scaling parameters.");

        let tolerance = self.options.bond_tolerance;
        if self.options.intermolecular_only && !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(D3Error::InvalidParameter {
                name: "bond_tolerance",
                value: tolerance,
                reason: "must be positive",
            });
        }

        let system = self.prepare_system(atoms, &parameters)?;

        let (r6, r8, pairs) = self.sum_pairs(&system, &parameters)?;
        debug!(r6, r8, "Pair terms summed (Hartree).");

        let (three_body, triples) = if self.options.three_body {
            let (energy, triples) = self.sum_triples(&system)?;
            debug!(energy, "Three-body term summed (Hartree).");
            (energy, triples)
        } else {
            (0.0, Vec::new())
        };

        let total = r6 + r8 + three_body;
        if !total.is_finite() {
            return Err(D3Error::NonFiniteEnergy {
                term: "total",
                atoms: Vec::new(),
            });
        }

        let unit = self.options.unit;
        let pairwise = self.options.pairwise;
        Ok(EnergyResult {
            total: unit.from_hartree(r6) + unit.from_hartree(r8) + unit.from_hartree(three_body),
            r6: unit.from_hartree(r6),
            r8: unit.from_hartree(r8),
            three_body: unit.from_hartree(three_body),
            unit,
            parameters,
            coordination_numbers: system.coordination_numbers,
            molecule_ids: system.molecule_ids,
            pairs: pairwise.then(|| convert_pairs(pairs, unit)),
            triples: (pairwise && self.options.three_body).then(|| convert_triples(triples, unit)),
        })
    }

    /// Runs every geometry-dependent step that precedes the energy sums.
    fn prepare_system<A: AtomView>(
        &self,
        atoms: &[A],
        parameters: &ScalingParameters,
    ) -> Result<PreparedSystem, D3Error> {
        let distances = DistanceMatrix::from_atoms(atoms)?;
        let atomic_numbers: Vec<u8> = atoms.iter().map(AtomView::atomic_number).collect();

        let q_factors = atomic_numbers
            .iter()
            .map(|&z| self.reference.element(z).map(|data| q_factor(z, data)))
            .collect::<Result<Vec<f64>, D3Error>>()?;

        let coordination_numbers =
            coordination_numbers(&atomic_numbers, &distances, self.reference, CN_K1, CN_K2)?;
        debug!(?coordination_numbers, "Coordination numbers computed.");

        let molecule_ids = if self.options.intermolecular_only {
            let graph = BondGraph::from_distances(
                &atomic_numbers,
                &distances,
                self.reference,
                self.options.bond_tolerance,
            )?;
            let ids = graph.partition();
            debug!(?ids, "Molecules partitioned.");
            Some(ids)
        } else {
            None
        };

        let mut system = PreparedSystem {
            atomic_numbers,
            distances,
            coordination_numbers,
            molecule_ids,
            q_factors,
            c6: Mat::zeros(0, 0),
            cutoff_radii: Mat::zeros(0, 0),
        };

        system.c6 = self.build_c6_matrix(&system)?;

        let needs_cutoffs =
            matches!(parameters, ScalingParameters::Zero { .. }) || self.options.three_body;
        if needs_cutoffs {
            system.cutoff_radii = self.build_cutoff_matrix(&system)?;
        }

        Ok(system)
    }

    /// Interpolates C6 for every interacting pair.
    ///
    /// Rows are resolved in parallel; the first failing pair in ascending `(i, j)` order is
    /// reported.
    fn build_c6_matrix(&self, system: &PreparedSystem) -> Result<Mat<f64>, D3Error> {
        let n_atoms = system.n_atoms();
        let rows: Vec<Result<Vec<(usize, f64)>, D3Error>> = (0..n_atoms)
            .into_par_iter()
            .map(|i| {
                ((i + 1)..n_atoms)
                    .filter(|&j| system.is_included(i, j))
                    .map(|j| {
                        resolve_c6(
                            self.reference,
                            &system.atomic_numbers,
                            &system.coordination_numbers,
                            i,
                            j,
                        )
                        .map(|c6| (j, c6))
                    })
                    .collect()
            })
            .collect();

        let mut c6 = Mat::zeros(n_atoms, n_atoms);
        for (i, row) in rows.into_iter().enumerate() {
            for (j, value) in row? {
                c6[(i, j)] = value;
                c6[(j, i)] = value;
            }
        }
        Ok(c6)
    }

    /// Looks up the tabulated cutoff radius of every interacting pair, converted to bohr.
    fn build_cutoff_matrix(&self, system: &PreparedSystem) -> Result<Mat<f64>, D3Error> {
        let n_atoms = system.n_atoms();
        let mut radii = Mat::zeros(n_atoms, n_atoms);
        for i in 0..n_atoms {
            for j in (i + 1)..n_atoms {
                if !system.is_included(i, j) {
                    continue;
                }
                let (z_a, z_b) = (system.atomic_numbers[i], system.atomic_numbers[j]);
                let radius = self
                    .reference
                    .cutoff_radius(z_a, z_b)
                    .ok_or(D3Error::MissingCutoffRadius { z_a, z_b })?
                    / BOHR_TO_ANGSTROM;
                radii[(i, j)] = radius;
                radii[(j, i)] = radius;
            }
        }
        Ok(radii)
    }

    /// Sums the damped r⁻⁶ and r⁻⁸ terms over all interacting pairs (Hartree).
    fn sum_pairs(
        &self,
        system: &PreparedSystem,
        parameters: &ScalingParameters,
    ) -> Result<(f64, f64, Vec<PairContribution>), D3Error> {
        let rows: Vec<Result<PairRow, D3Error>> = (0..system.n_atoms())
            .into_par_iter()
            .map(|i| self.pair_row(system, parameters, i))
            .collect();

        let (mut r6, mut r8) = (0.0, 0.0);
        let mut pairs = Vec::new();
        for row in rows {
            let row = row?;
            r6 += row.r6;
            r8 += row.r8;
            pairs.extend(row.pairs);
        }
        Ok((r6, r8, pairs))
    }

    fn pair_row(
        &self,
        system: &PreparedSystem,
        parameters: &ScalingParameters,
        i: usize,
    ) -> Result<PairRow, D3Error> {
        let (s6, s8) = (parameters.s6(), parameters.s8());
        let mut row = PairRow::default();

        for j in (i + 1)..system.n_atoms() {
            if !system.is_included(i, j) {
                continue;
            }
            let c6 = system.c6[(i, j)];
            let c8 = c8_from_c6(c6, system.q_factors[i], system.q_factors[j]);
            let distance = system.distances.get(i, j);
            let r = distance / BOHR_TO_ANGSTROM;

            let (d6, d8) = match *parameters {
                ScalingParameters::Zero { rs6, .. } => {
                    zero::damped_inverse_powers(r, system.cutoff_radii[(i, j)], rs6)
                }
                ScalingParameters::BeckeJohnson { a1, a2, .. } => {
                    bj::damped_inverse_powers(r, bj::pair_cutoff_radius(c6, c8, a1, a2))
                }
            };

            let e6 = -s6 * c6 * d6;
            let e8 = -s8 * c8 * d8;
            if !e6.is_finite() {
                return Err(D3Error::NonFiniteEnergy {
                    term: "r6",
                    atoms: vec![i, j],
                });
            }
            if !e8.is_finite() {
                return Err(D3Error::NonFiniteEnergy {
                    term: "r8",
                    atoms: vec![i, j],
                });
            }
            trace!(i, j, c6, c8, e6, e8, "Pair contribution.");

            row.r6 += e6;
            row.r8 += e8;
            if self.options.pairwise {
                row.pairs.push(PairContribution {
                    i,
                    j,
                    c6,
                    c8,
                    distance,
                    r6: e6,
                    r8: e8,
                });
            }
        }

        Ok(row)
    }

    /// Sums the three-body term over all interacting triples (Hartree).
    fn sum_triples(
        &self,
        system: &PreparedSystem,
    ) -> Result<(f64, Vec<TripleContribution>), D3Error> {
        let rows: Vec<Result<TripleRow, D3Error>> = (0..system.n_atoms())
            .into_par_iter()
            .map(|i| self.triple_row(system, i))
            .collect();

        let mut energy = 0.0;
        let mut triples = Vec::new();
        for row in rows {
            let row = row?;
            energy += row.energy;
            triples.extend(row.triples);
        }
        Ok((energy, triples))
    }

    fn triple_row(&self, system: &PreparedSystem, i: usize) -> Result<TripleRow, D3Error> {
        let n_atoms = system.n_atoms();
        let mut row = TripleRow::default();

        for j in (i + 1)..n_atoms {
            if !system.is_included(i, j) {
                continue;
            }
            for k in (j + 1)..n_atoms {
                if !(system.is_included(i, k) && system.is_included(j, k)) {
                    continue;
                }
                let c9 = c9_from_c6(system.c6[(i, j)], system.c6[(i, k)], system.c6[(j, k)]);
                let distances = [
                    system.distances.get(i, j) / BOHR_TO_ANGSTROM,
                    system.distances.get(j, k) / BOHR_TO_ANGSTROM,
                    system.distances.get(i, k) / BOHR_TO_ANGSTROM,
                ];
                let radii = [
                    system.cutoff_radii[(i, j)],
                    system.cutoff_radii[(j, k)],
                    system.cutoff_radii[(i, k)],
                ];
                let energy = three_body::triple_energy(c9, distances, radii);
                if !energy.is_finite() {
                    return Err(D3Error::NonFiniteEnergy {
                        term: "three-body",
                        atoms: vec![i, j, k],
                    });
                }
                trace!(i, j, k, c9, energy, "Triple contribution.");

                row.energy += energy;
                if self.options.pairwise {
                    row.triples.push(TripleContribution {
                        i,
                        j,
                        k,
                        c9,
                        energy,
                    });
                }
            }
        }

        Ok(row)
    }
}

/// Geometry-derived quantities shared by the pair and triple sums.
struct PreparedSystem {
    atomic_numbers: Vec<u8>,
    distances: DistanceMatrix,
    coordination_numbers: Vec<f64>,
    molecule_ids: Option<Vec<usize>>,
    q_factors: Vec<f64>,
    /// Interpolated C6, zero for pairs that do not interact.
    c6: Mat<f64>,
    /// Tabulated cutoff radii in bohr; empty unless zero damping or the three-body term is used.
    cutoff_radii: Mat<f64>,
}

impl PreparedSystem {
    #[inline]
    fn n_atoms(&self) -> usize {
        self.atomic_numbers.len()
    }

    /// Whether atoms `i` and `j` interact, i.e. are not excluded as members of one molecule.
    #[inline]
    fn is_included(&self, i: usize, j: usize) -> bool {
        self.molecule_ids
            .as_ref()
            .is_none_or(|ids| ids[i] != ids[j])
    }
}

#[derive(Default)]
struct PairRow {
    r6: f64,
    r8: f64,
    pairs: Vec<PairContribution>,
}

#[derive(Default)]
struct TripleRow {
    energy: f64,
    triples: Vec<TripleContribution>,
}

fn convert_pairs(pairs: Vec<PairContribution>, unit: EnergyUnit) -> Vec<PairContribution> {
    pairs
        .into_iter()
        .map(|pair| PairContribution {
            r6: unit.from_hartree(pair.r6),
            r8: unit.from_hartree(pair.r8),
            ..pair
        })
        .collect()
}

fn convert_triples(triples: Vec<TripleContribution>, unit: EnergyUnit) -> Vec<TripleContribution> {
    triples
        .into_iter()
        .map(|triple| TripleContribution {
            energy: unit.from_hartree(triple.energy),
            ..triple
        })
        .collect()
}
