//! This module defines the core types used in the dftd3 library for representing atoms and results.
//!
//! It includes the `AtomView` trait for abstracting atom data access, the `Atom` struct for concrete
//! atom representation, the damping-scheme and energy-unit selectors, and the `EnergyResult`
//! struct that carries the total dispersion energy together with its itemized subtotals. These
//! types keep the engine independent of whatever molecular data structure the caller uses.

use crate::functionals::ScalingParameters;
use crate::math::constants::HARTREE_TO_KCAL_MOL;
use std::fmt;
use std::str::FromStr;

/// A trait for viewing atom data without owning it.
///
/// The engine only needs an atomic number and a Cartesian position for each atom, so any
/// molecular representation can be passed in directly by implementing this trait.
pub trait AtomView {
    /// Returns the atomic number of the atom.
    fn atomic_number(&self) -> u8;

    /// Returns the 3D position of the atom in Cartesian coordinates, in angstroms.
    fn position(&self) -> [f64; 3];
}

/// A concrete representation of an atom with atomic number and position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atom {
    /// The atomic number of the atom, identifying its chemical element.
    pub atomic_number: u8,
    /// The 3D position of the atom in angstroms.
    pub position: [f64; 3],
}

impl AtomView for Atom {
    #[inline(always)]
    fn atomic_number(&self) -> u8 {
        self.atomic_number
    }

    #[inline(always)]
    fn position(&self) -> [f64; 3] {
        self.position
    }
}

/// The short-range damping scheme applied to the pairwise terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DampingScheme {
    /// Zero damping: the correction is switched off smoothly towards zero at short range.
    #[default]
    Zero,
    /// Becke–Johnson (rational) damping: the correction tends to a finite constant at short range.
    BeckeJohnson,
}

impl fmt::Display for DampingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DampingScheme::Zero => write!(f, "zero"),
            DampingScheme::BeckeJohnson => write!(f, "bj"),
        }
    }
}

impl FromStr for DampingScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zero" | "d3" | "d3zero" => Ok(DampingScheme::Zero),
            "bj" | "d3bj" | "becke-johnson" | "rational" => Ok(DampingScheme::BeckeJohnson),
            other => Err(format!("unknown damping scheme: '{}'", other)),
        }
    }
}

/// The unit in which energies of an [`EnergyResult`] are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyUnit {
    /// Hartree (atomic units).
    #[default]
    Hartree,
    /// Kilocalories per mole.
    KcalPerMol,
}

impl EnergyUnit {
    /// Converts an energy given in Hartree into this unit.
    #[inline]
    pub fn from_hartree(self, energy: f64) -> f64 {
        match self {
            EnergyUnit::Hartree => energy,
            EnergyUnit::KcalPerMol => energy * HARTREE_TO_KCAL_MOL,
        }
    }

    /// Converts an energy given in this unit back into Hartree.
    #[inline]
    pub fn to_hartree(self, energy: f64) -> f64 {
        match self {
            EnergyUnit::Hartree => energy,
            EnergyUnit::KcalPerMol => energy / HARTREE_TO_KCAL_MOL,
        }
    }

    /// A short label suitable for table headers.
    pub fn label(self) -> &'static str {
        match self {
            EnergyUnit::Hartree => "Eh",
            EnergyUnit::KcalPerMol => "kcal/mol",
        }
    }
}

/// The dispersion contribution of a single atom pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairContribution {
    /// Index of the first atom (always the smaller index).
    pub i: usize,
    /// Index of the second atom.
    pub j: usize,
    /// Interpolated C6 coefficient in Hartree·bohr⁶.
    pub c6: f64,
    /// Derived C8 coefficient in Hartree·bohr⁸.
    pub c8: f64,
    /// Interatomic distance in angstroms.
    pub distance: f64,
    /// The damped r⁻⁶ energy of the pair.
    pub r6: f64,
    /// The damped r⁻⁸ energy of the pair.
    pub r8: f64,
}

impl PairContribution {
    /// The total energy of the pair.
    pub fn energy(&self) -> f64 {
        self.r6 + self.r8
    }
}

/// The three-body contribution of a single atom triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripleContribution {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    /// The C9 coefficient in Hartree·bohr⁹.
    pub c9: f64,
    /// The damped Axilrod–Teller–Muto energy of the triple.
    pub energy: f64,
}

/// The result of a dispersion energy evaluation.
///
/// All energies share the same `unit`. The breakdowns are only populated when the engine was
/// asked for them, and pairs/triples excluded by intermolecular-only mode never appear in them.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyResult {
    /// Total dispersion energy: the sum of the three subtotals.
    pub total: f64,
    /// Sum of the damped r⁻⁶ terms.
    pub r6: f64,
    /// Sum of the damped r⁻⁸ terms.
    pub r8: f64,
    /// Sum of the three-body terms (zero when the term is disabled).
    pub three_body: f64,
    /// The unit of every energy in this result.
    pub unit: EnergyUnit,
    /// The scaling parameters the energies were computed with.
    pub parameters: ScalingParameters,
    /// The coordination number of every atom.
    pub coordination_numbers: Vec<f64>,
    /// Molecule id of every atom, present in intermolecular-only mode.
    pub molecule_ids: Option<Vec<usize>>,
    /// Per-pair breakdown, in ascending `(i, j)` order.
    pub pairs: Option<Vec<PairContribution>>,
    /// Per-triple breakdown, in ascending `(i, j, k)` order.
    pub triples: Option<Vec<TripleContribution>>,
}
