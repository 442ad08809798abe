//! This module defines configuration options for the dispersion engine.
//!
//! It provides the `EngineOptions` struct, which selects the damping scheme and any scaling
//! parameter overrides, toggles the three-body term and intermolecular-only mode, and controls
//! how much detail the returned `EnergyResult` carries.

use crate::functionals::ScalingOverrides;
use crate::math::constants::BOND_TOLERANCE;
use crate::types::{DampingScheme, EnergyUnit};

/// Configuration parameters for a dispersion energy evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    /// The short-range damping scheme applied to the pairwise terms.
    pub damping: DampingScheme,
    /// Replacements for the tabulated scaling parameters of the functional.
    ///
    /// See [`FunctionalTable::resolve`](crate::FunctionalTable::resolve) for how they combine
    /// with the table.
    pub overrides: ScalingOverrides,
    /// Whether to add the damped Axilrod–Teller–Muto three-body term.
    pub three_body: bool,
    /// Whether to keep only interactions between different molecules.
    ///
    /// Molecules are the connected components of the bond graph. Pairs inside one molecule are
    /// skipped, and so is any triple that contains such a pair.
    pub intermolecular_only: bool,
    /// Whether to record the per-pair and per-triple breakdown in the result.
    pub pairwise: bool,
    /// The unit of the returned energies.
    pub unit: EnergyUnit,
    /// Scale on the summed covalent radii below which two atoms count as bonded.
    ///
    /// Only used in intermolecular-only mode.
    pub bond_tolerance: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            damping: DampingScheme::Zero,
            overrides: ScalingOverrides::default(),
            three_body: false,
            intermolecular_only: false,
            pairwise: false,
            unit: EnergyUnit::Hartree,
            bond_tolerance: BOND_TOLERANCE,
        }
    }
}
