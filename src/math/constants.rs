//! This module defines the physical and model constants used throughout the dftd3 library.
//!
//! The unit conversion factors are applied at the boundary between the angstrom geometry and
//! the atomic-unit energy expressions; the remaining constants are the fixed exponents and
//! scale factors of the D3 model itself.

/// Conversion factor from Bohr radii to angstroms.
///
/// The value is approximately 0.529 Å per Bohr radius.
pub const BOHR_TO_ANGSTROM: f64 = 0.529_177_210_903;

/// Conversion factor from Hartree to kilocalories per mole.
pub const HARTREE_TO_KCAL_MOL: f64 = 627.509_474_277_2;

/// Distances below this value (in angstroms) are treated as coinciding atoms.
pub const DISTANCE_THRESHOLD_ANGSTROM: f64 = 1e-8;

/// Steepness of the logistic counting function in the coordination number.
pub const CN_K1: f64 = 16.0;

/// Scale applied to the summed covalent radii in the coordination number.
pub const CN_K2: f64 = 4.0 / 3.0;

/// Exponent of the Gaussian weights in the C6 interpolation.
pub const C6_K3: f64 = -4.0;

/// Maximum number of reference states per element.
pub const MAX_REFERENCES: usize = 5;

/// Zero-damping exponent of the r⁻⁶ term.
pub const ZERO_ALPHA6: f64 = 14.0;

/// Zero-damping exponent of the r⁻⁸ term and of the three-body term.
pub const ZERO_ALPHA8: f64 = 16.0;

/// Zero-damping radius scale of the r⁻⁸ term.
pub const ZERO_RS8: f64 = 1.0;

/// Radius scale of the three-body damping function.
pub const THREE_BODY_RS9: f64 = 4.0 / 3.0;

/// Default scale on the summed covalent radii below which two atoms count as bonded.
pub const BOND_TOLERANCE: f64 = 1.1;
