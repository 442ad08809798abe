//! This module provides physical constants and model constants for the dftd3 library.
//!
//! It contains the unit conversion factors used at the angstrom/atomic-unit boundary and the
//! fixed exponents of the coordination number, C6 interpolation and damping functions.

/// Physical and model constants used throughout the library.
pub mod constants;
