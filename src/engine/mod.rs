//! This module contains the engine that assembles the dispersion energy of a geometry.
//!
//! It includes the `DispersionEngine` implementation and the `EngineOptions` that select the
//! damping scheme, parameter overrides, optional terms and the output unit.

mod implementation;
mod options;

pub use implementation::DispersionEngine;
pub use options::EngineOptions;
