//! This module provides the short-range damping functions of the dispersion correction.
//!
//! It includes the zero-damping switching function, the Becke–Johnson (rational) damped inverse
//! powers, and the zero-damping variant used for the three-body term.

pub mod bj;
pub mod three_body;
pub mod zero;
