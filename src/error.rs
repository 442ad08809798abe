use crate::types::DampingScheme;
use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all fallible operations in the `dftd3` library.
///
/// Every variant carries the atom indices, element pair or table key that
/// triggered it, so callers can report exactly which lookup or geometry
/// check failed. Use [`D3Error::kind`] to branch on the broad category.
#[derive(Error, Debug)]
pub enum D3Error {
    /// The functional has no parameters for the requested damping scheme and
    /// the caller did not supply a complete set of overrides.
    #[error("no {damping} damping parameters found for functional '{functional}'")]
    UnknownFunctional {
        functional: String,
        damping: DampingScheme,
    },

    /// A scaling parameter required by the damping scheme is neither
    /// tabulated nor overridden.
    #[error("scaling parameter '{name}' is required for {damping} damping but was not provided")]
    MissingParameter {
        name: &'static str,
        damping: DampingScheme,
    },

    /// A scaling parameter override is out of its admissible range.
    #[error("invalid value {value} for scaling parameter '{name}': {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The reference data has no entry for an element present in the geometry.
    #[error("reference data not found for element with atomic number: {0}")]
    ElementNotFound(u8),

    /// No strictly positive reference C6 exists for an element pair, so the
    /// interpolation has neither a weighted mean nor a fallback value.
    #[error(
        "no positive C6 reference for element pair ({z_a}, {z_b}) between atoms {atom_a} and {atom_b}"
    )]
    MissingC6Reference {
        atom_a: usize,
        atom_b: usize,
        z_a: u8,
        z_b: u8,
    },

    /// The zero-damping cutoff radius for an element pair is not tabulated.
    #[error("no cutoff radius tabulated for element pair ({z_a}, {z_b})")]
    MissingCutoffRadius { z_a: u8, z_b: u8 },

    /// The reference data file is structurally valid TOML but semantically
    /// inconsistent (unknown element, state index out of range, ...).
    #[error("invalid reference data: {0}")]
    InvalidReferenceData(String),

    /// At least two atoms are required to form a pair.
    #[error("at least two atoms are required for a dispersion calculation, got {0}")]
    TooFewAtoms(usize),

    /// An atom has a NaN or infinite coordinate.
    #[error("atom {0} has a non-finite coordinate")]
    NonFiniteCoordinate(usize),

    /// Two atoms coincide, or their distance is not a finite positive number.
    #[error("degenerate geometry: distance between atoms {i} and {j} is {distance}")]
    DegenerateDistance { i: usize, j: usize, distance: f64 },

    /// An atom index passed to a graph query lies outside the geometry.
    #[error("atom index {index} is out of range for a system of {n_atoms} atoms")]
    AtomIndexOutOfRange { index: usize, n_atoms: usize },

    /// An accumulated energy term became NaN or infinite.
    #[error("non-finite {term} dispersion contribution for atoms {atoms:?}")]
    NonFiniteEnergy {
        term: &'static str,
        atoms: Vec<usize>,
    },

    /// An I/O error that occurred while reading a data file.
    #[error("I/O error at path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data file could not be parsed as TOML or does not match the
    /// expected table layout.
    #[error("failed to deserialize TOML data: {0}")]
    DeserializationError(#[from] toml::de::Error),
}

/// Broad failure categories of [`D3Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unresolvable functional/damping combination or invalid overrides.
    Configuration,
    /// Missing or inconsistent reference data.
    ReferenceData,
    /// Degenerate or malformed geometry.
    Geometry,
    /// NaN or overflow in an energy term.
    Numeric,
    /// File system failure while loading data.
    Io,
}

impl D3Error {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            D3Error::UnknownFunctional { .. }
            | D3Error::MissingParameter { .. }
            | D3Error::InvalidParameter { .. } => ErrorKind::Configuration,
            D3Error::ElementNotFound(_)
            | D3Error::MissingC6Reference { .. }
            | D3Error::MissingCutoffRadius { .. }
            | D3Error::InvalidReferenceData(_)
            | D3Error::DeserializationError(_) => ErrorKind::ReferenceData,
            D3Error::TooFewAtoms(_)
            | D3Error::NonFiniteCoordinate(_)
            | D3Error::DegenerateDistance { .. }
            | D3Error::AtomIndexOutOfRange { .. } => ErrorKind::Geometry,
            D3Error::NonFiniteEnergy { .. } => ErrorKind::Numeric,
            D3Error::IoError { .. } => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let config = D3Error::UnknownFunctional {
            functional: "xyz".to_string(),
            damping: DampingScheme::Zero,
        };
        assert_eq!(config.kind(), ErrorKind::Configuration);

        let reference = D3Error::MissingC6Reference {
            atom_a: 0,
            atom_b: 1,
            z_a: 6,
            z_b: 1,
        };
        assert_eq!(reference.kind(), ErrorKind::ReferenceData);

        let geometry = D3Error::DegenerateDistance {
            i: 0,
            j: 1,
            distance: 0.0,
        };
        assert_eq!(geometry.kind(), ErrorKind::Geometry);

        let numeric = D3Error::NonFiniteEnergy {
            term: "r6",
            atoms: vec![0, 1],
        };
        assert_eq!(numeric.kind(), ErrorKind::Numeric);
    }

    #[test]
    fn test_messages_name_offending_atoms() {
        let err = D3Error::MissingC6Reference {
            atom_a: 3,
            atom_b: 7,
            z_a: 6,
            z_b: 8,
        };
        let message = err.to_string();
        assert!(message.contains("(6, 8)"));
        assert!(message.contains("atoms 3 and 7"));

        let err = D3Error::UnknownFunctional {
            functional: "foo".to_string(),
            damping: DampingScheme::BeckeJohnson,
        };
        assert_eq!(
            err.to_string(),
            "no bj damping parameters found for functional 'foo'"
        );
    }
}
