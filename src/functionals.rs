//! Functional-specific scaling parameters.
//!
//! Every density functional is paired with its own fitted set of D3 scaling parameters, one set
//! per damping scheme. This module loads those sets from TOML, normalizes functional names and
//! merges caller overrides into the tabulated values.

use crate::error::D3Error;
use crate::types::DampingScheme;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Tabulated zero-damping parameters of a functional.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ZeroDampingParameters {
    pub s6: f64,
    pub rs6: f64,
    pub s8: f64,
}

/// Tabulated Becke–Johnson parameters of a functional.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BjDampingParameters {
    pub s6: f64,
    pub a1: f64,
    pub s8: f64,
    /// Additive cutoff offset in bohr.
    pub a2: f64,
}

/// The parameter sets known for a single functional.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct FunctionalEntry {
    pub zero: Option<ZeroDampingParameters>,
    pub bj: Option<BjDampingParameters>,
}

/// Fully resolved scaling parameters for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalingParameters {
    Zero { s6: f64, rs6: f64, s8: f64 },
    BeckeJohnson { s6: f64, a1: f64, s8: f64, a2: f64 },
}

impl ScalingParameters {
    /// Global scale of the r⁻⁶ term.
    pub fn s6(&self) -> f64 {
        match *self {
            ScalingParameters::Zero { s6, .. } | ScalingParameters::BeckeJohnson { s6, .. } => s6,
        }
    }

    /// Global scale of the r⁻⁸ term.
    pub fn s8(&self) -> f64 {
        match *self {
            ScalingParameters::Zero { s8, .. } | ScalingParameters::BeckeJohnson { s8, .. } => s8,
        }
    }

    /// The damping scheme these parameters belong to.
    pub fn damping(&self) -> DampingScheme {
        match self {
            ScalingParameters::Zero { .. } => DampingScheme::Zero,
            ScalingParameters::BeckeJohnson { .. } => DampingScheme::BeckeJohnson,
        }
    }
}

impl fmt::Display for ScalingParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalingParameters::Zero { s6, rs6, s8 } => {
                write!(f, "s6 = {s6}, rs6 = {rs6}, s8 = {s8}")
            }
            ScalingParameters::BeckeJohnson { s6, a1, s8, a2 } => {
                write!(f, "s6 = {s6}, a1 = {a1}, s8 = {s8}, a2 = {a2}")
            }
        }
    }
}

/// Caller-supplied replacements for tabulated scaling parameters.
///
/// For a recognized functional a value of zero means "not set" and the tabulated value is kept.
/// Without a recognized functional the values are used as given and every parameter of the
/// damping scheme must be present.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScalingOverrides {
    pub s6: Option<f64>,
    pub rs6: Option<f64>,
    pub s8: Option<f64>,
    pub a1: Option<f64>,
    pub a2: Option<f64>,
}

impl ScalingOverrides {
    fn validate(&self) -> Result<(), D3Error> {
        for (name, value) in [
            ("s6", self.s6),
            ("rs6", self.rs6),
            ("s8", self.s8),
            ("a1", self.a1),
            ("a2", self.a2),
        ] {
            let Some(value) = value else { continue };
            if !value.is_finite() {
                return Err(D3Error::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite",
                });
            }
            if value < 0.0 {
                return Err(D3Error::InvalidParameter {
                    name,
                    value,
                    reason: "must not be negative",
                });
            }
        }
        Ok(())
    }
}

/// Replaces `table` with `value` when the override is present and non-zero.
#[inline]
fn merge(table: f64, value: Option<f64>) -> f64 {
    match value {
        Some(v) if v != 0.0 => v,
        _ => table,
    }
}

fn require(
    value: Option<f64>,
    name: &'static str,
    damping: DampingScheme,
    functional: Option<&str>,
) -> Result<f64, D3Error> {
    value.ok_or_else(|| match functional {
        Some(functional) => D3Error::UnknownFunctional {
            functional: functional.to_string(),
            damping,
        },
        None => D3Error::MissingParameter { name, damping },
    })
}

/// Normalizes a functional name for lookup: lowercase, with dashes and underscores removed.
///
/// # Examples
///
/// ```
/// use dftd3::functionals::normalize_name;
///
/// assert_eq!(normalize_name("M06-2X"), "m062x");
/// assert_eq!(normalize_name(" B3LYP "), "b3lyp");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Deserialize)]
struct RawFunctionalTable {
    #[serde(default)]
    functionals: HashMap<String, FunctionalEntry>,
}

/// The table of scaling parameters keyed by normalized functional name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionalTable {
    functionals: HashMap<String, FunctionalEntry>,
}

impl FunctionalTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a functional table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `D3Error::IoError` if the file cannot be read, or any error of
    /// [`FunctionalTable::load_from_str`].
    pub fn load_from_file(path: &Path) -> Result<Self, D3Error> {
        let content = std::fs::read_to_string(path).map_err(|io_error| D3Error::IoError {
            path: path.to_path_buf(),
            source: io_error,
        })?;

        Self::load_from_str(&content)
    }

    /// Parses a functional table from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `D3Error::DeserializationError` for malformed TOML and
    /// `D3Error::InvalidReferenceData` when two keys normalize to the same name.
    ///
    /// # Examples
    ///
    /// ```
    /// use dftd3::FunctionalTable;
    ///
    /// let table = FunctionalTable::load_from_str(r#"
    /// [functionals.PBE0]
    /// zero = { s6 = 1.0, rs6 = 1.287, s8 = 0.928 }
    /// "#).unwrap();
    /// assert!(table.get("pbe0").is_some());
    /// ```
    pub fn load_from_str(toml_str: &str) -> Result<Self, D3Error> {
        let raw: RawFunctionalTable = toml::from_str(toml_str)?;
        let mut table = Self::new();
        for (name, entry) in raw.functionals {
            let key = normalize_name(&name);
            if table.functionals.insert(key.clone(), entry).is_some() {
                return Err(D3Error::InvalidReferenceData(format!(
                    "functional '{}' is listed more than once",
                    key
                )));
            }
        }
        Ok(table)
    }

    /// Adds or replaces the parameter sets of a functional.
    pub fn insert(&mut self, name: &str, entry: FunctionalEntry) {
        self.functionals.insert(normalize_name(name), entry);
    }

    /// Looks up a functional by name (normalized before lookup).
    pub fn get(&self, name: &str) -> Option<&FunctionalEntry> {
        self.functionals.get(&normalize_name(name))
    }

    /// Number of functionals in the table.
    pub fn len(&self) -> usize {
        self.functionals.len()
    }

    /// Whether the table lists no functional.
    pub fn is_empty(&self) -> bool {
        self.functionals.is_empty()
    }

    /// The normalized names of all functionals, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functionals.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolves the scaling parameters of an evaluation.
    ///
    /// When `functional` has tabulated parameters for `damping`, those are used and each
    /// override replaces its tabulated value only if it is present and non-zero. Otherwise the
    /// overrides are used literally and must cover every parameter of the scheme
    /// (`s6`, `rs6`, `s8` for zero damping; `s6`, `a1`, `s8`, `a2` for Becke–Johnson).
    ///
    /// # Errors
    ///
    /// * `D3Error::InvalidParameter` for a negative or non-finite override, or a literal `rs6`
    ///   of zero.
    /// * `D3Error::UnknownFunctional` when a named functional is not tabulated for `damping` and
    ///   the overrides are incomplete.
    /// * `D3Error::MissingParameter` when no functional is named and the overrides are
    ///   incomplete.
    pub fn resolve(
        &self,
        functional: Option<&str>,
        damping: DampingScheme,
        overrides: &ScalingOverrides,
    ) -> Result<ScalingParameters, D3Error> {
        overrides.validate()?;

        let entry = functional.and_then(|name| self.get(name));

        match damping {
            DampingScheme::Zero => {
                if let Some(table) = entry.and_then(|e| e.zero) {
                    return Ok(ScalingParameters::Zero {
                        s6: merge(table.s6, overrides.s6),
                        rs6: merge(table.rs6, overrides.rs6),
                        s8: merge(table.s8, overrides.s8),
                    });
                }
                let s6 = require(overrides.s6, "s6", damping, functional)?;
                let rs6 = require(overrides.rs6, "rs6", damping, functional)?;
                let s8 = require(overrides.s8, "s8", damping, functional)?;
                if rs6 <= 0.0 {
                    return Err(D3Error::InvalidParameter {
                        name: "rs6",
                        value: rs6,
                        reason: "must be positive",
                    });
                }
                Ok(ScalingParameters::Zero { s6, rs6, s8 })
            }
            DampingScheme::BeckeJohnson => {
                if let Some(table) = entry.and_then(|e| e.bj) {
                    return Ok(ScalingParameters::BeckeJohnson {
                        s6: merge(table.s6, overrides.s6),
                        a1: merge(table.a1, overrides.a1),
                        s8: merge(table.s8, overrides.s8),
                        a2: merge(table.a2, overrides.a2),
                    });
                }
                Ok(ScalingParameters::BeckeJohnson {
                    s6: require(overrides.s6, "s6", damping, functional)?,
                    a1: require(overrides.a1, "a1", damping, functional)?,
                    s8: require(overrides.s8, "s8", damping, functional)?,
                    a2: require(overrides.a2, "a2", damping, functional)?,
                })
            }
        }
    }
}
