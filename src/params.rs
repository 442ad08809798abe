//! This module provides the D3 reference data and utilities for loading it from TOML files.
//!
//! It defines the `ElementData` struct holding per-element quantities (covalent radius, the
//! `<r4>/<r2>` ratio and the number of reference states), the `ReferenceC6` entries of the
//! sparse reference-coefficient table, and the `ReferenceData` container that stores both the
//! C6 references and the zero-damping cutoff radii in triangular arrays indexed by the
//! canonical pair index. Element keys in the TOML files may be atomic numbers or symbols.

use crate::coefficients::lin;
use crate::elements::element_symbol_to_atomic_number;
use crate::error::D3Error;
use crate::math::constants::MAX_REFERENCES;
use serde::Deserialize;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Per-element reference quantities.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ElementData {
    /// The covalent radius of the element in angstroms.
    ///
    /// Used both in the coordination number and in bond detection for molecule partitioning.
    #[serde(rename = "rcov")]
    pub covalent_radius: f64,
    /// The ratio of the `<r4>` and `<r2>` multipole expectation values in atomic units.
    ///
    /// Together with the atomic number it fixes the C8/C6 ratio of the element.
    pub r4r2: f64,
    /// The number of reference (hybridization) states tabulated for the element.
    pub references: usize,
}

/// A populated slot of the reference C6 table.
///
/// `cn_a` belongs to the first element of the queried pair and `cn_b` to the second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceC6 {
    /// The reference C6 coefficient in Hartree·bohr⁶.
    pub c6: f64,
    /// Coordination number of the first element in this reference state.
    pub cn_a: f64,
    /// Coordination number of the second element in this reference state.
    pub cn_b: f64,
}

impl ReferenceC6 {
    fn transposed(self) -> Self {
        Self {
            c6: self.c6,
            cn_a: self.cn_b,
            cn_b: self.cn_a,
        }
    }
}

type ReferenceGrid = [[Option<ReferenceC6>; MAX_REFERENCES]; MAX_REFERENCES];

/// The complete set of reference data consumed by the dispersion engine.
///
/// C6 references for an element pair `(Z1, Z2)` are stored once, under the canonical
/// orientation with the smaller atomic number first, at slot `lin(Z1, Z2) - 1`. Lookups with the
/// larger atomic number first transpose the stored grid transparently.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceData {
    /// A mapping from atomic number to the per-element reference quantities.
    pub elements: HashMap<u8, ElementData>,
    c6: Vec<Option<Box<ReferenceGrid>>>,
    cutoff_radii: Vec<Option<f64>>,
}

impl ReferenceData {
    /// Loads reference data from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `D3Error::IoError` if the file cannot be read, a `D3Error::DeserializationError`
    /// if the TOML is malformed, or a `D3Error::InvalidReferenceData` if the tables are
    /// inconsistent.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dftd3::ReferenceData;
    /// use std::path::Path;
    ///
    /// let reference = ReferenceData::load_from_file(Path::new("d3.reference.toml")).unwrap();
    /// ```
    pub fn load_from_file(path: &Path) -> Result<Self, D3Error> {
        let content = std::fs::read_to_string(path).map_err(|io_error| D3Error::IoError {
            path: path.to_path_buf(),
            source: io_error,
        })?;

        Self::load_from_str(&content)
    }

    /// Parses reference data from a TOML string.
    ///
    /// The document holds an `[elements]` table, an array of `[[c6]]` entries and an array of
    /// `[[r0]]` cutoff radii. Homonuclear C6 entries only need to be listed once per unordered
    /// pair of states; the mirrored entry is filled in automatically.
    ///
    /// # Examples
    ///
    /// ```
    /// use dftd3::ReferenceData;
    ///
    /// let toml_data = r#"
    /// [elements]
    /// "H" = { rcov = 0.32, r4r2 = 8.0589, references = 2 }
    ///
    /// [[c6]]
    /// elements = ["H", "H"]
    /// states = [0, 1]
    /// c6 = 4.7935
    /// cn = [0.9118, 0.0]
    ///
    /// [[r0]]
    /// elements = ["H", "H"]
    /// radius = 2.1823
    /// "#;
    ///
    /// let reference = ReferenceData::load_from_str(toml_data).unwrap();
    /// assert!(reference.c6_reference(1, 1, 1, 0).is_some());
    /// assert_eq!(reference.cutoff_radius(1, 1), Some(2.1823));
    /// ```
    pub fn load_from_str(toml_str: &str) -> Result<Self, D3Error> {
        let raw: RawReferenceData = toml::from_str(toml_str)?;

        let mut reference = Self::new();
        for (atomic_number, data) in raw.elements {
            reference.insert_element(atomic_number, data)?;
        }

        for entry in raw.c6 {
            let z_a = parse_element_key(&entry.elements[0])?;
            let z_b = parse_element_key(&entry.elements[1])?;
            reference.insert_c6(
                z_a,
                z_b,
                entry.states[0],
                entry.states[1],
                ReferenceC6 {
                    c6: entry.c6,
                    cn_a: entry.cn[0],
                    cn_b: entry.cn[1],
                },
            )?;
        }

        for entry in raw.r0 {
            let z_a = parse_element_key(&entry.elements[0])?;
            let z_b = parse_element_key(&entry.elements[1])?;
            reference.insert_cutoff_radius(z_a, z_b, entry.radius)?;
        }

        Ok(reference)
    }

    /// Creates a new empty `ReferenceData` instance.
    pub fn new() -> Self {
        ReferenceData {
            elements: HashMap::new(),
            c6: Vec::new(),
            cutoff_radii: Vec::new(),
        }
    }

    /// Registers the per-element quantities of an element.
    pub fn insert_element(&mut self, atomic_number: u8, data: ElementData) -> Result<(), D3Error> {
        if atomic_number == 0 {
            return Err(D3Error::InvalidReferenceData(
                "atomic number 0 is not an element".to_string(),
            ));
        }
        if !(data.covalent_radius.is_finite() && data.covalent_radius > 0.0) {
            return Err(D3Error::InvalidReferenceData(format!(
                "element {} has a non-positive covalent radius {}",
                atomic_number, data.covalent_radius
            )));
        }
        if !(data.r4r2.is_finite() && data.r4r2 > 0.0) {
            return Err(D3Error::InvalidReferenceData(format!(
                "element {} has a non-positive r4r2 ratio {}",
                atomic_number, data.r4r2
            )));
        }
        if data.references == 0 || data.references > MAX_REFERENCES {
            return Err(D3Error::InvalidReferenceData(format!(
                "element {} declares {} reference states, expected 1 to {}",
                atomic_number, data.references, MAX_REFERENCES
            )));
        }
        self.elements.insert(atomic_number, data);
        Ok(())
    }

    /// Stores a C6 reference for state `state_a` of element `z_a` and `state_b` of `z_b`.
    ///
    /// Both elements must already be registered and the states must lie below their declared
    /// reference counts. For homonuclear pairs the transposed slot is filled as well.
    pub fn insert_c6(
        &mut self,
        z_a: u8,
        z_b: u8,
        state_a: usize,
        state_b: usize,
        entry: ReferenceC6,
    ) -> Result<(), D3Error> {
        self.check_state(z_a, state_a)?;
        self.check_state(z_b, state_b)?;
        if !(entry.c6.is_finite() && entry.cn_a.is_finite() && entry.cn_b.is_finite()) {
            return Err(D3Error::InvalidReferenceData(format!(
                "non-finite C6 reference for pair ({}, {}) states ({}, {})",
                z_a, z_b, state_a, state_b
            )));
        }

        let (row, col, stored) = if z_a <= z_b {
            (state_a, state_b, entry)
        } else {
            (state_b, state_a, entry.transposed())
        };

        let slot = pair_slot(z_a, z_b);
        if self.c6.len() <= slot {
            self.c6.resize(slot + 1, None);
        }
        let grid = self.c6[slot].get_or_insert_with(|| Box::new([[None; MAX_REFERENCES]; MAX_REFERENCES]));
        grid[row][col] = Some(stored);
        if z_a == z_b {
            grid[col][row] = Some(stored.transposed());
        }
        Ok(())
    }

    /// Stores the zero-damping cutoff radius (in angstroms) of an element pair.
    pub fn insert_cutoff_radius(&mut self, z_a: u8, z_b: u8, radius: f64) -> Result<(), D3Error> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(D3Error::InvalidReferenceData(format!(
                "cutoff radius for pair ({}, {}) must be positive, got {}",
                z_a, z_b, radius
            )));
        }
        let slot = pair_slot(z_a, z_b);
        if self.cutoff_radii.len() <= slot {
            self.cutoff_radii.resize(slot + 1, None);
        }
        self.cutoff_radii[slot] = Some(radius);
        Ok(())
    }

    /// Returns the per-element quantities of an element.
    pub fn element(&self, atomic_number: u8) -> Result<&ElementData, D3Error> {
        self.elements
            .get(&atomic_number)
            .ok_or(D3Error::ElementNotFound(atomic_number))
    }

    /// Returns the number of reference states of an element, or zero if it is unknown.
    pub fn reference_count(&self, atomic_number: u8) -> usize {
        self.elements
            .get(&atomic_number)
            .map_or(0, |data| data.references)
    }

    /// Looks up the C6 reference of an element pair in the given reference states.
    ///
    /// `None` marks an unpopulated slot. The returned `cn_a` always belongs to `z_a`.
    pub fn c6_reference(
        &self,
        z_a: u8,
        z_b: u8,
        state_a: usize,
        state_b: usize,
    ) -> Option<ReferenceC6> {
        if z_a == 0 || z_b == 0 || state_a >= MAX_REFERENCES || state_b >= MAX_REFERENCES {
            return None;
        }
        let grid = self.c6.get(pair_slot(z_a, z_b))?.as_ref()?;
        if z_a <= z_b {
            grid[state_a][state_b]
        } else {
            grid[state_b][state_a].map(ReferenceC6::transposed)
        }
    }

    /// Returns the zero-damping cutoff radius of an element pair in angstroms.
    pub fn cutoff_radius(&self, z_a: u8, z_b: u8) -> Option<f64> {
        if z_a == 0 || z_b == 0 {
            return None;
        }
        self.cutoff_radii
            .get(pair_slot(z_a, z_b))
            .copied()
            .flatten()
    }

    fn check_state(&self, atomic_number: u8, state: usize) -> Result<(), D3Error> {
        let data = self.elements.get(&atomic_number).ok_or_else(|| {
            D3Error::InvalidReferenceData(format!(
                "C6 reference uses element {} which has no [elements] entry",
                atomic_number
            ))
        })?;
        if state >= data.references {
            return Err(D3Error::InvalidReferenceData(format!(
                "reference state {} of element {} exceeds its {} declared states",
                state, atomic_number, data.references
            )));
        }
        Ok(())
    }
}

/// Zero-based triangular slot of an unordered pair of atomic numbers.
#[inline]
fn pair_slot(z_a: u8, z_b: u8) -> usize {
    lin(z_a as usize, z_b as usize) - 1
}

#[derive(Deserialize)]
struct RawReferenceData {
    #[serde(deserialize_with = "deserialize_element_map")]
    elements: HashMap<u8, ElementData>,
    #[serde(default)]
    c6: Vec<RawC6Entry>,
    #[serde(default)]
    r0: Vec<RawCutoffEntry>,
}

#[derive(Deserialize)]
struct RawC6Entry {
    elements: [String; 2],
    states: [usize; 2],
    c6: f64,
    cn: [f64; 2],
}

#[derive(Deserialize)]
struct RawCutoffEntry {
    elements: [String; 2],
    radius: f64,
}

fn parse_element_key(key: &str) -> Result<u8, D3Error> {
    key.parse::<u8>()
        .ok()
        .filter(|&z| z > 0)
        .or_else(|| element_symbol_to_atomic_number(key))
        .ok_or_else(|| D3Error::InvalidReferenceData(format!("invalid element key: '{}'", key)))
}

/// Deserializes a map of element data with flexible key types.
///
/// Element keys can be either atomic numbers (as strings) or element symbols; symbols are
/// converted to atomic numbers for internal storage.
fn deserialize_element_map<'de, D>(deserializer: D) -> Result<HashMap<u8, ElementData>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ElementMapVisitor;

    impl<'de> Visitor<'de> for ElementMapVisitor {
        type Value = HashMap<u8, ElementData>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map from atomic number or symbol to element data")
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut elements = HashMap::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, ElementData>()? {
                let atomic_number = parse_element_key(&key).map_err(de::Error::custom)?;
                elements.insert(atomic_number, value);
            }
            Ok(elements)
        }
    }

    deserializer.deserialize_map(ElementMapVisitor)
}
