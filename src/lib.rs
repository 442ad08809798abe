pub mod coefficients;
pub mod coordination;
pub mod damping;
pub mod elements;
pub mod engine;
pub mod error;
pub mod functionals;
pub mod geometry;
pub mod math;
pub mod params;
pub mod topology;
pub mod types;

pub use coefficients::{c8_from_c6, c9_from_c6, interpolate_c6, lin, resolve_c6};
pub use coordination::{compute_coordination_numbers, coordination_numbers};
pub use engine::{DispersionEngine, EngineOptions};
pub use error::{D3Error, ErrorKind};
pub use functionals::{FunctionalTable, ScalingOverrides, ScalingParameters};
pub use math::constants::{BOHR_TO_ANGSTROM, HARTREE_TO_KCAL_MOL};
pub use params::{ElementData, ReferenceC6, ReferenceData};
pub use topology::BondGraph;
pub use types::{
    Atom, AtomView, DampingScheme, EnergyResult, EnergyUnit, PairContribution, TripleContribution,
};

use std::sync::OnceLock;

static DEFAULT_REFERENCE_DATA: OnceLock<ReferenceData> = OnceLock::new();
static DEFAULT_FUNCTIONALS: OnceLock<FunctionalTable> = OnceLock::new();

/// Returns the reference table bundled with the crate, parsed on first use.
///
/// The bundled table is incomplete. It covers H, C, N and O with their published homonuclear
/// diagonal references only, so it evaluates pure-element geometries (H2, N2, O2, carbon
/// clusters). Any heteronuclear pair fails with [`D3Error::MissingC6Reference`]; load the complete
/// published table with [`ReferenceData::load_from_file`] for general molecules.
pub fn get_default_reference_data() -> &'static ReferenceData {
    DEFAULT_REFERENCE_DATA.get_or_init(|| {
        const DEFAULT_REFERENCE_TOML: &str = include_str!("../resources/d3.reference.toml");
        ReferenceData::load_from_str(DEFAULT_REFERENCE_TOML)
            .expect("Failed to parse embedded reference data. This is a library bug.")
    })
}

/// Returns the functional parameter table bundled with the crate, parsed on first use.
pub fn get_default_functionals() -> &'static FunctionalTable {
    DEFAULT_FUNCTIONALS.get_or_init(|| {
        const DEFAULT_FUNCTIONALS_TOML: &str = include_str!("../resources/d3.functionals.toml");
        FunctionalTable::load_from_str(DEFAULT_FUNCTIONALS_TOML)
            .expect("Failed to parse embedded functional parameters. This is a library bug.")
    })
}
