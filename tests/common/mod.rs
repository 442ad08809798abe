#![allow(dead_code)]

use dftd3::{
    Atom, DispersionEngine, EnergyResult, EngineOptions, ReferenceData, get_default_functionals,
};
use std::sync::OnceLock;

static COMBINED_REFERENCE: OnceLock<ReferenceData> = OnceLock::new();

/// H/C/N/O table with combination-rule estimates for every pair the bundled table leaves out.
pub fn combined_reference() -> &'static ReferenceData {
    COMBINED_REFERENCE.get_or_init(|| {
        ReferenceData::load_from_str(include_str!("../data/combined.reference.toml"))
            .expect("Failed to parse test reference table")
    })
}

pub struct TestCase<'a> {
    pub name: &'a str,
    pub atoms: Vec<Atom>,
    pub functional: Option<&'a str>,
}

/// Evaluates every case with `options`, prints a summary table and hands each result to `check`.
pub fn run_group_test<F>(group_name: &str, cases: Vec<TestCase>, options: EngineOptions, check: F)
where
    F: Fn(&TestCase, &EnergyResult),
{
    let engine = DispersionEngine::new(combined_reference(), get_default_functionals())
        .with_options(options);

    println!("\nRunning Group Test: {}", group_name);
    println!("{:-<96}", "");
    println!(
        "{:<24} | {:>5} | {:>14} | {:>14} | {:>14} | {:>14}",
        "Molecule", "Atoms", "E6", "E8", "E(ABC)", "Total"
    );

    for case in &cases {
        let result = engine
            .compute(&case.atoms, case.functional)
            .unwrap_or_else(|e| panic!("{}: engine failed: {}", case.name, e));

        println!(
            "{:<24} | {:>5} | {:>14.8} | {:>14.8} | {:>14.8} | {:>14.8}",
            case.name,
            case.atoms.len(),
            result.r6,
            result.r8,
            result.three_body,
            result.total
        );

        check(case, &result);
    }
    println!("{:-<96}\n", "");
}

pub fn compute(atoms: &[Atom], functional: Option<&str>, options: EngineOptions) -> EnergyResult {
    DispersionEngine::new(combined_reference(), get_default_functionals())
        .with_options(options)
        .compute(atoms, functional)
        .expect("Engine failed")
}

fn atom(atomic_number: u8, position: [f64; 3]) -> Atom {
    Atom {
        atomic_number,
        position,
    }
}

fn translated(atoms: &[Atom], offset: [f64; 3]) -> Vec<Atom> {
    atoms
        .iter()
        .map(|a| {
            atom(
                a.atomic_number,
                [
                    a.position[0] + offset[0],
                    a.position[1] + offset[1],
                    a.position[2] + offset[2],
                ],
            )
        })
        .collect()
}

pub fn formic_acid_dimer() -> Vec<Atom> {
    vec![
        atom(6, [-1.888896, -0.179692, 0.000000]),
        atom(8, [-1.493280, 1.073689, 0.000000]),
        atom(8, [-1.170435, -1.166590, 0.000000]),
        atom(1, [-2.979488, -0.258829, 0.000000]),
        atom(1, [-0.498833, 1.107195, 0.000000]),
        atom(6, [1.888896, 0.179692, 0.000000]),
        atom(8, [1.493280, -1.073689, 0.000000]),
        atom(8, [1.170435, 1.166590, 0.000000]),
        atom(1, [2.979488, 0.258829, 0.000000]),
        atom(1, [0.498833, -1.107195, 0.000000]),
    ]
}

pub fn water() -> Vec<Atom> {
    vec![
        atom(8, [0.000000, 0.000000, 0.117790]),
        atom(1, [0.000000, 0.755453, -0.471161]),
        atom(1, [0.000000, -0.755453, -0.471161]),
    ]
}

pub fn water_dimer() -> Vec<Atom> {
    vec![
        atom(8, [-1.551007, -0.114520, 0.000000]),
        atom(1, [-1.934259, 0.762503, 0.000000]),
        atom(1, [-0.599677, 0.040712, 0.000000]),
        atom(8, [1.350625, 0.111469, 0.000000]),
        atom(1, [1.680398, -0.373741, -0.758561]),
        atom(1, [1.680398, -0.373741, 0.758561]),
    ]
}

/// Three water molecules on the corners of a triangle, far enough apart not to bond.
pub fn water_trimer() -> Vec<Atom> {
    let mut atoms = water();
    atoms.extend(translated(&water(), [3.2, 0.0, 0.0]));
    atoms.extend(translated(&water(), [1.6, 2.8, 0.0]));
    atoms
}

pub fn methane() -> Vec<Atom> {
    let s = 1.087 / 3.0f64.sqrt();
    vec![
        atom(6, [0.0, 0.0, 0.0]),
        atom(1, [s, s, s]),
        atom(1, [s, -s, -s]),
        atom(1, [-s, s, -s]),
        atom(1, [-s, -s, s]),
    ]
}

pub fn ammonia_methanol() -> Vec<Atom> {
    vec![
        atom(7, [-1.578718, -0.046611, 0.000000]),
        atom(1, [-2.158621, 0.136396, -0.809565]),
        atom(1, [-2.158621, 0.136396, 0.809565]),
        atom(1, [-0.849471, 0.658193, 0.000000]),
        atom(8, [1.369822, -0.122070, 0.000000]),
        atom(6, [1.866088, 1.216167, 0.000000]),
        atom(1, [0.427059, -0.047939, 0.000000]),
        atom(1, [2.952218, 1.201046, 0.000000]),
        atom(1, [1.529778, 1.759716, 0.887893]),
        atom(1, [1.529778, 1.759716, -0.887893]),
    ]
}
