use approx::assert_relative_eq;
use dftd3::{
    Atom, DampingScheme, EnergyUnit, EngineOptions, HARTREE_TO_KCAL_MOL, ScalingOverrides,
};

mod common;
use common::{
    TestCase, ammonia_methanol, compute, formic_acid_dimer, methane, run_group_test, water_dimer,
};

fn zero_options() -> EngineOptions {
    EngineOptions {
        damping: DampingScheme::Zero,
        ..Default::default()
    }
}

fn bj_options() -> EngineOptions {
    EngineOptions {
        damping: DampingScheme::BeckeJohnson,
        ..Default::default()
    }
}

fn molecules<'a>() -> Vec<TestCase<'a>> {
    vec![
        TestCase {
            name: "Formic acid dimer",
            atoms: formic_acid_dimer(),
            functional: Some("B3LYP"),
        },
        TestCase {
            name: "Water dimer",
            atoms: water_dimer(),
            functional: Some("PBE0"),
        },
        TestCase {
            name: "Methane",
            atoms: methane(),
            functional: Some("BLYP"),
        },
        TestCase {
            name: "Ammonia-methanol",
            atoms: ammonia_methanol(),
            functional: Some("TPSS"),
        },
    ]
}

#[test]
fn subtotals_add_up_to_total() {
    let options = EngineOptions {
        three_body: true,
        ..zero_options()
    };
    run_group_test("Zero damping, subtotals", molecules(), options, |case, result| {
        assert!(result.r6 < 0.0, "{}: r6 should be attractive", case.name);
        assert!(result.r8 < 0.0, "{}: r8 should be attractive", case.name);
        assert!(result.three_body != 0.0, "{}: three-body term missing", case.name);
        assert_relative_eq!(
            result.total,
            result.r6 + result.r8 + result.three_body,
            max_relative = 1e-14
        );
    });

    let options = EngineOptions {
        three_body: true,
        ..bj_options()
    };
    run_group_test("BJ damping, subtotals", molecules(), options, |case, result| {
        assert!(result.total < 0.0, "{}: total should be attractive", case.name);
        assert_relative_eq!(
            result.total,
            result.r6 + result.r8 + result.three_body,
            max_relative = 1e-14
        );
    });
}

#[test]
fn pairwise_breakdown_matches_subtotals() {
    let options = EngineOptions {
        three_body: true,
        pairwise: true,
        ..bj_options()
    };
    run_group_test("Pairwise breakdown", molecules(), options, |case, result| {
        let n = case.atoms.len();
        let pairs = result.pairs.as_ref().expect("pairs requested");
        let triples = result.triples.as_ref().expect("triples requested");
        assert_eq!(pairs.len(), n * (n - 1) / 2);
        assert_eq!(triples.len(), n * (n - 1) * (n - 2) / 6);

        assert!(pairs.windows(2).all(|w| (w[0].i, w[0].j) < (w[1].i, w[1].j)));
        assert!(pairs.iter().all(|p| p.i < p.j && p.c6 > 0.0 && p.c8 > p.c6));

        let r6: f64 = pairs.iter().map(|p| p.r6).sum();
        let r8: f64 = pairs.iter().map(|p| p.r8).sum();
        let abc: f64 = triples.iter().map(|t| t.energy).sum();
        assert_relative_eq!(r6, result.r6, max_relative = 1e-12);
        assert_relative_eq!(r8, result.r8, max_relative = 1e-12);
        assert_relative_eq!(abc, result.three_body, max_relative = 1e-10, epsilon = 1e-18);
    });
}

#[test]
fn breakdown_is_omitted_unless_requested() {
    let result = compute(&water_dimer(), Some("b3lyp"), zero_options());
    assert!(result.pairs.is_none());
    assert!(result.triples.is_none());
    assert!(result.molecule_ids.is_none());
    assert_eq!(result.three_body, 0.0);
    assert_eq!(result.coordination_numbers.len(), 6);
}

#[test]
fn repeated_evaluations_are_bit_identical() {
    let options = EngineOptions {
        three_body: true,
        ..zero_options()
    };
    let atoms = ammonia_methanol();
    let first = compute(&atoms, Some("pbe"), options);
    for _ in 0..5 {
        let again = compute(&atoms, Some("pbe"), options);
        assert_eq!(first.total.to_bits(), again.total.to_bits());
        assert_eq!(first.r6.to_bits(), again.r6.to_bits());
        assert_eq!(first.three_body.to_bits(), again.three_body.to_bits());
    }
}

#[test]
fn thread_count_does_not_change_the_result() {
    let options = EngineOptions {
        three_body: true,
        ..bj_options()
    };
    let atoms = formic_acid_dimer();

    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| compute(&atoms, Some("b3lyp"), options));
    let many = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap()
        .install(|| compute(&atoms, Some("b3lyp"), options));

    assert_eq!(single.total.to_bits(), many.total.to_bits());
    assert_eq!(single.r8.to_bits(), many.r8.to_bits());
    assert_eq!(single.three_body.to_bits(), many.three_body.to_bits());
}

#[test]
fn energy_is_invariant_under_atom_permutation() {
    let options = EngineOptions {
        three_body: true,
        ..zero_options()
    };
    let atoms = formic_acid_dimer();
    let mut reversed = atoms.clone();
    reversed.reverse();
    let mut rotated = atoms.clone();
    rotated.rotate_left(3);

    let reference = compute(&atoms, Some("b3lyp"), options);
    for permuted in [reversed, rotated] {
        let result = compute(&permuted, Some("b3lyp"), options);
        assert_relative_eq!(result.r6, reference.r6, max_relative = 1e-12);
        assert_relative_eq!(result.r8, reference.r8, max_relative = 1e-12);
        assert_relative_eq!(result.three_body, reference.three_body, max_relative = 1e-10);
    }
}

#[test]
fn energy_is_invariant_under_rigid_motion() {
    let atoms = ammonia_methanol();
    let moved: Vec<Atom> = atoms
        .iter()
        .map(|a| Atom {
            atomic_number: a.atomic_number,
            position: [
                -a.position[1] + 12.5,
                a.position[0] - 3.25,
                a.position[2] + 7.0,
            ],
        })
        .collect();

    for options in [zero_options(), bj_options()] {
        let a = compute(&atoms, Some("pbe0"), options);
        let b = compute(&moved, Some("pbe0"), options);
        assert_relative_eq!(a.total, b.total, max_relative = 1e-9);
    }
}

#[test]
fn kcal_results_are_scaled_hartree_results() {
    let atoms = water_dimer();
    let hartree = compute(&atoms, Some("b3lyp"), zero_options());
    let kcal = compute(
        &atoms,
        Some("b3lyp"),
        EngineOptions {
            unit: EnergyUnit::KcalPerMol,
            ..zero_options()
        },
    );
    assert_eq!(kcal.unit, EnergyUnit::KcalPerMol);
    assert_relative_eq!(kcal.total, hartree.total * HARTREE_TO_KCAL_MOL, max_relative = 1e-12);
    assert_relative_eq!(kcal.r6, hartree.r6 * HARTREE_TO_KCAL_MOL, max_relative = 1e-12);
}

#[test]
fn pair_terms_scale_linearly_with_s6_and_s8() {
    let atoms = formic_acid_dimer();

    let zero = |s6, s8| EngineOptions {
        overrides: ScalingOverrides {
            s6: Some(s6),
            rs6: Some(1.261),
            s8: Some(s8),
            ..Default::default()
        },
        ..zero_options()
    };
    let base = compute(&atoms, None, zero(1.0, 1.0));
    let scaled = compute(&atoms, None, zero(2.0, 0.5));
    assert_relative_eq!(scaled.r6, 2.0 * base.r6, max_relative = 1e-14);
    assert_relative_eq!(scaled.r8, 0.5 * base.r8, max_relative = 1e-14);

    let bj = |s6, s8| EngineOptions {
        overrides: ScalingOverrides {
            s6: Some(s6),
            a1: Some(0.3981),
            s8: Some(s8),
            a2: Some(4.4211),
            ..Default::default()
        },
        ..bj_options()
    };
    let base = compute(&atoms, None, bj(1.0, 1.0));
    let scaled = compute(&atoms, None, bj(3.0, 0.0));
    assert_relative_eq!(scaled.r6, 3.0 * base.r6, max_relative = 1e-14);
    assert_eq!(scaled.r8, 0.0);
}

#[test]
fn literal_overrides_reproduce_tabulated_functional() {
    let atoms = methane();
    let tabulated = compute(&atoms, Some("b3lyp"), bj_options());
    let literal = compute(
        &atoms,
        None,
        EngineOptions {
            overrides: ScalingOverrides {
                s6: Some(1.0),
                a1: Some(0.3981),
                s8: Some(1.9889),
                a2: Some(4.4211),
                ..Default::default()
            },
            ..bj_options()
        },
    );
    assert_eq!(tabulated.total, literal.total);
    assert_eq!(tabulated.parameters, literal.parameters);
}

#[test]
fn short_range_behaviour_depends_on_damping() {
    let pair_at = |r: f64| {
        vec![
            Atom {
                atomic_number: 6,
                position: [0.0, 0.0, 0.0],
            },
            Atom {
                atomic_number: 6,
                position: [r, 0.0, 0.0],
            },
        ]
    };

    let zero_close = compute(&pair_at(0.2), Some("b3lyp"), zero_options());
    let zero_mid = compute(&pair_at(3.5), Some("b3lyp"), zero_options());
    assert!(zero_close.total.abs() < 1e-10);
    assert!(zero_mid.total < -1e-4);

    let bj_close = compute(&pair_at(0.2), Some("b3lyp"), bj_options());
    let bj_closer = compute(&pair_at(0.05), Some("b3lyp"), bj_options());
    assert!(bj_close.total.is_finite() && bj_close.total < -5e-4);
    assert_relative_eq!(bj_close.total, bj_closer.total, max_relative = 1e-2);

    let bj_far = compute(&pair_at(40.0), Some("b3lyp"), bj_options());
    assert!(bj_far.total < 0.0 && bj_far.total.abs() < 1e-7);
}
