use super::cli::Cli;
use super::error::CliError;
use super::io;
use super::logging;
use dftd3::{
    DispersionEngine, EngineOptions, FunctionalTable, ReferenceData, ScalingOverrides,
    get_default_functionals, get_default_reference_data,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

pub fn run(args: Cli) -> Result<(), CliError> {
    logging::setup_logging(
        args.logging.verbose,
        args.logging.quiet,
        args.logging.log_file.as_deref(),
    )?;

    let reference = if let Some(path) = &args.calculation.reference {
        info!(path = %path.display(), "Loading custom reference table.");
        ReferenceData::load_from_file(path)?
    } else {
        get_default_reference_data().clone()
    };

    let functionals = if let Some(path) = &args.calculation.params {
        info!(path = %path.display(), "Loading custom functional table.");
        FunctionalTable::load_from_file(path)?
    } else {
        get_default_functionals().clone()
    };

    let structure = io::read_structure(&args.input, args.input_format)?;
    let functional = args
        .calculation
        .functional
        .clone()
        .or_else(|| structure.functional.clone());
    debug!(
        n_atoms = structure.atoms.len(),
        functional = functional.as_deref().unwrap_or("(none)"),
        "Structure loaded."
    );

    let options = EngineOptions {
        damping: args.calculation.damping.into(),
        overrides: ScalingOverrides {
            s6: args.parameters.s6,
            rs6: args.parameters.rs6,
            s8: args.parameters.s8,
            a1: args.parameters.a1,
            a2: args.parameters.a2,
        },
        three_body: args.calculation.three_body,
        intermolecular_only: args.calculation.intermolecular,
        pairwise: args.output.pairwise,
        unit: args.output.unit.into(),
        bond_tolerance: args.calculation.bond_tolerance,
    };
    let engine = DispersionEngine::new(&reference, &functionals).with_options(options);

    let source_name = if args.input == "-" {
        "stdin".to_string()
    } else {
        args.input.clone()
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Calculating dispersion energy...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = engine.compute(&structure.atoms, functional.as_deref());

    pb.finish_and_clear();
    let result = result?;
    info!(total = result.total, unit = result.unit.label(), "Dispersion energy computed.");

    let writer = io::get_writer(&args.output.output)?;
    io::write_results(
        writer,
        &io::Report {
            source_name: &source_name,
            atoms: &structure.atoms,
            functional: functional.as_deref(),
            three_body: args.calculation.three_body,
            result: &result,
        },
        &args.output.format,
        args.output.precision,
    )?;

    Ok(())
}
