use clap::{ArgAction, Args, Parser, ValueEnum};
use dftd3::math::constants::BOND_TOLERANCE;
use dftd3::{DampingScheme, EnergyUnit};
use std::path::PathBuf;

const AUTHORS: &str = "Tony Kan, Ted Yu";
const ABOUT: &str = "A command-line tool for calculating D3 empirical dispersion corrections with zero or Becke-Johnson damping.";
const COPYRIGHT: &str = "Copyright (c) 2025 Tony Kan, Ted Yu";
const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser)]
#[command(
    author = AUTHORS,
    version,
    about = ABOUT,
    after_help = COPYRIGHT,
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Input file containing the molecular geometry.
    ///
    /// Supported formats are XYZ (.xyz, .txt), Gaussian input (.com, .gjf), Gaussian output
    /// (.log, .out) and JSON (.json); the format is chosen from the extension unless
    /// --input-format is given. Use '-' to read XYZ from standard input.
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Force the input format instead of inferring it from the file extension.
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub input_format: Option<InputFormat>,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub calculation: CalculationOptions,

    #[command(flatten)]
    pub parameters: ParameterOptions,

    #[command(flatten)]
    pub logging: LoggingOptions,
}

/// Options for controlling the output format and destination.
#[derive(Args)]
#[command(next_help_heading = "Output Options")]
pub struct OutputOptions {
    /// Output file path.
    ///
    /// If not specified, results are written to standard output.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format for the results.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Number of decimal places to display for floating-point values.
    #[arg(short, long, default_value_t = 6)]
    pub precision: usize,

    /// Unit of the reported energies.
    #[arg(short, long, value_enum, default_value_t = UnitArg::Kcal)]
    pub unit: UnitArg,

    /// Print the contribution of every atom pair (and triple, with --three-body).
    #[arg(long)]
    pub pairwise: bool,
}

/// Options for controlling what the calculation includes.
#[derive(Args)]
#[command(next_help_heading = "Calculation Options")]
pub struct CalculationOptions {
    /// Density functional whose D3 parameters to use.
    ///
    /// Overrides the functional found in the input file.
    #[arg(short = 'F', long, value_name = "NAME")]
    pub functional: Option<String>,

    /// Short-range damping scheme.
    #[arg(short, long, value_enum, default_value_t = DampingArg::Zero)]
    pub damping: DampingArg,

    /// Include the Axilrod-Teller-Muto three-body term.
    #[arg(long)]
    pub three_body: bool,

    /// Only count interactions between different molecules.
    ///
    /// Molecules are found from bond connectivity; pairs within one molecule, and triples
    /// containing such a pair, are skipped.
    #[arg(long)]
    pub intermolecular: bool,

    /// Scale on the summed covalent radii below which two atoms count as bonded.
    #[arg(long, value_name = "FACTOR", default_value_t = BOND_TOLERANCE)]
    pub bond_tolerance: f64,

    /// Custom reference C6 table in TOML format.
    ///
    /// If not specified, the built-in table is used.
    #[arg(short = 'R', long, value_name = "FILE")]
    pub reference: Option<PathBuf>,

    /// Custom functional parameter table in TOML format.
    ///
    /// If not specified, the built-in table is used.
    #[arg(short = 'P', long, value_name = "FILE")]
    pub params: Option<PathBuf>,
}

/// Overrides for the tabulated scaling parameters.
///
/// With a recognized functional, a value of 0 keeps the tabulated value. Without one, every
/// parameter of the chosen damping scheme must be given.
#[derive(Args)]
#[command(next_help_heading = "Parameter Overrides")]
pub struct ParameterOptions {
    /// Global scale of the r^-6 term.
    #[arg(long, value_name = "VALUE")]
    pub s6: Option<f64>,

    /// Radius scale of the r^-6 zero-damping function.
    #[arg(long, value_name = "VALUE")]
    pub rs6: Option<f64>,

    /// Global scale of the r^-8 term.
    #[arg(long, value_name = "VALUE")]
    pub s8: Option<f64>,

    /// Becke-Johnson scale of the critical radius.
    #[arg(long, value_name = "VALUE")]
    pub a1: Option<f64>,

    /// Becke-Johnson offset of the cutoff radius, in bohr.
    #[arg(long, value_name = "VALUE")]
    pub a2: Option<f64>,
}

/// Options for controlling diagnostic output.
#[derive(Args)]
#[command(next_help_heading = "Logging Options")]
pub struct LoggingOptions {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Additionally write the log to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Output format for the calculation results.
#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed tables with the energy breakdown.
    Pretty,
    /// Comma-separated values: energy terms, then pairs and triples when requested.
    Csv,
    /// JSON object containing energies, parameters and breakdowns.
    Json,
}

/// Geometry file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// XYZ; a 'functional=NAME' token on the comment line selects the functional.
    Xyz,
    /// Gaussian input deck; the functional is the method of the route line.
    Com,
    /// Gaussian output; the last oriented geometry is used.
    Log,
    /// JSON object with "symbols", "geometry" and optional "functional".
    Json,
}

/// Damping scheme selector.
#[derive(Clone, Copy, ValueEnum)]
pub enum DampingArg {
    /// Zero damping.
    Zero,
    /// Becke-Johnson (rational) damping.
    Bj,
}

impl From<DampingArg> for DampingScheme {
    fn from(arg: DampingArg) -> Self {
        match arg {
            DampingArg::Zero => DampingScheme::Zero,
            DampingArg::Bj => DampingScheme::BeckeJohnson,
        }
    }
}

/// Energy unit selector.
#[derive(Clone, Copy, ValueEnum)]
pub enum UnitArg {
    /// Kilocalories per mole.
    Kcal,
    /// Hartree.
    Hartree,
}

impl From<UnitArg> for EnergyUnit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Kcal => EnergyUnit::KcalPerMol,
            UnitArg::Hartree => EnergyUnit::Hartree,
        }
    }
}
