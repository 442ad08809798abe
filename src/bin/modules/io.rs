use super::cli::{InputFormat, OutputFormat};
use super::error::CliError;
use dftd3::elements::{atomic_number_to_symbol, parse_element};
use dftd3::{Atom, DampingScheme, EnergyResult, EnergyUnit, ScalingParameters};
use prettytable::*;
use serde::Deserialize;
use serde_json::json;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// A geometry read from an input file, with the functional it names (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct InputStructure {
    pub atoms: Vec<Atom>,
    pub functional: Option<String>,
}

impl InputFormat {
    /// Infers the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "xyz" | "txt" => Some(InputFormat::Xyz),
            "com" | "gjf" => Some(InputFormat::Com),
            "log" | "out" => Some(InputFormat::Log),
            "json" => Some(InputFormat::Json),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            InputFormat::Xyz => "XYZ",
            InputFormat::Com => "Gaussian input",
            InputFormat::Log => "Gaussian output",
            InputFormat::Json => "JSON",
        }
    }
}

pub fn read_structure(
    input_spec: &str,
    forced_format: Option<InputFormat>,
) -> Result<InputStructure, CliError> {
    let (content, source_name, inferred) = if input_spec == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        (content, "stdin".to_string(), Some(InputFormat::Xyz))
    } else {
        let path = PathBuf::from(input_spec);
        let content = std::fs::read_to_string(&path).map_err(|e| CliError::Io {
            path: path.clone(),
            source: e,
        })?;
        (content, input_spec.to_string(), InputFormat::from_path(&path))
    };

    let format = forced_format
        .or(inferred)
        .ok_or_else(|| CliError::UnknownInputFormat(input_spec.to_string()))?;

    parse_structure(&content, format, &source_name)
}

pub fn parse_structure(
    content: &str,
    format: InputFormat,
    source_name: &str,
) -> Result<InputStructure, CliError> {
    let parsed = match format {
        InputFormat::Xyz => parse_xyz(content),
        InputFormat::Com => parse_gaussian_input(content),
        InputFormat::Log => parse_gaussian_output(content),
        InputFormat::Json => return parse_json(content, source_name),
    };

    parsed.map_err(|details| CliError::GeometryParse {
        format: format.name(),
        source_name: source_name.to_string(),
        details,
    })
}

/// Parses XYZ, or a bare list of `El x y z` lines when the first line is not an atom count.
fn parse_xyz(content: &str) -> Result<InputStructure, String> {
    let mut lines = content.lines().enumerate();
    let (_, first) = lines.next().ok_or("Empty input")?;

    let Ok(num_atoms) = first.trim().parse::<usize>() else {
        return parse_coordinate_list(content);
    };

    let (_, comment) = lines.next().ok_or("Missing comment line")?;

    let mut atoms = Vec::with_capacity(num_atoms);
    for (index, line) in lines.take(num_atoms) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(format!(
                "Line {}: expected at least 4 fields, got {}",
                index + 1,
                fields.len()
            ));
        }
        atoms.push(parse_atom(fields[0], &fields[1..4], index + 1)?);
    }

    if atoms.len() != num_atoms {
        return Err(format!("Expected {} atoms, got {}", num_atoms, atoms.len()));
    }

    Ok(InputStructure {
        atoms,
        functional: functional_from_comment(comment),
    })
}

fn parse_coordinate_list(content: &str) -> Result<InputStructure, String> {
    let mut atoms = Vec::new();
    let mut functional = None;
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(name) = functional_from_comment(trimmed) {
            functional = Some(name);
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(format!(
                "Line {}: expected an atom count or 'El x y z', got '{}'",
                index + 1,
                trimmed
            ));
        }
        atoms.push(parse_atom(fields[0], &fields[1..4], index + 1)?);
    }
    Ok(InputStructure { atoms, functional })
}

/// Parses a Gaussian input deck: route section, title section, charge/multiplicity, atoms.
fn parse_gaussian_input(content: &str) -> Result<InputStructure, String> {
    let lines: Vec<&str> = content.lines().collect();
    let is_blank = |index: usize| lines[index].trim().is_empty();

    let mut index = lines
        .iter()
        .position(|line| line.trim_start().starts_with('#'))
        .ok_or("Missing route line")?;

    let mut route = String::new();
    while index < lines.len() && !is_blank(index) {
        route.push_str(lines[index].trim());
        route.push(' ');
        index += 1;
    }

    // Title section.
    while index < lines.len() && is_blank(index) {
        index += 1;
    }
    while index < lines.len() && !is_blank(index) {
        index += 1;
    }
    while index < lines.len() && is_blank(index) {
        index += 1;
    }

    let charge_line = lines
        .get(index)
        .ok_or("Missing charge and multiplicity line")?;
    let charge_fields: Vec<&str> = charge_line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .collect();
    if charge_fields.len() < 2 || charge_fields.iter().any(|f| f.parse::<i32>().is_err()) {
        return Err(format!(
            "Line {}: expected charge and multiplicity, got '{}'",
            index + 1,
            charge_line.trim()
        ));
    }
    index += 1;

    let mut atoms = Vec::new();
    while index < lines.len() && !is_blank(index) {
        let fields: Vec<&str> = lines[index]
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .collect();
        if fields.len() < 4 {
            return Err(format!(
                "Line {}: expected Cartesian coordinates, got '{}'",
                index + 1,
                lines[index].trim()
            ));
        }
        // Optional freeze codes sit between the label and the coordinates.
        atoms.push(parse_atom(fields[0], &fields[fields.len() - 3..], index + 1)?);
        index += 1;
    }

    if atoms.is_empty() {
        return Err("No atoms found after the charge and multiplicity line".to_string());
    }

    Ok(InputStructure {
        atoms,
        functional: functional_from_route(&route),
    })
}

/// Parses a Gaussian output file, taking the last standard (or input) orientation block.
fn parse_gaussian_output(content: &str) -> Result<InputStructure, String> {
    let lines: Vec<&str> = content.lines().collect();

    let mut route = String::new();
    if let Some(start) = lines
        .iter()
        .position(|line| line.trim_start().starts_with('#'))
    {
        for line in &lines[start..] {
            if line.trim_start().starts_with("---") {
                break;
            }
            route.push_str(line.trim());
        }
    }

    let last_block = |marker: &str| lines.iter().rposition(|line| line.contains(marker));
    let header = last_block("Standard orientation:")
        .or_else(|| last_block("Input orientation:"))
        .ok_or("No 'Standard orientation' or 'Input orientation' block found")?;

    // Dashes, two column-title lines, dashes.
    let mut atoms = Vec::new();
    for (index, line) in lines.iter().enumerate().skip(header + 5) {
        if line.trim_start().starts_with("---") {
            break;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            return Err(format!(
                "Line {}: malformed orientation row '{}'",
                index + 1,
                line.trim()
            ));
        }
        atoms.push(parse_atom(fields[1], &fields[fields.len() - 3..], index + 1)?);
    }

    if atoms.is_empty() {
        return Err("Orientation block contains no atoms".to_string());
    }

    Ok(InputStructure {
        atoms,
        functional: functional_from_route(&route),
    })
}

#[derive(Deserialize)]
struct JsonGeometry {
    symbols: Vec<String>,
    geometry: Vec<[f64; 3]>,
    #[serde(default)]
    functional: Option<String>,
}

fn parse_json(content: &str, source_name: &str) -> Result<InputStructure, CliError> {
    let raw: JsonGeometry = serde_json::from_str(content).map_err(|e| CliError::JsonParse {
        source_name: source_name.to_string(),
        source: e,
    })?;

    let parse_error = |details: String| CliError::GeometryParse {
        format: InputFormat::Json.name(),
        source_name: source_name.to_string(),
        details,
    };

    if raw.symbols.len() != raw.geometry.len() {
        return Err(parse_error(format!(
            "{} symbols but {} positions",
            raw.symbols.len(),
            raw.geometry.len()
        )));
    }

    let atoms = raw
        .symbols
        .iter()
        .zip(raw.geometry)
        .map(|(symbol, position)| {
            parse_element(symbol)
                .map(|atomic_number| Atom {
                    atomic_number,
                    position,
                })
                .ok_or_else(|| parse_error(format!("Unknown element: {}", symbol)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InputStructure {
        atoms,
        functional: raw.functional.filter(|name| !name.trim().is_empty()),
    })
}

fn parse_atom(label: &str, coordinates: &[&str], line: usize) -> Result<Atom, String> {
    let atomic_number =
        parse_element(label).ok_or_else(|| format!("Line {}: unknown element '{}'", line, label))?;

    let mut position = [0.0; 3];
    for (axis, (value, name)) in coordinates.iter().zip(["x", "y", "z"]).enumerate() {
        position[axis] = value
            .parse()
            .map_err(|_| format!("Line {}: invalid {} coordinate '{}'", line, name, value))?;
    }

    Ok(Atom {
        atomic_number,
        position,
    })
}

/// Extracts `NAME` from a `functional=NAME` token.
fn functional_from_comment(comment: &str) -> Option<String> {
    comment.split_whitespace().find_map(|token| {
        let (key, value) = token.split_once('=')?;
        (key.eq_ignore_ascii_case("functional") && !value.is_empty()).then(|| value.to_string())
    })
}

/// Extracts the method of a Gaussian route section (`# B3LYP/6-31G(d)` gives `B3LYP`).
fn functional_from_route(route: &str) -> Option<String> {
    route.split_whitespace().find_map(|token| {
        let token = token.trim_start_matches('#');
        if matches!(token.to_ascii_lowercase().as_str(), "" | "p" | "n" | "t") {
            return None;
        }
        let (method, _basis) = token.split_once('/')?;
        (!method.is_empty()).then(|| method.to_string())
    })
}

pub fn get_writer(output_path: &Option<PathBuf>) -> Result<Box<dyn Write>, CliError> {
    match output_path {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|e| CliError::Io {
                path: path.clone(),
                source: e,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

/// Everything the report writers need besides the energies themselves.
pub struct Report<'a> {
    pub source_name: &'a str,
    pub atoms: &'a [Atom],
    pub functional: Option<&'a str>,
    pub three_body: bool,
    pub result: &'a EnergyResult,
}

pub fn write_results(
    mut writer: Box<dyn Write>,
    report: &Report,
    format: &OutputFormat,
    precision: usize,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Pretty => write_pretty_table(&mut writer, report, precision)?,
        OutputFormat::Csv => write_csv(&mut writer, report, precision)?,
        OutputFormat::Json => write_json(&mut writer, report, precision)?,
    }
    writer.flush()?;
    Ok(())
}

fn symbol(atoms: &[Atom], index: usize) -> &'static str {
    atomic_number_to_symbol(atoms[index].atomic_number).unwrap_or("??")
}

fn damping_label(damping: DampingScheme) -> &'static str {
    match damping {
        DampingScheme::Zero => "Zero",
        DampingScheme::BeckeJohnson => "Becke-Johnson",
    }
}

fn write_pretty_table(
    writer: &mut dyn Write,
    report: &Report,
    precision: usize,
) -> Result<(), CliError> {
    let box_format = format::FormatBuilder::new()
        .column_separator('│')
        .borders('│')
        .separators(
            &[format::LinePosition::Top],
            format::LineSeparator::new('─', '┬', '╭', '╮'),
        )
        .separators(
            &[format::LinePosition::Title],
            format::LineSeparator::new('═', '╪', '╞', '╡'),
        )
        .separators(
            &[format::LinePosition::Intern],
            format::LineSeparator::new('─', '┼', '├', '┤'),
        )
        .separators(
            &[format::LinePosition::Bottom],
            format::LineSeparator::new('─', '┴', '╰', '╯'),
        )
        .padding(1, 1)
        .build();

    let no_intern_format = format::FormatBuilder::new()
        .column_separator('│')
        .borders('│')
        .separators(
            &[format::LinePosition::Top],
            format::LineSeparator::new('─', '┬', '╭', '╮'),
        )
        .separators(
            &[format::LinePosition::Bottom],
            format::LineSeparator::new('─', '┴', '╰', '╯'),
        )
        .padding(1, 1)
        .build();

    let result = report.result;
    let unit = result.unit.label();
    let energy = |value: f64| format!("{:.prec$} {}", value, unit, prec = precision);

    let mut title_table = Table::new();
    title_table.set_format(box_format);
    title_table.add_row(row![bc->"D3 Dispersion Correction Results"]);
    title_table.print(writer)?;
    writeln!(writer)?;

    let mut summary_table = Table::new();
    summary_table.set_format(no_intern_format);
    summary_table.add_row(row![b->"Source File:", report.source_name]);
    summary_table.add_row(row![b->"Total Atoms:", report.atoms.len()]);
    summary_table.add_row(row![b->"Functional:", report.functional.unwrap_or("(custom)")]);
    summary_table.add_row(row![b->"Damping:", damping_label(result.parameters.damping())]);
    summary_table.add_row(row![b->"Parameters:", result.parameters]);
    if let Some(ids) = &result.molecule_ids {
        let molecules = ids.iter().max().map_or(0, |max| max + 1);
        summary_table.add_row(row![b->"Molecules:", format!("{} (intermolecular only)", molecules)]);
    }
    summary_table.print(writer)?;
    writeln!(writer)?;

    let mut energy_table = Table::new();
    energy_table.set_format(box_format);
    energy_table.set_titles(row![bc->"Term", bc->"Energy"]);
    energy_table.add_row(row![l->"E6 (r^-6)", r->energy(result.r6)]);
    energy_table.add_row(row![l->"E8 (r^-8)", r->energy(result.r8)]);
    if report.three_body {
        energy_table.add_row(row![l->"E(ABC) three-body", r->energy(result.three_body)]);
    }
    energy_table.add_row(row![bl->"Total", br->energy(result.total)]);
    energy_table.print(writer)?;

    if let Some(pairs) = &result.pairs {
        writeln!(writer)?;
        let mut pair_table = Table::new();
        pair_table.set_format(box_format);
        pair_table.set_titles(row![
            bc->"i", bc->"j", bc->"Pair", bc->"r (Å)", bc->"C6 (a.u.)", bc->"C8 (a.u.)",
            bc->format!("E6 ({})", unit), bc->format!("E8 ({})", unit)
        ]);
        for pair in pairs {
            pair_table.add_row(row![
                r->pair.i,
                r->pair.j,
                l->format!("{}-{}", symbol(report.atoms, pair.i), symbol(report.atoms, pair.j)),
                r->format!("{:.prec$}", pair.distance, prec = precision),
                r->format!("{:.prec$}", pair.c6, prec = precision),
                r->format!("{:.prec$}", pair.c8, prec = precision),
                r->format!("{:.prec$}", pair.r6, prec = precision),
                r->format!("{:.prec$}", pair.r8, prec = precision)
            ]);
        }
        pair_table.print(writer)?;
    }

    if let Some(triples) = &result.triples {
        writeln!(writer)?;
        let mut triple_table = Table::new();
        triple_table.set_format(box_format);
        triple_table.set_titles(row![
            bc->"i", bc->"j", bc->"k", bc->"C9 (a.u.)", bc->format!("E(ABC) ({})", unit)
        ]);
        for triple in triples {
            triple_table.add_row(row![
                r->triple.i,
                r->triple.j,
                r->triple.k,
                r->format!("{:.prec$}", triple.c9, prec = precision),
                r->format!("{:.prec$}", triple.energy, prec = precision)
            ]);
        }
        triple_table.print(writer)?;
    }

    Ok(())
}

fn unit_key(unit: EnergyUnit) -> &'static str {
    match unit {
        EnergyUnit::Hartree => "hartree",
        EnergyUnit::KcalPerMol => "kcal_mol",
    }
}

fn write_csv(writer: &mut dyn Write, report: &Report, precision: usize) -> Result<(), CliError> {
    let result = report.result;
    writeln!(writer, "term,energy_{}", unit_key(result.unit))?;
    writeln!(writer, "r6,{:.*}", precision, result.r6)?;
    writeln!(writer, "r8,{:.*}", precision, result.r8)?;
    writeln!(writer, "three_body,{:.*}", precision, result.three_body)?;
    writeln!(writer, "total,{:.*}", precision, result.total)?;

    if let Some(pairs) = &result.pairs {
        writeln!(writer)?;
        writeln!(writer, "i,j,element_i,element_j,distance,c6,c8,r6,r8")?;
        for pair in pairs {
            writeln!(
                writer,
                "{},{},{},{},{:.*},{:.*},{:.*},{:.*},{:.*}",
                pair.i,
                pair.j,
                symbol(report.atoms, pair.i),
                symbol(report.atoms, pair.j),
                precision,
                pair.distance,
                precision,
                pair.c6,
                precision,
                pair.c8,
                precision,
                pair.r6,
                precision,
                pair.r8
            )?;
        }
    }

    if let Some(triples) = &result.triples {
        writeln!(writer)?;
        writeln!(writer, "i,j,k,c9,energy")?;
        for triple in triples {
            writeln!(
                writer,
                "{},{},{},{:.*},{:.*}",
                triple.i, triple.j, triple.k, precision, triple.c9, precision, triple.energy
            )?;
        }
    }

    Ok(())
}

fn rounded(value: f64, precision: usize) -> f64 {
    format!("{:.*}", precision, value).parse().unwrap_or(value)
}

fn write_json(writer: &mut dyn Write, report: &Report, precision: usize) -> Result<(), CliError> {
    let result = report.result;
    let round = |value: f64| rounded(value, precision);

    let parameters = match result.parameters {
        ScalingParameters::Zero { s6, rs6, s8 } => json!({ "s6": s6, "rs6": rs6, "s8": s8 }),
        ScalingParameters::BeckeJohnson { s6, a1, s8, a2 } => {
            json!({ "s6": s6, "a1": a1, "s8": s8, "a2": a2 })
        }
    };

    let mut document = json!({
        "source": report.source_name,
        "n_atoms": report.atoms.len(),
        "functional": report.functional,
        "damping": result.parameters.damping().to_string(),
        "parameters": parameters,
        "unit": unit_key(result.unit),
        "energies": {
            "r6": round(result.r6),
            "r8": round(result.r8),
            "three_body": round(result.three_body),
            "total": round(result.total),
        },
        "coordination_numbers": result
            .coordination_numbers
            .iter()
            .map(|&cn| round(cn))
            .collect::<Vec<_>>(),
        "molecule_ids": result.molecule_ids,
    });

    if let Some(pairs) = &result.pairs {
        document["pairs"] = pairs
            .iter()
            .map(|pair| {
                json!({
                    "i": pair.i,
                    "j": pair.j,
                    "distance": round(pair.distance),
                    "c6": round(pair.c6),
                    "c8": round(pair.c8),
                    "r6": round(pair.r6),
                    "r8": round(pair.r8),
                })
            })
            .collect();
    }
    if let Some(triples) = &result.triples {
        document["triples"] = triples
            .iter()
            .map(|triple| {
                json!({
                    "i": triple.i,
                    "j": triple.j,
                    "k": triple.k,
                    "c9": round(triple.c9),
                    "energy": round(triple.energy),
                })
            })
            .collect();
    }

    serde_json::to_writer_pretty(&mut *writer, &document)?;
    writeln!(writer)?;
    Ok(())
}
