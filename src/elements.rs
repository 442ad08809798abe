//! Periodic-table symbol lookup.

const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Converts an element symbol to its atomic number.
///
/// The match is case-sensitive (`"Fe"`, not `"FE"`), mirroring the way symbols are written in
/// the data files. Use [`parse_element`] for user input.
pub fn element_symbol_to_atomic_number(symbol: &str) -> Option<u8> {
    SYMBOLS
        .iter()
        .position(|&s| s == symbol)
        .map(|index| (index + 1) as u8)
}

/// Converts an atomic number to its element symbol.
pub fn atomic_number_to_symbol(atomic_number: u8) -> Option<&'static str> {
    match atomic_number {
        1..=118 => Some(SYMBOLS[atomic_number as usize - 1]),
        _ => None,
    }
}

/// Parses an element given as an atomic number or as a symbol in any letter case.
///
/// Trailing digits of labels such as `"C1"` or `"H12"` are ignored, which is how many
/// quantum-chemistry formats tag individual atoms.
pub fn parse_element(token: &str) -> Option<u8> {
    if let Ok(number) = token.parse::<u8>() {
        return atomic_number_to_symbol(number).map(|_| number);
    }

    let letters: String = token
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    let mut chars = letters.chars();
    let normalized = match chars.next() {
        Some(first) => {
            let mut s = first.to_ascii_uppercase().to_string();
            s.push_str(&chars.as_str().to_ascii_lowercase());
            s
        }
        None => return None,
    };

    element_symbol_to_atomic_number(&normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_symbol_to_atomic_number() {
        assert_eq!(element_symbol_to_atomic_number("H"), Some(1));
        assert_eq!(element_symbol_to_atomic_number("O"), Some(8));
        assert_eq!(element_symbol_to_atomic_number("Fe"), Some(26));
        assert_eq!(element_symbol_to_atomic_number("Og"), Some(118));
        assert_eq!(element_symbol_to_atomic_number("Xx"), None);
        assert_eq!(element_symbol_to_atomic_number("h"), None);
    }

    #[test]
    fn test_atomic_number_to_symbol() {
        assert_eq!(atomic_number_to_symbol(6), Some("C"));
        assert_eq!(atomic_number_to_symbol(118), Some("Og"));
        assert_eq!(atomic_number_to_symbol(0), None);
        assert_eq!(atomic_number_to_symbol(119), None);
    }

    #[test]
    fn test_parse_element_accepts_user_spellings() {
        assert_eq!(parse_element("CL"), Some(17));
        assert_eq!(parse_element("cl"), Some(17));
        assert_eq!(parse_element("C1"), Some(6));
        assert_eq!(parse_element("8"), Some(8));
        assert_eq!(parse_element("0"), None);
        assert_eq!(parse_element(""), None);
        assert_eq!(parse_element("Qq"), None);
    }
}
