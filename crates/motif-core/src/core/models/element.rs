use phf::phf_map;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

macro_rules! elements {
    ($($variant:ident => $symbol:literal),+ $(,)?) => {
        /// A chemical element, plus the hydrogen isotopes deuterium and tritium.
        ///
        /// Variants are declared in atomic-number order, so the derived `Ord` follows the
        /// periodic table. Isotope variants come last.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Element {
            $($variant),+
        }

        impl Element {
            /// Returns the canonical symbol (e.g. `"Cl"`).
            pub const fn symbol(self) -> &'static str {
                match self {
                    $(Self::$variant => $symbol),+
                }
            }
        }

        static SYMBOL_TABLE: phf::Map<&'static str, Element> = phf_map! {
            $($symbol => Element::$variant),+
        };
    };
}

elements! {
    H => "H", He => "He", Li => "Li", Be => "Be", B => "B", C => "C", N => "N", O => "O",
    F => "F", Ne => "Ne", Na => "Na", Mg => "Mg", Al => "Al", Si => "Si", P => "P", S => "S",
    Cl => "Cl", Ar => "Ar", K => "K", Ca => "Ca", Sc => "Sc", Ti => "Ti", V => "V", Cr => "Cr",
    Mn => "Mn", Fe => "Fe", Co => "Co", Ni => "Ni", Cu => "Cu", Zn => "Zn", Ga => "Ga",
    Ge => "Ge", As => "As", Se => "Se", Br => "Br", Kr => "Kr", Rb => "Rb", Sr => "Sr",
    Y => "Y", Zr => "Zr", Nb => "Nb", Mo => "Mo", Tc => "Tc", Ru => "Ru", Rh => "Rh",
    Pd => "Pd", Ag => "Ag", Cd => "Cd", In => "In", Sn => "Sn", Sb => "Sb", Te => "Te",
    I => "I", Xe => "Xe", Cs => "Cs", Ba => "Ba", La => "La", Ce => "Ce", Pr => "Pr",
    Nd => "Nd", Pm => "Pm", Sm => "Sm", Eu => "Eu", Gd => "Gd", Tb => "Tb", Dy => "Dy",
    Ho => "Ho", Er => "Er", Tm => "Tm", Yb => "Yb", Lu => "Lu", Hf => "Hf", Ta => "Ta",
    W => "W", Re => "Re", Os => "Os", Ir => "Ir", Pt => "Pt", Au => "Au", Hg => "Hg",
    Tl => "Tl", Pb => "Pb", Bi => "Bi", Po => "Po", At => "At", Rn => "Rn", Fr => "Fr",
    Ra => "Ra", Ac => "Ac", Th => "Th", Pa => "Pa", U => "U", Np => "Np", Pu => "Pu",
    Am => "Am", Cm => "Cm", Bk => "Bk", Cf => "Cf", Es => "Es", Fm => "Fm", Md => "Md",
    No => "No", Lr => "Lr", Rf => "Rf", Db => "Db", Sg => "Sg", Bh => "Bh", Hs => "Hs",
    Mt => "Mt", Ds => "Ds", Rg => "Rg", Cn => "Cn", Nh => "Nh", Fl => "Fl", Mc => "Mc",
    Lv => "Lv", Ts => "Ts", Og => "Og",
    D => "D", T => "T",
}

impl Element {
    /// Hydrogen or one of its isotopes.
    pub fn is_hydrogen(self) -> bool {
        matches!(self, Self::H | Self::D | Self::T)
    }

    /// Metals as used by the bonding tables and the chirality categories.
    pub fn is_metal(self) -> bool {
        use Element::*;
        matches!(
            self,
            Li | Na | K | Rb | Cs | Fr | Be | Mg | Ca | Sr | Ba | Ra
                | Al | Ga | In | Sn | Tl | Pb | Bi
                | Sc | Ti | V | Cr | Mn | Fe | Co | Ni | Cu | Zn
                | Y | Zr | Nb | Mo | Tc | Ru | Rh | Pd | Ag | Cd
                | La | Hf | Ta | W | Re | Os | Ir | Pt | Au | Hg
                | Ac | Rf | Db | Sg | Bh | Hs | Mt
                | Ce | Pr | Nd | Pm | Sm | Eu | Gd | Tb | Dy | Ho | Er | Tm | Yb | Lu
                | Th | Pa | U | Np | Pu | Am | Cm | Bk | Cf | Es | Fm | Md | No | Lr
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown element symbol: '{0}'")]
pub struct ParseElementError(pub String);

impl FromStr for Element {
    type Err = ParseElementError;

    /// Parses an element symbol case-insensitively (`"CL"`, `"cl"` and `"Cl"` are all chlorine).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let normalized: String = match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => return Err(ParseElementError(s.to_string())),
        };
        SYMBOL_TABLE
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| ParseElementError(s.to_string()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_symbols_case_insensitively() {
        assert_eq!("C".parse::<Element>(), Ok(Element::C));
        assert_eq!("cl".parse::<Element>(), Ok(Element::Cl));
        assert_eq!("FE".parse::<Element>(), Ok(Element::Fe));
        assert_eq!(" n ".parse::<Element>(), Ok(Element::N));
        assert_eq!("d".parse::<Element>(), Ok(Element::D));
    }

    #[test]
    fn rejects_unknown_and_empty_symbols() {
        assert!("Xx".parse::<Element>().is_err());
        assert!("".parse::<Element>().is_err());
        assert!("Carbon".parse::<Element>().is_err());
    }

    #[test]
    fn symbol_and_display_round_trip_through_the_table() {
        for element in [Element::H, Element::Cl, Element::Og, Element::T, Element::In] {
            assert_eq!(element.symbol().parse::<Element>(), Ok(element));
            assert_eq!(element.to_string(), element.symbol());
        }
    }

    #[test]
    fn classifies_hydrogen_isotopes() {
        assert!(Element::H.is_hydrogen());
        assert!(Element::D.is_hydrogen());
        assert!(Element::T.is_hydrogen());
        assert!(!Element::He.is_hydrogen());
    }

    #[test]
    fn classifies_metals() {
        assert!(Element::Fe.is_metal());
        assert!(Element::Mg.is_metal());
        assert!(Element::Lr.is_metal());
        assert!(!Element::C.is_metal());
        assert!(!Element::Se.is_metal());
        assert!(!Element::Ge.is_metal());
    }

    #[test]
    fn ordering_follows_atomic_number() {
        assert!(Element::H < Element::C);
        assert!(Element::C < Element::N);
        assert!(Element::Og < Element::D);
    }
}
