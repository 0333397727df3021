use std::fmt;

/// Chain, sequence number and insertion code; ordered chain first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueIdentifier {
    pub chain: String,
    pub number: isize,
    pub insertion_code: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub name: String,
    pub identifier: ResidueIdentifier,
}

impl Residue {
    pub fn new(name: &str, chain: &str, number: isize, insertion_code: Option<char>) -> Self {
        Self {
            name: name.to_string(),
            identifier: ResidueIdentifier {
                chain: chain.to_string(),
                number,
                insertion_code,
            },
        }
    }
}

impl fmt::Display for Residue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.identifier.number)?;
        if let Some(code) = self.identifier.insertion_code {
            write!(f, "{}", code)?;
        }
        if !self.identifier.chain.is_empty() {
            write!(f, " {}", self.identifier.chain)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_insertion_code_and_chain() {
        assert_eq!(Residue::new("NAG", "A", 401, None).to_string(), "NAG 401 A");
        assert_eq!(Residue::new("NAG", "B", 12, Some('A')).to_string(), "NAG 12A B");
        assert_eq!(Residue::new("HOH", "", 5, None).to_string(), "HOH 5");
    }

    #[test]
    fn identifiers_order_by_chain_then_number_then_insertion_code() {
        let a1 = Residue::new("X", "A", 10, None).identifier;
        let a2 = Residue::new("X", "A", 2, None).identifier;
        let b1 = Residue::new("X", "B", 1, None).identifier;
        let a2i = Residue::new("X", "A", 2, Some('A')).identifier;
        assert!(a2 < a1);
        assert!(a1 < b1);
        assert!(a2 < a2i);
    }
}
