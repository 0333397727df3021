use super::element::Element;
use super::ids::ResidueId;
use nalgebra::Point3;
use std::fmt;

/// An atom of a parsed structure.
///
/// Two positions are tracked. `position` is the working coordinate and is replaced when a
/// candidate is superimposed onto its model. `invariant_position` keeps the coordinate as it
/// was read, so distance checks such as bond-length sanity tests give the same answer before
/// and after alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Serial number from the source structure; unique within a structure.
    pub serial: i32,
    /// Atom name (e.g. "C1", "O5").
    pub name: String,
    pub element: Element,
    /// The residue this atom belongs to.
    pub residue_id: ResidueId,
    /// Working (possibly aligned) coordinates in Angstroms.
    pub position: Point3<f64>,
    /// Coordinates before alignment, in Angstroms.
    pub invariant_position: Point3<f64>,
}

impl Atom {
    /// Creates an atom whose invariant position equals its working position.
    pub fn new(
        serial: i32,
        name: &str,
        element: Element,
        residue_id: ResidueId,
        position: Point3<f64>,
    ) -> Self {
        Self {
            serial,
            name: name.to_string(),
            element,
            residue_id,
            position,
            invariant_position: position,
        }
    }

    pub fn with_invariant_position(mut self, position: Point3<f64>) -> Self {
        self.invariant_position = position;
        self
    }

    /// A compact `NAME ELEMENT SERIAL` label used in reports and warnings.
    pub fn label(&self) -> AtomLabel {
        AtomLabel {
            serial: self.serial,
            name: self.name.clone(),
            element: self.element,
        }
    }
}

/// Identity of an atom detached from its structure, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomLabel {
    pub serial: i32,
    pub name: String,
    pub element: Element,
}

impl fmt::Display for AtomLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.element, self.serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn residue_key() -> ResidueId {
        let mut map: SlotMap<ResidueId, ()> = SlotMap::with_key();
        map.insert(())
    }

    #[test]
    fn new_atom_copies_position_into_invariant_position() {
        let atom = Atom::new(7, "C1", Element::C, residue_key(), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.position, atom.invariant_position);
    }

    #[test]
    fn invariant_position_can_be_overridden() {
        let atom = Atom::new(7, "C1", Element::C, residue_key(), Point3::new(1.0, 2.0, 3.0))
            .with_invariant_position(Point3::origin());
        assert_eq!(atom.invariant_position, Point3::origin());
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn label_formats_name_element_and_serial() {
        let atom = Atom::new(12, "CL1", Element::Cl, residue_key(), Point3::origin());
        assert_eq!(atom.label().to_string(), "CL1 Cl 12");
    }
}
