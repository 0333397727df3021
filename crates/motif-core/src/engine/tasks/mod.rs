//! Analysis steps applied to one candidate once its model is known.
//!
//! Each submodule is a pure function of the model, the candidate and the current pairing;
//! none of them touch shared state, so candidates can be analysed on any thread. The
//! [`crate::workflows::validate`] workflow runs them in order and assembles the result.

pub mod bonds;
pub mod chirality;
pub mod correspondence;
pub mod naming;
pub mod rings;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::core::models::atom::Atom;
    use crate::core::models::element::Element;
    use crate::core::models::ids::{AtomId, ResidueId};
    use crate::core::models::residue::Residue;
    use crate::core::models::structure::Structure;
    use crate::core::models::topology::BondType;
    use nalgebra::Point3;

    /// Small structure builder for task tests. Atoms go into the current residue.
    pub(crate) struct Fixture {
        structure: Structure,
        residue: ResidueId,
    }

    impl Fixture {
        pub(crate) fn new(id: &str, residue: &str) -> Self {
            let mut structure = Structure::new(id);
            let residue = structure.add_residue(Residue::new(residue, "A", 1, None));
            Self { structure, residue }
        }

        pub(crate) fn residue(mut self, name: &str, number: isize) -> Self {
            self.residue = self
                .structure
                .add_residue(Residue::new(name, "A", number, None));
            self
        }

        pub(crate) fn atom(mut self, serial: i32, name: &str, element: Element, p: [f64; 3]) -> Self {
            self.structure
                .add_atom(Atom::new(
                    serial,
                    name,
                    element,
                    self.residue,
                    Point3::new(p[0], p[1], p[2]),
                ))
                .expect("fixture serials are unique");
            self
        }

        pub(crate) fn bond(mut self, a: i32, b: i32, bond_type: BondType) -> Self {
            let a = id(&self.structure, a);
            let b = id(&self.structure, b);
            self.structure.bonds_mut().insert(a, b, bond_type);
            self
        }

        pub(crate) fn build(self) -> Structure {
            self.structure
        }
    }

    pub(crate) fn id(structure: &Structure, serial: i32) -> AtomId {
        structure
            .atom_by_serial(serial)
            .expect("fixture serial exists")
    }
}
