use super::config::ValidationConfig;
use super::diagnostics::{Diagnostics, Scope};
use crate::core::bonding::infer_bonds;
use crate::core::io::job::ModelDefinition;
use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::structure::Structure;
use crate::core::models::topology::{Bond, BondCollection, BondType};
use crate::core::topology::chirality::find_chiral_centers;
use crate::core::topology::rings::{find_rings, fingerprint_histogram};
use crate::core::utils::geometry::is_near_planar;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, instrument};

/// Atom-name equivalence classes of a model, e.g. the two oxygens of a carboxylate.
///
/// Parsed from strings such as `"O1:O2-N1:N2"`: groups are separated by `-`, names within
/// a group by `:`. Every name maps to the class key, the smallest name of its group.
/// Names are compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingEquivalence {
    classes: BTreeMap<String, String>,
}

impl NamingEquivalence {
    pub fn parse(text: &str) -> Self {
        let mut classes = BTreeMap::new();
        let upper = text.to_uppercase();
        for group in upper.split('-') {
            let names: Vec<&str> = group
                .split(':')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .sorted()
                .collect();
            let Some(&key) = names.first() else {
                continue;
            };
            for name in names {
                classes.insert(name.to_string(), key.to_string());
            }
        }
        Self { classes }
    }

    pub fn class_of(&self, name: &str) -> Option<&str> {
        self.classes.get(&name.to_uppercase()).map(String::as_str)
    }

    /// Whether both names belong to the same class.
    pub fn equivalent(&self, a: &str, b: &str) -> bool {
        matches!((self.class_of(a), self.class_of(b)), (Some(x), Some(y)) if x == y)
    }

    pub fn remove(&mut self, name: &str) {
        self.classes.remove(&name.to_uppercase());
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }
}

impl std::fmt::Display for NamingEquivalence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let groups = self
            .classes
            .iter()
            .into_group_map_by(|&(_, key)| key.as_str())
            .into_values()
            .map(|members| members.into_iter().map(|(name, _)| name.as_str()).sorted().join(":"))
            .sorted()
            .join("-");
        f.write_str(&groups)
    }
}

/// Model chiral atoms split by the categories the flag rules distinguish, as serials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChiralCategories {
    pub planar: BTreeSet<i32>,
    pub carbon: BTreeSet<i32>,
    pub metal: BTreeSet<i32>,
    pub non_single_bond: BTreeSet<i32>,
}

impl ChiralCategories {
    /// Whether the atom falls outside every category.
    pub fn is_other(&self, serial: i32) -> bool {
        !self.planar.contains(&serial)
            && !self.carbon.contains(&serial)
            && !self.metal.contains(&serial)
            && !self.non_single_bond.contains(&serial)
    }
}

/// The reference structure of one motif with everything precomputed for comparisons.
///
/// Apart from its [`Diagnostics`], a model is read-only once built and is shared by every
/// worker validating its candidates.
#[derive(Debug)]
pub struct MotifModel {
    pub id: String,
    /// Residue name of the motif.
    pub name: String,
    structure: Structure,
    stripped_hydrogens: HashSet<AtomId>,
    chiral_atoms: Vec<AtomId>,
    near_planar: HashSet<AtomId>,
    categories: ChiralCategories,
    ring_counts: BTreeMap<String, usize>,
    charge_equivalence: NamingEquivalence,
    charge_equivalence_ignore_bond_types: NamingEquivalence,
    diagnostics: Diagnostics,
}

impl MotifModel {
    pub fn builder(id: &str, name: &str, structure: Structure) -> MotifModelBuilder {
        MotifModelBuilder {
            id: id.to_string(),
            name: name.to_string(),
            structure,
            declared_bonds: Vec::new(),
            chiral_atoms: None,
            charge_equivalence: None,
            charge_equivalence_ignore_bond_types: None,
        }
    }

    pub fn from_definition(definition: &ModelDefinition, config: &ValidationConfig) -> Self {
        let mut builder = Self::builder(
            &definition.id,
            &definition.name,
            definition.input.structure.clone(),
        )
        .declared_bonds(definition.input.declared_bonds.clone());
        if let Some(chiral) = &definition.chiral_atoms {
            builder = builder.chiral_atoms(chiral.clone());
        }
        if let Some(text) = &definition.charge_equivalence {
            builder = builder.charge_equivalence(text);
        }
        if let Some(text) = &definition.charge_equivalence_ignore_bond_types {
            builder = builder.charge_equivalence_ignore_bond_types(text);
        }
        builder.build(config)
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// Whether `atom_id` belonged to the model before hydrogens were stripped.
    pub fn was_stripped(&self, atom_id: AtomId) -> bool {
        self.stripped_hydrogens.contains(&atom_id)
    }

    /// Chiral atoms, ordered by serial.
    pub fn chiral_atoms(&self) -> &[AtomId] {
        &self.chiral_atoms
    }

    pub fn is_near_planar(&self, atom_id: AtomId) -> bool {
        self.near_planar.contains(&atom_id)
    }

    pub fn chiral_categories(&self) -> &ChiralCategories {
        &self.categories
    }

    pub fn ring_counts(&self) -> &BTreeMap<String, usize> {
        &self.ring_counts
    }

    pub fn charge_equivalence(&self) -> &NamingEquivalence {
        &self.charge_equivalence
    }

    pub fn charge_equivalence_ignore_bond_types(&self) -> &NamingEquivalence {
        &self.charge_equivalence_ignore_bond_types
    }

    pub fn bond_type(&self, a: AtomId, b: AtomId) -> Option<BondType> {
        self.structure.bonds().bond_type(a, b)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Atom names of the model ordered by serial.
    pub fn atom_names(&self) -> Vec<String> {
        self.structure
            .atoms_sorted_by_serial()
            .into_iter()
            .filter_map(|id| self.structure.atom(id))
            .map(|atom| atom.name.clone())
            .collect()
    }
}

pub struct MotifModelBuilder {
    id: String,
    name: String,
    structure: Structure,
    declared_bonds: Vec<Bond>,
    chiral_atoms: Option<Vec<AtomId>>,
    charge_equivalence: Option<String>,
    charge_equivalence_ignore_bond_types: Option<String>,
}

impl MotifModelBuilder {
    /// Bonds read with the model. When empty, bonds are inferred from coordinates.
    pub fn declared_bonds(mut self, bonds: Vec<Bond>) -> Self {
        self.declared_bonds = bonds;
        self
    }
    /// Overrides chiral center detection.
    pub fn chiral_atoms(mut self, atoms: Vec<AtomId>) -> Self {
        self.chiral_atoms = Some(atoms);
        self
    }
    pub fn charge_equivalence(mut self, text: &str) -> Self {
        self.charge_equivalence = Some(text.to_string());
        self
    }
    pub fn charge_equivalence_ignore_bond_types(mut self, text: &str) -> Self {
        self.charge_equivalence_ignore_bond_types = Some(text.to_string());
        self
    }

    #[instrument(skip_all, fields(model = %self.id))]
    pub fn build(self, config: &ValidationConfig) -> MotifModel {
        let diagnostics = Diagnostics::new();
        let threshold = config.planarity_threshold_radians();
        let mut structure = self.structure;

        if self.declared_bonds.is_empty() {
            let inference = infer_bonds(&structure, &[], &config.bond_inference_options());
            diagnostics.add_warnings(Scope::Model, inference.warnings);
            structure.set_bonds(inference.bonds);
        } else {
            let bonds: BondCollection = self.declared_bonds.into_iter().collect();
            structure.set_bonds(bonds);
        }

        let mut chiral_atoms = match self.chiral_atoms {
            Some(atoms) => atoms
                .into_iter()
                .filter(|&id| structure.contains_atom(id))
                .collect(),
            None => find_chiral_centers(&structure, threshold),
        };

        let hydrogen_names: Vec<String> = structure
            .atoms_iter()
            .filter(|(_, atom)| atom.element.is_hydrogen())
            .map(|(_, atom)| atom.name.clone())
            .collect();
        let mut stripped_hydrogens = HashSet::new();
        if config.strip_hydrogens {
            stripped_hydrogens = structure
                .atoms_iter()
                .filter(|(_, atom)| atom.element.is_hydrogen())
                .map(|(id, _)| id)
                .collect();
            structure = structure.without_hydrogens();
            chiral_atoms.retain(|id| structure.contains_atom(*id));
        }
        chiral_atoms.sort_by_key(|&id| structure.atom(id).map(|a| a.serial));
        chiral_atoms.dedup();

        let near_planar: HashSet<AtomId> = chiral_atoms
            .iter()
            .copied()
            .filter(|&id| atom_is_near_planar(&structure, structure.bonds(), id, threshold))
            .collect();

        let mut categories = ChiralCategories::default();
        for &id in &chiral_atoms {
            let Some(atom) = structure.atom(id) else {
                continue;
            };
            if near_planar.contains(&id) {
                categories.planar.insert(atom.serial);
            }
            if atom.element == Element::C {
                categories.carbon.insert(atom.serial);
            }
            if atom.element.is_metal() {
                categories.metal.insert(atom.serial);
            }
            if structure
                .bonds()
                .neighbors(id)
                .any(|(_, t)| !matches!(t, BondType::Single | BondType::Metallic))
            {
                categories.non_single_bond.insert(atom.serial);
            }
        }

        let ring_counts = fingerprint_histogram(&find_rings(&structure, config.max_ring_length));

        let mut charge_equivalence = self
            .charge_equivalence
            .as_deref()
            .map(NamingEquivalence::parse)
            .unwrap_or_default();
        let mut charge_equivalence_ignore_bond_types = self
            .charge_equivalence_ignore_bond_types
            .as_deref()
            .map(NamingEquivalence::parse)
            .unwrap_or_default();
        for name in &hydrogen_names {
            charge_equivalence.remove(name);
            charge_equivalence_ignore_bond_types.remove(name);
        }

        debug!(
            atoms = structure.atom_count(),
            bonds = structure.bonds().len(),
            chiral = chiral_atoms.len(),
            near_planar = near_planar.len(),
            rings = ring_counts.values().sum::<usize>(),
            "Model prepared"
        );

        MotifModel {
            id: self.id,
            name: self.name,
            structure,
            stripped_hydrogens,
            chiral_atoms,
            near_planar,
            categories,
            ring_counts,
            charge_equivalence,
            charge_equivalence_ignore_bond_types,
            diagnostics,
        }
    }
}

/// Near-planarity of `atom_id` judged from its neighbors in `bonds`.
pub(crate) fn atom_is_near_planar(
    structure: &Structure,
    bonds: &BondCollection,
    atom_id: AtomId,
    threshold: f64,
) -> bool {
    let Some(center) = structure.atom(atom_id) else {
        return false;
    };
    let neighbors: Vec<_> = bonds
        .neighbors(atom_id)
        .filter_map(|(id, _)| structure.atom(id).map(|a| a.position))
        .collect();
    is_near_planar(&center.position, &neighbors, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::residue::Residue;
    use nalgebra::Point3;

    #[test]
    fn naming_equivalence_parses_groups_case_insensitively() {
        let eq = NamingEquivalence::parse("o2:o1-N1:N3:N2");
        assert_eq!(eq.class_of("O1"), Some("O1"));
        assert_eq!(eq.class_of("o2"), Some("O1"));
        assert_eq!(eq.class_of("N3"), Some("N1"));
        assert!(eq.equivalent("O2", "o1"));
        assert!(!eq.equivalent("O1", "N1"));
        assert!(!eq.equivalent("C1", "C1"));
        assert_eq!(eq.to_string(), "N1:N2:N3-O1:O2");
    }

    #[test]
    fn empty_equivalence_text_yields_no_classes() {
        assert!(NamingEquivalence::parse("").is_empty());
        assert_eq!(NamingEquivalence::parse("-:-").len(), 0);
    }

    /// Tetrahedral carbon with F, Cl, Br and H, plus a planar sp2 neighbor fragment.
    fn chiral_model() -> (Structure, Vec<AtomId>) {
        let mut structure = Structure::new("CFB");
        let residue = structure.add_residue(Residue::new("CFB", "A", 1, None));
        let specs = [
            (1, "C1", Element::C, [0.0, 0.0, 0.0]),
            (2, "F1", Element::F, [0.78, 0.78, 0.78]),
            (3, "CL1", Element::Cl, [-1.02, -1.02, 1.02]),
            (4, "BR1", Element::Br, [-1.12, 1.12, -1.12]),
            (5, "H1", Element::H, [0.63, -0.63, -0.63]),
        ];
        let ids = specs
            .iter()
            .map(|&(serial, name, element, [x, y, z])| {
                structure
                    .add_atom(Atom::new(serial, name, element, residue, Point3::new(x, y, z)))
                    .unwrap()
            })
            .collect();
        (structure, ids)
    }

    #[test]
    fn build_infers_bonds_detects_chirality_and_strips_hydrogens() {
        let (structure, ids) = chiral_model();
        let model = MotifModel::builder("CFB", "CFB", structure)
            .charge_equivalence("F1:CL1-H1:BR1")
            .build(&ValidationConfig::default());

        assert_eq!(model.structure().atom_count(), 4);
        assert!(model.was_stripped(ids[4]));
        assert_eq!(model.structure().bonds().len(), 3);
        assert_eq!(model.chiral_atoms(), &[ids[0]]);
        assert!(model.chiral_categories().carbon.contains(&1));
        assert!(model.ring_counts().is_empty());
        // H1 is a hydrogen name and leaves its class.
        assert_eq!(model.charge_equivalence().class_of("H1"), None);
        assert_eq!(model.charge_equivalence().class_of("BR1"), Some("BR1"));
        assert!(model.charge_equivalence().equivalent("F1", "CL1"));
    }

    #[test]
    fn declared_bonds_are_used_verbatim() {
        let (structure, ids) = chiral_model();
        let model = MotifModel::builder("CFB", "CFB", structure)
            .declared_bonds(vec![Bond::new(ids[0], ids[1], BondType::Double)])
            .chiral_atoms(vec![ids[0]])
            .build(&ValidationConfig::default());
        assert_eq!(model.structure().bonds().len(), 1);
        assert_eq!(model.bond_type(ids[1], ids[0]), Some(BondType::Double));
        assert_eq!(model.chiral_atoms(), &[ids[0]]);
        assert!(model.chiral_categories().non_single_bond.contains(&1));
        assert!(!model.is_near_planar(ids[0]));
    }

    #[test]
    fn planar_center_is_categorised() {
        let mut structure = Structure::new("PLN");
        let residue = structure.add_residue(Residue::new("PLN", "A", 1, None));
        let mut add = |serial, name: &str, element, [x, y, z]: [f64; 3]| {
            structure
                .add_atom(Atom::new(serial, name, element, residue, Point3::new(x, y, z)))
                .unwrap()
        };
        let n = add(1, "N1", Element::N, [0.0, 0.0, 0.0]);
        let c = add(2, "C1", Element::C, [1.47, 0.0, 0.0]);
        let o = add(3, "O1", Element::O, [-0.7, 1.2, 0.0]);
        let s = add(4, "S1", Element::S, [-0.9, -1.5, 0.0]);
        let model = MotifModel::builder("PLN", "PLN", structure)
            .declared_bonds(vec![
                Bond::new(n, c, BondType::Single),
                Bond::new(n, o, BondType::Single),
                Bond::new(n, s, BondType::Single),
            ])
            .chiral_atoms(vec![n])
            .build(&ValidationConfig::default());
        assert!(model.is_near_planar(n));
        assert!(model.chiral_categories().planar.contains(&1));
        assert!(!model.chiral_categories().is_other(1));
        assert!(model.chiral_categories().is_other(2));
    }
}
