use super::correspondence::Pairing;
use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::structure::Structure;
use crate::core::models::topology::{BondCollection, BondType};
use crate::engine::result::{WrongBondInfo, WrongBondKind};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct BondAnalysis {
    /// Bonds of the matched candidate that the model also has, typed as in the model.
    pub moved: BondCollection,
    /// Differences between the matched bonds and the moved bonds.
    pub discrepancies: Vec<String>,
    pub wrong_bonds: Vec<WrongBondInfo>,
}

/// The model warning filed for a candidate whose matched bonds disagree with the model.
pub fn discrepancy_message(model_name: &str, discrepancies: &[String]) -> String {
    format!(
        "{}: Model/Input Motif bond discrepancy: {}. Likely causes: 1) Degenerate motif (i.e. misplaced atoms), 2) Wrong CONECT record(s) in the parent PDB (if PDB format was used).",
        model_name.to_uppercase(),
        discrepancies.join(", ")
    )
}

fn moved_bonds(model: &Structure, matched: &Structure, pairing: &Pairing) -> BondCollection {
    let mut moved = BondCollection::new();
    for bond in matched.bonds().iter() {
        let (Some(a), Some(b)) = (pairing.model_of(bond.atom1_id), pairing.model_of(bond.atom2_id))
        else {
            continue;
        };
        if let Some(model_type) = model.bonds().bond_type(a, b) {
            moved.insert(bond.atom1_id, bond.atom2_id, model_type);
        }
    }
    moved
}

fn describe(matched: &Structure, a: AtomId, b: AtomId) -> (String, f64) {
    match (matched.atom(a), matched.atom(b)) {
        (Some(x), Some(y)) => (
            format!("{}-{}", x.label(), y.label()),
            (x.invariant_position - y.invariant_position).norm(),
        ),
        _ => (String::new(), 0.0),
    }
}

fn discrepancies(matched: &Structure, moved: &BondCollection) -> Vec<String> {
    let bonds = matched.bonds();
    let mut warnings = Vec::new();
    if bonds.len() != moved.len() {
        warnings.push("different bond count".to_string());
    }
    for bond in moved.iter() {
        if !bonds.contains(bond.atom1_id, bond.atom2_id) {
            let (atoms, length) = describe(matched, bond.atom1_id, bond.atom2_id);
            warnings.push(format!("missing bond {atoms} ({length:.3} ang)"));
        }
    }
    for bond in bonds.iter() {
        if !moved.contains(bond.atom1_id, bond.atom2_id) {
            let (atoms, length) = describe(matched, bond.atom1_id, bond.atom2_id);
            warnings.push(format!("extra bond {atoms} ({length:.3} ang)"));
        }
    }
    warnings
}

/// Neighbor element and bond type of every bond in `bonds` around `atom_id` that `keep`
/// accepts, sorted so two signatures compare as multisets.
fn signature(
    structure: &Structure,
    bonds: &BondCollection,
    atom_id: AtomId,
    keep: impl Fn(AtomId) -> bool,
) -> Vec<(Element, BondType)> {
    let mut signature: Vec<_> = bonds
        .neighbors(atom_id)
        .filter(|&(neighbor, _)| keep(neighbor))
        .filter_map(|(neighbor, bond_type)| {
            structure.atom(neighbor).map(|atom| (atom.element, bond_type))
        })
        .collect();
    signature.sort_unstable();
    signature
}

fn serial(structure: &Structure, atom_id: AtomId) -> i32 {
    structure.atom(atom_id).map_or(0, |atom| atom.serial)
}

/// Compares the bonds of the matched candidate with the model's.
///
/// A paired candidate atom whose bonds to other paired atoms carry the same neighbor
/// elements and bond types as its model atom's is trusted, and model bonds touching it are
/// not inspected. Every other model bond between paired atoms must exist in the candidate
/// with the model's type; candidate bonds absent from the model are extra.
pub fn analyze(model: &Structure, matched: &Structure, pairing: &Pairing) -> BondAnalysis {
    let moved = moved_bonds(model, matched, pairing);
    let discrepancies = discrepancies(matched, &moved);

    let trusted: HashSet<AtomId> = pairing
        .iter()
        .filter(|&(m, c)| {
            signature(model, model.bonds(), m, |n| pairing.contains_model(n))
                == signature(matched, matched.bonds(), c, |_| true)
        })
        .map(|(_, c)| c)
        .collect();

    let mut wrong_bonds = Vec::new();
    for bond in model.bonds().iter() {
        let (Some(x), Some(y)) = (
            pairing.candidate_of(bond.atom1_id),
            pairing.candidate_of(bond.atom2_id),
        ) else {
            continue;
        };
        if trusted.contains(&x) || trusted.contains(&y) {
            continue;
        }
        let kind = match matched.bonds().bond_type(x, y) {
            None => WrongBondKind::Missing,
            Some(found) if found != bond.bond_type => WrongBondKind::Type(found),
            Some(_) => continue,
        };
        wrong_bonds.push(WrongBondInfo::new(
            serial(model, bond.atom1_id),
            serial(model, bond.atom2_id),
            kind,
            describe(matched, x, y).0,
        ));
    }

    for bond in matched.bonds().iter() {
        let (Some(a), Some(b)) = (pairing.model_of(bond.atom1_id), pairing.model_of(bond.atom2_id))
        else {
            continue;
        };
        if !model.bonds().contains(a, b) {
            wrong_bonds.push(WrongBondInfo::new(
                serial(model, a),
                serial(model, b),
                WrongBondKind::Extra,
                describe(matched, bond.atom1_id, bond.atom2_id).0,
            ));
        }
    }

    BondAnalysis {
        moved,
        discrepancies,
        wrong_bonds,
    }
}
