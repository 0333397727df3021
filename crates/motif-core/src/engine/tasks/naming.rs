use super::correspondence::Pairing;
use crate::core::models::atom::AtomLabel;
use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::structure::Structure;
use crate::engine::model::MotifModel;
use crate::engine::result::{NameMismatchKind, NamingAnalysis};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Residue assignment and naming checks of one candidate. Maps are keyed by model serial.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamingReport {
    pub main_residue: Option<ResidueId>,
    /// Residues holding paired candidate atoms, ordered by chain and number.
    pub residues: Vec<String>,
    /// Paired candidate atoms outside the main residue, with their residue.
    pub foreign: BTreeMap<i32, String>,
    pub name_mismatches: BTreeMap<i32, AtomLabel>,
    pub name_mismatch_flags: BTreeMap<i32, Vec<NameMismatchKind>>,
    pub analysis: NamingAnalysis,
}

/// The residue most paired candidate atoms belong to, preferring residues named like the
/// model. Ties go to the residue that sorts first.
fn main_residue(model_name: &str, candidate: &Structure, pairing: &Pairing) -> Option<ResidueId> {
    let mut counts: HashMap<ResidueId, usize> = HashMap::new();
    for (_, c) in pairing.iter() {
        if let Some(atom) = candidate.atom(c) {
            *counts.entry(atom.residue_id).or_insert(0) += 1;
        }
    }
    let groups: Vec<_> = counts
        .into_iter()
        .filter_map(|(id, count)| candidate.residue(id).map(|residue| (id, residue, count)))
        .collect();
    let named: Vec<_> = groups
        .iter()
        .filter(|(_, residue, _)| residue.name.eq_ignore_ascii_case(model_name))
        .collect();
    let pool = if named.is_empty() {
        groups.iter().collect()
    } else {
        named
    };
    pool.into_iter()
        .max_by(|(_, ra, ca), (_, rb, cb)| ca.cmp(cb).then_with(|| rb.identifier.cmp(&ra.identifier)))
        .map(|(id, _, _)| *id)
}

/// Assigns the main residue and checks candidate atom naming against the model.
///
/// `substituted` holds candidate atoms paired across elements; they are never name
/// mismatches. A paired candidate atom counts as a non-boundary atom when it lies outside
/// the main residue and is bonded to more than one other paired atom.
pub fn analyze(
    model: &MotifModel,
    candidate: &Structure,
    pairing: &Pairing,
    substituted: &HashSet<AtomId>,
) -> NamingReport {
    let main = main_residue(&model.name, candidate, pairing);
    let model_structure = model.structure();
    let in_main = |c: AtomId| {
        main.is_some() && candidate.atom(c).map(|atom| atom.residue_id) == main
    };

    let residues = pairing
        .iter()
        .filter_map(|(_, c)| candidate.residue_of(c))
        .unique_by(|residue| residue.identifier.clone())
        .sorted_by(|a, b| a.identifier.cmp(&b.identifier))
        .map(ToString::to_string)
        .collect();

    let mut foreign = BTreeMap::new();
    let mut name_mismatches = BTreeMap::new();
    let mut name_mismatch_flags = BTreeMap::new();
    let mut analysis = NamingAnalysis::default();

    let charge = model.charge_equivalence();
    let charge_ignoring_bonds = model.charge_equivalence_ignore_bond_types();

    for (m, c) in pairing.iter() {
        let (Some(model_atom), Some(candidate_atom)) = (model_structure.atom(m), candidate.atom(c))
        else {
            continue;
        };
        if !in_main(c) {
            let residue = candidate
                .residue_of(c)
                .map(ToString::to_string)
                .unwrap_or_default();
            foreign.insert(
                model_atom.serial,
                format!("{}, {}", candidate_atom.label(), residue),
            );
            continue;
        }
        if substituted.contains(&c) || model_atom.name.eq_ignore_ascii_case(&candidate_atom.name) {
            continue;
        }

        let serial = candidate_atom.serial;
        name_mismatches.insert(model_atom.serial, candidate_atom.label());
        analysis.mismatched.insert(serial);

        let mut kinds = Vec::with_capacity(2);
        if charge.equivalent(&model_atom.name, &candidate_atom.name) {
            analysis.charge_equivalent.insert(serial);
            kinds.push(NameMismatchKind::ChargeEquiv);
        }
        if charge_ignoring_bonds.equivalent(&model_atom.name, &candidate_atom.name) {
            analysis.charge_equivalent_ignore_bond_types.insert(serial);
            kinds.push(NameMismatchKind::ChargeEquivIgnoreBonds);
        }
        if !analysis.charge_equivalent.contains(&serial) {
            analysis.not_charge_equivalent.insert(serial);
            kinds.push(NameMismatchKind::NonChargeEquiv);
        }
        if !analysis.charge_equivalent_ignore_bond_types.contains(&serial) {
            analysis.not_charge_equivalent_ignore_bond_types.insert(serial);
            kinds.push(NameMismatchKind::NonChargeEquivIgnoreBonds);
        }
        name_mismatch_flags.insert(model_atom.serial, kinds);
    }

    let main_atoms: Vec<AtomId> = candidate
        .atoms_sorted_by_serial()
        .into_iter()
        .filter(|&c| pairing.contains_candidate(c) && in_main(c))
        .collect();

    analysis.duplicate_names = main_atoms
        .iter()
        .filter_map(|&c| candidate.atom(c))
        .into_group_map_by(|atom| atom.name.clone())
        .into_iter()
        .filter(|(_, atoms)| atoms.len() > 1)
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, atoms)| atoms.into_iter().map(|atom| atom.label()).collect())
        .collect();

    let main_names: BTreeSet<&str> = main_atoms
        .iter()
        .filter_map(|&c| candidate.atom(c))
        .map(|atom| atom.name.as_str())
        .collect();

    let main_set: HashSet<AtomId> = main_atoms.iter().copied().collect();
    let name_pair = |a: &str, b: &str| -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    };
    let candidate_named_bonds: HashSet<(String, String)> = candidate
        .bonds()
        .induced(&main_set)
        .iter()
        .filter_map(|bond| {
            let a = candidate.atom(bond.atom1_id)?;
            let b = candidate.atom(bond.atom2_id)?;
            Some(name_pair(&a.name, &b.name))
        })
        .collect();
    analysis.non_isomorphic = model_structure.bonds().iter().any(|bond| {
        let (Some(a), Some(b)) = (
            model_structure.atom(bond.atom1_id),
            model_structure.atom(bond.atom2_id),
        ) else {
            return false;
        };
        main_names.contains(a.name.as_str())
            && main_names.contains(b.name.as_str())
            && !candidate_named_bonds.contains(&name_pair(&a.name, &b.name))
    });

    analysis.unmatched_model_names = model
        .atom_names()
        .into_iter()
        .filter(|name| !main_names.contains(name.as_str()))
        .sorted()
        .dedup()
        .collect();

    analysis.non_boundary_atoms = candidate
        .atoms_sorted_by_serial()
        .into_iter()
        .filter(|&c| pairing.contains_candidate(c) && !in_main(c))
        .filter(|&c| {
            candidate
                .bonds()
                .neighbors(c)
                .filter(|&(n, _)| pairing.contains_candidate(n))
                .count()
                > 1
        })
        .filter_map(|c| candidate.atom(c).map(|atom| atom.label()))
        .collect();

    NamingReport {
        main_residue: main,
        residues,
        foreign,
        name_mismatches,
        name_mismatch_flags,
        analysis,
    }
}
