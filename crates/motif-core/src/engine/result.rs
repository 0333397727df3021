use super::flags;
use super::model::ChiralCategories;
use crate::core::io::report::ResultRow;
use crate::core::models::atom::AtomLabel;
use crate::core::models::topology::BondType;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationState {
    Validated,
    /// Disconnected candidate or nothing matched.
    Degenerate,
    NotAnalyzed,
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validated => "Validated",
            Self::Degenerate => "Degenerate",
            Self::NotAnalyzed => "NotAnalyzed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrongBondKind {
    /// The model bond has no counterpart between the paired candidate atoms.
    Missing,
    /// The candidate bonds two atoms the model leaves unbonded.
    Extra,
    /// Both bond, with the given candidate type differing from the model's.
    Type(BondType),
}

impl fmt::Display for WrongBondKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("Missing"),
            Self::Extra => f.write_str("Extra"),
            Self::Type(t) => write!(f, "{t}"),
        }
    }
}

/// One bond disagreement, located by the serials of the model atoms involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrongBondInfo {
    pub model_from: i32,
    pub model_to: i32,
    pub kind: WrongBondKind,
    /// `A-B` with both candidate atoms written as `NAME ELEMENT SERIAL`.
    pub candidate_atoms: String,
}

impl WrongBondInfo {
    pub fn new(a: i32, b: i32, kind: WrongBondKind, candidate_atoms: String) -> Self {
        Self {
            model_from: a.min(b),
            model_to: a.max(b),
            kind,
            candidate_atoms,
        }
    }
}

impl fmt::Display for WrongBondInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} {} ({})",
            self.model_from, self.model_to, self.kind, self.candidate_atoms
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NameMismatchKind {
    ChargeEquiv,
    ChargeEquivIgnoreBonds,
    NonChargeEquiv,
    NonChargeEquivIgnoreBonds,
}

impl fmt::Display for NameMismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ChargeEquiv => "ChargeEquiv",
            Self::ChargeEquivIgnoreBonds => "ChargeEquivIgnoreBonds",
            Self::NonChargeEquiv => "NonChargeEquiv",
            Self::NonChargeEquivIgnoreBonds => "NonChargeEquivIgnoreBonds",
        };
        f.write_str(s)
    }
}

/// Naming checks of the main residue. Atom sets hold candidate serials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamingAnalysis {
    pub duplicate_names: Vec<Vec<AtomLabel>>,
    pub non_isomorphic: bool,
    pub non_boundary_atoms: Vec<AtomLabel>,
    pub unmatched_model_names: Vec<String>,
    pub mismatched: BTreeSet<i32>,
    pub charge_equivalent: BTreeSet<i32>,
    pub charge_equivalent_ignore_bond_types: BTreeSet<i32>,
    pub not_charge_equivalent: BTreeSet<i32>,
    pub not_charge_equivalent_ignore_bond_types: BTreeSet<i32>,
}

/// Outcome of validating one candidate. Maps keyed by `i32` use model atom serials.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub model: String,
    pub id: String,
    pub state: ValidationState,
    pub analyzed: bool,

    pub main_residue: Option<String>,
    pub residues: Vec<String>,

    pub missing_atoms: Vec<i32>,
    /// Fingerprint and model-minus-candidate count, for every fingerprint that differs.
    pub missing_rings: Vec<(String, i64)>,
    pub missing_ring_count: usize,

    pub chirality_mismatches: BTreeMap<i32, AtomLabel>,
    pub substitutions: BTreeMap<i32, AtomLabel>,
    /// Candidate atom with its residue.
    pub foreign_atoms: BTreeMap<i32, String>,
    pub name_mismatches: BTreeMap<i32, AtomLabel>,
    pub name_mismatch_flags: BTreeMap<i32, Vec<NameMismatchKind>>,
    pub wrong_bonds: Vec<WrongBondInfo>,
    pub has_bond_discrepancy: bool,
    pub unmatched_atom_count: usize,
    pub naming: NamingAnalysis,

    /// Final correspondence, model serial to candidate atom.
    pub pairing: BTreeMap<i32, AtomLabel>,
    pub alternate_locations: usize,
    pub rmsd: f64,
    /// Names of every flag rule that holds, in rule order.
    pub flags: Vec<&'static str>,
}

impl ValidationResult {
    /// A result without analysis data, for degenerate or failed candidates.
    pub fn unvalidated(model: &str, id: &str, state: ValidationState, residues: Vec<String>) -> Self {
        Self {
            model: model.to_string(),
            id: id.to_string(),
            state,
            analyzed: state != ValidationState::NotAnalyzed,
            main_residue: None,
            residues,
            missing_atoms: Vec::new(),
            missing_rings: Vec::new(),
            missing_ring_count: 0,
            chirality_mismatches: BTreeMap::new(),
            substitutions: BTreeMap::new(),
            foreign_atoms: BTreeMap::new(),
            name_mismatches: BTreeMap::new(),
            name_mismatch_flags: BTreeMap::new(),
            wrong_bonds: Vec::new(),
            has_bond_discrepancy: false,
            unmatched_atom_count: 0,
            naming: NamingAnalysis::default(),
            pairing: BTreeMap::new(),
            alternate_locations: 0,
            rmsd: 0.0,
            flags: Vec::new(),
        }
    }

    pub fn missing_atom_count(&self) -> usize {
        self.missing_atoms.len()
    }
    pub fn chirality_mismatch_count(&self) -> usize {
        self.chirality_mismatches.len()
    }
    pub fn substitution_count(&self) -> usize {
        self.substitutions.len()
    }
    pub fn foreign_atom_count(&self) -> usize {
        self.foreign_atoms.len()
    }
    pub fn name_mismatch_count(&self) -> usize {
        self.name_mismatches.len()
    }
    pub fn wrong_bond_count(&self) -> usize {
        self.wrong_bonds.len()
    }

    /// `key*count` entries joined by `"; "`.
    pub fn missing_rings_text(&self) -> String {
        self.missing_rings
            .iter()
            .map(|(key, count)| format!("{key}*{count}"))
            .join("; ")
    }

    /// Evaluates the flag rules. Must run after every other field is final.
    pub fn finalize(&mut self, chirality: &ChiralCategories) {
        self.flags = flags::evaluate(self, chirality);
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|flag| *flag == name)
    }

    pub fn to_row(&self) -> ResultRow {
        ResultRow {
            model: self.model.clone(),
            id: self.id.clone(),
            state: self.state.to_string(),
            main_residue: self.main_residue.clone().unwrap_or_default(),
            rmsd: self.rmsd,
            missing_atom_count: self.missing_atom_count(),
            missing_ring_count: self.missing_ring_count,
            missing_rings: self.missing_rings_text(),
            chirality_mismatch_count: self.chirality_mismatch_count(),
            chirality_mismatches: join_labels(&self.chirality_mismatches),
            substitution_count: self.substitution_count(),
            substitutions: join_labels(&self.substitutions),
            foreign_atom_count: self.foreign_atom_count(),
            foreign_atoms: self
                .foreign_atoms
                .iter()
                .map(|(serial, text)| format!("{serial}={text}"))
                .join("; "),
            name_mismatch_count: self.name_mismatch_count(),
            name_mismatches: self
                .name_mismatches
                .iter()
                .map(|(serial, label)| {
                    let kinds = self
                        .name_mismatch_flags
                        .get(serial)
                        .map(|kinds| kinds.iter().join(","))
                        .unwrap_or_default();
                    format!("{serial}={label} [{kinds}]")
                })
                .join("; "),
            wrong_bond_count: self.wrong_bond_count(),
            wrong_bonds: self.wrong_bonds.iter().join("; "),
            has_bond_discrepancy: self.has_bond_discrepancy,
            unmatched_atom_count: self.unmatched_atom_count,
            alternate_locations: self.alternate_locations,
            duplicate_names: self
                .naming
                .duplicate_names
                .iter()
                .map(|group| group.iter().join(", "))
                .join("; "),
            non_isomorphic_names: if self.naming.non_isomorphic {
                "Yes".to_string()
            } else {
                String::new()
            },
            non_boundary_atoms: self.naming.non_boundary_atoms.iter().join("; "),
            unmatched_model_names: self.naming.unmatched_model_names.join("; "),
            flags: self.flags.join("; "),
        }
    }
}

fn join_labels(map: &BTreeMap<i32, AtomLabel>) -> String {
    map.iter()
        .map(|(serial, label)| format!("{serial}={label}"))
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;

    fn label(serial: i32, name: &str, element: Element) -> AtomLabel {
        AtomLabel {
            serial,
            name: name.to_string(),
            element,
        }
    }

    #[test]
    fn wrong_bond_orders_model_serials() {
        let info = WrongBondInfo::new(7, 3, WrongBondKind::Type(BondType::Single), "x".into());
        assert_eq!((info.model_from, info.model_to), (3, 7));
        assert_eq!(info.to_string(), "3-7 Single (x)");
    }

    #[test]
    fn unvalidated_results_carry_state() {
        let degenerate = ValidationResult::unvalidated("NAG", "c1", ValidationState::Degenerate, vec![]);
        assert!(degenerate.analyzed);
        let failed = ValidationResult::unvalidated("NAG", "c2", ValidationState::NotAnalyzed, vec![]);
        assert!(!failed.analyzed);
    }

    #[test]
    fn row_flattens_lists() {
        let mut result = ValidationResult::unvalidated(
            "NAG",
            "1abc_NAG_401_A",
            ValidationState::Validated,
            vec!["NAG 401 A".into()],
        );
        result.main_residue = Some("NAG 401 A".into());
        result.missing_rings = vec![("C5O".into(), 1), ("C4N".into(), -1)];
        result.missing_ring_count = 1;
        result
            .substitutions
            .insert(7, label(7, "O7", Element::O));
        result
            .name_mismatches
            .insert(3, label(3, "C3X", Element::C));
        result
            .name_mismatch_flags
            .insert(3, vec![NameMismatchKind::NonChargeEquiv, NameMismatchKind::NonChargeEquivIgnoreBonds]);
        result.wrong_bonds.push(WrongBondInfo::new(
            1,
            2,
            WrongBondKind::Missing,
            "C1 C 1-C2 C 2".into(),
        ));

        let row = result.to_row();
        assert_eq!(row.state, "Validated");
        assert_eq!(row.missing_rings, "C5O*1; C4N*-1");
        assert_eq!(row.substitution_count, 1);
        assert_eq!(row.substitutions, "7=O7 O 7");
        assert_eq!(
            row.name_mismatches,
            "3=C3X C 3 [NonChargeEquiv,NonChargeEquivIgnoreBonds]"
        );
        assert_eq!(row.wrong_bonds, "1-2 Missing (C1 C 1-C2 C 2)");
        assert_eq!(row.main_residue, "NAG 401 A");
    }
}
