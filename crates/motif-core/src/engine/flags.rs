//! Named predicates tagging each validation result.
//!
//! The table is closed and sorted by name; a result carries the name of every rule that
//! holds for it, in table order.

use super::model::ChiralCategories;
use super::result::{ValidationResult, ValidationState};

/// What a rule looks at: the result plus the chirality categories of its model.
pub struct FlagInput<'a> {
    pub result: &'a ValidationResult,
    pub chirality: &'a ChiralCategories,
}

pub struct FlagRule {
    pub name: &'static str,
    pub predicate: fn(&FlagInput) -> bool,
}

const ZERO_RMSD: f64 = 1e-7;

fn has_all(r: &ValidationResult) -> bool {
    r.state == ValidationState::Validated && r.missing_atom_count() == 0 && r.missing_ring_count == 0
}

/// Complete and with every bond right, so chirality is meaningful.
fn has_all_for_chirality(r: &ValidationResult) -> bool {
    has_all(r) && r.wrong_bond_count() == 0
}

fn bad_chirality_where(input: &FlagInput, in_category: impl Fn(i32) -> bool) -> bool {
    let r = input.result;
    r.chirality_mismatch_count() > 0
        && has_all_for_chirality(r)
        && r.chirality_mismatches.keys().any(|&serial| in_category(serial))
}

pub static FLAG_RULES: [FlagRule; 28] = [
    FlagRule {
        name: "Analyzed",
        predicate: |i| i.result.analyzed,
    },
    FlagRule {
        name: "HasAll",
        predicate: |i| has_all(i.result),
    },
    FlagRule {
        name: "HasAll_BadChirality",
        predicate: |i| i.result.chirality_mismatch_count() > 0 && has_all_for_chirality(i.result),
    },
    FlagRule {
        name: "HasAll_BadChirality_Carbon",
        predicate: |i| bad_chirality_where(i, |s| i.chirality.carbon.contains(&s)),
    },
    FlagRule {
        name: "HasAll_BadChirality_Metal",
        predicate: |i| bad_chirality_where(i, |s| i.chirality.metal.contains(&s)),
    },
    FlagRule {
        name: "HasAll_BadChirality_NonSingleBond",
        predicate: |i| bad_chirality_where(i, |s| i.chirality.non_single_bond.contains(&s)),
    },
    FlagRule {
        name: "HasAll_BadChirality_Other",
        predicate: |i| bad_chirality_where(i, |s| i.chirality.is_other(s)),
    },
    FlagRule {
        name: "HasAll_BadChirality_Planar",
        predicate: |i| bad_chirality_where(i, |s| i.chirality.planar.contains(&s)),
    },
    FlagRule {
        name: "HasAll_Foreign",
        predicate: |i| i.result.foreign_atom_count() > 0 && has_all(i.result),
    },
    FlagRule {
        name: "HasAll_GoodChirality",
        predicate: |i| i.result.chirality_mismatch_count() == 0 && has_all_for_chirality(i.result),
    },
    FlagRule {
        name: "HasAll_GoodChirality_IgnorePlanarAndNonSingleBondErrors",
        predicate: |i| {
            has_all_for_chirality(i.result)
                && i.result.chirality_mismatches.keys().all(|s| {
                    i.chirality.planar.contains(s) || i.chirality.non_single_bond.contains(s)
                })
        },
    },
    FlagRule {
        name: "HasAll_NameMismatch",
        predicate: |i| !i.result.naming.mismatched.is_empty() && has_all(i.result),
    },
    FlagRule {
        name: "HasAll_NameMismatch_ChargeEquiv",
        predicate: |i| !i.result.naming.charge_equivalent.is_empty() && has_all(i.result),
    },
    FlagRule {
        name: "HasAll_NameMismatch_ChargeEquivIgnoreBondType",
        predicate: |i| {
            !i.result.naming.charge_equivalent_ignore_bond_types.is_empty() && has_all(i.result)
        },
    },
    FlagRule {
        name: "HasAll_NameMismatch_NonChargeEquiv",
        predicate: |i| !i.result.naming.not_charge_equivalent.is_empty() && has_all(i.result),
    },
    FlagRule {
        name: "HasAll_NameMismatch_NonChargeEquivIgnoreBondType",
        predicate: |i| {
            !i.result.naming.not_charge_equivalent_ignore_bond_types.is_empty() && has_all(i.result)
        },
    },
    FlagRule {
        name: "HasAll_Substitutions",
        predicate: |i| i.result.substitution_count() > 0 && has_all(i.result),
    },
    FlagRule {
        name: "HasAll_WrongBonds",
        predicate: |i| i.result.wrong_bond_count() > 0 && has_all(i.result),
    },
    FlagRule {
        name: "HasAll_ZeroRmsd",
        predicate: |i| i.result.rmsd < ZERO_RMSD && has_all(i.result),
    },
    FlagRule {
        name: "Has_AlternateLocation",
        predicate: |i| i.result.alternate_locations > 0,
    },
    FlagRule {
        name: "Has_NamingIssue_Duplicates",
        predicate: |i| !i.result.naming.duplicate_names.is_empty(),
    },
    FlagRule {
        name: "Has_NamingIssue_NonBoundarySubstitutionOrForeign",
        predicate: |i| !i.result.naming.non_boundary_atoms.is_empty(),
    },
    FlagRule {
        name: "Has_NamingIssue_NonIsomorphic",
        predicate: |i| i.result.naming.non_isomorphic,
    },
    FlagRule {
        name: "Missing",
        predicate: |i| {
            let r = i.result;
            r.missing_atom_count() > 0 || r.missing_ring_count > 0 || r.state != ValidationState::Validated
        },
    },
    FlagRule {
        name: "Missing_Atoms",
        predicate: |i| i.result.missing_atom_count() > 0 && i.result.missing_ring_count == 0,
    },
    FlagRule {
        name: "Missing_Degenerate",
        predicate: |i| i.result.state == ValidationState::Degenerate,
    },
    FlagRule {
        name: "Missing_Rings",
        predicate: |i| i.result.missing_ring_count > 0,
    },
    FlagRule {
        name: "NotAnalyzed",
        predicate: |i| !i.result.analyzed,
    },
];

/// Every flag name, in table order.
pub fn flag_names() -> impl Iterator<Item = &'static str> {
    FLAG_RULES.iter().map(|rule| rule.name)
}

pub fn evaluate(result: &ValidationResult, chirality: &ChiralCategories) -> Vec<&'static str> {
    let input = FlagInput { result, chirality };
    FLAG_RULES
        .iter()
        .filter(|rule| (rule.predicate)(&input))
        .map(|rule| rule.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::AtomLabel;
    use crate::core::models::element::Element;
    use crate::engine::result::WrongBondInfo;
    use crate::engine::result::WrongBondKind;

    fn validated() -> ValidationResult {
        let mut r = ValidationResult::unvalidated("NAG", "c1", ValidationState::Validated, vec![]);
        r.rmsd = 0.25;
        r
    }

    fn label(serial: i32) -> AtomLabel {
        AtomLabel {
            serial,
            name: format!("C{serial}"),
            element: Element::C,
        }
    }

    #[test]
    fn table_is_sorted_ordinally_and_unique() {
        let names: Vec<_> = flag_names().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn clean_result_has_all_and_good_chirality() {
        let flags = evaluate(&validated(), &ChiralCategories::default());
        assert_eq!(
            flags,
            vec![
                "Analyzed",
                "HasAll",
                "HasAll_GoodChirality",
                "HasAll_GoodChirality_IgnorePlanarAndNonSingleBondErrors"
            ]
        );
    }

    #[test]
    fn zero_rmsd_is_flagged() {
        let mut r = validated();
        r.rmsd = 0.0;
        assert!(evaluate(&r, &ChiralCategories::default()).contains(&"HasAll_ZeroRmsd"));
    }

    #[test]
    fn degenerate_is_missing() {
        let r = ValidationResult::unvalidated("NAG", "c1", ValidationState::Degenerate, vec![]);
        let flags = evaluate(&r, &ChiralCategories::default());
        assert_eq!(flags, vec!["Analyzed", "Missing", "Missing_Degenerate"]);
    }

    #[test]
    fn not_analyzed_results_only_carry_missing_flags() {
        let r = ValidationResult::unvalidated("NAG", "c1", ValidationState::NotAnalyzed, vec![]);
        assert_eq!(
            evaluate(&r, &ChiralCategories::default()),
            vec!["Missing", "NotAnalyzed"]
        );
    }

    #[test]
    fn missing_rings_suppress_missing_atoms_flag() {
        let mut r = validated();
        r.missing_atoms = vec![6];
        let flags = evaluate(&r, &ChiralCategories::default());
        assert!(flags.contains(&"Missing_Atoms"));
        assert!(!flags.contains(&"HasAll"));

        r.missing_ring_count = 1;
        let flags = evaluate(&r, &ChiralCategories::default());
        assert!(flags.contains(&"Missing_Rings"));
        assert!(!flags.contains(&"Missing_Atoms"));
    }

    #[test]
    fn bad_chirality_is_categorised() {
        let mut r = validated();
        r.chirality_mismatches.insert(2, label(2));
        r.chirality_mismatches.insert(5, label(5));
        let categories = ChiralCategories {
            planar: [5].into(),
            carbon: [2, 5].into(),
            ..Default::default()
        };
        let flags = evaluate(&r, &categories);
        assert!(flags.contains(&"HasAll_BadChirality"));
        assert!(flags.contains(&"HasAll_BadChirality_Carbon"));
        assert!(flags.contains(&"HasAll_BadChirality_Planar"));
        assert!(!flags.contains(&"HasAll_BadChirality_Other"));
        assert!(!flags.contains(&"HasAll_BadChirality_Metal"));
        assert!(!flags.contains(&"HasAll_GoodChirality_IgnorePlanarAndNonSingleBondErrors"));
    }

    #[test]
    fn planar_only_mismatches_are_ignorable() {
        let mut r = validated();
        r.chirality_mismatches.insert(5, label(5));
        let categories = ChiralCategories {
            planar: [5].into(),
            ..Default::default()
        };
        let flags = evaluate(&r, &categories);
        assert!(flags.contains(&"HasAll_GoodChirality_IgnorePlanarAndNonSingleBondErrors"));
        assert!(!flags.contains(&"HasAll_GoodChirality"));
    }

    #[test]
    fn wrong_bonds_disable_chirality_flags() {
        let mut r = validated();
        r.chirality_mismatches.insert(2, label(2));
        r.wrong_bonds
            .push(WrongBondInfo::new(1, 2, WrongBondKind::Missing, String::new()));
        let flags = evaluate(&r, &ChiralCategories::default());
        assert!(flags.contains(&"HasAll_WrongBonds"));
        assert!(!flags.contains(&"HasAll_BadChirality"));
        assert!(!flags.contains(&"HasAll_GoodChirality"));
    }
}
