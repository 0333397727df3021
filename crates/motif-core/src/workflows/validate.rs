use crate::core::bonding::infer_bonds;
use crate::core::io::job::CandidateInput;
use crate::core::models::atom::AtomLabel;
use crate::core::models::ids::AtomId;
use crate::core::models::structure::Structure;
use crate::core::topology::connectivity::is_connected;
use crate::engine::config::ValidationConfig;
use crate::engine::error::ValidationError;
use crate::engine::model::MotifModel;
use crate::engine::result::{ValidationResult, ValidationState};
use crate::engine::tasks::correspondence::{self, Pairing};
use crate::engine::tasks::{bonds, chirality, naming, rings};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument};

/// Builds the initial pairing from the matcher's atom pairs.
///
/// Pairs involving a stripped hydrogen on either side are dropped. Any other atom the
/// structures do not contain, or an atom paired twice, is an error.
fn initial_pairing(
    model: &MotifModel,
    original: &Structure,
    candidate: &Structure,
    pairs: &[(AtomId, AtomId)],
) -> Result<Pairing, ValidationError> {
    let mut pairing = Pairing::new();
    for &(model_atom, candidate_atom) in pairs {
        if !model.structure().contains_atom(model_atom) {
            if model.was_stripped(model_atom) {
                continue;
            }
            return Err(ValidationError::UnknownAtom {
                structure: model.id.clone(),
            });
        }
        if !candidate.contains_atom(candidate_atom) {
            if original.contains_atom(candidate_atom) {
                continue;
            }
            return Err(ValidationError::UnknownAtom {
                structure: candidate.id.clone(),
            });
        }
        if !pairing.insert(model_atom, candidate_atom) {
            let model_serial = model.structure().atom(model_atom).map_or(0, |a| a.serial);
            let candidate_serial = candidate.atom(candidate_atom).map_or(0, |a| a.serial);
            return Err(ValidationError::InconsistentPairing(format!(
                "model atom {model_serial} or candidate atom {candidate_serial} is already paired"
            )));
        }
    }
    Ok(pairing)
}

fn round_to_thousandths(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Validates one candidate occurrence against its model.
///
/// Bonds of the candidate are inferred from its coordinates, seeded with the bonds it
/// declared, and hydrogens are stripped when configured. The external pairing is then
/// completed along bonds and every comparison task runs on the result. Warnings about the
/// candidate are filed in the model's diagnostics under the candidate id.
///
/// # Return
///
/// A `Degenerate` result when the candidate's heavy-atom graph is disconnected or no atom
/// could be paired, otherwise a `Validated` result with flags evaluated.
///
/// # Errors
///
/// Returns [`ValidationError`] when the pairing refers to atoms the structures do not
/// contain or is not injective.
#[instrument(skip_all, name = "validate_candidate", fields(candidate = %candidate.id))]
pub fn analyze_candidate(
    model: &MotifModel,
    candidate: &CandidateInput,
    config: &ValidationConfig,
) -> Result<ValidationResult, ValidationError> {
    let original = &candidate.input.structure;
    let inference = infer_bonds(
        original,
        &candidate.input.declared_bonds,
        &config.bond_inference_options(),
    );
    model
        .diagnostics()
        .add_warnings(&candidate.id, inference.warnings);
    let alternate_locations = candidate.alternate_locations + inference.close_residues.len();

    let mut structure = original.clone();
    structure.set_bonds(inference.bonds);
    if config.strip_hydrogens {
        structure = structure.without_hydrogens();
    }

    let pairing = initial_pairing(model, original, &structure, &candidate.pairing)?;
    if pairing.is_empty() || !is_connected(&structure, true) {
        debug!(paired = pairing.len(), "Candidate is degenerate");
        let mut result = ValidationResult::unvalidated(
            &model.id,
            &candidate.id,
            ValidationState::Degenerate,
            Vec::new(),
        );
        result.finalize(model.chiral_categories());
        return Ok(result);
    }

    let correspondence = correspondence::extend(
        model.structure(),
        &structure,
        pairing,
        &config.substitution_classes,
    );
    let pairing = &correspondence.pairing;
    let matched = structure.induced(&structure.id, |atom_id, _| pairing.contains_candidate(atom_id));

    let bond_analysis = bonds::analyze(model.structure(), &matched, pairing);
    let has_bond_discrepancy = !bond_analysis.discrepancies.is_empty();
    if has_bond_discrepancy {
        model.diagnostics().add_warning(
            &candidate.id,
            bonds::discrepancy_message(&model.name, &bond_analysis.discrepancies),
        );
    }

    let inverted = chirality::compare(
        model,
        &matched,
        &bond_analysis.moved,
        pairing,
        config.planarity_threshold_radians(),
    );
    let ring_comparison = rings::compare(
        model.ring_counts(),
        &rings::ring_counts(&matched, config.max_ring_length),
    );
    let substituted: HashSet<AtomId> = correspondence.substitutions.iter().map(|&(_, c)| c).collect();
    let naming = naming::analyze(model, &structure, pairing, &substituted);

    let model_structure = model.structure();
    let labelled = |pairs: &mut dyn Iterator<Item = (AtomId, AtomId)>| -> BTreeMap<i32, AtomLabel> {
        pairs
            .filter_map(|(m, c)| Some((model_structure.atom(m)?.serial, structure.atom(c)?.label())))
            .collect()
    };

    let mut result = ValidationResult::unvalidated(
        &model.id,
        &candidate.id,
        ValidationState::Validated,
        naming.residues,
    );
    result.main_residue = naming
        .main_residue
        .and_then(|id| structure.residue(id))
        .map(ToString::to_string);
    result.missing_atoms = model_structure
        .atoms_sorted_by_serial()
        .into_iter()
        .filter(|&m| !pairing.contains_model(m))
        .filter_map(|m| model_structure.atom(m).map(|atom| atom.serial))
        .collect();
    result.missing_rings = ring_comparison.differences;
    result.missing_ring_count = ring_comparison.missing_count;
    result.chirality_mismatches = labelled(&mut inverted.into_iter());
    result.substitutions = labelled(&mut correspondence.substitutions.iter().copied());
    result.foreign_atoms = naming.foreign;
    result.name_mismatches = naming.name_mismatches;
    result.name_mismatch_flags = naming.name_mismatch_flags;
    result.wrong_bonds = bond_analysis.wrong_bonds;
    result.has_bond_discrepancy = has_bond_discrepancy;
    result.unmatched_atom_count = structure.atom_count().saturating_sub(matched.atom_count());
    result.naming = naming.analysis;
    result.pairing = labelled(&mut pairing.iter());
    result.alternate_locations = alternate_locations;
    result.rmsd = round_to_thousandths(candidate.rmsd);
    result.finalize(model.chiral_categories());

    debug!(
        paired = pairing.len(),
        missing = result.missing_atom_count(),
        wrong_bonds = result.wrong_bond_count(),
        chirality = result.chirality_mismatch_count(),
        "Candidate analysed"
    );
    Ok(result)
}
