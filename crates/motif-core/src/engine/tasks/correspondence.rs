use crate::core::models::ids::AtomId;
use crate::core::models::structure::Structure;
use crate::engine::config::SubstitutionClasses;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Model atom to candidate atom correspondence, kept injective in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairing {
    forward: HashMap<AtomId, AtomId>,
    inverse: HashMap<AtomId, AtomId>,
}

impl Pairing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs `model_atom` with `candidate_atom`.
    ///
    /// Returns `false`, leaving the pairing untouched, when either atom is already paired.
    pub fn insert(&mut self, model_atom: AtomId, candidate_atom: AtomId) -> bool {
        if self.forward.contains_key(&model_atom) || self.inverse.contains_key(&candidate_atom) {
            return false;
        }
        self.forward.insert(model_atom, candidate_atom);
        self.inverse.insert(candidate_atom, model_atom);
        true
    }

    pub fn candidate_of(&self, model_atom: AtomId) -> Option<AtomId> {
        self.forward.get(&model_atom).copied()
    }

    pub fn model_of(&self, candidate_atom: AtomId) -> Option<AtomId> {
        self.inverse.get(&candidate_atom).copied()
    }

    pub fn contains_model(&self, model_atom: AtomId) -> bool {
        self.forward.contains_key(&model_atom)
    }

    pub fn contains_candidate(&self, candidate_atom: AtomId) -> bool {
        self.inverse.contains_key(&candidate_atom)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// `(model, candidate)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (AtomId, AtomId)> + '_ {
        self.forward.iter().map(|(&m, &c)| (m, c))
    }

    pub fn candidate_atoms(&self) -> HashSet<AtomId> {
        self.inverse.keys().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correspondence {
    pub pairing: Pairing,
    /// `(model, candidate)` pairs added with differing elements, in the order they were added.
    pub substitutions: Vec<(AtomId, AtomId)>,
}

fn neighbors_by_serial(structure: &Structure, atom_id: AtomId) -> Vec<AtomId> {
    let mut neighbors: Vec<(i32, AtomId)> = structure
        .bonds()
        .neighbors(atom_id)
        .filter_map(|(id, _)| structure.atom(id).map(|atom| (atom.serial, id)))
        .collect();
    neighbors.sort_unstable_by_key(|&(serial, _)| serial);
    neighbors.into_iter().map(|(_, id)| id).collect()
}

/// Finds the next pair to add: the first unpaired model neighbor (model atoms and their
/// neighbors visited by serial) that has an admissible candidate, paired with the closest one.
fn next_extension(
    model: &Structure,
    candidate: &Structure,
    model_order: &[AtomId],
    pairing: &Pairing,
    classes: &SubstitutionClasses,
) -> Option<(AtomId, AtomId)> {
    for &model_atom in model_order {
        let Some(candidate_atom) = pairing.candidate_of(model_atom) else {
            continue;
        };
        for model_neighbor in neighbors_by_serial(model, model_atom) {
            if pairing.contains_model(model_neighbor) {
                continue;
            }
            let Some(wanted) = model.atom(model_neighbor) else {
                continue;
            };

            let mut best: Option<(AtomId, f64)> = None;
            for candidate_neighbor in neighbors_by_serial(candidate, candidate_atom) {
                if pairing.contains_candidate(candidate_neighbor) {
                    continue;
                }
                let Some(offered) = candidate.atom(candidate_neighbor) else {
                    continue;
                };
                if !classes.can_substitute(wanted.element, offered.element) {
                    continue;
                }
                let distance = (wanted.position - offered.position).norm_squared();
                if best.is_none_or(|(_, d)| distance < d) {
                    best = Some((candidate_neighbor, distance));
                }
            }
            if let Some((candidate_neighbor, _)) = best {
                return Some((model_neighbor, candidate_neighbor));
            }
        }
    }
    None
}

/// Greedily grows `pairing` along bonds until nothing more can be paired.
///
/// Starting from every paired model atom, each unpaired bonded neighbor is matched with the
/// closest unpaired bonded neighbor of its partner whose element may stand in for it. After
/// every addition the scan restarts; it ends when a full scan adds nothing or every model
/// atom is paired. Choices are never revisited.
pub fn extend(
    model: &Structure,
    candidate: &Structure,
    mut pairing: Pairing,
    classes: &SubstitutionClasses,
) -> Correspondence {
    let model_order = model.atoms_sorted_by_serial();
    let mut substitutions = Vec::new();

    while pairing.len() < model.atom_count() {
        let Some((model_atom, candidate_atom)) =
            next_extension(model, candidate, &model_order, &pairing, classes)
        else {
            break;
        };
        pairing.insert(model_atom, candidate_atom);

        if let (Some(m), Some(c)) = (model.atom(model_atom), candidate.atom(candidate_atom)) {
            trace!(model = %m.label(), candidate = %c.label(), "Extended pairing");
            if m.element != c.element {
                substitutions.push((model_atom, candidate_atom));
            }
        }
    }

    Correspondence {
        pairing,
        substitutions,
    }
}
