use super::tables::{self, classify};
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::residue::ResidueIdentifier;
use crate::core::models::structure::Structure;
use crate::core::models::topology::{Bond, BondCollection, BondType};
use crate::core::utils::spatial::SpatialIndex;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, trace};

/// Tunable distances of the bond inference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondInferenceOptions {
    /// Search radius for the single bond of a hydrogen, in Angstroms.
    pub hydrogen_radius: f64,
    /// Bonds shorter than this are treated as suspicious, in Angstroms.
    pub min_bond_length: f64,
}

impl Default for BondInferenceOptions {
    fn default() -> Self {
        Self {
            hydrogen_radius: 1.42,
            min_bond_length: 0.6,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BondInference {
    pub bonds: BondCollection,
    /// Declared bonds with implausible lengths, then residue overlap messages.
    pub warnings: Vec<String>,
    /// Residues judged to overlap another residue and to be ignored.
    pub close_residues: BTreeSet<ResidueIdentifier>,
}

fn is_hydrogen_like(element: Element) -> bool {
    matches!(element, Element::H | Element::D)
}

fn distance(a: &Atom, b: &Atom) -> f64 {
    (a.invariant_position - b.invariant_position).norm()
}

#[inline]
fn unordered(a: AtomId, b: AtomId) -> (AtomId, AtomId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Ordered set of suspiciously short atom pairs.
#[derive(Default)]
struct SuspiciousPairs {
    pairs: Vec<(AtomId, AtomId)>,
    seen: HashSet<(AtomId, AtomId)>,
}

impl SuspiciousPairs {
    fn add(&mut self, a: AtomId, b: AtomId) {
        if self.seen.insert(unordered(a, b)) {
            self.pairs.push((a, b));
        }
    }
}

/// Computes the bonds of `structure` from its invariant coordinates.
///
/// `declared` bonds (e.g. from CONECT-like records) are kept as they are and seed the
/// result. Heavy atoms are then visited in decreasing order of their maximum bonding
/// radius, each pairing with up to `valency` neighbors, and every hydrogen gets at most one
/// bond to its nearest heavy atom. Finally, suspiciously short contacts between residues
/// are inspected and the later residue of an overlapping pair is reported.
pub fn infer_bonds(
    structure: &Structure,
    declared: &[Bond],
    options: &BondInferenceOptions,
) -> BondInference {
    let min_length = options.min_bond_length;
    let mut bonds = BondCollection::new();
    let mut suspicious = SuspiciousPairs::default();
    let mut warnings = Vec::new();

    for bond in declared {
        let (Some(a), Some(b)) = (
            structure.atom(bond.atom1_id),
            structure.atom(bond.atom2_id),
        ) else {
            continue;
        };
        if !bonds.insert(bond.atom1_id, bond.atom2_id, bond.bond_type) {
            continue;
        }
        let length = distance(a, b);
        if length < min_length {
            suspicious.add(bond.atom1_id, bond.atom2_id);
        }
        if length < min_length || classify(length, a.element, b.element).is_none() {
            warnings.push(format!(
                "Suspicious declared bond {}-{} ({:.3} ang).",
                a.label(),
                b.label(),
                length
            ));
        }
    }

    let ordered = structure.atoms_sorted_by_serial();
    let index = SpatialIndex::build(ordered.iter().filter_map(|&id| {
        structure
            .atom(id)
            .map(|atom| (id, atom.invariant_position))
    }));

    let (hydrogens, mut heavy): (Vec<AtomId>, Vec<AtomId>) =
        ordered.iter().copied().partition(|&id| {
            structure
                .atom(id)
                .is_some_and(|atom| is_hydrogen_like(atom.element))
        });
    heavy.sort_by(|&x, &y| {
        let rx = structure
            .atom(x)
            .map_or(0.0, |a| tables::element_info(a.element).max_bonding_radius);
        let ry = structure
            .atom(y)
            .map_or(0.0, |a| tables::element_info(a.element).max_bonding_radius);
        ry.total_cmp(&rx)
    });

    for &atom_id in &heavy {
        let Some(atom) = structure.atom(atom_id) else {
            continue;
        };
        let info = tables::element_info(atom.element);
        let neighbors: Vec<_> = index
            .k_nearest(
                &atom.invariant_position,
                info.valency + 1,
                info.max_bonding_radius,
            )
            .into_iter()
            .filter(|n| n.item != atom_id)
            .collect();

        for i in (0..neighbors.len()).rev() {
            let candidate = &neighbors[i];
            let Some(candidate_atom) = structure.atom(candidate.item) else {
                continue;
            };
            if is_hydrogen_like(candidate_atom.element) {
                continue;
            }

            let mut shadowed = false;
            for closer in neighbors[..i].iter().rev() {
                if closer.distance_squared < min_length * min_length {
                    suspicious.add(atom_id, closer.item);
                }
                if bonds.contains(closer.item, candidate.item) {
                    let closer_element = structure.atom(closer.item).map(|a| a.element);
                    if closer_element.is_some_and(|element| {
                        classify(closer.distance_squared.sqrt(), atom.element, element).is_some()
                    }) {
                        shadowed = true;
                        break;
                    }
                }
            }
            if shadowed {
                continue;
            }

            let length = candidate.distance_squared.sqrt();
            if let Some(bond_type) = classify(length, atom.element, candidate_atom.element) {
                if bonds.insert(atom_id, candidate.item, bond_type) {
                    trace!(
                        from = atom.serial,
                        to = candidate_atom.serial,
                        %bond_type,
                        length,
                        "Inferred bond"
                    );
                    if length < min_length {
                        suspicious.add(atom_id, candidate.item);
                    }
                }
            }
        }
    }

    for &atom_id in &hydrogens {
        let Some(atom) = structure.atom(atom_id) else {
            continue;
        };
        let partner = index
            .k_nearest(&atom.invariant_position, 4, options.hydrogen_radius)
            .into_iter()
            .find(|n| {
                n.item != atom_id
                    && structure
                        .atom(n.item)
                        .is_some_and(|other| !is_hydrogen_like(other.element))
            });
        if let Some(partner) = partner {
            bonds.insert(atom_id, partner.item, BondType::Single);
        }
    }

    let (close_residues, close_warnings) =
        find_close_residues(structure, &bonds, &suspicious.pairs, min_length);
    warnings.extend(close_warnings);

    debug!(
        structure = %structure.id,
        bonds = bonds.len(),
        warnings = warnings.len(),
        "Bond inference finished"
    );

    BondInference {
        bonds,
        warnings,
        close_residues,
    }
}

fn find_close_residues(
    structure: &Structure,
    bonds: &BondCollection,
    suspicious: &[(AtomId, AtomId)],
    min_length: f64,
) -> (BTreeSet<ResidueIdentifier>, Vec<String>) {
    let mut close = BTreeSet::new();
    let mut warnings = Vec::new();

    for &(a, b) in suspicious {
        let (Some(atom_a), Some(atom_b)) = (structure.atom(a), structure.atom(b)) else {
            continue;
        };
        let (Some(residue_a), Some(residue_b)) = (structure.residue_of(a), structure.residue_of(b))
        else {
            continue;
        };
        let (ra, rb) = (&residue_a.identifier, &residue_b.identifier);
        if ra == rb || close.contains(ra) || close.contains(rb) {
            continue;
        }

        let suspicious_pair = unordered(a, b);
        let overlaps = bonds.neighbors(a).any(|(s, _)| {
            s != b
                && bonds.neighbors(s).any(|(t, _)| {
                    unordered(s, t) != suspicious_pair
                        && match (structure.atom(s), structure.atom(t)) {
                            (Some(x), Some(y)) => distance(x, y) <= min_length,
                            _ => false,
                        }
                })
        });
        if !overlaps {
            continue;
        }

        let a_first = ra.chain < rb.chain || (ra.chain == rb.chain && ra.number < rb.number);
        let ignored = if a_first { residue_b } else { residue_a };
        if close.insert(ignored.identifier.clone()) {
            warnings.push(format!(
                "'{}' and '{}' are too close to each other ({:.3} ang). '{}' ignored.",
                residue_a,
                residue_b,
                distance(atom_a, atom_b),
                ignored
            ));
        }
    }

    (close, warnings)
}
