use crate::core::models::ids::AtomId;
use crate::core::models::structure::Structure;
use itertools::Itertools;
use std::collections::{BTreeMap, HashSet};

/// A ring: atoms in cycle order, starting at the atom with the lowest serial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    pub atoms: Vec<AtomId>,
    pub fingerprint: String,
}

/// Canonical, order- and direction-independent encoding of a cycle's element sequence.
///
/// The lexicographically smallest rotation of the sequence read in either direction is
/// taken and written run-length compressed, so a five-carbon one-oxygen ring is `C5O`.
pub fn fingerprint<S: AsRef<str>>(symbols: &[S]) -> String {
    let n = symbols.len();
    if n == 0 {
        return String::new();
    }
    let forward: Vec<&str> = symbols.iter().map(AsRef::as_ref).collect();
    let backward: Vec<&str> = forward.iter().rev().copied().collect();

    let canonical = [&forward, &backward]
        .into_iter()
        .flat_map(|sequence| {
            (0..n).map(move |start| {
                (0..n)
                    .map(|offset| sequence[(start + offset) % n])
                    .collect::<Vec<&str>>()
            })
        })
        .min()
        .unwrap_or_default();

    canonical
        .into_iter()
        .dedup_with_count()
        .map(|(count, symbol)| {
            if count == 1 {
                symbol.to_string()
            } else {
                format!("{symbol}{count}")
            }
        })
        .collect()
}

/// Finds every chordless cycle of at most `max_len` atoms whose atoms share one residue.
///
/// Each ring is reported once, starting from its lowest-serial atom and walked in the
/// direction of the smaller second serial. The result is ordered by the serials of the ring
/// atoms.
pub fn find_rings(structure: &Structure, max_len: usize) -> Vec<Ring> {
    let serial = |id: AtomId| structure.atom(id).map_or(i32::MIN, |a| a.serial);
    let mut rings = Vec::new();

    for start in structure.atoms_sorted_by_serial() {
        let Some(start_atom) = structure.atom(start) else {
            continue;
        };
        let residue = start_atom.residue_id;
        let start_serial = start_atom.serial;
        let eligible = |id: AtomId| {
            structure
                .atom(id)
                .is_some_and(|a| a.residue_id == residue && a.serial > start_serial)
        };

        let mut path = vec![start];
        let mut on_path: HashSet<AtomId> = HashSet::from([start]);
        extend_path(structure, &eligible, max_len, &mut path, &mut on_path, &mut |cycle| {
            if serial(cycle[1]) < serial(cycle[cycle.len() - 1]) {
                rings.push(cycle.to_vec());
            }
        });
    }

    rings.sort_by_cached_key(|atoms| atoms.iter().map(|&id| serial(id)).collect::<Vec<_>>());
    rings
        .into_iter()
        .map(|atoms| {
            let symbols: Vec<&str> = atoms
                .iter()
                .filter_map(|&id| structure.atom(id))
                .map(|a| a.element.symbol())
                .collect();
            Ring {
                fingerprint: fingerprint(&symbols),
                atoms,
            }
        })
        .collect()
}

fn extend_path<E, F>(
    structure: &Structure,
    eligible: &E,
    max_len: usize,
    path: &mut Vec<AtomId>,
    on_path: &mut HashSet<AtomId>,
    on_cycle: &mut F,
) where
    E: Fn(AtomId) -> bool,
    F: FnMut(&[AtomId]),
{
    let bonds = structure.bonds();
    let start = path[0];
    let Some(&last) = path.last() else {
        return;
    };

    let interior: &[AtomId] = if path.len() > 2 {
        &path[1..path.len() - 1]
    } else {
        &[]
    };
    let chords: Vec<AtomId> = bonds
        .neighbors(last)
        .map(|(next, _)| next)
        .filter(|&next| interior.iter().any(|&inner| bonds.contains(inner, next)))
        .collect();

    let candidates: Vec<AtomId> = bonds.neighbors(last).map(|(next, _)| next).collect();
    for next in candidates {
        if on_path.contains(&next) || !eligible(next) || chords.contains(&next) {
            continue;
        }
        if path.len() >= 2 && bonds.contains(start, next) {
            path.push(next);
            on_cycle(path);
            path.pop();
            continue;
        }
        if path.len() + 1 < max_len {
            path.push(next);
            on_path.insert(next);
            extend_path(structure, eligible, max_len, path, on_path, on_cycle);
            on_path.remove(&next);
            path.pop();
        }
    }
}

/// Number of rings per fingerprint.
pub fn fingerprint_histogram(rings: &[Ring]) -> BTreeMap<String, usize> {
    rings.iter().fold(BTreeMap::new(), |mut counts, ring| {
        *counts.entry(ring.fingerprint.clone()).or_insert(0) += 1;
        counts
    })
}
