use crate::core::models::ids::AtomId;
use crate::core::models::structure::Structure;
use std::collections::{HashSet, VecDeque};

/// Whether the bond graph of `structure` is a single connected component.
///
/// With `heavy_atoms_only`, hydrogens and their bonds are left out of the graph. A
/// structure without atoms to consider counts as connected.
pub fn is_connected(structure: &Structure, heavy_atoms_only: bool) -> bool {
    let considered: HashSet<AtomId> = structure
        .atoms_iter()
        .filter(|(_, atom)| !heavy_atoms_only || !atom.element.is_hydrogen())
        .map(|(id, _)| id)
        .collect();
    let Some(&start) = considered.iter().next() else {
        return true;
    };

    let mut visited = HashSet::with_capacity(considered.len());
    let mut queue = VecDeque::from([start]);
    visited.insert(start);
    while let Some(current) = queue.pop_front() {
        for (neighbor, _) in structure.bonds().neighbors(current) {
            if considered.contains(&neighbor) && visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    visited.len() == considered.len()
}
