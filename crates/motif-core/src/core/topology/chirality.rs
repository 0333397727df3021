use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::structure::Structure;
use crate::core::models::topology::BondType;
use crate::core::utils::geometry::is_near_planar;
use std::collections::{HashMap, HashSet};

/// Breadth-first shell growing from one neighbor of a candidate center.
///
/// `composition` counts the elements of every atom reached so far; two branches with the
/// same composition at the same depth are indistinguishable at that depth.
struct Branch {
    source: AtomId,
    frontier: Vec<AtomId>,
    visited: HashSet<AtomId>,
    composition: Vec<u32>,
    level: u32,
    returns_to_source: u32,
    first_return_level: u32,
}

impl Branch {
    fn new(first: AtomId, source: AtomId, element_count: usize) -> Self {
        Self {
            source,
            frontier: vec![first],
            visited: HashSet::from([source]),
            composition: vec![0; element_count],
            level: 0,
            returns_to_source: 0,
            first_return_level: 0,
        }
    }

    /// Grows the shell by one bond. Returns `false` once there is nothing left to visit.
    fn advance(&mut self, structure: &Structure, element_index: &HashMap<Element, usize>) -> bool {
        if self.frontier.is_empty() {
            return false;
        }
        self.level += 1;
        let mut added: HashSet<AtomId> = HashSet::new();
        let mut next_frontier = Vec::new();

        for atom_id in std::mem::take(&mut self.frontier) {
            if !self.visited.insert(atom_id) {
                continue;
            }
            if let Some(slot) = structure
                .atom(atom_id)
                .and_then(|atom| element_index.get(&atom.element))
            {
                self.composition[*slot] += 1;
            }
            added.insert(atom_id);

            for (neighbor, _) in structure.bonds().neighbors(atom_id) {
                if self.level > 1 && self.level < 7 && neighbor == self.source {
                    if self.returns_to_source == 0 {
                        self.first_return_level = self.level;
                    }
                    self.returns_to_source += 1;
                }
                if !self.visited.contains(&neighbor) && added.insert(neighbor) {
                    next_frontier.push(neighbor);
                }
            }
        }

        self.frontier = next_frontier;
        true
    }
}

/// Whether `atom_id` is a chiral center of `structure`.
///
/// At least three bonds are needed. The branches started at each neighbor are grown in
/// lock step until their element compositions are pairwise distinct. A three-bonded center
/// must additionally have only single or metallic bonds, must not be near-planar, and every
/// branch has to close back onto the center at least twice, first at depth four or more.
pub fn is_chiral_center(
    structure: &Structure,
    atom_id: AtomId,
    element_index: &HashMap<Element, usize>,
    planarity_threshold: f64,
) -> bool {
    let Some(atom) = structure.atom(atom_id) else {
        return false;
    };
    let neighbors: Vec<(AtomId, BondType)> = structure.bonds().neighbors(atom_id).collect();
    let degree = neighbors.len();
    if degree < 3 {
        return false;
    }
    if degree == 3 {
        if neighbors
            .iter()
            .any(|(_, t)| !matches!(t, BondType::Single | BondType::Metallic))
        {
            return false;
        }
        let positions: Vec<_> = neighbors
            .iter()
            .filter_map(|(id, _)| structure.atom(*id).map(|a| a.position))
            .collect();
        if is_near_planar(&atom.position, &positions, planarity_threshold) {
            return false;
        }
    }

    let mut branches: Vec<Branch> = neighbors
        .iter()
        .map(|&(first, _)| Branch::new(first, atom_id, element_index.len()))
        .collect();

    loop {
        let mut advanced = false;
        for branch in &mut branches {
            if branch.advance(structure, element_index) {
                advanced = true;
            }
        }

        let distinct: HashSet<&[u32]> = branches.iter().map(|b| b.composition.as_slice()).collect();
        if distinct.len() == degree {
            if degree != 3 {
                return true;
            }
            let closes_rings = branches
                .iter()
                .all(|b| b.returns_to_source >= 2 && b.first_return_level >= 4);
            if closes_rings {
                return true;
            }
            if branches.iter().any(|b| b.level > 6) {
                return false;
            }
        }
        if !advanced {
            return false;
        }
    }
}

/// Index of every element present in `structure`, in element order.
pub fn element_index(structure: &Structure) -> HashMap<Element, usize> {
    let mut elements: Vec<Element> = structure.atoms_iter().map(|(_, a)| a.element).collect();
    elements.sort_unstable();
    elements.dedup();
    elements.into_iter().enumerate().map(|(i, e)| (e, i)).collect()
}

/// All chiral centers of `structure`, ordered by serial.
pub fn find_chiral_centers(structure: &Structure, planarity_threshold: f64) -> Vec<AtomId> {
    let index = element_index(structure);
    structure
        .atoms_sorted_by_serial()
        .into_iter()
        .filter(|&id| is_chiral_center(structure, id, &index, planarity_threshold))
        .collect()
}
