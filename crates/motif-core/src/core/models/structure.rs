use super::atom::Atom;
use super::ids::{AtomId, ResidueId};
use super::residue::{Residue, ResidueIdentifier};
use super::topology::BondCollection;
use slotmap::SlotMap;
use std::collections::HashMap;

/// A parsed structure: a model motif or a candidate occurrence cut from a parent.
///
/// Atoms and residues are stored in `slotmap` arenas. Besides key lookup, atoms can be
/// found by serial number in constant time, and residues by their chain/number/insertion
/// identifier.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    /// Identifier of the structure (candidate id or model id).
    pub id: String,
    atoms: SlotMap<AtomId, Atom>,
    residues: SlotMap<ResidueId, Residue>,
    serial_map: HashMap<i32, AtomId>,
    residue_map: HashMap<ResidueIdentifier, ResidueId>,
    bonds: BondCollection,
}

impl Structure {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Adds a residue or returns the existing one with the same identifier.
    ///
    /// # Arguments
    ///
    /// * `residue` - The residue to insert; its name is ignored when the identifier exists.
    ///
    /// # Return
    ///
    /// The `ResidueId` of the new or existing residue.
    pub fn add_residue(&mut self, residue: Residue) -> ResidueId {
        if let Some(&id) = self.residue_map.get(&residue.identifier) {
            return id;
        }
        let identifier = residue.identifier.clone();
        let id = self.residues.insert(residue);
        self.residue_map.insert(identifier, id);
        id
    }

    /// Adds an atom to the structure.
    ///
    /// # Arguments
    ///
    /// * `atom` - The atom to insert. Its `residue_id` must come from this structure.
    ///
    /// # Return
    ///
    /// Returns `None` if the residue is unknown or an atom with the same serial already
    /// exists, otherwise the new `AtomId`.
    pub fn add_atom(&mut self, atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(atom.residue_id) || self.serial_map.contains_key(&atom.serial)
        {
            return None;
        }
        let serial = atom.serial;
        let id = self.atoms.insert(atom);
        self.serial_map.insert(serial, id);
        Some(id)
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn atom_by_serial(&self, serial: i32) -> Option<AtomId> {
        self.serial_map.get(&serial).copied()
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn atoms_iter_mut(&mut self) -> impl Iterator<Item = (AtomId, &mut Atom)> {
        self.atoms.iter_mut()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn contains_atom(&self, id: AtomId) -> bool {
        self.atoms.contains_key(id)
    }

    /// Atom keys ordered by serial number, the deterministic order used by every analysis.
    pub fn atoms_sorted_by_serial(&self) -> Vec<AtomId> {
        let mut ids: Vec<(i32, AtomId)> = self
            .atoms
            .iter()
            .map(|(id, atom)| (atom.serial, id))
            .collect();
        ids.sort_unstable_by_key(|&(serial, _)| serial);
        ids.into_iter().map(|(_, id)| id).collect()
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn residues_iter(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.residues.iter()
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    /// The residue an atom belongs to.
    pub fn residue_of(&self, atom_id: AtomId) -> Option<&Residue> {
        self.atoms
            .get(atom_id)
            .and_then(|atom| self.residues.get(atom.residue_id))
    }

    pub fn find_residue(&self, identifier: &ResidueIdentifier) -> Option<ResidueId> {
        self.residue_map.get(identifier).copied()
    }

    pub fn bonds(&self) -> &BondCollection {
        &self.bonds
    }

    pub fn bonds_mut(&mut self) -> &mut BondCollection {
        &mut self.bonds
    }

    pub fn set_bonds(&mut self, bonds: BondCollection) {
        self.bonds = bonds;
    }

    /// A copy of this structure with every hydrogen atom and hydrogen bond partner removed.
    ///
    /// Keys of the surviving atoms are unchanged, so pairings expressed in `AtomId`s
    /// remain valid against the stripped copy.
    pub fn without_hydrogens(&self) -> Self {
        self.induced(&self.id, |_, atom| !atom.element.is_hydrogen())
    }

    /// The substructure made of the atoms `keep` accepts and the bonds between them.
    ///
    /// Residues are kept even when none of their atoms survive; atom keys are preserved.
    pub fn induced<F>(&self, id: &str, mut keep: F) -> Self
    where
        F: FnMut(AtomId, &Atom) -> bool,
    {
        let mut induced = self.clone();
        induced.id = id.to_string();
        induced.atoms.retain(|atom_id, atom| keep(atom_id, atom));
        induced.serial_map.retain(|_, atom_id| induced.atoms.contains_key(*atom_id));
        induced.bonds = self.bonds.filtered(|bond| {
            induced.atoms.contains_key(bond.atom1_id) && induced.atoms.contains_key(bond.atom2_id)
        });
        induced
    }
}
