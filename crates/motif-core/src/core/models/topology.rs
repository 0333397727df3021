use super::ids::AtomId;
use slotmap::SecondaryMap;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum BondType {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
    Metallic,
    Ion,
    Hydrogen,
    DisulfideBridge,
    Unknown,
}

#[derive(Debug, Error)]
#[error("Invalid bond type string: '{0}'")]
pub struct ParseBondTypeError(pub String);

impl FromStr for BondType {
    type Err = ParseBondTypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "ar" | "aromatic" => Ok(Self::Aromatic),
            "metallic" | "metal" => Ok(Self::Metallic),
            "ion" | "ionic" => Ok(Self::Ion),
            "hydrogen" | "hbond" => Ok(Self::Hydrogen),
            "disulfide" | "disulfidebridge" | "disulfide-bridge" => Ok(Self::DisulfideBridge),
            "unknown" => Ok(Self::Unknown),
            _ => Err(ParseBondTypeError(s.to_string())),
        }
    }
}

impl fmt::Display for BondType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
                Self::Metallic => "Metallic",
                Self::Ion => "Ion",
                Self::Hydrogen => "Hydrogen",
                Self::DisulfideBridge => "DisulfideBridge",
                Self::Unknown => "Unknown",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
    pub bond_type: BondType,
}

impl Bond {
    pub fn new(atom1_id: AtomId, atom2_id: AtomId, bond_type: BondType) -> Self {
        Self {
            atom1_id,
            atom2_id,
            bond_type,
        }
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atom1_id == atom_id || self.atom2_id == atom_id
    }

    /// The endpoint opposite to `atom_id`, if the bond touches it.
    pub fn partner(&self, atom_id: AtomId) -> Option<AtomId> {
        if self.atom1_id == atom_id {
            Some(self.atom2_id)
        } else if self.atom2_id == atom_id {
            Some(self.atom1_id)
        } else {
            None
        }
    }
}

#[inline]
fn pair_key(a: AtomId, b: AtomId) -> (AtomId, AtomId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Bonds of a structure, indexed by unordered atom pair and by incident atom.
///
/// Lookups are symmetric: `get(a, b)` and `get(b, a)` return the same bond. Incident lists
/// keep insertion order, which is the fixed neighbor order used by the chirality and
/// ring routines.
#[derive(Debug, Clone, Default)]
pub struct BondCollection {
    bonds: Vec<Bond>,
    pair_index: HashMap<(AtomId, AtomId), usize>,
    incident: SecondaryMap<AtomId, Vec<usize>>,
}

impl BondCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bond unless the pair is already bonded or both ends are the same atom.
    ///
    /// Returns `true` when the bond was added.
    pub fn insert(&mut self, atom1_id: AtomId, atom2_id: AtomId, bond_type: BondType) -> bool {
        if atom1_id == atom2_id {
            return false;
        }
        let key = pair_key(atom1_id, atom2_id);
        if self.pair_index.contains_key(&key) {
            return false;
        }
        let index = self.bonds.len();
        self.bonds.push(Bond::new(atom1_id, atom2_id, bond_type));
        self.pair_index.insert(key, index);
        for atom in [atom1_id, atom2_id] {
            match self.incident.get_mut(atom) {
                Some(list) => list.push(index),
                None => {
                    self.incident.insert(atom, vec![index]);
                }
            }
        }
        true
    }

    pub fn get(&self, a: AtomId, b: AtomId) -> Option<&Bond> {
        self.pair_index
            .get(&pair_key(a, b))
            .map(|&index| &self.bonds[index])
    }

    pub fn bond_type(&self, a: AtomId, b: AtomId) -> Option<BondType> {
        self.get(a, b).map(|bond| bond.bond_type)
    }

    pub fn contains(&self, a: AtomId, b: AtomId) -> bool {
        self.pair_index.contains_key(&pair_key(a, b))
    }

    /// Bonds touching `atom_id`, in insertion order.
    pub fn incident(&self, atom_id: AtomId) -> impl Iterator<Item = &Bond> + '_ {
        self.incident
            .get(atom_id)
            .into_iter()
            .flatten()
            .map(move |&index| &self.bonds[index])
    }

    /// Bonded neighbors of `atom_id` with the bond type, in insertion order.
    pub fn neighbors(&self, atom_id: AtomId) -> impl Iterator<Item = (AtomId, BondType)> + '_ {
        self.incident(atom_id)
            .filter_map(move |bond| bond.partner(atom_id).map(|other| (other, bond.bond_type)))
    }

    pub fn degree(&self, atom_id: AtomId) -> usize {
        self.incident.get(atom_id).map_or(0, Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bond> {
        self.bonds.iter()
    }

    pub fn len(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }

    /// The bonds whose both endpoints are in `atoms`, in the original order.
    pub fn induced(&self, atoms: &HashSet<AtomId>) -> Self {
        self.filtered(|bond| atoms.contains(&bond.atom1_id) && atoms.contains(&bond.atom2_id))
    }

    pub fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Bond) -> bool,
    {
        let mut result = Self::new();
        for bond in self.bonds.iter().filter(|bond| keep(bond)) {
            result.insert(bond.atom1_id, bond.atom2_id, bond.bond_type);
        }
        result
    }
}

impl FromIterator<Bond> for BondCollection {
    fn from_iter<I: IntoIterator<Item = Bond>>(iter: I) -> Self {
        let mut collection = Self::new();
        for bond in iter {
            collection.insert(bond.atom1_id, bond.atom2_id, bond.bond_type);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn atom_ids(n: usize) -> Vec<AtomId> {
        let mut map: SlotMap<AtomId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    mod bond_type {
        use super::*;

        #[test]
        fn from_str_accepts_aliases_case_insensitively() {
            assert_eq!("1".parse::<BondType>().unwrap(), BondType::Single);
            assert_eq!("DOUBLE".parse::<BondType>().unwrap(), BondType::Double);
            assert_eq!("t".parse::<BondType>().unwrap(), BondType::Triple);
            assert_eq!("Ar".parse::<BondType>().unwrap(), BondType::Aromatic);
            assert_eq!("metal".parse::<BondType>().unwrap(), BondType::Metallic);
            assert_eq!(
                "disulfide-bridge".parse::<BondType>().unwrap(),
                BondType::DisulfideBridge
            );
        }

        #[test]
        fn from_str_rejects_garbage() {
            assert!("quadruple".parse::<BondType>().is_err());
            assert!("".parse::<BondType>().is_err());
        }

        #[test]
        fn display_matches_variant_names() {
            assert_eq!(BondType::Single.to_string(), "Single");
            assert_eq!(BondType::DisulfideBridge.to_string(), "DisulfideBridge");
        }

        #[test]
        fn default_is_single() {
            assert_eq!(BondType::default(), BondType::Single);
        }
    }

    mod collection {
        use super::*;

        #[test]
        fn lookup_is_symmetric() {
            let ids = atom_ids(2);
            let mut bonds = BondCollection::new();
            assert!(bonds.insert(ids[0], ids[1], BondType::Double));

            assert!(bonds.contains(ids[1], ids[0]));
            assert_eq!(bonds.bond_type(ids[1], ids[0]), Some(BondType::Double));
            assert_eq!(bonds.get(ids[0], ids[1]), bonds.get(ids[1], ids[0]));
        }

        #[test]
        fn duplicate_and_self_bonds_are_rejected() {
            let ids = atom_ids(2);
            let mut bonds = BondCollection::new();
            assert!(bonds.insert(ids[0], ids[1], BondType::Single));
            assert!(!bonds.insert(ids[1], ids[0], BondType::Double));
            assert!(!bonds.insert(ids[0], ids[0], BondType::Single));
            assert_eq!(bonds.len(), 1);
            assert_eq!(bonds.bond_type(ids[0], ids[1]), Some(BondType::Single));
        }

        #[test]
        fn every_bond_is_listed_under_both_endpoints() {
            let ids = atom_ids(4);
            let mut bonds = BondCollection::new();
            bonds.insert(ids[0], ids[1], BondType::Single);
            bonds.insert(ids[1], ids[2], BondType::Single);
            bonds.insert(ids[3], ids[1], BondType::Double);

            for bond in bonds.iter() {
                assert!(
                    bonds
                        .neighbors(bond.atom1_id)
                        .any(|(other, _)| other == bond.atom2_id)
                );
                assert!(
                    bonds
                        .neighbors(bond.atom2_id)
                        .any(|(other, _)| other == bond.atom1_id)
                );
            }
            assert_eq!(bonds.degree(ids[1]), 3);
            assert_eq!(bonds.degree(ids[3]), 1);
        }

        #[test]
        fn neighbors_keep_insertion_order() {
            let ids = atom_ids(4);
            let mut bonds = BondCollection::new();
            bonds.insert(ids[0], ids[3], BondType::Single);
            bonds.insert(ids[2], ids[0], BondType::Double);
            bonds.insert(ids[0], ids[1], BondType::Triple);

            let neighbors: Vec<_> = bonds.neighbors(ids[0]).collect();
            assert_eq!(
                neighbors,
                vec![
                    (ids[3], BondType::Single),
                    (ids[2], BondType::Double),
                    (ids[1], BondType::Triple)
                ]
            );
        }

        #[test]
        fn unknown_atom_has_no_neighbors() {
            let ids = atom_ids(3);
            let mut bonds = BondCollection::new();
            bonds.insert(ids[0], ids[1], BondType::Single);
            assert_eq!(bonds.degree(ids[2]), 0);
            assert_eq!(bonds.neighbors(ids[2]).count(), 0);
        }

        #[test]
        fn induced_keeps_only_bonds_inside_the_subset() {
            let ids = atom_ids(3);
            let mut bonds = BondCollection::new();
            bonds.insert(ids[0], ids[1], BondType::Single);
            bonds.insert(ids[1], ids[2], BondType::Double);

            let subset: HashSet<_> = [ids[0], ids[1]].into_iter().collect();
            let induced = bonds.induced(&subset);
            assert_eq!(induced.len(), 1);
            assert!(induced.contains(ids[0], ids[1]));
            assert!(!induced.contains(ids[1], ids[2]));
        }
    }
}
