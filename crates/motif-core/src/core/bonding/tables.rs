use crate::core::models::element::Element;
use crate::core::models::topology::BondType;
use phf::phf_map;

/// Upper bound on a bond length, and the bond type assigned below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub value: f64,
    pub bond_type: BondType,
}

impl Threshold {
    const fn new(value: f64, bond_type: BondType) -> Self {
        Self { value, bond_type }
    }
}

/// Per-element parameters for the neighbor search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementInfo {
    /// Number of neighbors queried around an atom of this element.
    pub valency: usize,
    /// Search radius in Angstroms.
    pub max_bonding_radius: f64,
}

impl ElementInfo {
    const fn new(valency: usize, max_bonding_radius: f64) -> Self {
        Self {
            valency,
            max_bonding_radius,
        }
    }
}

const UNKNOWN_ELEMENT: ElementInfo = ElementInfo::new(8, 1.75);
const OTHER_METAL: ElementInfo = ElementInfo::new(8, 2.8);
const METALLIC: &[Threshold] = &[Threshold::new(2.8, BondType::Metallic)];

use BondType::{Double, Metallic, Single, Triple};

static ELEMENT_INFO: phf::Map<&'static str, ElementInfo> = phf_map! {
    "H" => ElementInfo::new(1, 1.42),
    "D" => ElementInfo::new(1, 1.42),
    "O" => ElementInfo::new(3, 1.9),
    "S" => ElementInfo::new(4, 2.3),
    "N" => ElementInfo::new(4, 1.9),
    "C" => ElementInfo::new(4, 1.9),
    "Fe" => ElementInfo::new(6, 2.8),
    "P" => ElementInfo::new(5, 2.3),
    "Si" => ElementInfo::new(4, 2.11),
    "Al" => ElementInfo::new(3, 2.8),
    "Cl" => ElementInfo::new(4, 1.75),
    "As" => ElementInfo::new(5, 2.68),
    "Br" => ElementInfo::new(5, 2.68),
    "I" => ElementInfo::new(7, 2.81),
    "Se" => ElementInfo::new(6, 2.34),
    "B" => ElementInfo::new(5, 2.0),
    "Rh" => ElementInfo::new(6, 2.77),
    "Mn" => ElementInfo::new(4, 2.81),
    "W" => ElementInfo::new(6, 2.66),
    "Hf" => ElementInfo::new(4, 2.8),
    "Ru" => ElementInfo::new(10, 2.5),
    "Ir" => ElementInfo::new(8, 2.51),
    "Li" => ElementInfo::new(1, 2.0),
    "Na" => ElementInfo::new(1, 2.0),
    "K" => ElementInfo::new(1, 1.0),
    "Be" => ElementInfo::new(6, 1.76),
    "Mg" => ElementInfo::new(6, 2.4),
    "Ca" => ElementInfo::new(6, 2.65),
    "Sr" => ElementInfo::new(6, 2.82),
    "Hg" => ElementInfo::new(6, 3.0),
    "Pt" => ElementInfo::new(6, 3.24),
    "Te" => ElementInfo::new(6, 2.2),
};

static ELEMENT_THRESHOLDS: phf::Map<&'static str, &'static [Threshold]> = phf_map! {
    "O" => &[Threshold::new(1.52, Single)],
    "C" => &[Threshold::new(1.75, Single)],
    "P" => &[Threshold::new(1.9, Single)],
    "N" => &[Threshold::new(1.6, Single)],
    "H" => &[Threshold::new(1.42, Single)],
    "D" => &[Threshold::new(1.42, Single)],
    "T" => &[Threshold::new(1.42, Single)],
    "S" => &[Threshold::new(1.9, Single)],
    "Si" => &[Threshold::new(1.9, Single)],
    "Cl" => &[Threshold::new(1.8, Single)],
    "As" => &[Threshold::new(2.68, Single)],
};

/// Keys are `"A-B"` with the two symbols in ordinal order; see [`pair_key`].
static PAIR_THRESHOLDS: phf::Map<&'static str, &'static [Threshold]> = phf_map! {
    "C-C" => &[Threshold::new(1.25, Triple), Threshold::new(1.4, Double), Threshold::new(1.75, Single)],
    "C-O" => &[Threshold::new(1.26, Double), Threshold::new(1.59, Single)],
    "C-N" => &[Threshold::new(1.27, Double), Threshold::new(1.6, Single)],
    "C-H" => &[Threshold::new(1.3, Single)],
    "C-S" => &[Threshold::new(2.0, Single)],
    "C-F" => &[Threshold::new(1.45, Single)],
    "C-Cl" => &[Threshold::new(1.9, Single)],
    "H-N" => &[Threshold::new(1.3, Single)],
    "N-N" => &[Threshold::new(1.55, Single)],
    "H-O" => &[Threshold::new(1.05, Single)],
    "O-O" => &[Threshold::new(1.6, Single)],
    "F-H" => &[Threshold::new(1.0, Single)],
    "F-F" => &[Threshold::new(1.55, Single)],
    "Cl-H" => &[Threshold::new(1.4, Single)],
    "Cl-Cl" => &[Threshold::new(2.1, Single)],
    "S-S" => &[Threshold::new(2.3, Single)],
    "P-S" => &[Threshold::new(2.3, Single)],
    "P-P" => &[Threshold::new(2.3, Single)],
    "H-H" => &[Threshold::new(0.8, Single)],
    "As-C" => &[Threshold::new(2.6, Single)],
    "As-S" => &[Threshold::new(2.68, Single)],
    "As-O" => &[Threshold::new(1.7, Single), Threshold::new(1.93, Single)],
    "I-O" => &[Threshold::new(1.68, Double), Threshold::new(1.72, Single)],
    "H-I" => &[Threshold::new(1.0, Single)],
    "Hg-I" => &[Threshold::new(2.81, Single)],
    "I-I" => &[Threshold::new(2.73, Single)],
    "C-I" => &[Threshold::new(2.48, Single)],
    "Br-O" => &[Threshold::new(1.53, Double), Threshold::new(1.62, Single)],
    "Br-N" => &[Threshold::new(2.06, Single)],
    "Br-H" => &[Threshold::new(1.0, Single)],
    "Br-Pd" => &[Threshold::new(2.44, Single)],
    "Br-Hg" => &[Threshold::new(2.87, Single)],
    "Br-Pt" => &[Threshold::new(2.84, Single)],
    "Br-Ta" => &[Threshold::new(2.63, Single)],
    "Br-C" => &[Threshold::new(2.1, Single)],
    "Se-Se" => &[Threshold::new(2.34, Single)],
    "C-Se" => &[Threshold::new(1.82, Double), Threshold::new(2.27, Single)],
    "S-Se" => &[Threshold::new(2.33, Single)],
    "O-Se" => &[Threshold::new(1.8, Double), Threshold::new(2.05, Single)],
    "H-Se" => &[Threshold::new(1.54, Single)],
    "B-F" => &[Threshold::new(1.36, Single)],
    "B-P" => &[Threshold::new(1.49, Double), Threshold::new(1.98, Single)],
    "B-N" => &[Threshold::new(1.56, Single)],
    "B-H" => &[Threshold::new(1.31, Single)],
    "B-B" => &[Threshold::new(1.84, Single)],
    "B-C" => &[Threshold::new(1.88, Single)],
    "B-O" => &[Threshold::new(1.68, Single)],
    "Be-F" => &[Threshold::new(1.63, Single)],
    "Be-O" => &[Threshold::new(1.76, Single)],
    "Mg-N" => &[Threshold::new(2.4, Metallic)],
    "Mg-O" => &[Threshold::new(2.24, Metallic)],
    "F-Mg" => &[Threshold::new(2.02, Metallic)],
    "C-Hg" => &[Threshold::new(2.36, Single)],
    "Hg-S" => &[Threshold::new(2.75, Single)],
    "N-Pt" => &[Threshold::new(2.11, Single)],
    "O-Pt" => &[Threshold::new(2.6, Single)],
    "O-Te" => &[Threshold::new(2.1, Single)],
    "C-Te" => &[Threshold::new(2.14, Single)],
    "C-Si" => &[Threshold::new(1.91, Single)],
};

/// Two one- or two-letter symbols and the separator.
const PAIR_KEY_CAPACITY: usize = 5;

/// Lookup key of an unordered element pair: both symbols in ordinal order, joined by `-`.
///
/// Built on the stack, since it is formed for every neighbor the bond search classifies.
#[derive(Clone, Copy)]
pub struct PairKey {
    bytes: [u8; PAIR_KEY_CAPACITY],
    len: usize,
}

impl PairKey {
    pub fn new(a: Element, b: Element) -> Self {
        let (first, second) = if a.symbol() <= b.symbol() {
            (a.symbol(), b.symbol())
        } else {
            (b.symbol(), a.symbol())
        };
        let mut key = Self {
            bytes: [0; PAIR_KEY_CAPACITY],
            len: 0,
        };
        for part in [first.as_bytes(), "-".as_bytes(), second.as_bytes()] {
            let end = key.len + part.len();
            key.bytes[key.len..end].copy_from_slice(part);
            key.len = end;
        }
        key
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }
}

impl std::fmt::Debug for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn pair_key(a: Element, b: Element) -> PairKey {
    PairKey::new(a, b)
}

pub fn element_info(element: Element) -> ElementInfo {
    match ELEMENT_INFO.get(element.symbol()) {
        Some(info) => *info,
        None if element.is_metal() => OTHER_METAL,
        None => UNKNOWN_ELEMENT,
    }
}

pub fn pair_thresholds(a: Element, b: Element) -> Option<&'static [Threshold]> {
    PAIR_THRESHOLDS.get(pair_key(a, b).as_str()).copied()
}

pub fn element_thresholds(element: Element) -> Option<&'static [Threshold]> {
    match ELEMENT_THRESHOLDS.get(element.symbol()) {
        Some(thresholds) => Some(*thresholds),
        None if element.is_metal() => Some(METALLIC),
        None => None,
    }
}

fn first_below(thresholds: Option<&[Threshold]>, distance: f64) -> Option<BondType> {
    thresholds?
        .iter()
        .find(|threshold| distance < threshold.value)
        .map(|threshold| threshold.bond_type)
}

/// Bond type implied by two elements at `distance` Angstroms, or `None` when no rule
/// recognizes the pair at that length.
///
/// The pair table is consulted first, then the table of `a`, then the table of `b`. A table
/// that has no matching threshold falls through to the next one. Within a table the first
/// threshold greater than the distance wins.
pub fn classify(distance: f64, a: Element, b: Element) -> Option<BondType> {
    first_below(pair_thresholds(a, b), distance)
        .or_else(|| first_below(element_thresholds(a), distance))
        .or_else(|| first_below(element_thresholds(b), distance))
}
