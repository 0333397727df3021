//! # Core Models Module
//!
//! Data structures representing the parsed structures the validator consumes.
//!
//! ## Key Components
//!
//! - [`element`] - Chemical elements with a static symbol lookup table
//! - [`atom`] - Atom records with current and invariant positions
//! - [`residue`] - Residue records and their ordering identifiers
//! - [`topology`] - Bond types, bonds, and the symmetric bond collection
//! - [`structure`] - Arena-backed structure holding atoms, residues, and bonds
//! - [`ids`] - Arena keys for atoms and residues
//!
//! Atoms live in a `slotmap` arena and are referenced by [`ids::AtomId`] keys. Bonds and
//! pairings are stored as key pairs, never as references, so a structure can be cloned
//! (e.g. to strip hydrogens) while every surviving key stays valid.

pub mod atom;
pub mod element;
pub mod ids;
pub mod residue;
pub mod structure;
pub mod topology;
