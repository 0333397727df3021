//! # Graph Topology
//!
//! Algorithms over the bond graph of a [`Structure`](crate::core::models::structure::Structure).
//!
//! - [`connectivity`] - Whether the (heavy-atom) graph forms a single component
//! - [`rings`] - Chordless cycles within one residue and their canonical fingerprints
//! - [`chirality`] - Detection of chiral centers from the layered neighborhood of each atom

pub mod chirality;
pub mod connectivity;
pub mod rings;
