//! # Core Module
//!
//! Data structures and stateless algorithms shared by the validation engine.
//!
//! ## Architecture
//!
//! - **Structure Representation** ([`models`]) - Elements, atoms, residues, bonds, and structures
//! - **Bond Perception** ([`bonding`]) - Distance threshold tables and coordinate-based bond inference
//! - **Graph Topology** ([`topology`]) - Connectivity, ring perception, chiral center detection
//! - **Utilities** ([`utils`]) - Geometry helpers and the k-d tree spatial index
//! - **Input/Output** ([`io`]) - Validation job files and CSV reports
//!
//! Nothing in this module keeps state between calls; every routine operates on the
//! structures it is handed and returns new values.

pub mod bonding;
pub mod io;
pub mod models;
pub mod topology;
pub mod utils;
