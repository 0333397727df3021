//! # motifval Core Library
//!
//! Structural validation of small chemical motifs (ligands, sugars, modified residues)
//! found inside macromolecular structures against a canonical reference model.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout so that every stage can be tested in isolation.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, `BondCollection`),
//!   element and bond-threshold tables, bond inference from coordinates, the spatial index,
//!   ring perception, and the job/report I/O used at the edges.
//!
//! - **[`engine`]: The Logic Core.** The comparison engine proper: the motif model with its
//!   precomputed chiral and ring data, correspondence extension, chirality comparison,
//!   bond/ring/naming discrepancy analysis, and the flag rule table.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together: validating a single
//!   candidate, analysing every candidate of one model in parallel, and running a whole job.

pub mod core;
pub mod engine;
pub mod workflows;
