//! Input and output at the edges of a validation run.
//!
//! - [`job`] reads a TOML job: model definitions and the candidates matched against them,
//!   each with atoms, optional declared bonds, and the initial pairing and RMSD produced by
//!   the external matcher.
//! - [`report`] writes the CSV exports of a run.

pub mod job;
pub mod report;
