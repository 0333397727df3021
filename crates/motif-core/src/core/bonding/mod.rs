//! # Bond Perception
//!
//! Bonds are derived from invariant coordinates using compiled distance thresholds.
//!
//! - [`tables`] - Per-element valency and search radius, element and element-pair thresholds
//! - [`inference`] - The neighbor-search driven inference and the residue overlap scan

pub mod inference;
pub mod tables;

pub use inference::{BondInference, BondInferenceOptions, infer_bonds};
