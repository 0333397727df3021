//! # Engine Module
//!
//! This module implements the structural comparison engine: everything needed to decide how
//! a candidate occurrence of a motif differs from the motif's reference model.
//!
//! ## Overview
//!
//! A [`model::MotifModel`] is prepared once per motif type and shared read-only by every
//! worker. Each candidate is then taken through the analysis [`tasks`]: the external pairing
//! is completed along bonds, chirality is compared around the model's chiral centers, and
//! bonds, rings and atom naming are checked. The outcome is a [`result::ValidationResult`]
//! tagged by the [`flags`] table.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Substitution classes, geometric thresholds, parallelism
//! - **Model Preparation** ([`model`]) - Chiral, near-planar and ring data of a reference motif
//! - **Analysis Tasks** ([`tasks`]) - Correspondence, chirality, bond, ring and naming checks
//! - **Results** ([`result`]) - Per-candidate discrepancy records
//! - **Flag Rules** ([`flags`]) - The closed table of named predicates over a result
//! - **Diagnostics** ([`diagnostics`]) - Thread-safe warning and error manifest of a model
//! - **Progress Monitoring** ([`progress`]) - Progress reporting callbacks
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! ## Key Capabilities
//!
//! - **Deterministic extension** of partial correspondences with controlled substitution
//! - **Parity-based chirality** comparison with a planarity fallback
//! - **Shared model state** limited to the lock-guarded diagnostics manifest

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod flags;
pub mod model;
pub mod progress;
pub mod result;
pub mod tasks;
