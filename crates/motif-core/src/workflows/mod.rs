//! # Workflows Module
//!
//! High-level entry points that take validation from prepared inputs to reportable results.
//!
//! ## Overview
//!
//! Workflows sit on top of the [`engine`](crate::engine): they infer candidate bonds, run
//! the analysis tasks in order, schedule candidates and models on bounded thread pools and
//! turn the outcome into report rows. Each workflow reports its phases through a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter).
//!
//! ## Architecture
//!
//! - **Single Candidate** ([`validate`]) - Bond inference, correspondence extension and every
//!   comparison for one candidate occurrence
//! - **Model Group** ([`group`]) - All candidates of one model in parallel, with the flag
//!   summary and the pairing matrix
//! - **Batch Job** ([`batch`]) - Every model of a job in parallel, and CSV export
//!
//! ## Key Capabilities
//!
//! - **Failure isolation** so one broken candidate never affects its siblings
//! - **Deterministic output** ordered by model and candidate id regardless of scheduling

pub mod batch;
pub mod group;
pub mod validate;
