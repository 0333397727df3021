//! Layered configuration for the CLI: built-in defaults, an optional TOML file, `--set`
//! overrides and dedicated flags, in increasing order of precedence.

pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;

pub use builder::build_config;
pub use models::AppConfig;
