use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileGeometryConfig {
    pub max_ring_length: Option<usize>,
    pub hydrogen_bonding_radius: Option<f64>,
    pub min_bond_length: Option<f64>,
    pub planarity_threshold_degrees: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileMatchingConfig {
    pub strip_hydrogens: Option<bool>,
    /// Element symbol groups, e.g. `[["C", "N", "O"], ["S", "Cl"]]`. An empty list
    /// disables substitutions.
    pub substitution_classes: Option<Vec<Vec<String>>>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileParallelismConfig {
    pub candidates: Option<usize>,
    pub models: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub geometry: Option<FileGeometryConfig>,
    pub matching: Option<FileMatchingConfig>,
    pub parallelism: Option<FileParallelismConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
