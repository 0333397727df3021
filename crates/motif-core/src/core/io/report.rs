use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV writing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

/// One analysed candidate, flattened for `results.csv`. List fields are joined with `"; "`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultRow {
    pub model: String,
    pub id: String,
    pub state: String,
    pub main_residue: String,
    pub rmsd: f64,
    pub missing_atom_count: usize,
    pub missing_ring_count: usize,
    pub missing_rings: String,
    pub chirality_mismatch_count: usize,
    pub chirality_mismatches: String,
    pub substitution_count: usize,
    pub substitutions: String,
    pub foreign_atom_count: usize,
    pub foreign_atoms: String,
    pub name_mismatch_count: usize,
    pub name_mismatches: String,
    pub wrong_bond_count: usize,
    pub wrong_bonds: String,
    pub has_bond_discrepancy: bool,
    pub unmatched_atom_count: usize,
    pub alternate_locations: usize,
    pub duplicate_names: String,
    pub non_isomorphic_names: String,
    pub non_boundary_atoms: String,
    pub unmatched_model_names: String,
    pub flags: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SummaryRow {
    pub model: String,
    pub flag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageRow {
    /// Id of the model whose manifest holds the message.
    pub scope: String,
    /// Candidate id, or empty for messages about the model itself.
    pub key: String,
    pub severity: String,
    pub message: String,
}

fn csv_error(path: &Path, source: csv::Error) -> ReportError {
    ReportError::Csv {
        path: path.to_string_lossy().to_string(),
        source,
    }
}

fn create_writer(path: &Path) -> Result<csv::Writer<std::fs::File>, ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ReportError::Io {
            path: parent.to_string_lossy().to_string(),
            source: e,
        })?;
    }
    csv::Writer::from_path(path).map_err(|e| csv_error(path, e))
}

/// Writes serializable rows, with a header derived from the field names.
pub fn write_rows<R: Serialize>(path: &Path, rows: &[R]) -> Result<(), ReportError> {
    let mut writer = create_writer(path)?;
    for row in rows {
        writer.serialize(row).map_err(|e| csv_error(path, e))?;
    }
    writer.flush().map_err(|e| ReportError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

/// Writes a table whose columns are only known at run time.
pub fn write_table(path: &Path, header: &[String], rows: &[Vec<String>]) -> Result<(), ReportError> {
    let mut writer = create_writer(path)?;
    writer.write_record(header).map_err(|e| csv_error(path, e))?;
    for row in rows {
        writer.write_record(row).map_err(|e| csv_error(path, e))?;
    }
    writer.flush().map_err(|e| ReportError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}
