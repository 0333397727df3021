use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::residue::Residue;
use crate::core::models::structure::Structure;
use crate::core::models::topology::{Bond, BondType};
use nalgebra::Point3;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum JobLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Structure '{structure}': atom {serial} has unknown element '{symbol}'")]
    UnknownElement {
        structure: String,
        serial: i32,
        symbol: String,
    },
    #[error("Structure '{structure}': duplicate atom serial {serial}")]
    DuplicateSerial { structure: String, serial: i32 },
    #[error("Structure '{structure}': no atom with serial {serial}")]
    UnknownAtom { structure: String, serial: i32 },
    #[error("Structure '{structure}': unknown bond type '{value}'")]
    UnknownBondType { structure: String, value: String },
    #[error("Duplicate model id '{0}'")]
    DuplicateModel(String),
    #[error("Candidate of model '{0}' has an empty id")]
    EmptyCandidateId(String),
    #[error("Candidate '{candidate}' refers to unknown model '{model}'")]
    UnknownModel { candidate: String, model: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct JobFile {
    #[serde(default)]
    models: Vec<ModelEntry>,
    #[serde(default)]
    candidates: Vec<CandidateEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct AtomEntry {
    serial: i32,
    name: String,
    element: String,
    residue: String,
    #[serde(default)]
    chain: String,
    residue_number: isize,
    #[serde(default)]
    insertion_code: Option<char>,
    position: [f64; 3],
    #[serde(default)]
    invariant_position: Option<[f64; 3]>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BondEntry {
    a: i32,
    b: i32,
    #[serde(rename = "type", default)]
    bond_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ModelEntry {
    id: String,
    name: String,
    #[serde(default)]
    charge_equivalence: Option<String>,
    #[serde(default)]
    charge_equivalence_ignore_bond_types: Option<String>,
    #[serde(default)]
    chiral_atoms: Option<Vec<i32>>,
    atoms: Vec<AtomEntry>,
    #[serde(default)]
    bonds: Vec<BondEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct CandidateEntry {
    id: String,
    model: String,
    #[serde(default)]
    rmsd: f64,
    #[serde(default)]
    alternate_locations: usize,
    atoms: Vec<AtomEntry>,
    #[serde(default)]
    bonds: Vec<BondEntry>,
    #[serde(default)]
    pairing: Vec<[i32; 2]>,
}

/// A structure as read from a job, with the bonds it declared.
#[derive(Debug, Clone)]
pub struct StructureInput {
    pub structure: Structure,
    pub declared_bonds: Vec<Bond>,
}

#[derive(Debug, Clone)]
pub struct ModelDefinition {
    pub id: String,
    /// Residue name of the motif (e.g. "NAG").
    pub name: String,
    pub input: StructureInput,
    /// Chiral atoms supplied by the job; detected from topology when absent.
    pub chiral_atoms: Option<Vec<AtomId>>,
    pub charge_equivalence: Option<String>,
    pub charge_equivalence_ignore_bond_types: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CandidateInput {
    pub id: String,
    pub model_id: String,
    pub input: StructureInput,
    /// Initial correspondence from the external matcher: model atom to candidate atom.
    pub pairing: Vec<(AtomId, AtomId)>,
    pub rmsd: f64,
    pub alternate_locations: usize,
}

/// Every model and candidate of one validation run.
#[derive(Debug, Clone, Default)]
pub struct ValidationJob {
    pub models: Vec<ModelDefinition>,
    pub candidates: Vec<CandidateInput>,
}

impl ValidationJob {
    pub fn load(path: &Path) -> Result<Self, JobLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| JobLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let job = Self::from_toml_str(&content, &path.to_string_lossy())?;
        info!(
            path = %path.display(),
            models = job.models.len(),
            candidates = job.candidates.len(),
            "Loaded validation job"
        );
        Ok(job)
    }

    /// Parses a job from TOML text. `origin` names the source in error messages.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, JobLoadError> {
        let file: JobFile = toml::from_str(content).map_err(|e| JobLoadError::Toml {
            path: origin.to_string(),
            source: e,
        })?;

        let mut seen_models = HashSet::new();
        let mut models = Vec::with_capacity(file.models.len());
        for entry in file.models {
            if !seen_models.insert(entry.id.clone()) {
                return Err(JobLoadError::DuplicateModel(entry.id));
            }
            models.push(build_model(entry)?);
        }

        let candidates = file
            .candidates
            .into_iter()
            .map(|entry| build_candidate(entry, &models))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { models, candidates })
    }

    pub fn model(&self, id: &str) -> Option<&ModelDefinition> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Candidates of one model, in job order.
    pub fn candidates_for<'a>(&'a self, model_id: &'a str) -> impl Iterator<Item = &'a CandidateInput> + 'a {
        self.candidates.iter().filter(move |c| c.model_id == model_id)
    }
}

fn build_structure(
    id: &str,
    atoms: &[AtomEntry],
    bonds: &[BondEntry],
) -> Result<StructureInput, JobLoadError> {
    let mut structure = Structure::new(id);
    for entry in atoms {
        let element: Element = entry.element.parse().map_err(|_| JobLoadError::UnknownElement {
            structure: id.to_string(),
            serial: entry.serial,
            symbol: entry.element.clone(),
        })?;
        let residue_id = structure.add_residue(Residue::new(
            &entry.residue,
            &entry.chain,
            entry.residue_number,
            entry.insertion_code,
        ));
        let [x, y, z] = entry.position;
        let mut atom = Atom::new(entry.serial, &entry.name, element, residue_id, Point3::new(x, y, z));
        if let Some([ix, iy, iz]) = entry.invariant_position {
            atom = atom.with_invariant_position(Point3::new(ix, iy, iz));
        }
        structure
            .add_atom(atom)
            .ok_or_else(|| JobLoadError::DuplicateSerial {
                structure: id.to_string(),
                serial: entry.serial,
            })?;
    }

    let declared_bonds = bonds
        .iter()
        .map(|entry| {
            let a = resolve_serial(&structure, entry.a)?;
            let b = resolve_serial(&structure, entry.b)?;
            let bond_type = match &entry.bond_type {
                Some(value) => value.parse::<BondType>().map_err(|_| JobLoadError::UnknownBondType {
                    structure: id.to_string(),
                    value: value.clone(),
                })?,
                None => BondType::Single,
            };
            Ok(Bond::new(a, b, bond_type))
        })
        .collect::<Result<Vec<_>, JobLoadError>>()?;

    Ok(StructureInput {
        structure,
        declared_bonds,
    })
}

fn resolve_serial(structure: &Structure, serial: i32) -> Result<AtomId, JobLoadError> {
    structure
        .atom_by_serial(serial)
        .ok_or_else(|| JobLoadError::UnknownAtom {
            structure: structure.id.clone(),
            serial,
        })
}

fn build_model(entry: ModelEntry) -> Result<ModelDefinition, JobLoadError> {
    let input = build_structure(&entry.id, &entry.atoms, &entry.bonds)?;
    let chiral_atoms = entry
        .chiral_atoms
        .map(|serials| {
            serials
                .into_iter()
                .map(|serial| resolve_serial(&input.structure, serial))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;
    Ok(ModelDefinition {
        id: entry.id,
        name: entry.name,
        input,
        chiral_atoms,
        charge_equivalence: entry.charge_equivalence,
        charge_equivalence_ignore_bond_types: entry.charge_equivalence_ignore_bond_types,
    })
}

fn build_candidate(
    entry: CandidateEntry,
    models: &[ModelDefinition],
) -> Result<CandidateInput, JobLoadError> {
    if entry.id.trim().is_empty() {
        return Err(JobLoadError::EmptyCandidateId(entry.model));
    }
    let model = models
        .iter()
        .find(|m| m.id == entry.model)
        .ok_or_else(|| JobLoadError::UnknownModel {
            candidate: entry.id.clone(),
            model: entry.model.clone(),
        })?;
    let input = build_structure(&entry.id, &entry.atoms, &entry.bonds)?;
    let pairing = entry
        .pairing
        .iter()
        .map(|&[model_serial, candidate_serial]| {
            Ok((
                resolve_serial(&model.input.structure, model_serial)?,
                resolve_serial(&input.structure, candidate_serial)?,
            ))
        })
        .collect::<Result<Vec<_>, JobLoadError>>()?;
    Ok(CandidateInput {
        id: entry.id,
        model_id: entry.model,
        input,
        pairing,
        rmsd: entry.rmsd,
        alternate_locations: entry.alternate_locations,
    })
}
