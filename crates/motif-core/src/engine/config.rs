use crate::core::bonding::BondInferenceOptions;
use crate::core::models::element::Element;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Groups of elements that may stand in for one another when extending a pairing.
///
/// An element outside every class only substitutes for itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionClasses {
    classes: Vec<BTreeSet<Element>>,
}

impl SubstitutionClasses {
    pub fn new(classes: Vec<BTreeSet<Element>>) -> Self {
        Self { classes }
    }

    /// No substitutions at all; only identical elements pair up.
    pub fn none() -> Self {
        Self {
            classes: Vec::new(),
        }
    }

    pub fn can_substitute(&self, a: Element, b: Element) -> bool {
        a == b
            || self
                .classes
                .iter()
                .any(|class| class.contains(&a) && class.contains(&b))
    }

    pub fn classes(&self) -> &[BTreeSet<Element>] {
        &self.classes
    }
}

impl Default for SubstitutionClasses {
    fn default() -> Self {
        use Element::*;
        Self::new(vec![
            BTreeSet::from([C, O, N, S, P]),
            BTreeSet::from([S, Cl]),
            BTreeSet::from([F, O]),
            BTreeSet::from([Cl, N]),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    pub substitution_classes: SubstitutionClasses,
    /// Longest ring, in atoms, considered by ring perception.
    pub max_ring_length: usize,
    pub hydrogen_bonding_radius: f64,
    /// Bonds shorter than this are suspicious.
    pub min_bond_length: f64,
    pub planarity_threshold_degrees: f64,
    pub strip_hydrogens: bool,
    pub candidate_parallelism: usize,
    pub model_parallelism: usize,
}

impl ValidationConfig {
    pub const DEFAULT_MAX_RING_LENGTH: usize = 8;
    pub const DEFAULT_HYDROGEN_BONDING_RADIUS: f64 = 1.42;
    pub const DEFAULT_MIN_BOND_LENGTH: f64 = 0.6;
    pub const DEFAULT_PLANARITY_THRESHOLD_DEGREES: f64 = 5.0;
    pub const DEFAULT_CANDIDATE_PARALLELISM: usize = 8;
    pub const DEFAULT_MODEL_PARALLELISM: usize = 2;

    pub fn planarity_threshold_radians(&self) -> f64 {
        self.planarity_threshold_degrees.to_radians()
    }

    pub fn bond_inference_options(&self) -> BondInferenceOptions {
        BondInferenceOptions {
            hydrogen_radius: self.hydrogen_bonding_radius,
            min_bond_length: self.min_bond_length,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            substitution_classes: SubstitutionClasses::default(),
            max_ring_length: Self::DEFAULT_MAX_RING_LENGTH,
            hydrogen_bonding_radius: Self::DEFAULT_HYDROGEN_BONDING_RADIUS,
            min_bond_length: Self::DEFAULT_MIN_BOND_LENGTH,
            planarity_threshold_degrees: Self::DEFAULT_PLANARITY_THRESHOLD_DEGREES,
            strip_hydrogens: true,
            candidate_parallelism: Self::DEFAULT_CANDIDATE_PARALLELISM,
            model_parallelism: Self::DEFAULT_MODEL_PARALLELISM,
        }
    }
}

/// Builds a [`ValidationConfig`].
///
/// The geometric parameters are required; substitution classes, hydrogen stripping and
/// the parallelism bounds fall back to their defaults.
#[derive(Default)]
pub struct ValidationConfigBuilder {
    substitution_classes: Option<SubstitutionClasses>,
    max_ring_length: Option<usize>,
    hydrogen_bonding_radius: Option<f64>,
    min_bond_length: Option<f64>,
    planarity_threshold_degrees: Option<f64>,
    strip_hydrogens: Option<bool>,
    candidate_parallelism: Option<usize>,
    model_parallelism: Option<usize>,
}

impl ValidationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder pre-filled with every default value.
    pub fn with_defaults() -> Self {
        let defaults = ValidationConfig::default();
        Self {
            substitution_classes: Some(defaults.substitution_classes),
            max_ring_length: Some(defaults.max_ring_length),
            hydrogen_bonding_radius: Some(defaults.hydrogen_bonding_radius),
            min_bond_length: Some(defaults.min_bond_length),
            planarity_threshold_degrees: Some(defaults.planarity_threshold_degrees),
            strip_hydrogens: Some(defaults.strip_hydrogens),
            candidate_parallelism: Some(defaults.candidate_parallelism),
            model_parallelism: Some(defaults.model_parallelism),
        }
    }

    pub fn substitution_classes(mut self, classes: SubstitutionClasses) -> Self {
        self.substitution_classes = Some(classes);
        self
    }
    pub fn max_ring_length(mut self, length: usize) -> Self {
        self.max_ring_length = Some(length);
        self
    }
    pub fn hydrogen_bonding_radius(mut self, radius: f64) -> Self {
        self.hydrogen_bonding_radius = Some(radius);
        self
    }
    pub fn min_bond_length(mut self, length: f64) -> Self {
        self.min_bond_length = Some(length);
        self
    }
    pub fn planarity_threshold_degrees(mut self, degrees: f64) -> Self {
        self.planarity_threshold_degrees = Some(degrees);
        self
    }
    pub fn strip_hydrogens(mut self, strip: bool) -> Self {
        self.strip_hydrogens = Some(strip);
        self
    }
    pub fn candidate_parallelism(mut self, n: usize) -> Self {
        self.candidate_parallelism = Some(n);
        self
    }
    pub fn model_parallelism(mut self, n: usize) -> Self {
        self.model_parallelism = Some(n);
        self
    }

    pub fn build(self) -> Result<ValidationConfig, ConfigError> {
        let max_ring_length = self
            .max_ring_length
            .ok_or(ConfigError::MissingParameter("max_ring_length"))?;
        if max_ring_length < 3 {
            return Err(invalid("max_ring_length", "a ring needs at least 3 atoms"));
        }
        let hydrogen_bonding_radius = self
            .hydrogen_bonding_radius
            .ok_or(ConfigError::MissingParameter("hydrogen_bonding_radius"))?;
        if !(hydrogen_bonding_radius > 0.0) {
            return Err(invalid("hydrogen_bonding_radius", "must be positive"));
        }
        let min_bond_length = self
            .min_bond_length
            .ok_or(ConfigError::MissingParameter("min_bond_length"))?;
        if !(min_bond_length >= 0.0) {
            return Err(invalid("min_bond_length", "must not be negative"));
        }
        let planarity_threshold_degrees = self
            .planarity_threshold_degrees
            .ok_or(ConfigError::MissingParameter("planarity_threshold_degrees"))?;
        if !(0.0..=90.0).contains(&planarity_threshold_degrees) {
            return Err(invalid(
                "planarity_threshold_degrees",
                "must lie between 0 and 90 degrees",
            ));
        }
        let candidate_parallelism = self
            .candidate_parallelism
            .unwrap_or(ValidationConfig::DEFAULT_CANDIDATE_PARALLELISM);
        let model_parallelism = self
            .model_parallelism
            .unwrap_or(ValidationConfig::DEFAULT_MODEL_PARALLELISM);
        if candidate_parallelism == 0 {
            return Err(invalid("candidate_parallelism", "must be at least 1"));
        }
        if model_parallelism == 0 {
            return Err(invalid("model_parallelism", "must be at least 1"));
        }

        Ok(ValidationConfig {
            substitution_classes: self.substitution_classes.unwrap_or_default(),
            max_ring_length,
            hydrogen_bonding_radius,
            min_bond_length,
            planarity_threshold_degrees,
            strip_hydrogens: self.strip_hydrogens.unwrap_or(true),
            candidate_parallelism,
            model_parallelism,
        })
    }
}

fn invalid(parameter: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        parameter,
        reason: reason.to_string(),
    }
}
