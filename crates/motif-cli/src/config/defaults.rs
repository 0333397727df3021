use motifval::engine::config::ValidationConfig;

pub struct DefaultsConfig {
    pub max_ring_length: usize,
    pub hydrogen_bonding_radius: f64,
    pub min_bond_length: f64,
    pub planarity_threshold_degrees: f64,
    pub strip_hydrogens: bool,
    pub candidate_parallelism: usize,
    pub model_parallelism: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_ring_length: ValidationConfig::DEFAULT_MAX_RING_LENGTH,
            hydrogen_bonding_radius: ValidationConfig::DEFAULT_HYDROGEN_BONDING_RADIUS,
            min_bond_length: ValidationConfig::DEFAULT_MIN_BOND_LENGTH,
            planarity_threshold_degrees: ValidationConfig::DEFAULT_PLANARITY_THRESHOLD_DEGREES,
            strip_hydrogens: true,
            candidate_parallelism: ValidationConfig::DEFAULT_CANDIDATE_PARALLELISM,
            model_parallelism: ValidationConfig::DEFAULT_MODEL_PARALLELISM,
        }
    }
}
