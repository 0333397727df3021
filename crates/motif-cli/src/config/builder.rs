use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::ValidateArgs;
use crate::error::{CliError, Result};
use motifval::core::models::element::Element;
use motifval::engine::config::{SubstitutionClasses, ValidationConfigBuilder};
use std::collections::BTreeSet;
use std::str::FromStr;

pub fn build_config(args: &ValidateArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let geometry = file_config.geometry.take().unwrap_or_default();
    let matching = file_config.matching.take().unwrap_or_default();
    let parallelism = file_config.parallelism.take().unwrap_or_default();

    let max_ring_length = args
        .max_ring_length
        .or(geometry.max_ring_length)
        .unwrap_or(defaults.max_ring_length);
    let hydrogen_bonding_radius = args
        .hydrogen_bonding_radius
        .or(geometry.hydrogen_bonding_radius)
        .unwrap_or(defaults.hydrogen_bonding_radius);
    let min_bond_length = args
        .min_bond_length
        .or(geometry.min_bond_length)
        .unwrap_or(defaults.min_bond_length);
    let planarity_threshold_degrees = args
        .planarity_threshold
        .or(geometry.planarity_threshold_degrees)
        .unwrap_or(defaults.planarity_threshold_degrees);

    let strip_hydrogens = if args.keep_hydrogens {
        false
    } else {
        matching.strip_hydrogens.unwrap_or(defaults.strip_hydrogens)
    };

    let substitution_classes = if args.no_substitutions {
        SubstitutionClasses::none()
    } else {
        match &matching.substitution_classes {
            Some(groups) => parse_substitution_classes(groups)?,
            None => SubstitutionClasses::default(),
        }
    };

    let candidate_parallelism = args
        .candidate_parallelism
        .or(parallelism.candidates)
        .unwrap_or(defaults.candidate_parallelism);
    let model_parallelism = args
        .model_parallelism
        .or(parallelism.models)
        .unwrap_or(defaults.model_parallelism);

    let core_config = ValidationConfigBuilder::new()
        .substitution_classes(substitution_classes)
        .max_ring_length(max_ring_length)
        .hydrogen_bonding_radius(hydrogen_bonding_radius)
        .min_bond_length(min_bond_length)
        .planarity_threshold_degrees(planarity_threshold_degrees)
        .strip_hydrogens(strip_hydrogens)
        .candidate_parallelism(candidate_parallelism)
        .model_parallelism(model_parallelism)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        job_path: args.input.clone(),
        output_dir: args.output.clone(),
        core_config,
    })
}

fn parse_substitution_classes(groups: &[Vec<String>]) -> Result<SubstitutionClasses> {
    let classes = groups
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|symbol| {
                    Element::from_str(symbol).map_err(|e| {
                        CliError::Config(format!("Invalid substitution class: {e}"))
                    })
                })
                .collect::<Result<BTreeSet<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SubstitutionClasses::new(classes))
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "geometry.max-ring-length" => {
                config
                    .geometry
                    .get_or_insert_with(Default::default)
                    .max_ring_length = Some(parse_value(key, value_str, "integer")?);
            }
            "geometry.hydrogen-bonding-radius" => {
                config
                    .geometry
                    .get_or_insert_with(Default::default)
                    .hydrogen_bonding_radius = Some(parse_value(key, value_str, "float")?);
            }
            "geometry.min-bond-length" => {
                config
                    .geometry
                    .get_or_insert_with(Default::default)
                    .min_bond_length = Some(parse_value(key, value_str, "float")?);
            }
            "geometry.planarity-threshold-degrees" => {
                config
                    .geometry
                    .get_or_insert_with(Default::default)
                    .planarity_threshold_degrees = Some(parse_value(key, value_str, "float")?);
            }
            "matching.strip-hydrogens" => {
                config
                    .matching
                    .get_or_insert_with(Default::default)
                    .strip_hydrogens = Some(parse_value(key, value_str, "boolean")?);
            }
            "parallelism.candidates" => {
                config
                    .parallelism
                    .get_or_insert_with(Default::default)
                    .candidates = Some(parse_value(key, value_str, "integer")?);
            }
            "parallelism.models" => {
                config
                    .parallelism
                    .get_or_insert_with(Default::default)
                    .models = Some(parse_value(key, value_str, "integer")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
