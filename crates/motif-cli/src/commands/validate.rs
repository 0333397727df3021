use crate::cli::ValidateArgs;
use crate::config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use motifval::core::io::job::ValidationJob;
use motifval::engine::progress::ProgressReporter;
use motifval::workflows::batch;
use tracing::{info, warn};

pub fn run(args: ValidateArgs, show_progress: bool) -> Result<()> {
    info!("Building configuration from defaults, file and CLI arguments...");
    let app_config = config::build_config(&args)?;

    info!("Loading validation job from {:?}", &app_config.job_path);
    let job = ValidationJob::load(&app_config.job_path)?;

    let progress_handler = if show_progress {
        CliProgressHandler::new()
    } else {
        CliProgressHandler::hidden()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Validating {} candidate(s) of {} model(s)...",
        job.candidates.len(),
        job.models.len()
    );
    let report = batch::run_job(&job, &app_config.core_config, &reporter)?;

    for model in report.aborted_models() {
        warn!(model = %model.model_id, "Model was not analysed");
        println!("Warning: model '{}' was not analysed, see messages.csv.", model.model_id);
    }

    let written = report.write_csv(&app_config.output_dir)?;
    info!("Wrote {} report file(s).", written.len());
    println!(
        "✓ {} candidate(s) analysed. Reports written to: {}",
        report.analyzed_count(),
        app_config.output_dir.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const JOB: &str = r#"
[[models]]
id = "MOH"
name = "MOH"
atoms = [
    { serial = 1, name = "C1", element = "C", residue = "MOH", chain = "A", residue-number = 1, position = [0.0, 0.0, 0.0] },
    { serial = 2, name = "O1", element = "O", residue = "MOH", chain = "A", residue-number = 1, position = [1.43, 0.0, 0.0] },
]
bonds = [{ a = 1, b = 2, type = "single" }]

[[candidates]]
id = "1abc_MOH_501_A"
model = "MOH"
rmsd = 0.05
atoms = [
    { serial = 10, name = "C1", element = "C", residue = "MOH", chain = "A", residue-number = 501, position = [0.0, 0.0, 0.0] },
    { serial = 11, name = "O2", element = "O", residue = "MOH", chain = "A", residue-number = 501, position = [1.43, 0.0, 0.0] },
]
pairing = [[1, 10]]
"#;

    fn args(input: PathBuf, output: PathBuf) -> ValidateArgs {
        ValidateArgs {
            input,
            output,
            config: None,
            max_ring_length: None,
            hydrogen_bonding_radius: None,
            min_bond_length: None,
            planarity_threshold: None,
            keep_hydrogens: false,
            no_substitutions: false,
            candidate_parallelism: Some(1),
            model_parallelism: Some(1),
            set_values: vec![],
        }
    }

    #[test]
    fn validate_writes_reports() {
        let dir = tempdir().unwrap();
        let job_path = dir.path().join("job.toml");
        fs::write(&job_path, JOB).unwrap();
        let out = dir.path().join("reports");

        run(args(job_path, out.clone()), false).unwrap();

        for name in ["results.csv", "summary.csv", "pairing_MOH.csv", "messages.csv"] {
            assert!(out.join(name).is_file(), "{name} missing");
        }
        let results = fs::read_to_string(out.join("results.csv")).unwrap();
        let row = results.lines().nth(1).unwrap();
        assert!(row.starts_with("MOH,1abc_MOH_501_A,Validated,"));
        assert!(row.contains("HasAll_NameMismatch"));
    }

    #[test]
    fn missing_job_file_is_reported() {
        let dir = tempdir().unwrap();
        let result = run(
            args(dir.path().join("absent.toml"), dir.path().join("out")),
            false,
        );
        assert!(matches!(result, Err(CliError::Job(_))));
    }
}
