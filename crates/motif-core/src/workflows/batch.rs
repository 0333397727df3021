use super::group::{GroupReport, analyze_group, pairing_matrix};
use crate::core::io::job::{ModelDefinition, ValidationJob};
use crate::core::io::report::{self, MessageRow, ReportError, ResultRow, SummaryRow};
use crate::engine::config::ValidationConfig;
use crate::engine::error::ValidationError;
use crate::engine::model::MotifModel;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const RESULTS_FILE: &str = "results.csv";
pub const SUMMARY_FILE: &str = "summary.csv";
pub const MESSAGES_FILE: &str = "messages.csv";

/// Everything produced for one model of a job.
#[derive(Debug, Clone)]
pub struct ModelReport {
    pub model_id: String,
    pub model_name: String,
    /// `None` when the model was aborted before any candidate was analysed.
    pub group: Option<GroupReport>,
    pub pairing_header: Vec<String>,
    pub pairing_rows: Vec<Vec<String>>,
    /// The model's warnings and errors, by candidate id.
    pub messages: Vec<MessageRow>,
}

impl ModelReport {
    pub fn pairing_file_name(&self) -> String {
        format!("pairing_{}.csv", self.model_id)
    }
}

/// Outcome of a whole job, with models ordered by id.
#[derive(Debug, Clone, Default)]
pub struct JobReport {
    pub models: Vec<ModelReport>,
}

impl JobReport {
    /// One row per analysed candidate, ordered by model and then candidate id.
    pub fn result_rows(&self) -> Vec<ResultRow> {
        self.models
            .iter()
            .filter_map(|model| model.group.as_ref())
            .flat_map(|group| group.analyzed().map(|result| result.to_row()))
            .collect()
    }

    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.models
            .iter()
            .filter_map(|model| model.group.as_ref())
            .flat_map(GroupReport::summary_rows)
            .collect()
    }

    pub fn message_rows(&self) -> Vec<MessageRow> {
        self.models
            .iter()
            .flat_map(|model| model.messages.iter().cloned())
            .collect()
    }

    pub fn aborted_models(&self) -> impl Iterator<Item = &ModelReport> {
        self.models.iter().filter(|model| model.group.is_none())
    }

    pub fn analyzed_count(&self) -> usize {
        self.models
            .iter()
            .filter_map(|model| model.group.as_ref())
            .map(|group| group.analyzed().count())
            .sum()
    }

    /// Writes every report table into `dir`, creating it if needed.
    ///
    /// Returns the paths written, in the order they were written.
    pub fn write_csv(&self, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
        let mut written = Vec::new();

        let path = dir.join(RESULTS_FILE);
        report::write_rows(&path, &self.result_rows())?;
        written.push(path);

        let path = dir.join(SUMMARY_FILE);
        report::write_rows(&path, &self.summary_rows())?;
        written.push(path);

        for model in self.models.iter().filter(|model| model.group.is_some()) {
            let path = dir.join(model.pairing_file_name());
            report::write_table(&path, &model.pairing_header, &model.pairing_rows)?;
            written.push(path);
        }

        let path = dir.join(MESSAGES_FILE);
        report::write_rows(&path, &self.message_rows())?;
        written.push(path);

        info!(dir = %dir.display(), files = written.len(), "Reports written");
        Ok(written)
    }
}

fn run_model(
    job: &ValidationJob,
    definition: &ModelDefinition,
    config: &ValidationConfig,
    reporter: &ProgressReporter,
) -> Result<ModelReport, ValidationError> {
    let model = MotifModel::from_definition(definition, config);
    let candidates: Vec<_> = job.candidates_for(&definition.id).collect();

    let group = match analyze_group(&model, &candidates, config, reporter) {
        Ok(group) => Some(group),
        Err(ValidationError::ModelNotConnected { .. }) => None,
        Err(other) => return Err(other),
    };
    let (pairing_header, pairing_rows) = group
        .as_ref()
        .map(|group| pairing_matrix(&model, group))
        .unwrap_or_default();

    let messages = model
        .diagnostics()
        .entries()
        .into_iter()
        .map(|(scope, severity, message)| MessageRow {
            scope: model.id.clone(),
            key: scope.key().to_string(),
            severity: severity.as_str().to_string(),
            message,
        })
        .collect();

    reporter.report(Progress::Message(format!(
        "{}: {} candidate(s), {} error(s)",
        model.id,
        candidates.len(),
        model.diagnostics().error_count()
    )));

    Ok(ModelReport {
        model_id: model.id.clone(),
        model_name: model.name.clone(),
        group,
        pairing_header,
        pairing_rows,
        messages,
    })
}

/// Validates every model of `job` against its candidates.
///
/// Models run on a pool bounded by `config.model_parallelism`, each with its own candidate
/// pool. A model whose graph is disconnected is kept in the report without a group, its
/// error in the messages.
///
/// # Errors
///
/// Returns [`ValidationError::Internal`] when a thread pool cannot be built.
#[instrument(skip_all, name = "validate_job", fields(models = job.models.len()))]
pub fn run_job(
    job: &ValidationJob,
    config: &ValidationConfig,
    reporter: &ProgressReporter,
) -> Result<JobReport, ValidationError> {
    info!(
        candidates = job.candidates.len(),
        "Starting validation job"
    );

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Result<ModelReport, ValidationError>> = job
        .models
        .iter()
        .map(|definition| run_model(job, definition, config, reporter))
        .collect();

    #[cfg(feature = "parallel")]
    let outcomes: Vec<Result<ModelReport, ValidationError>> = {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.model_parallelism.max(1))
            .build()
            .map_err(|e| ValidationError::Internal(format!("model pool: {e}")))?;
        pool.install(|| {
            job.models
                .par_iter()
                .map(|definition| run_model(job, definition, config, reporter))
                .collect()
        })
    };

    let mut models = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;
    models.sort_by(|a, b| a.model_id.cmp(&b.model_id));

    let report = JobReport { models };
    info!(
        analyzed = report.analyzed_count(),
        aborted = report.aborted_models().count(),
        "Validation job finished"
    );
    Ok(report)
}
