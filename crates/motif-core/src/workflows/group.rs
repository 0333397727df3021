use super::validate::analyze_candidate;
use crate::core::io::job::CandidateInput;
use crate::core::io::report::SummaryRow;
use crate::core::topology::connectivity::is_connected;
use crate::engine::config::ValidationConfig;
use crate::engine::diagnostics::Scope;
use crate::engine::error::ValidationError;
use crate::engine::flags::flag_names;
use crate::engine::model::MotifModel;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::result::{ValidationResult, ValidationState};
use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of validating every candidate of one model.
#[derive(Debug, Clone)]
pub struct GroupReport {
    pub model_id: String,
    pub model_name: String,
    /// Every candidate by id. Failed candidates are kept as `NotAnalyzed`.
    pub results: BTreeMap<String, ValidationResult>,
    /// Number of analysed results carrying each flag, in flag table order.
    pub summary: Vec<(&'static str, usize)>,
}

impl GroupReport {
    pub fn analyzed(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.values().filter(|result| result.analyzed)
    }

    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.summary
            .iter()
            .map(|&(flag, count)| SummaryRow {
                model: self.model_id.clone(),
                flag: flag.to_string(),
                count,
            })
            .collect()
    }
}

fn summarize<'a>(results: impl Iterator<Item = &'a ValidationResult>) -> Vec<(&'static str, usize)> {
    let mut counts: BTreeMap<&'static str, usize> = flag_names().map(|name| (name, 0)).collect();
    for result in results {
        for flag in &result.flags {
            if let Some(count) = counts.get_mut(flag) {
                *count += 1;
            }
        }
    }
    flag_names()
        .map(|name| (name, counts.get(name).copied().unwrap_or(0)))
        .collect()
}

/// The pairing matrix of a group: one column per model atom, first with the paired
/// candidate serial and then, past a `-` separator, with the paired candidate name.
///
/// The first row describes the model itself; one row follows per validated candidate.
pub fn pairing_matrix(model: &MotifModel, report: &GroupReport) -> (Vec<String>, Vec<Vec<String>>) {
    let structure = model.structure();
    let atoms: Vec<_> = structure
        .atoms_sorted_by_serial()
        .into_iter()
        .filter_map(|id| structure.atom(id))
        .collect();

    let mut header = vec!["Id".to_string()];
    header.extend(atoms.iter().map(|atom| atom.name.clone()));
    header.push("-".to_string());
    header.extend(atoms.iter().map(|atom| atom.name.clone()));

    let mut model_row = vec![model.id.clone()];
    model_row.extend(atoms.iter().map(|atom| atom.serial.to_string()));
    model_row.push(String::new());
    model_row.extend(atoms.iter().map(|atom| atom.name.clone()));

    let mut rows = vec![model_row];
    for result in report
        .results
        .values()
        .filter(|result| result.state == ValidationState::Validated)
    {
        let mut row = vec![result.id.clone()];
        row.extend(atoms.iter().map(|atom| {
            result
                .pairing
                .get(&atom.serial)
                .map_or_else(|| "-".to_string(), |label| label.serial.to_string())
        }));
        row.push(String::new());
        row.extend(atoms.iter().map(|atom| {
            result
                .pairing
                .get(&atom.serial)
                .map_or_else(|| "-".to_string(), |label| label.name.clone())
        }));
        rows.push(row);
    }
    (header, rows)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|text| text.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Runs `analyze` on one candidate. An error or a panic is filed under the candidate's
/// id and turns into a `NotAnalyzed` result, so one bad candidate never takes its
/// siblings down.
fn analyze_isolated<F>(
    model: &MotifModel,
    candidate: &CandidateInput,
    reporter: &ProgressReporter,
    analyze: &F,
) -> ValidationResult
where
    F: Fn(&CandidateInput) -> Result<ValidationResult, ValidationError> + Sync,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| analyze(candidate))).unwrap_or_else(
        |payload| {
            Err(ValidationError::Internal(format!(
                "analysis panicked: {}",
                panic_message(payload.as_ref())
            )))
        },
    );
    let result = match outcome {
        Ok(result) => result,
        Err(error) => {
            warn!(candidate = %candidate.id, %error, "Candidate could not be analysed");
            model.diagnostics().set_error(&candidate.id, error.to_string());
            let mut result = ValidationResult::unvalidated(
                &model.id,
                &candidate.id,
                ValidationState::NotAnalyzed,
                Vec::new(),
            );
            result.finalize(model.chiral_categories());
            result
        }
    };
    reporter.report(Progress::TaskIncrement);
    result
}

/// Validates every candidate of `model`.
///
/// Candidates run on a pool bounded by `config.candidate_parallelism`. A candidate id seen
/// twice is analysed once. A candidate whose analysis fails has its error filed under its
/// id in the model's diagnostics and does not count towards the summary; a panic inside
/// one candidate's analysis is caught and recorded the same way.
///
/// # Errors
///
/// Returns [`ValidationError::ModelNotConnected`] without analysing anything when the
/// model's heavy-atom graph is disconnected; the message is also filed under
/// [`Scope::Model`]. Returns [`ValidationError::Internal`] if the thread pool cannot be built.
#[instrument(skip_all, name = "validate_group", fields(model = %model.id))]
pub fn analyze_group(
    model: &MotifModel,
    candidates: &[&CandidateInput],
    config: &ValidationConfig,
    reporter: &ProgressReporter,
) -> Result<GroupReport, ValidationError> {
    analyze_group_with(model, candidates, config, reporter, &|candidate| {
        analyze_candidate(model, candidate, config)
    })
}

fn analyze_group_with<F>(
    model: &MotifModel,
    candidates: &[&CandidateInput],
    config: &ValidationConfig,
    reporter: &ProgressReporter,
    analyze: &F,
) -> Result<GroupReport, ValidationError>
where
    F: Fn(&CandidateInput) -> Result<ValidationResult, ValidationError> + Sync,
{
    if !is_connected(model.structure(), true) {
        let error = ValidationError::ModelNotConnected {
            model: model.id.clone(),
        };
        warn!(%error, "Model aborted");
        model.diagnostics().set_error(Scope::Model, error.to_string());
        return Err(error);
    }

    let mut seen = HashSet::new();
    let unique: Vec<&CandidateInput> = candidates
        .iter()
        .copied()
        .filter(|candidate| {
            let first = seen.insert(candidate.id.as_str());
            if !first {
                model.diagnostics().add_warning(
                    Scope::Model,
                    format!("Duplicate candidate '{}' ignored.", candidate.id),
                );
            }
            first
        })
        .collect();

    reporter.report(Progress::PhaseStart {
        name: format!("Validating {}", model.name),
    });
    reporter.report(Progress::TaskStart {
        total_steps: unique.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let results: Vec<ValidationResult> = unique
        .iter()
        .map(|candidate| analyze_isolated(model, candidate, reporter, analyze))
        .collect();

    #[cfg(feature = "parallel")]
    let results: Vec<ValidationResult> = {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.candidate_parallelism.max(1))
            .build()
            .map_err(|e| ValidationError::Internal(format!("candidate pool: {e}")))?;
        pool.install(|| {
            unique
                .par_iter()
                .map(|candidate| analyze_isolated(model, candidate, reporter, analyze))
                .collect()
        })
    };

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let results: BTreeMap<String, ValidationResult> = results
        .into_iter()
        .map(|result| (result.id.clone(), result))
        .collect();
    let summary = summarize(results.values().filter(|result| result.analyzed));

    info!(
        candidates = results.len(),
        failed = model.diagnostics().error_count(),
        "Model group validated"
    );

    Ok(GroupReport {
        model_id: model.id.clone(),
        model_name: model.name.clone(),
        results,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::fixtures::{candidate, model, pyranose, structure};
    use std::sync::Mutex;

    fn count(report: &GroupReport, flag: &str) -> usize {
        report
            .summary
            .iter()
            .find(|(name, _)| *name == flag)
            .map_or(0, |&(_, count)| count)
    }

    #[test]
    fn group_summarises_analysed_candidates() {
        let model = model();
        let good = candidate(&model, "c1", &pyranose(100, 1.1), &[(1, 101)]);
        let mirrored = candidate(&model, "c2", &pyranose(200, -1.1), &[(1, 201), (2, 202)]);
        let broken = candidate(&model, "c3", &pyranose(300, 1.1), &[(1, 301), (2, 301)]);
        let config = ValidationConfig::default();

        let report = analyze_group(
            &model,
            &[&good, &mirrored, &broken],
            &config,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results["c3"].state, ValidationState::NotAnalyzed);
        assert_eq!(report.analyzed().count(), 2);
        assert_eq!(count(&report, "Analyzed"), 2);
        assert_eq!(count(&report, "HasAll"), 2);
        assert_eq!(count(&report, "HasAll_GoodChirality"), 1);
        assert_eq!(count(&report, "HasAll_BadChirality"), 1);
        assert_eq!(count(&report, "NotAnalyzed"), 0);
        assert_eq!(report.summary.len(), flag_names().count());
        assert!(model.diagnostics().has_error("c3"));
        assert!(!model.diagnostics().has_error("c1"));
    }

    #[test]
    fn duplicate_candidates_are_analysed_once() {
        let model = model();
        let first = candidate(&model, "dup", &pyranose(100, 1.1), &[(1, 101)]);
        let second = candidate(&model, "dup", &pyranose(100, -1.1), &[(1, 101)]);
        let report = analyze_group(
            &model,
            &[&first, &second],
            &ValidationConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(report.results.len(), 1);
        assert!(report.results["dup"].chirality_mismatches.is_empty());
        assert_eq!(
            model.diagnostics().warnings_for(Scope::Model),
            vec!["Duplicate candidate 'dup' ignored."]
        );
    }

    #[test]
    fn disconnected_model_aborts_the_group() {
        let mut atoms = pyranose(0, 1.1);
        atoms[6].3 = [9.0, 9.0, 9.0];
        let model = MotifModel::builder("PYR", "PYR", structure("PYR", "PYR", &atoms))
            .build(&ValidationConfig::default());
        let input = candidate(&model, "c1", &pyranose(100, 1.1), &[(1, 101)]);

        let error = analyze_group(
            &model,
            &[&input],
            &ValidationConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(error, ValidationError::ModelNotConnected { .. }));
        assert_eq!(
            model.diagnostics().error_for(Scope::Model).unwrap(),
            "Model graph is not connected and will not be analyzed. Likely cause: Misplaced and/or missing atoms."
        );
    }

    #[test]
    fn pairing_matrix_lists_model_then_validated_candidates() {
        let model = model();
        let atoms: Vec<_> = pyranose(100, 1.1)
            .into_iter()
            .filter(|&(serial, ..)| serial != 107)
            .collect();
        let partial = candidate(&model, "b", &atoms, &[(1, 101)]);
        let full = candidate(&model, "a", &pyranose(200, 1.1), &[(1, 201)]);
        let report = analyze_group(
            &model,
            &[&partial, &full],
            &ValidationConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        let (header, rows) = pairing_matrix(&model, &report);
        assert_eq!(
            header,
            vec![
                "Id", "C1", "C2", "C3", "C4", "C5", "O5", "O1", "-", "C1", "C2", "C3", "C4", "C5",
                "O5", "O1"
            ]
        );
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][..9], ["PYR", "1", "2", "3", "4", "5", "6", "7", ""]);
        assert_eq!(rows[1][0], "a");
        assert_eq!(rows[2][0], "b");
        assert_eq!(rows[2][7], "-");
        assert_eq!(rows[2][15], "-");
        assert_eq!(rows[2][9], "C1");
    }

    #[test]
    fn panicking_candidate_does_not_take_down_its_siblings() {
        let model = model();
        let inputs: Vec<_> = ["c1", "bad", "c2"]
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let base = 100 * (i as i32 + 1);
                candidate(&model, id, &pyranose(base, 1.1), &[(1, base + 1)])
            })
            .collect();
        let refs: Vec<_> = inputs.iter().collect();
        let config = ValidationConfig {
            candidate_parallelism: 2,
            ..ValidationConfig::default()
        };
        let increments = Mutex::new(0usize);
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if matches!(event, Progress::TaskIncrement) {
                *increments.lock().unwrap() += 1;
            }
        }));

        let report = analyze_group_with(&model, &refs, &config, &reporter, &|input| {
            if input.id == "bad" {
                panic!("ring perception blew up");
            }
            analyze_candidate(&model, input, &config)
        })
        .unwrap();
        drop(reporter);

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results["c1"].state, ValidationState::Validated);
        assert_eq!(report.results["c2"].state, ValidationState::Validated);
        assert_eq!(report.results["bad"].state, ValidationState::NotAnalyzed);
        assert_eq!(count(&report, "Analyzed"), 2);
        assert_eq!(
            model.diagnostics().error_for("bad").unwrap(),
            "Internal logic error: analysis panicked: ring perception blew up"
        );
        assert!(!model.diagnostics().has_error("c1"));
        assert_eq!(increments.into_inner().unwrap(), 3);
    }

    #[test]
    fn progress_counts_every_candidate() {
        let model = model();
        let inputs: Vec<_> = (0..4)
            .map(|i| candidate(&model, &format!("c{i}"), &pyranose(100, 1.1), &[(1, 101)]))
            .collect();
        let refs: Vec<_> = inputs.iter().collect();
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));

        analyze_group(&model, &refs, &ValidationConfig::default(), &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        let increments = events
            .iter()
            .filter(|e| matches!(e, Progress::TaskIncrement))
            .count();
        assert_eq!(increments, 4);
        assert!(matches!(&events[0], Progress::PhaseStart { name } if name == "Validating PYR"));
        assert!(matches!(events.last(), Some(Progress::PhaseFinish)));
    }
}
