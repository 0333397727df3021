use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use motifval::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 100;

/// Renders library progress events as one job-wide candidate bar on stderr.
///
/// Models analysed concurrently add their candidates to the same bar, so a phase only
/// finishes the bar once every counted candidate is done.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// A handler that draws nothing, for quiet runs.
    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target).with_style(Self::spinner_style());
        Self {
            bar: Arc::new(Mutex::new(bar)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let shared = Arc::clone(&self.bar);

        Box::new(move |event: Progress| {
            let Ok(bar) = shared.lock() else {
                warn!("Progress bar lock was poisoned, dropping progress event.");
                return;
            };
            Self::apply(&bar, event);
        })
    }

    fn apply(bar: &ProgressBar, event: Progress) {
        match event {
            Progress::PhaseStart { name } => {
                if Self::is_idle(bar) {
                    bar.reset();
                    bar.set_length(0);
                    bar.set_style(Self::spinner_style());
                    bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                }
                bar.set_message(name);
            }
            Progress::TaskStart { total_steps } => {
                bar.disable_steady_tick();
                bar.set_style(Self::bar_style());
                bar.inc_length(total_steps);
            }
            Progress::TaskIncrement => bar.inc(1),
            Progress::TaskFinish => {}
            Progress::PhaseFinish => {
                if bar.position() >= bar.length().unwrap_or(0) {
                    bar.disable_steady_tick();
                    bar.finish_with_message("✓ Done");
                }
            }
            Progress::Message(text) => bar.println(format!("  {text}")),
        }
    }

    fn is_idle(bar: &ProgressBar) -> bool {
        bar.is_finished() || bar.length().unwrap_or(0) == 0
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{msg:<24} [{bar:40.cyan/blue}] {pos}/{len} candidates ({elapsed})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn phase(name: &str) -> Progress {
        Progress::PhaseStart {
            name: name.to_string(),
        }
    }

    #[test]
    fn new_handler_has_nothing_counted() {
        let handler = CliProgressHandler::hidden();
        let bar = handler.bar.lock().unwrap();
        assert_eq!(bar.length(), Some(0));
        assert_eq!(bar.position(), 0);
        assert!(!bar.is_finished());
    }

    #[test]
    fn consecutive_models_each_get_a_fresh_bar() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(phase("Validating NAG"));
        callback(Progress::TaskStart { total_steps: 2 });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        callback(Progress::TaskFinish);
        callback(Progress::PhaseFinish);
        {
            let bar = handler.bar.lock().unwrap();
            assert!(bar.is_finished());
            assert_eq!(bar.message(), "✓ Done");
        }

        callback(phase("Validating MAN"));
        callback(Progress::TaskStart { total_steps: 4 });
        callback(Progress::TaskIncrement);
        let bar = handler.bar.lock().unwrap();
        assert!(!bar.is_finished());
        assert_eq!(bar.message(), "Validating MAN");
        assert_eq!(bar.length(), Some(4));
        assert_eq!(bar.position(), 1);
    }

    #[test]
    fn concurrent_models_share_one_bar() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(phase("Validating NAG"));
        callback(Progress::TaskStart { total_steps: 2 });
        callback(phase("Validating MAN"));
        callback(Progress::TaskStart { total_steps: 3 });
        assert_eq!(handler.bar.lock().unwrap().length(), Some(5));

        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        callback(Progress::PhaseFinish);
        assert!(!handler.bar.lock().unwrap().is_finished());

        for _ in 0..3 {
            callback(Progress::TaskIncrement);
        }
        callback(Progress::PhaseFinish);
        let bar = handler.bar.lock().unwrap();
        assert!(bar.is_finished());
        assert_eq!(bar.position(), 5);
    }

    #[test]
    fn callback_can_be_driven_from_worker_threads() {
        let handler = CliProgressHandler::hidden();
        let callback = Arc::new(handler.get_callback());
        callback(phase("Validating NAG"));
        callback(Progress::TaskStart { total_steps: 8 });

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let callback = Arc::clone(&callback);
                thread::spawn(move || {
                    callback(Progress::TaskIncrement);
                    callback(Progress::TaskIncrement);
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        callback(Progress::Message("NAG: 8 candidate(s), 0 error(s)".to_string()));
        callback(Progress::PhaseFinish);

        let bar = handler.bar.lock().unwrap();
        assert_eq!(bar.position(), 8);
        assert!(bar.is_finished());
    }
}
