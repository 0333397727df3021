use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What a message is about: the model itself or one of its candidates.
///
/// Model messages sort before every candidate and never share a slot with a candidate,
/// whatever the candidate's id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Model,
    Candidate(String),
}

impl Scope {
    /// The report key: the candidate id, or empty for the model.
    pub fn key(&self) -> &str {
        match self {
            Self::Model => "",
            Self::Candidate(id) => id,
        }
    }
}

impl From<&str> for Scope {
    fn from(id: &str) -> Self {
        Self::Candidate(id.to_string())
    }
}

impl From<&String> for Scope {
    fn from(id: &String) -> Self {
        Self::Candidate(id.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

/// Warning and error manifest of one model, by [`Scope`].
///
/// Workers analysing candidates in parallel append to it concurrently; every
/// read-modify-write happens under the lock. A scope has at most one error, the last one
/// recorded.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Mutex<BTreeMap<Scope, Vec<String>>>,
    errors: Mutex<BTreeMap<Scope, String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking writer leaves the maps structurally intact.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&self, scope: impl Into<Scope>, message: impl Into<String>) {
        lock(&self.warnings)
            .entry(scope.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_warnings<I, S>(&self, scope: impl Into<Scope>, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut messages = messages.into_iter().map(Into::into).peekable();
        if messages.peek().is_none() {
            return;
        }
        lock(&self.warnings)
            .entry(scope.into())
            .or_default()
            .extend(messages);
    }

    pub fn set_error(&self, scope: impl Into<Scope>, message: impl Into<String>) {
        lock(&self.errors).insert(scope.into(), message.into());
    }

    pub fn has_error(&self, scope: impl Into<Scope>) -> bool {
        lock(&self.errors).contains_key(&scope.into())
    }

    pub fn warnings(&self) -> BTreeMap<Scope, Vec<String>> {
        lock(&self.warnings).clone()
    }

    pub fn errors(&self) -> BTreeMap<Scope, String> {
        lock(&self.errors).clone()
    }

    pub fn warnings_for(&self, scope: impl Into<Scope>) -> Vec<String> {
        lock(&self.warnings)
            .get(&scope.into())
            .cloned()
            .unwrap_or_default()
    }

    pub fn error_for(&self, scope: impl Into<Scope>) -> Option<String> {
        lock(&self.errors).get(&scope.into()).cloned()
    }

    pub fn error_count(&self) -> usize {
        lock(&self.errors).len()
    }

    /// Every message as `(scope, severity, message)`: the model first, then candidates by
    /// id, errors after warnings within a scope.
    pub fn entries(&self) -> Vec<(Scope, Severity, String)> {
        let warnings = self.warnings();
        let errors = self.errors();
        let mut entries: Vec<_> = warnings
            .into_iter()
            .flat_map(|(scope, messages)| {
                messages
                    .into_iter()
                    .map(move |m| (scope.clone(), Severity::Warning, m))
            })
            .chain(
                errors
                    .into_iter()
                    .map(|(scope, m)| (scope, Severity::Error, m)),
            )
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn candidate(id: &str) -> Scope {
        Scope::Candidate(id.to_string())
    }

    #[test]
    fn warnings_accumulate_per_scope_in_order() {
        let diagnostics = Diagnostics::new();
        diagnostics.add_warning("c1", "first");
        diagnostics.add_warnings("c1", ["second", "third"]);
        diagnostics.add_warnings::<_, String>("c2", Vec::new());
        assert_eq!(diagnostics.warnings_for("c1"), vec!["first", "second", "third"]);
        assert!(!diagnostics.warnings().contains_key(&candidate("c2")));
    }

    #[test]
    fn last_error_wins() {
        let diagnostics = Diagnostics::new();
        diagnostics.set_error("c1", "boom");
        diagnostics.set_error("c1", "bang");
        assert!(diagnostics.has_error("c1"));
        assert_eq!(diagnostics.error_for("c1").as_deref(), Some("bang"));
        assert_eq!(diagnostics.error_count(), 1);
    }

    #[test]
    fn candidate_named_model_keeps_its_own_slot() {
        let diagnostics = Diagnostics::new();
        diagnostics.set_error(Scope::Model, "Model graph is not connected");
        diagnostics.add_warning(Scope::Model, "Duplicate candidate 'x' ignored.");
        diagnostics.set_error("model", "Candidate failed");
        diagnostics.add_warning("model", "Suspicious declared bond");

        assert_eq!(
            diagnostics.error_for(Scope::Model).as_deref(),
            Some("Model graph is not connected")
        );
        assert_eq!(diagnostics.warnings_for(Scope::Model).len(), 1);
        assert_eq!(
            diagnostics.error_for("model").as_deref(),
            Some("Candidate failed")
        );
        assert_eq!(diagnostics.error_count(), 2);
        assert_eq!(Scope::Model.key(), "");
        assert_eq!(candidate("model").key(), "model");
    }

    #[test]
    fn concurrent_writers_do_not_lose_messages() {
        let diagnostics = Arc::new(Diagnostics::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let diagnostics = Arc::clone(&diagnostics);
                thread::spawn(move || {
                    for i in 0..50 {
                        diagnostics.add_warning(Scope::Model, format!("{t}-{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(diagnostics.warnings_for(Scope::Model).len(), 400);
    }

    #[test]
    fn entries_put_the_model_first_and_warnings_before_errors() {
        let diagnostics = Diagnostics::new();
        diagnostics.set_error("b", "failed");
        diagnostics.add_warning("b", "odd");
        diagnostics.add_warning("a", "close residues");
        diagnostics.add_warning(Scope::Model, "duplicate");
        let entries = diagnostics.entries();
        assert_eq!(
            entries,
            vec![
                (Scope::Model, Severity::Warning, "duplicate".to_string()),
                (candidate("a"), Severity::Warning, "close residues".to_string()),
                (candidate("b"), Severity::Warning, "odd".to_string()),
                (candidate("b"), Severity::Error, "failed".to_string()),
            ]
        );
    }
}
