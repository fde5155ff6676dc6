/// Error types: fatal render errors and the recoverable error collector.
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use crate::core::data::DataError;
use crate::core::templates::TemplateError;
use crate::schema::condition::ConditionKind;
use crate::schema::template::RenderingEngineKind;

/// Configuration errors that abort a whole render call.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no resolver registered for {kind:?} with the {engine:?} engine")]
    NoResolver {
        kind: ConditionKind,
        engine: RenderingEngineKind,
    },
    #[error("payload of {kind:?} condition could not be decoded: {source}")]
    PayloadDecode {
        kind: ConditionKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("data access error: {0}")]
    Data(#[from] DataError),
    #[error("structured template rendering failed: {0}")]
    Structured(String),
    #[error("renderer misconfigured: {0}")]
    Configuration(String),
}

/// Category of a recoverable export error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportErrorKind {
    ReferencedEntityNotFound,
    FieldNotFound,
    UnknownOperator,
    UnknownState,
    UnknownConditionKind,
    DailyRoutineEventNotFound,
}

/// A recoverable problem found while rendering. The render goes on and the
/// offending condition renders as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub kind: ExportErrorKind,
    /// Where the error happened, e.g. the dialogue being exported.
    pub context: String,
    pub message: String,
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "{:?}: {}", self.kind, self.message)
        } else {
            write!(f, "[{}] {:?}: {}", self.context, self.kind, self.message)
        }
    }
}

#[derive(Debug, Default)]
struct CollectorState {
    entries: Vec<ErrorEntry>,
    context: Vec<String>,
}

/// Collects recoverable errors for one top-level render call.
///
/// Shared by reference through every nested render. Appends go through a
/// mutex and keep insertion order, so `record` is safe from any thread.
/// The context stack is not per thread: concurrent renders that push
/// context each need their own collector.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    state: Mutex<CollectorState>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CollectorState> {
        // A panic while holding the lock cannot leave the entry list half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records an error tagged with the current context.
    pub fn record(&self, kind: ExportErrorKind, message: impl Into<String>) {
        let mut state = self.lock();
        let entry = ErrorEntry {
            kind,
            context: state.context.join(" > "),
            message: message.into(),
        };
        warn!("export error: {}", entry);
        state.entries.push(entry);
    }

    pub fn push_context(&self, context: impl Into<String>) {
        self.lock().context.push(context.into());
    }

    pub fn pop_context(&self) {
        self.lock().context.pop();
    }

    /// Runs `f` with `context` pushed onto the context stack.
    pub fn with_context<T>(&self, context: impl Into<String>, f: impl FnOnce() -> T) -> T {
        self.push_context(context);
        let result = f();
        self.pop_context();
        result
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// A snapshot of the recorded entries, in insertion order.
    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.lock().entries.clone()
    }

    pub fn count(&self, kind: ExportErrorKind) -> usize {
        self.lock().entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn into_entries(self) -> Vec<ErrorEntry> {
        self.state
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let errors = ErrorCollector::new();
        errors.record(ExportErrorKind::UnknownOperator, "first");
        errors.record(ExportErrorKind::FieldNotFound, "second");
        let entries = errors.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[1].kind, ExportErrorKind::FieldNotFound);
    }

    #[test]
    fn records_from_several_threads() {
        let errors = ErrorCollector::new();
        std::thread::scope(|scope| {
            for worker in 0..4 {
                let errors = &errors;
                scope.spawn(move || {
                    for i in 0..25 {
                        errors.record(ExportErrorKind::FieldNotFound, format!("{}-{}", worker, i));
                    }
                });
            }
        });
        assert_eq!(errors.count(ExportErrorKind::FieldNotFound), 100);
        assert!(errors.entries().iter().all(|e| e.context.is_empty()));
    }

    #[test]
    fn context_is_scoped() {
        let errors = ErrorCollector::new();
        errors.with_context("Dialog Anna", || {
            errors.with_context("Node 3", || {
                errors.record(ExportErrorKind::UnknownState, "inner");
            });
            errors.record(ExportErrorKind::UnknownState, "outer");
        });
        errors.record(ExportErrorKind::UnknownState, "none");

        let entries = errors.entries();
        assert_eq!(entries[0].context, "Dialog Anna > Node 3");
        assert_eq!(entries[1].context, "Dialog Anna");
        assert_eq!(entries[2].context, "");
    }

    #[test]
    fn count_by_kind() {
        let errors = ErrorCollector::new();
        errors.record(ExportErrorKind::ReferencedEntityNotFound, "a");
        errors.record(ExportErrorKind::ReferencedEntityNotFound, "b");
        errors.record(ExportErrorKind::UnknownOperator, "c");
        assert_eq!(errors.count(ExportErrorKind::ReferencedEntityNotFound), 2);
        assert_eq!(errors.len(), 3);
        assert!(!errors.is_empty());
    }

    #[test]
    fn display_includes_context() {
        let entry = ErrorEntry {
            kind: ExportErrorKind::FieldNotFound,
            context: "Quest".to_string(),
            message: "field Health missing".to_string(),
        };
        assert_eq!(
            entry.to_string(),
            "[Quest] FieldNotFound: field Health missing"
        );
    }

    #[test]
    fn collector_is_shareable_across_threads() {
        let errors = ErrorCollector::new();
        std::thread::scope(|scope| {
            for i in 0..4 {
                let errors = &errors;
                scope.spawn(move || {
                    errors.record(ExportErrorKind::UnknownOperator, format!("thread {}", i));
                });
            }
        });
        assert_eq!(errors.into_entries().len(), 4);
    }
}
