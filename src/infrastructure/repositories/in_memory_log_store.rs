//! In-memory log store implementation
//!
//! Holds the run-log documents and the feedback document in memory,
//! applying the same retention semantics as the real collection: trimming
//! keeps the most recent documents, feedback replacement deletes the
//! previous document first.

use std::sync::Mutex;

use serde_json::Value;

use crate::domain::errors::PlanningError;
use crate::domain::repositories::LogStore;

/// In-memory implementation of the LogStore trait
#[derive(Default)]
pub struct InMemoryLogStore {
    run_logs: Mutex<Vec<Value>>,
    feedback: Mutex<Option<Value>>,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored run-log documents, oldest first.
    pub fn run_logs(&self) -> Vec<Value> {
        self.run_logs
            .lock()
            .map(|logs| logs.clone())
            .unwrap_or_default()
    }

    /// The current feedback document, if one was written.
    pub fn feedback(&self) -> Option<Value> {
        self.feedback.lock().ok().and_then(|doc| doc.clone())
    }
}

impl LogStore for InMemoryLogStore {
    fn write_run_log(&self, document: Value) -> Result<(), PlanningError> {
        self.run_logs
            .lock()
            .map_err(|_| PlanningError::Cleanup("log store lock poisoned".to_string()))?
            .push(document);
        Ok(())
    }

    fn trim_run_logs(&self, keep: usize) -> Result<usize, PlanningError> {
        let mut logs = self
            .run_logs
            .lock()
            .map_err(|_| PlanningError::Cleanup("log store lock poisoned".to_string()))?;
        if logs.len() <= keep {
            return Ok(0);
        }
        let removed = logs.len() - keep;
        logs.drain(..removed);
        Ok(removed)
    }

    fn replace_feedback(&self, document: Option<Value>) -> Result<(), PlanningError> {
        let mut feedback = self
            .feedback
            .lock()
            .map_err(|_| PlanningError::Cleanup("log store lock poisoned".to_string()))?;
        *feedback = document;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trim_keeps_most_recent() {
        let store = InMemoryLogStore::new();
        for i in 0..12 {
            store.write_run_log(json!({"run": i})).unwrap();
        }

        let removed = store.trim_run_logs(9).unwrap();
        assert_eq!(removed, 3);

        let logs = store.run_logs();
        assert_eq!(logs.len(), 9);
        assert_eq!(logs[0]["run"], 3);
        assert_eq!(logs[8]["run"], 11);
    }

    #[test]
    fn test_trim_below_threshold_is_noop() {
        let store = InMemoryLogStore::new();
        store.write_run_log(json!({"run": 0})).unwrap();
        assert_eq!(store.trim_run_logs(9).unwrap(), 0);
        assert_eq!(store.run_logs().len(), 1);
    }

    #[test]
    fn test_feedback_is_replaced() {
        let store = InMemoryLogStore::new();
        store
            .replace_feedback(Some(json!({"1": "first"})))
            .unwrap();
        store
            .replace_feedback(Some(json!({"1": "second"})))
            .unwrap();

        assert_eq!(store.feedback().unwrap()["1"], "second");
    }
}
