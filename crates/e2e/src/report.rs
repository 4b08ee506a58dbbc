//! Reporting sink for individual check outcomes

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Fire-and-forget receiver of check outcomes
pub trait ReportSink: Send + Sync {
    fn record_outcome(&self, scenario: &str, description: &str, passed: bool);
}

/// One reported check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedOutcome {
    pub scenario: String,
    pub description: String,
    pub passed: bool,
}

/// In-memory report shared by every scenario of a run
#[derive(Debug, Default)]
pub struct RunReport {
    entries: Mutex<Vec<ReportedOutcome>>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far, in arrival order
    pub fn entries(&self) -> Vec<ReportedOutcome> {
        self.entries.lock().clone()
    }

    pub fn entries_for(&self, scenario: &str) -> Vec<ReportedOutcome> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.scenario == scenario)
            .cloned()
            .collect()
    }
}

impl ReportSink for RunReport {
    fn record_outcome(&self, scenario: &str, description: &str, passed: bool) {
        self.entries.lock().push(ReportedOutcome {
            scenario: scenario.to_string(),
            description: description.to_string(),
            passed,
        });
    }
}
