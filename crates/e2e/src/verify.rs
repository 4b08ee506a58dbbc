//! Soft assertions: record every check, fail once at the end
//!
//! A [`VerificationAggregator`] belongs to exactly one scenario execution.
//! Failed checks capture a diagnostic artifact immediately but do not stop
//! the scenario; [`VerificationAggregator::flush`] consumes the aggregator
//! and reports every failure together.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::artifacts::{ArtifactRef, DiagnosticSink};
use crate::error::{E2eError, E2eResult};
use crate::report::ReportSink;

/// Result of a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub description: String,
    pub passed: bool,
    pub actual_value: Option<String>,
    pub expected_value: Option<String>,
    pub diagnostic_artifact: Option<ArtifactRef>,
}

impl VerificationOutcome {
    /// Failure message including compared values when present
    pub fn message(&self) -> String {
        match (&self.actual_value, &self.expected_value) {
            (Some(actual), Some(expected)) => format!(
                "{} (expected: {}, actual: {})",
                self.description, expected, actual
            ),
            _ => self.description.clone(),
        }
    }
}

pub struct VerificationAggregator {
    scenario: String,
    diagnostics: Arc<dyn DiagnosticSink>,
    reporter: Option<Arc<dyn ReportSink>>,
    outcomes: Vec<VerificationOutcome>,
}

impl VerificationAggregator {
    pub fn new(scenario: impl Into<String>, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            scenario: scenario.into(),
            diagnostics,
            reporter: None,
            outcomes: Vec::new(),
        }
    }

    /// Forward every outcome to `reporter` as it is recorded
    pub fn with_reporter(mut self, reporter: Arc<dyn ReportSink>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Outcomes recorded so far, in call order
    pub fn outcomes(&self) -> &[VerificationOutcome] {
        &self.outcomes
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }

    /// Record a boolean check. Returns `condition`.
    pub async fn record_boolean(&mut self, condition: bool, description: &str) -> bool {
        self.record(condition, description, None, None).await;
        condition
    }

    /// Record an equality check; `None == None` passes. Returns whether it passed.
    pub async fn record_equals<T>(&mut self, actual: &T, expected: &T, description: &str) -> bool
    where
        T: PartialEq + Debug + ?Sized,
    {
        let passed = actual == expected;
        self.record(
            passed,
            description,
            Some(format!("{:?}", actual)),
            Some(format!("{:?}", expected)),
        )
        .await;
        passed
    }

    async fn record(
        &mut self,
        passed: bool,
        description: &str,
        actual_value: Option<String>,
        expected_value: Option<String>,
    ) {
        let diagnostic_artifact = if passed {
            debug!("[{}] PASS {}", self.scenario, description);
            None
        } else {
            self.capture().await
        };

        let outcome = VerificationOutcome {
            description: description.to_string(),
            passed,
            actual_value,
            expected_value,
            diagnostic_artifact,
        };
        if !passed {
            warn!("[{}] FAIL {}", self.scenario, outcome.message());
        }
        if let Some(reporter) = &self.reporter {
            reporter.record_outcome(&self.scenario, &outcome.message(), passed);
        }
        self.outcomes.push(outcome);
    }

    async fn capture(&self) -> Option<ArtifactRef> {
        match self.diagnostics.capture_artifact(&self.scenario).await {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                warn!("[{}] Could not capture diagnostic artifact: {}", self.scenario, e);
                None
            }
        }
    }

    /// Close the aggregator. Fails with every recorded failure if any check failed.
    pub fn flush(self) -> E2eResult<Vec<VerificationOutcome>> {
        let failures: Vec<String> = self
            .outcomes
            .iter()
            .filter(|o| !o.passed)
            .map(VerificationOutcome::message)
            .collect();

        if failures.is_empty() {
            Ok(self.outcomes)
        } else {
            Err(E2eError::AggregateVerification {
                scenario: self.scenario,
                failures,
            })
        }
    }

    /// Like [`flush`](Self::flush) but keeps the outcomes when checks failed
    pub fn finish(self) -> (Vec<VerificationOutcome>, Option<E2eError>) {
        let outcomes = self.outcomes.clone();
        match self.flush() {
            Ok(outcomes) => (outcomes, None),
            Err(e) => (outcomes, Some(e)),
        }
    }
}
