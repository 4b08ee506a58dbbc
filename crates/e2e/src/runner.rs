//! Scenario runner: one task, one context and one aggregator per scenario

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use cinebook_common::RandomSelector;

use crate::api::BookingApi;
use crate::artifacts::DiagnosticSink;
use crate::config::SamplingConfig;
use crate::context::ScenarioContext;
use crate::error::{E2eError, E2eResult};
use crate::report::RunReport;
use crate::verify::{VerificationAggregator, VerificationOutcome};

/// A test scenario driven against the booking backend
#[async_trait]
pub trait Scenario: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn tags(&self) -> &[&'static str] {
        &[]
    }

    /// Fetch and parse failures should propagate; checks go through `ctx.checks()`
    async fn run(&self, ctx: &mut ScenarioContext) -> E2eResult<()>;
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub seed: u64,
    pub duration_ms: u64,
    pub outcomes: Vec<VerificationOutcome>,
    pub error: Option<String>,
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub run_id: String,
    pub seed: u64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

/// Configuration for the scenario runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub sampling: SamplingConfig,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

pub struct ScenarioRunner {
    api: Arc<dyn BookingApi>,
    diagnostics: Arc<dyn DiagnosticSink>,
    report: Arc<RunReport>,
    sampling: SamplingConfig,
    seed: u64,
    output_dir: PathBuf,
}

impl ScenarioRunner {
    pub fn new(
        api: Arc<dyn BookingApi>,
        diagnostics: Arc<dyn DiagnosticSink>,
        config: RunnerConfig,
    ) -> Self {
        let seed = config
            .sampling
            .seed
            .unwrap_or_else(|| RandomSelector::from_entropy().seed());
        Self {
            api,
            diagnostics,
            report: Arc::new(RunReport::new()),
            sampling: config.sampling,
            seed,
            output_dir: config.output_dir,
        }
    }

    /// Run seed; pass it back through the config to replay a run
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn report(&self) -> Arc<RunReport> {
        self.report.clone()
    }

    /// Run scenarios carrying `tag`
    pub async fn run_tagged(
        &self,
        scenarios: &[Arc<dyn Scenario>],
        tag: &str,
    ) -> E2eResult<SuiteResult> {
        let filtered: Vec<Arc<dyn Scenario>> = scenarios
            .iter()
            .filter(|s| s.tags().iter().any(|t| *t == tag))
            .cloned()
            .collect();
        self.run_all(&filtered).await
    }

    /// Run one scenario by name
    pub async fn run_named(
        &self,
        scenarios: &[Arc<dyn Scenario>],
        name: &str,
    ) -> E2eResult<SuiteResult> {
        let scenario = scenarios
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| E2eError::ScenarioNotFound(name.to_string()))?;
        self.run_all(&[scenario]).await
    }

    /// Run scenarios concurrently, each on its own task
    pub async fn run_all(&self, scenarios: &[Arc<dyn Scenario>]) -> E2eResult<SuiteResult> {
        let start = Instant::now();
        info!("Running {} scenario(s) with seed {}...", scenarios.len(), self.seed);

        let handles: Vec<_> = scenarios
            .iter()
            .map(|scenario| {
                let ctx = self.context_for(scenario.name());
                let scenario = scenario.clone();
                tokio::spawn(execute(scenario, ctx))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (handle, scenario) in handles.into_iter().zip(scenarios) {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => ScenarioResult {
                    name: scenario.name().to_string(),
                    success: false,
                    seed: scenario_seed(self.seed, scenario.name()),
                    duration_ms: 0,
                    outcomes: Vec::new(),
                    error: Some(format!("scenario task aborted: {}", e)),
                },
            };

            if result.success {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let passed = results.iter().filter(|r| r.success).count();
        let failed = results.len() - passed;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Scenario results: {} passed, {} failed ({} ms, seed {})",
            passed, failed, duration_ms, self.seed
        );

        Ok(SuiteResult {
            run_id: uuid::Uuid::new_v4().to_string(),
            seed: self.seed,
            total: results.len(),
            passed,
            failed,
            duration_ms,
            results,
        })
    }

    fn context_for(&self, name: &str) -> ScenarioContext {
        let checks = VerificationAggregator::new(name, self.diagnostics.clone())
            .with_reporter(self.report.clone());
        ScenarioContext::new(
            name,
            self.api.clone(),
            RandomSelector::seeded(scenario_seed(self.seed, name)),
            self.sampling.clone(),
            checks,
        )
    }

    /// Write suite results to JSON file
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

async fn execute(scenario: Arc<dyn Scenario>, mut ctx: ScenarioContext) -> ScenarioResult {
    let start = Instant::now();
    let name = ctx.name().to_string();
    let seed = ctx.selector().seed();
    debug!("Running scenario: {}", name);

    let run_result = scenario.run(&mut ctx).await;
    let (outcomes, verification_error) = ctx.into_checks().finish();

    let error = match (run_result, verification_error) {
        (Ok(()), None) => None,
        (Ok(()), Some(verification)) => Some(verification.to_string()),
        (Err(e), None) => Some(e.to_string()),
        (Err(e), Some(verification)) => Some(format!("{}\n{}", e, verification)),
    };

    ScenarioResult {
        name,
        success: error.is_none(),
        seed,
        duration_ms: start.elapsed().as_millis() as u64,
        outcomes,
        error,
    }
}

/// Per-scenario seed so one scenario's draws do not depend on another's
pub fn scenario_seed(run_seed: u64, scenario: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(run_seed.to_le_bytes());
    hasher.update(scenario.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
