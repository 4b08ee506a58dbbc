//! Error types for the E2E engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error(
        "No matching entity: nothing satisfied threshold {threshold} (relaxed to {relaxed_to:?})"
    )]
    NoMatch {
        threshold: u32,
        relaxed_to: Option<u32>,
    },

    #[error(
        "{} verification failure(s) in scenario '{scenario}':\n{}",
        .failures.len(),
        bullet_list(.failures)
    )]
    AggregateVerification {
        scenario: String,
        failures: Vec<String>,
    },

    #[error(transparent)]
    Common(#[from] cinebook_common::Error),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl E2eError {
    /// Whether the error means the remote entity no longer exists
    pub fn is_not_found(&self) -> bool {
        matches!(self, E2eError::NotFound { .. })
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  - {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type E2eResult<T> = Result<T, E2eError>;
