//! Suite configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};

/// Top-level configuration for a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Booking REST API
    pub api: ApiConfig,

    /// Booking web front-end (screenshots)
    pub web: WebConfig,

    /// Sampling parameters shared by the built-in scenarios
    pub sampling: SamplingConfig,

    /// Output directory for results
    pub output_dir: PathBuf,

    /// Directory for diagnostic artifacts
    pub artifact_dir: PathBuf,
}

/// REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://127.0.0.1:8080/api`
    pub base_url: String,

    /// Header carrying the API token
    pub token_header: String,

    /// API token, sent only when present
    pub token: Option<String>,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api".to_string(),
            token_header: "X-Api-Token".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Web front-end configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub base_url: String,

    /// chromium, firefox or webkit
    pub browser: String,

    /// Capture browser screenshots on failed checks instead of JSON evidence files
    pub screenshots: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            browser: "chromium".to_string(),
            screenshots: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Run seed. A random seed is drawn (and reported) when absent.
    pub seed: Option<u64>,

    /// Minimum number of free seats a sampled showtime must offer
    pub min_free_seats: u32,

    /// Number of showtimes to sample per scenario
    pub sample_size: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            seed: None,
            min_free_seats: 5,
            sample_size: 3,
        }
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            web: WebConfig::default(),
            sampling: SamplingConfig::default(),
            output_dir: PathBuf::from("test-results"),
            artifact_dir: PathBuf::from("test-results/artifacts"),
        }
    }
}

impl SuiteConfig {
    /// Parse a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_yaml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(E2eError::Config("api.base_url must not be empty".to_string()));
        }
        if self.sampling.sample_size == 0 {
            return Err(E2eError::Config("sampling.sample_size must be at least 1".to_string()));
        }
        if self.sampling.min_free_seats == 0 {
            return Err(E2eError::Config("sampling.min_free_seats must be at least 1".to_string()));
        }
        Ok(())
    }
}
