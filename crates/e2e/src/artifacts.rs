//! Diagnostic artifact capture for failed checks
//!
//! The verification layer only forwards a context name and stores the
//! returned [`ArtifactRef`]; what an artifact contains is up to the sink.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tokio::process::Command as TokioCommand;
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};

/// Opaque reference to a captured artifact (usually a file path)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Captures evidence for a failed check
#[async_trait]
pub trait DiagnosticSink: Send + Sync {
    async fn capture_artifact(&self, context_name: &str) -> E2eResult<ArtifactRef>;
}

/// Sink that captures nothing, for runs without evidence collection
pub struct NullSink;

#[async_trait]
impl DiagnosticSink for NullSink {
    async fn capture_artifact(&self, context_name: &str) -> E2eResult<ArtifactRef> {
        Ok(ArtifactRef::new(format!("none:{}", context_name)))
    }
}

/// Build a file stem unique to a context and capture time
fn artifact_stem(context_name: &str) -> String {
    let now = chrono::Utc::now();
    let mut hasher = Sha256::new();
    hasher.update(context_name.as_bytes());
    hasher.update(now.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    let digest = hex::encode(hasher.finalize());

    let slug: String = context_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("{}-{}-{}", slug, now.format("%Y%m%dT%H%M%S"), &digest[..8])
}

#[derive(Debug, Serialize)]
struct EvidenceRecord<'a> {
    context: &'a str,
    captured_at: String,
}

/// Writes a JSON evidence record per failed check (API-only runs)
pub struct FileArtifactSink {
    dir: PathBuf,
}

impl FileArtifactSink {
    pub fn new(dir: impl Into<PathBuf>) -> E2eResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DiagnosticSink for FileArtifactSink {
    async fn capture_artifact(&self, context_name: &str) -> E2eResult<ArtifactRef> {
        let path = self.dir.join(format!("{}.json", artifact_stem(context_name)));
        let record = EvidenceRecord {
            context: context_name,
            captured_at: chrono::Utc::now().to_rfc3339(),
        };
        tokio::fs::write(&path, serde_json::to_vec_pretty(&record)?).await?;
        debug!("Evidence written to {}", path.display());
        Ok(ArtifactRef::new(path.to_string_lossy()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    /// Unknown names fall back to chromium
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "firefox" => Browser::Firefox,
            "webkit" => Browser::Webkit,
            _ => Browser::Chromium,
        }
    }
}

/// Screenshots the booking web app through a generated Playwright script
pub struct PlaywrightScreenshotSink {
    page_url: String,
    screenshot_dir: PathBuf,
    browser: Browser,
}

impl PlaywrightScreenshotSink {
    pub fn new(
        page_url: impl Into<String>,
        screenshot_dir: impl Into<PathBuf>,
        browser: Browser,
    ) -> E2eResult<Self> {
        Self::check_playwright_installed()?;

        let screenshot_dir = screenshot_dir.into();
        std::fs::create_dir_all(&screenshot_dir)?;

        Ok(Self {
            page_url: page_url.into(),
            screenshot_dir,
            browser,
        })
    }

    fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Node script that opens the page and takes a full-page screenshot
    pub fn build_script(&self, screenshot_path: &Path) -> String {
        format!(
            r#"
const {{ {browser} }} = require('playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: true }});
  const page = await browser.newPage();
  try {{
    await page.goto('{url}');
    await page.screenshot({{ path: '{path}', fullPage: true }});
    console.log(JSON.stringify({{ success: true }}));
  }} catch (error) {{
    console.error(JSON.stringify({{ success: false, error: error.message }}));
    process.exit(1);
  }} finally {{
    await browser.close();
  }}
}})();
"#,
            browser = self.browser.as_str(),
            url = self.page_url.replace('\'', "\\'"),
            path = screenshot_path.to_string_lossy().replace('\'', "\\'"),
        )
    }

    async fn run_script(&self, script: &str) -> E2eResult<()> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("capture.js");
        std::fs::write(&script_path, script)?;

        let output = TokioCommand::new("node")
            .arg(&script_path)
            .current_dir(temp_dir.path())
            .output()
            .await?;

        if !output.status.success() {
            return Err(E2eError::Playwright(format!(
                "Script failed:\nstdout: {}\nstderr: {}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DiagnosticSink for PlaywrightScreenshotSink {
    async fn capture_artifact(&self, context_name: &str) -> E2eResult<ArtifactRef> {
        let path = self
            .screenshot_dir
            .join(format!("{}.png", artifact_stem(context_name)));
        self.run_script(&self.build_script(&path)).await?;
        info!("Screenshot saved: {}", path.display());
        Ok(ArtifactRef::new(path.to_string_lossy()))
    }
}
