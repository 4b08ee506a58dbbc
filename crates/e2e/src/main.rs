//! Suite runner entry point
//!
//! Runs the built-in scenarios against a booking API and writes
//! `test-results.json`. Exit code 0 when every scenario passed, 1 when any
//! failed, 2 when the run itself could not complete.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cinebook_e2e::api::HttpBookingApi;
use cinebook_e2e::artifacts::{Browser, DiagnosticSink, FileArtifactSink, PlaywrightScreenshotSink};
use cinebook_e2e::config::SuiteConfig;
use cinebook_e2e::runner::{RunnerConfig, ScenarioRunner};
use cinebook_e2e::scenarios;

#[derive(Parser, Debug)]
#[command(name = "cinebook-e2e")]
#[command(about = "E2E sampling and reconciliation suite for the booking app")]
struct Args {
    /// Path to the suite configuration file (YAML)
    #[arg(short, long, default_value = "cinebook.yaml", env = "CINEBOOK_CONFIG")]
    config: PathBuf,

    /// Booking API base URL
    #[arg(long, env = "CINEBOOK_API_URL")]
    api_url: Option<String>,

    /// Booking API token
    #[arg(long, env = "CINEBOOK_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Booking web front-end URL
    #[arg(long, env = "CINEBOOK_WEB_URL")]
    web_url: Option<String>,

    /// Run seed, to replay a previous run
    #[arg(long, env = "CINEBOOK_SEED")]
    seed: Option<u64>,

    /// Minimum free seats for sampled showtimes
    #[arg(long)]
    min_free_seats: Option<u32>,

    /// Showtimes to sample per scenario
    #[arg(long)]
    sample_size: Option<usize>,

    /// Capture browser screenshots on failed checks
    #[arg(long)]
    screenshots: bool,

    /// Run only scenarios matching this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only a specific scenario by name
    #[arg(short, long)]
    name: Option<String>,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn apply(self, mut config: SuiteConfig) -> SuiteConfig {
        if let Some(url) = self.api_url {
            config.api.base_url = url;
        }
        if self.api_token.is_some() {
            config.api.token = self.api_token;
        }
        if let Some(url) = self.web_url {
            config.web.base_url = url;
        }
        if self.seed.is_some() {
            config.sampling.seed = self.seed;
        }
        if let Some(min) = self.min_free_seats {
            config.sampling.min_free_seats = min;
        }
        if let Some(size) = self.sample_size {
            config.sampling.sample_size = size;
        }
        if self.screenshots {
            config.web.screenshots = true;
        }
        if let Some(output) = self.output {
            config.artifact_dir = output.join("artifacts");
            config.output_dir = output;
        }
        config
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> anyhow::Result<bool> {
    let tag = args.tag.clone();
    let name = args.name.clone();

    let config = SuiteConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let config = args.apply(config);
    config.validate()?;

    let api = Arc::new(HttpBookingApi::new(&config.api)?);
    let diagnostics: Arc<dyn DiagnosticSink> = if config.web.screenshots {
        Arc::new(PlaywrightScreenshotSink::new(
            config.web.base_url.clone(),
            config.artifact_dir.join("screenshots"),
            Browser::from_name(&config.web.browser),
        )?)
    } else {
        Arc::new(FileArtifactSink::new(config.artifact_dir.clone())?)
    };

    let runner = ScenarioRunner::new(
        api,
        diagnostics,
        RunnerConfig {
            sampling: config.sampling.clone(),
            output_dir: config.output_dir.clone(),
        },
    );

    let all = scenarios::builtin();
    let results = if let Some(name) = name {
        runner.run_named(&all, &name).await?
    } else if let Some(tag) = tag {
        runner.run_tagged(&all, &tag).await?
    } else {
        runner.run_all(&all).await?
    };

    runner.write_results(&results)?;
    if results.failed > 0 {
        eprintln!("Replay this run with --seed {}", results.seed);
    }

    Ok(results.failed == 0)
}
