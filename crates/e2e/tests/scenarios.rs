//! Built-in scenarios run end to end through the scenario runner

mod common;

use async_trait::async_trait;
use std::sync::Arc;

use cinebook_common::ShowtimeDetail;
use cinebook_e2e::artifacts::FileArtifactSink;
use cinebook_e2e::config::SamplingConfig;
use cinebook_e2e::runner::{RunnerConfig, SuiteResult};
use cinebook_e2e::{scenarios, E2eResult, Scenario, ScenarioContext, ScenarioRunner};

use common::{seats, FakeBookingApi};

const BHD: (&str, &str) = ("bhd-3-2", "BHD Star - Vincom 3/2");
const CGV: (&str, &str) = ("cgv-aeon", "CGV - Aeon Tan Phu");

fn healthy_backend() -> FakeBookingApi {
    FakeBookingApi::new()
        .movie("1", "Dune")
        .movie("2", "Encanto")
        .showtime("1", BHD, "40001", "17/10/2021 ~ 08:10", 12, 20)
        .showtime("1", CGV, "40002", "2021-10-17T10:30:00", 9, 20)
        .showtime("2", CGV, "40003", "18-10-2021 19:00", 15, 20)
}

fn runner(api: FakeBookingApi, dir: &std::path::Path, seed: u64) -> ScenarioRunner {
    let diagnostics = Arc::new(FileArtifactSink::new(dir.join("artifacts")).unwrap());
    ScenarioRunner::new(
        Arc::new(api),
        diagnostics,
        RunnerConfig {
            sampling: SamplingConfig {
                seed: Some(seed),
                min_free_seats: 5,
                sample_size: 2,
            },
            output_dir: dir.to_path_buf(),
        },
    )
}

fn result<'a>(suite: &'a SuiteResult, name: &str) -> &'a cinebook_e2e::runner::ScenarioResult {
    suite.results.iter().find(|r| r.name == name).unwrap()
}

#[tokio::test]
async fn builtin_scenarios_pass_on_consistent_backend() {
    let dir = tempfile::tempdir().unwrap();
    let runner = runner(healthy_backend(), dir.path(), 42);

    let suite = runner.run_all(&scenarios::builtin()).await.unwrap();
    for r in &suite.results {
        assert!(r.success, "{} failed: {:?}", r.name, r.error);
    }
    assert_eq!(suite.total, 3);
    assert_eq!(suite.failed, 0);
    assert_eq!(suite.seed, 42);

    let consistency = result(&suite, "showtime-detail-consistency");
    // two showtimes, three checks each
    assert_eq!(consistency.outcomes.len(), 6);
}

#[tokio::test]
async fn mismatches_are_reported_together() {
    let dir = tempfile::tempdir().unwrap();
    let api = FakeBookingApi::new().movie("1", "Dune").showtime_with_detail(
        "1",
        BHD,
        "40001",
        "17/10/2021 ~ 08:10",
        ShowtimeDetail {
            movie_title: "Dune: Part Two".to_string(),
            cinema_name: "BHD Star - Vincom 3/2".to_string(),
            date_time: "2021-10-17T09:10:00".to_string(),
            seats: seats(10, 10),
        },
    );
    let runner = runner(api, dir.path(), 7);

    let suite = runner
        .run_named(&scenarios::builtin(), "showtime-detail-consistency")
        .await
        .unwrap();
    assert_eq!(suite.failed, 1);

    let r = &suite.results[0];
    let error = r.error.as_deref().unwrap();
    assert!(error.contains("showtime 40001 date-time"));
    assert!(error.contains("showtime 40001 movie title"));
    assert!(!error.contains("cinema name"));

    let failed: Vec<_> = r.outcomes.iter().filter(|o| !o.passed).collect();
    assert_eq!(failed.len(), 2);
    for outcome in failed {
        let artifact = outcome.diagnostic_artifact.as_ref().unwrap();
        assert!(std::path::Path::new(artifact.as_str()).exists());
    }

    let reported = runner.report().entries_for("showtime-detail-consistency");
    assert_eq!(reported.len(), 3);
}

#[tokio::test]
async fn fetch_failure_fails_scenarios_that_walk_the_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let api = healthy_backend().broken_movie("2");
    let runner = runner(api, dir.path(), 1);

    let suite = runner.run_tagged(&scenarios::builtin(), "smoke").await.unwrap();
    assert_eq!(suite.total, 2);
    assert_eq!(suite.failed, 2);
    for r in &suite.results {
        assert!(r.error.as_deref().unwrap().contains("Transport error"));
    }
}

#[tokio::test]
async fn same_seed_replays_same_sample() {
    let dir = tempfile::tempdir().unwrap();
    let build = || {
        let mut api = FakeBookingApi::new().movie("1", "Dune");
        for i in 0..20 {
            api = api.showtime("1", BHD, &format!("6{:03}", i), "17/10/2021 08:10", 10, 10);
        }
        api
    };

    let first = runner(build(), dir.path(), 99)
        .run_named(&scenarios::builtin(), "seat-map-integrity")
        .await
        .unwrap();
    let second = runner(build(), dir.path(), 99)
        .run_named(&scenarios::builtin(), "seat-map-integrity")
        .await
        .unwrap();

    let descriptions = |suite: &SuiteResult| {
        suite.results[0]
            .outcomes
            .iter()
            .map(|o| o.description.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(descriptions(&first), descriptions(&second));
    assert!(first.results[0].success);
}

struct Panicky;

#[async_trait]
impl Scenario for Panicky {
    fn name(&self) -> &str {
        "panicky"
    }

    async fn run(&self, _ctx: &mut ScenarioContext) -> E2eResult<()> {
        panic!("scenario bug");
    }
}

#[tokio::test]
async fn panicking_scenario_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let runner = runner(healthy_backend(), dir.path(), 5);
    let all: Vec<Arc<dyn Scenario>> = vec![Arc::new(Panicky), Arc::new(scenarios::CatalogLabels)];

    let suite = runner.run_all(&all).await.unwrap();
    assert_eq!(suite.failed, 1);
    assert!(!result(&suite, "panicky").success);
    assert!(result(&suite, "catalog-labels").success);

    let path = runner.write_results(&suite).unwrap();
    let written: SuiteResult =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(written.total, 2);
}

#[tokio::test]
async fn unknown_scenario_name_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let runner = runner(healthy_backend(), dir.path(), 5);
    assert!(runner.run_named(&scenarios::builtin(), "nope").await.is_err());
}
