//! Two-phase profile fetch and the fetch-profiles phase around it

mod common;

use anyhow::Result;
use attorney_scrape::crawl_engine::{BulkFetcher, ProfileJob};
use attorney_scrape::fetch::{ChallengeAction, FetchBackend, FetchGate, FetchResult, RetryPolicy};
use attorney_scrape::models::{AttorneyRecord, FetchStatus, FetchStatusMap, RecordSet};
use attorney_scrape::phases::{FetchProfilesOptions, fetch_profiles_with};
use attorney_scrape::store::{read_json, write_json_atomic};
use common::{PacedBackend, RecordingProgress, ScriptedBackend, test_config};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn profile_url(id: &str) -> String {
    format!("https://profiles.example.com/lawyer/{id}.html")
}

fn gate(backend: &Arc<ScriptedBackend>, on_challenge: ChallengeAction) -> FetchGate {
    let backend: Arc<dyn FetchBackend> = backend.clone();
    FetchGate::new(
        backend,
        4,
        (0.0, 0.0),
        RetryPolicy::new(Duration::ZERO, 2, on_challenge),
        Duration::from_secs(5),
    )
}

/// ok: fast success; gone: 404; blocked: challenge; flaky: transient forever
fn sweep_backend() -> Arc<ScriptedBackend> {
    Arc::new(
        ScriptedBackend::new("sweep", FetchResult::TransientFailure("reset".into()))
            .script(&profile_url("ok"), vec![FetchResult::Success("<html>ok</html>".into())])
            .script(&profile_url("gone"), vec![FetchResult::NotFound])
            .script(&profile_url("blocked"), vec![FetchResult::ChallengeDetected]),
    )
}

fn browser_backend() -> Arc<ScriptedBackend> {
    Arc::new(ScriptedBackend::new(
        "browser",
        FetchResult::Success("<html>rendered</html>".into()),
    ))
}

#[tokio::test]
async fn only_blocked_profiles_reach_the_slow_path() -> Result<()> {
    let tmp = TempDir::new()?;
    let sweep = sweep_backend();
    let slow = browser_backend();
    let bulk = BulkFetcher::new(
        Some(gate(&sweep, ChallengeAction::Escalate)),
        gate(&slow, ChallengeAction::Retry),
        4,
        2,
    );

    let jobs = ["ok", "gone", "blocked", "flaky"]
        .iter()
        .map(|id| ProfileJob::new(*id, profile_url(id)))
        .collect();
    let report = bulk.fetch_all(jobs, tmp.path(), None).await?;

    assert_eq!(report.statuses["ok"], FetchStatus::Success);
    assert_eq!(report.statuses["gone"], FetchStatus::Failed);
    assert_eq!(report.statuses["blocked"], FetchStatus::Success);
    assert_eq!(report.statuses["flaky"], FetchStatus::Success);
    assert_eq!(report.sweep_successes, 1);
    assert_eq!(report.escalated, 2);
    assert_eq!(report.slow_successes, 2);

    assert_eq!(slow.calls_to(&profile_url("gone")), 0);
    assert_eq!(slow.calls_to(&profile_url("ok")), 0);
    assert_eq!(slow.calls_to(&profile_url("blocked")), 1);
    assert_eq!(sweep.calls_to(&profile_url("flaky")), 2);

    let saved = tokio::fs::read_to_string(tmp.path().join("blocked.html")).await?;
    assert_eq!(saved, "<html>rendered</html>");
    assert!(!tmp.path().join("gone.html").exists());
    Ok(())
}

#[tokio::test]
async fn without_sweep_everything_uses_the_slow_path() -> Result<()> {
    let tmp = TempDir::new()?;
    let slow = Arc::new(
        ScriptedBackend::new("browser", FetchResult::Success("<html>x</html>".into()))
            .script(&profile_url("b"), vec![FetchResult::NotFound]),
    );
    let bulk = BulkFetcher::new(None, gate(&slow, ChallengeAction::Retry), 4, 1);

    let jobs = vec![
        ProfileJob::new("a", profile_url("a")),
        ProfileJob::new("b", profile_url("b")),
        ProfileJob::new("c", profile_url("c")),
    ];
    let report = bulk.fetch_all(jobs, tmp.path(), None).await?;

    assert_eq!(report.escalated, 3);
    assert_eq!(report.statuses["b"], FetchStatus::Failed);
    assert_eq!(slow.total_calls(), 3);
    Ok(())
}

#[tokio::test]
async fn phase_skips_saved_pages_and_retries_challenges() -> Result<()> {
    let tmp = TempDir::new()?;
    let config = test_config(tmp.path(), 1, None);

    let mut listings = RecordSet::new();
    for id in ["ok", "saved", "stale"] {
        listings.insert_if_absent(id, AttorneyRecord::with_identity(id, profile_url(id)));
    }
    let listings_path = tmp.path().join("listings.json");
    write_json_atomic(&listings_path, &listings).await?;

    let html_dir = tmp.path().join("html");
    tokio::fs::create_dir_all(&html_dir).await?;
    tokio::fs::write(html_dir.join("saved.html"), "<html>kept</html>").await?;
    tokio::fs::write(
        html_dir.join("stale.html"),
        "<html><title>Just a moment...</title></html>",
    )
    .await?;

    let sweep = sweep_backend();
    let slow = browser_backend();
    let bulk = BulkFetcher::new(
        Some(gate(&sweep, ChallengeAction::Escalate)),
        gate(&slow, ChallengeAction::Retry),
        4,
        2,
    );
    let options = FetchProfilesOptions {
        force: false,
        retry_challenged: true,
    };
    let report = fetch_profiles_with(&config, &listings_path, options, &bulk).await?;

    assert_eq!(report.statuses["saved"], FetchStatus::Skipped);
    assert_eq!(report.statuses["ok"], FetchStatus::Success);
    assert_eq!(report.statuses["stale"], FetchStatus::Success);
    assert_eq!(sweep.calls_to(&profile_url("saved")), 0);
    assert_eq!(
        tokio::fs::read_to_string(html_dir.join("saved.html")).await?,
        "<html>kept</html>"
    );

    let on_disk: FetchStatusMap = read_json(&tmp.path().join("fetch_status.json")).await?;
    assert_eq!(on_disk, report.statuses);
    Ok(())
}

#[tokio::test]
async fn empty_listings_write_an_empty_status_file() -> Result<()> {
    let tmp = TempDir::new()?;
    let config = test_config(tmp.path(), 1, None);
    let listings_path = tmp.path().join("listings.json");
    write_json_atomic(&listings_path, &RecordSet::new()).await?;

    let slow = browser_backend();
    let bulk = BulkFetcher::new(None, gate(&slow, ChallengeAction::Retry), 4, 2);
    let report = fetch_profiles_with(&config, &listings_path, FetchProfilesOptions::default(), &bulk).await?;

    assert!(report.statuses.is_empty());
    assert_eq!(slow.total_calls(), 0);
    let raw = tokio::fs::read_to_string(tmp.path().join("fetch_status.json")).await?;
    assert_eq!(raw.trim(), "{}");
    Ok(())
}

#[tokio::test]
async fn slow_path_batches_bound_live_fetches() -> Result<()> {
    let tmp = TempDir::new()?;
    let backend = Arc::new(PacedBackend::new(
        Duration::from_millis(20),
        FetchResult::Success("<html>rendered</html>".into()),
    ));
    let shared: Arc<dyn FetchBackend> = backend.clone();
    // The gate alone would allow ten at once; the batch width is two
    let slow = FetchGate::new(
        shared,
        10,
        (0.0, 0.0),
        RetryPolicy::new(Duration::ZERO, 1, ChallengeAction::Retry),
        Duration::from_secs(5),
    );
    let progress = Arc::new(RecordingProgress::default());
    let bulk = BulkFetcher::new(None, slow, 10, 2).with_progress(progress.clone());

    let jobs: Vec<ProfileJob> = (0..7)
        .map(|i| {
            let id = format!("p{i}");
            ProfileJob::new(id.as_str(), profile_url(&id))
        })
        .collect();
    let report = bulk.fetch_all(jobs, &tmp.path().join("html"), None).await?;

    assert_eq!(report.slow_successes, 7);
    assert_eq!(backend.total_calls(), 7);
    assert_eq!(backend.peak(), 2);
    assert_eq!(*progress.fetch_plans.lock(), vec![7]);
    Ok(())
}
