// tests/watcher_setup.rs

use std::error::Error;
use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::time::{sleep, Duration, Instant};

use autobackup::dispatcher::Dispatcher;
use autobackup::errors::BackupError;
use autobackup::session::SessionHandler;
use autobackup::types::StartupPolicy;
use autobackup::watch::start_session_watcher;
use autobackup_test_utils::builders::{ConfigFileBuilder, RawSessionBuilder, SessionBuilder};
use autobackup_test_utils::recording_writer::RecordingWriter;
use autobackup_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// Poll until the writer has seen at least `n` requests.
async fn wait_for_snapshots(writer: &RecordingWriter, n: usize) {
    while writer.count() < n {
        sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn watcher_on_missing_directory_fails_with_session_name() -> TestResult {
    init_tracing();

    let tmp = TempDir::new()?;
    let missing = tmp.path().join("does-not-exist");
    let session = SessionBuilder::new("ghost", &missing, tmp.path().join("b")).build();

    match start_session_watcher(SessionHandler::new(session, Instant::now())) {
        Err(BackupError::SessionSetup { session, dir, .. }) => {
            assert_eq!(session, "ghost");
            assert_eq!(dir, missing);
        }
        other => panic!("Expected SessionSetup error, got: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn fail_fast_stops_at_first_broken_session() -> TestResult {
    let tmp = TempDir::new()?;
    fs::create_dir_all(tmp.path().join("ok"))?;

    let sessions = vec![
        SessionBuilder::new("a-ok", tmp.path().join("ok"), tmp.path().join("b")).build(),
        SessionBuilder::new("b-broken", tmp.path().join("missing"), tmp.path().join("b")).build(),
    ];

    let result = Dispatcher::new(sessions, StartupPolicy::FailFast, Instant::now()).start();
    match result {
        Err(BackupError::SessionSetup { session, .. }) => assert_eq!(session, "b-broken"),
        other => panic!("Expected SessionSetup error, got: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn keep_going_skips_broken_sessions() -> TestResult {
    let tmp = TempDir::new()?;
    fs::create_dir_all(tmp.path().join("ok"))?;

    let sessions = vec![
        SessionBuilder::new("a-broken", tmp.path().join("missing"), tmp.path().join("b")).build(),
        SessionBuilder::new("b-ok", tmp.path().join("ok"), tmp.path().join("b")).build(),
    ];

    let handles = Dispatcher::new(sessions, StartupPolicy::KeepGoing, Instant::now()).start()?;
    assert_eq!(handles.len(), 1);
    assert_eq!(handles[0].session(), "b-ok");
    assert!(!handles[0].is_finished());
    Ok(())
}

#[tokio::test]
async fn keep_going_with_nothing_started_is_an_error() -> TestResult {
    let tmp = TempDir::new()?;
    let sessions = vec![
        SessionBuilder::new("x", tmp.path().join("m1"), tmp.path().join("b")).build(),
        SessionBuilder::new("y", tmp.path().join("m2"), tmp.path().join("b")).build(),
    ];

    let result = Dispatcher::new(sessions, StartupPolicy::KeepGoing, Instant::now()).start();
    assert!(matches!(result, Err(BackupError::NoSessionsStarted { failed: 2 })));
    Ok(())
}

#[tokio::test]
async fn dispatcher_builds_sessions_from_config() -> TestResult {
    let tmp = TempDir::new()?;
    fs::create_dir_all(tmp.path().join("w"))?;

    let cfg = ConfigFileBuilder::new()
        .with_session(
            "docs",
            RawSessionBuilder::new(tmp.path().join("w"), tmp.path().join("b"))
                .file("notes.md")
                .compression(true)
                .minimum_interval_secs(30)
                .build(),
        )
        .try_build()?;

    let dispatcher = Dispatcher::from_config(&cfg, StartupPolicy::FailFast, Instant::now());
    let sessions = dispatcher.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].name, "docs");
    assert!(sessions[0].compress);
    assert!(!sessions[0].is_whole_directory());
    assert_eq!(sessions[0].minimum_interval, Duration::from_secs(30));
    Ok(())
}

#[tokio::test]
async fn real_file_change_produces_a_snapshot() -> TestResult {
    init_tracing();

    let tmp = TempDir::new()?;
    let watched = tmp.path().join("proj");
    fs::create_dir_all(&watched)?;
    let writer = RecordingWriter::new();

    let session = SessionBuilder::new("proj", &watched, tmp.path().join("backups"))
        .minimum_interval(Duration::from_secs(60))
        .build();
    let handles = Dispatcher::new(vec![session], StartupPolicy::FailFast, Instant::now())
        .with_settle_delay(Duration::ZERO)
        .with_writer(Arc::new(writer.clone()))
        .start()?;
    assert_eq!(handles.len(), 1);

    sleep(Duration::from_millis(50)).await;
    fs::write(watched.join("a.txt"), "one")?;
    fs::write(watched.join("a.txt"), "two")?;

    with_timeout(wait_for_snapshots(&writer, 1)).await;
    // Give any follow-up events time to arrive; they fall inside the interval.
    sleep(Duration::from_millis(200)).await;

    let requests = writer.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].session, "proj");
    assert_eq!(requests[0].sources, vec![watched.clone()]);
    assert_eq!(requests[0].target.name, "proj");
    Ok(())
}

#[tokio::test]
async fn real_filtered_session_reacts_only_to_listed_file() -> TestResult {
    let tmp = TempDir::new()?;
    let watched = tmp.path().join("game");
    fs::create_dir_all(&watched)?;
    let writer = RecordingWriter::new();

    let session = SessionBuilder::new("saves", &watched, tmp.path().join("backups"))
        .file("save1.dat")
        .minimum_interval(Duration::from_secs(60))
        .build();
    let _handles = Dispatcher::new(vec![session], StartupPolicy::FailFast, Instant::now())
        .with_settle_delay(Duration::ZERO)
        .with_writer(Arc::new(writer.clone()))
        .start()?;

    sleep(Duration::from_millis(50)).await;
    fs::write(watched.join("other.dat"), "x")?;
    sleep(Duration::from_millis(200)).await;
    assert_eq!(writer.count(), 0);

    fs::write(watched.join("save1.dat"), "y")?;
    with_timeout(wait_for_snapshots(&writer, 1)).await;

    let requests = writer.requests();
    assert_eq!(requests[0].sources, vec![watched.join("save1.dat")]);
    Ok(())
}

#[tokio::test]
async fn dropping_handles_stops_watching() -> TestResult {
    let tmp = TempDir::new()?;
    let watched = tmp.path().join("w");
    fs::create_dir_all(&watched)?;
    let writer = RecordingWriter::new();

    let session = SessionBuilder::new("w", &watched, tmp.path().join("b")).build();
    let handles = Dispatcher::new(vec![session], StartupPolicy::FailFast, Instant::now())
        .with_settle_delay(Duration::ZERO)
        .with_writer(Arc::new(writer.clone()))
        .start()?;
    drop(handles);

    fs::write(watched.join("late.txt"), "z")?;
    sleep(Duration::from_millis(200)).await;
    assert_eq!(writer.count(), 0);
    Ok(())
}
