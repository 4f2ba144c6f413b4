// tests/session_handler.rs

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::time::{sleep_until, Duration, Instant};

use autobackup::session::{HandleOutcome, SessionHandler};
use autobackup::types::SnapshotFormat;
use autobackup::watch::{ChangeEvent, ChangeKind};
use autobackup_test_utils::builders::SessionBuilder;
use autobackup_test_utils::clock::PausedClock;
use autobackup_test_utils::init_tracing;
use autobackup_test_utils::recording_writer::RecordingWriter;

type TestResult = Result<(), Box<dyn Error>>;

const SECOND: Duration = Duration::from_secs(1);

fn write_event(path: &str) -> ChangeEvent {
    ChangeEvent::new(path, ChangeKind::Write)
}

#[tokio::test(start_paused = true)]
async fn scenario_backs_up_at_1s_suppresses_at_3s_backs_up_at_7s() -> TestResult {
    init_tracing();

    let clock = PausedClock::new(0);
    let launch = clock.start();
    let writer = RecordingWriter::new();

    let session = SessionBuilder::new("proj", "/data/proj", "/backups")
        .minimum_interval(5 * SECOND)
        .build();
    let mut handler = SessionHandler::new(session, launch)
        .with_clock(Arc::new(clock))
        .with_writer(Arc::new(writer.clone()));

    sleep_until(launch + SECOND).await;
    let outcome = handler.on_change(&write_event("/data/proj/notes.txt"), Instant::now()).await;
    assert_eq!(outcome, HandleOutcome::Written(PathBuf::from("/backups/1/proj")));

    sleep_until(launch + 3 * SECOND).await;
    let outcome = handler.on_change(&write_event("/data/proj/notes.txt"), Instant::now()).await;
    assert_eq!(outcome, HandleOutcome::Suppressed);

    sleep_until(launch + 7 * SECOND).await;
    let outcome = handler.on_change(&write_event("/data/proj/other.txt"), Instant::now()).await;
    assert_eq!(outcome, HandleOutcome::Written(PathBuf::from("/backups/7/proj")));

    assert_eq!(
        writer.written_paths(),
        vec![PathBuf::from("/backups/1/proj"), PathBuf::from("/backups/7/proj")]
    );
    // Whole-directory mode always snapshots the directory itself.
    for request in writer.requests() {
        assert_eq!(request.sources, vec![PathBuf::from("/data/proj")]);
        assert_eq!(request.session, "proj");
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn first_change_ignores_a_huge_interval() -> TestResult {
    let clock = PausedClock::new(1_000);
    let launch = clock.start();
    let writer = RecordingWriter::new();

    let session = SessionBuilder::new("s", "/w", "/b")
        .minimum_interval(Duration::from_secs(24 * 3600))
        .build();
    let mut handler = SessionHandler::new(session, launch)
        .with_clock(Arc::new(clock))
        .with_writer(Arc::new(writer.clone()))
        .with_settle_delay(Duration::ZERO);

    sleep_until(launch + Duration::from_millis(1)).await;
    let outcome = handler.on_change(&write_event("/w/a"), Instant::now()).await;
    assert_eq!(outcome, HandleOutcome::Written(PathBuf::from("/b/1000/w")));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn file_filtered_mode_snapshots_only_the_changed_file() -> TestResult {
    let clock = PausedClock::new(50);
    let launch = clock.start();
    let writer = RecordingWriter::new();

    let session = SessionBuilder::new("saves", "/game", "/backups")
        .file("save1.dat")
        .compress(true)
        .build();
    let mut handler = SessionHandler::new(session, launch)
        .with_clock(Arc::new(clock))
        .with_writer(Arc::new(writer.clone()));

    sleep_until(launch + 2 * SECOND).await;
    let outcome = handler.on_change(&write_event("/game/save1.dat"), Instant::now()).await;
    assert_eq!(
        outcome,
        HandleOutcome::Written(PathBuf::from("/backups/52/save1.dat.tar.gz"))
    );

    let requests = writer.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].sources, vec![PathBuf::from("/game/save1.dat")]);
    assert_eq!(requests[0].target.name, "save1.dat");
    assert_eq!(requests[0].target.format, SnapshotFormat::Archive);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn settle_delay_runs_between_accept_and_write() -> TestResult {
    let clock = PausedClock::new(0);
    let launch = clock.start();
    let writer = RecordingWriter::new();

    let session = SessionBuilder::new("s", "/w", "/b").build();
    let mut handler = SessionHandler::new(session, launch)
        .with_clock(Arc::new(clock))
        .with_writer(Arc::new(writer.clone()))
        .with_settle_delay(3 * SECOND);

    sleep_until(launch + SECOND).await;
    handler.on_change(&write_event("/w/x"), Instant::now()).await;

    // The trigger time is taken before the pause...
    assert_eq!(handler.debounce().last_backup_at(), launch + SECOND);
    // ...and the handler only returns once the pause is over.
    assert!(clock.elapsed() >= 4 * SECOND);
    // The snapshot is named after the trigger time, not the write time.
    assert_eq!(writer.written_paths(), vec![PathBuf::from("/b/1/w")]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_write_still_counts_as_last_backup() -> TestResult {
    init_tracing();

    let clock = PausedClock::new(0);
    let launch = clock.start();
    let writer = RecordingWriter::failing();

    let session = SessionBuilder::new("s", "/w", "/b")
        .minimum_interval(5 * SECOND)
        .build();
    let mut handler = SessionHandler::new(session, launch)
        .with_clock(Arc::new(clock))
        .with_writer(Arc::new(writer.clone()))
        .with_settle_delay(Duration::ZERO);

    sleep_until(launch + SECOND).await;
    assert_eq!(handler.on_change(&write_event("/w/x"), Instant::now()).await, HandleOutcome::Failed);

    sleep_until(launch + 2 * SECOND).await;
    assert_eq!(handler.on_change(&write_event("/w/x"), Instant::now()).await, HandleOutcome::Suppressed);

    sleep_until(launch + 6 * SECOND).await;
    assert_eq!(handler.on_change(&write_event("/w/x"), Instant::now()).await, HandleOutcome::Failed);

    assert_eq!(writer.count(), 2);
    Ok(())
}

#[test]
fn build_request_names_target_after_directory_or_file() {
    let launch = Instant::now();

    let whole = SessionHandler::new(SessionBuilder::new("p", "/data/proj", "/bk").build(), launch);
    let req = whole
        .build_request(&write_event("/data/proj/sub/deep.txt"), 9)
        .unwrap();
    assert_eq!(req.target.path(), PathBuf::from("/bk/9/proj"));

    let filtered = SessionHandler::new(
        SessionBuilder::new("p", "/data/proj", "/bk").file("a.txt").build(),
        launch,
    );
    let req = filtered
        .build_request(&write_event("/data/proj/a.txt"), 9)
        .unwrap();
    assert_eq!(req.target.path(), PathBuf::from("/bk/9/a.txt"));
    assert_eq!(req.sources, vec![PathBuf::from("/data/proj/a.txt")]);
}
