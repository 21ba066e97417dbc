//! End-to-end tests for the async player loop

mod common;

use common::{init_tracing, source_files, ScriptedExtractor};
use lilt_core::{NotificationKind, SourceFile};
use lilt_playback::{
    ChannelNotifier, MemoryEngine, PlaybackError, PlayerController, PlayerHandle, PlayerService,
    PlayerState,
};
use std::sync::Arc;
use std::time::Duration;

fn spawn(
    extractor: ScriptedExtractor,
) -> (
    PlayerHandle,
    MemoryEngine,
    tokio::sync::mpsc::UnboundedReceiver<lilt_playback::Notification>,
    tokio::task::JoinHandle<()>,
) {
    init_tracing();
    let engine = MemoryEngine::new();
    let (notifier, rx) = ChannelNotifier::new();
    let controller = PlayerController::with_defaults(Box::new(engine.clone()), Arc::new(notifier));
    let (handle, task) = PlayerService::spawn(controller, Arc::new(extractor));
    (handle, engine, rx, task)
}

async fn wait_for_title(handle: &PlayerHandle, title: &str) {
    for _ in 0..200 {
        let snapshot = handle.snapshot().await.unwrap();
        if snapshot.active_entry().map(|e| e.title.as_str()) == Some(title) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("{} never became active", title);
}

#[tokio::test]
async fn ingest_then_navigate() {
    let (handle, engine, mut rx, _task) = spawn(ScriptedExtractor::new());

    let report = handle
        .ingest_and_wait(source_files(&["a.mp3", "b.mp3", "c.mp3"]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.added, 3);

    handle.previous().await.unwrap();
    handle.previous().await.unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.entries.len(), 3);
    assert_eq!(snapshot.state, PlayerState::Playing);
    assert_eq!(snapshot.active_entry().unwrap().title, "c.mp3");
    assert_eq!(engine.live_resources(), 1);

    let first = rx.recv().await.unwrap();
    assert_eq!(first.kind, NotificationKind::Success);
}

#[tokio::test]
async fn extraction_results_append_in_completion_order() {
    let extractor = ScriptedExtractor::new().delayed("slow.mp3", Duration::from_millis(100));
    let (handle, _, _, _task) = spawn(extractor);

    handle
        .ingest_and_wait(source_files(&["slow.mp3", "fast.mp3"]))
        .await
        .unwrap()
        .unwrap();

    let titles: Vec<_> = handle
        .snapshot()
        .await
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, vec!["fast.mp3", "slow.mp3"]);
}

#[tokio::test]
async fn track_end_advances_automatically() {
    let (handle, engine, _, _task) = spawn(ScriptedExtractor::new());
    handle
        .ingest_and_wait(source_files(&["a.mp3", "b.mp3"]))
        .await
        .unwrap();
    handle.start_first().await.unwrap();

    assert!(engine.finish_current());
    wait_for_title(&handle, "b.mp3").await;

    assert!(engine.finish_current());
    wait_for_title(&handle, "a.mp3").await;
    assert_eq!(engine.peak_live_resources(), 1);
}

#[tokio::test]
async fn superseded_ingest_reports_none() {
    let extractor = ScriptedExtractor::new().delayed("old.mp3", Duration::from_millis(100));
    let (handle, _, _, _task) = spawn(extractor);

    let first = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.ingest_and_wait(source_files(&["old.mp3"])).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = handle
        .ingest_and_wait(source_files(&["new.mp3"]))
        .await
        .unwrap();

    assert!(first.await.unwrap().unwrap().is_none());
    assert_eq!(second.unwrap().added, 1);

    // Let the slow extraction land; it must not be merged
    tokio::time::sleep(Duration::from_millis(150)).await;
    let titles: Vec<_> = handle
        .snapshot()
        .await
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, vec!["new.mp3"]);
}

#[tokio::test]
async fn extractor_panic_fails_only_that_file() {
    let (handle, _, mut rx, _task) = spawn(ScriptedExtractor::new().panicking("bad.mp3"));

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        handle.ingest_and_wait(source_files(&["good.mp3", "bad.mp3"])),
    )
    .await
    .expect("batch never completed")
    .unwrap()
    .unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].file_name, "bad.mp3");

    let titles: Vec<_> = handle
        .snapshot()
        .await
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, vec!["good.mp3"]);

    assert_eq!(rx.recv().await.unwrap().kind, NotificationKind::Success);
    assert_eq!(rx.recv().await.unwrap().kind, NotificationKind::Info);
}

#[tokio::test]
async fn empty_ingest_changes_nothing() {
    let (handle, _, _, _task) = spawn(ScriptedExtractor::new());
    handle
        .ingest_and_wait(source_files(&["a.mp3"]))
        .await
        .unwrap();
    handle.start_first().await.unwrap();

    let report = handle.ingest_and_wait(Vec::<SourceFile>::new()).await.unwrap();

    assert!(report.is_none());
    assert_eq!(handle.snapshot().await.unwrap().state, PlayerState::Playing);
}

#[tokio::test]
async fn command_errors_are_returned() {
    let (handle, engine, _, _task) = spawn(ScriptedExtractor::new());
    engine.fail_on("bad.mp3");
    handle
        .ingest_and_wait(source_files(&["bad.mp3"]))
        .await
        .unwrap();

    let err = handle.start_first().await.unwrap_err();
    assert!(matches!(err, PlaybackError::ResourceStart(_)));
    assert!(matches!(
        handle.set_volume(3.0).await,
        Err(PlaybackError::InvalidVolume(_))
    ));
    assert!(matches!(
        handle.seek(Duration::from_secs(1)).await,
        Err(PlaybackError::NoTrackLoaded)
    ));
}

#[tokio::test]
async fn transport_round_trip() {
    let (handle, engine, _, _task) = spawn(ScriptedExtractor::new());
    handle
        .ingest_and_wait(source_files(&["a.mp3"]))
        .await
        .unwrap();

    handle.toggle_pause().await.unwrap();
    assert!(!handle.snapshot().await.unwrap().is_paused);

    handle.set_volume(0.3).await.unwrap();
    handle.seek(Duration::from_secs(12)).await.unwrap();
    handle.toggle_pause().await.unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.is_paused);
    assert_eq!(snapshot.volume, 0.3);
    assert_eq!(engine.current_volume(), Some(0.3));

    handle.clear_all().await.unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.entries.is_empty());
    assert_eq!(snapshot.state, PlayerState::Idle);
}

#[tokio::test]
async fn shutdown_closes_handle() {
    let (handle, engine, _, task) = spawn(ScriptedExtractor::new());
    handle
        .ingest_and_wait(source_files(&["a.mp3"]))
        .await
        .unwrap();
    handle.start_first().await.unwrap();

    handle.shutdown().await.unwrap();
    task.await.unwrap();

    assert_eq!(engine.live_resources(), 0);
    assert!(!handle.is_running());
    assert!(matches!(
        handle.next().await,
        Err(PlaybackError::ServiceClosed)
    ));
    assert!(matches!(
        handle.snapshot().await,
        Err(PlaybackError::ServiceClosed)
    ));
}

#[tokio::test]
async fn dropping_all_handles_stops_loop() {
    let (handle, engine, _, task) = spawn(ScriptedExtractor::new());
    handle
        .ingest_and_wait(source_files(&["a.mp3"]))
        .await
        .unwrap();
    handle.start_first().await.unwrap();

    drop(handle);
    task.await.unwrap();
    assert_eq!(engine.live_resources(), 0);
}

#[tokio::test]
async fn ingest_path_discovers_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("one.mp3"), b"one").unwrap();
    std::fs::write(dir.path().join("two.flac"), b"two").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"skip").unwrap();

    let (handle, _, _, _task) = spawn(ScriptedExtractor::new());
    let queued = handle
        .ingest_path(dir.path().to_path_buf(), vec!["mp3".into(), "flac".into()])
        .await
        .unwrap();
    assert_eq!(queued, 2);

    for _ in 0..200 {
        if handle.snapshot().await.unwrap().entries.len() == 2 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("discovered files were never added");
}

#[tokio::test]
async fn ingest_path_missing_directory_errors() {
    let (handle, _, _, _task) = spawn(ScriptedExtractor::new());
    let result = handle
        .ingest_path("/definitely/not/here".into(), vec!["mp3".into()])
        .await;
    assert!(matches!(result, Err(PlaybackError::Core(_))));
}
