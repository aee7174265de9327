//! End-to-end tests for the file-state core.
//!
//! Tests verify:
//! - Cached reads never re-run the lister
//! - Successful mutations show up in the next read without a manual refresh
//! - Protected names survive every delete and create path
//! - A lister failure degrades to an empty directory, never a crash

use filewise_common::enumerator::{FakeEnumerator, FakeListing};
use filewise_common::llm_client::FakeLlmClient;
use filewise_common::{
    IntentRouter, MutationExecutor, NativeEnumerator, OutcomeKind, SnapshotStore,
};
use filewise_shared::{CreateError, DeleteError, DirectoryEntry};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

/// Router over a real temp directory with the built-in lister
fn router_in(temp: &TempDir, answer: &str) -> IntentRouter {
    IntentRouter::new(
        SnapshotStore::new(Box::new(NativeEnumerator::new(temp.path()))),
        MutationExecutor::new(temp.path()),
        Box::new(FakeLlmClient::always_answer(answer)),
    )
}

#[test]
fn test_create_then_delete_round_trip() {
    let temp = TempDir::new().unwrap();
    let mut router = router_in(&temp, "unused");

    assert_eq!(router.snapshot().snapshot.total_count(), 0);

    let created = router.handle("create hello.txt", &[]);
    assert_eq!(created.kind, OutcomeKind::Created);
    let snapshot = router.snapshot().snapshot;
    assert_eq!(snapshot.total_count(), 1);
    assert_eq!(snapshot.entries()[0].name, "hello.txt");

    let deleted = router.handle("delete hello.txt", &[]);
    assert_eq!(deleted.kind, OutcomeKind::Deleted);
    assert_eq!(router.snapshot().snapshot.total_count(), 0);
}

#[test]
fn test_cached_read_is_identical() {
    let fake = Arc::new(FakeEnumerator::with_files(&["report.txt", "final_report.txt"]));
    let mut store = SnapshotStore::new(Box::new(Arc::clone(&fake)));

    let first = store.get(false).unwrap();
    for _ in 0..5 {
        assert!(Arc::ptr_eq(&first, &store.get(false).unwrap()));
    }
    assert_eq!(fake.call_count(), 1);
}

#[test]
fn test_external_changes_need_refresh() {
    let temp = TempDir::new().unwrap();
    let mut router = router_in(&temp, "unused");
    assert_eq!(router.snapshot().snapshot.total_count(), 0);

    fs::write(temp.path().join("dropped_in.txt"), "x").unwrap();
    assert_eq!(router.snapshot().snapshot.total_count(), 0);

    router.refresh().unwrap();
    assert_eq!(router.snapshot().snapshot.total_count(), 1);
}

#[test]
fn test_create_defaulting_on_disk() {
    let temp = TempDir::new().unwrap();
    let mut router = router_in(&temp, "unused");

    assert_eq!(router.create("notes", "").target.as_deref(), Some("notes.txt"));
    assert!(!fs::read_to_string(temp.path().join("notes.txt")).unwrap().is_empty());

    assert_eq!(router.create("notes.md", "hi").target.as_deref(), Some("notes.md"));
    assert_eq!(fs::read_to_string(temp.path().join("notes.md")).unwrap(), "hi");
}

#[test]
fn test_protected_names_survive_all_paths() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("app_config"), "").unwrap();
    fs::write(temp.path().join(".env"), "KEY=1").unwrap();
    let mut router = router_in(&temp, "unused");

    for utterance in ["delete app_config", "remove APP_CONFIG", "delete .ENV file"] {
        let outcome = router.handle(utterance, &[]);
        assert_eq!(outcome.kind, OutcomeKind::Protected, "{}", utterance);
    }

    let executor = MutationExecutor::new(temp.path());
    let mut store = SnapshotStore::new(Box::new(NativeEnumerator::new(temp.path())));
    assert!(matches!(
        executor.delete("APP_CONFIG", &mut store),
        Err(DeleteError::Protected(_))
    ));

    assert!(temp.path().join("app_config").exists());
    assert!(temp.path().join(".env").exists());
}

#[test]
fn test_create_never_overwrites_protected_files() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".env"), "KEY=1").unwrap();
    fs::write(temp.path().join("app_config.toml"), "[log]\nlevel = \"info\"\n").unwrap();
    let mut router = router_in(&temp, "unused");

    for utterance in ["create .env", "create app_config.toml with content: gone"] {
        let outcome = router.handle(utterance, &[]);
        assert_eq!(outcome.kind, OutcomeKind::Protected, "{}", utterance);
    }

    let executor = MutationExecutor::new(temp.path());
    let mut store = SnapshotStore::new(Box::new(NativeEnumerator::new(temp.path())));
    assert!(matches!(
        executor.create(".ENV", "x", &mut store),
        Err(CreateError::Protected(_))
    ));

    assert_eq!(fs::read_to_string(temp.path().join(".env")).unwrap(), "KEY=1");
    assert_eq!(
        fs::read_to_string(temp.path().join("app_config.toml")).unwrap(),
        "[log]\nlevel = \"info\"\n"
    );
}

#[test]
fn test_exact_match_beats_substring_on_delete() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("final_report.txt"), "").unwrap();
    fs::write(temp.path().join("report.txt"), "").unwrap();
    let mut router = router_in(&temp, "unused");

    let outcome = router.handle("delete report.txt", &[]);
    assert_eq!(outcome.target.as_deref(), Some("report.txt"));
    assert!(temp.path().join("final_report.txt").exists());
}

#[test]
fn test_lister_outage_then_recovery() {
    let fake = Arc::new(FakeEnumerator::new(vec![
        FakeListing::Fail("file_lister.exe missing".to_string()),
        FakeListing::Entries(vec![DirectoryEntry::file("back.txt", 3)]),
    ]));
    let mut router = IntentRouter::new(
        SnapshotStore::new(Box::new(Arc::clone(&fake))),
        MutationExecutor::new("/nonexistent-filewise-root"),
        Box::new(FakeLlmClient::always_answer("One file.")),
    );

    let degraded = router.snapshot();
    assert!(degraded.is_degraded());
    assert_eq!(degraded.snapshot.total_count(), 0);

    let recovered = router.snapshot();
    assert!(!recovered.is_degraded());
    assert_eq!(recovered.snapshot.total_count(), 1);
    assert_eq!(fake.call_count(), 2);
}
