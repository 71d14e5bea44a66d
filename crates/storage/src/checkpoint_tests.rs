use super::*;

fn checkpoint(iteration: u32, epoch_ms: u64) -> Checkpoint {
    Checkpoint::new(
        "build a thing",
        iteration,
        vec!["done step".to_string()],
        vec!["pending step".to_string()],
        Some(PathBuf::from("/ws/projects/build-thing")),
        epoch_ms,
        "2023-11-14T22:13:20+00:00".to_string(),
    )
}

#[test]
fn save_then_load_by_id_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path(), 10);
    let cp = checkpoint(5, 1_700_000_000_000);
    let id = store.save(&cp).unwrap();
    assert_eq!(id, "20231114_221320");
    let loaded = store.by_id(&id).unwrap();
    assert_eq!(loaded, cp);
}

#[test]
fn save_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path(), 10);
    store.save(&checkpoint(1, 1_700_000_000_000)).unwrap();
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn latest_returns_newest_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path(), 10);
    store.save(&checkpoint(1, 1_700_000_000_000)).unwrap();
    store.save(&checkpoint(2, 1_700_000_060_000)).unwrap();
    store.save(&checkpoint(3, 1_700_000_120_000)).unwrap();
    assert_eq!(store.latest().unwrap().iteration, 3);
}

#[test]
fn trims_to_newest_keep() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path(), 3);
    for i in 0..6 {
        store
            .save(&checkpoint(i, 1_700_000_000_000 + u64::from(i) * 60_000))
            .unwrap();
    }
    let listed = store.list();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].iteration, 5);
    assert_eq!(listed[2].iteration, 3);
}

#[test]
fn unknown_schema_version_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path(), 10);
    let mut future = checkpoint(9, 1_700_000_120_000);
    future.schema_version = 99;
    // write it by hand so save() can't normalise it
    std::fs::write(
        dir.path().join("checkpoint_20231114_221520.json"),
        serde_json::to_vec(&future).unwrap(),
    )
    .unwrap();
    store.save(&checkpoint(1, 1_700_000_000_000)).unwrap();

    assert!(store.by_id("20231114_221520").is_none());
    assert_eq!(store.latest().unwrap().iteration, 1);
}

#[test]
fn corrupt_json_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path(), 10);
    std::fs::write(dir.path().join("checkpoint_99999999_999999.json"), b"{nope").unwrap();
    store.save(&checkpoint(4, 1_700_000_000_000)).unwrap();
    assert_eq!(store.latest().unwrap().iteration, 4);
    assert_eq!(store.list().len(), 1);
}

#[test]
fn delete_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path(), 10);
    let id = store.save(&checkpoint(1, 1_700_000_000_000)).unwrap();
    store.save(&checkpoint(2, 1_700_000_060_000)).unwrap();
    assert!(store.delete(&id));
    assert!(!store.delete(&id));
    assert_eq!(store.clear(), 1);
    assert!(store.latest().is_none());
}

#[test]
fn list_truncates_long_objectives() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path(), 10);
    let mut cp = checkpoint(1, 1_700_000_000_000);
    cp.objective = "o".repeat(80);
    store.save(&cp).unwrap();
    let listed = store.list();
    assert!(listed[0].objective.ends_with("..."));
    assert_eq!(listed[0].objective.len(), 53);
}
