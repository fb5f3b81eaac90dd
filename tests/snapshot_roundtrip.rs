mod support;

use std::fs;

use tms::config::SnapshotConfig;
use tms::error::Error;
use tms::snapshot;
use tms::TaskStore;

use support::{state, tea_store};

#[test]
fn store_then_load_reproduces_the_store() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("tea.snapshot");

    let mut original = tea_store();
    original.define_basic_criterion("Long", "duration", ">", "2")?;
    original.define_negated_criterion("Short", "Long")?;
    original.define_binary_criterion("Any", "Long", "||", "Short")?;
    original.define_basic_criterion("Desc", "description", "contains", "tea")?;

    let summary = snapshot::store(&original, &path, &SnapshotConfig::default())?;
    assert_eq!(summary.tasks, 5);
    assert!(path.exists());

    let mut loaded = TaskStore::new();
    loaded.create_primitive_task("Gone", "x", "1", ",")?;
    snapshot::load(&mut loaded, &path)?;

    assert!(!loaded.contains_task("Gone"));
    assert_eq!(state(&loaded), state(&original));
    assert_eq!(loaded.search("Any")?, original.search("Any")?);
    assert_eq!(loaded.earliest_finish_time("Morning")?, 10.0);
    assert_eq!(loaded.history().undo_len(), 0);
    Ok(())
}

#[test]
fn store_without_create_dirs_fails_on_missing_parent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("tea.snapshot");
    let options = SnapshotConfig {
        create_dirs: false,
        ..SnapshotConfig::default()
    };

    let err = snapshot::store(&tea_store(), &path, &options).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(!path.exists());
}

#[test]
fn loading_a_missing_file_keeps_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = tea_store();
    let before = state(&store);

    let err = snapshot::load(&mut store, &dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(state(&store), before);
    assert_eq!(store.history().undo_len(), 5);
}

#[test]
fn encoded_text_loads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.snapshot");
    let mut store = TaskStore::new();
    store.create_primitive_task("Tmp", "x", "1", ",").unwrap();
    store.create_primitive_task("Next", "y", "2.5", "Tmp").unwrap();
    fs::write(&path, snapshot::encode(&store)).unwrap();

    let mut fresh = TaskStore::new();
    snapshot::load(&mut fresh, &path).unwrap();
    assert_eq!(fresh.earliest_finish_time("Next").unwrap(), 3.5);
}
