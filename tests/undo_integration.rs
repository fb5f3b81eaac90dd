mod support;

use tms::config::Config;
use tms::error::Error;
use tms::history::Command;
use tms::undo::{redo, undo};
use tms::TaskStore;

use support::{state, tea_store};

#[test]
fn composite_delete_undo_and_redo() {
    let mut store = tea_store();
    // Subtasks go in list order, so dependents must come first.
    store.change_task("Pour", "prerequisites", ",").unwrap();
    store.change_task("Tea", "subtasks", "Brew,Boil").unwrap();
    store.create_primitive_task("Last", "after", "2", ",").unwrap();
    let before = state(&store);

    store.delete_task("Morning").unwrap();
    for name in ["Morning", "Tea", "Boil", "Brew", "Pour"] {
        assert!(!store.contains_task(name), "{name} should be gone");
    }
    assert!(store.contains_task("Last"));
    let after = state(&store);

    let summary = undo(&mut store).unwrap();
    assert!(matches!(summary.applied, Command::Batch { .. }));
    assert_eq!(state(&store), before);
    assert_eq!(store.duration("Morning").unwrap(), 9.0);

    redo(&mut store).unwrap();
    assert_eq!(state(&store), after);
}

#[test]
fn deleting_a_subtask_detaches_it_and_undo_reattaches() {
    let mut store = tea_store();
    store.change_task("Pour", "prerequisites", ",").unwrap();
    let before = state(&store);

    store.delete_task("Pour").unwrap();
    let morning = store.task("Morning").unwrap().as_composite().unwrap();
    assert_eq!(morning.subtasks, vec!["Tea".to_string()]);

    undo(&mut store).unwrap();
    let morning = store.task("Morning").unwrap().as_composite().unwrap();
    assert_eq!(morning.subtasks, vec!["Tea".to_string(), "Pour".to_string()]);
    assert_eq!(state(&store), before);
}

#[test]
fn rename_updates_references_and_undo_reverts_them() {
    let mut store = tea_store();
    let before = state(&store);

    store.change_task("Boil", "name", "Heat").unwrap();
    let brew = store.task("Brew").unwrap().as_primitive().unwrap();
    assert_eq!(brew.prerequisites, vec!["Heat".to_string()]);
    let tea = store.task("Tea").unwrap().as_composite().unwrap();
    assert_eq!(tea.subtasks, vec!["Heat".to_string(), "Brew".to_string()]);

    undo(&mut store).unwrap();
    assert!(store.contains_task("Boil"));
    assert!(!store.contains_task("Heat"));
    assert_eq!(state(&store), before);
}

#[test]
fn duration_change_round_trips() {
    let mut store = tea_store();
    store.change_task("Brew", "duration", "10").unwrap();
    assert_eq!(store.earliest_finish_time("Pour").unwrap(), 14.0);

    undo(&mut store).unwrap();
    assert_eq!(store.earliest_finish_time("Pour").unwrap(), 10.0);

    redo(&mut store).unwrap();
    assert_eq!(store.earliest_finish_time("Pour").unwrap(), 14.0);
}

#[test]
fn criterion_definitions_are_undoable() {
    let mut store = tea_store();
    store
        .define_basic_criterion("Long", "duration", ">", "2")
        .unwrap();
    store.define_negated_criterion("Short", "Long").unwrap();
    store
        .define_binary_criterion("Mixed", "Long", "&&", "Short")
        .unwrap();
    assert!(store.search("Mixed").unwrap().is_empty());

    undo(&mut store).unwrap();
    assert!(matches!(store.search("Mixed"), Err(Error::CriterionNotFound(_))));
    assert_eq!(
        store.search("Short").unwrap().into_iter().collect::<Vec<_>>(),
        vec!["Pour".to_string()]
    );

    redo(&mut store).unwrap();
    assert!(store.criterion("Mixed").is_ok());
}

#[test]
fn new_mutation_clears_redo() {
    let mut store = tea_store();
    store.create_primitive_task("X", "x", "1", ",").unwrap();
    undo(&mut store).unwrap();
    assert_eq!(store.history().redo_len(), 1);

    store.create_primitive_task("Y", "y", "1", ",").unwrap();
    assert_eq!(store.history().redo_len(), 0);
    assert!(matches!(redo(&mut store), Err(Error::NothingToRedo)));
}

#[test]
fn failed_mutation_does_not_touch_the_log() {
    let mut store = tea_store();
    let entries = store.history().undo_len();

    assert!(store.create_primitive_task("Boil", "dup", "1", ",").is_err());
    assert!(store.create_primitive_task("Bad", "x", "-1", ",").is_err());
    assert!(store.create_composite_task("Grp", "x", "Nope").is_err());

    assert_eq!(store.history().undo_len(), entries);
}

#[test]
fn history_limit_drops_oldest_entries() {
    let mut config = Config::default();
    config.history.limit = 2;
    let mut store = TaskStore::from_config(&config);

    for name in ["A", "B", "C"] {
        store.create_primitive_task(name, "x", "1", ",").unwrap();
    }
    assert_eq!(store.history().undo_len(), 2);

    undo(&mut store).unwrap();
    undo(&mut store).unwrap();
    assert!(matches!(undo(&mut store), Err(Error::NothingToUndo)));
    assert!(store.contains_task("A"));
    assert!(!store.contains_task("B"));
}

#[test]
fn composite_creation_undo_keeps_existing_subtasks() {
    let mut store = TaskStore::new();
    store.create_primitive_task("A", "a", "3", ",").unwrap();
    store.create_primitive_task("B", "b", "4", "A").unwrap();
    let before = state(&store);

    // A is B's prerequisite, so only the composite itself may go.
    store.create_composite_task("C", "c", "A,B").unwrap();
    let created = state(&store);

    undo(&mut store).unwrap();
    assert_eq!(state(&store), before);

    redo(&mut store).unwrap();
    assert_eq!(state(&store), created);
    assert_eq!(store.duration("C").unwrap(), 7.0);

    undo(&mut store).unwrap();
    assert_eq!(state(&store), before);
    undo(&mut store).unwrap();
    undo(&mut store).unwrap();
    assert!(!store.contains_task("A"));
    assert!(matches!(undo(&mut store), Err(Error::NothingToUndo)));
}

#[test]
fn undo_walks_back_through_rename_and_composite_delete() {
    let mut store = TaskStore::new();
    store.create_primitive_task("A", "a", "1", ",").unwrap();
    let only_a = state(&store);
    store.create_composite_task("C", "c", "A").unwrap();
    store.change_task("A", "name", "Z").unwrap();
    let renamed = state(&store);
    store.delete_task("C").unwrap();
    assert!(!store.contains_task("Z"));

    undo(&mut store).unwrap();
    assert_eq!(state(&store), renamed);
    undo(&mut store).unwrap();
    assert!(store.contains_task("A"));
    undo(&mut store).unwrap();
    assert_eq!(state(&store), only_a);
    undo(&mut store).unwrap();
    assert!(!store.contains_task("A"));
}

#[test]
fn nested_composite_creation_undo_is_shallow() {
    let mut store = tea_store();
    let before = state(&store);

    store.create_composite_task("Day", "all", "Morning,Tea").unwrap();
    undo(&mut store).unwrap();
    assert_eq!(state(&store), before);
    assert_eq!(store.duration("Morning").unwrap(), 10.0);
}

#[test]
fn self_prerequisite_task_can_be_deleted_and_restored() {
    let mut store = TaskStore::new();
    store.create_primitive_task("A", "a", "1", ",").unwrap();
    store.change_task("A", "prerequisites", "A").unwrap();
    let before = state(&store);

    store.delete_task("A").unwrap();
    assert!(!store.contains_task("A"));

    undo(&mut store).unwrap();
    assert_eq!(state(&store), before);
}
