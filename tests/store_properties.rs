mod support;

use std::collections::BTreeSet;

use tms::error::{Error, ErrorKind};
use tms::undo::{redo, undo};
use tms::TaskStore;

use support::{state, tea_store};

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn create_then_undo_restores_previous_state() {
    let cases = [("A", "x"), ("Zz9", "with-hyphen"), ("abcdefgh", ""), ("Q", "Q-1-2")];

    for (name, description) in cases {
        let mut store = tea_store();
        let before = state(&store);

        store
            .create_primitive_task(name, description, "2.5", "Boil")
            .unwrap();
        assert!(store.contains_task(name));

        undo(&mut store).unwrap();
        assert!(!store.contains_task(name));
        assert_eq!(state(&store), before);
    }
}

#[test]
fn primitive_duration_is_its_own() {
    let mut store = TaskStore::new();
    store.create_primitive_task("A", "a", "5.0", ",").unwrap();
    assert_eq!(store.duration("A").unwrap(), 5.0);
}

#[test]
fn earliest_finish_and_composite_duration() {
    let mut store = TaskStore::new();
    store.create_primitive_task("A", "a", "3", ",").unwrap();
    store.create_primitive_task("B", "b", "4", "A").unwrap();
    store.create_composite_task("C", "c", "A,B").unwrap();

    assert_eq!(store.earliest_finish_time("B").unwrap(), 7.0);
    assert_eq!(store.duration("C").unwrap(), 7.0);
    assert_eq!(store.earliest_finish_time("C").unwrap(), 7.0);
}

#[test]
fn nested_composites_use_flattened_members() {
    let store = tea_store();
    assert_eq!(store.duration("Tea").unwrap(), 9.0);
    assert_eq!(store.duration("Morning").unwrap(), 10.0);
    assert_eq!(store.earliest_finish_time("Morning").unwrap(), 10.0);
}

#[test]
fn duration_criterion_selects_long_primitives() {
    let mut store = tea_store();
    store
        .define_basic_criterion("LongOne", "duration", ">", "5")
        .unwrap();
    assert_eq!(store.search("LongOne").unwrap(), set(&["Brew"]));

    store
        .define_basic_criterion("NotShort", "duration", ">=", "3")
        .unwrap();
    assert_eq!(store.search("NotShort").unwrap(), set(&["Boil", "Brew"]));
}

#[test]
fn negating_builtins_swaps_them() {
    let mut store = tea_store();
    assert_eq!(
        store.define_negated_criterion("NotPrim", "IsPrimitive").unwrap(),
        "IsCompos"
    );
    let composite = store.search("IsCompos").unwrap();
    assert_eq!(composite, set(&["Morning", "Tea"]));

    assert_eq!(
        store.define_negated_criterion("NotComp", "IsCompos").unwrap(),
        "IsPrimitive"
    );
    assert_eq!(
        store.search("IsPrimitive").unwrap(),
        set(&["Boil", "Brew", "Pour"])
    );
}

#[test]
fn text_and_list_criteria() {
    let mut store = tea_store();
    store
        .define_basic_criterion("HasWater", "description", "contains", "water")
        .unwrap();
    store
        .define_basic_criterion("AfterBrw", "prerequisites", "contains", "Brew,Boil")
        .unwrap();
    store
        .define_basic_criterion("TeaParts", "subtasks", "contains", "Boil,Brew")
        .unwrap();
    store
        .define_binary_criterion("Either", "HasWater", "||", "TeaParts")
        .unwrap();

    assert_eq!(store.search("HasWater").unwrap(), set(&["Boil"]));
    assert_eq!(store.search("AfterBrw").unwrap(), set(&["Brew", "Pour"]));
    assert_eq!(store.search("TeaParts").unwrap(), set(&["Tea"]));
    assert_eq!(store.search("Either").unwrap(), set(&["Boil", "Tea"]));
}

#[test]
fn search_without_matches_is_empty_not_error() {
    let mut store = tea_store();
    store
        .define_basic_criterion("Huge", "duration", ">", "100")
        .unwrap();
    assert!(store.search("Huge").unwrap().is_empty());
    assert!(matches!(store.search("Nope"), Err(Error::CriterionNotFound(_))));
}

#[test]
fn blocked_deletion_leaves_store_unchanged() {
    let mut store = tea_store();
    let before = state(&store);

    let err = store.delete_task("Boil").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReferentialIntegrity);
    assert_eq!(state(&store), before);
    assert_eq!(store.history().undo_len(), 5);
}

#[test]
fn composite_delete_failure_is_atomic() {
    let mut store = tea_store();
    let before = state(&store);

    // Boil is still a prerequisite of Brew when Tea's first subtask is removed.
    let err = store.delete_task("Tea").unwrap_err();
    assert!(matches!(err, Error::SubtaskInUse { ref name, .. } if name == "Tea"));
    assert_eq!(state(&store), before);
}

#[test]
fn empty_log_reports_empty_log() {
    let mut store = tea_store();
    while undo(&mut store).is_ok() {}
    let before = state(&store);

    let err = undo(&mut store).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyLog);
    assert_eq!(state(&store), before);

    let mut fresh = TaskStore::new();
    let err = redo(&mut fresh).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyLog);
}

#[test]
fn cyclic_prerequisites_are_reported() {
    let mut store = TaskStore::new();
    store.create_primitive_task("A", "a", "1", ",").unwrap();
    store.create_primitive_task("B", "b", "1", "A").unwrap();
    store.change_task("A", "prerequisites", "B").unwrap();

    assert!(matches!(
        store.earliest_finish_time("B"),
        Err(Error::CyclicDependency(_))
    ));
}
