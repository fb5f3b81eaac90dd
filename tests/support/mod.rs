#![allow(dead_code)]

use tms::snapshot;
use tms::TaskStore;

/// Store with a small tea-making graph:
/// Boil (3) <- Brew (6) <- Pour (1), Tea = {Boil, Brew}, Morning = {Tea, Pour}.
pub fn tea_store() -> TaskStore {
    let mut store = TaskStore::new();
    store
        .create_primitive_task("Boil", "Boil-water", "3", ",")
        .expect("create Boil");
    store
        .create_primitive_task("Brew", "Steep-leaves", "6", "Boil")
        .expect("create Brew");
    store
        .create_primitive_task("Pour", "Serve", "1", "Brew")
        .expect("create Pour");
    store
        .create_composite_task("Tea", "Make-tea", "Boil,Brew")
        .expect("create Tea");
    store
        .create_composite_task("Morning", "Routine", "Tea,Pour")
        .expect("create Morning");
    store
}

/// Full textual state of a store, for before/after comparisons.
pub fn state(store: &TaskStore) -> String {
    snapshot::encode(store)
}
