//! Request executor: maps parsed commands 1:1 onto the store API.

use serde::Serialize;

use crate::command::Request;
use crate::config::{Config, SnapshotConfig};
use crate::error::Result;
use crate::snapshot::{self, SnapshotSummary};
use crate::store::TaskStore;
use crate::task::{CompositeTask, PrimitiveTask, Task};
use crate::undo::{self, UndoSummary};

/// Outcome of one executed request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Created {
        name: String,
    },
    Deleted {
        name: String,
    },
    Changed {
        name: String,
        property: String,
    },
    Task {
        task: Task,
    },
    Tasks {
        primitive: Vec<PrimitiveTask>,
        composite: Vec<CompositeTask>,
    },
    Duration {
        name: String,
        duration: f64,
    },
    EarliestFinishTime {
        name: String,
        time: f64,
    },
    Defined {
        /// Name the criterion is available under
        name: String,
        /// Name given on the command line, when it differs
        #[serde(skip_serializing_if = "Option::is_none")]
        requested: Option<String>,
    },
    Criteria {
        criteria: Vec<CriterionRow>,
    },
    Search {
        criterion: String,
        matches: Vec<String>,
    },
    Stored(SnapshotSummary),
    Loaded(SnapshotSummary),
    Undone(UndoSummary),
    Redone(UndoSummary),
    Quit,
}

#[derive(Debug, Clone, Serialize)]
pub struct CriterionRow {
    pub name: String,
    pub builtin: bool,
    pub property: String,
    pub op: String,
    pub value: String,
}

pub struct Session {
    store: TaskStore,
    snapshot: SnapshotConfig,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            store: TaskStore::from_config(config),
            snapshot: config.snapshot.clone(),
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TaskStore {
        &mut self.store
    }

    pub fn execute(&mut self, request: Request) -> Result<Response> {
        let store = &mut self.store;
        let response = match request {
            Request::CreatePrimitiveTask {
                name,
                description,
                duration,
                prerequisites,
            } => {
                store.create_primitive_task(&name, &description, &duration, &prerequisites)?;
                Response::Created { name }
            }
            Request::CreateCompositeTask {
                name,
                description,
                subtasks,
            } => {
                store.create_composite_task(&name, &description, &subtasks)?;
                Response::Created { name }
            }
            Request::DeleteTask { name } => {
                store.delete_task(&name)?;
                Response::Deleted { name }
            }
            Request::ChangeTask {
                name,
                property,
                value,
            } => {
                store.change_task(&name, &property, &value)?;
                let name = if property == "name" { value } else { name };
                Response::Changed { name, property }
            }
            Request::PrintTask { name } => Response::Task {
                task: store.task(&name)?.clone(),
            },
            Request::PrintAllTasks => Response::Tasks {
                primitive: store.primitive_tasks().cloned().collect(),
                composite: store.composite_tasks().cloned().collect(),
            },
            Request::ReportDuration { name } => {
                let duration = store.duration(&name)?;
                Response::Duration { name, duration }
            }
            Request::ReportEarliestFinishTime { name } => {
                let time = store.earliest_finish_time(&name)?;
                Response::EarliestFinishTime { name, time }
            }
            Request::DefineBasicCriterion {
                name,
                property,
                op,
                value,
            } => {
                store.define_basic_criterion(&name, &property, &op, &value)?;
                Response::Defined {
                    name,
                    requested: None,
                }
            }
            Request::DefineNegatedCriterion { name, base } => {
                let resolved = store.define_negated_criterion(&name, &base)?;
                let requested = (resolved != name).then_some(name);
                Response::Defined {
                    name: resolved,
                    requested,
                }
            }
            Request::DefineBinaryCriterion {
                name,
                left,
                op,
                right,
            } => {
                store.define_binary_criterion(&name, &left, &op, &right)?;
                Response::Defined {
                    name,
                    requested: None,
                }
            }
            Request::PrintAllCriteria => Response::Criteria {
                criteria: store
                    .criteria()
                    .map(|(name, criterion)| {
                        let (property, op, value) = criterion.fields();
                        CriterionRow {
                            name: name.to_string(),
                            builtin: criterion.is_builtin(),
                            property,
                            op,
                            value,
                        }
                    })
                    .collect(),
            },
            Request::Search { name } => {
                let matches = store.search(&name)?.into_iter().collect();
                Response::Search {
                    criterion: name,
                    matches,
                }
            }
            Request::Store { path } => {
                Response::Stored(snapshot::store(store, &path, &self.snapshot)?)
            }
            Request::Load { path } => Response::Loaded(snapshot::load(store, &path)?),
            Request::Undo => Response::Undone(undo::undo(store)?),
            Request::Redo => Response::Redone(undo::redo(store)?),
            Request::Quit => Response::Quit,
        };
        Ok(response)
    }
}
