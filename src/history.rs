//! Command log for tms
//!
//! Mutations are described by [`Command`] values. Applying a command yields its
//! exact inverse, which is what the undo and redo stacks hold.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::criteria::{BasicOp, LogicOp, Property};
use crate::task::{format_duration, join_name_list, TaskProperty};

/// A mutating operation on the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    CreatePrimitiveTask {
        name: String,
        description: String,
        duration: f64,
        prerequisites: Vec<String>,
    },
    CreateCompositeTask {
        name: String,
        description: String,
        subtasks: Vec<String>,
    },
    DeleteTask {
        name: String,
    },
    /// Remove one task without touching its subtasks. Inverse of a creation.
    RemoveTask {
        name: String,
    },
    ChangeTask {
        name: String,
        change: TaskChange,
    },
    DefineBasicCriterion {
        name: String,
        property: Property,
        op: BasicOp,
        value: String,
    },
    DefineNegatedCriterion {
        name: String,
        base: String,
    },
    DefineBinaryCriterion {
        name: String,
        left: String,
        op: LogicOp,
        right: String,
    },
    DeleteCriterion {
        name: String,
    },
    /// Commands applied in order as one step.
    Batch {
        commands: Vec<Command>,
    },
}

/// New value for one property of a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "property", content = "value", rename_all = "snake_case")]
pub enum TaskChange {
    Name(String),
    Description(String),
    Duration(f64),
    Prerequisites(Vec<String>),
    Subtasks(Vec<String>),
}

impl TaskChange {
    pub fn property(&self) -> TaskProperty {
        match self {
            TaskChange::Name(_) => TaskProperty::Name,
            TaskChange::Description(_) => TaskProperty::Description,
            TaskChange::Duration(_) => TaskProperty::Duration,
            TaskChange::Prerequisites(_) => TaskProperty::Prerequisites,
            TaskChange::Subtasks(_) => TaskProperty::Subtasks,
        }
    }

    fn value_text(&self) -> String {
        match self {
            TaskChange::Name(value) | TaskChange::Description(value) => value.clone(),
            TaskChange::Duration(value) => format_duration(*value),
            TaskChange::Prerequisites(names) | TaskChange::Subtasks(names) => {
                join_name_list(names)
            }
        }
    }
}

impl Command {
    /// Collapse a list of commands into one, unwrapping single-element batches.
    pub fn batch(mut commands: Vec<Command>) -> Command {
        if commands.len() == 1 {
            if let Some(command) = commands.pop() {
                return command;
            }
        }
        Command::Batch { commands }
    }
}

/// Textual form matching the command surface, e.g. `CreatePrimitiveTask A desc 3.0 ,`.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::CreatePrimitiveTask {
                name,
                description,
                duration,
                prerequisites,
            } => write!(
                f,
                "CreatePrimitiveTask {name} {description} {} {}",
                format_duration(*duration),
                join_name_list(prerequisites)
            ),
            Command::CreateCompositeTask {
                name,
                description,
                subtasks,
            } => write!(
                f,
                "CreateCompositeTask {name} {description} {}",
                join_name_list(subtasks)
            ),
            Command::DeleteTask { name } => write!(f, "DeleteTask {name}"),
            Command::RemoveTask { name } => write!(f, "RemoveTask {name}"),
            Command::ChangeTask { name, change } => write!(
                f,
                "ChangeTask {name} {} {}",
                change.property(),
                change.value_text()
            ),
            Command::DefineBasicCriterion {
                name,
                property,
                op,
                value,
            } => write!(
                f,
                "DefineBasicCriterion {name} {} {} {value}",
                property.as_str(),
                op.as_str()
            ),
            Command::DefineNegatedCriterion { name, base } => {
                write!(f, "DefineNegatedCriterion {name} {base}")
            }
            Command::DefineBinaryCriterion {
                name,
                left,
                op,
                right,
            } => write!(f, "DefineBinaryCriterion {name} {left} {} {right}", op.as_str()),
            Command::DeleteCriterion { name } => write!(f, "DeleteCriterion {name}"),
            Command::Batch { commands } => {
                for (index, command) in commands.iter().enumerate() {
                    if index > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{command}")?;
                }
                Ok(())
            }
        }
    }
}

/// One entry on the undo or redo stack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRecord {
    pub op_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    /// Command that reverts the recorded step.
    pub command: Command,
}

impl CommandRecord {
    pub fn new(command: Command) -> Self {
        Self {
            op_id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            command,
        }
    }
}

/// Undo and redo stacks.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: VecDeque<CommandRecord>,
    redo: Vec<CommandRecord>,
    /// Maximum undo depth, 0 for unlimited
    limit: usize,
}

impl History {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Record the inverse of a fresh mutation. Invalidates the redo stack.
    pub fn record(&mut self, inverse: Command) {
        self.redo.clear();
        self.push_undo(CommandRecord::new(inverse));
    }

    pub fn push_undo(&mut self, record: CommandRecord) {
        self.undo.push_back(record);
        if self.limit > 0 {
            while self.undo.len() > self.limit {
                self.undo.pop_front();
            }
        }
    }

    pub fn push_redo(&mut self, record: CommandRecord) {
        self.redo.push(record);
    }

    pub fn pop_undo(&mut self) -> Option<CommandRecord> {
        self.undo.pop_back()
    }

    pub fn pop_redo(&mut self) -> Option<CommandRecord> {
        self.redo.pop()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
