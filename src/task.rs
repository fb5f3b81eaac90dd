//! Task model for tms.
//!
//! Primitive tasks carry a duration and prerequisites; composite tasks group
//! subtasks. Both are addressed by a short name that is unique across tasks
//! and criteria.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest accepted task or criterion name
pub const MAX_NAME_LEN: usize = 8;

/// Textual form of an empty name list on the command surface
pub const EMPTY_LIST: &str = ",";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveTask {
    pub name: String,
    pub description: String,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeTask {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub subtasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Task {
    Primitive(PrimitiveTask),
    Composite(CompositeTask),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Primitive,
    Composite,
}

impl Task {
    pub fn name(&self) -> &str {
        match self {
            Task::Primitive(task) => &task.name,
            Task::Composite(task) => &task.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Task::Primitive(task) => &task.description,
            Task::Composite(task) => &task.description,
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Primitive(_) => TaskKind::Primitive,
            Task::Composite(_) => TaskKind::Composite,
        }
    }

    /// Names this task points at: prerequisites or subtasks.
    pub fn references(&self) -> &[String] {
        match self {
            Task::Primitive(task) => &task.prerequisites,
            Task::Composite(task) => &task.subtasks,
        }
    }

    pub(crate) fn references_mut(&mut self) -> &mut Vec<String> {
        match self {
            Task::Primitive(task) => &mut task.prerequisites,
            Task::Composite(task) => &mut task.subtasks,
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        match self {
            Task::Primitive(task) => task.name = name,
            Task::Composite(task) => task.name = name,
        }
    }

    pub(crate) fn set_description(&mut self, description: String) {
        match self {
            Task::Primitive(task) => task.description = description,
            Task::Composite(task) => task.description = description,
        }
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveTask> {
        match self {
            Task::Primitive(task) => Some(task),
            Task::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeTask> {
        match self {
            Task::Composite(task) => Some(task),
            Task::Primitive(_) => None,
        }
    }
}

/// Task properties that `ChangeTask` can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskProperty {
    Name,
    Description,
    Duration,
    Prerequisites,
    Subtasks,
}

impl TaskProperty {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(TaskProperty::Name),
            "description" => Some(TaskProperty::Description),
            "duration" => Some(TaskProperty::Duration),
            "prerequisites" => Some(TaskProperty::Prerequisites),
            "subtasks" => Some(TaskProperty::Subtasks),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskProperty::Name => "name",
            TaskProperty::Description => "description",
            TaskProperty::Duration => "duration",
            TaskProperty::Prerequisites => "prerequisites",
            TaskProperty::Subtasks => "subtasks",
        }
    }

    /// Whether the property exists on tasks of `kind`.
    pub fn applies_to(self, kind: TaskKind) -> bool {
        match self {
            TaskProperty::Name | TaskProperty::Description => true,
            TaskProperty::Duration | TaskProperty::Prerequisites => kind == TaskKind::Primitive,
            TaskProperty::Subtasks => kind == TaskKind::Composite,
        }
    }
}

impl std::fmt::Display for TaskProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a task or criterion name: 1..=8 ASCII letters or digits, not
/// starting with a digit.
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason| {
        Err(Error::InvalidName {
            name: name.to_string(),
            reason,
        })
    };

    let Some(first) = name.chars().next() else {
        return invalid("name cannot be empty");
    };
    if name.len() > MAX_NAME_LEN {
        return invalid("only 8 characters at most");
    }
    if first.is_ascii_digit() {
        return invalid("name cannot start with a digit");
    }
    if !name.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return invalid("only English letters and digits are allowed");
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<()> {
    if description
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
    {
        Ok(())
    } else {
        Err(Error::InvalidDescription(description.to_string()))
    }
}

/// Parse a duration given as text. Must be a finite number greater than zero.
pub fn parse_duration(text: &str) -> Result<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| Error::InvalidDuration(text.to_string()))?;
    validate_duration(value).map_err(|_| Error::InvalidDuration(text.to_string()))?;
    Ok(value)
}

pub fn validate_duration(value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidDuration(format_duration(value)))
    }
}

/// Split a comma separated name list. `","` and the empty string mean no names.
pub fn parse_name_list(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == EMPTY_LIST {
        return Vec::new();
    }
    trimmed.split(',').map(|name| name.trim().to_string()).collect()
}

/// Inverse of [`parse_name_list`].
pub fn join_name_list(names: &[String]) -> String {
    if names.is_empty() {
        EMPTY_LIST.to_string()
    } else {
        names.join(",")
    }
}

/// Render a duration so it always reads as a real number (`5.0`, not `5`).
pub fn format_duration(value: f64) -> String {
    format!("{value:?}")
}
