//! Parser for the line-oriented command surface.
//!
//! One command per line, arguments separated by whitespace, fixed arity per
//! verb. Blank lines and lines starting with `#` are skipped.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// A parsed command line. Arguments are kept as text; the store validates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CreatePrimitiveTask {
        name: String,
        description: String,
        duration: String,
        prerequisites: String,
    },
    CreateCompositeTask {
        name: String,
        description: String,
        subtasks: String,
    },
    DeleteTask {
        name: String,
    },
    ChangeTask {
        name: String,
        property: String,
        value: String,
    },
    PrintTask {
        name: String,
    },
    PrintAllTasks,
    ReportDuration {
        name: String,
    },
    ReportEarliestFinishTime {
        name: String,
    },
    DefineBasicCriterion {
        name: String,
        property: String,
        op: String,
        value: String,
    },
    DefineNegatedCriterion {
        name: String,
        base: String,
    },
    DefineBinaryCriterion {
        name: String,
        left: String,
        op: String,
        right: String,
    },
    PrintAllCriteria,
    Search {
        name: String,
    },
    Store {
        path: PathBuf,
    },
    Load {
        path: PathBuf,
    },
    Undo,
    Redo,
    Quit,
}

/// Verb, argument count, usage text.
const VERBS: &[(&str, usize, &str)] = &[
    (
        "CreatePrimitiveTask",
        4,
        "CreatePrimitiveTask name description duration prerequisites",
    ),
    (
        "CreateCompositeTask",
        3,
        "CreateCompositeTask name description subtasks",
    ),
    ("DeleteTask", 1, "DeleteTask name"),
    ("ChangeTask", 3, "ChangeTask name property newValue"),
    ("PrintTask", 1, "PrintTask name"),
    ("PrintAllTasks", 0, "PrintAllTasks"),
    ("ReportDuration", 1, "ReportDuration name"),
    ("ReportEarliestFinishTime", 1, "ReportEarliestFinishTime name"),
    (
        "DefineBasicCriterion",
        4,
        "DefineBasicCriterion name property op value",
    ),
    ("DefineNegatedCriterion", 2, "DefineNegatedCriterion name base"),
    (
        "DefineBinaryCriterion",
        4,
        "DefineBinaryCriterion name left op right",
    ),
    ("PrintAllCriteria", 0, "PrintAllCriteria"),
    ("Search", 1, "Search name"),
    ("Store", 1, "Store path"),
    ("Load", 1, "Load path"),
    ("undo", 0, "undo"),
    ("redo", 0, "redo"),
    ("Quit", 0, "Quit"),
];

/// Parse one line. Returns `None` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<Request>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut words = trimmed.split_whitespace();
    let verb = words.next().unwrap_or_default();
    let mut args: Vec<String> = words.map(str::to_string).collect();

    let &(verb, arity, usage) = VERBS
        .iter()
        .find(|(name, _, _)| *name == verb)
        .ok_or_else(|| Error::UnknownCommand(verb.to_string()))?;
    if args.len() != arity {
        return Err(Error::InvalidCommand { usage });
    }

    // Arguments are taken from the back so each arm can pop in reverse order.
    let mut next = || args.pop().unwrap_or_default();
    let request = match verb {
        "CreatePrimitiveTask" => {
            let prerequisites = next();
            let duration = next();
            let description = next();
            Request::CreatePrimitiveTask {
                name: next(),
                description,
                duration,
                prerequisites,
            }
        }
        "CreateCompositeTask" => {
            let subtasks = next();
            let description = next();
            Request::CreateCompositeTask {
                name: next(),
                description,
                subtasks,
            }
        }
        "DeleteTask" => Request::DeleteTask { name: next() },
        "ChangeTask" => {
            let value = next();
            let property = next();
            Request::ChangeTask {
                name: next(),
                property,
                value,
            }
        }
        "PrintTask" => Request::PrintTask { name: next() },
        "PrintAllTasks" => Request::PrintAllTasks,
        "ReportDuration" => Request::ReportDuration { name: next() },
        "ReportEarliestFinishTime" => Request::ReportEarliestFinishTime { name: next() },
        "DefineBasicCriterion" => {
            let value = next();
            let op = next();
            let property = next();
            Request::DefineBasicCriterion {
                name: next(),
                property,
                op,
                value,
            }
        }
        "DefineNegatedCriterion" => {
            let base = next();
            Request::DefineNegatedCriterion { name: next(), base }
        }
        "DefineBinaryCriterion" => {
            let right = next();
            let op = next();
            let left = next();
            Request::DefineBinaryCriterion {
                name: next(),
                left,
                op,
                right,
            }
        }
        "PrintAllCriteria" => Request::PrintAllCriteria,
        "Search" => Request::Search { name: next() },
        "Store" => Request::Store {
            path: PathBuf::from(next()),
        },
        "Load" => Request::Load {
            path: PathBuf::from(next()),
        },
        "undo" => Request::Undo,
        "redo" => Request::Redo,
        _ => Request::Quit,
    };

    Ok(Some(request))
}

impl Request {
    /// Verb as written on the command surface.
    pub fn verb(&self) -> &'static str {
        match self {
            Request::CreatePrimitiveTask { .. } => "CreatePrimitiveTask",
            Request::CreateCompositeTask { .. } => "CreateCompositeTask",
            Request::DeleteTask { .. } => "DeleteTask",
            Request::ChangeTask { .. } => "ChangeTask",
            Request::PrintTask { .. } => "PrintTask",
            Request::PrintAllTasks => "PrintAllTasks",
            Request::ReportDuration { .. } => "ReportDuration",
            Request::ReportEarliestFinishTime { .. } => "ReportEarliestFinishTime",
            Request::DefineBasicCriterion { .. } => "DefineBasicCriterion",
            Request::DefineNegatedCriterion { .. } => "DefineNegatedCriterion",
            Request::DefineBinaryCriterion { .. } => "DefineBinaryCriterion",
            Request::PrintAllCriteria => "PrintAllCriteria",
            Request::Search { .. } => "Search",
            Request::Store { .. } => "Store",
            Request::Load { .. } => "Load",
            Request::Undo => "undo",
            Request::Redo => "redo",
            Request::Quit => "Quit",
        }
    }
}

/// Verb of a raw line, for labelling errors before it parses.
pub fn verb_of(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}
