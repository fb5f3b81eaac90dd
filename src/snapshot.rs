//! Snapshot codec for tms
//!
//! Line-oriented text format. Each entity is a block delimited by a marker
//! line: `$` for primitive tasks, `%` for composite tasks, `^` for criteria.
//!
//! ```text
//! $
//! Boil,
//! Boil-water,
//! 3.0,
//! NULL
//! $
//! %
//! Tea,
//! ,
//! Boil,Brew
//! %
//! ^
//! 0
//! Long,
//! duration,
//! >,
//! 2,
//! 0
//! ^
//! ```
//!
//! Name, description, duration and criterion fields carry one trailing comma.
//! Empty prerequisite lists are written as `NULL`, empty subtask lists as `null`.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::config::SnapshotConfig;
use crate::criteria::{self, Criterion, LogicOp, BINARY_PROPERTY, NEGATION_PROPERTY, NULL_FIELD};
use crate::error::{Error, Result};
use crate::store::TaskStore;
use crate::task::{
    format_duration, validate_description, validate_duration, validate_name, CompositeTask,
    PrimitiveTask, Task,
};

const PRIMITIVE_MARK: &str = "$";
const COMPOSITE_MARK: &str = "%";
const CRITERION_MARK: &str = "^";
const NO_PREREQUISITES: &str = "NULL";
const NO_SUBTASKS: &str = "null";

/// Result of a store or load.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    pub path: PathBuf,
    pub tasks: usize,
    pub criteria: usize,
}

/// Decoded snapshot contents, not yet installed in a store.
#[derive(Debug, Clone, Default)]
pub struct Contents {
    pub tasks: BTreeMap<String, Task>,
    pub criteria: BTreeMap<String, Criterion>,
}

/// Write every task and criterion to `path`.
///
/// The file is written to a temporary sibling and renamed over the target.
pub fn store(store: &TaskStore, path: &Path, options: &SnapshotConfig) -> Result<SnapshotSummary> {
    let text = encode(store);

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if options.create_dirs {
        fs::create_dir_all(&parent)?;
    }

    let mut file = NamedTempFile::new_in(&parent)?;
    file.write_all(text.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| Error::Io(err.error))?;

    let summary = SnapshotSummary {
        path: path.to_path_buf(),
        tasks: store.task_map().len(),
        criteria: store.criterion_map().len(),
    };
    tracing::info!(path = %path.display(), tasks = summary.tasks, "stored snapshot");
    Ok(summary)
}

/// Replace the store's contents with the snapshot at `path`.
///
/// Nothing changes unless the whole file parses and every reference resolves.
/// On success the command log is cleared.
pub fn load(store: &mut TaskStore, path: &Path) -> Result<SnapshotSummary> {
    let text = fs::read_to_string(path)?;
    let contents = decode(&text, path)?;

    let summary = SnapshotSummary {
        path: path.to_path_buf(),
        tasks: contents.tasks.len(),
        criteria: contents.criteria.len(),
    };
    store.replace_contents(contents.tasks, contents.criteria);
    tracing::info!(path = %path.display(), tasks = summary.tasks, "loaded snapshot");
    Ok(summary)
}

/// Render the store in snapshot format.
pub fn encode(store: &TaskStore) -> String {
    let mut out = String::new();
    let mut line = |text: &str| {
        out.push_str(text);
        out.push('\n');
    };

    for task in store.primitive_tasks() {
        line(PRIMITIVE_MARK);
        line(&format!("{},", task.name));
        line(&format!("{},", task.description));
        line(&format!("{},", format_duration(task.duration)));
        if task.prerequisites.is_empty() {
            line(NO_PREREQUISITES);
        } else {
            line(&task.prerequisites.join(","));
        }
        line(PRIMITIVE_MARK);
    }

    for task in store.composite_tasks() {
        line(COMPOSITE_MARK);
        line(&format!("{},", task.name));
        line(&format!("{},", task.description));
        if task.subtasks.is_empty() {
            line(NO_SUBTASKS);
        } else {
            line(&task.subtasks.join(","));
        }
        line(COMPOSITE_MARK);
    }

    for (name, criterion) in store.criteria() {
        let flag = if *criterion == Criterion::IsPrimitive { "1" } else { "0" };
        let (property, op, value) = criterion.fields();
        line(CRITERION_MARK);
        line(flag);
        line(&format!("{name},"));
        line(&format!("{property},"));
        line(&format!("{op},"));
        line(&format!("{value},"));
        line(flag);
        line(CRITERION_MARK);
    }

    out
}

/// Parse snapshot text. `path` is only used in error messages.
pub fn decode(text: &str, path: &Path) -> Result<Contents> {
    let mut reader = Reader::new(text, path);
    let mut contents = Contents::default();

    while let Some(marker) = reader.next_line() {
        let start = reader.line;
        match marker.trim() {
            "" => continue,
            PRIMITIVE_MARK => {
                let task = read_primitive(&mut reader)?;
                reader.expect(PRIMITIVE_MARK)?;
                insert_unique(&contents, &task.name, false, start, path)?;
                contents.tasks.insert(task.name.clone(), Task::Primitive(task));
            }
            COMPOSITE_MARK => {
                let task = read_composite(&mut reader)?;
                reader.expect(COMPOSITE_MARK)?;
                insert_unique(&contents, &task.name, false, start, path)?;
                contents.tasks.insert(task.name.clone(), Task::Composite(task));
            }
            CRITERION_MARK => {
                let (name, criterion) = read_criterion(&mut reader)?;
                reader.expect(CRITERION_MARK)?;
                insert_unique(&contents, &name, criterion.is_builtin(), start, path)?;
                contents.criteria.insert(name, criterion);
            }
            other => return Err(reader.error(format!("unexpected line '{other}'"))),
        }
    }

    check_references(&contents, path)?;
    Ok(contents)
}

fn insert_unique(contents: &Contents, name: &str, builtin: bool, line: usize, path: &Path) -> Result<()> {
    let invalid = |message: String| Error::InvalidSnapshot {
        path: path.to_path_buf(),
        line,
        message,
    };

    let reserved = criteria::builtins().iter().any(|(reserved, _)| *reserved == name);
    if reserved != builtin {
        return Err(invalid(format!("'{name}' is reserved for a built-in criterion")));
    }
    if contents.tasks.contains_key(name) || contents.criteria.contains_key(name) {
        return Err(invalid(format!("duplicate name '{name}'")));
    }
    Ok(())
}

fn read_primitive(reader: &mut Reader<'_>) -> Result<PrimitiveTask> {
    let name = reader.name()?;
    let description = reader.description()?;
    let duration_text = reader.field()?;
    let duration = duration_text
        .parse::<f64>()
        .ok()
        .filter(|value| validate_duration(*value).is_ok())
        .ok_or_else(|| reader.error(format!("invalid duration '{duration_text}'")))?;
    let prerequisites = reader.name_list(NO_PREREQUISITES)?;

    Ok(PrimitiveTask {
        name,
        description,
        duration,
        prerequisites,
    })
}

fn read_composite(reader: &mut Reader<'_>) -> Result<CompositeTask> {
    let name = reader.name()?;
    let description = reader.description()?;
    let subtasks = reader.name_list(NO_SUBTASKS)?;

    Ok(CompositeTask {
        name,
        description,
        subtasks,
    })
}

fn read_criterion(reader: &mut Reader<'_>) -> Result<(String, Criterion)> {
    reader.flag()?;
    let name = reader.field()?;
    let property = reader.field()?;
    let op = reader.field()?;
    let value = reader.field()?;
    reader.flag()?;

    let criterion = if property == NULL_FIELD && op == "IsPrimitive" {
        Criterion::IsPrimitive
    } else if property == NULL_FIELD && op == "IsComposite" {
        Criterion::IsComposite
    } else if property == NEGATION_PROPERTY {
        Criterion::Negated { base: value, op }
    } else if property == BINARY_PROPERTY {
        let op = LogicOp::parse(&op)
            .ok_or_else(|| reader.error(format!("invalid binary operator '{op}'")))?;
        let (left, right) = value
            .split_once(',')
            .ok_or_else(|| reader.error(format!("invalid binary operands '{value}'")))?;
        Criterion::Binary {
            left: left.to_string(),
            op,
            right: right.to_string(),
        }
    } else {
        Criterion::basic(&property, &op, &value).map_err(|err| reader.error(err.to_string()))?
    };

    if !criterion.is_builtin() {
        validate_name(&name).map_err(|err| reader.error(err.to_string()))?;
    }
    Ok((name, criterion))
}

fn check_references(contents: &Contents, path: &Path) -> Result<()> {
    let invalid = |message: String| Error::InvalidSnapshot {
        path: path.to_path_buf(),
        line: 0,
        message,
    };

    for task in contents.tasks.values() {
        if let Some(missing) = task
            .references()
            .iter()
            .find(|name| !contents.tasks.contains_key(name.as_str()))
        {
            return Err(invalid(format!(
                "task '{}' references unknown task '{missing}'",
                task.name()
            )));
        }
    }

    for (name, criterion) in &contents.criteria {
        if let Some(missing) = criterion.operands().into_iter().find(|operand| {
            !contents.criteria.contains_key(*operand)
                && !criteria::builtins().iter().any(|(builtin, _)| builtin == operand)
        }) {
            return Err(invalid(format!(
                "criterion '{name}' references unknown criterion '{missing}'"
            )));
        }
    }
    Ok(())
}

struct Reader<'a> {
    lines: std::str::Lines<'a>,
    path: &'a Path,
    line: usize,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str, path: &'a Path) -> Self {
        Self {
            lines: text.lines(),
            path,
            line: 0,
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line += 1;
        Some(line.trim_end_matches('\r'))
    }

    fn required(&mut self) -> Result<&'a str> {
        self.next_line()
            .ok_or_else(|| self.error("unexpected end of file".to_string()))
    }

    /// A field line with its single trailing comma removed.
    fn field(&mut self) -> Result<String> {
        let line = self.required()?;
        Ok(line.strip_suffix(',').unwrap_or(line).to_string())
    }

    fn name(&mut self) -> Result<String> {
        let name = self.field()?;
        validate_name(&name).map_err(|err| self.error(err.to_string()))?;
        Ok(name)
    }

    fn description(&mut self) -> Result<String> {
        let description = self.field()?;
        validate_description(&description).map_err(|err| self.error(err.to_string()))?;
        Ok(description)
    }

    fn name_list(&mut self, empty: &str) -> Result<Vec<String>> {
        let line = self.required()?.trim();
        if line.is_empty() || line == empty {
            return Ok(Vec::new());
        }
        Ok(line
            .split(',')
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn flag(&mut self) -> Result<()> {
        match self.required()?.trim() {
            "0" | "1" => Ok(()),
            other => Err(self.error(format!("expected 0 or 1, found '{other}'"))),
        }
    }

    fn expect(&mut self, marker: &str) -> Result<()> {
        let line = self.required()?;
        if line.trim() == marker {
            Ok(())
        } else {
            Err(self.error(format!("expected '{marker}', found '{line}'")))
        }
    }

    fn error(&self, message: String) -> Error {
        Error::InvalidSnapshot {
            path: self.path.to_path_buf(),
            line: self.line,
            message,
        }
    }
}
