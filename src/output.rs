//! Output formatting for tms responses.
//!
//! Human output mirrors the classic console wording ("A has been successfully
//! created."). JSON output wraps each response in a one-line envelope.

use serde::Serialize;

use crate::error::{Error, ErrorKind, Result};
use crate::session::Response;
use crate::task::{format_duration, Task};

pub const SCHEMA_VERSION: &str = "tms.v1";

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HumanOutput {
    lines: Vec<String>,
    warnings: Vec<String>,
}

impl HumanOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, value: impl Into<String>) {
        self.lines.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.warnings.is_empty()
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings: human.map(|h| h.warnings.clone()).unwrap_or_default(),
        };

        println!("{}", serde_json::to_string(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human.filter(|human| !human.is_empty()) {
        println!("{}", format_human(human));
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hint = error_hint(err);
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
            kind: ErrorKind,
            #[serde(skip_serializing_if = "Option::is_none")]
            hint: Option<&'a str>,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &err.to_string(),
                code: err.exit_code(),
                kind: err.kind(),
                hint,
            },
        };

        println!("{}", serde_json::to_string(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = output.lines.clone();
    lines.extend(output.warnings.iter().map(|w| format!("warning: {w}")));
    lines.join("\n")
}

/// Human rendering of a response.
pub fn render(response: &Response) -> HumanOutput {
    let mut out = HumanOutput::new();
    match response {
        Response::Created { name } => {
            out.push_line(format!("{name} has been successfully created."));
        }
        Response::Deleted { name } => {
            out.push_line(format!("{name} has been successfully deleted."));
        }
        Response::Changed { name, property } => {
            out.push_line(format!("{name}'s {property} has been successfully changed."));
        }
        Response::Task { task } => out.push_line(format_task(task)),
        Response::Tasks {
            primitive,
            composite,
        } => {
            out.push_line("Here is the list of Simple Task(s)");
            for task in primitive {
                out.push_line(format_task(&Task::Primitive(task.clone())));
            }
            out.push_line("");
            out.push_line("Here is the list of Composite Task(s)");
            for task in composite {
                out.push_line(format_task(&Task::Composite(task.clone())));
            }
        }
        Response::Duration { duration, .. } => out.push_line(format_duration(*duration)),
        Response::EarliestFinishTime { time, .. } => out.push_line(format_duration(*time)),
        Response::Defined { name, requested } => match requested {
            Some(requested) => {
                out.push_line(format!("{name} is available."));
                out.push_warning(format!(
                    "the negation of a built-in is the built-in {name}; {requested} was not defined"
                ));
            }
            None => out.push_line(format!("{name} has been successfully defined.")),
        },
        Response::Criteria { criteria } => {
            out.push_line("Here is the list of Criteria(s)");
            for row in criteria {
                if row.builtin {
                    out.push_line(row.name.clone());
                } else {
                    out.push_line(format!(
                        "{} -> property: {}, value: {}, op: {}",
                        row.name, row.property, row.value, row.op
                    ));
                }
            }
        }
        Response::Search { criterion, matches } => {
            if matches.is_empty() {
                out.push_line(format!("{criterion} does not contain any task(s)."));
            } else {
                out.push_line(format!("Here is the list of task(s) of {criterion}"));
                out.push_line(matches.join(" "));
            }
        }
        Response::Stored(_) => out.push_line("Tasks and criteria stored successfully."),
        Response::Loaded(_) => out.push_line("Tasks and criteria read successfully."),
        Response::Undone(summary) => out.push_line(format!("undo: {}", summary.applied)),
        Response::Redone(summary) => out.push_line(format!("redo: {}", summary.applied)),
        Response::Quit => {}
    }
    out
}

/// One-line description of a task, e.g. `B -> description: b, duration: 4.0, prerequisite(s): A`.
pub fn format_task(task: &Task) -> String {
    let names = |names: &[String]| {
        if names.is_empty() {
            "null".to_string()
        } else {
            names.join(" ")
        }
    };

    match task {
        Task::Primitive(task) => format!(
            "{} -> description: {}, duration: {}, prerequisite(s): {}",
            task.name,
            task.description,
            format_duration(task.duration),
            names(&task.prerequisites)
        ),
        Task::Composite(task) => format!(
            "{} -> description: {}, subtasks: {}",
            task.name,
            task.description,
            names(&task.subtasks)
        ),
    }
}

fn error_hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::TaskInUse { .. } => Some("change or delete the dependent task's prerequisites first"),
        Error::SubtaskInUse { .. } => Some("no task was deleted; free the subtask's dependents first"),
        Error::NothingToUndo | Error::NothingToRedo => Some("the log is cleared by Load"),
        Error::InvalidConfig(_) | Error::TomlParse(_) => Some("fix .tms.toml then retry"),
        _ => None,
    }
}
