//! Error types for tms
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad name, unknown task, wrong arity)
//! - 3: Blocked by referential integrity (task in use, cycle)
//! - 4: Operation failed (snapshot I/O, malformed snapshot)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the tms CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const INTEGRITY_BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tms operations
#[derive(Error, Debug)]
pub enum Error {
    // Validation errors
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Invalid description '{0}': only English letters, digits and '-' are allowed")]
    InvalidDescription(String),

    #[error("Invalid duration '{0}': must be a positive real number")]
    InvalidDuration(String),

    #[error("Invalid value '{0}': must be a real number")]
    InvalidValue(String),

    #[error("Invalid operator '{op}' for {property}: expected {expected}")]
    InvalidOperator {
        op: String,
        property: String,
        expected: &'static str,
    },

    #[error("Unknown property '{property}' for {target}")]
    UnknownProperty { property: String, target: String },

    #[error("{0} already exists")]
    DuplicateName(String),

    // Lookups
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Criterion not found: {0}")]
    CriterionNotFound(String),

    // Referential integrity
    #[error("Prerequisite task has not been defined: {0}")]
    UnknownPrerequisite(String),

    #[error("Subtask has not been defined: {0}")]
    UnknownSubtask(String),

    #[error("{name} is a prerequisite of {dependent}")]
    TaskInUse { name: String, dependent: String },

    #[error("Composite task {name} contains subtask {subtask} that cannot be deleted")]
    SubtaskInUse { name: String, subtask: String },

    #[error("Criterion {name} is referenced by {dependent}")]
    CriterionInUse { name: String, dependent: String },

    #[error("Built-in criterion {0} cannot be removed")]
    BuiltinCriterion(String),

    #[error("Operands of a binary criterion cannot be the same: {0}")]
    SameOperand(String),

    #[error("Cyclic dependency detected at {0}")]
    CyclicDependency(String),

    // Command log
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    // Command surface
    #[error("Invalid command, expected \"{usage}\"")]
    InvalidCommand { usage: &'static str },

    #[error("Command not found: {0}")]
    UnknownCommand(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Operation failures
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot {path} line {line}: {message}")]
    InvalidSnapshot {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Coarse error categories reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    DuplicateName,
    NotFound,
    ReferentialIntegrity,
    Io,
    EmptyLog,
    Usage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::DuplicateName => "duplicate_name",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ReferentialIntegrity => "referential_integrity",
            ErrorKind::Io => "io",
            ErrorKind::EmptyLog => "empty_log",
            ErrorKind::Usage => "usage",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidName { .. }
            | Error::InvalidDescription(_)
            | Error::InvalidDuration(_)
            | Error::InvalidValue(_)
            | Error::InvalidOperator { .. }
            | Error::UnknownProperty { .. }
            | Error::SameOperand(_) => ErrorKind::Validation,

            Error::DuplicateName(_) => ErrorKind::DuplicateName,

            Error::TaskNotFound(_) | Error::CriterionNotFound(_) => ErrorKind::NotFound,

            Error::UnknownPrerequisite(_)
            | Error::UnknownSubtask(_)
            | Error::TaskInUse { .. }
            | Error::SubtaskInUse { .. }
            | Error::CriterionInUse { .. }
            | Error::BuiltinCriterion(_)
            | Error::CyclicDependency(_) => ErrorKind::ReferentialIntegrity,

            Error::NothingToUndo | Error::NothingToRedo => ErrorKind::EmptyLog,

            Error::InvalidCommand { .. }
            | Error::UnknownCommand(_)
            | Error::InvalidConfig(_)
            | Error::TomlParse(_) => ErrorKind::Usage,

            Error::Io(_) | Error::InvalidSnapshot { .. } | Error::Json(_) => ErrorKind::Io,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Validation
            | ErrorKind::DuplicateName
            | ErrorKind::NotFound
            | ErrorKind::EmptyLog
            | ErrorKind::Usage => exit_codes::USER_ERROR,

            ErrorKind::ReferentialIntegrity => exit_codes::INTEGRITY_BLOCKED,

            ErrorKind::Io => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for tms operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub kind: ErrorKind,
    pub code: i32,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            kind: err.kind(),
            code: err.exit_code(),
        }
    }
}
