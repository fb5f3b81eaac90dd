//! tms - Task Management System Library
//!
//! Core of a small task manager: a graph of named tasks, queries over it,
//! criteria search, and an undo/redo log.
//!
//! # Core Concepts
//!
//! - **Primitive tasks**: leaf units of work with a duration and prerequisites
//! - **Composite tasks**: named groups of subtasks
//! - **Criteria**: named predicates over tasks, combinable with negation and `&&`/`||`
//! - **Command log**: every mutation records its inverse for undo and redo
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `command`: Parser for the line-oriented command syntax
//! - `config`: Configuration loading from `.tms.toml`
//! - `criteria`: Criterion model and search evaluation
//! - `error`: Error types and result aliases
//! - `history`: Command descriptors and undo/redo stacks
//! - `output`: Human and JSON output
//! - `schedule`: Duration and earliest finish time
//! - `session`: Executes parsed commands against a store
//! - `snapshot`: Text snapshot store/load
//! - `store`: Task and criterion store
//! - `task`: Task model and validation rules
//! - `undo`: Undo and redo entry points

pub mod cli;
pub mod command;
pub mod config;
pub mod criteria;
pub mod error;
pub mod history;
pub mod output;
pub mod schedule;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod task;
pub mod undo;

pub use error::{Error, Result};
pub use store::TaskStore;
