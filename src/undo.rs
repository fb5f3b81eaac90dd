//! Undo and redo over the command log.
//!
//! Basic semantics:
//! - Undo pops the newest inverse, applies it, and pushes the resulting
//!   inverse onto the redo stack
//! - Redo is symmetric
//! - A replay that fails leaves the store unchanged and puts the entry back

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::history::{Command, CommandRecord};
use crate::store::TaskStore;

/// Summary of an undo or redo step.
#[derive(Debug, Clone, Serialize)]
pub struct UndoSummary {
    pub op_id: Uuid,
    /// Command that was applied to the store
    pub applied: Command,
    /// Entries left on the stack that was popped
    pub remaining: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Undo,
    Redo,
}

/// Revert the most recent mutation.
pub fn undo(store: &mut TaskStore) -> Result<UndoSummary> {
    replay(store, Direction::Undo)
}

/// Re-apply the most recently undone mutation.
pub fn redo(store: &mut TaskStore) -> Result<UndoSummary> {
    replay(store, Direction::Redo)
}

fn replay(store: &mut TaskStore, direction: Direction) -> Result<UndoSummary> {
    let history = store.history_mut();
    let record = match direction {
        Direction::Undo => history.pop_undo().ok_or(Error::NothingToUndo)?,
        Direction::Redo => history.pop_redo().ok_or(Error::NothingToRedo)?,
    };

    tracing::debug!(op_id = %record.op_id, command = %record.command, ?direction, "replaying");
    let inverse = match store.apply(record.command.clone()) {
        Ok(inverse) => inverse,
        Err(err) => {
            tracing::debug!(op_id = %record.op_id, error = %err, "replay failed");
            let history = store.history_mut();
            match direction {
                Direction::Undo => history.push_undo(record),
                Direction::Redo => history.push_redo(record),
            }
            return Err(err);
        }
    };

    let opposite = CommandRecord {
        op_id: record.op_id,
        recorded_at: Utc::now(),
        command: inverse,
    };
    let history = store.history_mut();
    let remaining = match direction {
        Direction::Undo => {
            history.push_redo(opposite);
            history.undo_len()
        }
        Direction::Redo => {
            history.push_undo(opposite);
            history.redo_len()
        }
    };

    Ok(UndoSummary {
        op_id: record.op_id,
        applied: record.command,
        remaining,
    })
}
