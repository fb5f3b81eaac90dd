use std::path::PathBuf;

use tms::error::{exit_codes, Error, ErrorKind, JsonError};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::TaskNotFound("A".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let usage = Error::InvalidCommand { usage: "DeleteTask name" };
    assert_eq!(usage.exit_code(), exit_codes::USER_ERROR);

    let blocked = Error::TaskInUse {
        name: "A".to_string(),
        dependent: "B".to_string(),
    };
    assert_eq!(blocked.exit_code(), exit_codes::INTEGRITY_BLOCKED);

    let op = Error::InvalidSnapshot {
        path: PathBuf::from("tasks.snapshot"),
        line: 3,
        message: "expected duration".to_string(),
    };
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn empty_log_is_a_user_error() {
    assert_eq!(Error::NothingToUndo.kind(), ErrorKind::EmptyLog);
    assert_eq!(Error::NothingToRedo.exit_code(), exit_codes::USER_ERROR);
}

#[test]
fn json_error_includes_code() {
    let err = Error::CriterionNotFound("Long".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert_eq!(json.kind, ErrorKind::NotFound);
    assert!(json.error.contains("Criterion not found"));
}

#[test]
fn error_kinds_serialize_snake_case() -> Result<(), Box<dyn std::error::Error>> {
    let value = serde_json::to_string(&ErrorKind::ReferentialIntegrity)?;
    assert_eq!(value, "\"referential_integrity\"");
    assert_eq!(ErrorKind::DuplicateName.as_str(), "duplicate_name");
    Ok(())
}
