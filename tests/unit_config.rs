use std::fs;
use std::path::PathBuf;

use tms::config::{Config, CONFIG_FILE};
use tms::error::Error;
use tms::session::Session;

#[test]
fn config_defaults_when_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::load_from_dir(dir.path()).expect("defaults");

    assert_eq!(config.history.limit, 0);
    assert_eq!(config.snapshot.path, PathBuf::from("tms.snapshot"));
    assert!(config.snapshot.create_dirs);
}

#[test]
fn config_overrides_from_toml() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let toml = r#"
[history]
limit = 1

[snapshot]
path = "state/tasks.snapshot"
create_dirs = false
"#;
    fs::write(dir.path().join(CONFIG_FILE), toml)?;

    let config = Config::load_from_dir(dir.path())?;
    assert_eq!(config.history.limit, 1);
    assert_eq!(config.snapshot.path, PathBuf::from("state/tasks.snapshot"));
    assert!(!config.snapshot.create_dirs);

    let mut session = Session::new(&config);
    let store = session.store_mut();
    store.create_primitive_task("A", "a", "1", ",")?;
    store.create_primitive_task("B", "b", "1", ",")?;
    assert_eq!(session.store().history().undo_len(), 1);
    Ok(())
}

#[test]
fn malformed_config_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(CONFIG_FILE), "[history]\nlimit = \"many\"\n").expect("write");

    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, Error::TomlParse(_)));
    assert_eq!(err.exit_code(), 2);
}
