//! Script persistence: the action list as pretty-printed JSON.

use crate::Action;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Script not found: {0}")]
    NotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Get the app data directory for mimic.
fn app_data_dir() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("mimic")
}

/// Get the named-scripts directory.
pub fn scripts_dir() -> PathBuf {
    app_data_dir().join("scripts")
}

/// Ensure the scripts directory exists.
pub fn ensure_scripts_dir() -> StorageResult<PathBuf> {
    let dir = scripts_dir();
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
        info!(?dir, "Created scripts directory");
    }
    Ok(dir)
}

/// Save an action list to an explicit path (user-chosen file).
pub fn save_script(path: &Path, actions: &[Action]) -> StorageResult<()> {
    let json = serde_json::to_string_pretty(actions)?;
    fs::write(path, json)?;
    info!(?path, count = actions.len(), "Saved script");
    Ok(())
}

/// Load an action list from an explicit path.
pub fn load_script(path: &Path) -> StorageResult<Vec<Action>> {
    let json = fs::read_to_string(path)?;
    let actions: Vec<Action> = serde_json::from_str(&json)?;
    debug!(?path, count = actions.len(), "Loaded script");
    Ok(actions)
}

/// Save an action list under a name in the scripts directory.
pub fn save_named(name: &str, actions: &[Action]) -> StorageResult<PathBuf> {
    let dir = ensure_scripts_dir()?;
    let path = dir.join(format!("{}.json", sanitize_filename(name)));
    save_script(&path, actions)?;
    Ok(path)
}

/// Load a named script from the scripts directory.
pub fn load_named(name: &str) -> StorageResult<Vec<Action>> {
    let path = scripts_dir().join(format!("{}.json", sanitize_filename(name)));
    if !path.exists() {
        return Err(StorageError::NotFound(name.to_string()));
    }
    load_script(&path)
}

/// List all saved script names, sorted.
pub fn list_scripts() -> StorageResult<Vec<String>> {
    let dir = scripts_dir();
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut scripts = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            if let Some(name) = path.file_stem() {
                scripts.push(name.to_string_lossy().to_string());
            }
        }
    }

    scripts.sort();
    Ok(scripts)
}

/// Sanitize a script name to be a valid filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, MouseButton, Point};

    fn sample_actions() -> Vec<Action> {
        vec![
            Action::click(MouseButton::Left, Point::new(100, 100)).with_delay(500),
            Action::click(MouseButton::Right, Point::new(-5, 0)),
            Action::drag(MouseButton::Left, Point::new(10, 10), Point::new(110, 10))
                .with_delay(1500),
            Action::drag(MouseButton::Right, Point::new(0, 0), Point::new(0, 0)).with_delay(0),
            Action::scroll(Point::new(50, 200), Point::new(50, 100)),
        ]
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        let actions = sample_actions();
        save_script(&path, &actions).unwrap();
        assert_eq!(load_script(&path).unwrap(), actions);
    }

    #[test]
    fn test_round_trip_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        save_script(&path, &[]).unwrap();
        assert!(load_script(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_script(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[test]
    fn test_load_malformed_json_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_script(&path), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Script"), "My Script");
        assert_eq!(sanitize_filename("test/script"), "test_script");
        assert_eq!(sanitize_filename("a:b*c?d"), "a_b_c_d");
    }
}
