//! User configuration, stored by confy under the `txtodo` app name

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use txtodo_core::SortMode;

use crate::error::{CliError, Result};

/// File name used when no todo file is configured
pub const DEFAULT_TODO_FILE: &str = "todo.txt";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the todo file; `~/todo.txt` when unset
    pub todo_file: Option<PathBuf>,
    /// Path of the archive; `done.txt` beside the todo file when unset
    pub archive_file: Option<PathBuf>,
    /// Default list order
    pub sort: SortMode,
    /// Default due window in days, negative for all
    pub days: i64,
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            todo_file: None,
            archive_file: None,
            sort: SortMode::Due,
            days: -1,
            color: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(confy::load("txtodo", None)?)
    }

    /// Todo file path: command line, then config, then the home directory
    pub fn todo_path(&self, cli_override: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = cli_override.or_else(|| self.todo_file.clone()) {
            return Ok(path);
        }
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_TODO_FILE))
            .ok_or_else(|| CliError::config("No home directory found; set todo_file or pass --file"))
    }

    /// Archive path override, if any
    pub fn archive_path(&self, cli_override: Option<PathBuf>) -> Option<PathBuf> {
        cli_override.or_else(|| self.archive_file.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sort, SortMode::Due);
        assert_eq!(config.days, -1);
        assert!(config.color);
        assert!(config.todo_file.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"sort": "prio", "days": 3}"#).unwrap();
        assert_eq!(config.sort, SortMode::Priority);
        assert_eq!(config.days, 3);
        assert!(config.color);
    }

    #[test]
    fn test_command_line_overrides_config() {
        let config = Config {
            todo_file: Some(PathBuf::from("/cfg/todo.txt")),
            archive_file: Some(PathBuf::from("/cfg/done.txt")),
            ..Config::default()
        };
        assert_eq!(
            config.todo_path(Some(PathBuf::from("/cli/todo.txt"))).unwrap(),
            PathBuf::from("/cli/todo.txt")
        );
        assert_eq!(config.todo_path(None).unwrap(), PathBuf::from("/cfg/todo.txt"));
        assert_eq!(config.archive_path(None), Some(PathBuf::from("/cfg/done.txt")));
        assert_eq!(
            config.archive_path(Some(PathBuf::from("/cli/a.txt"))),
            Some(PathBuf::from("/cli/a.txt"))
        );
    }
}
