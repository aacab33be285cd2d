//! Debugger configuration loading.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use smol_str::SmolStr;

use crate::error::DebugError;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Session-wide debugger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggerConfig {
    /// Base directory for relative breakpoint paths (cwd when unset).
    pub root: Option<PathBuf>,
    /// Stop on the first line event of the first dispatcher.
    pub stop_on_entry: bool,
    /// Include disabled breakpoints in listings by default.
    pub show_disabled: bool,
    /// Default log filter level.
    pub log_level: SmolStr,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            root: None,
            stop_on_entry: true,
            show_disabled: false,
            log_level: SmolStr::new("info"),
        }
    }
}

impl DebuggerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DebugError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| DebugError::Io(format!("{}: {err}", path.display()).into()))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, DebugError> {
        let raw: DebuggerToml = toml::from_str(text)
            .map_err(|err| DebugError::InvalidConfig(format!("rdb.toml: {err}").into()))?;
        raw.into_config()
    }
}

#[derive(Debug, Deserialize)]
struct DebuggerToml {
    paths: Option<PathsSection>,
    debugger: Option<DebuggerSection>,
    log: Option<LogSection>,
}

#[derive(Debug, Deserialize)]
struct PathsSection {
    root: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DebuggerSection {
    stop_on_entry: Option<bool>,
    show_disabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct LogSection {
    level: Option<String>,
}

impl DebuggerToml {
    fn into_config(self) -> Result<DebuggerConfig, DebugError> {
        let defaults = DebuggerConfig::default();
        let root = match self.paths.and_then(|paths| paths.root) {
            Some(root) if root.trim().is_empty() => {
                return Err(DebugError::InvalidConfig(
                    "paths.root must not be empty".into(),
                ))
            }
            Some(root) => Some(PathBuf::from(root.trim())),
            None => None,
        };
        let (stop_on_entry, show_disabled) = match self.debugger {
            Some(section) => (
                section.stop_on_entry.unwrap_or(defaults.stop_on_entry),
                section.show_disabled.unwrap_or(defaults.show_disabled),
            ),
            None => (defaults.stop_on_entry, defaults.show_disabled),
        };
        let log_level = match self.log.and_then(|log| log.level) {
            Some(level) => parse_log_level(&level)?,
            None => defaults.log_level,
        };
        Ok(DebuggerConfig {
            root,
            stop_on_entry,
            show_disabled,
            log_level,
        })
    }
}

fn parse_log_level(text: &str) -> Result<SmolStr, DebugError> {
    let level = text.trim().to_ascii_lowercase();
    if LOG_LEVELS.contains(&level.as_str()) {
        Ok(SmolStr::new(level))
    } else {
        Err(DebugError::InvalidConfig(
            format!("invalid log.level '{text}'").into(),
        ))
    }
}
