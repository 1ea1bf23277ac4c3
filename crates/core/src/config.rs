use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::extractor::DEFAULT_MAX_ATTEMPTS;

/// Notes directory relative to the home directory.
pub const DEFAULT_NOTES_DIR: &str = ".notable/notes";
/// Index file relative to the home directory.
pub const DEFAULT_INDEX_PATH: &str = "Desktop/index.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotesConfig {
    /// Defaults to `~/.notable/notes`.
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Defaults to `~/Desktop/index.json`.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl AppConfig {
    pub fn notes_dir(&self) -> anyhow::Result<PathBuf> {
        resolve(self.notes.dir.as_deref(), DEFAULT_NOTES_DIR)
    }

    pub fn index_path(&self) -> anyhow::Result<PathBuf> {
        resolve(self.index.path.as_deref(), DEFAULT_INDEX_PATH)
    }
}

/// Loads configuration from `path`, or from the optional per-user file
/// `<config dir>/notes-index/config.{toml,yaml,json}` when no path is given.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else if let Some(dir) = dirs::config_dir() {
        let default = dir.join("notes-index").join("config");
        settings =
            settings.add_source(config::File::with_name(&default.to_string_lossy()).required(false));
    }
    let cfg: AppConfig = settings.build()?.try_deserialize()?;
    if cfg.extraction.max_attempts == 0 {
        bail!("extraction.max_attempts must be at least 1");
    }
    Ok(cfg)
}

fn resolve(configured: Option<&str>, default: &str) -> anyhow::Result<PathBuf> {
    match configured {
        Some(raw) => match raw.strip_prefix("~/") {
            Some(rest) => Ok(home_dir()?.join(rest)),
            None => Ok(PathBuf::from(raw)),
        },
        None => Ok(home_dir()?.join(default)),
    }
}

fn home_dir() -> anyhow::Result<PathBuf> {
    dirs::home_dir().context("home directory not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_resolve_under_home() {
        let cfg = AppConfig::default();
        let home = dirs::home_dir().unwrap();
        assert_eq!(cfg.notes_dir().unwrap(), home.join(".notable/notes"));
        assert_eq!(cfg.index_path().unwrap(), home.join("Desktop/index.json"));
        assert_eq!(cfg.extraction.max_attempts, 4);
    }

    #[test]
    fn loads_explicit_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("notes-index.toml");
        fs::write(
            &path,
            "[notes]\ndir = \"/srv/notes\"\n\n[index]\npath = \"~/index.json\"\n\n[extraction]\nmax_attempts = 2\n",
        )
        .unwrap();

        let cfg = load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(cfg.notes_dir().unwrap(), PathBuf::from("/srv/notes"));
        assert_eq!(
            cfg.index_path().unwrap(),
            dirs::home_dir().unwrap().join("index.json")
        );
        assert_eq!(cfg.extraction.max_attempts, 2);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("partial.toml");
        fs::write(&path, "[notes]\ndir = \"/srv/notes\"\n").unwrap();

        let cfg = load(Some(path.to_str().unwrap())).unwrap();
        assert!(cfg.index.path.is_none());
        assert_eq!(cfg.extraction.max_attempts, 4);
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("bad.toml");
        fs::write(&path, "[extraction]\nmax_attempts = 0\n").unwrap();

        assert!(load(Some(path.to_str().unwrap())).is_err());
    }
}
