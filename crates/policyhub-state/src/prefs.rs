//! Preference persistence.
//!
//! Preferences are stored as JSON in the platform config folder:
//! - macOS: ~/Library/Application Support/dev.policyhub.Policy-Hub/
//! - Windows: %APPDATA%/policyhub/Policy Hub/config/
//! - Linux: ~/.config/policyhub/

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use policyhub_model::Preferences;
use thiserror::Error;

const APP_QUALIFIER: &str = "dev";
const APP_ORG: &str = "policyhub";
const APP_NAME: &str = "Policy Hub";
const PREFS_FILENAME: &str = "preferences.json";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PrefsError {
    #[error("could not determine the config directory")]
    NoConfigDir,

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Default location of the preferences file, if the platform has one.
#[must_use]
pub fn default_prefs_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(PREFS_FILENAME))
}

/// Preferences file at a fixed path.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
}

impl PrefsStore {
    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform config folder.
    pub fn open_default() -> Result<Self, PrefsError> {
        default_prefs_path()
            .map(Self::at)
            .ok_or(PrefsError::NoConfigDir)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the preferences. Missing or unreadable files yield defaults.
    #[must_use]
    pub fn load(&self) -> Preferences {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(prefs) => {
                    tracing::debug!(path = %self.path.display(), "loaded preferences");
                    prefs
                }
                Err(e) => {
                    tracing::warn!("failed to parse preferences: {e}, using defaults");
                    Preferences::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Preferences::default(),
            Err(e) => {
                tracing::warn!("failed to read preferences: {e}, using defaults");
                Preferences::default()
            }
        }
    }

    /// Writes the preferences, creating the parent directory when needed.
    pub fn save(&self, prefs: &Preferences) -> Result<(), PrefsError> {
        let io_err = |source| PrefsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(prefs)?;
        fs::write(&self.path, content).map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), "saved preferences");
        Ok(())
    }

    /// Loads, applies `change`, saves, and returns the result.
    pub fn update(&self, change: impl FnOnce(&mut Preferences)) -> Result<Preferences, PrefsError> {
        let mut prefs = self.load();
        change(&mut prefs);
        self.save(&prefs)?;
        Ok(prefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policyhub_model::{Theme, ViewMode};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PrefsStore::at(dir.path().join("prefs.json"));
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").expect("write");
        assert_eq!(PrefsStore::at(path).load(), Preferences::default());
    }

    #[test]
    fn test_update_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PrefsStore::at(dir.path().join("nested").join("prefs.json"));
        store
            .update(|prefs| {
                prefs.theme = prefs.theme.toggled();
                prefs.view_mode = ViewMode::List;
            })
            .expect("update");

        let reloaded = store.load();
        assert_eq!(reloaded.theme, Theme::Dark);
        assert_eq!(reloaded.view_mode, ViewMode::List);
    }
}
