//! Local UI preferences. Not synchronized with the backend.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::watch;

pub const LANGUAGE_KEY: &str = "language";
pub const DEFAULT_LANGUAGE: &str = "zh-CN";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("language code may not be empty")]
    EmptyLanguage,
    #[error("failed to write settings file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsState {
    pub language: String,
    /// Session only; never written to disk.
    pub dark_theme: bool,
    pub loading: bool,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            dark_theme: false,
            loading: false,
        }
    }
}

/// Preferences backed by a JSON object. Only `language` is interpreted;
/// other keys are carried through writes untouched.
pub struct SettingsStore {
    path: PathBuf,
    state: watch::Sender<SettingsState>,
}

impl SettingsStore {
    /// Opens the store and reads `path`. A missing or unreadable file leaves
    /// the defaults in place.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let (state, _) = watch::channel(SettingsState::default());
        let store = Self {
            path: path.into(),
            state,
        };
        store.reload();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the language from disk. Read failures are logged and the
    /// current value kept.
    pub fn reload(&self) {
        self.state.send_modify(|s| s.loading = true);
        match read_entries(&self.path) {
            Ok(entries) => {
                match entries.get(LANGUAGE_KEY).map(stored_language) {
                    Some(Some(language)) => self.state.send_modify(|s| s.language = language),
                    Some(None) => warn!(
                        "ignoring unusable `{LANGUAGE_KEY}` in {}",
                        self.path.display()
                    ),
                    None => {}
                }
                debug!("settings loaded from {}", self.path.display());
            }
            Err(err) => warn!("failed to read settings {}: {err}", self.path.display()),
        }
        self.state.send_modify(|s| s.loading = false);
    }

    pub fn language(&self) -> String {
        self.state.borrow().language.clone()
    }

    pub fn is_dark(&self) -> bool {
        self.state.borrow().dark_theme
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn subscribe(&self) -> watch::Receiver<SettingsState> {
        self.state.subscribe()
    }

    /// Switches language and persists it. The in-memory value changes only if
    /// the write succeeds.
    pub fn set_language(&self, language: &str) -> Result<(), SettingsError> {
        let language = language.trim();
        if language.is_empty() {
            return Err(SettingsError::EmptyLanguage);
        }
        // Keep keys written by other tools; a file that is not a JSON object
        // is replaced.
        let mut entries = read_entries(&self.path).unwrap_or_default();
        entries.insert(LANGUAGE_KEY.to_string(), Value::from(language));
        write_entries(&self.path, &entries)?;

        let language = language.to_string();
        self.state.send_modify(|s| s.language = language);
        Ok(())
    }

    pub fn toggle_theme(&self) -> bool {
        let mut dark = false;
        self.state.send_modify(|s| {
            s.dark_theme = !s.dark_theme;
            dark = s.dark_theme;
        });
        dark
    }
}

fn stored_language(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
}

fn read_entries(path: &Path) -> anyhow::Result<Map<String, Value>> {
    match fs::read_to_string(path) {
        Ok(raw) if raw.trim().is_empty() => Ok(Map::new()),
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Map::new()),
        Err(err) => Err(err.into()),
    }
}

fn write_entries(path: &Path, entries: &Map<String, Value>) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let raw = serde_json::to_string_pretty(entries)?;
    fs::write(path, raw)?;
    Ok(())
}
