//! Hidden link settings.
//!
//! Settings are stored as a small JSON record. Any subset of the keys may be
//! absent on disk; missing keys fall back to [`HiddenLinkSettings::default`].
//!
//! Scans never read settings through a shared mutable reference. Every
//! decoration or replacement pass starts by taking an immutable snapshot from
//! the [`SettingsStore`], so an edit made mid-pass only affects the next pass.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::primitives::keychord::{KeyChord, ParseKeyChordError};

pub const DEFAULT_START_DELIMITER: &str = "::";
pub const DEFAULT_SEPARATOR: &str = "|";
pub const DEFAULT_END_DELIMITER: &str = "::";
pub const DEFAULT_NOTIFICATION_TEXT: &str = "Copied to clipboard!";
pub const DEFAULT_COPY_SHORTCUT: &str = "Alt-Enter";

/// Notification shown when the clipboard rejects a write.
pub const COPY_FAILED_TEXT: &str = "Failed to copy to clipboard";

/// The three delimiter strings that make up the hidden link syntax:
/// `start payload separator display end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelimiterConfig {
    pub start: String,
    pub separator: String,
    pub end: String,
}

impl DelimiterConfig {
    pub fn new(
        start: impl Into<String>,
        separator: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            start: start.into(),
            separator: separator.into(),
            end: end.into(),
        }
    }

    /// True if any delimiter is empty. Such a configuration can not be
    /// matched meaningfully.
    pub fn has_empty_delimiter(&self) -> bool {
        self.start.is_empty() || self.separator.is_empty() || self.end.is_empty()
    }
}

impl Default for DelimiterConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_START_DELIMITER,
            DEFAULT_SEPARATOR,
            DEFAULT_END_DELIMITER,
        )
    }
}

/// Persisted settings record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
#[schemars(title = "Hidden Link Settings")]
pub struct HiddenLinkSettings {
    /// Text that marks the beginning of a hidden block
    pub start_delimiter: String,

    /// Text that separates the hidden payload from the display text
    pub separator: String,

    /// Text that marks the end of a hidden block
    pub end_delimiter: String,

    /// Message shown when hidden text is copied to clipboard
    pub notification_text: String,

    /// Key chord that copies the payload under the caret, e.g. `Alt-Enter`
    pub copy_shortcut: String,
}

impl Default for HiddenLinkSettings {
    fn default() -> Self {
        Self {
            start_delimiter: DEFAULT_START_DELIMITER.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            end_delimiter: DEFAULT_END_DELIMITER.to_string(),
            notification_text: DEFAULT_NOTIFICATION_TEXT.to_string(),
            copy_shortcut: DEFAULT_COPY_SHORTCUT.to_string(),
        }
    }
}

impl HiddenLinkSettings {
    /// Delimiters for a single scan pass.
    pub fn delimiters(&self) -> DelimiterConfig {
        DelimiterConfig::new(
            self.start_delimiter.clone(),
            self.separator.clone(),
            self.end_delimiter.clone(),
        )
    }

    /// Parse the configured copy shortcut.
    pub fn copy_chord(&self) -> Result<KeyChord, ParseKeyChordError> {
        self.copy_shortcut.parse()
    }

    /// Parse settings from JSON, merging present keys over the defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(SettingsError::Parse)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Owns the current settings and hands out immutable snapshots.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    current: Arc<HiddenLinkSettings>,
}

impl SettingsStore {
    /// A store that is never persisted.
    pub fn in_memory(settings: HiddenLinkSettings) -> Self {
        Self {
            path: None,
            current: Arc::new(settings),
        }
    }

    /// Default settings file location: `<config dir>/hidelink/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hidelink").join("settings.json"))
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let settings = match std::fs::read_to_string(&path) {
            Ok(content) => HiddenLinkSettings::from_json(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("settings file {} not found, using defaults", path.display());
                HiddenLinkSettings::default()
            }
            Err(source) => return Err(SettingsError::Io { path, source }),
        };

        Ok(Self {
            path: Some(path),
            current: Arc::new(settings),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Immutable view of the current settings.
    pub fn snapshot(&self) -> Arc<HiddenLinkSettings> {
        Arc::clone(&self.current)
    }

    /// Apply an edit. Snapshots taken earlier are unaffected.
    pub fn update(&mut self, edit: impl FnOnce(&mut HiddenLinkSettings)) {
        let mut next = (*self.current).clone();
        edit(&mut next);
        self.current = Arc::new(next);
    }

    /// Persist the current settings. In-memory stores do nothing.
    pub fn save(&self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(self.current.as_ref())?;
        std::fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::in_memory(HiddenLinkSettings::default())
    }
}
