use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::line::SideChoice;

pub const DEFAULT_SPLIT: &str = " - ";
pub const DEFAULT_COMMENT: &str = "#";
pub const DEFAULT_BLOCK_COMMENT: &str = "\"\"\"";

/// Settings in effect for a session. Persisted alongside every saved session
/// so a resumed game keeps the rules it was started with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    // General
    pub only_once: bool,
    pub batch_mode: bool,
    pub batch_size: usize,
    pub random_line_pre_batch: bool,
    #[serde(alias = "randomLine")]
    pub random_line_post_batch: bool,
    /// Side shown as the prompt; the answer is the other one.
    pub from_side: SideChoice,
    pub line_whitelist: BTreeSet<usize>,
    pub line_blacklist: BTreeSet<usize>,
    // Typing mode
    pub typing_mode: bool,
    pub case_sensitive: bool,
    pub whitespace_sensitive: bool,
    // Info
    pub show_position: bool,
    pub show_mistake_count: bool,
    pub show_score: bool,
    pub no_cls: bool,
    // Affixes
    pub split: String,
    pub comment: String,
    pub block_comment: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            only_once: true,
            batch_mode: false,
            batch_size: 5,
            random_line_pre_batch: false,
            random_line_post_batch: false,
            from_side: SideChoice::Random,
            line_whitelist: BTreeSet::new(),
            line_blacklist: BTreeSet::new(),
            typing_mode: false,
            case_sensitive: false,
            whitespace_sensitive: false,
            show_position: true,
            show_mistake_count: true,
            show_score: true,
            no_cls: false,
            split: DEFAULT_SPLIT.to_string(),
            comment: DEFAULT_COMMENT.to_string(),
            block_comment: DEFAULT_BLOCK_COMMENT.to_string(),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;

    /// Load the stored settings, writing the defaults out first when the file
    /// is missing or unreadable.
    fn load_or_init(&self) -> Settings;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::settings_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Option<Settings> {
        let bytes = fs::read(&self.path).ok()?;
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("ignoring malformed settings {}: {e}", self.path.display());
                None
            }
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        self.read().unwrap_or_default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).unwrap_or_default();
        fs::write(&self.path, data)
    }

    fn load_or_init(&self) -> Settings {
        if let Some(settings) = self.read() {
            return settings;
        }
        let settings = Settings::default();
        if let Err(e) = self.save(&settings) {
            tracing::warn!("could not write default settings to {}: {e}", self.path.display());
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = FileConfigStore::with_path(&path);
        let settings = Settings::default();
        store.save(&settings).unwrap();
        let loaded = store.load();
        assert_eq!(settings, loaded);
    }

    #[test]
    fn save_and_load_custom_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let store = FileConfigStore::with_path(&path);
        let settings = Settings {
            only_once: false,
            batch_mode: true,
            batch_size: 3,
            from_side: SideChoice::Left,
            typing_mode: true,
            line_whitelist: [1, 2, 3].into_iter().collect(),
            split: " = ".into(),
            ..Settings::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"onlyOnce": false, "fromSide": "right"}"#).unwrap();
        assert!(!settings.only_once);
        assert_eq!(settings.from_side, SideChoice::Right);
        assert_eq!(settings.batch_size, 5);
        assert_eq!(settings.split, " - ");
    }

    #[test]
    fn collapsed_random_line_flag_is_accepted() {
        let settings: Settings = serde_json::from_str(r#"{"randomLine": true}"#).unwrap();
        assert!(settings.random_line_post_batch);
        assert!(!settings.random_line_pre_batch);
    }

    #[test]
    fn load_or_init_writes_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = FileConfigStore::with_path(&path);

        let settings = store.load_or_init();
        assert_eq!(settings, Settings::default());
        assert_eq!(store.path(), path.as_path());
        assert!(path.exists());
    }

    #[test]
    fn load_or_init_replaces_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let store = FileConfigStore::with_path(&path);

        assert_eq!(store.load_or_init(), Settings::default());
        assert_eq!(store.load(), Settings::default());
    }
}
