use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::session::SessionState;

/// Persistence for the saved session collection.
pub trait SessionStore {
    /// Never fails: a missing or unreadable file yields an empty collection.
    fn load(&self) -> Vec<SessionState>;
    fn save(&self, sessions: &[SessionState]) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::saves_path(),
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
}

impl Default for FileSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Vec<SessionState> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!("no saved sessions at {}: {e}", self.path.display());
                return Vec::new();
            }
        };
        match serde_json::from_slice::<Vec<SessionState>>(&bytes) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!("ignoring malformed saves {}: {e}", self.path.display());
                Vec::new()
            }
        }
    }

    fn save(&self, sessions: &[SessionState]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(sessions)?;
        fs::write(&self.path, data)?;
        tracing::debug!("saved {} sessions to {}", sessions.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::line::{Line, Side};
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("saves.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saves.json");
        fs::write(&path, "[{\"remainingLines\": 3}]").unwrap();
        assert!(FileSessionStore::with_path(&path).load().is_empty());
    }

    #[test]
    fn null_begin_time_keeps_the_collection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saves.json");
        fs::write(
            &path,
            r#"[{"beginDateAndTime": null, "mistakeCount": 2}, {"beginDateAndTime": 0}]"#,
        )
        .unwrap();
        let sessions = FileSessionStore::with_path(&path).load();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].begin, None);
        assert_eq!(sessions[0].mistake_count, 2);
    }

    #[test]
    fn roundtrip_sessions() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("a").join("saves.json"));
        let sessions = vec![
            SessionState::new(vec![Line::new("sol", "sun", Side::Left, 1)], Settings::default()),
            SessionState::default(),
        ];
        store.save(&sessions).unwrap();
        assert_eq!(store.load(), sessions);
    }

    #[test]
    fn file_is_a_json_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saves.json");
        let store = FileSessionStore::with_path(&path);
        store.save(&[SessionState::default()]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert!(value.is_array());
        assert_eq!(value.as_array().unwrap().len(), 1);
    }
}
