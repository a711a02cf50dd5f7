use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "wordgame";

/// Centralized application file resolution
pub struct AppDirs;

impl AppDirs {
    pub fn settings_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("settings.json"))
    }

    pub fn saves_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("game_saves.json"))
            .unwrap_or_else(|| PathBuf::from("game_saves.json"))
    }

    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_have_expected_file_names() {
        assert!(AppDirs::settings_path().ends_with("settings.json"));
        assert!(AppDirs::saves_path().ends_with("game_saves.json"));
    }
}
