use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "letterdrill";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("stats.db"))
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().join("stats.db"))
        }
    }

    pub fn settings_path() -> PathBuf {
        Self::config_file("settings.json")
    }

    pub fn selection_path() -> PathBuf {
        Self::config_file("selection.json")
    }

    fn config_file(name: &str) -> PathBuf {
        match ProjectDirs::from("", "", APP_NAME) {
            Some(pd) => pd.config_dir().join(name),
            None => PathBuf::from(format!("{APP_NAME}_{name}")),
        }
    }
}
