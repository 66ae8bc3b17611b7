use crate::app_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Tuning parameters read on every pick and every keystroke evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Reactions at or under this many ms are fast
    pub fast_ms: u64,
    /// Reactions at or under this many ms (and over `fast_ms`) are medium
    pub medium_ms: u64,
    /// Reactions over this many ms are treated as a pause and never timed
    pub pause_ms: u64,
    /// Letters shown after the current target
    pub upcoming_count: usize,
    /// Chance (0-100) of drawing from the slowest letters
    pub slow_pct: u32,
    /// How many of the slowest letters form the biased draw pool
    pub slow_n: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fast_ms: 350,
            medium_ms: 800,
            pause_ms: 4000,
            upcoming_count: 2,
            slow_pct: 0,
            slow_n: 5,
        }
    }
}

pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
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
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        let Ok(bytes) = fs::read(&self.path) else {
            return Settings::default();
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt settings file");
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_drill_tuning() {
        let s = Settings::default();
        assert_eq!(s.fast_ms, 350);
        assert_eq!(s.medium_ms, 800);
        assert_eq!(s.pause_ms, 4000);
        assert_eq!(s.upcoming_count, 2);
        assert_eq!(s.slow_pct, 0);
        assert_eq!(s.slow_n, 5);
    }

    #[test]
    fn roundtrip_custom_settings() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("nested").join("settings.json"));
        let settings = Settings {
            fast_ms: 300,
            medium_ms: 700,
            pause_ms: 3000,
            upcoming_count: 4,
            slow_pct: 40,
            slow_n: 3,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, b"{not json").unwrap();
        let store = FileSettingsStore::with_path(&path);
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, br#"{ "fast_ms": 200, "slow_pct": 25 }"#).unwrap();
        let store = FileSettingsStore::with_path(&path);

        let loaded = store.load();
        assert_eq!(loaded.fast_ms, 200);
        assert_eq!(loaded.slow_pct, 25);
        assert_eq!(loaded.medium_ms, 800);
        assert_eq!(loaded.upcoming_count, 2);
    }
}
