use crate::app_dirs::AppDirs;
use crate::error::{DrillError, DrillResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// The letters enabled for drilling, in the order they were enabled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LetterSelection {
    letters: Vec<char>,
}

impl LetterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_letters<I: IntoIterator<Item = char>>(letters: I) -> Self {
        let mut selection = Self::new();
        for letter in letters {
            if !selection.has(letter) {
                selection.letters.push(letter);
            }
        }
        selection
    }

    /// Enable `letter` if it is off, disable it if it is on
    pub fn toggle(&mut self, letter: char) {
        if let Some(pos) = self.letters.iter().position(|&l| l == letter) {
            self.letters.remove(pos);
        } else {
            self.letters.push(letter);
        }
    }

    pub fn has(&self, letter: char) -> bool {
        self.letters.contains(&letter)
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    /// Replace the selection with the distinct characters of `s`
    pub fn set_all(&mut self, s: &str) {
        *self = Self::from_letters(s.chars());
    }

    pub fn clear(&mut self) {
        self.letters.clear();
    }

    /// Letters ready to hand to a drill session
    pub fn pool(&self) -> DrillResult<Vec<char>> {
        if self.letters.is_empty() {
            return Err(DrillError::InvalidPool);
        }
        Ok(self.letters.clone())
    }
}

pub trait SelectionStore {
    fn load(&self) -> LetterSelection;
    fn save(&self, selection: &LetterSelection) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSelectionStore {
    path: PathBuf,
}

impl FileSelectionStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::selection_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore for FileSelectionStore {
    fn load(&self) -> LetterSelection {
        let Ok(bytes) = fs::read(&self.path) else {
            return LetterSelection::new();
        };
        match serde_json::from_slice::<Vec<char>>(&bytes) {
            // Hand-edited files may repeat letters
            Ok(letters) => LetterSelection::from_letters(letters),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt selection file");
                LetterSelection::new()
            }
        }
    }

    fn save(&self, selection: &LetterSelection) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec(selection).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
