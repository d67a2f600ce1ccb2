use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::difficulty::{Difficulty, GameMode};

/// Persisted preferences and the all-time best score.
///
/// On disk: `{"best_score": int, "game_mode": "color"|"shape"|"sound",
/// "difficulty": "easy"|"medium"|"hard"}`. Missing fields take their defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub best_score: u64,
    pub game_mode: GameMode,
    pub difficulty: Difficulty,
}

/// Persistence port. `load` never fails: anything unreadable yields defaults.
pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
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
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no settings file, using defaults");
                return Settings::default();
            }
        };

        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "malformed settings file, using defaults");
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)
    }
}

/// In-process store for headless runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    stored: RefCell<Option<Settings>>,
    saves: Cell<usize>,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            stored: RefCell::new(Some(settings)),
            ..Self::default()
        }
    }

    /// A store whose every save fails, for exercising error paths
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.get()
    }

    pub fn stored(&self) -> Option<Settings> {
        *self.stored.borrow()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Settings {
        self.stored().unwrap_or_default()
    }

    fn save(&self, settings: &Settings) -> io::Result<()> {
        if self.fail_saves {
            return Err(io::Error::new(io::ErrorKind::Other, "store is read-only"));
        }
        self.saves.set(self.saves.get() + 1);
        *self.stored.borrow_mut() = Some(*settings);
        Ok(())
    }
}

impl<S: SettingsStore + ?Sized> SettingsStore for Box<S> {
    fn load(&self) -> Settings {
        (**self).load()
    }

    fn save(&self, settings: &Settings) -> io::Result<()> {
        (**self).save(settings)
    }
}
