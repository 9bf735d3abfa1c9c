//! Durable key/value storage for user preferences.
//!
//! The locale store only needs one string under [`LOCALE_KEY`], but the file
//! format is a flat JSON object so other preferences can share it.

use std::collections::HashMap;
use std::fs;
use std::path::{ Path, PathBuf };
use std::sync::RwLock;

use serde_json::{ Map, Value };
use thiserror::Error;

/// Key under which the selected locale is persisted.
pub const LOCALE_KEY: &str = "locale";

/// Environment variable overriding the preferences directory.
pub const ENV_CONFIG_DIR: &str = "FOLIO_CONFIG_DIR";

const APP_NAME: &str = "folio";
const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access preferences at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preferences at '{path}' are not a JSON object")]
    Corrupt {
        path: PathBuf,
    },
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("preference storage lock poisoned")]
    Poisoned,
}

/// Somewhere to keep string preferences between runs.
pub trait PreferenceStorage: Send + Sync {
    /// Value stored under `key`, or `None` when nothing was saved.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Preferences kept in a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File at [`default_preferences_path`], if a config directory exists.
    pub fn at_default_location() -> Option<Self> {
        default_preferences_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => return Err(StorageError::Io { path: self.path.clone(), source }),
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(StorageError::Corrupt { path: self.path.clone() }),
        }
    }
}

impl PreferenceStorage for FilePreferences {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let prefs = self.read_all()?;
        Ok(prefs.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // A corrupt file is replaced rather than blocking every future save
        let mut prefs = match self.read_all() {
            Ok(prefs) => prefs,
            Err(StorageError::Corrupt { .. }) => Map::new(),
            Err(e) => return Err(e),
        };
        prefs.insert(key.to_string(), Value::String(value.to_string()));

        let io_err = |source| StorageError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(prefs))?;
        fs::write(&self.path, content).map_err(io_err)
    }
}

/// Preferences that live only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one value.
    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut values) = storage.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
        storage
    }
}

impl PreferenceStorage for MemoryPreferences {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.read().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.write().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Where preferences are stored by default.
///
/// 1. `FOLIO_CONFIG_DIR` (if set and non-empty)
/// 2. The platform config directory from `dirs`, e.g. `~/.config/folio/` on Linux
pub fn default_preferences_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir).join(PREFERENCES_FILE));
        }
    }

    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(PREFERENCES_FILE);
        path
    })
}
