//! The immutable translation tree and its loaders.
//!
//! Translations live in `messages/<locale>/<namespace>.json`. Every file becomes
//! a top-level namespace, so `messages/en/profile.json` answers keys such as
//! `profile.contact`. The tree is bundled at build time (see `build.rs`) or read
//! from the filesystem at startup, and never changes afterwards.

use std::collections::HashMap;
use std::path::{ Path, PathBuf };

use bevy::log::{ error, warn };
use serde_json::{ Map, Value };
use thiserror::Error;

use crate::locale::Locale;

/// Failure to build a tree from disk or from bundled data.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("messages folder '{0}' not found")]
    MissingFolder(PathBuf),
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Nested string tables for every supported locale.
#[derive(Debug, Clone, Default)]
pub struct TranslationTree {
    langs: HashMap<Locale, Value>,
}

impl TranslationTree {
    /// Builds a tree from `{ "<locale>": { ...nested tables... } }`.
    ///
    /// Unsupported locale keys are skipped with a warning.
    pub fn from_value(value: Value) -> Self {
        let mut langs = HashMap::new();

        if let Value::Object(locales) = value {
            for (code, tree) in locales {
                match Locale::from_code(&code) {
                    Some(locale) => {
                        langs.insert(locale, tree);
                    }
                    None => warn!("Ignoring translations for unsupported locale '{}'", code),
                }
            }
        }

        Self { langs }
    }

    /// Translations compiled into the binary by the build script.
    pub fn bundled() -> Result<Self, TreeError> {
        const BUNDLED_TRANSLATIONS: &str = include_str!(
            concat!(env!("OUT_DIR"), "/all_translations.json")
        );

        let value: Value = serde_json::from_str(BUNDLED_TRANSLATIONS).map_err(|source| {
            TreeError::Json { path: PathBuf::from("<bundled>"), source }
        })?;
        Ok(Self::from_value(value))
    }

    /// Reads `<messages_folder>/<locale>/<namespace>.json` files.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_dir(messages_folder: impl AsRef<Path>) -> Result<Self, TreeError> {
        use std::fs;

        let message_dir = messages_folder.as_ref();
        if !message_dir.is_dir() {
            return Err(TreeError::MissingFolder(message_dir.to_path_buf()));
        }

        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| TreeError::Io { path, source }
        };

        let mut locales = Map::new();
        for folder_entry in fs::read_dir(message_dir).map_err(io_err(message_dir))? {
            let folder = folder_entry.map_err(io_err(message_dir))?.path();
            if !folder.is_dir() {
                continue;
            }
            let lang_code = folder
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();

            let mut namespaces = Map::new();
            for file_entry in fs::read_dir(&folder).map_err(io_err(&folder))? {
                let path = file_entry.map_err(io_err(&folder))?.path();
                if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let Some(namespace) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };

                let content = fs::read_to_string(&path).map_err(io_err(&path))?;
                let json: Value = serde_json::from_str(&content).map_err(|source| {
                    TreeError::Json { path: path.clone(), source }
                })?;
                namespaces.insert(namespace.to_string(), json);
            }
            locales.insert(lang_code, Value::Object(namespaces));
        }

        Ok(Self::from_value(Value::Object(locales)))
    }

    /// Picks bundled or filesystem translations, degrading to an empty tree.
    ///
    /// An empty tree is still usable: every lookup returns its key.
    pub fn load(use_bundled: bool, messages_folder: &Path) -> Self {
        if use_bundled {
            match Self::bundled() {
                // Bundled data is empty when the crate was built without messages/
                Ok(tree) if !tree.is_empty() => return tree,
                Ok(_) => {}
                Err(e) => error!("Failed to load bundled translations: {}", e),
            }
        }
        load_filesystem(messages_folder)
    }

    /// Root table for `locale`, if any translations were loaded for it.
    pub fn root(&self, locale: Locale) -> Option<&Value> {
        self.langs.get(&locale)
    }

    /// Walks `key` one dot-separated segment at a time.
    ///
    /// Returns `None` when a segment is missing, when an intermediate node is
    /// not a table, or when the final node is not a string.
    pub fn resolve(&self, locale: Locale, key: &str) -> Option<&str> {
        let mut node = self.root(locale)?;
        for segment in key.split('.') {
            node = node.as_object()?.get(segment)?;
        }
        node.as_str()
    }

    /// Locales with at least one namespace loaded.
    pub fn locales(&self) -> Vec<Locale> {
        Locale::ALL
            .into_iter()
            .filter(|locale| self.langs.contains_key(locale))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.langs.is_empty()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_filesystem(messages_folder: &Path) -> TranslationTree {
    match TranslationTree::from_dir(messages_folder) {
        Ok(tree) => tree,
        Err(e) => {
            error!("Failed to load translations from '{}': {}", messages_folder.display(), e);
            TranslationTree::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn load_filesystem(_messages_folder: &Path) -> TranslationTree {
    error!("Filesystem loading not available on WASM");
    TranslationTree::default()
}
