#![doc = include_str!("../README.md")]

//! # folio-intl
//!
//! Internationalization for the desktop-styled portfolio, packaged as a
//! [Bevy](https://bevyengine.org/) plugin:
//!
//! - **Locale Store**: the current locale, saved between runs and detected from
//!   the system on first launch
//! - **Nested keys**: `profile.contact` resolves through `messages/<locale>/profile.json`
//! - **Placeholders**: `{name}` substitution, unknown placeholders left untouched
//! - **Graceful misses**: an unknown key translates to itself
//! - **Localized data**: `<section>.json` files split per locale, with fallback
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use folio_intl::{ I18nPlugin, LocaleStore, ToggleLocale };
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(I18nPlugin::default())
//!         .add_systems(Update, greet)
//!         .run();
//! }
//!
//! fn greet(store: Res<LocaleStore>, mut toggles: MessageWriter<ToggleLocale>) {
//!     if store.is_changed() {
//!         println!("{}", store.t("taskbar.language"));
//!         toggles.write(ToggleLocale);
//!     }
//! }
//! ```
//!
//! ## Translation Loading
//! - **Desktop**: reads the `messages/` folder at startup
//! - **WASM**: uses translations bundled at compile time
//! - **Bundle-only**: force bundled mode with `features = ["bundle-only"]`

use std::path::{ Path, PathBuf };

use bevy::log::{ info, warn };
use bevy::prelude::*;

pub mod interpolate;
pub mod loader;
pub mod locale;
pub mod messages;
pub mod relay;
pub mod storage;
pub mod store;
mod systems;
pub mod tree;

pub use interpolate::{ InterpolationValues, TranslationValue };
pub use loader::{ DataLoader, DirectoryFetcher, Fetch, FetchError, LoadError };
#[cfg(feature = "http")]
pub use loader::HttpFetcher;
pub use locale::{ Locale, ParseLocaleError, DEFAULT_DATA_FALLBACK, DEFAULT_LOCALE };
pub use messages::{ ChangeLocale, LoadSection, LocaleChanged, SectionLoaded, ToggleLocale };
pub use storage::{ FilePreferences, MemoryPreferences, PreferenceStorage, StorageError };
pub use store::{ LocaleStore, Scoped, SubscriptionId };
pub use systems::LoadedSections;
pub use tree::{ TranslationTree, TreeError };

use systems::{ AnnouncedLocale, PendingLoads };

/// Configuration for the I18n plugin.
///
/// # Example
///
/// ```rust
/// use folio_intl::{ I18nConfig, Locale };
///
/// let config = I18nConfig {
///     data_folder: "static/data".to_string(),
///     data_fallback_locale: Locale::Es,
///     detect_system_locale: false,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Resource)]
pub struct I18nConfig {
    /// Whether to use bundled translations (true) or filesystem loading (false).
    /// Automatically set to `true` for WASM targets or when `bundle-only` feature is enabled.
    pub use_bundled_translations: bool,
    /// Folder holding `<locale>/<namespace>.json` translation files.
    /// Default: "messages"
    pub messages_folder: String,
    /// Folder holding `<section>.json` data files.
    /// Default: "assets/data"
    pub data_folder: String,
    /// Base URL to GET `<section>.json` data files from instead of `data_folder`.
    /// Needs the `http` feature.
    /// Default: None
    pub data_base_url: Option<String>,
    /// Locale served when a partitioned data file has nothing for the current one.
    /// Default: `Locale::En`
    pub data_fallback_locale: Locale,
    /// Save locale changes to disk. When `false`, preferences only live in memory.
    /// Default: true
    pub persist_preferences: bool,
    /// Preferences file. `None` uses [`storage::default_preferences_path`].
    pub preferences_path: Option<PathBuf>,
    /// Consult the OS language when no preference was saved.
    /// Default: true
    pub detect_system_locale: bool,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            use_bundled_translations: cfg!(target_arch = "wasm32") || cfg!(feature = "bundle-only"),
            messages_folder: "messages".to_string(),
            data_folder: "assets/data".to_string(),
            data_base_url: None,
            data_fallback_locale: DEFAULT_DATA_FALLBACK,
            persist_preferences: true,
            preferences_path: None,
            detect_system_locale: true,
        }
    }
}

impl I18nConfig {
    /// Storage the locale store should persist to.
    pub fn preference_storage(&self) -> Box<dyn PreferenceStorage> {
        if !self.persist_preferences {
            return Box::new(MemoryPreferences::new());
        }
        let file = match &self.preferences_path {
            Some(path) => Some(FilePreferences::new(path.clone())),
            None => FilePreferences::at_default_location(),
        };
        match file {
            Some(file) => Box::new(file),
            None => {
                warn!("No config directory available, locale preference will not be saved");
                Box::new(MemoryPreferences::new())
            }
        }
    }
}

// ---------- Bevy Plugin ----------

/// Main plugin for the portfolio's internationalization.
///
/// Inserts [`LocaleStore`] and [`DataLoader`] resources, unless the app already
/// has them, and the systems that serve [`ChangeLocale`], [`ToggleLocale`] and
/// [`LoadSection`] requests.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use folio_intl::{ I18nPlugin, I18nConfig };
///
/// // Default configuration
/// App::new().add_plugins(I18nPlugin::default());
///
/// // Custom configuration
/// App::new().add_plugins(I18nPlugin::with_config(I18nConfig {
///     persist_preferences: false,
///     detect_system_locale: false,
///     ..Default::default()
/// }));
/// ```
#[derive(Default)]
pub struct I18nPlugin {
    /// Configuration for the plugin
    pub config: I18nConfig,
}

impl I18nPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: I18nConfig) -> Self {
        Self { config }
    }
}

impl Plugin for I18nPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .init_resource::<LocaleStore>()
            .init_resource::<DataLoader>()
            .init_resource::<AnnouncedLocale>()
            .init_resource::<LoadedSections>()
            .init_resource::<PendingLoads>()
            .add_message::<ChangeLocale>()
            .add_message::<ToggleLocale>()
            .add_message::<LocaleChanged>()
            .add_message::<LoadSection>()
            .add_message::<SectionLoaded>()
            .add_systems(
                Update,
                (
                    systems::apply_locale_requests,
                    systems::announce_locale_changes,
                    systems::reload_sections_on_locale_change,
                    systems::start_section_loads,
                    systems::poll_section_loads,
                ).chain()
            );
    }
}

impl FromWorld for LocaleStore {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<I18nConfig>().cloned().unwrap_or_default();

        let tree = TranslationTree::load(
            config.use_bundled_translations,
            Path::new(&config.messages_folder)
        );
        let detected = if config.detect_system_locale {
            store::detect_system_locale()
        } else {
            None
        };

        let store = LocaleStore::new(tree, config.preference_storage(), detected.as_deref());
        info!("Locale store ready with locale '{}'", store.current());
        store
    }
}

impl FromWorld for DataLoader {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<I18nConfig>().cloned().unwrap_or_default();
        let loader = match &config.data_base_url {
            Some(base_url) => http_loader(base_url),
            None => None,
        };
        loader
            .unwrap_or_else(|| DataLoader::new(DirectoryFetcher::new(&config.data_folder)))
            .with_fallback(config.data_fallback_locale)
    }
}

#[cfg(feature = "http")]
fn http_loader(base_url: &str) -> Option<DataLoader> {
    match HttpFetcher::new(base_url) {
        Ok(fetcher) => {
            info!("Loading section data from {}", fetcher.base_url());
            Some(DataLoader::new(fetcher))
        }
        Err(e) => {
            bevy::log::error!("Falling back to the data folder: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "http"))]
fn http_loader(base_url: &str) -> Option<DataLoader> {
    warn!("Ignoring data_base_url '{}': built without the `http` feature", base_url);
    None
}

// ---------- API ----------

/// Extension trait for `App` to change the locale during setup.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use folio_intl::{ I18nConfig, I18nPlugin, Locale, LocaleAppExt, LocaleStore };
///
/// let mut app = App::new();
/// app.add_plugins(I18nPlugin::with_config(I18nConfig {
///     persist_preferences: false,
///     detect_system_locale: false,
///     ..Default::default()
/// }));
/// app.set_locale(Locale::En);
/// assert_eq!(app.world().resource::<LocaleStore>().current(), Locale::En);
/// ```
pub trait LocaleAppExt {
    /// Sets and persists the current locale.
    ///
    /// Warns if the plugin has not been added yet.
    fn set_locale(&mut self, locale: Locale);
    /// Switches to the other locale.
    ///
    /// Warns if the plugin has not been added yet.
    fn toggle_locale(&mut self);
}

impl LocaleAppExt for App {
    fn set_locale(&mut self, locale: Locale) {
        match self.world_mut().get_resource_mut::<LocaleStore>() {
            Some(mut store) => store.set(locale),
            None => warn!("LocaleStore not found, add I18nPlugin before setting the locale"),
        }
    }

    fn toggle_locale(&mut self) {
        match self.world_mut().get_resource_mut::<LocaleStore>() {
            Some(mut store) => store.toggle(),
            None => warn!("LocaleStore not found, add I18nPlugin before toggling the locale"),
        }
    }
}
