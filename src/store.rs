//! The process-wide current locale and the translation function derived from it.

use bevy::log::{ debug, warn };
use bevy::prelude::Resource;

use crate::interpolate::{ interpolate, InterpolationValues };
use crate::locale::{ Locale, DEFAULT_LOCALE };
use crate::storage::{ PreferenceStorage, LOCALE_KEY };
use crate::tree::TranslationTree;

/// Handle returned by [`LocaleStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(Locale) + Send + Sync>;

/// Owns the current locale, persists changes and translates keys.
///
/// Inside a Bevy app it is a resource built by [`crate::I18nPlugin`]; outside
/// one it can be constructed directly and passed to whoever needs it.
///
/// # Example
///
/// ```rust
/// use folio_intl::{ Locale, LocaleStore, MemoryPreferences, TranslationTree };
/// use folio_intl::interpolate::values;
/// use serde_json::json;
///
/// let tree = TranslationTree::from_value(json!({
///     "en": { "login": { "welcomeMessage": "Welcome, {user}" } },
///     "es": { "login": { "welcomeMessage": "Bienvenido, {user}" } }
/// }));
/// let mut store = LocaleStore::new(tree, Box::new(MemoryPreferences::new()), Some("en-GB"));
///
/// assert_eq!(store.t_with("login.welcomeMessage", &values([("user", "Ada")])), "Welcome, Ada");
/// store.toggle();
/// assert_eq!(store.current(), Locale::Es);
/// ```
#[derive(Resource)]
pub struct LocaleStore {
    current: Locale,
    tree: TranslationTree,
    storage: Box<dyn PreferenceStorage>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

/// Chooses the starting locale.
///
/// A valid persisted code wins, then the detected system language, then
/// [`DEFAULT_LOCALE`].
pub fn initial_locale(persisted: Option<&str>, detected: Option<&str>) -> Locale {
    persisted
        .and_then(Locale::from_code)
        .or_else(|| detected.and_then(Locale::from_lang_tag))
        .unwrap_or(DEFAULT_LOCALE)
}

/// The operating system's preferred language tag, e.g. `en-US`.
pub fn detect_system_locale() -> Option<String> {
    sys_locale::get_locale()
}

impl LocaleStore {
    /// Builds a store, reading the saved preference from `storage`.
    ///
    /// Nothing is written back until the first [`set`](Self::set).
    pub fn new(tree: TranslationTree, storage: Box<dyn PreferenceStorage>, detected: Option<&str>) -> Self {
        let persisted = match storage.load(LOCALE_KEY) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring saved locale preference: {}", e);
                None
            }
        };
        let current = initial_locale(persisted.as_deref(), detected);
        debug!("Initial locale: {}", current);

        Self::with_locale(tree, storage, current)
    }

    /// Builds a store starting at `locale` without consulting storage.
    pub fn with_locale(tree: TranslationTree, storage: Box<dyn PreferenceStorage>, locale: Locale) -> Self {
        Self {
            current: locale,
            tree,
            storage,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn current(&self) -> Locale {
        self.current
    }

    /// Makes `locale` current and persists it.
    ///
    /// Persistence failures are logged and otherwise ignored. Subscribers are
    /// notified only when the value actually changes.
    pub fn set(&mut self, locale: Locale) {
        let previous = self.current;
        self.current = locale;

        if let Err(e) = self.storage.save(LOCALE_KEY, locale.code()) {
            warn!("Failed to persist locale '{}': {}", locale, e);
        }

        if previous != locale {
            debug!("Locale changed: {} -> {}", previous, locale);
            for (_, listener) in &self.listeners {
                listener(locale);
            }
        }
    }

    /// Switches to the other supported locale.
    pub fn toggle(&mut self) {
        self.set(self.current.toggled());
    }

    /// Registers `listener` and calls it right away with the current locale.
    pub fn subscribe(&mut self, listener: impl Fn(Locale) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;

        listener(self.current);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Translation of `key` in the current locale, or `key` itself on a miss.
    pub fn t(&self, key: &str) -> String {
        self.tree
            .resolve(self.current, key)
            .map_or_else(|| key.to_string(), str::to_string)
    }

    /// Like [`t`](Self::t), then fills `{name}` placeholders from `values`.
    ///
    /// Placeholders with no matching value are left as they are. A miss
    /// returns `key` without substitution.
    pub fn t_with(&self, key: &str, values: &InterpolationValues) -> String {
        match self.tree.resolve(self.current, key) {
            Some(template) => interpolate(template, values),
            None => key.to_string(),
        }
    }

    /// View that prefixes every key with `namespace.`.
    ///
    /// ```rust
    /// # use folio_intl::{ Locale, LocaleStore, MemoryPreferences, TranslationTree };
    /// # use serde_json::json;
    /// # let tree = TranslationTree::from_value(json!({ "es": { "window": { "close": "Cerrar" } } }));
    /// # let store = LocaleStore::with_locale(tree, Box::new(MemoryPreferences::new()), Locale::Es);
    /// let window = store.scope("window");
    /// assert_eq!(window.t("close"), "Cerrar");
    /// assert_eq!(window.t("dock"), "window.dock");
    /// ```
    pub fn scope<'a>(&'a self, namespace: &'a str) -> Scoped<'a> {
        Scoped { store: self, namespace }
    }

    pub fn tree(&self) -> &TranslationTree {
        &self.tree
    }

    pub fn available_locales(&self) -> &'static [Locale] {
        &Locale::ALL
    }
}

/// Translations under one namespace, e.g. `profile`.
pub struct Scoped<'a> {
    store: &'a LocaleStore,
    namespace: &'a str,
}

impl Scoped<'_> {
    pub fn t(&self, key: &str) -> String {
        self.store.t(&self.full_key(key))
    }

    pub fn t_with(&self, key: &str, values: &InterpolationValues) -> String {
        self.store.t_with(&self.full_key(key), values)
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}.{}", self.namespace, key)
    }
}
