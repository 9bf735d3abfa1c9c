//! Messages exchanged with the rest of the app.

use bevy::prelude::*;
use serde_json::Value;

use crate::locale::Locale;

/// Request to make a locale current.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeLocale(pub Locale);

/// Request to switch to the other locale.
#[derive(Message, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleLocale;

/// Written once per frame in which the current locale ended up different.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleChanged {
    pub previous: Locale,
    pub current: Locale,
}

/// Request to load the localized data file for a section, e.g. `"profile"`.
///
/// Requested sections are remembered and loaded again after every locale change.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct LoadSection(pub String);

/// Result of a [`LoadSection`] request.
///
/// `data` is `None` when the file could not be fetched or parsed. Results for
/// a locale that is no longer current are dropped, not delivered.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct SectionLoaded {
    pub section: String,
    pub locale: Locale,
    pub data: Option<Value>,
}
