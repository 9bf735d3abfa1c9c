//! The closed set of display languages.

use std::fmt;
use std::str::FromStr;

use serde::{ Deserialize, Serialize };
use thiserror::Error;

/// A supported display language.
///
/// The set is closed: every value of this type is a locale the translation
/// tree and the data files know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Spanish.
    Es,
    /// English.
    En,
}

/// Locale used when neither a saved preference nor the system language applies.
pub const DEFAULT_LOCALE: Locale = Locale::Es;

/// Locale whose subtree is served when a localized data file lacks the current one.
pub const DEFAULT_DATA_FALLBACK: Locale = Locale::En;

impl Locale {
    /// All supported locales, default first.
    pub const ALL: [Locale; 2] = [Locale::Es, Locale::En];

    /// Two-letter code, as stored in preferences and used as data file keys.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    /// Upper-case label for the taskbar language button.
    pub const fn short_label(self) -> &'static str {
        match self {
            Self::Es => "ES",
            Self::En => "EN",
        }
    }

    /// Native name of the language.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Es => "Español",
            Self::En => "English",
        }
    }

    /// Exact match against a locale code (`"es"` or `"en"`).
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|locale| locale.code() == code)
    }

    /// Maps a system language tag such as `en-US` or `es_ES.UTF-8` to a
    /// supported locale by its primary subtag.
    pub fn from_lang_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .split(|c| c == '-' || c == '_' || c == '.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::from_code(&primary)
    }

    /// The other locale. Applying it twice returns the original value.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Es => Self::En,
            Self::En => Self::Es,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        DEFAULT_LOCALE
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returned when a string is not one of the supported locale codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported locale '{0}'")]
pub struct ParseLocaleError(pub String);

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| ParseLocaleError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_self_inverse() {
        for locale in Locale::ALL {
            assert_ne!(locale.toggled(), locale);
            assert_eq!(locale.toggled().toggled(), locale);
        }
    }

    #[test]
    fn codes_parse_exactly() {
        assert_eq!("es".parse::<Locale>(), Ok(Locale::Es));
        assert_eq!("en".parse::<Locale>(), Ok(Locale::En));
        assert!("EN".parse::<Locale>().is_err());
        assert!("fr".parse::<Locale>().is_err());
        assert!("".parse::<Locale>().is_err());
    }

    #[test]
    fn lang_tags_use_primary_subtag() {
        assert_eq!(Locale::from_lang_tag("en-US"), Some(Locale::En));
        assert_eq!(Locale::from_lang_tag("es_ES.UTF-8"), Some(Locale::Es));
        assert_eq!(Locale::from_lang_tag("EN"), Some(Locale::En));
        assert_eq!(Locale::from_lang_tag("fr-FR"), None);
        assert_eq!(Locale::from_lang_tag(""), None);
    }

    #[test]
    fn labels_and_serde_use_codes() {
        assert_eq!(Locale::Es.short_label(), "ES");
        assert_eq!(Locale::En.to_string(), "en");
        assert_eq!(serde_json::to_string(&Locale::Es).unwrap(), "\"es\"");
        assert_eq!(serde_json::from_str::<Locale>("\"en\"").unwrap(), Locale::En);
        assert_eq!(Locale::default(), Locale::Es);
    }
}
