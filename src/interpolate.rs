//! `{name}` placeholder substitution in resolved strings.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::{ Captures, Regex };

/// A displayable scalar substituted into a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

/// Placeholder name to value.
pub type InterpolationValues = HashMap<String, TranslationValue>;

impl fmt::Display for TranslationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for TranslationValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TranslationValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i32> for TranslationValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<i64> for TranslationValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for TranslationValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for TranslationValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for TranslationValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Builds [`InterpolationValues`] from `(name, value)` pairs.
///
/// ```rust
/// use folio_intl::interpolate::values;
///
/// let vars = values([("user", "Ada")]);
/// assert_eq!(vars["user"].to_string(), "Ada");
/// ```
pub fn values<K, V, I>(pairs: I) -> InterpolationValues
    where K: Into<String>, V: Into<TranslationValue>, I: IntoIterator<Item = (K, V)>
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}]+)\}").unwrap());

/// Replaces every `{name}` in `template` with its value.
///
/// Placeholders without a value are kept verbatim, braces included.
pub fn interpolate(template: &str, values: &InterpolationValues) -> String {
    PLACEHOLDER_RE.replace_all(template, |caps: &Captures| {
        match values.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        }
    }).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_known_placeholders() {
        let vars = values([("user", "Ada")]);
        assert_eq!(interpolate("Welcome, {user}", &vars), "Welcome, Ada");
    }

    #[test]
    fn keeps_unknown_placeholders() {
        let vars = values([("name", "Ada")]);
        assert_eq!(
            interpolate("{name} works at {company}", &vars),
            "Ada works at {company}"
        );
        assert_eq!(interpolate("{x}", &InterpolationValues::new()), "{x}");
    }

    #[test]
    fn stringifies_scalars() {
        let mut vars = InterpolationValues::new();
        vars.insert("count".into(), 3i64.into());
        vars.insert("ratio".into(), 2.5f64.into());
        vars.insert("whole".into(), 2.0f64.into());
        vars.insert("ok".into(), true.into());
        assert_eq!(
            interpolate("{count} {ratio} {whole} {ok}", &vars),
            "3 2.5 2 true"
        );
    }

    #[test]
    fn repeated_and_adjacent_placeholders() {
        let vars = values([("a", "x"), ("b", "y")]);
        assert_eq!(interpolate("{a}{b}{a}", &vars), "xyx");
        assert_eq!(interpolate("{} {a", &vars), "{} {a");
    }
}
