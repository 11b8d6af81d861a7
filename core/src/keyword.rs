//! Shader keywords.
//!
//! A keyword is a named compile-time switch of a shader (`"SHADOWS"`,
//! `"QUALITY"`). A [`KeywordState`] picks one option string per keyword and is
//! the identity of a compiled shader variant. A [`KeywordDomain`] declares which
//! keywords a pass understands and which options are legal for each of them.
//!
//! # Example
//!
//! ```
//! use lumen_core::keyword::{KeywordDomain, KeywordState};
//!
//! let domain = KeywordDomain::new().with_keyword("QUALITY", ["LOW", "HIGH"]);
//! assert_eq!(domain.default_option("QUALITY"), Some("LOW"));
//!
//! let requested = KeywordState::new().with_key("QUALITY", "HIGH");
//! assert_eq!(requested.get("QUALITY"), Some("HIGH"));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered mapping from keyword name to the selected option.
///
/// Equality and hashing consider every `(keyword, option)` pair, so two states
/// select the same variant exactly when they compare equal. States are
/// immutable once built; use [`with_key`](Self::with_key) or [`FromIterator`]
/// to construct them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordState {
    keys: BTreeMap<String, String>,
}

impl KeywordState {
    /// Create an empty keyword state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The empty keyword state (every keyword takes its default).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Return a copy of this state with `keyword` set to `option`.
    pub fn with_key(mut self, keyword: impl Into<String>, option: impl Into<String>) -> Self {
        self.keys.insert(keyword.into(), option.into());
        self
    }

    /// Get the option selected for `keyword`.
    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.keys.get(keyword).map(String::as_str)
    }

    /// Get the option selected for `keyword`, or `default` when unset.
    pub fn get_or<'a>(&'a self, keyword: &str, default: &'a str) -> &'a str {
        self.get(keyword).unwrap_or(default)
    }

    /// Check whether `keyword` has an explicit option.
    pub fn contains(&self, keyword: &str) -> bool {
        self.keys.contains_key(keyword)
    }

    /// Number of keywords with an explicit option.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if no keyword is set.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate `(keyword, option)` pairs in keyword order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeywordState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            keys: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for KeywordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (keyword, option)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{keyword}={option}")?;
        }
        f.write_str("}")
    }
}

/// Declared keywords of a shader pass and their legal options.
///
/// Options keep their declaration order; the first option of a keyword is its
/// default. Repeated options are dropped, keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordDomain {
    keywords: BTreeMap<String, Vec<String>>,
}

impl KeywordDomain {
    /// Create an empty domain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `keyword` with the given options (first is the default).
    ///
    /// Re-declaring a keyword replaces its options.
    pub fn with_keyword<I, S>(mut self, keyword: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for option in options {
            let option = option.into();
            if !unique.contains(&option) {
                unique.push(option);
            }
        }
        self.keywords.insert(keyword.into(), unique);
        self
    }

    /// Legal options for `keyword`, default first.
    pub fn options(&self, keyword: &str) -> Option<&[String]> {
        self.keywords.get(keyword).map(Vec::as_slice)
    }

    /// The default option of `keyword`.
    pub fn default_option(&self, keyword: &str) -> Option<&str> {
        self.keywords
            .get(keyword)
            .and_then(|options| options.first())
            .map(String::as_str)
    }

    /// Check whether `option` is legal for `keyword`.
    pub fn allows(&self, keyword: &str, option: &str) -> bool {
        self.keywords
            .get(keyword)
            .is_some_and(|options| options.iter().any(|o| o == option))
    }

    /// Iterate declared keywords and their options, in keyword order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.keywords
            .iter()
            .map(|(k, options)| (k.as_str(), options.as_slice()))
    }

    /// Number of declared keywords.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Check if no keyword is declared.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Number of distinct validated keyword states this domain admits.
    pub fn combination_count(&self) -> usize {
        self.keywords.values().map(Vec::len).product()
    }
}

impl<K, I, S> FromIterator<(K, I)> for KeywordDomain
where
    K: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |domain, (keyword, options)| {
                domain.with_keyword(keyword, options)
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_keyword_state_equality_ignores_insertion_order() {
        let a = KeywordState::new()
            .with_key("SHADOWS", "ON")
            .with_key("QUALITY", "HIGH");
        let b = KeywordState::new()
            .with_key("QUALITY", "HIGH")
            .with_key("SHADOWS", "ON");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_keyword_state_differs_on_option() {
        let a = KeywordState::new().with_key("QUALITY", "LOW");
        let b = KeywordState::new().with_key("QUALITY", "HIGH");
        assert_ne!(a, b);
    }

    #[test]
    fn test_keyword_state_lookup() {
        let state: KeywordState = [("FOG", "ON")].into_iter().collect();
        assert_eq!(state.get("FOG"), Some("ON"));
        assert_eq!(state.get_or("SHADOWS", "OFF"), "OFF");
        assert!(state.contains("FOG"));
        assert_eq!(state.len(), 1);
        assert!(KeywordState::empty().is_empty());
    }

    #[test]
    fn test_keyword_state_display() {
        let state = KeywordState::new()
            .with_key("B", "2")
            .with_key("A", "1");
        assert_eq!(state.to_string(), "{A=1, B=2}");
        assert_eq!(KeywordState::empty().to_string(), "{}");
    }

    #[test]
    fn test_domain_default_is_first_option() {
        let domain = KeywordDomain::new().with_keyword("QUALITY", ["MEDIUM", "LOW", "HIGH"]);
        assert_eq!(domain.default_option("QUALITY"), Some("MEDIUM"));
        assert!(domain.allows("QUALITY", "HIGH"));
        assert!(!domain.allows("QUALITY", "ULTRA"));
        assert!(!domain.allows("SHADOWS", "ON"));
    }

    #[test]
    fn test_domain_deduplicates_options() {
        let domain = KeywordDomain::new().with_keyword("FOG", ["OFF", "ON", "OFF"]);
        assert_eq!(domain.options("FOG").unwrap(), ["OFF", "ON"]);
    }

    #[test]
    fn test_domain_combination_count() {
        let domain: KeywordDomain = [
            ("QUALITY", vec!["LOW", "MEDIUM", "HIGH"]),
            ("SHADOWS", vec!["OFF", "ON"]),
        ]
        .into_iter()
        .collect();
        assert_eq!(domain.len(), 2);
        assert_eq!(domain.combination_count(), 6);
        assert_eq!(KeywordDomain::new().combination_count(), 1);
    }
}
