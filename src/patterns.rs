//! Key-naming and casing classification
//!
//! Sibling key sets are classified into a single naming convention; the
//! convention feeds the record-vs-object decision and, for synthesized
//! dictionaries, the regex future keys must match.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Naming convention detected across a set of sibling keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyPattern {
    /// Single lower-case word (`name`, `id`)
    Word,
    /// `PascalCase`
    PascalCase,
    /// `camelCase`
    CamelCase,
    /// `snake_case`
    SnakeCase,
    /// All-numeric keys (the list-index convention)
    Numeric,
    /// Shared prefix token before a separator, carrying the token itself
    /// (`cfg` for `cfg_MaxSize`, `cfg-min`)
    Prefixed(String),
    /// No single convention; forces the closed object classification
    Mixed,
}

static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]+$").unwrap());

static PASCAL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-z]+$").unwrap());

static CAMEL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+(?:[A-Z][a-z]+)*$").unwrap());

static SNAKE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+(?:_[a-z]+)*$").unwrap());

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

static PREFIXED_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+[_.\-][A-Za-z0-9_.\-]+$").unwrap());

// Casing conventions accepted for enum promotion.
static ALL_LOWER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+$").unwrap());

static ALL_UPPER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]+$").unwrap());

static PASCAL_VALUE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Z][a-z0-9]*)+$").unwrap());

impl KeyPattern {
    /// Regex constraining the general shape of a key under this convention.
    ///
    /// `Mixed` returns `None`, meaning the key is unconstrained. For
    /// `Prefixed` the regex only covers the `token<sep>rest` shape; the
    /// shared token itself is checked by [`KeyPattern::matches_key`].
    pub fn key_regex(&self) -> Option<&'static Regex> {
        match self {
            KeyPattern::Word => Some(&WORD_REGEX),
            KeyPattern::PascalCase => Some(&PASCAL_REGEX),
            KeyPattern::CamelCase => Some(&CAMEL_REGEX),
            KeyPattern::SnakeCase => Some(&SNAKE_REGEX),
            KeyPattern::Numeric => Some(&NUMERIC_REGEX),
            KeyPattern::Prefixed(_) => Some(&PREFIXED_REGEX),
            KeyPattern::Mixed => None,
        }
    }

    /// Whether a key conforms to this convention.
    ///
    /// For `Prefixed` the key must carry the detected shared token before
    /// the separator, not just any `token<sep>rest` shape.
    pub fn matches_key(&self, key: &str) -> bool {
        match self {
            KeyPattern::Prefixed(token) => {
                let anchored = key
                    .strip_prefix(token.as_str())
                    .and_then(|rest| rest.chars().next())
                    .is_some_and(|c| matches!(c, '_' | '-' | '.'));
                anchored && PREFIXED_REGEX.is_match(key)
            }
            other => other
                .key_regex()
                .map(|re| re.is_match(key))
                .unwrap_or(true),
        }
    }

    /// Whether this convention is strong enough evidence for an open
    /// dictionary. Weaker conventions default to the closed object shape.
    pub fn supports_record(&self) -> bool {
        matches!(self, KeyPattern::Prefixed(_) | KeyPattern::SnakeCase)
    }
}

impl std::fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            KeyPattern::Word => "word",
            KeyPattern::PascalCase => "pascal-case",
            KeyPattern::CamelCase => "camel-case",
            KeyPattern::SnakeCase => "snake-case",
            KeyPattern::Numeric => "numeric",
            KeyPattern::Prefixed(token) => return write!(f, "{token}-prefixed"),
            KeyPattern::Mixed => "mixed",
        };
        write!(f, "{name}")
    }
}

/// Classify a set of sibling keys into a single naming convention.
///
/// Checks run from the most specific unambiguous convention downwards; the
/// first one every key satisfies wins. An empty set is `Mixed`.
pub fn detect_key_pattern<S: AsRef<str>>(keys: &[S]) -> KeyPattern {
    if keys.is_empty() {
        return KeyPattern::Mixed;
    }

    let all = |re: &Regex| keys.iter().all(|k| re.is_match(k.as_ref()));

    if all(&WORD_REGEX) {
        return KeyPattern::Word;
    }
    if all(&PASCAL_REGEX) {
        return KeyPattern::PascalCase;
    }
    if all(&CAMEL_REGEX) {
        return KeyPattern::CamelCase;
    }
    if all(&SNAKE_REGEX) {
        return KeyPattern::SnakeCase;
    }
    if all(&NUMERIC_REGEX) {
        return KeyPattern::Numeric;
    }
    if let Some(token) = shared_prefix_token(keys) {
        return KeyPattern::Prefixed(token);
    }
    KeyPattern::Mixed
}

/// First token before a separator, if every key carries a separator and all
/// first tokens agree.
fn shared_prefix_token<S: AsRef<str>>(keys: &[S]) -> Option<String> {
    let mut shared: Option<String> = None;
    for key in keys {
        let key = key.as_ref();
        let sep = key.find(['_', '-', '.'])?;
        if sep == 0 {
            return None;
        }
        let token = &key[..sep];
        match &shared {
            None => shared = Some(token.to_string()),
            Some(existing) if existing == token => {}
            Some(_) => return None,
        }
    }
    shared
}

/// Whether all values share one casing convention accepted for enum
/// promotion: all-lowercase, all-uppercase, or PascalCase.
pub fn uniform_casing<S: AsRef<str>>(values: &[S]) -> bool {
    if values.is_empty() {
        return false;
    }
    let all = |re: &Regex| values.iter().all(|v| re.is_match(v.as_ref()));
    all(&ALL_LOWER_REGEX) || all(&ALL_UPPER_REGEX) || all(&PASCAL_VALUE_REGEX)
}
