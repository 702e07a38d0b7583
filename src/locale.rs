//! Locale Specification
//!
//! Provides the locale value type used throughout negotiation and
//! resolution, together with its specificity ordering.

use crate::{LocalizationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A locale specification: language plus optional country and variant.
///
/// Specificity is a strict containment order:
/// `(language, country, variant)` > `(language, country)` > `(language)` >
/// root (no locale). [`LocaleSpec::parent`] degrades a spec to its immediate
/// less-specific form by dropping the trailing-most component.
///
/// # Examples
///
/// ```
/// use msgbundle::LocaleSpec;
/// use std::str::FromStr;
///
/// let fr = LocaleSpec::new("fr", None::<&str>);
/// let fr_ca = LocaleSpec::new("fr", Some("CA"));
/// let en_us_posix = LocaleSpec::from_str("en-US-posix").unwrap();
/// assert_eq!(en_us_posix.parent(), Some(LocaleSpec::new("en", Some("US"))));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocaleSpec {
    /// Language code (ISO 639-1, e.g., "en", "fr", "de"); empty for root
    pub language: String,
    /// Optional country code (ISO 3166-1, e.g., "US", "GB", "FR")
    pub country: Option<String>,
    /// Optional variant (e.g., "posix")
    pub variant: Option<String>,
}

impl LocaleSpec {
    /// Create a new locale spec from language and optional country.
    pub fn new(language: impl Into<String>, country: Option<impl Into<String>>) -> Self {
        Self {
            language: language.into().trim().to_lowercase(),
            country: normalize_country(country),
            variant: None,
        }
    }

    /// Create a locale spec with a variant.
    pub fn with_variant(
        language: impl Into<String>,
        country: Option<impl Into<String>>,
        variant: Option<impl Into<String>>,
    ) -> Self {
        Self {
            language: language.into().trim().to_lowercase(),
            country: normalize_country(country),
            variant: variant
                .map(|v| v.into().trim().to_string())
                .filter(|v| !v.is_empty()),
        }
    }

    /// The root spec: no language, no country, no variant.
    ///
    /// Identifies a bundle's unlocalized resource.
    pub fn root() -> Self {
        Self {
            language: String::new(),
            country: None,
            variant: None,
        }
    }

    /// Parse from a language tag (e.g., "en", "fr-CA", "en_US_posix").
    ///
    /// Both `-` and `_` are accepted as separators. Components are
    /// assigned positionally: language, country, variant. Letter case is
    /// not significant; language is lowercased and country uppercased.
    pub fn parse(tag: &str) -> Result<Self> {
        let parts: Vec<&str> = tag.trim().split(['-', '_']).collect();

        if parts.is_empty() || parts[0].is_empty() {
            return Err(LocalizationError::InvalidLocale(tag.to_string()));
        }

        let language = parts[0].to_lowercase();
        if language.len() < 2
            || language.len() > 3
            || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(LocalizationError::InvalidLocale(tag.to_string()));
        }

        let country = match parts.get(1) {
            Some(c) if !c.is_empty() => {
                if !c.chars().all(|ch| ch.is_ascii_alphanumeric()) {
                    return Err(LocalizationError::InvalidLocale(tag.to_string()));
                }
                Some(c.to_uppercase())
            }
            _ => None,
        };

        let variant = parts.get(2).filter(|v| !v.is_empty()).map(|v| v.to_string());

        Ok(Self {
            language,
            country,
            variant,
        })
    }

    /// Get the language tag (e.g., "en-US"); empty for root.
    pub fn tag(&self) -> String {
        let mut tag = self.language.clone();
        if let Some(ref country) = self.country {
            tag.push('-');
            tag.push_str(country);
        }
        if let Some(ref variant) = self.variant {
            tag.push('-');
            tag.push_str(variant);
        }
        tag
    }

    /// Whether this is the root (no-locale) spec.
    pub fn is_root(&self) -> bool {
        self.language.is_empty()
    }

    /// Get language-only spec (strips country and variant).
    pub fn language_only(&self) -> Self {
        Self {
            language: self.language.clone(),
            country: None,
            variant: None,
        }
    }

    /// Specificity rank: root = 0, language = 1, +country = 2, +variant = 3.
    pub fn specificity(&self) -> u8 {
        if self.is_root() {
            0
        } else if self.country.is_none() {
            1
        } else if self.variant.is_none() {
            2
        } else {
            3
        }
    }

    /// The immediate less-specific spec, dropping the trailing component.
    ///
    /// Returns `None` for the root spec.
    pub fn parent(&self) -> Option<Self> {
        if self.variant.is_some() {
            Some(Self {
                language: self.language.clone(),
                country: self.country.clone(),
                variant: None,
            })
        } else if self.country.is_some() {
            Some(self.language_only())
        } else if !self.is_root() {
            Some(Self::root())
        } else {
            None
        }
    }
}

fn normalize_country(country: Option<impl Into<String>>) -> Option<String> {
    country
        .map(|c| c.into().trim().to_uppercase())
        .filter(|c| !c.is_empty())
}

impl fmt::Display for LocaleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", self.tag())
        }
    }
}

impl FromStr for LocaleSpec {
    type Err = LocalizationError;

    fn from_str(s: &str) -> Result<Self> {
        LocaleSpec::parse(s)
    }
}
