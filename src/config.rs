//! Resolver Configuration
//!
//! Startup configuration for [`BundleResolver`](crate::BundleResolver):
//! the ordered bundle-name list and the default locale. Loaded once,
//! validated, then treated as a frozen snapshot for the process lifetime.

use crate::{LocaleSpec, LocalizationError, Result};
use log::info;
use serde::{Deserialize, Serialize};

/// Immutable resolver configuration.
///
/// # Examples
///
/// ```
/// use msgbundle::ResolverConfig;
///
/// let config = ResolverConfig::new(["messages", "errors"], "en", Some("US"));
/// config.validate().unwrap();
/// assert_eq!(config.default_bundle_name(), "messages");
/// assert_eq!(config.default_locale().tag(), "en-US");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Candidate bundle names in search order; the first is the default.
    bundle_names: Vec<String>,
    /// Default language code
    default_language: String,
    /// Default country code (may be absent)
    #[serde(default)]
    default_country: Option<String>,
}

impl ResolverConfig {
    /// Create a new configuration.
    ///
    /// Values are trimmed; call [`validate`](Self::validate) (or hand the
    /// config to a resolver, which validates on construction) before use.
    pub fn new(
        bundle_names: impl IntoIterator<Item = impl Into<String>>,
        default_language: impl Into<String>,
        default_country: Option<impl Into<String>>,
    ) -> Self {
        Self {
            bundle_names: bundle_names
                .into_iter()
                .map(|n| n.into().trim().to_string())
                .collect(),
            default_language: default_language.into().trim().to_lowercase(),
            default_country: default_country
                .map(|c| c.into().trim().to_uppercase())
                .filter(|c| !c.is_empty()),
        }
    }

    /// Load from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration invariants.
    ///
    /// An empty bundle list, a blank bundle name, or a blank default
    /// language is fatal at startup, never silently defaulted.
    pub fn validate(&self) -> Result<()> {
        if self.bundle_names.is_empty() {
            return Err(LocalizationError::Configuration(
                "Bundle name list must not be empty".to_string(),
            ));
        }
        if self.bundle_names.iter().any(|n| n.trim().is_empty()) {
            return Err(LocalizationError::Configuration(
                "Bundle names must not be blank".to_string(),
            ));
        }
        if self.default_language.trim().is_empty() {
            return Err(LocalizationError::Configuration(
                "Default language must not be blank".to_string(),
            ));
        }
        info!(
            "localization configured: default bundle={} language={} country={}",
            self.default_bundle_name(),
            self.default_language,
            self.default_country.as_deref().unwrap_or("-"),
        );
        Ok(())
    }

    /// The default bundle name (first of the list).
    pub fn default_bundle_name(&self) -> &str {
        self.bundle_names.first().map(|s| s.as_str()).unwrap_or("")
    }

    /// All configured bundle names, in search order.
    pub fn bundle_names(&self) -> &[String] {
        &self.bundle_names
    }

    /// The default language code.
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// The default country code, if configured.
    pub fn default_country(&self) -> Option<&str> {
        self.default_country.as_deref()
    }

    /// The default locale built from default language and country.
    pub fn default_locale(&self) -> LocaleSpec {
        LocaleSpec::new(&self.default_language, self.default_country.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = ResolverConfig::new(["messages", "errors"], "en", Some("US"));
        config.validate().unwrap();
        assert_eq!(config.default_bundle_name(), "messages");
        assert_eq!(config.bundle_names(), ["messages", "errors"]);
        assert_eq!(config.default_locale(), LocaleSpec::new("en", Some("US")));
    }

    #[test]
    fn test_empty_bundle_list_is_fatal() {
        let config = ResolverConfig::new(Vec::<String>::new(), "en", Some("US"));
        assert!(matches!(
            config.validate(),
            Err(LocalizationError::Configuration(_))
        ));
    }

    #[test]
    fn test_blank_bundle_name_is_fatal() {
        let config = ResolverConfig::new(["messages", "  "], "en", None::<&str>);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_default_language_is_fatal() {
        let config = ResolverConfig::new(["messages"], "  ", Some("US"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_country_is_optional() {
        let config = ResolverConfig::new(["messages"], "fr", None::<&str>);
        config.validate().unwrap();
        assert_eq!(config.default_locale().tag(), "fr");
    }

    #[test]
    fn test_from_json() {
        let config = ResolverConfig::from_json(
            r#"{
                "bundle_names": ["messages"],
                "default_language": "de",
                "default_country": "DE"
            }"#,
        )
        .unwrap();
        assert_eq!(config.default_locale().tag(), "de-DE");
    }

    #[test]
    fn test_from_json_validates() {
        let result = ResolverConfig::from_json(
            r#"{"bundle_names": [], "default_language": "en"}"#,
        );
        assert!(matches!(
            result,
            Err(LocalizationError::Configuration(_))
        ));
    }

    #[test]
    fn test_values_are_normalized() {
        let config = ResolverConfig::new(["  messages "], " EN ", Some(" us "));
        assert_eq!(config.default_bundle_name(), "messages");
        assert_eq!(config.default_locale().tag(), "en-US");
    }
}
