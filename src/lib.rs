//! Locale Negotiation and Message Bundle Resolution
//!
//! Negotiates which human language a response should be rendered in and
//! resolves the message bundle to use for it:
//!
//! - **Accept-Language Parsing**: total parsing of the language-range
//!   subset of the header into quality-ordered locale candidates
//! - **Fallback Chains**: deterministic locale-specificity and
//!   bundle-name fallback with a guaranteed terminal fallback
//! - **Pluggable Storage**: resolution probes a [`BundleStore`]
//!   capability; resource content stays with the store
//! - **Process-Lifetime Cache**: resolution results are cached and a warm
//!   hit never changes a cold answer
//!
//! # Quick Start
//!
//! ```rust
//! use msgbundle::{BundleResolver, LocaleSpec, MemoryStore, MessageBundle, ResolverConfig};
//!
//! let mut french = MessageBundle::new();
//! french.add("hello", "Bonjour!");
//!
//! let store = MemoryStore::new()
//!     .with_bundle("messages", LocaleSpec::root(), MessageBundle::new())
//!     .with_bundle("messages", LocaleSpec::new("fr", None::<&str>), french);
//!
//! let config = ResolverConfig::new(["messages"], "en", Some("US"));
//! let resolver = BundleResolver::new(config, store).unwrap();
//!
//! // fr-CA degrades to fr, the most specific resource that exists.
//! let resolved = resolver
//!     .resolve_header(Some("messages"), "fr-CA, en;q=0.5")
//!     .unwrap();
//! assert_eq!(resolved.locale().tag(), "fr");
//! assert_eq!(resolved.resource().get("hello"), Some("Bonjour!"));
//! ```
//!
//! # Accept-Language Parsing
//!
//! ```rust
//! use msgbundle::parse_accept_language;
//!
//! let candidates = parse_accept_language("en-GB;q=0.8, fr;q=0.9, en;q=0.8");
//! // fr first by quality; en-GB before en because it came first among the ties.
//! assert_eq!(candidates[0].locale().unwrap().tag(), "fr");
//! assert_eq!(candidates[1].locale().unwrap().tag(), "en-GB");
//! ```

mod accept;
mod config;
mod error;
mod locale;
mod resolve;
mod store;

pub use accept::{LanguageRange, LocaleCandidate, parse_accept_language, preferred_locale};
pub use config::ResolverConfig;
pub use error::LocalizationError;
pub use locale::LocaleSpec;
pub use resolve::{BundleResolver, ResolvedBundle};
pub use store::{BundleKey, BundleStore, MemoryStore, MessageBundle};

/// Result type for localization operations
pub type Result<T> = std::result::Result<T, LocalizationError>;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        BundleResolver, BundleStore, LocaleCandidate, LocaleSpec, LocalizationError, MemoryStore,
        MessageBundle, ResolvedBundle, ResolverConfig, Result, parse_accept_language,
        preferred_locale,
    };
}
