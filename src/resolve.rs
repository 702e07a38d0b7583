//! Bundle Resolution
//!
//! Resolves a (bundle name, locale) request to the most specific available
//! resource by walking the locale-specificity fallback chain, then the
//! bundle-name fallback chain.
//!
//! For a fixed bundle name the probe order is strict:
//!
//! 1. (language, country, variant)
//! 2. (language, country)
//! 3. (language)
//! 4. configured default locale
//! 5. configured default language only
//! 6. root (unlocalized) resource
//!
//! The first probe the store reports present wins. Only after the full
//! chain is exhausted for the requested bundle does resolution degrade to
//! the configured default bundle name, never before: which file of
//! messages the caller asked for outranks how specific a locale match can
//! be found inside it.

use crate::accept::{LocaleCandidate, parse_accept_language};
use crate::store::{BundleKey, BundleStore, MessageBundle};
use crate::{LocaleSpec, LocalizationError, ResolverConfig, Result};
use log::{debug, trace, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// The outcome of a successful resolution.
///
/// The actual bundle name and locale may differ from the request when a
/// fallback step supplied the match. The resource handle is owned by the
/// store; equality means the same name, locale, and underlying resource.
#[derive(Debug, Clone)]
pub struct ResolvedBundle {
    bundle_name: String,
    locale: LocaleSpec,
    resource: Arc<MessageBundle>,
}

impl ResolvedBundle {
    /// The bundle name that was actually found.
    pub fn bundle_name(&self) -> &str {
        &self.bundle_name
    }

    /// The locale that was actually found (possibly root).
    pub fn locale(&self) -> &LocaleSpec {
        &self.locale
    }

    /// The resource handle.
    pub fn resource(&self) -> &Arc<MessageBundle> {
        &self.resource
    }
}

impl PartialEq for ResolvedBundle {
    fn eq(&self, other: &Self) -> bool {
        self.bundle_name == other.bundle_name
            && self.locale == other.locale
            && Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl Eq for ResolvedBundle {}

/// Resolves message bundles against an immutable store and configuration.
///
/// Stateless per call apart from the resolution cache, which is keyed by
/// the requested (bundle, locale) pair and never changes an answer a cold
/// resolution would give. Safe for concurrent use; simultaneous callers
/// may redundantly compute the same entry, which is idempotent.
///
/// # Examples
///
/// ```
/// use msgbundle::{BundleResolver, LocaleSpec, MemoryStore, MessageBundle, ResolverConfig};
///
/// let store = MemoryStore::new()
///     .with_bundle("messages", LocaleSpec::root(), MessageBundle::new())
///     .with_bundle("messages", LocaleSpec::new("fr", None::<&str>), MessageBundle::new());
///
/// let config = ResolverConfig::new(["messages"], "en", Some("US"));
/// let resolver = BundleResolver::new(config, store).unwrap();
///
/// let requested = LocaleSpec::new("fr", Some("CA"));
/// let resolved = resolver.resolve(None, Some(&requested)).unwrap();
/// assert_eq!(resolved.locale().tag(), "fr");
/// ```
pub struct BundleResolver<S: BundleStore> {
    config: ResolverConfig,
    store: S,
    cache: RwLock<HashMap<BundleKey, ResolvedBundle>>,
}

impl<S: BundleStore> BundleResolver<S> {
    /// Create a resolver over a configuration snapshot and a store.
    ///
    /// Fails fast on an invalid configuration, and when the terminal
    /// fallback (default bundle, root locale) is missing from the store:
    /// that guarantee is what lets per-request resolution never fail for
    /// reachable inputs.
    pub fn new(config: ResolverConfig, store: S) -> Result<Self> {
        config.validate()?;

        let root = LocaleSpec::root();
        if !store.exists(config.default_bundle_name(), &root) {
            return Err(LocalizationError::Configuration(format!(
                "Terminal fallback missing: default bundle {:?} has no root resource",
                config.default_bundle_name(),
            )));
        }

        Ok(Self {
            config,
            store,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// The configuration snapshot.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The default bundle name.
    pub fn default_bundle_name(&self) -> &str {
        self.config.default_bundle_name()
    }

    /// The configured default locale.
    pub fn default_locale(&self) -> LocaleSpec {
        self.config.default_locale()
    }

    /// Resolve a bundle for a single target locale.
    ///
    /// An absent bundle name means the configured default bundle; an
    /// absent locale means the configured default locale. Runs the full
    /// locale chain for the requested bundle, then the full chain for the
    /// default bundle. [`LocalizationError::ResolutionFailure`] is only
    /// possible if the store contradicts the terminal-fallback guarantee
    /// checked at construction.
    pub fn resolve(
        &self,
        bundle: Option<&str>,
        locale: Option<&LocaleSpec>,
    ) -> Result<ResolvedBundle> {
        let bundle_name = match bundle {
            Some(name) => name.trim(),
            None => self.config.default_bundle_name(),
        };
        let target = locale.cloned().unwrap_or_else(|| self.config.default_locale());
        let key = BundleKey::new(bundle_name, target.clone());

        if let Some(hit) = self.cache.read().get(&key) {
            trace!("cache hit for bundle {} locale {}", key.bundle, key.locale);
            return Ok(hit.clone());
        }

        let resolved = self.resolve_uncached(bundle_name, &target)?;

        // Concurrent callers may race to insert the same idempotent value.
        self.cache.write().insert(key, resolved.clone());
        Ok(resolved)
    }

    /// Resolve against a pre-sorted candidate sequence.
    ///
    /// Iterates candidates in the given order (a wildcard stands for the
    /// configured default locale) and returns the first that resolves
    /// under the requested bundle name. Bundle-name fallback is only
    /// consulted after every candidate has failed, applied to the
    /// highest-quality candidate.
    pub fn negotiate(
        &self,
        bundle: Option<&str>,
        candidates: &[LocaleCandidate],
    ) -> Result<ResolvedBundle> {
        let bundle_name = match bundle {
            Some(name) => name.trim(),
            None => self.config.default_bundle_name(),
        };

        for candidate in candidates {
            let target = match candidate.locale() {
                Some(spec) => spec.clone(),
                None => self.config.default_locale(),
            };
            if let Some(resolved) = self.resolve_in_bundle(bundle_name, &target) {
                return Ok(resolved);
            }
            debug!(
                "no resource under bundle {} for candidate {}",
                bundle_name, target
            );
        }

        // No candidate resolved under the requested bundle: degrade at the
        // bundle-name level using the highest-quality candidate.
        let top = candidates
            .first()
            .and_then(|c| c.locale().cloned())
            .unwrap_or_else(|| self.config.default_locale());
        self.resolve(Some(bundle_name), Some(&top))
    }

    /// Parse an `Accept-Language` header and negotiate over its candidates.
    ///
    /// An empty or entirely malformed header resolves the configured
    /// default locale.
    pub fn resolve_header(&self, bundle: Option<&str>, header: &str) -> Result<ResolvedBundle> {
        let candidates = parse_accept_language(header);
        self.negotiate(bundle, &candidates)
    }

    /// Full resolution without the cache: locale chain under the requested
    /// bundle, then under the default bundle.
    fn resolve_uncached(&self, bundle_name: &str, target: &LocaleSpec) -> Result<ResolvedBundle> {
        if let Some(resolved) = self.resolve_in_bundle(bundle_name, target) {
            return Ok(resolved);
        }

        let default_bundle = self.config.default_bundle_name();
        if bundle_name != default_bundle {
            debug!(
                "bundle {} exhausted for locale {}, degrading to default bundle {}",
                bundle_name, target, default_bundle
            );
            if let Some(resolved) = self.resolve_in_bundle(default_bundle, target) {
                return Ok(resolved);
            }
        }

        warn!(
            "resolution failed for bundle {} locale {}: store contradicts startup guarantee",
            bundle_name, target
        );
        Err(LocalizationError::ResolutionFailure {
            bundle: bundle_name.to_string(),
            locale: target.to_string(),
        })
    }

    /// Walk the locale-specificity chain for a fixed bundle name.
    ///
    /// Short-circuits on the first probe the store reports present.
    fn resolve_in_bundle(&self, bundle_name: &str, target: &LocaleSpec) -> Option<ResolvedBundle> {
        for spec in self.locale_chain(target) {
            trace!("probing bundle {} locale {}", bundle_name, spec);
            if !self.store.exists(bundle_name, &spec) {
                continue;
            }
            match self.store.fetch(bundle_name, &spec) {
                Some(resource) => {
                    return Some(ResolvedBundle {
                        bundle_name: bundle_name.to_string(),
                        locale: spec,
                        resource,
                    });
                }
                // A store reporting existence but failing the fetch is
                // treated as an absent probe.
                None => warn!(
                    "store reported bundle {} locale {} present but fetch returned nothing",
                    bundle_name, spec
                ),
            }
        }
        None
    }

    /// The strict six-step probe order for a target locale.
    ///
    /// Probes that coincide with an earlier step (missing variant or
    /// country, target equal to the default locale) are emitted once.
    fn locale_chain(&self, target: &LocaleSpec) -> Vec<LocaleSpec> {
        let mut chain: Vec<LocaleSpec> = Vec::with_capacity(6);

        // Steps 1-3: the requested locale family, most specific first.
        let mut next = Some(target.clone());
        while let Some(spec) = next {
            if spec.is_root() {
                break;
            }
            next = spec.parent();
            push_once(&mut chain, spec);
        }

        // Steps 4-5: the service's own default locale, then its language.
        let default_locale = self.config.default_locale();
        push_once(&mut chain, default_locale.clone());
        push_once(&mut chain, default_locale.language_only());

        // Step 6: the unlocalized root resource.
        push_once(&mut chain, LocaleSpec::root());

        chain
    }
}

fn push_once(chain: &mut Vec<LocaleSpec>, spec: LocaleSpec) {
    if !chain.contains(&spec) {
        chain.push(spec);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn bundle_with(key: &str, msg: &str) -> MessageBundle {
        let mut b = MessageBundle::new();
        b.add(key, msg);
        b
    }

    fn fr() -> LocaleSpec {
        LocaleSpec::new("fr", None::<&str>)
    }

    fn fr_ca() -> LocaleSpec {
        LocaleSpec::new("fr", Some("CA"))
    }

    fn config() -> ResolverConfig {
        ResolverConfig::new(["messages", "errors"], "en", Some("US"))
    }

    fn store_with_root() -> MemoryStore {
        MemoryStore::new().with_bundle("messages", LocaleSpec::root(), bundle_with("hello", "Hello!"))
    }

    #[test]
    fn test_missing_terminal_fallback_is_startup_error() {
        let store = MemoryStore::new().with_bundle("messages", fr(), MessageBundle::new());
        let result = BundleResolver::new(config(), store);
        assert!(matches!(
            result,
            Err(LocalizationError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_config_is_startup_error() {
        let config = ResolverConfig::new(Vec::<String>::new(), "en", Some("US"));
        assert!(BundleResolver::new(config, store_with_root()).is_err());
    }

    #[test]
    fn test_fallback_monotonicity() {
        // Only (fr) and root exist; requesting (fr, CA) must land on (fr).
        let store = store_with_root().with_bundle("messages", fr(), bundle_with("hello", "Bonjour!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let resolved = resolver.resolve(Some("messages"), Some(&fr_ca())).unwrap();
        assert_eq!(resolved.bundle_name(), "messages");
        assert_eq!(resolved.locale(), &fr());
        assert_eq!(resolved.resource().get("hello"), Some("Bonjour!"));
    }

    #[test]
    fn test_falls_to_root_when_no_locale_matches() {
        // No French resource at all; default locale (en-US) absent too.
        let resolver = BundleResolver::new(config(), store_with_root()).unwrap();

        let resolved = resolver.resolve(Some("messages"), Some(&fr_ca())).unwrap();
        assert_eq!(resolved.bundle_name(), "messages");
        assert!(resolved.locale().is_root());
    }

    #[test]
    fn test_default_locale_consulted_before_root() {
        let store = store_with_root()
            .with_bundle("messages", LocaleSpec::new("en", Some("US")), bundle_with("hello", "Howdy!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let resolved = resolver.resolve(Some("messages"), Some(&fr_ca())).unwrap();
        assert_eq!(resolved.locale(), &LocaleSpec::new("en", Some("US")));
    }

    #[test]
    fn test_default_language_consulted_after_default_locale() {
        let store = store_with_root()
            .with_bundle("messages", LocaleSpec::new("en", None::<&str>), bundle_with("hello", "Hello!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let resolved = resolver.resolve(Some("messages"), Some(&fr_ca())).unwrap();
        assert_eq!(resolved.locale(), &LocaleSpec::new("en", None::<&str>));
    }

    #[test]
    fn test_full_specificity_wins() {
        let full = LocaleSpec::with_variant("fr", Some("CA"), Some("quebec"));
        let store = store_with_root()
            .with_bundle("messages", fr(), bundle_with("hello", "Bonjour!"))
            .with_bundle("messages", full.clone(), bundle_with("hello", "Allo!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let resolved = resolver.resolve(Some("messages"), Some(&full)).unwrap();
        assert_eq!(resolved.locale(), &full);
        assert_eq!(resolved.resource().get("hello"), Some("Allo!"));
    }

    #[test]
    fn test_bundle_fallback_after_locale_chain_exhaustion() {
        // The requested bundle has only a root resource while the default
        // bundle has an exact French match; the requested bundle's root
        // must still win, because bundle identity outranks locale
        // specificity.
        let store = store_with_root()
            .with_bundle("messages", fr(), bundle_with("hello", "Bonjour!"))
            .with_bundle("errors", LocaleSpec::root(), bundle_with("oops", "Oops!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let resolved = resolver.resolve(Some("errors"), Some(&fr())).unwrap();
        assert_eq!(resolved.bundle_name(), "errors");
        assert!(resolved.locale().is_root());
    }

    #[test]
    fn test_bundle_fallback_to_default_bundle() {
        // Requested bundle has no resources anywhere; the default bundle
        // takes over with the full locale chain.
        let store = store_with_root().with_bundle("messages", fr(), bundle_with("hello", "Bonjour!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let resolved = resolver.resolve(Some("errors"), Some(&fr())).unwrap();
        assert_eq!(resolved.bundle_name(), "messages");
        assert_eq!(resolved.locale(), &fr());
    }

    #[test]
    fn test_absent_bundle_and_locale_use_defaults() {
        let store = store_with_root()
            .with_bundle("messages", LocaleSpec::new("en", Some("US")), bundle_with("hello", "Howdy!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let resolved = resolver.resolve(None, None).unwrap();
        assert_eq!(resolved.bundle_name(), "messages");
        assert_eq!(resolved.locale(), &LocaleSpec::new("en", Some("US")));
    }

    #[test]
    fn test_cache_transparency() {
        let store = store_with_root().with_bundle("messages", fr(), bundle_with("hello", "Bonjour!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let cold = resolver.resolve(Some("messages"), Some(&fr_ca())).unwrap();
        let warm = resolver.resolve(Some("messages"), Some(&fr_ca())).unwrap();
        assert_eq!(cold, warm);
        assert!(Arc::ptr_eq(cold.resource(), warm.resource()));
    }

    #[test]
    fn test_idempotence() {
        let store = store_with_root().with_bundle("messages", fr(), bundle_with("hello", "Bonjour!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let first = resolver.resolve(Some("messages"), Some(&fr_ca())).unwrap();
        let again = resolver
            .resolve(Some(first.bundle_name()), Some(first.locale()))
            .unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_negotiation_prefers_requested_bundle() {
        // Candidates are consumed in quality order: the first one that
        // resolves under the requested bundle wins.
        let store = store_with_root()
            .with_bundle("greetings", fr(), bundle_with("hello", "Bonjour!"))
            .with_bundle("greetings", LocaleSpec::new("de", None::<&str>), bundle_with("hello", "Hallo!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let candidates = parse_accept_language("de;q=0.9, fr;q=0.8");
        let resolved = resolver.negotiate(Some("greetings"), &candidates).unwrap();
        assert_eq!(resolved.bundle_name(), "greetings");
        assert_eq!(resolved.locale(), &LocaleSpec::new("de", None::<&str>));

        // Without a de resource, the fr candidate wins.
        let store = store_with_root().with_bundle("greetings", fr(), bundle_with("hello", "Bonjour!"));
        let resolver = BundleResolver::new(config(), store).unwrap();
        let resolved = resolver.negotiate(Some("greetings"), &candidates).unwrap();
        assert_eq!(resolved.bundle_name(), "greetings");
        assert_eq!(resolved.locale(), &fr());
    }

    #[test]
    fn test_negotiation_bundle_fallback_uses_top_candidate() {
        // No candidate resolves under the requested bundle; degrade to the
        // default bundle with the highest-quality candidate.
        let store = store_with_root().with_bundle("messages", fr(), bundle_with("hello", "Bonjour!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let candidates = parse_accept_language("fr-CA, de;q=0.5");
        let resolved = resolver.negotiate(Some("errors"), &candidates).unwrap();
        assert_eq!(resolved.bundle_name(), "messages");
        assert_eq!(resolved.locale(), &fr());
    }

    #[test]
    fn test_negotiation_wildcard_means_default_locale() {
        let store = store_with_root()
            .with_bundle("messages", LocaleSpec::new("en", Some("US")), bundle_with("hello", "Howdy!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let candidates = parse_accept_language("*;q=0.5");
        let resolved = resolver.negotiate(None, &candidates).unwrap();
        assert_eq!(resolved.locale(), &LocaleSpec::new("en", Some("US")));
    }

    #[test]
    fn test_resolve_header_empty_header_uses_default_locale() {
        let store = store_with_root()
            .with_bundle("messages", LocaleSpec::new("en", Some("US")), bundle_with("hello", "Howdy!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let resolved = resolver.resolve_header(None, "").unwrap();
        assert_eq!(resolved.locale(), &LocaleSpec::new("en", Some("US")));
    }

    #[test]
    fn test_resolve_header_end_to_end() {
        let store = store_with_root()
            .with_bundle("messages", fr(), bundle_with("hello", "Bonjour!"))
            .with_bundle("messages", LocaleSpec::new("es", None::<&str>), bundle_with("hello", "Hola!"));
        let resolver = BundleResolver::new(config(), store).unwrap();

        let resolved = resolver
            .resolve_header(Some("messages"), "es;q=0.6, fr-CA;q=0.9")
            .unwrap();
        assert_eq!(resolved.locale(), &fr());
        assert_eq!(resolved.resource().get("hello"), Some("Bonjour!"));
    }

    #[test]
    fn test_locale_chain_order() {
        let resolver = BundleResolver::new(config(), store_with_root()).unwrap();
        let target = LocaleSpec::with_variant("fr", Some("CA"), Some("quebec"));

        let chain = resolver.locale_chain(&target);
        let tags: Vec<String> = chain.iter().map(|s| s.tag()).collect();
        assert_eq!(tags, ["fr-CA-quebec", "fr-CA", "fr", "en-US", "en", ""]);
    }

    #[test]
    fn test_locale_chain_skips_duplicate_probes() {
        let resolver = BundleResolver::new(config(), store_with_root()).unwrap();

        // Target equals the default locale: family steps and default steps
        // coincide and are emitted once.
        let chain = resolver.locale_chain(&LocaleSpec::new("en", Some("US")));
        let tags: Vec<String> = chain.iter().map(|s| s.tag()).collect();
        assert_eq!(tags, ["en-US", "en", ""]);
    }

    #[test]
    fn test_concurrent_resolution() {
        let store = store_with_root().with_bundle("messages", fr(), bundle_with("hello", "Bonjour!"));
        let resolver = Arc::new(BundleResolver::new(config(), Arc::new(store)).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                std::thread::spawn(move || {
                    resolver
                        .resolve(Some("messages"), Some(&fr_ca()))
                        .unwrap()
                        .locale()
                        .tag()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "fr");
        }
    }
}
