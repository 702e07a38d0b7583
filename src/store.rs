//! Bundle Storage
//!
//! Provides the storage capability the resolver probes, plus two concrete
//! stores: an in-memory registry and a directory-backed loader.
//!
//! The resolver only ever asks two questions of a store: does a resource
//! exist for a (bundle, locale) pair, and if so, hand over its handle. It
//! never interprets resource content.

use crate::{LocaleSpec, LocalizationError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Identifies one candidate resource lookup: bundle name × locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BundleKey {
    /// Bundle name (e.g., "messages")
    pub bundle: String,
    /// Locale spec, possibly root
    pub locale: LocaleSpec,
}

impl BundleKey {
    /// Create a new key.
    pub fn new(bundle: impl Into<String>, locale: LocaleSpec) -> Self {
        Self {
            bundle: bundle.into(),
            locale,
        }
    }
}

/// The content of one bundle resource: message keys to message text.
///
/// Owned by the store; the resolver passes handles around without looking
/// inside.
#[derive(Debug, Clone, Default)]
pub struct MessageBundle {
    messages: HashMap<String, String>,
}

impl MessageBundle {
    /// Create a new empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON object of string values.
    pub fn from_json(json: &str) -> Result<Self> {
        let messages: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { messages })
    }

    /// Add a message.
    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    /// Get a message.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(|s| s.as_str())
    }

    /// Check if the bundle has a message.
    pub fn has(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }

    /// All message keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.messages.keys()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the bundle holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Storage capability consumed by the resolver.
///
/// `exists` drives the fallback chain; `fetch` is called once per
/// successful resolution. Both are synchronous; a store that fronts slow
/// media should snapshot at startup, as [`MemoryStore::load_from_dir`]
/// does.
pub trait BundleStore: Send + Sync {
    /// Does a resource exist for this bundle name and locale?
    fn exists(&self, bundle: &str, locale: &LocaleSpec) -> bool;

    /// Fetch the resource handle for a bundle name and locale.
    fn fetch(&self, bundle: &str, locale: &LocaleSpec) -> Option<Arc<MessageBundle>>;
}

/// In-memory bundle store.
///
/// Immutable once handed to a resolver; populate it up front.
///
/// # Examples
///
/// ```
/// use msgbundle::{BundleStore, LocaleSpec, MemoryStore, MessageBundle};
///
/// let mut greetings = MessageBundle::new();
/// greetings.add("hello", "Bonjour!");
///
/// let store = MemoryStore::new()
///     .with_bundle("messages", LocaleSpec::root(), MessageBundle::new())
///     .with_bundle("messages", LocaleSpec::new("fr", None::<&str>), greetings);
///
/// assert!(store.exists("messages", &LocaleSpec::new("fr", None::<&str>)));
/// assert!(!store.exists("messages", &LocaleSpec::new("de", None::<&str>)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    bundles: HashMap<BundleKey, Arc<MessageBundle>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bundle resource.
    pub fn insert(&mut self, bundle: impl Into<String>, locale: LocaleSpec, content: MessageBundle) {
        let key = BundleKey::new(bundle, locale);
        debug!("registered bundle {} locale {}", key.bundle, key.locale);
        self.bundles.insert(key, Arc::new(content));
    }

    /// Builder-style registration.
    pub fn with_bundle(
        mut self,
        bundle: impl Into<String>,
        locale: LocaleSpec,
        content: MessageBundle,
    ) -> Self {
        self.insert(bundle, locale, content);
        self
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Whether the store holds no resources.
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Load a store snapshot from a directory tree.
    ///
    /// Expected structure, one subdirectory per bundle name:
    ///
    /// - `locales/messages/root.json` — unlocalized root resource
    /// - `locales/messages/en.json`
    /// - `locales/messages/en-US.json`
    /// - `locales/errors/fr.json`
    ///
    /// File stems other than `root` are parsed as locale tags. Load and
    /// parse problems are startup errors, not per-request ones.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            return Err(LocalizationError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Bundle directory not found: {:?}", dir),
            )));
        }

        let mut store = Self::new();

        for entry in fs::read_dir(dir)? {
            let bundle_dir = entry?.path();
            if !bundle_dir.is_dir() {
                continue;
            }
            let bundle_name = bundle_dir
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    LocalizationError::Configuration(format!(
                        "Bundle directory name is not valid UTF-8: {:?}",
                        bundle_dir
                    ))
                })?
                .to_string();

            for entry in fs::read_dir(&bundle_dir)? {
                let path = entry?.path();
                if path.extension().is_none_or(|ext| ext != "json") {
                    continue;
                }
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .ok_or_else(|| {
                        LocalizationError::Configuration(format!(
                            "Bundle file name is not valid UTF-8: {:?}",
                            path
                        ))
                    })?;

                let locale = if stem == "root" {
                    LocaleSpec::root()
                } else {
                    LocaleSpec::parse(stem)?
                };

                let content = fs::read_to_string(&path)?;
                store.insert(&bundle_name, locale, MessageBundle::from_json(&content)?);
            }
        }

        Ok(store)
    }
}

impl BundleStore for MemoryStore {
    fn exists(&self, bundle: &str, locale: &LocaleSpec) -> bool {
        self.bundles
            .contains_key(&BundleKey::new(bundle, locale.clone()))
    }

    fn fetch(&self, bundle: &str, locale: &LocaleSpec) -> Option<Arc<MessageBundle>> {
        self.bundles
            .get(&BundleKey::new(bundle, locale.clone()))
            .cloned()
    }
}

impl<S: BundleStore + ?Sized> BundleStore for Arc<S> {
    fn exists(&self, bundle: &str, locale: &LocaleSpec) -> bool {
        (**self).exists(bundle, locale)
    }

    fn fetch(&self, bundle: &str, locale: &LocaleSpec) -> Option<Arc<MessageBundle>> {
        (**self).fetch(bundle, locale)
    }
}
