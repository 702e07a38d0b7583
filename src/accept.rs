//! Accept-Language Parsing
//!
//! Parses the HTTP `Accept-Language` header (the language-range subset)
//! into an ordered sequence of weighted locale candidates.
//!
//! Parsing is total: malformed entries are dropped and never abort the
//! remaining input, so any string yields a (possibly empty) candidate list.

use crate::LocaleSpec;
use log::debug;
use std::cmp::Ordering;

/// Default quality for an entry with no `q=` clause.
const DEFAULT_QUALITY: f32 = 1.0;

/// A single language range from an `Accept-Language` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageRange {
    /// A concrete tag such as `en-US`
    Tag(LocaleSpec),
    /// The `*` wildcard, matching any locale
    Wildcard,
}

/// A parsed language range with its quality weight.
///
/// Quality is always within `(0.0, 1.0]`: entries with `q=0` (an explicit
/// client rejection) or with unparsable/out-of-range qualities never
/// survive parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleCandidate {
    range: LanguageRange,
    quality: f32,
}

impl LocaleCandidate {
    /// Create a candidate for a concrete locale.
    pub fn new(locale: LocaleSpec, quality: f32) -> Self {
        Self {
            range: LanguageRange::Tag(locale),
            quality,
        }
    }

    /// Create a wildcard candidate.
    pub fn wildcard(quality: f32) -> Self {
        Self {
            range: LanguageRange::Wildcard,
            quality,
        }
    }

    /// The language range of this candidate.
    pub fn range(&self) -> &LanguageRange {
        &self.range
    }

    /// The concrete locale, or `None` for a wildcard.
    pub fn locale(&self) -> Option<&LocaleSpec> {
        match &self.range {
            LanguageRange::Tag(spec) => Some(spec),
            LanguageRange::Wildcard => None,
        }
    }

    /// Whether this candidate is the `*` wildcard.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.range, LanguageRange::Wildcard)
    }

    /// The quality weight in `(0.0, 1.0]`.
    pub fn quality(&self) -> f32 {
        self.quality
    }
}

/// Parse an `Accept-Language` header into an ordered candidate list.
///
/// Entries are sorted by quality, highest first; entries with equal
/// quality keep their input order (stable), preserving the client's
/// secondary preference ordering. An absent `q=` clause means quality
/// 1.0. An entry whose `q=` clause is present but unparsable or outside
/// `[0, 1]` is dropped rather than coerced, as is an entry with `q=0`
/// (explicit rejection). Duplicate tags are not deduplicated.
///
/// # Example
///
/// ```
/// use msgbundle::parse_accept_language;
///
/// let candidates = parse_accept_language("en-GB;q=0.8, fr;q=0.9, en;q=0.8");
/// let tags: Vec<String> = candidates
///     .iter()
///     .map(|c| c.locale().unwrap().tag())
///     .collect();
/// assert_eq!(tags, ["fr", "en-GB", "en"]);
/// ```
pub fn parse_accept_language(header: &str) -> Vec<LocaleCandidate> {
    let mut candidates: Vec<LocaleCandidate> = header
        .split(',')
        .filter_map(parse_entry)
        .collect();

    // Stable sort: equal qualities keep input order.
    candidates.sort_by(|a, b| {
        b.quality
            .partial_cmp(&a.quality)
            .unwrap_or(Ordering::Equal)
    });

    candidates
}

/// Parse a single `tag[;q=weight]` entry, or `None` if malformed.
fn parse_entry(entry: &str) -> Option<LocaleCandidate> {
    let entry = entry.trim();
    if entry.is_empty() {
        return None;
    }

    let mut parts = entry.split(';');
    let tag = parts.next()?.trim();

    let quality = match parts.find_map(|p| p.trim().strip_prefix("q=")) {
        Some(value) => match value.trim().parse::<f32>() {
            Ok(q) if (0.0..=1.0).contains(&q) => q,
            _ => {
                debug!("dropping language range {tag:?}: bad quality value {value:?}");
                return None;
            }
        },
        None => DEFAULT_QUALITY,
    };

    // q=0 means the client explicitly rejects this range.
    if quality == 0.0 {
        return None;
    }

    if tag == "*" {
        return Some(LocaleCandidate::wildcard(quality));
    }

    match LocaleSpec::parse(tag) {
        Ok(locale) => Some(LocaleCandidate::new(locale, quality)),
        Err(_) => {
            debug!("dropping malformed language range {tag:?}");
            None
        }
    }
}

/// The single best concrete locale from a header, if any.
///
/// Convenience for callers that want one target locale rather than the
/// whole candidate sequence; wildcards are skipped since they carry no
/// concrete locale of their own.
pub fn preferred_locale(header: &str) -> Option<LocaleSpec> {
    parse_accept_language(header)
        .into_iter()
        .find_map(|c| match c.range {
            LanguageRange::Tag(spec) => Some(spec),
            LanguageRange::Wildcard => None,
        })
}
