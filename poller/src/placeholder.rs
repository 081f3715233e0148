//! `%online_<server>%` substitution over arbitrary text.

use crate::cache::StatusCache;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// Matches `%online_<server>%`. The server name is any run of characters
/// other than `%`, including the empty string.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%online_([^%]*)%").expect("placeholder pattern is valid"));

const PARAM_PREFIX: &str = "online_";

/// Replaces placeholder tokens with cached player counts.
///
/// Holds a read handle on the shared [`StatusCache`]; lookups are
/// non-blocking, so this can be called from whatever context the embedding
/// host renders text in.
#[derive(Debug, Clone)]
pub struct PlaceholderEngine {
    cache: StatusCache,
}

impl PlaceholderEngine {
    pub fn new(cache: StatusCache) -> Self {
        Self { cache }
    }

    /// Substitute every non-overlapping `%online_<server>%` token with the
    /// decimal cached count for `<server>`.
    ///
    /// Text without tokens is returned borrowed and unchanged. Repeated
    /// calls with an unchanged cache are idempotent: counts are plain
    /// digits and can never form a new token.
    pub fn substitute<'a>(&self, text: &'a str) -> Cow<'a, str> {
        PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
            self.cache.get(&caps[1]).to_string()
        })
    }

    /// True if `text` contains at least one placeholder token. Lets callers
    /// skip substitution for plain text cheaply.
    pub fn contains_token(text: &str) -> bool {
        PLACEHOLDER.is_match(text)
    }

    /// Parameter-style lookup for templating integrations: `online_<server>`
    /// yields the count as a string, anything else is not ours.
    pub fn lookup(&self, param: &str) -> Option<String> {
        let name = param.strip_prefix(PARAM_PREFIX)?;
        Some(self.cache.get(name).to_string())
    }
}
