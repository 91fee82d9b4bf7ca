//! Media URL redirects chosen by handlers
//!
//! A redirect maps a source URL and medium number to the URL the medium is
//! read from instead. Entries live as long as the session; a later redirect
//! for the same key replaces the earlier one.

use std::collections::HashMap;

use url::Url;

#[derive(Debug, Clone, Default)]
pub struct MediaRedirectTracker {
    redirects: HashMap<(Url, u32), Url>,
}

impl MediaRedirectTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URL to use for `medium` of `url`; the input itself without a redirect.
    #[must_use]
    pub fn resolve(&self, url: &Url, medium: u32) -> Url {
        self.redirects
            .get(&(url.clone(), medium))
            .cloned()
            .unwrap_or_else(|| url.clone())
    }

    /// Returns the redirect this one replaced, if any.
    pub fn record(&mut self, original: Url, medium: u32, redirect: Url) -> Option<Url> {
        self.redirects.insert((original, medium), redirect)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.redirects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.redirects.is_empty()
    }

    pub fn clear(&mut self) {
        self.redirects.clear();
    }
}
