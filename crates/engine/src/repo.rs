//! Repository sources known to the engine

use pkgbridge_types::RepoId;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub id: RepoId,
    pub alias: String,
    pub name: String,
    pub enabled: bool,
    pub base_urls: Vec<Url>,
}

impl Repository {
    #[must_use]
    pub fn new(id: i64, alias: impl Into<String>, base_url: Url) -> Self {
        let alias = alias.into();
        Self {
            id: RepoId(id),
            name: alias.clone(),
            alias,
            enabled: true,
            base_urls: vec![base_url],
        }
    }

    /// First base URL, used when reporting about the repository
    #[must_use]
    pub fn primary_url(&self) -> Option<&Url> {
        self.base_urls.first()
    }
}
