use url::Url;

use super::ReportError;

/// The engine needs a medium it cannot access
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRequest {
    pub url: Url,
    pub medium: u32,
    /// Human readable medium label, typically the repository alias
    pub label: String,
    pub error: ReportError,
    pub description: String,
    pub devices: Vec<String>,
    pub current_device: Option<usize>,
}

/// What to do about a media request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaAction {
    Retry,
    Abort,
    /// Accept a medium whose id does not match
    IgnoreId,
    /// Skip the medium and everything on it
    Skip,
    Eject { device: Option<usize> },
    /// Read the medium from another URL from now on
    ChangeUrl(Url),
}
