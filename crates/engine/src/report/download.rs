use std::path::PathBuf;

use pkgbridge_types::{ItemId, ResolvableItem};
use url::Url;

use super::ReportError;

/// Start of a single file transfer
#[derive(Debug, Clone, PartialEq)]
pub struct FileDownload {
    pub url: Url,
    pub local_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferProgress {
    pub url: Url,
    /// Percent done
    pub value: i64,
    /// Average bytes per second
    pub bps_avg: f64,
    /// Current bytes per second
    pub bps_current: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProblem {
    pub url: Url,
    pub error: ReportError,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadFinish {
    pub url: Url,
    pub error: ReportError,
    pub reason: String,
}

/// Start of fetching a package from its repository
#[derive(Debug, Clone, PartialEq)]
pub struct ProvideStart {
    pub id: ItemId,
    pub item: ResolvableItem,
    pub url: Url,
}

/// Delta or patch rpm stream start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxStart {
    pub file: String,
    pub size: Option<u64>,
}
