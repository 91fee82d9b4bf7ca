use pkgbridge_types::RepoId;
use url::Url;

use super::ReportError;

/// Problem creating or probing a source at `url`
#[derive(Debug, Clone, PartialEq)]
pub struct SourceProblem {
    pub url: Url,
    pub error: ReportError,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFinish {
    pub url: Url,
    pub error: ReportError,
    pub reason: String,
}

/// Progress while probing the type of a source
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeProgress {
    Percent { url: Url, value: i64 },
    /// The source is not of `kind`
    Failed { url: Url, kind: String },
    Succeeded { url: Url, kind: String },
}

/// A refresh or similar task on a known repository
#[derive(Debug, Clone, PartialEq)]
pub struct RepoTask {
    pub repo: Option<RepoId>,
    pub url: Option<Url>,
    pub task: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepoProblem {
    pub repo: Option<RepoId>,
    pub url: Option<Url>,
    pub error: ReportError,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepoFinish {
    pub repo: Option<RepoId>,
    pub url: Option<Url>,
    pub task: String,
    pub error: ReportError,
    pub reason: String,
}
