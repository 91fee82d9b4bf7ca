use std::path::PathBuf;

use super::ReportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbStart {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbProgress {
    pub value: i64,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbFinish {
    pub error: ReportError,
    pub reason: String,
}
