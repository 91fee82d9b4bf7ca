//! Commit report handed back to the host

use crate::ResolvableItem;
use serde::{Deserialize, Serialize};

/// Item the engine did not get to during a commit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingItem {
    pub name: String,
    /// One of product, pattern, patch or package.
    pub kind: String,
    pub arch: String,
    pub version: String,
}

impl From<&ResolvableItem> for RemainingItem {
    fn from(item: &ResolvableItem) -> Self {
        Self {
            name: item.name.clone(),
            kind: item.kind.report_class().to_string(),
            arch: item.arch.clone(),
            version: item.edition.to_string(),
        }
    }
}

/// Outcome of one commit
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    /// Number of items committed; negative when the commit was aborted.
    pub result_code: i64,
    pub failed_items: Vec<String>,
    pub remaining_items: Vec<RemainingItem>,
    pub remaining_source_items: Vec<String>,
}

impl CommitReport {
    /// Report returned when a handler aborted the transaction
    #[must_use]
    pub fn aborted() -> Self {
        Self {
            result_code: -1,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.result_code < 0
    }
}
