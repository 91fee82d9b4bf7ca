use serde::{Deserialize, Serialize};

use super::FailureContext;
use crate::EventLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommitEvent {
    Started {
        media: u32,
    },

    Completed {
        result: i64,
        failed: usize,
        remaining: usize,
    },

    Aborted {
        reason: String,
    },

    Failed {
        failure: FailureContext,
    },

    ProductLinkUpdated {
        link: String,
        target: String,
    },

    /// Refreshing the base product link failed; the commit still counts
    ProductLinkFailed {
        failure: FailureContext,
    },
}

impl CommitEvent {
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::Started { .. } | Self::Completed { .. } | Self::ProductLinkUpdated { .. } => {
                EventLevel::Info
            }
            Self::Aborted { .. } | Self::ProductLinkFailed { .. } => EventLevel::Warn,
            Self::Failed { .. } => EventLevel::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SolverEvent {
    Solved,

    Failed {
        problems: usize,
        badlist: Option<String>,
    },
}

impl SolverEvent {
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::Solved => EventLevel::Info,
            Self::Failed { .. } => EventLevel::Warn,
        }
    }
}
