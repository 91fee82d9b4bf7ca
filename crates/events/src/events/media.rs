use serde::{Deserialize, Serialize};

use crate::EventLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaEvent {
    /// A handler pointed a medium at a different URL
    Redirected {
        url: String,
        medium: u32,
        redirect: String,
    },

    /// A media request was answered with ABORT without prompting
    Suppressed {
        url: String,
        medium: u32,
        reason: String,
    },
}

impl MediaEvent {
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::Redirected { .. } => EventLevel::Info,
            Self::Suppressed { .. } => EventLevel::Debug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceEvent {
    /// Items now come from a different repository or medium
    Changed { source: i64, medium: u32 },
}
