use serde::{Deserialize, Serialize};

use super::FailureContext;
use crate::{EventKind, EventLevel};

/// Handler-side problems seen while marshalling an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallbackEvent {
    /// The host failed to run the handler
    Failed {
        kind: EventKind,
        handler: String,
        failure: FailureContext,
    },

    /// The handler ran but returned a value of the wrong type
    UnexpectedReply {
        kind: EventKind,
        expected: String,
        found: String,
    },

    /// The reply token is not one the adapter understands
    UnrecognizedToken {
        kind: EventKind,
        token: String,
        fallback: String,
    },

    /// A prompt was answered without consulting the handler
    Suppressed { kind: EventKind, reason: String },
}

impl CallbackEvent {
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::Failed { .. } => EventLevel::Error,
            Self::UnexpectedReply { .. } | Self::UnrecognizedToken { .. } => EventLevel::Warn,
            Self::Suppressed { .. } => EventLevel::Debug,
        }
    }
}
