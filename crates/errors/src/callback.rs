//! Callback invocation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum CallbackError {
    #[error("no handler named {handler} is known to the host")]
    UnknownHandler { handler: String },

    #[error("handler {handler} failed for {kind}: {message}")]
    InvocationFailed {
        kind: String,
        handler: String,
        message: String,
    },

    #[error("handler for {kind} returned {found}, expected {expected}")]
    UnexpectedReply {
        kind: String,
        expected: String,
        found: String,
    },
}

impl UserFacingError for CallbackError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownHandler { .. } => {
                Some("Define the handler in the host before registering it.")
            }
            Self::UnexpectedReply { .. } => {
                Some("Check that the handler returns the type expected for its event kind.")
            }
            Self::InvocationFailed { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnknownHandler { .. } => "callback.unknown_handler",
            Self::InvocationFailed { .. } => "callback.invocation_failed",
            Self::UnexpectedReply { .. } => "callback.unexpected_reply",
        };
        Some(code)
    }
}
