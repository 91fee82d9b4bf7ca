//! Errors raised by the package engine collaborator

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum EngineError {
    /// A handler answered ABORT; the transaction stopped on request.
    #[error("transaction aborted: {reason}")]
    Aborted { reason: String },

    /// Anything the engine did not expect to happen.
    #[error("engine fault: {message}")]
    Fault {
        message: String,
        details: Option<String>,
    },

    #[error("repository not found: {alias}")]
    RepositoryNotFound { alias: String },

    #[error("no saved pool state")]
    NoSavedState,
}

impl EngineError {
    /// Create a fault without extra details
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault {
            message: message.into(),
            details: None,
        }
    }

    /// Whether this is a user-requested cancellation rather than a failure.
    #[must_use]
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

impl UserFacingError for EngineError {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Self::Fault {
                message,
                details: Some(details),
            } => Cow::Owned(format!("{message} ({details})")),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::RepositoryNotFound { .. } => Some("Check the configured repository aliases."),
            Self::NoSavedState => Some("Save the selection state before restoring it."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Fault { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Aborted { .. } => "engine.aborted",
            Self::Fault { .. } => "engine.fault",
            Self::RepositoryNotFound { .. } => "engine.repository_not_found",
            Self::NoSavedState => "engine.no_saved_state",
        };
        Some(code)
    }
}
