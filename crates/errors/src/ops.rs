//! Selection and orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum OpsError {
    #[error("unknown resolvable kind: {kind}")]
    UnknownKind { kind: String },

    #[error("unknown authority level: {value}")]
    UnknownAuthority { value: String },

    #[error("no {kind} named {name}")]
    ItemNotFound { name: String, kind: String },

    #[error("cannot change status of {name}: {reason}")]
    TransitionRejected { name: String, reason: String },

    #[error("failed to write solver problems to {path}: {message}")]
    BadlistWrite { path: String, message: String },

    #[error("cannot refresh base product link {path}: {message}")]
    ProductLink { path: String, message: String },

    #[error("no selection state has been saved")]
    NothingSaved,
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownKind { .. } => {
                Some("Use one of: package, patch, pattern, product, selection, srcpackage.")
            }
            Self::UnknownAuthority { .. } => {
                Some("Use one of: user, application_high, application_low, solver.")
            }
            Self::TransitionRejected { .. } => {
                Some("A choice made with higher authority blocks this change.")
            }
            Self::BadlistWrite { .. } | Self::ProductLink { .. } => {
                Some("Ensure the target root is writable.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnknownKind { .. } => "ops.unknown_kind",
            Self::UnknownAuthority { .. } => "ops.unknown_authority",
            Self::ItemNotFound { .. } => "ops.item_not_found",
            Self::TransitionRejected { .. } => "ops.transition_rejected",
            Self::BadlistWrite { .. } => "ops.badlist_write",
            Self::ProductLink { .. } => "ops.product_link",
            Self::NothingSaved => "ops.nothing_saved",
        };
        Some(code)
    }
}
