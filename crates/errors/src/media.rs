//! Media and URL error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum MediaError {
    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("unsupported media scheme: {scheme}")]
    UnknownScheme { scheme: String },
}

impl UserFacingError for MediaError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidUrl { .. } => Some("Enter a complete URL such as http://host/path."),
            Self::UnknownScheme { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidUrl { .. } => "media.invalid_url",
            Self::UnknownScheme { .. } => "media.unknown_scheme",
        };
        Some(code)
    }
}
