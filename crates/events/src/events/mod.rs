use serde::{Deserialize, Serialize};

use crate::{EventLevel, EventMeta, EventSource};
use pkgbridge_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub retryable: bool,
}

impl FailureContext {
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod callback;
pub mod commit;
pub mod general;
pub mod media;
pub mod selection;

pub use callback::*;
pub use commit::*;
pub use general::*;
pub use media::*;
pub use selection::*;

/// Top-level bridge event aggregating the domain events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum BridgeEvent {
    General(GeneralEvent),

    /// Handler invocation problems and suppressed prompts
    Callback(CallbackEvent),

    /// Media change requests and URL redirection
    Media(MediaEvent),

    /// Switches between repositories and media during a commit
    Source(SourceEvent),

    Commit(CommitEvent),

    Solver(SolverEvent),

    /// Selection state snapshots and bulk resets
    Selection(SelectionEvent),
}

impl BridgeEvent {
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Callback(_) => EventSource::CALLBACK,
            Self::Media(_) => EventSource::MEDIA,
            Self::Source(_) => EventSource::SOURCE,
            Self::Commit(_) => EventSource::COMMIT,
            Self::Solver(_) => EventSource::SOLVER,
            Self::Selection(_) => EventSource::SELECTION,
        }
    }

    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::General(event) => event.level(),
            Self::Callback(event) => event.level(),
            Self::Media(event) => event.level(),
            Self::Source(_) => EventLevel::Info,
            Self::Commit(event) => event.level(),
            Self::Solver(event) => event.level(),
            Self::Selection(event) => event.level(),
        }
    }
}

/// Event plus the metadata it was emitted with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: BridgeEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(event: BridgeEvent) -> Self {
        let meta = EventMeta::new(event.level(), event.event_source());
        Self { meta, event }
    }
}
