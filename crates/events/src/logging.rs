//! Mirror bridge events into tracing
//!
//! Hosts that consume the event channel get structured [`EventMessage`]s.
//! Hosts that only install a tracing subscriber can forward each message
//! here instead.

use tracing::{debug, error, info, trace, warn};

use crate::{BridgeEvent, EventLevel, EventMessage};

macro_rules! log_at {
    ($level:expr, $($fields:tt)+) => {
        match $level {
            EventLevel::Trace => trace!($($fields)+),
            EventLevel::Debug => debug!($($fields)+),
            EventLevel::Info => info!($($fields)+),
            EventLevel::Warn => warn!($($fields)+),
            EventLevel::Error => error!($($fields)+),
        }
    };
}

/// Log an event message at its own level with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let summary = summary(&message.event);
    log_at!(
        meta.level,
        source = meta.source.as_str(),
        event_id = %meta.event_id,
        session = ?meta.session_id,
        event = ?message.event,
        "{summary}"
    );
}

fn summary(event: &BridgeEvent) -> &'static str {
    use crate::{CallbackEvent, CommitEvent, GeneralEvent, MediaEvent, SelectionEvent, SolverEvent};

    match event {
        BridgeEvent::General(GeneralEvent::Warning { .. }) => "Warning",
        BridgeEvent::General(GeneralEvent::Error { .. }) => "Error",
        BridgeEvent::General(GeneralEvent::DebugLog { .. }) => "Debug",
        BridgeEvent::Callback(CallbackEvent::Failed { .. }) => "Callback failed",
        BridgeEvent::Callback(CallbackEvent::UnexpectedReply { .. }) => "Unexpected callback reply",
        BridgeEvent::Callback(CallbackEvent::UnrecognizedToken { .. }) => "Unrecognized reply token",
        BridgeEvent::Callback(CallbackEvent::Suppressed { .. }) => "Prompt suppressed",
        BridgeEvent::Media(MediaEvent::Redirected { .. }) => "Medium redirected",
        BridgeEvent::Media(MediaEvent::Suppressed { .. }) => "Media request suppressed",
        BridgeEvent::Source(_) => "Source changed",
        BridgeEvent::Commit(CommitEvent::Started { .. }) => "Commit started",
        BridgeEvent::Commit(CommitEvent::Completed { .. }) => "Commit completed",
        BridgeEvent::Commit(CommitEvent::Aborted { .. }) => "Commit aborted",
        BridgeEvent::Commit(CommitEvent::Failed { .. }) => "Commit failed",
        BridgeEvent::Commit(CommitEvent::ProductLinkUpdated { .. }) => "Base product link updated",
        BridgeEvent::Commit(CommitEvent::ProductLinkFailed { .. }) => "Base product link failed",
        BridgeEvent::Solver(SolverEvent::Solved) => "Dependencies solved",
        BridgeEvent::Solver(SolverEvent::Failed { .. }) => "Solver failed",
        BridgeEvent::Selection(SelectionEvent::StateSaved { .. }) => "Selection state saved",
        BridgeEvent::Selection(SelectionEvent::StateRestored { .. }) => "Selection state restored",
        BridgeEvent::Selection(SelectionEvent::Reset { .. }) => "Selection reset",
    }
}
