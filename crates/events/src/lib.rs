#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Callback plumbing for pkgbridge
//!
//! This crate holds everything needed to get an engine event to a host
//! handler and a usable answer back:
//!
//! - **Registry**: one handler name per [`EventKind`], invoked through a
//!   [`HandlerHost`]
//! - **Values**: the [`Value`] model used for arguments and replies
//! - **Throttle**: [`ProgressThrottle`] bounds how often progress reaches a
//!   handler
//! - **Decisions**: [`DecisionTable`] turns reply tokens into actions
//! - **Bridge events**: structured [`BridgeEvent`]s for hosts that want to
//!   observe the bridge itself, sent over an unbounded tokio channel

pub mod decision;
pub mod events;
pub mod kind;
pub mod logging;
pub mod meta;
pub mod registry;
pub mod throttle;
pub mod value;

pub use decision::DecisionTable;
pub use events::{
    BridgeEvent, CallbackEvent, CommitEvent, EventMessage, FailureContext, GeneralEvent,
    MediaEvent, SelectionEvent, SolverEvent, SourceEvent,
};
pub use kind::{EventKind, UnknownEventKind};
pub use logging::log_event_with_tracing;
pub use meta::{EventLevel, EventMeta, EventSource};
pub use registry::{Callback, CallbackRegistry, FnHost, HandlerHost, HandlerRef};
pub use throttle::{ProgressThrottle, ThrottlePolicy};
pub use value::Value;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Sending half of the bridge event channel
pub type EventSender = UnboundedSender<EventMessage>;

/// Receiving half of the bridge event channel
pub type EventStream = UnboundedReceiver<EventMessage>;

/// Create a new bridge event channel
#[must_use]
pub fn channel() -> (EventSender, EventStream) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Emits bridge events to whoever holds the other end of the channel
pub trait EventEmitter {
    fn event_sender(&self) -> Option<&EventSender>;

    /// Metadata for the next event; override to add session context.
    fn event_meta(&self, event: &BridgeEvent) -> EventMeta {
        EventMeta::new(event.level(), event.event_source())
    }

    fn emit(&self, event: BridgeEvent) {
        if let Some(sender) = self.event_sender() {
            let meta = self.event_meta(&event);
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(EventMessage { meta, event });
        }
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(BridgeEvent::General(GeneralEvent::warning(message)));
    }

    fn emit_error(&self, message: impl Into<String>) {
        self.emit(BridgeEvent::General(GeneralEvent::error(message)));
    }

    fn emit_error_with_details(&self, message: impl Into<String>, details: impl Into<String>) {
        self.emit(BridgeEvent::General(GeneralEvent::error_with_details(
            message, details,
        )));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
