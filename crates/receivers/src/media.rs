//! Media change requests
//!
//! Replies: `""` retry, `"I"` ignore the medium id, `"C"` abort, `"S"` skip
//! the medium, `"E"` eject the current device and `"E<n>"` device `n`. Any
//! other reply is taken as the URL to read the medium from; it is
//! remembered for the rest of the session. A reply that is not a URL
//! retries.

use pkgbridge_engine::{EventReceiver, MediaAction, MediaRequest, ReportError};
use pkgbridge_events::{
    BridgeEvent, CallbackEvent, DecisionTable, EventEmitter, EventKind, MediaEvent, Value,
};
use pkgbridge_state::{SharedSession, SilentProbing};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Retry,
    IgnoreId,
    Abort,
    Eject,
    Skip,
}

const MEDIA_CHANGE: DecisionTable<Choice> = DecisionTable::new(
    "media_change",
    &[
        ("", Choice::Retry),
        ("I", Choice::IgnoreId),
        ("C", Choice::Abort),
        ("E", Choice::Eject),
        ("S", Choice::Skip),
    ],
    Choice::Abort,
);

pub struct MediaChangeReceiver {
    session: SharedSession,
}

impl MediaChangeReceiver {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }

    /// Why the request must not reach a handler, if it must not.
    fn suppression(&self, error: ReportError) -> Option<&'static str> {
        match self.session.silent_probing() {
            SilentProbing::Disabled => Some("source probing in progress"),
            SilentProbing::OptionalFileOnly if error == ReportError::NotFound => {
                Some("optional file not found")
            }
            _ => None,
        }
    }

    /// Decode a reply token for `request`, recording URL redirects.
    pub fn decode(&self, request: &MediaRequest, token: &str) -> MediaAction {
        if let Some(choice) = MEDIA_CHANGE.lookup(token) {
            return choice.into_action();
        }

        // `E<n>` ejects device n; an unreadable number means the first one.
        if let Some(device) = token.strip_prefix('E') {
            return MediaAction::Eject {
                device: Some(device.parse().unwrap_or(0)),
            };
        }

        match Url::parse(token) {
            Ok(redirect) => {
                self.session
                    .record_media_redirect(&request.url, request.medium, &redirect);
                MediaAction::ChangeUrl(redirect)
            }
            Err(err) => {
                warn!(reply = %token, error = %err, "media change reply is not a url, retrying");
                self.session
                    .emit(BridgeEvent::Callback(CallbackEvent::UnrecognizedToken {
                        kind: EventKind::MediaChange,
                        token: token.to_string(),
                        fallback: "Retry".to_string(),
                    }));
                MediaAction::Retry
            }
        }
    }
}

impl EventReceiver for MediaChangeReceiver {
    type Start = ();
    type Progress = ();
    type Problem = MediaRequest;
    type Action = MediaAction;
    type Finish = ();

    fn problem(&mut self, request: MediaRequest) -> MediaAction {
        if let Some(reason) = self.suppression(request.error) {
            debug!(url = %request.url, medium = request.medium, reason, "media change suppressed");
            self.session.emit(BridgeEvent::Media(MediaEvent::Suppressed {
                url: request.url.to_string(),
                medium: request.medium,
                reason: reason.to_string(),
            }));
            return MediaAction::Abort;
        }

        let callback = self.session.callback(EventKind::MediaChange);
        if !callback.is_set() {
            return MediaAction::Abort;
        }

        let url = self.session.resolve_media_url(&request.url, request.medium);
        let devices: Vec<Value> = request.devices.iter().map(Value::from).collect();
        let current = request
            .current_device
            .and_then(|index| i64::try_from(index).ok())
            .unwrap_or(-1);
        let reply = callback
            .arg(request.description.as_str())
            .arg(url.as_str())
            .arg(request.label.as_str())
            .arg(0)
            .arg("")
            .arg(request.medium)
            .arg("")
            .arg(false)
            .arg(devices)
            .arg(current)
            .evaluate_string();

        match reply {
            Some(token) => self.decode(&request, &token),
            None => MEDIA_CHANGE.decode(None).into_action(),
        }
    }
}

impl Choice {
    fn into_action(self) -> MediaAction {
        match self {
            Self::Retry => MediaAction::Retry,
            Self::IgnoreId => MediaAction::IgnoreId,
            Self::Abort => MediaAction::Abort,
            Self::Eject => MediaAction::Eject { device: None },
            Self::Skip => MediaAction::Skip,
        }
    }
}
