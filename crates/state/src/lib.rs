#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Session state for pkgbridge
//!
//! A [`BridgeSession`] is the one context object every receiver and every
//! selection or commit operation works against. It owns the handler registry
//! and the handler host, plus the state that must survive from one engine
//! report to the next: silent-probing mode, the last reported source and
//! medium, media redirects, discovered media counts, the saved-state flag and
//! the last engine error.
//!
//! Everything is interior-mutable. Handlers run synchronously on the same
//! thread and may call back into the session while a report is in flight, so
//! no borrow is ever held across a handler invocation.

pub mod flags;
pub mod redirect;

pub use flags::{SilentProbing, SilentProbingGuard};
pub use redirect::MediaRedirectTracker;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use pkgbridge_config::Config;
use pkgbridge_errors::UserFacingError;
use pkgbridge_events::{
    BridgeEvent, Callback, CallbackRegistry, EventEmitter, EventKind, EventMeta, EventSender,
    HandlerHost, MediaEvent, ProgressThrottle, SourceEvent, ThrottlePolicy,
};
use pkgbridge_types::RepoId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

/// Last engine failure caught at the bridge boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastError {
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

/// Shared handle to a session
pub type SharedSession = Rc<BridgeSession>;

pub struct BridgeSession {
    id: Uuid,
    registry: CallbackRegistry,
    host: Rc<dyn HandlerHost>,
    events: Option<EventSender>,
    throttle: ThrottlePolicy,
    silent_probing: Cell<SilentProbing>,
    last_reported: Cell<Option<(Option<RepoId>, u32)>>,
    saved_state: Cell<bool>,
    redirects: RefCell<MediaRedirectTracker>,
    media_counts: RefCell<BTreeMap<RepoId, u32>>,
    last_error: RefCell<Option<LastError>>,
}

impl BridgeSession {
    #[must_use]
    pub fn new(host: Rc<dyn HandlerHost>) -> Self {
        Self {
            id: Uuid::new_v4(),
            registry: CallbackRegistry::new(),
            host,
            events: None,
            throttle: ThrottlePolicy::default(),
            silent_probing: Cell::new(SilentProbing::Full),
            last_reported: Cell::new(None),
            saved_state: Cell::new(false),
            redirects: RefCell::new(MediaRedirectTracker::new()),
            media_counts: RefCell::new(BTreeMap::new()),
            last_error: RefCell::new(None),
        }
    }

    /// Take the throttle policy from `config`.
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.throttle = ThrottlePolicy::from(&config.throttle);
        self
    }

    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn shared(self) -> SharedSession {
        Rc::new(self)
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    #[must_use]
    pub fn host(&self) -> Rc<dyn HandlerHost> {
        self.host.clone()
    }

    #[must_use]
    pub fn is_set(&self, kind: EventKind) -> bool {
        self.registry.is_set(kind)
    }

    /// Prepare a call of the handler registered for `kind`.
    #[must_use]
    pub fn callback(&self, kind: EventKind) -> Callback {
        self.registry
            .callback(kind, self.host.clone())
            .with_events(self.events.clone())
    }

    #[must_use]
    pub fn throttle_policy(&self) -> ThrottlePolicy {
        self.throttle
    }

    /// Fresh throttle state for a stream starting now.
    #[must_use]
    pub fn start_throttle(&self) -> ProgressThrottle {
        ProgressThrottle::start(self.throttle)
    }

    #[must_use]
    pub fn silent_probing(&self) -> SilentProbing {
        self.silent_probing.get()
    }

    pub fn set_silent_probing(&self, mode: SilentProbing) {
        debug!(mode = %mode, "silent probing");
        self.silent_probing.set(mode);
    }

    /// Switch to `mode` until the returned guard is dropped.
    pub fn silent_probing_guard(&self, mode: SilentProbing) -> SilentProbingGuard<'_> {
        SilentProbingGuard::new(&self.silent_probing, mode)
    }

    /// Forget the last reported source so the next item reports a change.
    pub fn reset_reported_source(&self) {
        self.last_reported.set(None);
    }

    /// Source and medium of the last source change, if any.
    #[must_use]
    pub fn last_reported_source(&self) -> Option<(Option<RepoId>, u32)> {
        self.last_reported.get()
    }

    /// Notify the `SourceChange` handler when `repo`/`medium` differs from
    /// the last reported pair. Returns whether a change was reported.
    pub fn report_source_change(&self, repo: Option<RepoId>, medium: u32) -> bool {
        if self.last_reported.get() == Some((repo, medium)) {
            return false;
        }
        self.last_reported.set(Some((repo, medium)));

        if let Some(repo) = repo {
            let mut counts = self.media_counts.borrow_mut();
            let count = counts.entry(repo).or_insert(0);
            *count = (*count).max(medium);
        }

        let source = repo.map_or(RepoId::UNKNOWN, |repo| repo.0);
        debug!(source, medium, "source change");
        self.emit(BridgeEvent::Source(SourceEvent::Changed { source, medium }));
        self.callback(EventKind::SourceChange)
            .arg(source)
            .arg(medium)
            .evaluate();
        true
    }

    /// Highest medium number seen for `repo` so far.
    #[must_use]
    pub fn media_count(&self, repo: RepoId) -> u32 {
        self.media_counts.borrow().get(&repo).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn media_counts(&self) -> BTreeMap<RepoId, u32> {
        self.media_counts.borrow().clone()
    }

    #[must_use]
    pub fn resolve_media_url(&self, url: &Url, medium: u32) -> Url {
        self.redirects.borrow().resolve(url, medium)
    }

    pub fn record_media_redirect(&self, original: &Url, medium: u32, redirect: &Url) {
        let replaced = self
            .redirects
            .borrow_mut()
            .record(original.clone(), medium, redirect.clone());
        info!(url = %original, medium, redirect = %redirect, "media redirected");
        if let Some(previous) = replaced {
            debug!(previous = %previous, "replaced earlier redirect");
        }
        self.emit(BridgeEvent::Media(MediaEvent::Redirected {
            url: original.to_string(),
            medium,
            redirect: redirect.to_string(),
        }));
    }

    #[must_use]
    pub fn redirects(&self) -> MediaRedirectTracker {
        self.redirects.borrow().clone()
    }

    #[must_use]
    pub fn saved_state_exists(&self) -> bool {
        self.saved_state.get()
    }

    /// Note that a selection state was saved; returns whether one existed.
    pub fn mark_state_saved(&self) -> bool {
        self.saved_state.replace(true)
    }

    pub fn set_last_error(&self, message: impl Into<String>, details: impl Into<String>) {
        let error = LastError {
            message: message.into(),
            details: details.into(),
            timestamp: Utc::now(),
        };
        warn!(message = %error.message, details = %error.details, "recorded engine error");
        *self.last_error.borrow_mut() = Some(error);
    }

    /// Record `error` as the last error, using its user-facing message.
    pub fn record_error<E: UserFacingError>(&self, error: &E) {
        let details = error.user_hint().map(str::to_string).unwrap_or_default();
        self.set_last_error(error.user_message(), details);
    }

    #[must_use]
    pub fn last_error(&self) -> Option<LastError> {
        self.last_error.borrow().clone()
    }

    pub fn clear_last_error(&self) {
        self.last_error.borrow_mut().take();
    }

    /// Return every session flag to its initial value. Registered handlers
    /// are kept.
    pub fn reset(&self) {
        self.silent_probing.set(SilentProbing::Full);
        self.last_reported.set(None);
        self.saved_state.set(false);
        self.redirects.borrow_mut().clear();
        self.media_counts.borrow_mut().clear();
        self.last_error.borrow_mut().take();
    }
}

impl EventEmitter for BridgeSession {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }

    fn event_meta(&self, event: &BridgeEvent) -> EventMeta {
        EventMeta::new(event.level(), event.event_source()).with_session(self.id)
    }
}
