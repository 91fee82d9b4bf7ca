//! Install and remove receivers
//!
//! The engine attempts an install at increasing rpm levels. Only the last,
//! forced attempt is worth a human decision: failures at lower levels are
//! answered with an abort of that attempt, and their finish is not reported.

use pkgbridge_engine::{
    EventReceiver, InstallFinish, InstallProblem, ItemFinish, ItemProblem, ItemStart,
    ProblemAction, RpmLevel,
};
use pkgbridge_events::{EventKind, ProgressThrottle};
use pkgbridge_state::SharedSession;
use pkgbridge_types::ItemId;
use tracing::debug;

use crate::decision::{decide, PACKAGE_PROBLEM};
use crate::download::throttled;

const DEFAULT_ACTION: ProblemAction = ProblemAction::Abort;

pub struct InstallReceiver {
    session: SharedSession,
    throttle: Option<ProgressThrottle>,
    /// Item whose start was already reported by an earlier attempt
    started: Option<ItemId>,
}

impl InstallReceiver {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            throttle: None,
            started: None,
        }
    }
}

impl EventReceiver for InstallReceiver {
    type Start = ItemStart;
    type Progress = i64;
    type Problem = InstallProblem;
    type Action = ProblemAction;
    type Finish = InstallFinish;

    fn start(&mut self, event: ItemStart) {
        self.throttle = Some(self.session.start_throttle());
        if self.started == Some(event.id) {
            debug!(item = %event.id, "repeated install attempt");
            return;
        }
        self.started = Some(event.id);

        let item = event.item;
        self.session.report_source_change(item.repo, item.medium);
        self.session
            .callback(EventKind::StartPackage)
            .arg(item.name.as_str())
            .arg(item.location_filename())
            .arg(item.summary.as_str())
            .arg(item.install_size)
            .arg(false)
            .evaluate();
    }

    fn progress(&mut self, value: i64) -> bool {
        if !self.session.is_set(EventKind::ProgressPackage) || !throttled(&mut self.throttle, value)
        {
            return true;
        }
        self.session
            .callback(EventKind::ProgressPackage)
            .arg(value)
            .evaluate_bool(true)
    }

    fn problem(&mut self, event: InstallProblem) -> ProblemAction {
        if event.level != RpmLevel::NoDepsForce {
            debug!(item = %event.id, level = ?event.level, "install failed below forced level");
            return ProblemAction::Abort;
        }
        // A retried forced attempt is announced again.
        self.started = None;
        let callback = self.session.callback(EventKind::DonePackage);
        if !callback.is_set() {
            return DEFAULT_ACTION;
        }
        let reply = callback
            .arg(event.error.code())
            .arg(event.description)
            .evaluate_string();
        decide(
            &self.session,
            EventKind::DonePackage,
            &PACKAGE_PROBLEM,
            reply.as_deref(),
        )
    }

    fn finish(&mut self, event: InstallFinish) {
        self.throttle = None;
        if event.error.is_error() && event.level != RpmLevel::NoDepsForce {
            return;
        }
        self.started = None;
        self.session
            .callback(EventKind::DonePackage)
            .arg(event.error.code())
            .arg(event.reason)
            .evaluate();
    }
}

pub struct RemoveReceiver {
    session: SharedSession,
}

impl RemoveReceiver {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

impl EventReceiver for RemoveReceiver {
    type Start = ItemStart;
    type Progress = i64;
    type Problem = ItemProblem;
    type Action = ProblemAction;
    type Finish = ItemFinish;

    fn start(&mut self, event: ItemStart) {
        self.session
            .callback(EventKind::StartPackage)
            .arg(event.item.name)
            .arg("")
            .arg("")
            .arg(-1)
            .arg(true)
            .evaluate();
    }

    fn progress(&mut self, value: i64) -> bool {
        self.session
            .callback(EventKind::ProgressPackage)
            .arg(value)
            .evaluate_bool(true)
    }

    fn problem(&mut self, event: ItemProblem) -> ProblemAction {
        let callback = self.session.callback(EventKind::DonePackage);
        if !callback.is_set() {
            return DEFAULT_ACTION;
        }
        let reply = callback
            .arg(event.error.code())
            .arg(event.description)
            .evaluate_string();
        decide(
            &self.session,
            EventKind::DonePackage,
            &PACKAGE_PROBLEM,
            reply.as_deref(),
        )
    }

    fn finish(&mut self, event: ItemFinish) {
        self.session
            .callback(EventKind::DonePackage)
            .arg(event.error.code())
            .arg(event.reason)
            .evaluate();
    }
}
