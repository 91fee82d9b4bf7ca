//! Rpm database conversion and rebuild receivers

use pkgbridge_engine::{DbFinish, DbProgress, DbStart, EventReceiver, ProblemAction};
use pkgbridge_events::EventKind;
use pkgbridge_state::SharedSession;
use tracing::warn;

/// Event kinds of one database stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbKinds {
    pub start: EventKind,
    pub progress: EventKind,
    pub stop: EventKind,
}

impl DbKinds {
    pub const CONVERT: Self = Self {
        start: EventKind::StartConvertDb,
        progress: EventKind::ProgressConvertDb,
        stop: EventKind::StopConvertDb,
    };

    pub const REBUILD: Self = Self {
        start: EventKind::StartRebuildDb,
        progress: EventKind::ProgressRebuildDb,
        stop: EventKind::StopRebuildDb,
    };
}

pub struct RpmDbReceiver {
    session: SharedSession,
    kinds: DbKinds,
}

impl RpmDbReceiver {
    #[must_use]
    pub fn new(session: SharedSession, kinds: DbKinds) -> Self {
        Self { session, kinds }
    }
}

impl EventReceiver for RpmDbReceiver {
    type Start = DbStart;
    type Progress = DbProgress;
    type Problem = String;
    type Action = ProblemAction;
    type Finish = DbFinish;

    fn start(&mut self, event: DbStart) {
        let path = event
            .path
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        self.session
            .callback(self.kinds.start)
            .arg(path)
            .evaluate();
    }

    fn progress(&mut self, event: DbProgress) -> bool {
        let mut callback = self.session.callback(self.kinds.progress).arg(event.value);
        if let Some(path) = event.path {
            callback = callback.arg(path.display().to_string());
        }
        callback.evaluate_bool(true)
    }

    fn problem(&mut self, description: String) -> ProblemAction {
        warn!(kind = %self.kinds.start, %description, "rpm database problem");
        ProblemAction::Abort
    }

    fn finish(&mut self, event: DbFinish) {
        self.session
            .callback(self.kinds.stop)
            .arg(event.error.code())
            .arg(event.reason)
            .evaluate();
    }
}
