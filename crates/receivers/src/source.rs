//! Source creation, probing and refresh receivers

use pkgbridge_engine::{
    EventReceiver, ProbeProgress, ProblemAction, RepoFinish, RepoProblem, RepoTask, SourceFinish,
    SourceProblem,
};
use pkgbridge_events::{BridgeEvent, CallbackEvent, EventEmitter, EventKind};
use pkgbridge_state::{SharedSession, SilentProbing};
use pkgbridge_types::RepoId;
use tracing::debug;
use url::Url;

use crate::decision::{decide, REFRESH_PROBLEM, SOURCE_PROBLEM};

pub struct SourceCreateReceiver {
    session: SharedSession,
}

impl SourceCreateReceiver {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

impl EventReceiver for SourceCreateReceiver {
    type Start = Url;
    type Progress = i64;
    type Problem = SourceProblem;
    type Action = ProblemAction;
    type Finish = SourceFinish;

    fn report_begin(&mut self) {
        self.session.callback(EventKind::SourceCreateInit).evaluate();
    }

    fn report_end(&mut self) {
        self.session
            .callback(EventKind::SourceCreateDestroy)
            .evaluate();
    }

    fn start(&mut self, url: Url) {
        self.session
            .callback(EventKind::SourceCreateStart)
            .arg(url.as_str())
            .evaluate();
    }

    fn progress(&mut self, value: i64) -> bool {
        self.session
            .callback(EventKind::SourceCreateProgress)
            .arg(value)
            .evaluate_bool(true)
    }

    fn problem(&mut self, event: SourceProblem) -> ProblemAction {
        let callback = self.session.callback(EventKind::SourceCreateError);
        if !callback.is_set() {
            return SOURCE_PROBLEM.unrecognized();
        }
        let reply = callback
            .arg(event.url.as_str())
            .arg(event.error.as_str())
            .arg(event.description)
            .evaluate_symbol();
        decide(
            &self.session,
            EventKind::SourceCreateError,
            &SOURCE_PROBLEM,
            reply.as_deref(),
        )
    }

    fn finish(&mut self, event: SourceFinish) {
        self.session
            .callback(EventKind::SourceCreateEnd)
            .arg(event.url.as_str())
            .arg(event.error.as_str())
            .arg(event.reason)
            .evaluate();
    }
}

/// Source type probing. Media prompts are off from start to finish.
pub struct SourceProbeReceiver {
    session: SharedSession,
}

impl SourceProbeReceiver {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

impl EventReceiver for SourceProbeReceiver {
    type Start = Url;
    type Progress = ProbeProgress;
    type Problem = SourceProblem;
    type Action = ProblemAction;
    type Finish = SourceFinish;

    fn start(&mut self, url: Url) {
        self.session.set_silent_probing(SilentProbing::Disabled);
        self.session
            .callback(EventKind::SourceProbeStart)
            .arg(url.as_str())
            .evaluate();
    }

    fn progress(&mut self, event: ProbeProgress) -> bool {
        match event {
            ProbeProgress::Percent { url, value } => self
                .session
                .callback(EventKind::SourceProbeProgress)
                .arg(url.as_str())
                .arg(value)
                .evaluate_bool(true),
            ProbeProgress::Failed { url, kind } => {
                debug!(url = %url, kind = %kind, "not this source type");
                self.session
                    .callback(EventKind::SourceProbeFailed)
                    .arg(url.as_str())
                    .arg(kind)
                    .evaluate();
                true
            }
            ProbeProgress::Succeeded { url, kind } => {
                debug!(url = %url, kind = %kind, "source type detected");
                self.session
                    .callback(EventKind::SourceProbeSucceeded)
                    .arg(url.as_str())
                    .arg(kind)
                    .evaluate();
                true
            }
        }
    }

    fn problem(&mut self, event: SourceProblem) -> ProblemAction {
        let callback = self.session.callback(EventKind::SourceProbeError);
        if !callback.is_set() {
            return SOURCE_PROBLEM.unrecognized();
        }
        let reply = callback
            .arg(event.url.as_str())
            .arg(event.error.as_str())
            .arg(event.description)
            .evaluate_symbol();
        decide(
            &self.session,
            EventKind::SourceProbeError,
            &SOURCE_PROBLEM,
            reply.as_deref(),
        )
    }

    fn finish(&mut self, event: SourceFinish) {
        self.session.set_silent_probing(SilentProbing::Full);
        self.session
            .callback(EventKind::SourceProbeEnd)
            .arg(event.url.as_str())
            .arg(event.error.as_str())
            .arg(event.reason)
            .evaluate();
    }
}

/// Repository refresh and similar per-repository tasks
pub struct SourceRefreshReceiver {
    session: SharedSession,
}

impl SourceRefreshReceiver {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

fn repo_arg(repo: Option<RepoId>) -> i64 {
    repo.map_or(RepoId::UNKNOWN, |repo| repo.0)
}

fn url_arg(url: Option<&Url>) -> &str {
    url.map_or("", Url::as_str)
}

impl EventReceiver for SourceRefreshReceiver {
    type Start = RepoTask;
    type Progress = i64;
    type Problem = RepoProblem;
    type Action = ProblemAction;
    type Finish = RepoFinish;

    fn report_begin(&mut self) {
        self.session.callback(EventKind::SourceReportInit).evaluate();
    }

    fn report_end(&mut self) {
        self.session
            .callback(EventKind::SourceReportDestroy)
            .evaluate();
    }

    fn start(&mut self, event: RepoTask) {
        self.session
            .callback(EventKind::SourceReportStart)
            .arg(repo_arg(event.repo))
            .arg(url_arg(event.url.as_ref()))
            .arg(event.task)
            .evaluate();
    }

    fn progress(&mut self, value: i64) -> bool {
        self.session
            .callback(EventKind::SourceReportProgress)
            .arg(value)
            .evaluate_bool(true)
    }

    fn problem(&mut self, event: RepoProblem) -> ProblemAction {
        if self.session.silent_probing() == SilentProbing::OptionalFileOnly {
            debug!(description = %event.description, "ignoring refresh problem for optional file");
            self.session
                .emit(BridgeEvent::Callback(CallbackEvent::Suppressed {
                    kind: EventKind::SourceReportError,
                    reason: "optional file".to_string(),
                }));
            return ProblemAction::Ignore;
        }

        let callback = self.session.callback(EventKind::SourceReportError);
        if !callback.is_set() {
            return REFRESH_PROBLEM.unrecognized();
        }
        let reply = callback
            .arg(repo_arg(event.repo))
            .arg(url_arg(event.url.as_ref()))
            .arg(event.error.as_str())
            .arg(event.description)
            .evaluate_symbol();
        decide(
            &self.session,
            EventKind::SourceReportError,
            &REFRESH_PROBLEM,
            reply.as_deref(),
        )
    }

    fn finish(&mut self, event: RepoFinish) {
        self.session
            .callback(EventKind::SourceReportEnd)
            .arg(repo_arg(event.repo))
            .arg(url_arg(event.url.as_ref()))
            .arg(event.task)
            .arg(event.error.as_str())
            .arg(event.reason)
            .evaluate();
    }
}
