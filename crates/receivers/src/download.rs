//! Download receivers: single file transfers, package fetches and the
//! delta/patch rpm streams

use pkgbridge_engine::{
    AuxStart, DownloadFinish, DownloadProblem, EventReceiver, FileDownload, ItemFinish,
    ItemProblem, ProblemAction, ProvideStart, TransferProgress,
};
use pkgbridge_events::{EventKind, ProgressThrottle};
use pkgbridge_state::{SharedSession, SilentProbing};
use tracing::debug;
use url::Url;

use crate::decision::{decide, PROVIDE_PROBLEM};

/// URL schemes of local media; fetching from them is not remote.
const LOCAL_SCHEMES: &[&str] = &["cd", "dvd", "nfs", "dir", "file"];

#[must_use]
pub fn is_remote(url: &Url) -> bool {
    !LOCAL_SCHEMES.contains(&url.scheme())
}

/// Whole bytes per second, as handlers expect them
#[allow(clippy::cast_possible_truncation)]
fn bytes_per_second(rate: f64) -> i64 {
    rate.round() as i64
}

/// Gate `value` through `throttle`; a stream without state always reports.
pub(crate) fn throttled(throttle: &mut Option<ProgressThrottle>, value: i64) -> bool {
    throttle
        .as_mut()
        .is_none_or(|throttle| throttle.should_report(value))
}

/// Single file transfer
pub struct DownloadProgressReceiver {
    session: SharedSession,
    throttle: Option<ProgressThrottle>,
}

impl DownloadProgressReceiver {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            throttle: None,
        }
    }
}

impl EventReceiver for DownloadProgressReceiver {
    type Start = FileDownload;
    type Progress = TransferProgress;
    type Problem = DownloadProblem;
    type Action = ProblemAction;
    type Finish = DownloadFinish;

    fn start(&mut self, event: FileDownload) {
        self.throttle = Some(self.session.start_throttle());
        self.session
            .callback(EventKind::StartDownload)
            .arg(event.url.as_str())
            .arg(event.local_file.display().to_string())
            .evaluate();
    }

    fn progress(&mut self, event: TransferProgress) -> bool {
        if !self.session.is_set(EventKind::ProgressDownload)
            || !throttled(&mut self.throttle, event.value)
        {
            return true;
        }
        self.session
            .callback(EventKind::ProgressDownload)
            .arg(event.value)
            .arg(bytes_per_second(event.bps_avg))
            .arg(bytes_per_second(event.bps_current))
            .evaluate_bool(true)
    }

    fn problem(&mut self, event: DownloadProblem) -> ProblemAction {
        let callback = self.session.callback(EventKind::DoneProvide);
        if !callback.is_set() {
            return PROVIDE_PROBLEM.unrecognized();
        }
        let reply = callback
            .arg(event.error.code())
            .arg(event.description)
            .arg(event.url.as_str())
            .evaluate_string();
        decide(
            &self.session,
            EventKind::DoneProvide,
            &PROVIDE_PROBLEM,
            reply.as_deref(),
        )
    }

    fn finish(&mut self, event: DownloadFinish) {
        self.throttle = None;
        // Failures while probing are expected and not worth reporting.
        let code = if self.session.silent_probing() == SilentProbing::Full {
            event.error.code()
        } else {
            0
        };
        self.session
            .callback(EventKind::DoneDownload)
            .arg(code)
            .arg(event.reason)
            .evaluate();
    }
}

/// Package fetched from its repository
pub struct ProvideReceiver {
    session: SharedSession,
    throttle: Option<ProgressThrottle>,
}

impl ProvideReceiver {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            throttle: None,
        }
    }
}

impl EventReceiver for ProvideReceiver {
    type Start = ProvideStart;
    type Progress = i64;
    type Problem = ItemProblem;
    type Action = ProblemAction;
    type Finish = ItemFinish;

    fn start(&mut self, event: ProvideStart) {
        self.throttle = Some(self.session.start_throttle());
        self.session
            .report_source_change(event.item.repo, event.item.medium);
        self.session
            .callback(EventKind::StartProvide)
            .arg(event.item.name.as_str())
            .arg(event.item.download_size)
            .arg(is_remote(&event.url))
            .evaluate();
    }

    fn progress(&mut self, value: i64) -> bool {
        if !self.session.is_set(EventKind::ProgressProvide) || !throttled(&mut self.throttle, value)
        {
            return true;
        }
        self.session
            .callback(EventKind::ProgressProvide)
            .arg(value)
            .evaluate_bool(true)
    }

    fn problem(&mut self, event: ItemProblem) -> ProblemAction {
        let callback = self.session.callback(EventKind::DoneProvide);
        if !callback.is_set() {
            return PROVIDE_PROBLEM.unrecognized();
        }
        let reply = callback
            .arg(event.error.code())
            .arg(event.description)
            .arg(event.item.name)
            .evaluate_string();
        let action = decide(
            &self.session,
            EventKind::DoneProvide,
            &PROVIDE_PROBLEM,
            reply.as_deref(),
        );
        debug!(item = %event.id, ?action, "download problem answered");
        action
    }

    fn finish(&mut self, event: ItemFinish) {
        self.throttle = None;
        self.session
            .callback(EventKind::DoneProvide)
            .arg(event.error.code())
            .arg(event.reason)
            .arg(event.item.name)
            .evaluate();
    }
}

/// Event kinds one auxiliary stream reports through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxKinds {
    pub start: EventKind,
    pub progress: EventKind,
    pub problem: EventKind,
    pub finish: EventKind,
    /// The start event carries the download size.
    pub with_size: bool,
}

impl AuxKinds {
    pub const DELTA_DOWNLOAD: Self = Self {
        start: EventKind::StartDeltaDownload,
        progress: EventKind::ProgressDeltaDownload,
        problem: EventKind::ProblemDeltaDownload,
        finish: EventKind::FinishDeltaDownload,
        with_size: true,
    };

    pub const DELTA_APPLY: Self = Self {
        start: EventKind::StartDeltaApply,
        progress: EventKind::ProgressDeltaApply,
        problem: EventKind::ProblemDeltaApply,
        finish: EventKind::FinishDeltaApply,
        with_size: false,
    };

    pub const PATCH_DOWNLOAD: Self = Self {
        start: EventKind::StartPatchDownload,
        progress: EventKind::ProgressPatchDownload,
        problem: EventKind::ProblemPatchDownload,
        finish: EventKind::FinishPatchDownload,
        with_size: true,
    };
}

/// Informative delta or patch rpm stream
pub struct AuxDownloadReceiver {
    session: SharedSession,
    kinds: AuxKinds,
    throttle: Option<ProgressThrottle>,
}

impl AuxDownloadReceiver {
    #[must_use]
    pub fn new(session: SharedSession, kinds: AuxKinds) -> Self {
        Self {
            session,
            kinds,
            throttle: None,
        }
    }

    #[must_use]
    pub fn kinds(&self) -> AuxKinds {
        self.kinds
    }
}

impl EventReceiver for AuxDownloadReceiver {
    type Start = AuxStart;
    type Progress = i64;
    type Problem = String;
    type Action = ();
    type Finish = ();

    fn start(&mut self, event: AuxStart) {
        self.throttle = Some(self.session.start_throttle());
        let mut callback = self.session.callback(self.kinds.start).arg(event.file);
        if self.kinds.with_size {
            callback = callback.arg(event.size.unwrap_or(0));
        }
        callback.evaluate();
    }

    fn progress(&mut self, value: i64) -> bool {
        if !self.session.is_set(self.kinds.progress) || !throttled(&mut self.throttle, value) {
            return true;
        }
        self.session
            .callback(self.kinds.progress)
            .arg(value)
            .evaluate_bool(true)
    }

    fn problem(&mut self, description: String) {
        self.session
            .callback(self.kinds.problem)
            .arg(description)
            .evaluate();
    }

    fn finish(&mut self, (): ()) {
        self.throttle = None;
        self.session.callback(self.kinds.finish).evaluate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_schemes_are_not_remote() {
        for url in ["cd:///", "dvd:///", "nfs://server/path", "dir:///srv", "file:///srv"] {
            assert!(!is_remote(&Url::parse(url).unwrap()), "{url}");
        }
        assert!(is_remote(&Url::parse("https://download.example.com/").unwrap()));
        assert!(is_remote(&Url::parse("ftp://ftp.example.com/").unwrap()));
    }

    #[test]
    fn rates_are_rounded() {
        assert_eq!(bytes_per_second(1023.6), 1024);
        assert_eq!(bytes_per_second(0.0), 0);
    }

    #[test]
    fn missing_throttle_always_reports() {
        let mut throttle = None;
        assert!(throttled(&mut throttle, 1));
        assert!(throttled(&mut throttle, 1));
    }
}
