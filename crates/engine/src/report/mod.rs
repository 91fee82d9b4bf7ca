//! Lifecycle reports pushed by the engine
//!
//! Every report category is an [`EventReceiver`]: an optional `start`, any
//! number of `progress` updates, any number of `problem`s each answered with
//! an action, and a `finish`. Categories differ only in their payload and
//! action types. The engine reaches the receiver for a category through the
//! [`ReportHub`] passed to [`commit`](crate::PackageEngine::commit).

mod download;
mod install;
mod media;
mod rpmdb;
mod script;
mod source;
mod trust;

pub use download::*;
pub use install::*;
pub use media::*;
pub use rpmdb::*;
pub use script::*;
pub use source::*;
pub use trust::*;

use std::fmt;

/// Four-phase report receiver
pub trait EventReceiver {
    type Start;
    type Progress;
    type Problem;
    type Action;
    type Finish;

    /// The report object is being connected.
    fn report_begin(&mut self) {}

    /// The report object is being disconnected.
    fn report_end(&mut self) {}

    fn start(&mut self, _event: Self::Start) {}

    /// Returns false to ask the engine to abort the step.
    fn progress(&mut self, _event: Self::Progress) -> bool {
        true
    }

    fn problem(&mut self, event: Self::Problem) -> Self::Action;

    fn finish(&mut self, _event: Self::Finish) {}
}

/// Answer to a recoverable problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemAction {
    Retry,
    Abort,
    Ignore,
}

/// Error code attached to problems and finish reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReportError {
    #[default]
    NoError,
    NotFound,
    Io,
    Invalid,
    /// Wrong medium inserted
    Wrong,
    /// Recoverable I/O failure, such as a timeout
    IoSoft,
    Rejected,
    Unknown,
}

impl ReportError {
    /// Name passed to handlers expecting a string code
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoError => "NO_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Io => "IO",
            Self::Invalid => "INVALID",
            Self::Wrong => "WRONG",
            Self::IoSoft => "IO_SOFT",
            Self::Rejected => "REJECTED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Number passed to handlers expecting an integer code
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::NoError => 0,
            Self::NotFound => 1,
            Self::Io => 2,
            Self::Invalid => 3,
            Self::Wrong => 4,
            Self::IoSoft => 5,
            Self::Rejected => 6,
            Self::Unknown => 7,
        }
    }

    #[must_use]
    pub fn is_error(self) -> bool {
        self != Self::NoError
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type DownloadReceiver = dyn EventReceiver<
    Start = FileDownload,
    Progress = TransferProgress,
    Problem = DownloadProblem,
    Action = ProblemAction,
    Finish = DownloadFinish,
>;

pub type ProvideReceiver = dyn EventReceiver<
    Start = ProvideStart,
    Progress = i64,
    Problem = ItemProblem,
    Action = ProblemAction,
    Finish = ItemFinish,
>;

pub type AuxDownloadReceiver = dyn EventReceiver<
    Start = AuxStart,
    Progress = i64,
    Problem = String,
    Action = (),
    Finish = (),
>;

pub type InstallReceiver = dyn EventReceiver<
    Start = ItemStart,
    Progress = i64,
    Problem = InstallProblem,
    Action = ProblemAction,
    Finish = InstallFinish,
>;

pub type RemoveReceiver = dyn EventReceiver<
    Start = ItemStart,
    Progress = i64,
    Problem = ItemProblem,
    Action = ProblemAction,
    Finish = ItemFinish,
>;

pub type MediaReceiver = dyn EventReceiver<
    Start = (),
    Progress = (),
    Problem = MediaRequest,
    Action = MediaAction,
    Finish = (),
>;

pub type SourceCreateReceiver = dyn EventReceiver<
    Start = url::Url,
    Progress = i64,
    Problem = SourceProblem,
    Action = ProblemAction,
    Finish = SourceFinish,
>;

pub type SourceProbeReceiver = dyn EventReceiver<
    Start = url::Url,
    Progress = ProbeProgress,
    Problem = SourceProblem,
    Action = ProblemAction,
    Finish = SourceFinish,
>;

pub type SourceRefreshReceiver = dyn EventReceiver<
    Start = RepoTask,
    Progress = i64,
    Problem = RepoProblem,
    Action = ProblemAction,
    Finish = RepoFinish,
>;

pub type DigestReceiver =
    dyn EventReceiver<Start = (), Progress = (), Problem = DigestQuery, Action = bool, Finish = ()>;

pub type KeyRingReceiver = dyn EventReceiver<
    Start = (),
    Progress = (),
    Problem = KeyQuery,
    Action = KeyTrust,
    Finish = (),
>;

pub type KeySignalReceiver =
    dyn EventReceiver<Start = (), Progress = (), Problem = KeySignal, Action = (), Finish = ()>;

pub type ScriptReceiver = dyn EventReceiver<
    Start = ScriptStart,
    Progress = ScriptOutput,
    Problem = String,
    Action = ProblemAction,
    Finish = (),
>;

pub type MessageReceiver = dyn EventReceiver<
    Start = (),
    Progress = (),
    Problem = PatchMessage,
    Action = bool,
    Finish = (),
>;

pub type RpmDbReceiver = dyn EventReceiver<
    Start = DbStart,
    Progress = DbProgress,
    Problem = String,
    Action = ProblemAction,
    Finish = DbFinish,
>;

/// Report category of an [`EventReceiver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportCategory {
    Download,
    Provide,
    DeltaDownload,
    DeltaApply,
    PatchDownload,
    Install,
    Remove,
    Media,
    SourceCreate,
    SourceProbe,
    SourceRefresh,
    Digest,
    KeyRing,
    KeySignal,
    Script,
    Message,
    ConvertDb,
    RebuildDb,
}

/// Receivers the engine reports to, one per category
pub trait ReportHub {
    fn download(&mut self) -> &mut DownloadReceiver;
    fn provide(&mut self) -> &mut ProvideReceiver;
    /// Delta, delta-apply and patch-rpm streams
    fn aux_download(&mut self, category: ReportCategory) -> Option<&mut AuxDownloadReceiver>;
    fn install(&mut self) -> &mut InstallReceiver;
    fn remove(&mut self) -> &mut RemoveReceiver;
    fn media(&mut self) -> &mut MediaReceiver;
    fn source_create(&mut self) -> &mut SourceCreateReceiver;
    fn source_probe(&mut self) -> &mut SourceProbeReceiver;
    fn source_refresh(&mut self) -> &mut SourceRefreshReceiver;
    fn digest(&mut self) -> &mut DigestReceiver;
    fn key_ring(&mut self) -> &mut KeyRingReceiver;
    fn key_signal(&mut self) -> &mut KeySignalReceiver;
    fn script(&mut self) -> &mut ScriptReceiver;
    fn message(&mut self) -> &mut MessageReceiver;
    /// Convert or rebuild receiver
    fn rpm_db(&mut self, category: ReportCategory) -> Option<&mut RpmDbReceiver>;
}
