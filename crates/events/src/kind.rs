//! Closed set of event kinds a handler can be registered for

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CallbackRegistry, HandlerRef};

macro_rules! event_kinds {
    ($( $variant:ident => $register:ident ),+ $(,)?) => {
        /// Event kinds handlers can be registered for
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum EventKind {
            $( $variant, )+
        }

        impl EventKind {
            /// Every kind, in declaration order
            pub const ALL: &'static [EventKind] = &[ $( EventKind::$variant, )+ ];

            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $( EventKind::$variant => stringify!($variant), )+
                }
            }
        }

        impl CallbackRegistry {
            $(
                #[doc = concat!("Register the handler for [`EventKind::", stringify!($variant), "`].")]
                pub fn $register(&self, handler: impl Into<HandlerRef>) {
                    self.register(EventKind::$variant, handler);
                }
            )+
        }
    };
}

event_kinds! {
    // package download
    StartProvide => register_start_provide,
    ProgressProvide => register_progress_provide,
    DoneProvide => register_done_provide,

    // install and removal
    StartPackage => register_start_package,
    ProgressPackage => register_progress_package,
    DonePackage => register_done_package,

    // single file download
    StartDownload => register_start_download,
    ProgressDownload => register_progress_download,
    DoneDownload => register_done_download,

    SourceChange => register_source_change,
    MediaChange => register_media_change,

    ScriptStart => register_script_start,
    ScriptProgress => register_script_progress,
    ScriptProblem => register_script_problem,
    ScriptFinish => register_script_finish,
    Message => register_message,

    // trust decisions
    ImportGpgKey => register_import_gpg_key,
    AcceptUnknownGpgKey => register_accept_unknown_gpg_key,
    AcceptUnsignedFile => register_accept_unsigned_file,
    AcceptFileWithoutChecksum => register_accept_file_without_checksum,
    AcceptVerificationFailed => register_accept_verification_failed,
    AcceptWrongDigest => register_accept_wrong_digest,
    AcceptUnknownDigest => register_accept_unknown_digest,
    TrustedKeyAdded => register_trusted_key_added,
    TrustedKeyRemoved => register_trusted_key_removed,

    SourceCreateInit => register_source_create_init,
    SourceCreateStart => register_source_create_start,
    SourceCreateProgress => register_source_create_progress,
    SourceCreateError => register_source_create_error,
    SourceCreateEnd => register_source_create_end,
    SourceCreateDestroy => register_source_create_destroy,

    SourceProbeStart => register_source_probe_start,
    SourceProbeFailed => register_source_probe_failed,
    SourceProbeSucceeded => register_source_probe_succeeded,
    SourceProbeProgress => register_source_probe_progress,
    SourceProbeError => register_source_probe_error,
    SourceProbeEnd => register_source_probe_end,

    SourceReportInit => register_source_report_init,
    SourceReportStart => register_source_report_start,
    SourceReportProgress => register_source_report_progress,
    SourceReportError => register_source_report_error,
    SourceReportEnd => register_source_report_end,
    SourceReportDestroy => register_source_report_destroy,

    StartConvertDb => register_start_convert_db,
    ProgressConvertDb => register_progress_convert_db,
    StopConvertDb => register_stop_convert_db,

    StartRebuildDb => register_start_rebuild_db,
    ProgressRebuildDb => register_progress_rebuild_db,
    StopRebuildDb => register_stop_rebuild_db,

    // delta and patch rpm streams
    StartDeltaDownload => register_start_delta_download,
    ProgressDeltaDownload => register_progress_delta_download,
    ProblemDeltaDownload => register_problem_delta_download,
    FinishDeltaDownload => register_finish_delta_download,
    StartDeltaApply => register_start_delta_apply,
    ProgressDeltaApply => register_progress_delta_apply,
    ProblemDeltaApply => register_problem_delta_apply,
    FinishDeltaApply => register_finish_delta_apply,
    StartPatchDownload => register_start_patch_download,
    ProgressPatchDownload => register_progress_patch_download,
    ProblemPatchDownload => register_problem_patch_download,
    FinishPatchDownload => register_finish_patch_download,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown event kind name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventKind(pub String);

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event kind: {}", self.0)
    }
}

impl std::error::Error for UnknownEventKind {}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}
