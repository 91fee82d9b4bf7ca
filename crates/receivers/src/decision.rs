//! Reply tables shared by the receivers

use pkgbridge_engine::ProblemAction;
use pkgbridge_events::{BridgeEvent, CallbackEvent, DecisionTable, EventEmitter, EventKind};
use pkgbridge_state::BridgeSession;

/// Retry, cancel or ignore a failed download
pub const PROVIDE_PROBLEM: DecisionTable<ProblemAction> = DecisionTable::new(
    "provide_problem",
    &[
        ("R", ProblemAction::Retry),
        ("C", ProblemAction::Abort),
        ("I", ProblemAction::Ignore),
    ],
    ProblemAction::Abort,
);

/// Retry or cancel a failed rpm operation; any other reply skips the item
pub const PACKAGE_PROBLEM: DecisionTable<ProblemAction> = DecisionTable::new(
    "package_problem",
    &[("R", ProblemAction::Retry), ("C", ProblemAction::Abort)],
    ProblemAction::Ignore,
);

pub const SCRIPT_PROBLEM: DecisionTable<ProblemAction> = DecisionTable::new(
    "script_problem",
    &[
        ("A", ProblemAction::Abort),
        ("I", ProblemAction::Ignore),
        ("R", ProblemAction::Retry),
    ],
    ProblemAction::Abort,
);

/// Symbol replies of source creation and probing
pub const SOURCE_PROBLEM: DecisionTable<ProblemAction> = DecisionTable::new(
    "source_problem",
    &[("ABORT", ProblemAction::Abort), ("RETRY", ProblemAction::Retry)],
    ProblemAction::Abort,
);

/// Symbol replies of repository refresh
pub const REFRESH_PROBLEM: DecisionTable<ProblemAction> = DecisionTable::new(
    "refresh_problem",
    &[
        ("ABORT", ProblemAction::Abort),
        ("RETRY", ProblemAction::Retry),
        ("IGNORE", ProblemAction::Ignore),
    ],
    ProblemAction::Abort,
);

/// Decode `reply` with `table`, reporting tokens the table does not know.
pub(crate) fn decide(
    session: &BridgeSession,
    kind: EventKind,
    table: &DecisionTable<ProblemAction>,
    reply: Option<&str>,
) -> ProblemAction {
    let (action, matched) = table.decode_checked(reply);
    if let (false, Some(token)) = (matched, reply) {
        session.emit(BridgeEvent::Callback(CallbackEvent::UnrecognizedToken {
            kind,
            token: token.to_string(),
            fallback: format!("{action:?}"),
        }));
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_replies_default_to_ignore() {
        assert_eq!(PACKAGE_PROBLEM.decode(Some("R")), ProblemAction::Retry);
        assert_eq!(PACKAGE_PROBLEM.decode(Some("C")), ProblemAction::Abort);
        assert_eq!(PACKAGE_PROBLEM.decode(Some("I")), ProblemAction::Ignore);
        assert_eq!(PACKAGE_PROBLEM.decode(Some("whatever")), ProblemAction::Ignore);
    }

    #[test]
    fn provide_replies() {
        assert_eq!(PROVIDE_PROBLEM.decode(Some("I")), ProblemAction::Ignore);
        assert_eq!(PROVIDE_PROBLEM.decode(None), ProblemAction::Abort);
    }

    #[test]
    fn symbol_tables_are_case_sensitive() {
        assert_eq!(SOURCE_PROBLEM.decode(Some("RETRY")), ProblemAction::Retry);
        assert_eq!(SOURCE_PROBLEM.decode(Some("retry")), ProblemAction::Abort);
        assert_eq!(REFRESH_PROBLEM.decode(Some("IGNORE")), ProblemAction::Ignore);
    }
}
