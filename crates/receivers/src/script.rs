//! Patch script and patch message receivers

use pkgbridge_engine::{EventReceiver, PatchMessage, ProblemAction, ScriptOutput, ScriptStart};
use pkgbridge_events::EventKind;
use pkgbridge_state::SharedSession;

use crate::decision::{decide, SCRIPT_PROBLEM};

pub struct ScriptReceiver {
    session: SharedSession,
}

impl ScriptReceiver {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

impl EventReceiver for ScriptReceiver {
    type Start = ScriptStart;
    type Progress = ScriptOutput;
    type Problem = String;
    type Action = ProblemAction;
    type Finish = ();

    fn start(&mut self, event: ScriptStart) {
        self.session
            .callback(EventKind::ScriptStart)
            .arg(event.item.name.as_str())
            .arg(event.item.edition.to_string())
            .arg(event.item.arch.as_str())
            .arg(event.path.display().to_string())
            .evaluate();
    }

    fn progress(&mut self, event: ScriptOutput) -> bool {
        self.session
            .callback(EventKind::ScriptProgress)
            .arg(event.ping)
            .arg(event.output)
            .evaluate_bool(true)
    }

    fn problem(&mut self, description: String) -> ProblemAction {
        let callback = self.session.callback(EventKind::ScriptProblem);
        if !callback.is_set() {
            return SCRIPT_PROBLEM.unrecognized();
        }
        let reply = callback.arg(description).evaluate_string();
        decide(
            &self.session,
            EventKind::ScriptProblem,
            &SCRIPT_PROBLEM,
            reply.as_deref(),
        )
    }

    fn finish(&mut self, (): ()) {
        self.session.callback(EventKind::ScriptFinish).evaluate();
    }
}

/// Patch messages; the reply says whether to continue
pub struct MessageReceiver {
    session: SharedSession,
}

impl MessageReceiver {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

impl EventReceiver for MessageReceiver {
    type Start = ();
    type Progress = ();
    type Problem = PatchMessage;
    type Action = bool;
    type Finish = ();

    fn problem(&mut self, message: PatchMessage) -> bool {
        self.session
            .callback(EventKind::Message)
            .arg(message.item.name.as_str())
            .arg(message.item.edition.to_string())
            .arg(message.item.arch.as_str())
            .arg(message.text)
            .evaluate_bool(true)
    }
}
