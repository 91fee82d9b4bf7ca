//! Solver front end
//!
//! Dependency problems are not errors to the host: they are counted, written
//! to the badlist file and reported through a `false` return.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use pkgbridge_engine::{PackageEngine, ResolverOutcome, SolverFlags, SolverProblem};
use pkgbridge_errors::{OpsError, UserFacingError};
use pkgbridge_events::{BridgeEvent, EventEmitter, SolverEvent};
use tracing::{error, info, warn};

use crate::Bridge;

/// Write `problems` to `path`: a count line, then one description per line.
///
/// # Errors
///
/// Returns [`OpsError::BadlistWrite`] if the file cannot be written.
pub fn write_badlist(path: &Path, problems: &[SolverProblem]) -> Result<(), OpsError> {
    let mut content = format!("{} packages failed\n", problems.len());
    for problem in problems {
        let _ = writeln!(content, "{}", problem.description);
    }
    fs::write(path, content).map_err(|e| OpsError::BadlistWrite {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

impl<E: PackageEngine> Bridge<E> {
    /// Run the solver over the current selection. Returns false when it
    /// found problems or failed.
    pub fn solve(&mut self) -> bool {
        match self.engine.resolve() {
            Ok(ResolverOutcome::Solved) => {
                info!("dependencies solved");
                self.session.emit(BridgeEvent::Solver(SolverEvent::Solved));
                true
            }
            Ok(ResolverOutcome::Problems(problems)) => {
                self.save_problems(&problems);
                false
            }
            Err(err) => {
                error!(error = %err, "solver failed");
                self.session.set_last_error(
                    err.user_message(),
                    format!(
                        "See {} for more information.",
                        self.config.paths.badlist.display()
                    ),
                );
                let problems = self.engine.problems();
                self.save_problems(&problems);
                false
            }
        }
    }

    /// Number of problems found by the last solver run.
    #[must_use]
    pub fn solve_errors(&self) -> usize {
        self.engine.problems().len()
    }

    #[must_use]
    pub fn solver_problems(&self) -> Vec<SolverProblem> {
        self.engine.problems()
    }

    #[must_use]
    pub fn solver_flags(&self) -> SolverFlags {
        self.engine.solver_flags()
    }

    pub fn set_solver_flags(&mut self, flags: SolverFlags) {
        info!(
            only_requires = flags.only_requires,
            ignore_already_recommended = flags.ignore_already_recommended,
            "solver flags"
        );
        self.engine.set_solver_flags(flags);
    }

    pub fn reset_solver_flags(&mut self) {
        let mut flags = self.engine.solver_flags();
        flags.reset();
        self.set_solver_flags(flags);
    }

    fn save_problems(&self, problems: &[SolverProblem]) {
        let path = &self.config.paths.badlist;
        let mut badlist = None;
        if !problems.is_empty() {
            error!(
                problems = problems.len(),
                badlist = %path.display(),
                "packages failed to resolve"
            );
            match write_badlist(path, problems) {
                Ok(()) => badlist = Some(path.display().to_string()),
                Err(err) => warn!(error = %err, "solver problems not saved"),
            }
        }
        self.session
            .emit(BridgeEvent::Solver(SolverEvent::Failed {
                problems: problems.len(),
                badlist,
            }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badlist_lists_count_then_descriptions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("badlist");
        let problems = vec![
            SolverProblem::new("nothing provides libfoo needed by bar"),
            SolverProblem::new("baz is locked but needed by qux"),
        ];

        write_badlist(&path, &problems).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "2 packages failed\n\
             nothing provides libfoo needed by bar\n\
             baz is locked but needed by qux\n"
        );
    }

    #[test]
    fn unwritable_badlist_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("badlist");
        let err = write_badlist(&path, &[SolverProblem::new("x")]).unwrap_err();
        assert!(matches!(err, OpsError::BadlistWrite { .. }));
    }
}
