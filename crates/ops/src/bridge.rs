//! Commit orchestration
//!
//! [`Bridge`] ties the engine, the session and the configuration together.
//! A commit resets the reported source, runs the engine with a fresh
//! [`ReceiverSet`], releases the sources, refreshes the base product link
//! and turns the engine's result into a [`CommitReport`].

use std::path::PathBuf;

use pkgbridge_config::Config;
use pkgbridge_engine::{CommitPolicy, EngineCommitResult, PackageEngine};
use pkgbridge_errors::{EngineError, OpsError};
use pkgbridge_events::{BridgeEvent, CommitEvent, EventEmitter, FailureContext};
use pkgbridge_receivers::ReceiverSet;
use pkgbridge_state::{SharedSession, SilentProbing};
use pkgbridge_types::{CommitReport, ItemId, RemainingItem};
use tracing::{debug, error, info, warn};

use crate::product::{product_file, refresh_link};
use crate::Selection;

/// Result of [`Bridge::commit`]
#[derive(Debug, Clone)]
pub enum CommitOutcome {
    Completed(CommitReport),
    /// A handler aborted the transaction. Nothing after the engine commit
    /// ran.
    Aborted,
    /// The engine failed; the error is also the session's last error.
    Failed(EngineError),
}

impl CommitOutcome {
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Report for the host: an aborted commit reports result code -1, a
    /// failed one has no report.
    #[must_use]
    pub fn into_report(self) -> Option<CommitReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Aborted => Some(CommitReport::aborted()),
            Self::Failed(_) => None,
        }
    }
}

pub struct Bridge<E> {
    pub(crate) engine: E,
    pub(crate) session: SharedSession,
    pub(crate) config: Config,
}

impl<E: PackageEngine> Bridge<E> {
    #[must_use]
    pub fn new(engine: E, session: SharedSession, config: Config) -> Self {
        Self {
            engine,
            session,
            config,
        }
    }

    #[must_use]
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Selection operations with the configured authority.
    #[must_use]
    pub fn selection(&self) -> Selection {
        Selection::new(
            self.session.clone(),
            self.engine.pool(),
            self.config.selection.authority,
        )
    }

    /// Receivers for engine operations run outside a commit.
    #[must_use]
    pub fn receivers(&self) -> ReceiverSet {
        ReceiverSet::new(self.session.clone())
    }

    /// Run `operation` against the engine while only optional files are
    /// fetched. Files that are not found neither prompt for media nor fail a
    /// refresh. The previous probing mode is restored afterwards.
    pub fn with_optional_files<R>(
        &mut self,
        operation: impl FnOnce(&mut E, &mut ReceiverSet) -> R,
    ) -> R {
        let session = self.session.clone();
        let _quiet = session.silent_probing_guard(SilentProbing::OptionalFileOnly);
        let mut receivers = ReceiverSet::new(session.clone());
        operation(&mut self.engine, &mut receivers)
    }

    /// Commit the solved transaction. `media` restricts the commit to one
    /// medium; 0 commits everything.
    pub fn commit(&mut self, media: u32) -> CommitOutcome {
        self.session.reset_reported_source();
        info!(media, "commit started");
        self.session
            .emit(BridgeEvent::Commit(CommitEvent::Started { media }));

        let policy = CommitPolicy {
            restrict_to_media: media,
        };
        let mut receivers = ReceiverSet::new(self.session.clone());
        let result = match self.engine.commit(&policy, &mut receivers) {
            Ok(result) => result,
            Err(err) if err.is_abort() => {
                info!(reason = %err, "installation aborted by user");
                self.session.emit(BridgeEvent::Commit(CommitEvent::Aborted {
                    reason: err.to_string(),
                }));
                return CommitOutcome::Aborted;
            }
            Err(err) => {
                error!(error = %err, "commit failed");
                self.session.record_error(&err);
                self.session.emit(BridgeEvent::Commit(CommitEvent::Failed {
                    failure: FailureContext::from_error(&err),
                }));
                return CommitOutcome::Failed(err);
            }
        };

        self.engine.release_all_sources();

        if self.config.commit.refresh_base_product_link {
            match self.update_base_product_link() {
                Ok(Some(link)) => debug!(link = %link.display(), "base product link refreshed"),
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "base product link not refreshed");
                    self.session
                        .emit(BridgeEvent::Commit(CommitEvent::ProductLinkFailed {
                            failure: FailureContext::from_error(&err),
                        }));
                }
            }
        }

        let report = self.build_report(&result);
        info!(
            result = report.result_code,
            failed = report.failed_items.len(),
            remaining = report.remaining_items.len(),
            "commit finished"
        );
        self.session
            .emit(BridgeEvent::Commit(CommitEvent::Completed {
                result: report.result_code,
                failed: report.failed_items.len(),
                remaining: report.remaining_items.len(),
            }));
        CommitOutcome::Completed(report)
    }

    /// Point the base product link at the installed base product's
    /// descriptor. Returns the link, or `None` without a base product.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::ProductLink`] when the descriptor cannot be found
    /// or the link cannot be replaced.
    pub fn update_base_product_link(&self) -> Result<Option<PathBuf>, OpsError> {
        let Some(product) = self.engine.base_product() else {
            debug!("no base product installed");
            return Ok(None);
        };
        let link = self.config.baseproduct_link_path();
        let not_found = |message: String| OpsError::ProductLink {
            path: link.display().to_string(),
            message,
        };

        let package = product.reference_package.ok_or_else(|| {
            not_found(format!("base product {} has no reference package", product.name))
        })?;
        debug!(
            package = %package.name,
            files = package.files.len(),
            "reference package of the base product"
        );
        let target = product_file(&package.files)?.ok_or_else(|| {
            not_found(format!("{} ships no product descriptor", package.name))
        })?;

        refresh_link(&link, &target)?;
        info!(link = %link.display(), target = %target, "base product link updated");
        self.session
            .emit(BridgeEvent::Commit(CommitEvent::ProductLinkUpdated {
                link: link.display().to_string(),
                target,
            }));
        Ok(Some(link))
    }

    fn build_report(&self, result: &EngineCommitResult) -> CommitReport {
        let pool = self.engine.pool();
        let pool = pool.borrow();
        let names = |ids: &[ItemId]| -> Vec<String> {
            ids.iter()
                .filter_map(|id| pool.get(*id))
                .map(|item| item.resolvable.name.clone())
                .collect()
        };

        CommitReport {
            result_code: i64::try_from(result.committed).unwrap_or(i64::MAX),
            failed_items: names(&result.failed),
            remaining_items: result
                .remaining
                .iter()
                .filter_map(|id| pool.get(*id))
                .map(|item| RemainingItem::from(&item.resolvable))
                .collect(),
            remaining_source_items: names(&result.src_remaining),
        }
    }
}
