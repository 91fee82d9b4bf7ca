//! Selection state machine
//!
//! Every change is made on behalf of one [`Authority`]. An empty name
//! addresses every item of the kind. Changes are applied item by item: when
//! some items reject a transition the others keep their new status, and the
//! operation reports failure.

use pkgbridge_engine::{Pool, SharedPool};
use pkgbridge_errors::OpsError;
use pkgbridge_events::{BridgeEvent, EventEmitter, SelectionEvent};
use pkgbridge_state::SharedSession;
use pkgbridge_types::{Authority, ItemId, ResStatus, ResolvableKind};
use tracing::{debug, info, warn};

/// Which instances of a name an operation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// Best available instance
    Candidate,
    /// Every instance offered by a repository
    Available,
    Installed,
    All,
}

pub struct Selection {
    session: SharedSession,
    pool: SharedPool,
    authority: Authority,
}

impl Selection {
    #[must_use]
    pub fn new(session: SharedSession, pool: SharedPool, authority: Authority) -> Self {
        Self {
            session,
            pool,
            authority,
        }
    }

    #[must_use]
    pub fn authority(&self) -> Authority {
        self.authority
    }

    pub(crate) fn session(&self) -> &SharedSession {
        &self.session
    }

    pub(crate) fn pool(&self) -> &SharedPool {
        &self.pool
    }

    /// Select the best available instance for installation.
    pub fn install(&self, name: &str, kind: ResolvableKind) -> bool {
        report("install", name, kind, self.try_install(name, kind))
    }

    /// # Errors
    ///
    /// Returns [`OpsError::ItemNotFound`] when nothing can be installed under
    /// `name`, or [`OpsError::TransitionRejected`] when a higher authority
    /// blocks the selection.
    pub fn try_install(&self, name: &str, kind: ResolvableKind) -> Result<usize, OpsError> {
        let authority = self.authority;
        self.update(name, kind, Target::Candidate, |status| {
            status.set_transact(true, authority)
        })
    }

    /// Select the installed instance for removal.
    pub fn delete(&self, name: &str, kind: ResolvableKind) -> bool {
        report("delete", name, kind, self.try_delete(name, kind))
    }

    /// # Errors
    ///
    /// Same as [`try_install`](Self::try_install), for installed instances.
    pub fn try_delete(&self, name: &str, kind: ResolvableKind) -> Result<usize, OpsError> {
        let authority = self.authority;
        self.update(name, kind, Target::Installed, |status| {
            status.set_transact(true, authority)
        })
    }

    /// Forbid installing the package. Taboo is always placed with user
    /// authority.
    pub fn taboo(&self, name: &str) -> bool {
        let kind = ResolvableKind::Package;
        let result = self.update(name, kind, Target::Available, ResStatus::set_taboo);
        report("taboo", name, kind, result)
    }

    /// Clear transact marks and locks placed with the selection's
    /// authority. `force` also clears what the user set.
    pub fn neutral(&self, name: &str, kind: ResolvableKind, force: bool) -> bool {
        report("neutral", name, kind, self.try_neutral(name, kind, force))
    }

    /// # Errors
    ///
    /// Returns [`OpsError::TransitionRejected`] when a mark survives the
    /// reset.
    pub fn try_neutral(
        &self,
        name: &str,
        kind: ResolvableKind,
        force: bool,
    ) -> Result<usize, OpsError> {
        let authority = self.authority;
        self.update(name, kind, Target::All, |status| {
            let reset = status.reset_transact(authority);
            let unlocked = status.unlock(authority);
            if force {
                let unlocked = status.unlock(Authority::User);
                return status.reset_transact(Authority::User) && unlocked;
            }
            reset && unlocked
        })
    }

    /// Keep automatic logic from selecting the item through
    /// recommendations. Hard requirements still select it.
    pub fn soft_lock(&self, name: &str, kind: ResolvableKind) -> bool {
        let authority = self.authority;
        let result = self.update(name, kind, Target::Available, |status| {
            status.set_soft_lock(authority)
        });
        report("soft lock", name, kind, result)
    }

    /// Status of the best available instance, else of the installed one.
    #[must_use]
    pub fn status(&self, name: &str, kind: ResolvableKind) -> Option<ResStatus> {
        let pool = self.pool.borrow();
        let id = pool
            .candidate(kind, name)
            .or_else(|| pool.installed(kind, name))?;
        pool.get(id).map(|item| item.status)
    }

    /// Clear the transact marks placed with exactly `authority`, over every
    /// resettable kind. Returns the number of items cleared.
    pub fn reset_all(&self, authority: Authority) -> usize {
        let mut cleared = 0;
        {
            let mut pool = self.pool.borrow_mut();
            for kind in ResolvableKind::RESETTABLE {
                for id in pool.ids(kind) {
                    let Some(status) = pool.status_mut(id) else {
                        continue;
                    };
                    if status.transacts()
                        && status.authority() == authority
                        && status.reset_transact(authority)
                    {
                        cleared += 1;
                    }
                }
            }
        }

        debug!(authority = %authority, cleared, "selection reset");
        self.session
            .emit(BridgeEvent::Selection(SelectionEvent::Reset {
                authority: authority.to_string(),
                cleared,
            }));
        cleared
    }

    /// Forget the user's choices.
    pub fn reset(&self) -> usize {
        self.reset_all(Authority::User)
    }

    /// Forget the choices made with the selection's own authority.
    pub fn appl_reset(&self) -> usize {
        self.reset_all(self.authority)
    }

    /// Snapshot every status into the engine's single saved slot.
    pub fn save_state(&self) {
        self.pool.borrow_mut().save_state();
        let overwrote = self.session.mark_state_saved();
        if overwrote {
            warn!("overwriting previously saved selection state");
        } else {
            info!("selection state saved");
        }
        self.session
            .emit(BridgeEvent::Selection(SelectionEvent::StateSaved { overwrote }));
    }

    /// Restore the saved statuses. With `check_only` nothing is restored and
    /// the result says whether restoring would change anything.
    pub fn restore_state(&self, check_only: bool) -> bool {
        if check_only {
            return self.diff_state();
        }
        match self.try_restore_state() {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "selection state not restored");
                false
            }
        }
    }

    /// Returns whether restoring changed any status.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::NothingSaved`] when no state was saved.
    pub fn try_restore_state(&self) -> Result<bool, OpsError> {
        let changed = {
            let mut pool = self.pool.borrow_mut();
            if !pool.has_saved_state() {
                return Err(OpsError::NothingSaved);
            }
            let changed = pool.diff_state();
            pool.restore_state().map_err(|_| OpsError::NothingSaved)?;
            changed
        };
        info!(changed, "selection state restored");
        self.session
            .emit(BridgeEvent::Selection(SelectionEvent::StateRestored { changed }));
        Ok(changed)
    }

    /// Whether any status differs from the saved state.
    #[must_use]
    pub fn diff_state(&self) -> bool {
        self.pool.borrow().diff_state()
    }

    fn update<F>(
        &self,
        name: &str,
        kind: ResolvableKind,
        target: Target,
        mut transition: F,
    ) -> Result<usize, OpsError>
    where
        F: FnMut(&mut ResStatus) -> bool,
    {
        let mut pool = self.pool.borrow_mut();
        let ids = targets(&pool, name, kind, target)?;

        let mut changed = 0;
        let mut rejected: Option<(String, Authority)> = None;
        for id in ids {
            let Some(item) = pool.get_mut(id) else {
                continue;
            };
            let holder = item.status.authority();
            if transition(&mut item.status) {
                changed += 1;
            } else if rejected.is_none() {
                rejected = Some((item.resolvable.name.clone(), holder));
            }
        }

        match rejected {
            Some((name, holder)) => Err(OpsError::TransitionRejected {
                name,
                reason: format!("held with {holder} authority"),
            }),
            None => Ok(changed),
        }
    }
}

fn targets(
    pool: &Pool,
    name: &str,
    kind: ResolvableKind,
    target: Target,
) -> Result<Vec<ItemId>, OpsError> {
    let names = if name.is_empty() {
        pool.names(kind).into_iter().collect()
    } else {
        vec![name.to_string()]
    };

    let mut ids = Vec::new();
    for name in &names {
        let found: Vec<ItemId> = match target {
            Target::Candidate => pool.candidate(kind, name).into_iter().collect(),
            Target::Installed => pool.installed(kind, name).into_iter().collect(),
            Target::Available => pool
                .by_name(kind, name)
                .filter(|item| !item.resolvable.installed)
                .map(|item| item.id)
                .collect(),
            Target::All => pool.by_name(kind, name).map(|item| item.id).collect(),
        };
        ids.extend(found);
    }

    if ids.is_empty() && !name.is_empty() {
        return Err(OpsError::ItemNotFound {
            name: name.to_string(),
            kind: kind.to_string(),
        });
    }
    Ok(ids)
}

fn report(
    operation: &str,
    name: &str,
    kind: ResolvableKind,
    result: Result<usize, OpsError>,
) -> bool {
    match result {
        Ok(changed) => {
            debug!(operation, name, kind = %kind, changed, "selection changed");
            true
        }
        Err(err) => {
            warn!(operation, name, kind = %kind, error = %err, "selection change rejected");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgbridge_events::FnHost;
    use pkgbridge_state::BridgeSession;
    use pkgbridge_types::{LockState, RepoId, ResolvableItem};
    use std::rc::Rc;

    fn selection(authority: Authority) -> Selection {
        let mut pool = Pool::new();
        pool.insert(ResolvableItem::new(ResolvableKind::Package, "vim", "9.0-1").installed());
        pool.insert(
            ResolvableItem::new(ResolvableKind::Package, "vim", "9.1-1").from_repo(RepoId(1), 1),
        );
        pool.insert(
            ResolvableItem::new(ResolvableKind::Package, "emacs", "29.1-1")
                .from_repo(RepoId(1), 1),
        );
        pool.insert(
            ResolvableItem::new(ResolvableKind::Pattern, "base", "1-1").from_repo(RepoId(1), 1),
        );
        let session = BridgeSession::new(Rc::new(FnHost::new())).shared();
        Selection::new(session, pool.shared(), authority)
    }

    #[test]
    fn install_selects_candidate_only() {
        let selection = selection(Authority::User);
        assert!(selection.install("vim", ResolvableKind::Package));

        let pool = selection.pool().borrow();
        let candidate = pool.candidate(ResolvableKind::Package, "vim").unwrap();
        let installed = pool.installed(ResolvableKind::Package, "vim").unwrap();
        assert!(pool.get(candidate).unwrap().to_install());
        assert!(!pool.get(installed).unwrap().status.transacts());
    }

    #[test]
    fn delete_marks_installed_instance() {
        let selection = selection(Authority::User);
        assert!(selection.delete("vim", ResolvableKind::Package));
        assert!(!selection.delete("emacs", ResolvableKind::Package));

        let pool = selection.pool().borrow();
        let installed = pool.installed(ResolvableKind::Package, "vim").unwrap();
        assert!(pool.get(installed).unwrap().to_delete());
    }

    #[test]
    fn unknown_name_is_not_found() {
        let selection = selection(Authority::User);
        assert!(matches!(
            selection.try_install("nano", ResolvableKind::Package),
            Err(OpsError::ItemNotFound { .. })
        ));
        assert!(!selection.install("vim", ResolvableKind::Patch));
    }

    #[test]
    fn empty_name_addresses_every_item_of_kind() {
        let selection = selection(Authority::User);
        assert_eq!(selection.try_install("", ResolvableKind::Package).unwrap(), 2);
        assert_eq!(selection.pool().borrow().transacting().len(), 2);
    }

    #[test]
    fn neutral_respects_authority_unless_forced() {
        let user = selection(Authority::User);
        assert!(user.install("emacs", ResolvableKind::Package));
        let appl = Selection::new(
            user.session().clone(),
            user.pool().clone(),
            Authority::ApplicationHigh,
        );

        assert!(!appl.neutral("emacs", ResolvableKind::Package, false));
        assert!(appl
            .status("emacs", ResolvableKind::Package)
            .unwrap()
            .transacts());

        assert!(appl.neutral("emacs", ResolvableKind::Package, true));
        assert!(!appl
            .status("emacs", ResolvableKind::Package)
            .unwrap()
            .transacts());
    }

    #[test]
    fn taboo_overrides_and_blocks_solver() {
        let selection = selection(Authority::ApplicationHigh);
        assert!(selection.install("emacs", ResolvableKind::Package));
        assert!(selection.taboo("emacs"));

        let status = selection.status("emacs", ResolvableKind::Package).unwrap();
        assert_eq!(status.lock(), LockState::Taboo);
        assert_eq!(status.authority(), Authority::User);
        assert!(!status.transacts());

        let solver = Selection::new(
            selection.session().clone(),
            selection.pool().clone(),
            Authority::Solver,
        );
        assert!(!solver.install("emacs", ResolvableKind::Package));
    }

    #[test]
    fn soft_lock_keeps_item_unselected() {
        let selection = selection(Authority::ApplicationHigh);
        assert!(selection.soft_lock("emacs", ResolvableKind::Package));
        let status = selection.status("emacs", ResolvableKind::Package).unwrap();
        assert!(status.is_soft_locked());
        assert!(!status.transacts());
    }

    #[test]
    fn reset_clears_only_given_authority() {
        let user = selection(Authority::User);
        assert!(user.install("emacs", ResolvableKind::Package));
        let appl = Selection::new(
            user.session().clone(),
            user.pool().clone(),
            Authority::ApplicationHigh,
        );
        assert!(appl.install("base", ResolvableKind::Pattern));

        assert_eq!(appl.appl_reset(), 1);
        assert!(user
            .status("emacs", ResolvableKind::Package)
            .unwrap()
            .transacts());
        assert!(!user
            .status("base", ResolvableKind::Pattern)
            .unwrap()
            .transacts());
        assert_eq!(user.reset(), 1);
        assert!(user.pool().borrow().transacting().is_empty());
    }

    #[test]
    fn save_restore_round_trip() {
        let selection = selection(Authority::User);
        assert!(!selection.restore_state(false));

        selection.save_state();
        assert!(selection.install("emacs", ResolvableKind::Package));
        assert!(selection.diff_state());
        assert!(selection.restore_state(true));
        assert!(selection
            .status("emacs", ResolvableKind::Package)
            .unwrap()
            .transacts());

        assert!(selection.try_restore_state().unwrap());
        assert!(!selection.diff_state());
        assert!(selection.pool().borrow().transacting().is_empty());
    }
}
