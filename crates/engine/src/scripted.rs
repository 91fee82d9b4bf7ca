//! In-memory package engine driven by a declarative script
//!
//! [`ScriptedEngine`] keeps a real [`Pool`](crate::Pool) and walks the
//! transaction the way a package engine does, pushing the same lifecycle
//! reports. Failures are
//! scripted up front: a download that fails `n` times, an install that only
//! gets through at the forced level, a medium that must be changed, and so
//! on. Each scripted failure is consumed by one attempt, so retry loops
//! always terminate.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use pkgbridge_errors::EngineError;
use pkgbridge_types::{Authority, ItemId, RepoId, ResStatus, ResolvableItem, ResolvableKind};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    AuxStart, BaseProduct, CommitPolicy, DbFinish, DbProgress, DbStart, DigestQuery,
    DownloadFinish, EngineCommitResult, FileDownload, InstallFinish, InstallProblem, ItemFinish,
    ItemProblem, ItemStart, KeyQuery, MediaAction, MediaRequest, PackageEngine, PatchMessage,
    ProbeProgress, ProblemAction, ProvideStart, RepoFinish, RepoProblem, RepoTask,
    ReportCategory, ReportError, ReportHub, Repository, ResolverOutcome, RpmLevel, ScriptOutput,
    ScriptStart, SharedPool, SolverFlags, SolverProblem, SourceFinish, SourceProblem,
    TransferProgress,
};

const PACKAGE_CACHE: &str = "/var/cache/pkgbridge/packages";
const RPM_DB: &str = "/var/lib/rpm";
const UPDATE_SCRIPTS: &str = "/var/adm/update-scripts";

/// Source types tried, in order, when probing a new source
const PROBED_TYPES: &[&str] = &["yast2", "rpm-md", "plaindir"];

/// Fate of one item in a commit
enum Step {
    Committed,
    Failed,
    /// Not attempted because its medium was skipped
    Skipped,
}

#[derive(Debug, Default)]
pub struct ScriptedEngine {
    pool: SharedPool,
    repositories: Vec<Repository>,
    flags: SolverFlags,
    requirements: HashMap<String, Vec<String>>,
    scripted_problems: Vec<SolverProblem>,
    problems: Vec<SolverProblem>,
    resolve_error: Option<EngineError>,
    commit_error: Option<EngineError>,
    download_failures: HashMap<String, usize>,
    install_failures: HashMap<String, usize>,
    remove_failures: HashMap<String, usize>,
    media_failures: HashMap<(RepoId, u32), usize>,
    media_urls: HashMap<(RepoId, u32), Url>,
    refresh_failures: HashMap<String, usize>,
    unsigned: HashSet<String>,
    without_digest: HashSet<String>,
    delta_rpms: HashSet<String>,
    base_product: Option<BaseProduct>,
    released: usize,
    db_rebuilds: usize,
}

impl ScriptedEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_repository(mut self, repository: Repository) -> Self {
        self.repositories.push(repository);
        self
    }

    #[must_use]
    pub fn with_base_product(mut self, product: BaseProduct) -> Self {
        self.base_product = Some(product);
        self
    }

    /// Add an item to the pool.
    pub fn insert(&mut self, item: ResolvableItem) -> ItemId {
        self.pool.borrow_mut().insert(item)
    }

    /// Installing `name` makes the solver select each of `requires`.
    pub fn require(&mut self, name: impl Into<String>, requires: &[&str]) {
        self.requirements
            .entry(name.into())
            .or_default()
            .extend(requires.iter().map(ToString::to_string));
    }

    /// Problems every later solver run reports in addition to its own.
    pub fn add_solver_problem(&mut self, problem: SolverProblem) {
        self.scripted_problems.push(problem);
    }

    pub fn fail_resolve(&mut self, error: EngineError) {
        self.resolve_error = Some(error);
    }

    pub fn fail_commit(&mut self, error: EngineError) {
        self.commit_error = Some(error);
    }

    /// The next `times` downloads of package `name` fail.
    pub fn fail_download(&mut self, name: impl Into<String>, times: usize) {
        self.download_failures.insert(name.into(), times);
    }

    /// Installing `name` fails at the lower rpm levels and `times` more
    /// times at the forced level.
    pub fn fail_install(&mut self, name: impl Into<String>, times: usize) {
        self.install_failures.insert(name.into(), times);
    }

    pub fn fail_remove(&mut self, name: impl Into<String>, times: usize) {
        self.remove_failures.insert(name.into(), times);
    }

    /// Medium `medium` of `repo` is reported missing `times` times.
    pub fn require_media_change(&mut self, repo: RepoId, medium: u32, times: usize) {
        self.media_failures.insert((repo, medium), times);
    }

    pub fn fail_refresh(&mut self, alias: impl Into<String>, times: usize) {
        self.refresh_failures.insert(alias.into(), times);
    }

    /// The package file of `name` carries no signature.
    pub fn unsigned_package(&mut self, name: impl Into<String>) {
        self.unsigned.insert(name.into());
    }

    /// The repository metadata lists no checksum for `name`.
    pub fn package_without_digest(&mut self, name: impl Into<String>) {
        self.without_digest.insert(name.into());
    }

    /// `name` is fetched as a delta rpm and rebuilt locally.
    pub fn delta_package(&mut self, name: impl Into<String>) {
        self.delta_rpms.insert(name.into());
    }

    /// URL a medium is currently read from, after any redirect.
    #[must_use]
    pub fn media_url(&self, repo: RepoId, medium: u32) -> Option<Url> {
        if let Some(url) = self.media_urls.get(&(repo, medium)) {
            return Some(url.clone());
        }
        self.repository(repo)?.primary_url().cloned()
    }

    /// How often [`release_all_sources`](PackageEngine::release_all_sources)
    /// was called.
    #[must_use]
    pub fn released(&self) -> usize {
        self.released
    }

    #[must_use]
    pub fn database_rebuilds(&self) -> usize {
        self.db_rebuilds
    }

    fn repository(&self, id: RepoId) -> Option<&Repository> {
        self.repositories.iter().find(|repo| repo.id == id)
    }

    /// Probe `url`, then create a repository of type `kind` from it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Aborted`] when a handler aborts, or a fault if
    /// `kind` is not a known source type.
    pub fn add_source(
        &mut self,
        alias: &str,
        url: Url,
        kind: &str,
        reports: &mut dyn ReportHub,
    ) -> Result<RepoId, EngineError> {
        probe_source(&url, kind, reports)?;

        let create = reports.source_create();
        create.report_begin();
        create.start(url.clone());
        for value in [0, 50, 100] {
            if !create.progress(value) {
                create.finish(SourceFinish {
                    url: url.clone(),
                    error: ReportError::Rejected,
                    reason: "cancelled".to_string(),
                });
                create.report_end();
                return Err(aborted("source creation cancelled"));
            }
        }
        create.finish(SourceFinish {
            url: url.clone(),
            error: ReportError::NoError,
            reason: String::new(),
        });
        create.report_end();

        let id = self
            .repositories
            .iter()
            .map(|repo| repo.id.0)
            .max()
            .unwrap_or(0)
            + 1;
        self.repositories.push(Repository::new(id, alias, url));
        info!(alias, id, "added source");
        Ok(RepoId(id))
    }

    /// Refresh the metadata of the repository `alias`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RepositoryNotFound`] for an unknown alias and
    /// [`EngineError::Aborted`] when a handler aborts.
    pub fn refresh_repository(
        &mut self,
        alias: &str,
        reports: &mut dyn ReportHub,
    ) -> Result<bool, EngineError> {
        let repo = self
            .repositories
            .iter()
            .find(|repo| repo.alias == alias)
            .cloned()
            .ok_or_else(|| EngineError::RepositoryNotFound {
                alias: alias.to_string(),
            })?;
        let url = repo.primary_url().cloned();
        let task = format!("Refreshing {}", repo.name);

        let refresh = reports.source_refresh();
        refresh.report_begin();
        refresh.start(RepoTask {
            repo: Some(repo.id),
            url: url.clone(),
            task: task.clone(),
        });

        let mut outcome = Ok(true);
        loop {
            let failing = self.refresh_failures.get_mut(alias).filter(|left| **left > 0);
            let Some(left) = failing else {
                refresh.progress(100);
                break;
            };
            *left -= 1;
            let action = refresh.problem(RepoProblem {
                repo: Some(repo.id),
                url: url.clone(),
                error: ReportError::Io,
                description: format!("download of repomd.xml from {alias} failed"),
            });
            match action {
                ProblemAction::Retry => {}
                ProblemAction::Ignore => {
                    outcome = Ok(false);
                    break;
                }
                ProblemAction::Abort => {
                    outcome = Err(aborted("refresh aborted"));
                    break;
                }
            }
        }

        let (error, reason) = match &outcome {
            Ok(true) => (ReportError::NoError, String::new()),
            Ok(false) => (ReportError::Io, "refresh failed".to_string()),
            Err(err) => (ReportError::Rejected, err.to_string()),
        };
        refresh.finish(RepoFinish {
            repo: Some(repo.id),
            url,
            task,
            error,
            reason,
        });
        refresh.report_end();
        outcome
    }

    /// Rebuild the rpm database, reporting through the rebuild stream.
    pub fn rebuild_database(&mut self, reports: &mut dyn ReportHub) {
        self.db_rebuilds += 1;
        let Some(rebuild) = reports.rpm_db(ReportCategory::RebuildDb) else {
            return;
        };
        let path = Some(PathBuf::from(RPM_DB));
        rebuild.start(DbStart { path: path.clone() });
        for value in [0, 25, 50, 75, 100] {
            rebuild.progress(DbProgress {
                value,
                path: path.clone(),
            });
        }
        rebuild.finish(DbFinish {
            error: ReportError::NoError,
            reason: String::new(),
        });
    }

    fn solve(&mut self) -> Vec<SolverProblem> {
        let mut problems = Vec::new();
        let mut pool = self.pool.borrow_mut();

        let requested: Vec<String> = pool
            .items()
            .filter(|item| item.to_install())
            .map(|item| item.resolvable.name.clone())
            .collect();

        for name in requested {
            let Some(requires) = self.requirements.get(&name) else {
                continue;
            };
            for required in requires {
                if pool.installed(ResolvableKind::Package, required).is_some() {
                    continue;
                }
                let Some(candidate) = pool.candidate(ResolvableKind::Package, required) else {
                    problems.push(SolverProblem::new(format!(
                        "nothing provides {required} needed by {name}"
                    )));
                    continue;
                };
                let Some(status) = pool.status_mut(candidate) else {
                    continue;
                };
                // Soft locks only keep recommendations out.
                if !status.set_transact(true, Authority::Solver) {
                    let mut problem =
                        SolverProblem::new(format!("{required} is locked but needed by {name}"));
                    problem.details = "remove the lock or do not install the requiring item"
                        .to_string();
                    problems.push(problem);
                }
            }
        }

        problems.extend(self.scripted_problems.iter().cloned());
        problems
    }

    fn item_url(&self, item: &ResolvableItem) -> Option<Url> {
        let base = self.media_url(item.repo?, item.medium)?;
        if item.location.is_empty() {
            return Some(base);
        }
        base.join(&item.location).ok().or(Some(base))
    }

    fn ensure_medium(
        &mut self,
        item: &ResolvableItem,
        reports: &mut dyn ReportHub,
    ) -> Result<bool, EngineError> {
        let Some(repo) = item.repo else {
            return Ok(true);
        };
        let key = (repo, item.medium);
        let label = self
            .repository(repo)
            .map(|repo| repo.alias.clone())
            .unwrap_or_default();

        while self.media_failures.get(&key).is_some_and(|left| *left > 0) {
            let Some(url) = self.media_url(repo, item.medium) else {
                return Err(EngineError::RepositoryNotFound {
                    alias: repo.to_string(),
                });
            };
            let action = reports.media().problem(MediaRequest {
                url,
                medium: item.medium,
                label: label.clone(),
                error: ReportError::NotFound,
                description: format!("medium {} of {label} not found", item.medium),
                devices: Vec::new(),
                current_device: None,
            });
            debug!(repo = %repo, medium = item.medium, ?action, "media change answered");

            match action {
                MediaAction::Retry | MediaAction::Eject { .. } => {
                    if let Some(left) = self.media_failures.get_mut(&key) {
                        *left -= 1;
                    }
                }
                MediaAction::IgnoreId => {
                    self.media_failures.remove(&key);
                }
                MediaAction::ChangeUrl(url) => {
                    self.media_failures.remove(&key);
                    self.media_urls.insert(key, url);
                }
                MediaAction::Skip => return Ok(false),
                MediaAction::Abort => return Err(aborted("media change aborted")),
            }
        }
        Ok(true)
    }

    fn fetch(
        &mut self,
        id: ItemId,
        item: &ResolvableItem,
        reports: &mut dyn ReportHub,
    ) -> Result<bool, EngineError> {
        let Some(url) = self.item_url(item) else {
            warn!(item = %item.name, "item has no repository to fetch from");
            return Ok(false);
        };
        let local_file = PathBuf::from(PACKAGE_CACHE).join(item.location_filename());

        reports.provide().start(ProvideStart {
            id,
            item: item.clone(),
            url: url.clone(),
        });

        loop {
            reports.download().start(FileDownload {
                url: url.clone(),
                local_file: local_file.clone(),
            });

            let failing = self
                .download_failures
                .get_mut(&item.name)
                .filter(|left| **left > 0);
            let error = if let Some(left) = failing {
                *left -= 1;
                Some((ReportError::Io, format!("download of {url} failed")))
            } else {
                transfer(&url, reports)
            };

            let Some((error, description)) = error else {
                reports.download().finish(DownloadFinish {
                    url: url.clone(),
                    error: ReportError::NoError,
                    reason: String::new(),
                });
                break;
            };
            reports.download().finish(DownloadFinish {
                url: url.clone(),
                error,
                reason: description.clone(),
            });

            let action = reports.provide().problem(ItemProblem {
                id,
                item: item.clone(),
                error,
                description: description.clone(),
            });
            match action {
                ProblemAction::Retry => {}
                ProblemAction::Abort => {
                    finish_provide(reports, id, item, error, &description);
                    return Err(aborted("download aborted"));
                }
                ProblemAction::Ignore => {
                    finish_provide(reports, id, item, error, &description);
                    return Ok(false);
                }
            }
        }

        if !self.verify(item, reports) {
            finish_provide(
                reports,
                id,
                item,
                ReportError::Rejected,
                "file verification rejected",
            );
            return Ok(false);
        }

        if self.delta_rpms.contains(&item.name) {
            rebuild_from_delta(item, reports);
        }

        finish_provide(reports, id, item, ReportError::NoError, "");
        Ok(true)
    }

    fn verify(&self, item: &ResolvableItem, reports: &mut dyn ReportHub) -> bool {
        let file = item.location_filename().to_string();
        if self.without_digest.contains(&item.name)
            && !reports
                .digest()
                .problem(DigestQuery::NoDigest { file: file.clone() })
        {
            return false;
        }
        if self.unsigned.contains(&item.name) {
            let trust = reports.key_ring().problem(KeyQuery::UnsignedFile {
                file,
                repo: item.repo,
            });
            return trust.is_accepted();
        }
        true
    }

    fn install(
        &mut self,
        id: ItemId,
        item: &ResolvableItem,
        reports: &mut dyn ReportHub,
    ) -> Result<Step, EngineError> {
        if !self.ensure_medium(item, reports)? {
            return Ok(Step::Skipped);
        }
        if !self.fetch(id, item, reports)? {
            return Ok(Step::Failed);
        }

        let scripted = self.install_failures.contains_key(&item.name);
        for level in [RpmLevel::Default, RpmLevel::NoDeps, RpmLevel::NoDepsForce] {
            loop {
                let install = reports.install();
                install.start(ItemStart {
                    id,
                    item: item.clone(),
                });
                for value in [0, 50, 100] {
                    install.progress(value);
                }

                let fails = scripted
                    && (level != RpmLevel::NoDepsForce
                        || self
                            .install_failures
                            .get(&item.name)
                            .is_some_and(|left| *left > 0));
                if !fails {
                    reports.install().finish(InstallFinish {
                        id,
                        item: item.clone(),
                        error: ReportError::NoError,
                        reason: String::new(),
                        level,
                    });
                    return Ok(Step::Committed);
                }

                let description = format!("rpm failed to install {}", item.name);
                let action = reports.install().problem(InstallProblem {
                    id,
                    item: item.clone(),
                    error: ReportError::Io,
                    description: description.clone(),
                    level,
                });
                let finish = InstallFinish {
                    id,
                    item: item.clone(),
                    error: ReportError::Io,
                    reason: description,
                    level,
                };

                // Lower levels always move on to the next one.
                if level != RpmLevel::NoDepsForce {
                    reports.install().finish(finish);
                    break;
                }
                if let Some(left) = self.install_failures.get_mut(&item.name) {
                    *left -= 1;
                }
                match action {
                    ProblemAction::Retry => {}
                    ProblemAction::Abort => {
                        reports.install().finish(finish);
                        return Err(aborted("installation aborted"));
                    }
                    ProblemAction::Ignore => {
                        reports.install().finish(finish);
                        return Ok(Step::Failed);
                    }
                }
            }
        }
        Ok(Step::Failed)
    }

    fn remove(
        &mut self,
        id: ItemId,
        item: &ResolvableItem,
        reports: &mut dyn ReportHub,
    ) -> Result<Step, EngineError> {
        loop {
            let remove = reports.remove();
            remove.start(ItemStart {
                id,
                item: item.clone(),
            });
            for value in [0, 50, 100] {
                remove.progress(value);
            }

            let failing = self
                .remove_failures
                .get_mut(&item.name)
                .filter(|left| **left > 0);
            let Some(left) = failing else {
                reports.remove().finish(ItemFinish {
                    id,
                    item: item.clone(),
                    error: ReportError::NoError,
                    reason: String::new(),
                });
                return Ok(Step::Committed);
            };
            *left -= 1;

            let description = format!("rpm failed to remove {}", item.name);
            let action = reports.remove().problem(ItemProblem {
                id,
                item: item.clone(),
                error: ReportError::Io,
                description: description.clone(),
            });
            match action {
                ProblemAction::Retry => {}
                ProblemAction::Abort => return Err(aborted("removal aborted")),
                ProblemAction::Ignore => {
                    reports.remove().finish(ItemFinish {
                        id,
                        item: item.clone(),
                        error: ReportError::Io,
                        reason: description,
                    });
                    return Ok(Step::Failed);
                }
            }
        }
    }

    fn apply_patch(item: &ResolvableItem, reports: &mut dyn ReportHub) -> Step {
        if !item.summary.is_empty() {
            reports.message().problem(PatchMessage {
                item: item.clone(),
                text: item.summary.clone(),
            });
        }

        let path = PathBuf::from(UPDATE_SCRIPTS).join(format!("{}-{}", item.name, item.edition));
        let script = reports.script();
        script.start(ScriptStart {
            item: item.clone(),
            path,
        });
        script.progress(ScriptOutput {
            ping: true,
            output: String::new(),
        });
        script.finish(());
        Step::Committed
    }

    fn record(&self, id: ItemId, step: &Step) {
        let mut pool = self.pool.borrow_mut();
        if let (Step::Committed, Some(item)) = (step, pool.get_mut(id)) {
            item.resolvable.installed = !item.resolvable.installed;
            item.status = ResStatus::default();
        }
    }
}

impl PackageEngine for ScriptedEngine {
    fn pool(&self) -> SharedPool {
        self.pool.clone()
    }

    fn repositories(&self) -> Vec<Repository> {
        self.repositories.clone()
    }

    fn solver_flags(&self) -> SolverFlags {
        self.flags
    }

    fn set_solver_flags(&mut self, flags: SolverFlags) {
        self.flags = flags;
    }

    fn resolve(&mut self) -> Result<ResolverOutcome, EngineError> {
        if let Some(error) = &self.resolve_error {
            return Err(error.clone());
        }
        self.problems = self.solve();
        debug!(problems = self.problems.len(), "solver finished");
        if self.problems.is_empty() {
            Ok(ResolverOutcome::Solved)
        } else {
            Ok(ResolverOutcome::Problems(self.problems.clone()))
        }
    }

    fn problems(&self) -> Vec<SolverProblem> {
        self.problems.clone()
    }

    fn commit(
        &mut self,
        policy: &CommitPolicy,
        reports: &mut dyn ReportHub,
    ) -> Result<EngineCommitResult, EngineError> {
        if let Some(error) = &self.commit_error {
            return Err(error.clone());
        }

        let mut result = EngineCommitResult::default();
        let mut skipped_media = HashSet::new();
        let transaction = self.pool.borrow().transacting();

        for id in transaction {
            // Handlers may have changed the selection since the walk started.
            let snapshot = self.pool.borrow().get(id).cloned();
            let Some(entry) = snapshot.filter(|entry| entry.status.transacts()) else {
                continue;
            };
            let item = entry.resolvable;

            let step = if item.installed {
                self.remove(id, &item, reports)?
            } else {
                match item.kind {
                    ResolvableKind::Package | ResolvableKind::SrcPackage => {
                        let restricted = policy.restrict_to_media != 0
                            && item.medium != policy.restrict_to_media;
                        let key = item.repo.map(|repo| (repo, item.medium));
                        if restricted || key.is_some_and(|key| skipped_media.contains(&key)) {
                            Step::Skipped
                        } else {
                            let step = self.install(id, &item, reports)?;
                            if let (Step::Skipped, Some(key)) = (&step, key) {
                                skipped_media.insert(key);
                            }
                            step
                        }
                    }
                    ResolvableKind::Patch => Self::apply_patch(&item, reports),
                    _ => Step::Committed,
                }
            };

            match step {
                Step::Committed => result.committed += 1,
                Step::Failed => result.failed.push(id),
                Step::Skipped if item.kind == ResolvableKind::SrcPackage => {
                    result.src_remaining.push(id);
                }
                Step::Skipped => result.remaining.push(id),
            }
            self.record(id, &step);
        }

        info!(
            committed = result.committed,
            failed = result.failed.len(),
            remaining = result.remaining.len(),
            "commit finished"
        );
        Ok(result)
    }

    fn release_all_sources(&mut self) {
        self.released += 1;
        debug!("released all sources");
    }

    fn base_product(&self) -> Option<BaseProduct> {
        self.base_product.clone()
    }
}

fn aborted(reason: &str) -> EngineError {
    EngineError::Aborted {
        reason: reason.to_string(),
    }
}

fn finish_provide(
    reports: &mut dyn ReportHub,
    id: ItemId,
    item: &ResolvableItem,
    error: ReportError,
    reason: &str,
) {
    reports.provide().finish(ItemFinish {
        id,
        item: item.clone(),
        error,
        reason: reason.to_string(),
    });
}

/// Probe `url` for a known source type. A RETRY answer probes again.
fn probe_source(url: &Url, kind: &str, reports: &mut dyn ReportHub) -> Result<(), EngineError> {
    let probe = reports.source_probe();
    loop {
        probe.start(url.clone());
        probe.progress(ProbeProgress::Percent {
            url: url.clone(),
            value: 0,
        });

        for candidate in PROBED_TYPES {
            if *candidate == kind {
                probe.progress(ProbeProgress::Succeeded {
                    url: url.clone(),
                    kind: kind.to_string(),
                });
                probe.finish(SourceFinish {
                    url: url.clone(),
                    error: ReportError::NoError,
                    reason: String::new(),
                });
                return Ok(());
            }
            probe.progress(ProbeProgress::Failed {
                url: url.clone(),
                kind: (*candidate).to_string(),
            });
        }

        let description = format!("no known source type at {url}");
        let action = probe.problem(SourceProblem {
            url: url.clone(),
            error: ReportError::Invalid,
            description: description.clone(),
        });
        probe.finish(SourceFinish {
            url: url.clone(),
            error: ReportError::Invalid,
            reason: description.clone(),
        });
        match action {
            ProblemAction::Retry => debug!(url = %url, "probing source again"),
            ProblemAction::Abort => return Err(aborted("source probing aborted")),
            ProblemAction::Ignore => return Err(EngineError::fault(description)),
        }
    }
}

/// Progress of one transfer; a cancelled transfer yields its error.
fn transfer(url: &Url, reports: &mut dyn ReportHub) -> Option<(ReportError, String)> {
    for value in (0..=100).step_by(10) {
        let proceed = reports.download().progress(TransferProgress {
            url: url.clone(),
            value,
            bps_avg: 1_048_576.0,
            bps_current: 1_048_576.0,
        });
        if !proceed {
            return Some((ReportError::Io, "download cancelled".to_string()));
        }
        reports.provide().progress(value);
    }
    None
}

fn rebuild_from_delta(item: &ResolvableItem, reports: &mut dyn ReportHub) {
    let file = format!("{}.delta.rpm", item.name);
    for category in [ReportCategory::DeltaDownload, ReportCategory::DeltaApply] {
        if let Some(stream) = reports.aux_download(category) {
            stream.start(AuxStart {
                file: file.clone(),
                size: Some(item.download_size / 4),
            });
            for value in [0, 50, 100] {
                stream.progress(value);
            }
            stream.finish(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgbridge_types::Authority;

    fn engine() -> ScriptedEngine {
        let url = Url::parse("http://example.com/repo/").unwrap();
        let mut engine = ScriptedEngine::new().with_repository(Repository::new(1, "main", url));
        engine.insert(
            ResolvableItem::new(ResolvableKind::Package, "vim", "9.1-1").from_repo(RepoId(1), 1),
        );
        engine.insert(
            ResolvableItem::new(ResolvableKind::Package, "vim-data", "9.1-1")
                .from_repo(RepoId(1), 1),
        );
        engine
    }

    #[test]
    fn resolve_selects_requirements_at_solver_authority() {
        let mut engine = engine();
        engine.require("vim", &["vim-data"]);
        let pool = engine.pool();
        let vim = pool.borrow().candidate(ResolvableKind::Package, "vim").unwrap();
        pool.borrow_mut()
            .status_mut(vim)
            .unwrap()
            .set_transact(true, Authority::User);

        assert_eq!(engine.resolve().unwrap(), ResolverOutcome::Solved);

        let data = pool
            .borrow()
            .candidate(ResolvableKind::Package, "vim-data")
            .unwrap();
        let status = pool.borrow().get(data).unwrap().status;
        assert!(status.transacts());
        assert_eq!(status.authority(), Authority::Solver);
    }

    #[test]
    fn tabooed_requirement_is_a_problem() {
        let mut engine = engine();
        engine.require("vim", &["vim-data"]);
        let pool = engine.pool();
        let vim = pool.borrow().candidate(ResolvableKind::Package, "vim").unwrap();
        let data = pool
            .borrow()
            .candidate(ResolvableKind::Package, "vim-data")
            .unwrap();
        pool.borrow_mut()
            .status_mut(vim)
            .unwrap()
            .set_transact(true, Authority::User);
        pool.borrow_mut().status_mut(data).unwrap().set_taboo();

        let ResolverOutcome::Problems(problems) = engine.resolve().unwrap() else {
            panic!("expected solver problems");
        };
        assert_eq!(problems.len(), 1);
        assert!(problems[0].description.contains("vim-data"));
        assert_eq!(engine.problems(), problems);
    }

    #[test]
    fn scripted_resolve_error_is_returned() {
        let mut engine = engine();
        engine.fail_resolve(EngineError::fault("solver crashed"));
        assert!(matches!(engine.resolve(), Err(EngineError::Fault { .. })));
    }

    #[test]
    fn media_url_follows_redirects() {
        let mut engine = engine();
        let redirected = Url::parse("nfs://mirror/repo/").unwrap();
        assert_eq!(
            engine.media_url(RepoId(1), 1).unwrap().as_str(),
            "http://example.com/repo/"
        );
        engine.media_urls.insert((RepoId(1), 1), redirected.clone());
        assert_eq!(engine.media_url(RepoId(1), 1), Some(redirected));
        assert_eq!(engine.media_url(RepoId(7), 1), None);
    }

    #[test]
    fn item_url_joins_location() {
        let engine = engine();
        let mut item =
            ResolvableItem::new(ResolvableKind::Package, "vim", "9.1-1").from_repo(RepoId(1), 1);
        item.location = "x86_64/vim-9.1-1.x86_64.rpm".to_string();
        assert_eq!(
            engine.item_url(&item).unwrap().as_str(),
            "http://example.com/repo/x86_64/vim-9.1-1.x86_64.rpm"
        );
    }
}
