//! Integration tests for the engine crate

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::marker::PhantomData;
    use std::rc::Rc;

    use pkgbridge_engine::*;
    use pkgbridge_errors::EngineError;
    use pkgbridge_types::{
        Authority, ItemId, PatchCategory, PatchInfo, RepoId, ResolvableItem, ResolvableKind,
    };
    use url::Url;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Receiver that logs every phase and answers problems from a queue
    struct Recorder<S, P, Q, A, F> {
        name: &'static str,
        log: Log,
        answers: VecDeque<A>,
        default: A,
        _payloads: PhantomData<fn(S, P, Q, F)>,
    }

    impl<S, P, Q, A, F> Recorder<S, P, Q, A, F> {
        fn new(name: &'static str, log: &Log, default: A) -> Self {
            Self {
                name,
                log: log.clone(),
                answers: VecDeque::new(),
                default,
                _payloads: PhantomData,
            }
        }

        fn push(&self, phase: &str) {
            self.log.borrow_mut().push(format!("{}:{phase}", self.name));
        }
    }

    impl<S, P, Q, A: Clone, F> EventReceiver for Recorder<S, P, Q, A, F> {
        type Start = S;
        type Progress = P;
        type Problem = Q;
        type Action = A;
        type Finish = F;

        fn report_begin(&mut self) {
            self.push("begin");
        }

        fn report_end(&mut self) {
            self.push("end");
        }

        fn start(&mut self, _event: S) {
            self.push("start");
        }

        fn problem(&mut self, _event: Q) -> A {
            self.push("problem");
            self.answers.pop_front().unwrap_or_else(|| self.default.clone())
        }

        fn finish(&mut self, _event: F) {
            self.push("finish");
        }
    }

    struct Hub {
        download:
            Recorder<FileDownload, TransferProgress, DownloadProblem, ProblemAction, DownloadFinish>,
        provide: Recorder<ProvideStart, i64, ItemProblem, ProblemAction, ItemFinish>,
        delta: Recorder<AuxStart, i64, String, (), ()>,
        delta_apply: Recorder<AuxStart, i64, String, (), ()>,
        install: Recorder<ItemStart, i64, InstallProblem, ProblemAction, InstallFinish>,
        remove: Recorder<ItemStart, i64, ItemProblem, ProblemAction, ItemFinish>,
        media: Recorder<(), (), MediaRequest, MediaAction, ()>,
        create: Recorder<Url, i64, SourceProblem, ProblemAction, SourceFinish>,
        probe: Recorder<Url, ProbeProgress, SourceProblem, ProblemAction, SourceFinish>,
        refresh: Recorder<RepoTask, i64, RepoProblem, ProblemAction, RepoFinish>,
        digest: Recorder<(), (), DigestQuery, bool, ()>,
        keys: Recorder<(), (), KeyQuery, KeyTrust, ()>,
        signals: Recorder<(), (), KeySignal, (), ()>,
        script: Recorder<ScriptStart, ScriptOutput, String, ProblemAction, ()>,
        message: Recorder<(), (), PatchMessage, bool, ()>,
        rebuild: Recorder<DbStart, DbProgress, String, ProblemAction, DbFinish>,
        log: Log,
    }

    impl Hub {
        fn new() -> Self {
            let log: Log = Rc::default();
            Self {
                download: Recorder::new("download", &log, ProblemAction::Abort),
                provide: Recorder::new("provide", &log, ProblemAction::Abort),
                delta: Recorder::new("delta", &log, ()),
                delta_apply: Recorder::new("delta_apply", &log, ()),
                install: Recorder::new("install", &log, ProblemAction::Abort),
                remove: Recorder::new("remove", &log, ProblemAction::Abort),
                media: Recorder::new("media", &log, MediaAction::Abort),
                create: Recorder::new("create", &log, ProblemAction::Abort),
                probe: Recorder::new("probe", &log, ProblemAction::Abort),
                refresh: Recorder::new("refresh", &log, ProblemAction::Abort),
                digest: Recorder::new("digest", &log, false),
                keys: Recorder::new("keys", &log, KeyTrust::Reject),
                signals: Recorder::new("signals", &log, ()),
                script: Recorder::new("script", &log, ProblemAction::Abort),
                message: Recorder::new("message", &log, true),
                rebuild: Recorder::new("rebuild", &log, ProblemAction::Abort),
                log,
            }
        }

        fn entries(&self) -> Vec<String> {
            self.log.borrow().clone()
        }

        fn count(&self, entry: &str) -> usize {
            self.log.borrow().iter().filter(|e| *e == entry).count()
        }
    }

    impl ReportHub for Hub {
        fn download(&mut self) -> &mut DownloadReceiver {
            &mut self.download
        }
        fn provide(&mut self) -> &mut ProvideReceiver {
            &mut self.provide
        }
        fn aux_download(&mut self, category: ReportCategory) -> Option<&mut AuxDownloadReceiver> {
            match category {
                ReportCategory::DeltaDownload => Some(&mut self.delta),
                ReportCategory::DeltaApply => Some(&mut self.delta_apply),
                _ => None,
            }
        }
        fn install(&mut self) -> &mut InstallReceiver {
            &mut self.install
        }
        fn remove(&mut self) -> &mut RemoveReceiver {
            &mut self.remove
        }
        fn media(&mut self) -> &mut MediaReceiver {
            &mut self.media
        }
        fn source_create(&mut self) -> &mut SourceCreateReceiver {
            &mut self.create
        }
        fn source_probe(&mut self) -> &mut SourceProbeReceiver {
            &mut self.probe
        }
        fn source_refresh(&mut self) -> &mut SourceRefreshReceiver {
            &mut self.refresh
        }
        fn digest(&mut self) -> &mut DigestReceiver {
            &mut self.digest
        }
        fn key_ring(&mut self) -> &mut KeyRingReceiver {
            &mut self.keys
        }
        fn key_signal(&mut self) -> &mut KeySignalReceiver {
            &mut self.signals
        }
        fn script(&mut self) -> &mut ScriptReceiver {
            &mut self.script
        }
        fn message(&mut self) -> &mut MessageReceiver {
            &mut self.message
        }
        fn rpm_db(&mut self, category: ReportCategory) -> Option<&mut RpmDbReceiver> {
            match category {
                ReportCategory::RebuildDb => Some(&mut self.rebuild),
                _ => None,
            }
        }
    }

    fn repo_url() -> Url {
        Url::parse("http://download.example.com/distribution/").unwrap()
    }

    fn package(name: &str, medium: u32) -> ResolvableItem {
        let mut item = ResolvableItem::new(ResolvableKind::Package, name, "1.0-1")
            .with_arch("x86_64")
            .from_repo(RepoId(1), medium);
        item.location = format!("x86_64/{name}-1.0-1.x86_64.rpm");
        item
    }

    fn engine_with(names: &[(&str, u32)]) -> (ScriptedEngine, Vec<ItemId>) {
        let mut engine =
            ScriptedEngine::new().with_repository(Repository::new(1, "dist", repo_url()));
        let ids = names
            .iter()
            .map(|(name, medium)| engine.insert(package(name, *medium)))
            .collect();
        (engine, ids)
    }

    fn select(engine: &ScriptedEngine, id: ItemId) {
        let pool = engine.pool();
        let mut pool = pool.borrow_mut();
        assert!(pool.status_mut(id).unwrap().set_transact(true, Authority::User));
    }

    #[test]
    fn commit_installs_selected_packages_in_pool_order() {
        let (mut engine, ids) = engine_with(&[("bash", 1), ("zsh", 1), ("fish", 1)]);
        select(&engine, ids[0]);
        select(&engine, ids[2]);
        let mut hub = Hub::new();

        let result = engine.commit(&CommitPolicy::default(), &mut hub).unwrap();

        assert_eq!(result.committed, 2);
        assert!(result.failed.is_empty());
        assert!(result.remaining.is_empty());
        assert_eq!(hub.count("provide:start"), 2);
        assert_eq!(hub.count("install:start"), 2);
        assert_eq!(hub.count("install:finish"), 2);

        let pool = engine.pool();
        let pool = pool.borrow();
        assert!(pool.get(ids[0]).unwrap().resolvable.installed);
        assert!(!pool.get(ids[1]).unwrap().resolvable.installed);
        assert!(pool.transacting().is_empty());
    }

    #[test]
    fn media_restriction_leaves_other_media_remaining() {
        let (mut engine, ids) = engine_with(&[("bash", 1), ("zsh", 2)]);
        select(&engine, ids[0]);
        select(&engine, ids[1]);
        let mut hub = Hub::new();

        let policy = CommitPolicy {
            restrict_to_media: 1,
        };
        let result = engine.commit(&policy, &mut hub).unwrap();

        assert_eq!(result.committed, 1);
        assert_eq!(result.remaining, vec![ids[1]]);
        assert!(engine.pool().borrow().get(ids[1]).unwrap().status.transacts());
    }

    #[test]
    fn download_retried_until_handler_aborts() {
        let (mut engine, ids) = engine_with(&[("bash", 1)]);
        select(&engine, ids[0]);
        engine.fail_download("bash", 10);
        let mut hub = Hub::new();
        hub.provide.answers = VecDeque::from([
            ProblemAction::Retry,
            ProblemAction::Retry,
            ProblemAction::Retry,
            ProblemAction::Abort,
        ]);

        let err = engine
            .commit(&CommitPolicy::default(), &mut hub)
            .unwrap_err();

        assert!(err.is_abort());
        assert_eq!(hub.count("provide:problem"), 4);
        assert_eq!(hub.count("download:start"), 4);
        assert_eq!(hub.count("install:start"), 0);
    }

    #[test]
    fn ignored_download_failure_marks_item_failed() {
        let (mut engine, ids) = engine_with(&[("bash", 1), ("zsh", 1)]);
        select(&engine, ids[0]);
        select(&engine, ids[1]);
        engine.fail_download("bash", 1);
        let mut hub = Hub::new();
        hub.provide.answers = VecDeque::from([ProblemAction::Ignore]);

        let result = engine.commit(&CommitPolicy::default(), &mut hub).unwrap();

        assert_eq!(result.failed, vec![ids[0]]);
        assert_eq!(result.committed, 1);
    }

    #[test]
    fn install_escalates_to_forced_level() {
        let (mut engine, ids) = engine_with(&[("bash", 1)]);
        select(&engine, ids[0]);
        engine.fail_install("bash", 1);
        let mut hub = Hub::new();
        // default level, nodeps level, then the forced attempt
        hub.install.answers = VecDeque::from([
            ProblemAction::Abort,
            ProblemAction::Abort,
            ProblemAction::Retry,
        ]);

        let result = engine.commit(&CommitPolicy::default(), &mut hub).unwrap();

        assert_eq!(result.committed, 1);
        assert_eq!(hub.count("install:problem"), 3);
        assert_eq!(hub.count("install:start"), 4);
    }

    #[test]
    fn ignored_forced_install_failure_is_reported_failed() {
        let (mut engine, ids) = engine_with(&[("bash", 1)]);
        select(&engine, ids[0]);
        engine.fail_install("bash", 5);
        let mut hub = Hub::new();
        hub.install.answers = VecDeque::from([
            ProblemAction::Abort,
            ProblemAction::Abort,
            ProblemAction::Ignore,
        ]);

        let result = engine.commit(&CommitPolicy::default(), &mut hub).unwrap();

        assert_eq!(result.failed, vec![ids[0]]);
        assert!(!engine.pool().borrow().get(ids[0]).unwrap().resolvable.installed);
    }

    #[test]
    fn skipped_medium_skips_every_item_on_it() {
        let (mut engine, ids) = engine_with(&[("bash", 2), ("zsh", 2), ("fish", 1)]);
        for id in &ids {
            select(&engine, *id);
        }
        engine.require_media_change(RepoId(1), 2, 1);
        let mut hub = Hub::new();
        hub.media.answers = VecDeque::from([MediaAction::Skip]);

        let result = engine.commit(&CommitPolicy::default(), &mut hub).unwrap();

        assert_eq!(result.remaining, vec![ids[0], ids[1]]);
        assert_eq!(result.committed, 1);
        assert_eq!(hub.count("media:problem"), 1);
    }

    #[test]
    fn changed_media_url_is_used_afterwards() {
        let (mut engine, ids) = engine_with(&[("bash", 1)]);
        select(&engine, ids[0]);
        engine.require_media_change(RepoId(1), 1, 3);
        let mirror = Url::parse("nfs://mirror.example.com/dist/").unwrap();
        let mut hub = Hub::new();
        hub.media.answers =
            VecDeque::from([MediaAction::Retry, MediaAction::ChangeUrl(mirror.clone())]);

        let result = engine.commit(&CommitPolicy::default(), &mut hub).unwrap();

        assert_eq!(result.committed, 1);
        assert_eq!(hub.count("media:problem"), 2);
        assert_eq!(engine.media_url(RepoId(1), 1), Some(mirror));
    }

    #[test]
    fn aborted_media_change_aborts_commit() {
        let (mut engine, ids) = engine_with(&[("bash", 1)]);
        select(&engine, ids[0]);
        engine.require_media_change(RepoId(1), 1, 1);
        let mut hub = Hub::new();

        let err = engine
            .commit(&CommitPolicy::default(), &mut hub)
            .unwrap_err();
        assert!(matches!(err, EngineError::Aborted { .. }));
    }

    #[test]
    fn removal_uses_remove_reports() {
        let mut engine = ScriptedEngine::new();
        let id = engine.insert(
            ResolvableItem::new(ResolvableKind::Package, "nano", "7.2-1").installed(),
        );
        select(&engine, id);
        let mut hub = Hub::new();

        let result = engine.commit(&CommitPolicy::default(), &mut hub).unwrap();

        assert_eq!(result.committed, 1);
        assert_eq!(hub.entries(), vec!["remove:start", "remove:finish"]);
    }

    #[test]
    fn unsigned_package_rejected_by_default() {
        let (mut engine, ids) = engine_with(&[("bash", 1)]);
        select(&engine, ids[0]);
        engine.unsigned_package("bash");
        let mut hub = Hub::new();

        let result = engine.commit(&CommitPolicy::default(), &mut hub).unwrap();

        assert_eq!(result.failed, vec![ids[0]]);
        assert_eq!(hub.count("keys:problem"), 1);
        assert_eq!(hub.count("install:start"), 0);
    }

    #[test]
    fn delta_package_reports_delta_streams() {
        let (mut engine, ids) = engine_with(&[("bash", 1)]);
        select(&engine, ids[0]);
        engine.delta_package("bash");
        let mut hub = Hub::new();

        engine.commit(&CommitPolicy::default(), &mut hub).unwrap();

        assert_eq!(hub.count("delta:start"), 1);
        assert_eq!(hub.count("delta_apply:finish"), 1);
    }

    #[test]
    fn patch_shows_message_and_runs_script() {
        let mut engine = ScriptedEngine::new();
        let mut patch = ResolvableItem::new(ResolvableKind::Patch, "openssl-fix", "1")
            .with_patch(PatchInfo {
                category: PatchCategory::Security,
                needed: true,
                interactive: false,
                reboot_needed: false,
                affects_pkg_manager: false,
            });
        patch.summary = "Restart services using openssl".to_string();
        let id = engine.insert(patch);
        select(&engine, id);
        let mut hub = Hub::new();

        engine.commit(&CommitPolicy::default(), &mut hub).unwrap();

        assert_eq!(
            hub.entries(),
            vec!["message:problem", "script:start", "script:finish"]
        );
    }

    #[test]
    fn scripted_commit_error_is_returned() {
        let (mut engine, _) = engine_with(&[("bash", 1)]);
        engine.fail_commit(EngineError::fault("rpm database locked"));
        let mut hub = Hub::new();
        let err = engine
            .commit(&CommitPolicy::default(), &mut hub)
            .unwrap_err();
        assert!(!err.is_abort());
    }

    #[test]
    fn add_source_probes_then_creates() {
        let mut engine = ScriptedEngine::new();
        let mut hub = Hub::new();

        let id = engine
            .add_source("extra", repo_url(), "rpm-md", &mut hub)
            .unwrap();

        assert_eq!(id, RepoId(1));
        assert_eq!(
            hub.entries(),
            vec![
                "probe:start",
                "probe:finish",
                "create:begin",
                "create:start",
                "create:finish",
                "create:end",
            ]
        );
        assert_eq!(engine.repositories().len(), 1);
    }

    #[test]
    fn unknown_source_type_is_a_fault() {
        let mut engine = ScriptedEngine::new();
        let mut hub = Hub::new();
        hub.probe.answers = VecDeque::from([ProblemAction::Ignore]);

        let err = engine
            .add_source("odd", repo_url(), "susetags", &mut hub)
            .unwrap_err();

        assert!(matches!(err, EngineError::Fault { .. }));
        assert!(engine.repositories().is_empty());
    }

    #[test]
    fn refresh_failure_can_be_ignored() {
        let (mut engine, _) = engine_with(&[]);
        engine.fail_refresh("dist", 2);
        let mut hub = Hub::new();
        hub.refresh.answers = VecDeque::from([ProblemAction::Retry, ProblemAction::Ignore]);

        assert!(!engine.refresh_repository("dist", &mut hub).unwrap());
        assert_eq!(hub.count("refresh:problem"), 2);
        assert_eq!(hub.count("refresh:end"), 1);

        assert!(matches!(
            engine.refresh_repository("missing", &mut hub),
            Err(EngineError::RepositoryNotFound { .. })
        ));
    }

    #[test]
    fn rebuild_database_reports_progress() {
        let mut engine = ScriptedEngine::new();
        let mut hub = Hub::new();
        engine.rebuild_database(&mut hub);
        assert_eq!(hub.entries(), vec!["rebuild:start", "rebuild:finish"]);
        assert_eq!(engine.database_rebuilds(), 1);
    }

    #[test]
    fn saved_state_round_trip_through_shared_pool() {
        let (engine, ids) = engine_with(&[("bash", 1)]);
        let pool = engine.pool();
        pool.borrow_mut().save_state();
        select(&engine, ids[0]);
        assert!(pool.borrow().diff_state());
        pool.borrow_mut().restore_state().unwrap();
        assert!(!pool.borrow().diff_state());
    }
}
