//! Integration tests for the state crate

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use pkgbridge_config::Config;
    use pkgbridge_events::{EventKind, FnHost, Value};
    use pkgbridge_state::*;
    use pkgbridge_types::RepoId;
    use proptest::prelude::*;
    use url::Url;

    fn session_with_host() -> (Rc<FnHost>, SharedSession) {
        let host = Rc::new(FnHost::new());
        let session = BridgeSession::new(host.clone()).shared();
        (host, session)
    }

    #[test]
    fn source_changes_follow_encounter_order() {
        let (host, session) = session_with_host();
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        host.define("changed", move |_| {
            counter.set(counter.get() + 1);
            Value::Void
        });
        session.registry().register_source_change("changed");

        let items = [
            (RepoId(1), 1),
            (RepoId(1), 1),
            (RepoId(1), 2),
            (RepoId(1), 2),
            (RepoId(2), 1),
        ];
        for (repo, medium) in items {
            session.report_source_change(Some(repo), medium);
        }

        assert_eq!(fired.get(), 3);
        assert_eq!(session.last_reported_source(), Some((Some(RepoId(2)), 1)));
        assert_eq!(session.media_count(RepoId(1)), 2);
        assert_eq!(session.media_count(RepoId(2)), 1);
    }

    #[test]
    fn handler_can_reenter_the_session() {
        let (host, session) = session_with_host();
        let inner = Rc::downgrade(&session);
        host.define("changed", move |_| {
            if let Some(session) = inner.upgrade() {
                session.registry().register(EventKind::SourceChange, "");
                session.set_silent_probing(SilentProbing::OptionalFileOnly);
            }
            Value::Void
        });
        session.registry().register_source_change("changed");

        session.report_source_change(Some(RepoId(1)), 1);

        assert!(!session.is_set(EventKind::SourceChange));
        assert_eq!(session.silent_probing(), SilentProbing::OptionalFileOnly);
    }

    #[test]
    fn config_sets_throttle_policy() {
        let mut config = Config::default();
        config.throttle.step_percent = 10;
        let session = BridgeSession::new(Rc::new(FnHost::new())).with_config(&config);
        assert_eq!(session.throttle_policy().step, 10);
        assert_eq!(session.start_throttle().last_value(), 0);
    }

    #[test]
    fn last_error_round_trip() {
        let (_, session) = session_with_host();
        assert!(session.last_error().is_none());
        session.set_last_error("commit failed", "rpm database locked");
        let error = session.last_error().unwrap();
        assert_eq!(error.message, "commit failed");
        assert_eq!(error.details, "rpm database locked");
        session.clear_last_error();
        assert!(session.last_error().is_none());
    }

    #[test]
    fn reset_clears_redirects_and_counts() {
        let (_, session) = session_with_host();
        let cd = Url::parse("cd:///").unwrap();
        let nfs = Url::parse("nfs://server/dvd").unwrap();
        session.record_media_redirect(&cd, 1, &nfs);
        session.report_source_change(Some(RepoId(4)), 3);
        assert_eq!(session.resolve_media_url(&cd, 1), nfs);

        session.reset();

        assert_eq!(session.resolve_media_url(&cd, 1), cd);
        assert!(session.media_counts().is_empty());
        assert!(session.redirects().is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Resolve(u8, u32),
        Record(u8, u32, u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..3, 1u32..3).prop_map(|(url, medium)| Op::Resolve(url, medium)),
            (0u8..3, 1u32..3, 0u8..5)
                .prop_map(|(url, medium, target)| Op::Record(url, medium, target)),
        ]
    }

    fn source(index: u8) -> Url {
        Url::parse(&format!("cd:///?devices=/dev/sr{index}")).unwrap()
    }

    fn mirror(index: u8) -> Url {
        Url::parse(&format!("http://mirror{index}.example.com/")).unwrap()
    }

    proptest! {
        #[test]
        fn resolve_returns_most_recent_record(ops in proptest::collection::vec(op(), 0..40)) {
            let mut tracker = MediaRedirectTracker::new();
            let mut expected: HashMap<(u8, u32), u8> = HashMap::new();

            for op in ops {
                match op {
                    Op::Record(url, medium, target) => {
                        tracker.record(source(url), medium, mirror(target));
                        expected.insert((url, medium), target);
                    }
                    Op::Resolve(url, medium) => {
                        let want = expected
                            .get(&(url, medium))
                            .map_or_else(|| source(url), |target| mirror(*target));
                        prop_assert_eq!(tracker.resolve(&source(url), medium), want);
                    }
                }
            }
        }
    }
}
