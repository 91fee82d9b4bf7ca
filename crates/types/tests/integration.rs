//! Integration tests for types

#[cfg(test)]
mod tests {
    use pkgbridge_types::*;
    use proptest::prelude::*;

    #[test]
    fn test_remaining_item_from_resolvable() {
        let item = ResolvableItem::new(ResolvableKind::Selection, "base", "1.0-3").with_arch("x86_64");
        let remaining = RemainingItem::from(&item);
        assert_eq!(remaining.kind, "package");
        assert_eq!(remaining.arch, "x86_64");
        assert_eq!(remaining.version, "1.0-3");
    }

    #[test]
    fn test_aborted_report() {
        let report = CommitReport::aborted();
        assert!(report.is_aborted());
        assert!(report.failed_items.is_empty());
        assert!(!CommitReport::default().is_aborted());
    }

    #[test]
    fn test_authority_serialization() {
        let json = serde_json::to_string(&Authority::ApplicationHigh).unwrap();
        assert_eq!(json, r#""application_high""#);
        let back: Authority = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Authority::ApplicationHigh);
    }

    #[test]
    fn test_location_filename() {
        let mut item = ResolvableItem::new(ResolvableKind::Package, "vim", "9.0-1");
        item.location = "x86_64/vim-9.0-1.x86_64.rpm".into();
        assert_eq!(item.location_filename(), "vim-9.0-1.x86_64.rpm");
    }

    #[test]
    fn test_taboo_always_succeeds() {
        for authority in [
            Authority::Solver,
            Authority::ApplicationLow,
            Authority::ApplicationHigh,
            Authority::User,
        ] {
            let mut status = ResStatus::default();
            assert!(status.set_transact(true, authority));
            assert!(status.set_taboo());
            assert!(status.is_taboo());
            assert!(!status.set_transact(true, Authority::Solver));
        }
    }

    fn edition_strategy() -> impl Strategy<Value = Edition> {
        (0u32..3, "[0-9]{1,3}(\\.[0-9a-z~]{1,3}){0,3}", proptest::option::of("[0-9]{1,2}(\\.[0-9]{1,2})?"))
            .prop_map(|(epoch, version, release)| Edition {
                epoch,
                version,
                release,
            })
    }

    proptest! {
        #[test]
        fn edition_order_is_antisymmetric(a in edition_strategy(), b in edition_strategy()) {
            prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        }

        #[test]
        fn edition_order_agrees_with_eq(a in edition_strategy(), b in edition_strategy()) {
            prop_assert_eq!(a.cmp(&b) == std::cmp::Ordering::Equal, a == b);
        }

        #[test]
        fn higher_authority_mark_survives_lower_reset(to_user in any::<bool>()) {
            let mut status = ResStatus::default();
            let owner = if to_user { Authority::User } else { Authority::ApplicationHigh };
            prop_assert!(status.set_transact(true, owner));
            prop_assert!(!status.reset_transact(Authority::Solver));
            prop_assert!(status.transacts());
        }
    }
}
