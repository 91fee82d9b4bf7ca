//! Patch counting and preselection

use std::fmt;
use std::str::FromStr;

use pkgbridge_errors::OpsError;
use pkgbridge_types::{PatchCategory, PatchInfo, ResolvableKind};
use tracing::info;

use crate::Selection;

/// Which needed patches to count or preselect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatchFilter {
    #[default]
    All,
    /// Patches that need user interaction
    Interactive,
    RebootNeeded,
    /// Patches for the package manager stack itself
    AffectsPkgManager,
}

impl PatchFilter {
    #[must_use]
    pub fn matches(self, patch: &PatchInfo) -> bool {
        match self {
            Self::All => true,
            Self::Interactive => patch.interactive,
            Self::RebootNeeded => patch.reboot_needed,
            Self::AffectsPkgManager => patch.affects_pkg_manager,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Interactive => "interactive",
            Self::RebootNeeded => "reboot_needed",
            Self::AffectsPkgManager => "affects_pkg_manager",
        }
    }
}

impl fmt::Display for PatchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatchFilter {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(Self::All),
            "interactive" => Ok(Self::Interactive),
            "reboot_needed" => Ok(Self::RebootNeeded),
            "affects_pkg_manager" => Ok(Self::AffectsPkgManager),
            other => Err(OpsError::UnknownKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// Needed, non-optional patches pass; the filter narrows further.
fn wanted(patch: Option<&PatchInfo>, filter: PatchFilter) -> bool {
    patch.is_some_and(|patch| {
        patch.needed && patch.category != PatchCategory::Optional && filter.matches(patch)
    })
}

impl Selection {
    /// Number of needed patches that pass `filter`.
    #[must_use]
    pub fn count_patches(&self, filter: PatchFilter) -> usize {
        let pool = self.pool().borrow();
        pool.names(ResolvableKind::Patch)
            .iter()
            .filter_map(|name| pool.candidate(ResolvableKind::Patch, name))
            .filter_map(|id| pool.get(id))
            .filter(|item| wanted(item.resolvable.patch.as_ref(), filter))
            .count()
    }

    /// Select every needed patch that passes `filter`. Soft-locked patches
    /// are left alone. Returns the number of patches selected.
    pub fn preselect_patches(&self, filter: PatchFilter) -> usize {
        let authority = self.authority();
        let mut selected = 0;
        {
            let mut pool = self.pool().borrow_mut();
            let ids: Vec<_> = pool
                .names(ResolvableKind::Patch)
                .iter()
                .filter_map(|name| pool.candidate(ResolvableKind::Patch, name))
                .collect();
            for id in ids {
                let Some(item) = pool.get_mut(id) else {
                    continue;
                };
                if !wanted(item.resolvable.patch.as_ref(), filter) {
                    continue;
                }
                if item.status.set_soft_transact(true, authority) {
                    selected += 1;
                }
            }
        }
        info!(filter = %filter, selected, "patches preselected");
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(category: PatchCategory) -> PatchInfo {
        PatchInfo {
            category,
            needed: true,
            interactive: false,
            reboot_needed: false,
            affects_pkg_manager: false,
        }
    }

    #[test]
    fn optional_and_unneeded_patches_are_skipped() {
        assert!(wanted(Some(&patch(PatchCategory::Security)), PatchFilter::All));
        assert!(!wanted(Some(&patch(PatchCategory::Optional)), PatchFilter::All));

        let mut applied = patch(PatchCategory::Recommended);
        applied.needed = false;
        assert!(!wanted(Some(&applied), PatchFilter::All));
        assert!(!wanted(None, PatchFilter::All));
    }

    #[test]
    fn filters_narrow_selection() {
        let mut reboot = patch(PatchCategory::Security);
        reboot.reboot_needed = true;
        assert!(wanted(Some(&reboot), PatchFilter::RebootNeeded));
        assert!(!wanted(Some(&reboot), PatchFilter::Interactive));
        assert!(!wanted(Some(&reboot), PatchFilter::AffectsPkgManager));
    }

    #[test]
    fn filter_names_parse() {
        assert_eq!("".parse::<PatchFilter>().unwrap(), PatchFilter::All);
        assert_eq!(
            "reboot_needed".parse::<PatchFilter>().unwrap(),
            PatchFilter::RebootNeeded
        );
        assert!("security".parse::<PatchFilter>().is_err());
    }
}
