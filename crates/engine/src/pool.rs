//! Resolvable pool with per-item status and a single saved-state slot

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use pkgbridge_errors::EngineError;
use pkgbridge_types::{ItemId, ResStatus, ResolvableItem, ResolvableKind};

/// Pool shared between the engine and the bridge
pub type SharedPool = Rc<RefCell<Pool>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolItem {
    pub id: ItemId,
    pub resolvable: ResolvableItem,
    pub status: ResStatus,
}

impl PoolItem {
    /// Available item selected for installation
    #[must_use]
    pub fn to_install(&self) -> bool {
        self.status.transacts() && !self.resolvable.installed
    }

    /// Installed item selected for removal
    #[must_use]
    pub fn to_delete(&self) -> bool {
        self.status.transacts() && self.resolvable.installed
    }
}

#[derive(Debug, Default)]
pub struct Pool {
    items: Vec<PoolItem>,
    saved: Option<Vec<ResStatus>>,
}

impl Pool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shared(self) -> SharedPool {
        Rc::new(RefCell::new(self))
    }

    pub fn insert(&mut self, resolvable: ResolvableItem) -> ItemId {
        let id = ItemId(self.items.len());
        self.items.push(PoolItem {
            id,
            resolvable,
            status: ResStatus::default(),
        });
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&PoolItem> {
        self.items.get(id.0)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut PoolItem> {
        self.items.get_mut(id.0)
    }

    pub fn status_mut(&mut self, id: ItemId) -> Option<&mut ResStatus> {
        self.items.get_mut(id.0).map(|item| &mut item.status)
    }

    pub fn items(&self) -> impl Iterator<Item = &PoolItem> {
        self.items.iter()
    }

    pub fn by_kind(&self, kind: ResolvableKind) -> impl Iterator<Item = &PoolItem> {
        self.items
            .iter()
            .filter(move |item| item.resolvable.kind == kind)
    }

    pub fn by_name<'a>(
        &'a self,
        kind: ResolvableKind,
        name: &'a str,
    ) -> impl Iterator<Item = &'a PoolItem> {
        self.by_kind(kind)
            .filter(move |item| item.resolvable.name == name)
    }

    /// Ids of all items of `kind`
    #[must_use]
    pub fn ids(&self, kind: ResolvableKind) -> Vec<ItemId> {
        self.by_kind(kind).map(|item| item.id).collect()
    }

    /// Distinct names of `kind`, sorted
    #[must_use]
    pub fn names(&self, kind: ResolvableKind) -> BTreeSet<String> {
        self.by_kind(kind)
            .map(|item| item.resolvable.name.clone())
            .collect()
    }

    /// Best available (not installed) instance: highest edition, first
    /// inserted on ties.
    #[must_use]
    pub fn candidate(&self, kind: ResolvableKind, name: &str) -> Option<ItemId> {
        let mut best: Option<&PoolItem> = None;
        for item in self
            .by_name(kind, name)
            .filter(|item| !item.resolvable.installed)
        {
            if best.is_none_or(|b| item.resolvable.edition > b.resolvable.edition) {
                best = Some(item);
            }
        }
        best.map(|item| item.id)
    }

    #[must_use]
    pub fn installed(&self, kind: ResolvableKind, name: &str) -> Option<ItemId> {
        self.by_name(kind, name)
            .find(|item| item.resolvable.installed)
            .map(|item| item.id)
    }

    /// Items selected for a transaction, in pool order
    #[must_use]
    pub fn transacting(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|item| item.status.transacts())
            .map(|item| item.id)
            .collect()
    }

    /// Snapshot every item status into the single saved slot.
    pub fn save_state(&mut self) {
        self.saved = Some(self.items.iter().map(|item| item.status).collect());
    }

    #[must_use]
    pub fn has_saved_state(&self) -> bool {
        self.saved.is_some()
    }

    /// Put back the saved statuses. The snapshot stays available.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoSavedState`] if nothing was saved.
    pub fn restore_state(&mut self) -> Result<(), EngineError> {
        let saved = self.saved.as_ref().ok_or(EngineError::NoSavedState)?;
        for (item, status) in self.items.iter_mut().zip(saved) {
            item.status = *status;
        }
        Ok(())
    }

    /// Whether any status differs from the saved snapshot. Items added
    /// after the save count as differences when they transact.
    #[must_use]
    pub fn diff_state(&self) -> bool {
        let Some(saved) = &self.saved else {
            return false;
        };
        self.items.iter().enumerate().any(|(index, item)| match saved.get(index) {
            Some(status) => *status != item.status,
            None => item.status.transacts(),
        })
    }
}
