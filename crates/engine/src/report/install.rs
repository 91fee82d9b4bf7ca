use pkgbridge_types::{ItemId, ResolvableItem};

use super::ReportError;

/// Severity of an rpm operation attempt; only forced attempts may be
/// escalated to handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RpmLevel {
    #[default]
    Default,
    NoDeps,
    NoDepsForce,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemStart {
    pub id: ItemId,
    pub item: ResolvableItem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemProblem {
    pub id: ItemId,
    pub item: ResolvableItem,
    pub error: ReportError,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemFinish {
    pub id: ItemId,
    pub item: ResolvableItem,
    pub error: ReportError,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstallProblem {
    pub id: ItemId,
    pub item: ResolvableItem,
    pub error: ReportError,
    pub description: String,
    pub level: RpmLevel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstallFinish {
    pub id: ItemId,
    pub item: ResolvableItem,
    pub error: ReportError,
    pub reason: String,
    pub level: RpmLevel,
}
