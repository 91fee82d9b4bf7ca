#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Contract between pkgbridge and the package engine
//!
//! The engine owns the resolvable pool, the solver and the transaction
//! executor. pkgbridge only needs the surface defined here:
//!
//! - a [`SharedPool`] of items whose status it may change
//! - [`PackageEngine::resolve`] and [`PackageEngine::commit`]
//! - the four-phase [`EventReceiver`] reports the engine pushes while it
//!   works, reached through a [`ReportHub`]
//!
//! [`ScriptedEngine`] is a complete in-memory engine that drives the reports
//! from a declarative script; embedders use it to exercise their handlers.

pub mod pool;
pub mod report;
pub mod repo;
pub mod scripted;

pub use pool::{Pool, PoolItem, SharedPool};
pub use report::*;
pub use repo::Repository;
pub use scripted::ScriptedEngine;

use pkgbridge_errors::EngineError;
use pkgbridge_types::ItemId;
use serde::{Deserialize, Serialize};

/// Restrictions applied to one commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitPolicy {
    /// Only commit items from this medium; 0 means all media.
    pub restrict_to_media: u32,
}

/// What the engine did during a commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineCommitResult {
    /// Number of items successfully committed
    pub committed: usize,
    pub failed: Vec<ItemId>,
    /// Items not attempted (other media, skipped media)
    pub remaining: Vec<ItemId>,
    /// Source packages not attempted
    pub src_remaining: Vec<ItemId>,
}

/// One unresolvable dependency problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverProblem {
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
}

impl SolverProblem {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            details: String::new(),
        }
    }
}

/// Result of a solver run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverOutcome {
    Solved,
    Problems(Vec<SolverProblem>),
}

/// Tunables passed to the solver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverFlags {
    /// Ignore recommendations, follow hard requirements only
    pub only_requires: bool,
    /// Do not pull in recommendations of already installed items
    pub ignore_already_recommended: bool,
}

impl SolverFlags {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Package that ships the base product descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePackage {
    pub name: String,
    /// Absolute paths of the files the package installs
    pub files: Vec<String>,
}

/// Installed base product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseProduct {
    pub name: String,
    pub reference_package: Option<ReferencePackage>,
}

/// Package engine operations used by the bridge
pub trait PackageEngine {
    /// Shared handle to the resolvable pool.
    fn pool(&self) -> SharedPool;

    fn repositories(&self) -> Vec<Repository>;

    fn solver_flags(&self) -> SolverFlags;

    fn set_solver_flags(&mut self, flags: SolverFlags);

    /// Run the solver over the current selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the solver itself fails (as opposed to finding
    /// dependency problems).
    fn resolve(&mut self) -> Result<ResolverOutcome, EngineError>;

    /// Problems found by the last solver run.
    fn problems(&self) -> Vec<SolverProblem>;

    /// Execute the solved transaction, pushing lifecycle reports to `reports`.
    ///
    /// The pool must not be borrowed across calls into `reports`: handlers
    /// may inspect or change selections while they run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Aborted`] when a handler aborted the
    /// transaction, or another error for engine faults.
    fn commit(
        &mut self,
        policy: &CommitPolicy,
        reports: &mut dyn ReportHub,
    ) -> Result<EngineCommitResult, EngineError>;

    /// Release every repository handle (media, mounts, caches).
    fn release_all_sources(&mut self);

    fn base_product(&self) -> Option<BaseProduct>;
}
