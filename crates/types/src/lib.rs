#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for pkgbridge
//!
//! This crate provides the vocabulary shared by the engine contract, the
//! event receivers and the selection operations: resolvable kinds and
//! items, authority levels with their status transitions, editions and
//! the commit report handed back to the host.

pub mod edition;
pub mod item;
pub mod kind;
pub mod report;
pub mod status;

// Re-export commonly used types
pub use edition::Edition;
pub use item::{ItemId, PatchCategory, PatchInfo, RepoId, ResolvableItem};
pub use kind::ResolvableKind;
pub use report::{CommitReport, RemainingItem};
pub use status::{Authority, LockState, ResStatus};
