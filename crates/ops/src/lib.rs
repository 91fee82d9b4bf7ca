#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Selection and commit operations for pkgbridge
//!
//! This crate is what the host application calls directly. [`Selection`]
//! changes item statuses on behalf of an authority, and [`Bridge`] runs
//! the solver and the commit against a [`PackageEngine`] while the session's
//! receivers relay the engine's reports to the registered handlers.
//!
//! [`PackageEngine`]: pkgbridge_engine::PackageEngine

mod bridge;
mod patches;
mod product;
mod selection;
mod solver;

pub use bridge::{Bridge, CommitOutcome};
pub use patches::PatchFilter;
pub use product::{product_file, refresh_link};
pub use selection::Selection;
pub use solver::write_badlist;
