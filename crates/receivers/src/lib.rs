#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Engine report receivers for pkgbridge
//!
//! Each receiver translates one engine report stream into calls of the
//! handlers registered on a [`BridgeSession`](pkgbridge_state::BridgeSession)
//! and turns the handlers' replies back into engine actions. Progress
//! streams are throttled, problem replies are decoded through fixed token
//! tables and unset handlers fall back to the documented default action.

pub mod decision;
pub mod download;
pub mod media;
pub mod package;
pub mod rpmdb;
pub mod script;
pub mod set;
pub mod source;
pub mod trust;

pub use download::{
    is_remote, AuxDownloadReceiver, AuxKinds, DownloadProgressReceiver, ProvideReceiver,
};
pub use media::MediaChangeReceiver;
pub use package::{InstallReceiver, RemoveReceiver};
pub use rpmdb::{DbKinds, RpmDbReceiver};
pub use script::{MessageReceiver, ScriptReceiver};
pub use set::ReceiverSet;
pub use source::{SourceCreateReceiver, SourceProbeReceiver, SourceRefreshReceiver};
pub use trust::{key_map, DigestReceiver, KeyRingReceiver, KeySignalReceiver};
