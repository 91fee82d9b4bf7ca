//! Checksum and signature trust decisions
//!
//! Every question defaults to rejection when no handler answers it.

use std::collections::BTreeMap;

use pkgbridge_engine::{DigestQuery, EventReceiver, KeyQuery, KeySignal, KeyTrust, PublicKeyInfo};
use pkgbridge_events::{EventKind, Value};
use pkgbridge_state::SharedSession;
use pkgbridge_types::RepoId;
use tracing::info;

/// Key description passed to handlers
#[must_use]
pub fn key_map(key: &PublicKeyInfo) -> Value {
    let fields = [
        ("id", &key.id),
        ("name", &key.name),
        ("fingerprint", &key.fingerprint),
        ("created", &key.created),
        ("expires", &key.expires),
        ("path", &key.path),
    ];
    let map: BTreeMap<String, Value> = fields
        .into_iter()
        .map(|(field, value)| (field.to_string(), Value::from(value)))
        .collect();
    Value::Map(map)
}

fn repo_arg(repo: Option<RepoId>) -> i64 {
    repo.map_or(RepoId::UNKNOWN, |repo| repo.0)
}

pub struct DigestReceiver {
    session: SharedSession,
}

impl DigestReceiver {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

impl EventReceiver for DigestReceiver {
    type Start = ();
    type Progress = ();
    type Problem = DigestQuery;
    type Action = bool;
    type Finish = ();

    fn problem(&mut self, query: DigestQuery) -> bool {
        let callback = match query {
            DigestQuery::NoDigest { file } => self
                .session
                .callback(EventKind::AcceptFileWithoutChecksum)
                .arg(file),
            DigestQuery::UnknownDigest { file, name } => self
                .session
                .callback(EventKind::AcceptUnknownDigest)
                .arg(file)
                .arg(name),
            DigestQuery::WrongDigest {
                file,
                requested,
                found,
            } => self
                .session
                .callback(EventKind::AcceptWrongDigest)
                .arg(file)
                .arg(requested)
                .arg(found),
        };
        callback.evaluate_bool(false)
    }
}

pub struct KeyRingReceiver {
    session: SharedSession,
}

impl KeyRingReceiver {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

impl EventReceiver for KeyRingReceiver {
    type Start = ();
    type Progress = ();
    type Problem = KeyQuery;
    type Action = KeyTrust;
    type Finish = ();

    fn problem(&mut self, query: KeyQuery) -> KeyTrust {
        match query {
            KeyQuery::ImportKey { key, repo } => {
                let import = self
                    .session
                    .callback(EventKind::ImportGpgKey)
                    .arg(key_map(&key))
                    .arg(repo_arg(repo))
                    .evaluate_bool(false);
                if import {
                    info!(key = %key.id, "key trusted and imported");
                    KeyTrust::AcceptAndImport
                } else {
                    KeyTrust::Reject
                }
            }
            KeyQuery::UnsignedFile { file, repo } => accept(
                self.session
                    .callback(EventKind::AcceptUnsignedFile)
                    .arg(file)
                    .arg(repo_arg(repo))
                    .evaluate_bool(false),
            ),
            KeyQuery::UnknownKey { file, key_id, repo } => accept(
                self.session
                    .callback(EventKind::AcceptUnknownGpgKey)
                    .arg(file)
                    .arg(key_id)
                    .arg(repo_arg(repo))
                    .evaluate_bool(false),
            ),
            KeyQuery::VerificationFailed { file, key, repo } => accept(
                self.session
                    .callback(EventKind::AcceptVerificationFailed)
                    .arg(file)
                    .arg(key_map(&key))
                    .arg(repo_arg(repo))
                    .evaluate_bool(false),
            ),
        }
    }
}

fn accept(accepted: bool) -> KeyTrust {
    if accepted {
        KeyTrust::Accept
    } else {
        KeyTrust::Reject
    }
}

/// Trusted keyring notifications
pub struct KeySignalReceiver {
    session: SharedSession,
}

impl KeySignalReceiver {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

impl EventReceiver for KeySignalReceiver {
    type Start = ();
    type Progress = ();
    type Problem = KeySignal;
    type Action = ();
    type Finish = ();

    fn problem(&mut self, signal: KeySignal) {
        let (kind, key) = match signal {
            KeySignal::TrustedKeyAdded(key) => (EventKind::TrustedKeyAdded, key),
            KeySignal::TrustedKeyRemoved(key) => (EventKind::TrustedKeyRemoved, key),
        };
        self.session.callback(kind).arg(key_map(&key)).evaluate();
    }
}
