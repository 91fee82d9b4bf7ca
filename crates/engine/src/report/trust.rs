use pkgbridge_types::RepoId;

/// Public key as shown to handlers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicKeyInfo {
    pub id: String,
    pub name: String,
    pub fingerprint: String,
    /// Creation date, formatted
    pub created: String,
    /// Expiry date, formatted; empty for keys that never expire
    pub expires: String,
    pub path: String,
}

/// Checksum problems on a downloaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestQuery {
    NoDigest {
        file: String,
    },
    UnknownDigest {
        file: String,
        name: String,
    },
    WrongDigest {
        file: String,
        requested: String,
        found: String,
    },
}

/// Signature and key trust questions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyQuery {
    ImportKey {
        key: PublicKeyInfo,
        repo: Option<RepoId>,
    },
    UnsignedFile {
        file: String,
        repo: Option<RepoId>,
    },
    UnknownKey {
        file: String,
        key_id: String,
        repo: Option<RepoId>,
    },
    VerificationFailed {
        file: String,
        key: PublicKeyInfo,
        repo: Option<RepoId>,
    },
}

/// Answer to a [`KeyQuery`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyTrust {
    #[default]
    Reject,
    Accept,
    /// Trust the key and add it to the trusted keyring
    AcceptAndImport,
}

impl KeyTrust {
    #[must_use]
    pub fn is_accepted(self) -> bool {
        self != Self::Reject
    }
}

/// Changes to the trusted keyring
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySignal {
    TrustedKeyAdded(PublicKeyInfo),
    TrustedKeyRemoved(PublicKeyInfo),
}
