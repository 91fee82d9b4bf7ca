//! Authority levels and per-item transact status
//!
//! Every selection change is made on behalf of an [`Authority`]. A mark set
//! by a higher authority survives attempts by a lower one to change it, so
//! automatic logic cannot undo what the user asked for.

use pkgbridge_errors::OpsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Actor on whose behalf a status change is made, lowest first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Authority {
    #[default]
    Solver,
    ApplicationLow,
    ApplicationHigh,
    User,
}

impl Authority {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solver => "solver",
            Self::ApplicationLow => "application_low",
            Self::ApplicationHigh => "application_high",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Authority {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solver" => Ok(Self::Solver),
            "application_low" | "appl_low" => Ok(Self::ApplicationLow),
            "application_high" | "appl_high" => Ok(Self::ApplicationHigh),
            "user" => Ok(Self::User),
            _ => Err(OpsError::UnknownAuthority {
                value: s.to_string(),
            }),
        }
    }
}

/// Lock placed on an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    #[default]
    None,
    /// Blocks recommendation-driven selection only.
    Soft,
    /// Blocks every selection.
    Taboo,
}

/// Mutable status record of one pool item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResStatus {
    transact: bool,
    authority: Authority,
    lock: LockState,
}

impl ResStatus {
    #[must_use]
    pub fn transacts(&self) -> bool {
        self.transact
    }

    /// Authority that made the last effective change.
    #[must_use]
    pub fn authority(&self) -> Authority {
        self.authority
    }

    #[must_use]
    pub fn lock(&self) -> LockState {
        self.lock
    }

    #[must_use]
    pub fn is_taboo(&self) -> bool {
        self.lock == LockState::Taboo
    }

    #[must_use]
    pub fn is_soft_locked(&self) -> bool {
        self.lock == LockState::Soft
    }

    /// Set or clear the transact flag on behalf of `causer`.
    ///
    /// Returns false when a mark or lock placed by a higher authority blocks
    /// the change; the status is left untouched in that case. Requesting the
    /// state the item is already in succeeds, and a higher causer takes
    /// ownership of an existing transact mark.
    pub fn set_transact(&mut self, to: bool, causer: Authority) -> bool {
        if self.lock == LockState::Taboo {
            if !to {
                return true;
            }
            if self.authority > causer {
                return false;
            }
            self.lock = LockState::None;
        }

        if self.transact == to {
            if to && causer > self.authority {
                self.authority = causer;
            }
            return true;
        }

        if self.transact && self.authority > causer {
            return false;
        }

        self.transact = to;
        self.authority = causer;
        if to {
            self.lock = LockState::None;
        }
        true
    }

    /// Clear the transact flag. Locks are not touched.
    pub fn reset_transact(&mut self, causer: Authority) -> bool {
        self.set_transact(false, causer)
    }

    /// Transact unless a soft lock forbids automatic selection.
    pub fn set_soft_transact(&mut self, to: bool, causer: Authority) -> bool {
        if to && self.lock == LockState::Soft {
            return false;
        }
        self.set_transact(to, causer)
    }

    /// Taboo the item. Always made with user authority.
    pub fn set_taboo(&mut self) -> bool {
        self.transact = false;
        self.lock = LockState::Taboo;
        self.authority = Authority::User;
        true
    }

    pub fn set_soft_lock(&mut self, causer: Authority) -> bool {
        if !self.set_transact(false, causer) {
            return false;
        }
        if self.lock == LockState::Taboo {
            return true;
        }
        self.lock = LockState::Soft;
        if causer > self.authority {
            self.authority = causer;
        }
        true
    }

    /// Lift a soft lock or taboo, unless a higher authority placed it.
    pub fn unlock(&mut self, causer: Authority) -> bool {
        if self.lock == LockState::None {
            return true;
        }
        if self.authority > causer {
            return false;
        }
        self.lock = LockState::None;
        true
    }
}
