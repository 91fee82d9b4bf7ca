//! Session-wide flags read by the receivers

use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How much prompting is allowed while sources are being probed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SilentProbing {
    /// Prompt normally.
    #[default]
    Full,
    /// Never prompt for media.
    Disabled,
    /// Do not prompt for files that may legitimately be absent.
    OptionalFileOnly,
}

impl SilentProbing {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Disabled => "disabled",
            Self::OptionalFileOnly => "optional_file_only",
        }
    }
}

impl fmt::Display for SilentProbing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restores the previous silent-probing mode when dropped
#[must_use = "the previous mode is restored as soon as the guard is dropped"]
pub struct SilentProbingGuard<'a> {
    cell: &'a Cell<SilentProbing>,
    previous: SilentProbing,
}

impl<'a> SilentProbingGuard<'a> {
    pub(crate) fn new(cell: &'a Cell<SilentProbing>, mode: SilentProbing) -> Self {
        let previous = cell.replace(mode);
        Self { cell, previous }
    }

    /// Mode that will be restored
    #[must_use]
    pub fn previous(&self) -> SilentProbing {
        self.previous
    }
}

impl Drop for SilentProbingGuard<'_> {
    fn drop(&mut self) {
        self.cell.set(self.previous);
    }
}
