use serde::{Deserialize, Serialize};

use crate::EventLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionEvent {
    StateSaved {
        overwrote: bool,
    },

    StateRestored {
        changed: bool,
    },

    Reset {
        authority: String,
        cleared: usize,
    },
}

impl SelectionEvent {
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::StateSaved { overwrote: true } => EventLevel::Warn,
            _ => EventLevel::Debug,
        }
    }
}
