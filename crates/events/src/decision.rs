//! Table-driven decoding of handler replies into actions

use std::fmt;

use tracing::warn;

/// Reply tokens an adapter accepts and the action each one selects
#[derive(Debug, Clone, Copy)]
pub struct DecisionTable<A: 'static> {
    name: &'static str,
    entries: &'static [(&'static str, A)],
    unrecognized: A,
}

impl<A: Copy + fmt::Debug> DecisionTable<A> {
    /// `unrecognized` is used for missing replies and unknown tokens.
    #[must_use]
    pub const fn new(
        name: &'static str,
        entries: &'static [(&'static str, A)],
        unrecognized: A,
    ) -> Self {
        Self {
            name,
            entries,
            unrecognized,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn unrecognized(&self) -> A {
        self.unrecognized
    }

    /// Exact token match.
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<A> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == token)
            .map(|(_, action)| *action)
    }

    /// Decode a reply, logging tokens the table does not know.
    #[must_use]
    pub fn decode(&self, reply: Option<&str>) -> A {
        match reply {
            Some(token) => self.lookup(token).unwrap_or_else(|| {
                warn!(
                    table = self.name,
                    reply = %token,
                    fallback = ?self.unrecognized,
                    "unrecognized reply, using default"
                );
                self.unrecognized
            }),
            None => self.unrecognized,
        }
    }

    /// Like [`decode`](Self::decode), but reports whether the token matched.
    #[must_use]
    pub fn decode_checked(&self, reply: Option<&str>) -> (A, bool) {
        match reply.and_then(|token| self.lookup(token)) {
            Some(action) => (action, true),
            None => (self.decode(reply), false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Choice {
        Again,
        Stop,
        Skip,
    }

    const TABLE: DecisionTable<Choice> = DecisionTable::new(
        "test",
        &[("R", Choice::Again), ("C", Choice::Stop)],
        Choice::Skip,
    );

    #[test]
    fn known_tokens_map_to_actions() {
        assert_eq!(TABLE.decode(Some("R")), Choice::Again);
        assert_eq!(TABLE.decode(Some("C")), Choice::Stop);
    }

    #[test]
    fn unknown_or_missing_reply_uses_fallback() {
        assert_eq!(TABLE.decode(Some("r")), Choice::Skip);
        assert_eq!(TABLE.decode(None), Choice::Skip);
        assert_eq!(TABLE.decode_checked(Some("X")), (Choice::Skip, false));
        assert_eq!(TABLE.decode_checked(Some("C")), (Choice::Stop, true));
    }
}
