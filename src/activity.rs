//! Session-scoped activity log.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub message: String,
    pub outcome: Outcome,
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.outcome {
            Outcome::Success => "[ok]  ",
            Outcome::Failure => "[fail]",
        };
        write!(f, "{marker} {}", self.message)
    }
}

/// Append-only list of what happened during a session.
///
/// Entries are never removed; the log lives as long as the session does.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: impl Into<String>, outcome: Outcome) {
        self.entries.push(ActivityEntry {
            message: message.into(),
            outcome,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.append(message, Outcome::Success);
    }

    pub fn failure(&mut self, message: impl Into<String>) {
        self.append(message, Outcome::Failure);
    }

    /// Entries from most recent to oldest.
    pub fn render_all(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter().rev()
    }

    pub fn last(&self) -> Option<&ActivityEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
