//! Outstanding requests, tracked by the confirmation kind they expect.
//!
//! Diagnostic only: replies are delivered whether or not an entry matches.

use std::time::Duration;

use lanc_proto::MessageKind;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub expected: MessageKind,
    pub reference: u32,
    pub issued_at: Instant,
}

impl PendingEntry {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.issued_at)
    }
}

#[derive(Debug, Default)]
pub struct PendingResponses {
    entries: Vec<PendingEntry>,
}

impl PendingResponses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, expected: MessageKind, reference: u32) {
        self.entries.push(PendingEntry {
            expected,
            reference,
            issued_at: Instant::now(),
        });
    }

    /// Remove the oldest entry waiting for `kind`.
    pub fn resolve(&mut self, kind: MessageKind) -> Option<PendingEntry> {
        let idx = self.entries.iter().position(|entry| entry.expected == kind)?;
        Some(self.entries.remove(idx))
    }

    /// Entries older than `max_age`.
    pub fn overdue(&self, max_age: Duration) -> Vec<PendingEntry> {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| entry.age(now) > max_age)
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_removes_oldest_match() {
        let mut pending = PendingResponses::new();
        pending.push(MessageKind::CnRpdoConfirm, 1);
        pending.push(MessageKind::VersionConfirm, 2);
        pending.push(MessageKind::CnRpdoConfirm, 3);

        let hit = pending.resolve(MessageKind::CnRpdoConfirm).unwrap();
        assert_eq!(hit.reference, 1);
        assert_eq!(pending.len(), 2);
        assert!(pending.resolve(MessageKind::StartSessionConfirm).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn overdue_reports_old_entries() {
        let mut pending = PendingResponses::new();
        pending.push(MessageKind::VersionConfirm, 1);
        tokio::time::advance(Duration::from_secs(40)).await;
        pending.push(MessageKind::CnTimeConfirm, 2);

        let overdue = pending.overdue(Duration::from_secs(30));
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].expected, MessageKind::VersionConfirm);

        pending.clear();
        assert!(pending.is_empty());
    }
}
