//! Pending check-in uploads

use crate::models::Attendee;

/// Check-in snapshots awaiting upload, oldest first.
///
/// Entries are never deduplicated; the remote applies them idempotently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingQueue {
    entries: Vec<Attendee>,
}

impl PendingQueue {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, snapshot: Attendee) {
        self.entries.push(snapshot);
    }

    pub fn as_slice(&self) -> &[Attendee] {
        &self.entries
    }

    /// Copy of the current batch to send.
    pub fn snapshot(&self) -> Vec<Attendee> {
        self.entries.clone()
    }

    /// Drop the first `sent` entries after a confirmed upload.
    ///
    /// Entries appended while the upload was in flight sit after the sent
    /// prefix and stay queued.
    pub fn remove_sent(&mut self, sent: usize) {
        let sent = sent.min(self.entries.len());
        self.entries.drain(..sent);
    }
}

impl From<Vec<Attendee>> for PendingQueue {
    fn from(entries: Vec<Attendee>) -> Self {
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_sent_keeps_entries_queued_during_upload() {
        let mut queue = PendingQueue::default();
        queue.push(Attendee::new(1, 3));
        queue.push(Attendee::new(2, 3));

        let batch = queue.snapshot();
        queue.push(Attendee::new(3, 3));
        queue.remove_sent(batch.len());

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.as_slice()[0].participant_id.get(), 3);
    }

    #[test]
    fn remove_sent_is_bounded_by_length() {
        let mut queue = PendingQueue::from(vec![Attendee::new(1, 3)]);
        queue.remove_sent(5);
        assert!(queue.is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let mut queue = PendingQueue::default();
        queue.push(Attendee::new(1, 3));
        queue.push(Attendee::new(1, 3));
        assert_eq!(queue.len(), 2);
    }
}
