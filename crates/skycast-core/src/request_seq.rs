//! Per-view request sequencing.
//!
//! Every request a view issues takes a `Ticket`. A response may only be
//! applied to the view while its ticket is still the latest one issued;
//! leaving the view retires all outstanding tickets.

use std::sync::atomic::{AtomicU64, Ordering};

/// Sequence number handed out when a request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic sequence shared by every request of one view.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new request. Supersedes every earlier ticket.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if no request was issued (and the view was not left) since `ticket`.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Retire all outstanding tickets, e.g. when navigating away.
    pub fn abandon(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn fresh_ticket_is_current() {
        let seq = RequestSequence::new();
        let t = seq.issue();
        assert!(seq.is_current(t));
    }

    #[test]
    fn later_ticket_supersedes_earlier() {
        let seq = RequestSequence::new();
        let first = seq.issue();
        let second = seq.issue();
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn abandon_retires_outstanding_tickets() {
        let seq = RequestSequence::new();
        let t = seq.issue();
        seq.abandon();
        assert!(!seq.is_current(t));

        let next = seq.issue();
        assert!(seq.is_current(next));
    }
}
