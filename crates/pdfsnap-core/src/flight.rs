//! Single-flight request tickets.
//!
//! Every request takes a ticket from a monotonically increasing counter.
//! Only the holder of the latest ticket may apply its result; older
//! requests keep running to completion but their results are dropped.

use std::cell::Cell;

/// Identifies one request issued by a [`SingleFlight`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Ticket dispenser for one key.
#[derive(Debug, Default)]
pub struct SingleFlight {
    latest: Cell<u64>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding every earlier one.
    pub fn begin(&self) -> Ticket {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        Ticket(next)
    }

    /// Whether `ticket` is still the latest request.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.get() == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_wins() {
        let flight = SingleFlight::new();
        let first = flight.begin();
        assert!(flight.is_current(first));

        let second = flight.begin();
        assert!(second > first);
        assert!(!flight.is_current(first));
        assert!(flight.is_current(second));
    }
}
