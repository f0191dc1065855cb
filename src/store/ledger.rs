//! Pending Confirmation Ledger
//!
//! Each optimistic mutation takes a ticket for the entity it touches and
//! records the inverse of its local change. Tickets for one entity stack up
//! in issue order. A server reply is applied only when its ticket is the
//! newest one left, so an older response can never overwrite a newer local
//! edit. Failures unwind the stack from the top, so the entity returns to the
//! last value the server accepted.

use std::collections::HashMap;

use super::BoardAction;

/// Entity a mutation is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Board,
    Column(u32),
    Task(u32),
    Comment(u32),
    File(u32),
    Member(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub key: EntityKey,
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq)]
struct Outstanding {
    seq: u64,
    inverse: BoardAction,
    failed: bool,
}

/// What closing a ticket means for the board
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settlement {
    /// The ticket was the newest for its entity, so its reply may be applied
    pub newest: bool,
    /// Inverses to run in order, newest edit first
    pub reverts: Vec<BoardAction>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingLedger {
    next_seq: u64,
    open: HashMap<EntityKey, Vec<Outstanding>>,
}

impl PendingLedger {
    pub fn issue(&mut self, key: EntityKey, inverse: BoardAction) -> Ticket {
        self.next_seq += 1;
        self.open.entry(key).or_default().push(Outstanding {
            seq: self.next_seq,
            inverse,
            failed: false,
        });
        Ticket { key, seq: self.next_seq }
    }

    /// Close a ticket once the server answered.
    ///
    /// A success means the server holds that edit, so it and every older
    /// edit of the entity are done. A failure is parked until no in-flight
    /// edit sits above it; then the failed run is unwound newest first.
    pub fn settle(&mut self, ticket: &Ticket, succeeded: bool) -> Settlement {
        let mut settlement = Settlement::default();
        let Some(stack) = self.open.get_mut(&ticket.key) else {
            return settlement;
        };
        let Some(pos) = stack.iter().position(|entry| entry.seq == ticket.seq) else {
            return settlement;
        };

        if succeeded {
            stack.drain(..=pos);
            settlement.newest = stack.is_empty();
        } else {
            stack[pos].failed = true;
            while stack.last().is_some_and(|entry| entry.failed) {
                if let Some(entry) = stack.pop() {
                    settlement.reverts.push(entry.inverse);
                }
            }
        }

        if stack.is_empty() {
            self.open.remove(&ticket.key);
        }
        settlement
    }

    pub fn is_pending(&self, key: EntityKey) -> bool {
        self.open.contains_key(&key)
    }

    pub fn pending_count(&self) -> usize {
        self.open.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_back(title: &str) -> BoardAction {
        BoardAction::RenameTask {
            task_id: 1,
            title: title.to_string(),
        }
    }

    #[test]
    fn test_single_ticket_settles() {
        let mut ledger = PendingLedger::default();
        let ticket = ledger.issue(EntityKey::Task(1), title_back("T1"));
        assert!(ledger.is_pending(EntityKey::Task(1)));
        let settlement = ledger.settle(&ticket, true);
        assert!(settlement.newest);
        assert!(settlement.reverts.is_empty());
        assert!(!ledger.is_pending(EntityKey::Task(1)));
    }

    #[test]
    fn test_newer_ticket_wins() {
        let mut ledger = PendingLedger::default();
        let first = ledger.issue(EntityKey::Task(1), title_back("T1"));
        let second = ledger.issue(EntityKey::Task(1), title_back("X"));

        // Second response arrives first, then the stale one
        assert!(ledger.settle(&second, true).newest);
        assert_eq!(ledger.settle(&first, true), Settlement::default());
        assert_eq!(ledger.pending_count(), 0);
    }

    #[test]
    fn test_stale_success_keeps_newer_pending() {
        let mut ledger = PendingLedger::default();
        let first = ledger.issue(EntityKey::Column(3), title_back("T1"));
        let _second = ledger.issue(EntityKey::Column(3), title_back("X"));
        assert!(!ledger.settle(&first, true).newest);
        assert!(ledger.is_pending(EntityKey::Column(3)));
    }

    #[test]
    fn test_failures_unwind_newest_first() {
        let mut ledger = PendingLedger::default();
        let first = ledger.issue(EntityKey::Task(1), title_back("T1"));
        let second = ledger.issue(EntityKey::Task(1), title_back("X"));

        // Older failure waits for the newer edit
        assert_eq!(ledger.settle(&first, false), Settlement::default());
        assert!(ledger.is_pending(EntityKey::Task(1)));

        let settlement = ledger.settle(&second, false);
        assert_eq!(settlement.reverts, vec![title_back("X"), title_back("T1")]);
        assert!(!ledger.is_pending(EntityKey::Task(1)));
    }

    #[test]
    fn test_newest_failure_leaves_older_in_flight() {
        let mut ledger = PendingLedger::default();
        let first = ledger.issue(EntityKey::Task(1), title_back("T1"));
        let second = ledger.issue(EntityKey::Task(1), title_back("X"));

        assert_eq!(ledger.settle(&second, false).reverts, vec![title_back("X")]);
        assert!(ledger.is_pending(EntityKey::Task(1)));
        // The older edit is the newest one left now
        assert!(ledger.settle(&first, true).newest);
        assert!(!ledger.is_pending(EntityKey::Task(1)));
    }

    #[test]
    fn test_success_clears_parked_failure() {
        let mut ledger = PendingLedger::default();
        let first = ledger.issue(EntityKey::Task(1), title_back("T1"));
        let second = ledger.issue(EntityKey::Task(1), title_back("X"));
        ledger.settle(&first, false);
        let settlement = ledger.settle(&second, true);
        assert!(settlement.newest);
        assert!(settlement.reverts.is_empty());
        assert_eq!(ledger.pending_count(), 0);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut ledger = PendingLedger::default();
        let task = ledger.issue(EntityKey::Task(1), title_back("T1"));
        let _column = ledger.issue(EntityKey::Column(1), title_back("Todo"));
        assert!(ledger.settle(&task, true).newest);
        assert!(ledger.is_pending(EntityKey::Column(1)));
    }
}
