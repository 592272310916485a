//! Cycle state machine

use serde::Serialize;
use std::fmt;

/// Where the coordinator is within a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum KeeperState {
    /// Between cycles
    #[default]
    Idle,
    Fetching,
    Filtering,
    Batching,
    /// Submitting batch `batch` (1-based) of `of`
    Submitting { batch: usize, of: usize },
    Done,
}

impl KeeperState {
    /// Whether `next` is a legal successor of `self`
    pub fn can_advance_to(self, next: KeeperState) -> bool {
        use KeeperState::*;
        match (self, next) {
            (Idle, Fetching) => true,
            (Fetching, Filtering) => true,
            (Filtering, Batching) | (Filtering, Done) => true,
            (Batching, Submitting { batch: 1, .. }) | (Batching, Done) => true,
            (Submitting { batch, of }, Submitting { batch: b, of: o }) => b == batch + 1 && o == of,
            (Submitting { .. }, Done) => true,
            (Done, Idle) => true,
            // a cycle-level error returns straight to idle
            (Fetching, Idle) => true,
            _ => false,
        }
    }
}

impl fmt::Display for KeeperState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeeperState::Idle => write!(f, "IDLE"),
            KeeperState::Fetching => write!(f, "FETCHING"),
            KeeperState::Filtering => write!(f, "FILTERING"),
            KeeperState::Batching => write!(f, "BATCHING"),
            KeeperState::Submitting { batch, of } => write!(f, "SUBMITTING({batch} of {of})"),
            KeeperState::Done => write!(f, "DONE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            KeeperState::Idle,
            KeeperState::Fetching,
            KeeperState::Filtering,
            KeeperState::Batching,
            KeeperState::Submitting { batch: 1, of: 2 },
            KeeperState::Submitting { batch: 2, of: 2 },
            KeeperState::Done,
            KeeperState::Idle,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!KeeperState::Idle.can_advance_to(KeeperState::Batching));
        assert!(!KeeperState::Submitting { batch: 1, of: 3 }
            .can_advance_to(KeeperState::Submitting { batch: 3, of: 3 }));
        assert!(!KeeperState::Done.can_advance_to(KeeperState::Fetching));
    }

    #[test]
    fn test_display() {
        assert_eq!(KeeperState::Submitting { batch: 2, of: 5 }.to_string(), "SUBMITTING(2 of 5)");
        assert_eq!(KeeperState::default().to_string(), "IDLE");
    }
}
