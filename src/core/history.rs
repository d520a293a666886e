//! Bounded log of committed transitions.
//!
//! Every committed transition is appended to the machine's log together with
//! the trigger that caused it. The log keeps at most `capacity` entries and
//! drops the oldest first. It lives in memory only.

use super::id::{StateId, TriggerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single committed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state that was left
    pub from: StateId,
    /// The state that was entered
    pub to: StateId,
    /// Id of the trigger that caused the transition
    pub trigger: TriggerId,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of transitions.
///
/// # Example
///
/// ```rust
/// use trigger_fsm::core::{StateId, TransitionLog, TransitionRecord, TriggerId};
/// use chrono::Utc;
///
/// let mut log = TransitionLog::with_capacity(2);
/// for (from, to) in [(0, 1), (1, 2), (2, 0)] {
///     log.record(TransitionRecord {
///         from: StateId::new(from),
///         to: StateId::new(to),
///         trigger: TriggerId::new(9),
///         timestamp: Utc::now(),
///     });
/// }
///
/// // Oldest entry was evicted.
/// assert_eq!(log.len(), 2);
/// assert_eq!(log.path(), vec![StateId::new(1), StateId::new(2), StateId::new(0)]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionLog {
    capacity: usize,
    records: VecDeque<TransitionRecord>,
}

impl TransitionLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity.min(256)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a record, evicting the oldest one when full.
    ///
    /// A log with capacity 0 records nothing.
    pub fn record(&mut self, record: TransitionRecord) {
        if self.capacity == 0 {
            return;
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// States traversed, oldest first: the `from` of the oldest retained
    /// record, then the `to` of every record.
    pub fn path(&self) -> Vec<StateId> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from);
        }
        path.extend(self.records.iter().map(|r| r.to));
        path
    }

    /// Time between the oldest and newest retained record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn transitions(&self) -> Vec<TransitionRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for TransitionLog {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}
