//! Single-threaded queue of scheduled timer events.
//!
//! Entries are ordered by due time, then by insertion. Entries are cancelled
//! by kind; nothing fires after `clear()`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledKind {
    /// One countdown step. Re-armed by the controller after each delivery.
    CountdownTick,
    /// Hide the "+N Zompoints" overlay.
    HidePointsAnimation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub due_ms: u64,
    pub kind: ScheduledKind,
}

#[derive(Debug, Default)]
pub struct EventQueue {
    /// Keyed by (due time, insertion sequence).
    entries: BTreeMap<(u64, u64), ScheduledKind>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, kind: ScheduledKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((due_ms, seq), kind);
        debug!(?kind, due_ms, "scheduled");
    }

    /// Drop every pending entry of `kind`. Returns how many were removed.
    pub fn cancel_kind(&mut self, kind: ScheduledKind) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, k| *k != kind);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(?kind, removed, "cancelled");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove and return the earliest entry due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Scheduled> {
        let (&(due_ms, seq), _) = self.entries.iter().next()?;
        if due_ms > now_ms {
            return None;
        }
        let kind = self.entries.remove(&(due_ms, seq))?;
        Some(Scheduled { due_ms, kind })
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.entries.keys().next().map(|&(due_ms, _)| due_ms)
    }

    pub fn is_pending(&self, kind: ScheduledKind) -> bool {
        self.entries.values().any(|k| *k == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
