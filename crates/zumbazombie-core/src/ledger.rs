use serde::{Deserialize, Serialize};

use crate::activity::Activity;

/// Running total of zompoints for this launch.
///
/// Only grows, and only through [`PointsLedger::award`]. Nothing is
/// persisted, so a relaunch starts from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsLedger {
    total: u64,
}

impl PointsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Credits a completed activity and returns the new total.
    pub fn award(&mut self, activity: &Activity) -> u64 {
        self.total = self.total.saturating_add(u64::from(activity.points));
        self.total
    }
}
