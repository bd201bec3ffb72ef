//! Monitoring state machine.
//!
//! The engine has no clock and no threads. The caller delivers one `tick()`
//! per elapsed second and passes its own monotonic `now_ms` wherever the
//! time of last movement matters.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Monitoring -> Alerting -> (Monitoring | Idle)
//!            ^   |
//!            +---+  movement / setting change restart the countdown
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = MonitorEngine::new(TimerSetting::default(), now_ms);
//! engine.start(now_ms);
//! // once per second:
//! engine.tick(&catalog, &mut rng); // Some(Event::AlertRaised) at zero
//! ```

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::setting::TimerSetting;
use crate::activity::{Activity, Catalog};
use crate::events::{AlertTrigger, Event};
use crate::ledger::PointsLedger;

/// Countdown step, delivered once per real second.
pub const TICK_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorState {
    /// No countdown running.
    Idle,
    /// Countdown active, no alert.
    Monitoring,
    /// Countdown stopped at zero and an activity is on screen.
    Alerting,
}

/// Core monitoring engine.
///
/// Invariants held after every public call:
/// - `remaining_ms <= setting.duration_ms()`
/// - `state == Alerting` implies `remaining_ms == 0` and `activity.is_some()`
/// - the ledger only changes in [`MonitorEngine::complete_activity`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorEngine {
    setting: TimerSetting,
    state: MonitorState,
    remaining_ms: u64,
    /// User-facing monitoring switch. Survives an alert so completion knows
    /// whether to resume the countdown.
    monitoring: bool,
    activity: Option<Activity>,
    ledger: PointsLedger,
    last_movement_ms: u64,
}

impl MonitorEngine {
    /// Create an idle engine. `now_ms` seeds the time of last movement.
    pub fn new(setting: TimerSetting, now_ms: u64) -> Self {
        Self {
            setting,
            state: MonitorState::Idle,
            remaining_ms: setting.duration_ms(),
            monitoring: false,
            activity: None,
            ledger: PointsLedger::new(),
            last_movement_ms: now_ms,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn setting(&self) -> TimerSetting {
        self.setting
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    pub fn activity(&self) -> Option<&Activity> {
        self.activity.as_ref()
    }

    pub fn points(&self) -> u64 {
        self.ledger.total()
    }

    pub fn last_movement_ms(&self) -> u64 {
        self.last_movement_ms
    }

    pub fn since_movement_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_movement_ms)
    }

    /// Strictly more than the threshold has passed since the last movement.
    pub fn is_overdue(&self, now_ms: u64) -> bool {
        self.since_movement_ms(now_ms) > self.setting.duration_ms()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now_ms: u64) -> Event {
        Event::StateSnapshot {
            state: self.state,
            monitoring: self.monitoring,
            minutes: self.setting.minutes(),
            remaining_ms: self.remaining_ms,
            since_movement_ms: self.since_movement_ms(now_ms),
            activity: self.activity.clone(),
            total_points: self.ledger.total(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            MonitorState::Idle => {
                self.monitoring = true;
                self.state = MonitorState::Monitoring;
                self.remaining_ms = self.setting.duration_ms();
                self.last_movement_ms = now_ms;
                Some(Event::MonitoringStarted {
                    duration_ms: self.remaining_ms,
                    at: Utc::now(),
                })
            }
            MonitorState::Monitoring | MonitorState::Alerting => None,
        }
    }

    pub fn stop(&mut self) -> Option<Event> {
        match self.state {
            MonitorState::Monitoring => {
                let remaining_ms = self.remaining_ms;
                self.monitoring = false;
                self.state = MonitorState::Idle;
                self.remaining_ms = self.setting.duration_ms();
                Some(Event::MonitoringStopped {
                    remaining_ms,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// "I'm moving". Restarts the countdown from the full setting.
    pub fn signal_movement(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            MonitorState::Monitoring => {
                self.last_movement_ms = now_ms;
                self.remaining_ms = self.setting.duration_ms();
                Some(Event::MovementSignaled {
                    duration_ms: self.remaining_ms,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Apply a new threshold. Outside an alert the countdown restarts at the
    /// new duration; during an alert it stays at zero until the alert clears.
    pub fn set_setting(&mut self, setting: TimerSetting) -> Option<Event> {
        self.setting = setting;
        if self.state != MonitorState::Alerting {
            self.remaining_ms = setting.duration_ms();
        }
        Some(Event::TimerSettingChanged {
            minutes: setting.minutes(),
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    /// Advance the countdown by one second.
    /// Returns `Some(Event::AlertRaised)` when it reaches zero.
    pub fn tick<R: Rng + ?Sized>(&mut self, catalog: &Catalog, rng: &mut R) -> Option<Event> {
        if self.state != MonitorState::Monitoring {
            return None;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(TICK_MS);
        if self.remaining_ms == 0 {
            return Some(self.enter_alert(AlertTrigger::Countdown, catalog, rng));
        }
        None
    }

    /// Foreground re-entry found the user overdue. Skips the countdown.
    /// No-op when an alert is already showing.
    pub fn force_alert<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Option<Event> {
        if self.state == MonitorState::Alerting {
            return None;
        }
        Some(self.enter_alert(AlertTrigger::ForegroundCheck, catalog, rng))
    }

    /// "Change task". May return the same activity again.
    pub fn change_activity<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Option<Event> {
        if self.state != MonitorState::Alerting {
            return None;
        }
        let activity = catalog.pick(rng);
        self.activity = Some(activity.clone());
        Some(Event::ActivityChanged {
            activity,
            at: Utc::now(),
        })
    }

    /// "Activity complete". Awards the points and clears the alert, resuming
    /// the countdown only if monitoring was on before the alert.
    pub fn complete_activity(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != MonitorState::Alerting {
            return None;
        }
        let activity = self.activity.take()?;
        let total_points = self.ledger.award(&activity);
        self.last_movement_ms = now_ms;
        self.remaining_ms = self.setting.duration_ms();
        self.state = if self.monitoring {
            MonitorState::Monitoring
        } else {
            MonitorState::Idle
        };
        Some(Event::ActivityCompleted {
            points_awarded: activity.points,
            activity,
            total_points,
            resumed: self.state,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter_alert<R: Rng + ?Sized>(
        &mut self,
        trigger: AlertTrigger,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Event {
        let activity = catalog.pick(rng);
        self.state = MonitorState::Alerting;
        self.remaining_ms = 0;
        self.activity = Some(activity.clone());
        Event::AlertRaised {
            trigger,
            activity,
            at: Utc::now(),
        }
    }
}
