use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::Activity;
use crate::lifecycle::{AppState, CameraFacing};
use crate::timer::MonitorState;

/// What pushed the engine into the alert screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTrigger {
    /// The foreground countdown reached zero.
    Countdown,
    /// The app came back to the foreground after the threshold had passed.
    ForegroundCheck,
}

/// Every state change in the system produces an Event.
/// The CLI prints them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    MonitoringStarted {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    MonitoringStopped {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// "I'm moving" pressed; the countdown restarted from the full setting.
    MovementSignaled {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    TimerSettingChanged {
        minutes: u32,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    AlertRaised {
        trigger: AlertTrigger,
        activity: Activity,
        at: DateTime<Utc>,
    },
    ActivityChanged {
        activity: Activity,
        at: DateTime<Utc>,
    },
    ActivityCompleted {
        activity: Activity,
        points_awarded: u32,
        total_points: u64,
        resumed: MonitorState,
        at: DateTime<Utc>,
    },
    PointsAnimationHidden {
        at: DateTime<Utc>,
    },
    NotificationSent {
        title: String,
        body: String,
        at: DateTime<Utc>,
    },
    AppStateChanged {
        from: AppState,
        to: AppState,
        at: DateTime<Utc>,
    },
    CameraSwitched {
        facing: CameraFacing,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: MonitorState,
        monitoring: bool,
        minutes: u32,
        remaining_ms: u64,
        since_movement_ms: u64,
        activity: Option<Activity>,
        total_points: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Snake-case tag, handy for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::MonitoringStarted { .. } => "monitoring_started",
            Event::MonitoringStopped { .. } => "monitoring_stopped",
            Event::MovementSignaled { .. } => "movement_signaled",
            Event::TimerSettingChanged { .. } => "timer_setting_changed",
            Event::AlertRaised { .. } => "alert_raised",
            Event::ActivityChanged { .. } => "activity_changed",
            Event::ActivityCompleted { .. } => "activity_completed",
            Event::PointsAnimationHidden { .. } => "points_animation_hidden",
            Event::NotificationSent { .. } => "notification_sent",
            Event::AppStateChanged { .. } => "app_state_changed",
            Event::CameraSwitched { .. } => "camera_switched",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
