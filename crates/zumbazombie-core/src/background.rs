//! Best-effort inactivity check while the app is backgrounded.
//!
//! The OS decides when (and whether) the check runs, so nothing here is part
//! of the countdown's correctness. A failed registration is logged and the
//! app keeps working on foreground timers alone.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CoreError, Result};
use crate::timer::TimerSetting;

pub const TASK_NAME: &str = "ZUMBA_ZOMBIE_MONITORING";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundOptions {
    pub minimum_interval_secs: u64,
    pub stop_on_terminate: bool,
    pub start_on_boot: bool,
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        Self {
            minimum_interval_secs: 60,
            stop_on_terminate: false,
            start_on_boot: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchResult {
    /// Threshold passed; an alert was (or should be) sent.
    NewData,
    NoData,
}

pub trait BackgroundRegistrar {
    fn register(&mut self, task: &str, options: &BackgroundOptions) -> Result<()>;
}

/// Runs the check from the host process's own timer.
#[derive(Debug, Clone, Default)]
pub struct InProcessRegistrar {
    registered: Option<BackgroundOptions>,
}

impl InProcessRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> Option<&BackgroundOptions> {
        self.registered.as_ref()
    }
}

impl BackgroundRegistrar for InProcessRegistrar {
    fn register(&mut self, task: &str, options: &BackgroundOptions) -> Result<()> {
        if options.minimum_interval_secs == 0 {
            return Err(CoreError::Background {
                task: task.to_string(),
                message: "minimum interval must be at least one second".into(),
            });
        }
        self.registered = Some(options.clone());
        Ok(())
    }
}

/// Stands in for a platform without background fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRegistrar;

impl BackgroundRegistrar for UnavailableRegistrar {
    fn register(&mut self, task: &str, _options: &BackgroundOptions) -> Result<()> {
        Err(CoreError::Background {
            task: task.to_string(),
            message: "background fetch unavailable".into(),
        })
    }
}

/// Register the monitoring task. Failure is logged, never propagated.
pub fn register_or_continue<R: BackgroundRegistrar + ?Sized>(
    registrar: &mut R,
    options: &BackgroundOptions,
) -> bool {
    match registrar.register(TASK_NAME, options) {
        Ok(()) => {
            info!(
                task = TASK_NAME,
                interval_secs = options.minimum_interval_secs,
                "background task registered"
            );
            true
        }
        Err(e) => {
            warn!(task = TASK_NAME, error = %e, "background task registration failed");
            false
        }
    }
}

/// Overdue when strictly more than the threshold has passed.
pub fn check(last_movement_ms: u64, setting: TimerSetting, now_ms: u64) -> FetchResult {
    if now_ms.saturating_sub(last_movement_ms) > setting.duration_ms() {
        FetchResult::NewData
    } else {
        FetchResult::NoData
    }
}
