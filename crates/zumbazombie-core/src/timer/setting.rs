use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::format::format_minutes;

/// Inactivity threshold, in whole minutes.
///
/// Only the values on the settings menu are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TimerSetting(u32);

impl TimerSetting {
    /// Every selectable duration, in menu order.
    pub const OPTIONS: [u32; 6] = [5, 10, 15, 20, 25, 30];

    pub const DEFAULT_MINUTES: u32 = 15;

    pub fn new(minutes: u32) -> Result<Self, ValidationError> {
        if Self::OPTIONS.contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(ValidationError::InvalidTimerSetting { minutes })
        }
    }

    pub fn all() -> impl Iterator<Item = TimerSetting> {
        Self::OPTIONS.into_iter().map(TimerSetting)
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn duration_ms(self) -> u64 {
        u64::from(self.0) * 60 * 1000
    }

    /// Menu label, e.g. "15 minutes".
    pub fn label(self) -> String {
        format_minutes(self.0)
    }
}

impl Default for TimerSetting {
    fn default() -> Self {
        Self(Self::DEFAULT_MINUTES)
    }
}

impl TryFrom<u32> for TimerSetting {
    type Error = ValidationError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::new(minutes)
    }
}

impl From<TimerSetting> for u32 {
    fn from(setting: TimerSetting) -> Self {
        setting.0
    }
}

impl std::fmt::Display for TimerSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

impl std::str::FromStr for TimerSetting {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let minutes = s
            .trim()
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidValue {
                field: "minutes".into(),
                message: format!("'{s}' is not a whole number"),
            })?;
        Self::new(minutes)
    }
}
