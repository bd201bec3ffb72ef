//! Foreground/background tracking and the camera placeholder.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    #[default]
    Active,
    Inactive,
    Background,
}

impl AppState {
    pub fn is_foreground(self) -> bool {
        self == AppState::Active
    }
}

impl std::str::FromStr for AppState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" | "foreground" => Ok(AppState::Active),
            "inactive" => Ok(AppState::Inactive),
            "background" => Ok(AppState::Background),
            other => Err(format!("unknown app state: {other}")),
        }
    }
}

/// Result of feeding a new [`AppState`] into [`Lifecycle::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: AppState,
    pub to: AppState,
}

impl Transition {
    /// Inactive/Background -> Active.
    pub fn is_reentry(&self) -> bool {
        !self.from.is_foreground() && self.to.is_foreground()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Lifecycle {
    current: AppState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> AppState {
        self.current
    }

    /// Returns `None` when the state did not change.
    pub fn transition(&mut self, next: AppState) -> Option<Transition> {
        if next == self.current {
            return None;
        }
        let from = std::mem::replace(&mut self.current, next);
        Some(Transition { from, to: next })
    }
}

/// Which camera the monitor screen claims to use. Display only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    #[default]
    Front,
    Back,
}

impl CameraFacing {
    pub fn toggled(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraFacing::Front => "Front Camera Active",
            CameraFacing::Back => "Back Camera Active",
        }
    }
}
