//! What the user sees, derived from controller state.
//!
//! Styling is not modelled; each screen carries its text content and the
//! actions that are available on it.

use indoc::indoc;
use serde::{Deserialize, Serialize};

use crate::controller::Controller;
use crate::format::{format_minutes, format_time};
use crate::notify::{PermissionStatus, ALERT_BODY, ALERT_TITLE};
use crate::timer::MonitorState;

pub const LOADING_TEXT: &str = "Setting up Zumba Zombie...";

pub const PERMISSION_TITLE: &str = "Permission Required";

pub const PERMISSION_MESSAGE: &str = indoc! {"
    Zumba Zombie needs notification permissions to send you zombie alerts.
    Please enable notification permissions in your device settings."};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Start,
    SetTimer,
    Move,
    SwitchCamera,
    Stop,
    Complete,
    ChangeTask,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Loading {
        message: String,
    },
    /// Blocking. There is no way forward from here in this launch.
    PermissionRequired {
        title: String,
        message: String,
    },
    Home {
        monitoring: bool,
        subtitle: String,
        camera: String,
        last_movement_secs: u64,
        next_alert_in: String,
        timer_label: String,
        zompoints: u64,
        earned_overlay: Option<String>,
        actions: Vec<Action>,
    },
    Alert {
        zompoints: u64,
        title: String,
        body: String,
        activity: String,
        reward: u32,
        /// "+N Zompoints!" overlay, while visible.
        earned_overlay: Option<String>,
        actions: Vec<Action>,
    },
}

impl Screen {
    pub fn build(controller: &Controller, now_ms: u64) -> Self {
        match controller.permission() {
            PermissionStatus::Undetermined => {
                return Screen::Loading {
                    message: LOADING_TEXT.to_string(),
                }
            }
            PermissionStatus::Denied => {
                return Screen::PermissionRequired {
                    title: PERMISSION_TITLE.to_string(),
                    message: PERMISSION_MESSAGE.to_string(),
                }
            }
            PermissionStatus::Granted => {}
        }

        let engine = controller.engine();
        let earned_overlay = controller
            .points_animation()
            .map(|points| format!("+{points} Zompoints! 🧟‍♂️"));

        if let (MonitorState::Alerting, Some(activity)) = (engine.state(), engine.activity()) {
            return Screen::Alert {
                zompoints: engine.points(),
                title: ALERT_TITLE.to_string(),
                body: ALERT_BODY.to_string(),
                activity: activity.description.clone(),
                reward: activity.points,
                earned_overlay,
                actions: vec![Action::Complete, Action::ChangeTask],
            };
        }

        let monitoring = engine.state() == MonitorState::Monitoring;
        Screen::Home {
            monitoring,
            subtitle: if monitoring {
                "Hunting for zombie behavior...".to_string()
            } else {
                "Ready to start zombie hunting".to_string()
            },
            camera: controller.camera().label().to_string(),
            last_movement_secs: engine.since_movement_ms(now_ms) / 1000,
            next_alert_in: format_time(engine.remaining_ms()),
            timer_label: format_minutes(engine.setting().minutes()),
            zompoints: engine.points(),
            earned_overlay,
            actions: if monitoring {
                vec![Action::Move, Action::SwitchCamera, Action::Stop]
            } else {
                vec![Action::Start, Action::SetTimer]
            },
        }
    }

    /// Plain-text rendering for terminals.
    pub fn render(&self) -> String {
        match self {
            Screen::Loading { message } => message.clone(),
            Screen::PermissionRequired { title, message } => format!("{title}\n\n{message}"),
            Screen::Home {
                subtitle,
                camera,
                last_movement_secs,
                next_alert_in,
                timer_label,
                zompoints,
                earned_overlay,
                ..
            } => {
                let mut text = format!(
                    "🧟‍♂️ Zumba Zombie 🧟‍♀️\n{subtitle}\n{camera}\n\
                     Last movement: {last_movement_secs}s ago\n\
                     Next zombie alert in: {next_alert_in}\n\
                     Timer set to: {timer_label}\n\
                     Zompoints: {zompoints}"
                );
                if let Some(overlay) = earned_overlay {
                    text.push('\n');
                    text.push_str(overlay);
                }
                text
            }
            Screen::Alert {
                zompoints,
                title,
                body,
                activity,
                reward,
                earned_overlay,
                ..
            } => {
                let mut text = format!(
                    "🧟‍♂️ Zompoints: {zompoints}\n{title}\n{body}\n\n\
                     {activity}\nEarn {reward} Zompoints! 🧟‍♂️"
                );
                if let Some(overlay) = earned_overlay {
                    text.push('\n');
                    text.push_str(overlay);
                }
                text
            }
        }
    }
}
