//! User-facing commands, shared by the interactive runtime and scripted
//! simulations.

use serde::{Deserialize, Serialize};

use crate::controller::Controller;
use crate::error::ValidationError;
use crate::events::Event;
use crate::lifecycle::AppState;
use crate::timer::TimerSetting;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "arg", rename_all = "snake_case")]
pub enum Command {
    Start,
    Stop,
    /// "I'm moving"
    Move,
    SetTimer(TimerSetting),
    /// "Change task"
    ChangeTask,
    /// "Activity complete"
    Complete,
    SwitchCamera,
    AppState(AppState),
    Status,
    Quit,
}

impl Command {
    /// Feed the command to the controller. `Status` and `Quit` produce no
    /// events; the caller handles them.
    pub fn apply(self, controller: &mut Controller, now_ms: u64) -> Vec<Event> {
        match self {
            Command::Start => controller.start(now_ms),
            Command::Stop => controller.stop(now_ms),
            Command::Move => controller.signal_movement(now_ms),
            Command::SetTimer(setting) => controller.set_timer(setting, now_ms),
            Command::ChangeTask => controller.change_activity(now_ms),
            Command::Complete => controller.complete_activity(now_ms),
            Command::SwitchCamera => controller.switch_camera(),
            Command::AppState(state) => controller.set_app_state(state, now_ms),
            Command::Status | Command::Quit => Vec::new(),
        }
    }
}

impl std::str::FromStr for Command {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let head = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();

        let command = match head.as_str() {
            "start" => Command::Start,
            "stop" => Command::Stop,
            "move" | "moving" => Command::Move,
            "set" | "timer" => {
                let minutes = arg.ok_or_else(|| ValidationError::InvalidValue {
                    field: "minutes".into(),
                    message: "expected one of 5, 10, 15, 20, 25, 30".into(),
                })?;
                Command::SetTimer(minutes.parse()?)
            }
            "change" => Command::ChangeTask,
            "done" | "complete" => Command::Complete,
            "camera" => Command::SwitchCamera,
            "background" => Command::AppState(AppState::Background),
            "inactive" => Command::AppState(AppState::Inactive),
            "foreground" | "active" => Command::AppState(AppState::Active),
            "status" => Command::Status,
            "quit" | "exit" => Command::Quit,
            _ => return Err(ValidationError::UnknownCommand(s.trim().to_string())),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        assert_eq!("start".parse(), Ok(Command::Start));
        assert_eq!(" STOP ".parse(), Ok(Command::Stop));
        assert_eq!("move".parse(), Ok(Command::Move));
        assert_eq!(
            "set 20".parse(),
            Ok(Command::SetTimer(TimerSetting::new(20).unwrap()))
        );
        assert_eq!("change".parse(), Ok(Command::ChangeTask));
        assert_eq!("done".parse(), Ok(Command::Complete));
        assert_eq!("camera".parse(), Ok(Command::SwitchCamera));
        assert_eq!("background".parse(), Ok(Command::AppState(AppState::Background)));
        assert_eq!("foreground".parse(), Ok(Command::AppState(AppState::Active)));
        assert_eq!("status".parse(), Ok(Command::Status));
        assert_eq!("quit".parse(), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            "dance".parse::<Command>(),
            Err(ValidationError::UnknownCommand("dance".into()))
        );
        assert_eq!(
            "set 7".parse::<Command>(),
            Err(ValidationError::InvalidTimerSetting { minutes: 7 })
        );
        assert!("set".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }
}
