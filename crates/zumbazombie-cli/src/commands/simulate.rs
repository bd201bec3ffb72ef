use std::str::FromStr;

use clap::Args;
use tracing::debug;
use zumbazombie_core::{
    Command, Config, Controller, Event, MemoryNotifier, PermissionStatus, Screen,
    TimerSetting,
};

#[derive(Args)]
pub struct SimulateArgs {
    /// Simulated seconds to run
    #[arg(long, default_value_t = 300)]
    seconds: u64,
    /// Inactivity threshold in minutes (defaults to timer.minutes)
    #[arg(long)]
    minutes: Option<TimerSetting>,
    /// Seed for reproducible activity picks
    #[arg(long)]
    seed: Option<u64>,
    /// Timed commands, e.g. "0:start,120:move,300:done"
    #[arg(long, value_delimiter = ',', default_value = "0:start")]
    script: Vec<ScriptStep>,
    /// Behave as if notification permission was refused
    #[arg(long)]
    deny_notifications: bool,
}

/// A command applied at a given simulated second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStep {
    at_secs: u64,
    command: Command,
}

impl FromStr for ScriptStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (at, command) = s
            .split_once(':')
            .ok_or_else(|| format!("expected <seconds>:<command>, got {s:?}"))?;
        let at_secs = at
            .trim()
            .parse()
            .map_err(|_| format!("invalid time {at:?}"))?;
        let command = command.parse::<Command>().map_err(|e| e.to_string())?;
        Ok(Self { at_secs, command })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Script(Command),
    BackgroundCheck,
}

/// Scripted commands merged with periodic background checks, in time order.
///
/// Checks are generated as time advances. A command and a check due at the
/// same instant yield the command first.
struct Plan {
    script: std::iter::Peekable<std::vec::IntoIter<(u64, Command)>>,
    next_check_ms: Option<u64>,
    period_ms: u64,
    end_ms: u64,
}

impl Plan {
    fn new(script: &[ScriptStep], check_period_ms: Option<u64>, end_ms: u64) -> Self {
        let mut timed: Vec<(u64, Command)> = script
            .iter()
            .map(|step| (step.at_secs.saturating_mul(1000), step.command))
            .filter(|&(at_ms, _)| at_ms <= end_ms)
            .collect();
        timed.sort_by_key(|&(at_ms, _)| at_ms);
        let period_ms = check_period_ms.unwrap_or(0).max(1);
        Self {
            script: timed.into_iter().peekable(),
            next_check_ms: check_period_ms.map(|_| period_ms),
            period_ms,
            end_ms,
        }
    }
}

impl Plan {
    /// Checks only matter while backgrounded, and only a scripted command can
    /// change that. Jump to the first check at or after the next command.
    fn skip_checks_to_next_command(&mut self) {
        let Some(&(next_ms, _)) = self.script.peek() else {
            self.next_check_ms = None;
            return;
        };
        let periods = next_ms.div_ceil(self.period_ms).max(1);
        self.next_check_ms = periods.checked_mul(self.period_ms);
    }
}

impl Iterator for Plan {
    type Item = (u64, Step);

    fn next(&mut self) -> Option<Self::Item> {
        let check = self.next_check_ms.filter(|&at_ms| at_ms <= self.end_ms);
        let script = self.script.peek().map(|&(at_ms, _)| at_ms);
        match (script, check) {
            (Some(s), Some(c)) if c < s => {}
            (Some(_), _) => {
                return self.script.next().map(|(at_ms, cmd)| (at_ms, Step::Script(cmd)));
            }
            (None, Some(_)) => {}
            (None, None) => return None,
        }
        let at_ms = check?;
        self.next_check_ms = at_ms.checked_add(self.period_ms);
        Some((at_ms, Step::BackgroundCheck))
    }
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let setting = args.minutes.unwrap_or_else(|| config.timer_setting());
    let permission = if args.deny_notifications || !config.notifications.enabled {
        PermissionStatus::Denied
    } else {
        PermissionStatus::Granted
    };

    let mut controller = Controller::new(setting, Box::new(MemoryNotifier::new(permission)), 0);
    if let Some(seed) = args.seed.or(config.activities.seed) {
        controller = controller.with_seed(seed);
    }

    if controller.request_permission() != PermissionStatus::Granted {
        println!("{}", serde_json::to_string(&Screen::build(&controller, 0))?);
        return Err("notification permission denied".into());
    }

    let mut end_ms = args.seconds.saturating_mul(1000);
    let check_period_ms = config
        .background
        .enabled
        .then(|| config.background.minimum_interval_secs.max(1).saturating_mul(1000));
    debug!(commands = args.script.len(), end_ms, ?check_period_ms, "simulation planned");

    let mut plan = Plan::new(&args.script, check_period_ms, end_ms);
    while let Some((at_ms, step)) = plan.next() {
        emit(&controller.advance_to(at_ms))?;
        match step {
            Step::Script(Command::Quit) => {
                end_ms = at_ms;
                break;
            }
            Step::Script(Command::Status) => {
                println!("{}", serde_json::to_string(&controller.snapshot(at_ms))?)
            }
            Step::Script(command) => emit(&command.apply(&mut controller, at_ms))?,
            Step::BackgroundCheck if controller.app_state().is_foreground() => {
                plan.skip_checks_to_next_command();
            }
            Step::BackgroundCheck => {
                let (_, events) = controller.background_check(at_ms);
                emit(&events)?;
            }
        }
    }
    emit(&controller.advance_to(end_ms))?;

    println!("{}", serde_json::to_string(&controller.snapshot(end_ms))?);
    controller.shutdown();
    Ok(())
}

fn emit(events: &[Event]) -> Result<(), serde_json::Error> {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zumbazombie_core::AppState;

    fn steps(script: &str) -> Vec<ScriptStep> {
        script.split(',').map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn script_step_parses_time_and_command() {
        let step: ScriptStep = "120:move".parse().unwrap();
        assert_eq!(step.at_secs, 120);
        assert_eq!(step.command, Command::Move);
        assert!("move".parse::<ScriptStep>().is_err());
        assert!("x:move".parse::<ScriptStep>().is_err());
        assert!("5:dance".parse::<ScriptStep>().is_err());
    }

    #[test]
    fn plan_interleaves_checks_and_commands() {
        let script = steps("0:start,60:background");
        let plan: Vec<_> = Plan::new(&script, Some(60_000), 130_000).collect();
        assert_eq!(
            plan,
            vec![
                (0, Step::Script(Command::Start)),
                (60_000, Step::Script(Command::AppState(AppState::Background))),
                (60_000, Step::BackgroundCheck),
                (120_000, Step::BackgroundCheck),
            ]
        );
    }

    #[test]
    fn plan_without_checks_only_runs_script() {
        let script = steps("10:move,0:start,999:stop");
        let plan: Vec<_> = Plan::new(&script, None, 500_000).collect();
        assert_eq!(
            plan,
            vec![(0, Step::Script(Command::Start)), (10_000, Step::Script(Command::Move))]
        );
    }

    #[test]
    fn foreground_skips_to_first_check_after_next_command() {
        let script = steps("0:start,250:background");
        let mut plan = Plan::new(&script, Some(60_000), 1_000_000);
        assert_eq!(plan.next(), Some((0, Step::Script(Command::Start))));
        assert_eq!(plan.next(), Some((60_000, Step::BackgroundCheck)));
        plan.skip_checks_to_next_command();
        assert_eq!(
            plan.next(),
            Some((250_000, Step::Script(Command::AppState(AppState::Background))))
        );
        assert_eq!(plan.next(), Some((300_000, Step::BackgroundCheck)));

        plan.skip_checks_to_next_command();
        assert_eq!(plan.next(), None);
    }

    #[test]
    fn plan_saturates_huge_times() {
        let end_ms = u64::MAX.saturating_mul(1000);
        let script = steps("0:start,18446744073709551615:stop");
        let mut plan = Plan::new(&script, Some(u64::MAX), end_ms);
        assert_eq!(plan.next(), Some((0, Step::Script(Command::Start))));
        assert_eq!(plan.next(), Some((u64::MAX, Step::Script(Command::Stop))));
        assert_eq!(plan.next(), Some((u64::MAX, Step::BackgroundCheck)));
        assert_eq!(plan.next(), None);
    }
}
