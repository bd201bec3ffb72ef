//! Real-time driver for a [`Controller`].
//!
//! One task, one thread: `tokio::select!` serializes user commands, queue
//! deadlines and the periodic background check, so the controller is never
//! touched concurrently. Time is measured from the runtime's creation, which
//! is why the controller must be built with `now_ms = 0`.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::background::{self, BackgroundOptions, BackgroundRegistrar};
use crate::command::Command;
use crate::controller::Controller;
use crate::events::Event;
use crate::notify::PermissionStatus;
use crate::view::Screen;

/// What the runtime hands back to its host after each step.
#[derive(Debug, Clone)]
pub struct Update {
    pub now_ms: u64,
    pub events: Vec<Event>,
    pub screen: Screen,
}

pub struct Runtime {
    controller: Controller,
    origin: Instant,
    background: Option<BackgroundOptions>,
}

impl Runtime {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            origin: Instant::now(),
            background: None,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    /// Ask for notification permission and register the background check.
    ///
    /// A failed registration leaves the runtime on foreground timers only.
    pub fn setup<R: BackgroundRegistrar + ?Sized>(
        &mut self,
        registrar: &mut R,
        options: &BackgroundOptions,
    ) -> PermissionStatus {
        let permission = self.controller.request_permission();
        if background::register_or_continue(registrar, options) {
            self.background = Some(options.clone());
        }
        permission
    }

    pub fn screen(&self) -> Screen {
        Screen::build(&self.controller, self.now_ms())
    }

    /// Drive the controller until `Quit` arrives or the sender is dropped.
    /// Returns the controller after teardown.
    pub async fn run<F>(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut on_update: F,
    ) -> Controller
    where
        F: FnMut(Update),
    {
        let mut background_tick = self.background.as_ref().map(|options| {
            let period = Duration::from_secs(options.minimum_interval_secs.max(1));
            let mut interval = time::interval_at(self.origin + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        info!("runtime started");
        loop {
            let deadline = self
                .controller
                .next_due_ms()
                .map(|ms| self.origin + Duration::from_millis(ms));
            let backgrounded = !self.controller.app_state().is_foreground();

            tokio::select! {
                _ = sleep_until(deadline) => {
                    let now_ms = self.now_ms();
                    let events = self.controller.advance_to(now_ms);
                    self.emit(events, false, &mut on_update);
                }
                _ = tick(background_tick.as_mut()), if backgrounded => {
                    let now_ms = self.now_ms();
                    let (result, events) = self.controller.background_check(now_ms);
                    debug!(?result, now_ms, "background fetch");
                    self.emit(events, false, &mut on_update);
                }
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if command == Command::Quit {
                        break;
                    }
                    let now_ms = self.now_ms();
                    // Deliver anything already due so the command sees current state.
                    let mut events = self.controller.advance_to(now_ms);
                    events.extend(command.apply(&mut self.controller, now_ms));
                    self.emit(events, command == Command::Status, &mut on_update);
                }
            }
        }

        self.controller.shutdown();
        info!("runtime stopped");
        self.controller
    }

    fn emit<F: FnMut(Update)>(&self, events: Vec<Event>, force: bool, on_update: &mut F) {
        if events.is_empty() && !force {
            return;
        }
        on_update(Update {
            now_ms: self.now_ms(),
            events,
            screen: self.screen(),
        });
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn tick(interval: Option<&mut time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::{InProcessRegistrar, UnavailableRegistrar};
    use crate::lifecycle::AppState;
    use crate::notify::MemoryNotifier;
    use crate::timer::{MonitorState, TimerSetting};

    fn runtime(minutes: u32, notifier: &MemoryNotifier) -> Runtime {
        let controller = Controller::new(
            TimerSetting::new(minutes).unwrap(),
            Box::new(notifier.clone()),
            0,
        )
        .with_seed(9);
        Runtime::new(controller)
    }

    #[tokio::test(start_paused = true)]
    async fn five_minutes_of_real_time_raise_alert() {
        let notifier = MemoryNotifier::new(PermissionStatus::Granted);
        let mut rt = runtime(5, &notifier);
        assert_eq!(
            rt.setup(&mut InProcessRegistrar::new(), &BackgroundOptions::default()),
            PermissionStatus::Granted
        );

        let (tx, rx) = mpsc::channel(8);
        let mut updates = Vec::new();
        let (controller, ()) = tokio::join!(rt.run(rx, |u| updates.push(u)), async move {
            tx.send(Command::Start).await.unwrap();
            time::sleep(Duration::from_secs(301)).await;
            tx.send(Command::Quit).await.unwrap();
        });

        assert_eq!(controller.state(), MonitorState::Alerting);
        assert_eq!(notifier.sent().len(), 1);
        assert!(updates
            .iter()
            .any(|u| matches!(u.screen, Screen::Alert { .. })));
        assert_eq!(controller.next_due_ms(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn movement_keeps_alert_away() {
        let notifier = MemoryNotifier::new(PermissionStatus::Granted);
        let mut rt = runtime(5, &notifier);
        rt.setup(&mut InProcessRegistrar::new(), &BackgroundOptions::default());

        let (tx, rx) = mpsc::channel(8);
        let (controller, ()) = tokio::join!(rt.run(rx, |_| {}), async move {
            tx.send(Command::Start).await.unwrap();
            for _ in 0..3 {
                time::sleep(Duration::from_secs(200)).await;
                tx.send(Command::Move).await.unwrap();
            }
            tx.send(Command::Quit).await.unwrap();
        });

        assert_eq!(controller.state(), MonitorState::Monitoring);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn background_check_notifies_while_backgrounded() {
        let notifier = MemoryNotifier::new(PermissionStatus::Granted);
        let mut rt = runtime(5, &notifier);
        rt.setup(&mut InProcessRegistrar::new(), &BackgroundOptions::default());

        let (tx, rx) = mpsc::channel(8);
        let (controller, ()) = tokio::join!(rt.run(rx, |_| {}), async move {
            tx.send(Command::AppState(AppState::Background)).await.unwrap();
            time::sleep(Duration::from_secs(370)).await;
            tx.send(Command::Quit).await.unwrap();
        });

        // Checks at 60..=360 s; only 360 s is past the 5 minute threshold.
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(controller.state(), MonitorState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_registration_still_runs_foreground_timer() {
        let notifier = MemoryNotifier::new(PermissionStatus::Granted);
        let mut rt = runtime(5, &notifier);
        rt.setup(&mut UnavailableRegistrar, &BackgroundOptions::default());

        let (tx, rx) = mpsc::channel(8);
        let (controller, ()) = tokio::join!(rt.run(rx, |_| {}), async move {
            tx.send(Command::Start).await.unwrap();
            time::sleep(Duration::from_secs(301)).await;
            drop(tx);
        });

        assert_eq!(controller.state(), MonitorState::Alerting);
    }

    #[tokio::test(start_paused = true)]
    async fn status_always_reports_screen() {
        let notifier = MemoryNotifier::new(PermissionStatus::Granted);
        let mut rt = runtime(15, &notifier);
        rt.setup(&mut InProcessRegistrar::new(), &BackgroundOptions::default());

        let (tx, rx) = mpsc::channel(8);
        let mut updates = Vec::new();
        tokio::join!(rt.run(rx, |u| updates.push(u)), async move {
            tx.send(Command::Status).await.unwrap();
            tx.send(Command::Quit).await.unwrap();
        });

        assert_eq!(updates.len(), 1);
        assert!(updates[0].events.is_empty());
        assert!(matches!(updates[0].screen, Screen::Home { .. }));
    }
}
