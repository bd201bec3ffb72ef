//! The one owner of monitoring state.
//!
//! Every stimulus (button press, countdown tick, lifecycle change, background
//! check) goes through a `Controller` method. Timer callbacks are entries in
//! an [`EventQueue`] and are delivered by [`Controller::advance_to`], so the
//! whole thing runs on a single thread with virtual or real time alike.

use chrono::Utc;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use tracing::{debug, info, warn};

use crate::activity::Catalog;
use crate::background::{self, FetchResult};
use crate::events::Event;
use crate::lifecycle::{AppState, CameraFacing, Lifecycle};
use crate::notify::{Notification, Notifier, PermissionStatus};
use crate::timer::{EventQueue, MonitorEngine, MonitorState, ScheduledKind, TimerSetting, TICK_MS};

/// How long the "+N Zompoints" overlay stays up.
pub const POINTS_ANIMATION_MS: u64 = 2000;

pub struct Controller {
    engine: MonitorEngine,
    queue: EventQueue,
    catalog: Catalog,
    rng: Mcg128Xsl64,
    notifier: Box<dyn Notifier>,
    permission: PermissionStatus,
    lifecycle: Lifecycle,
    camera: CameraFacing,
    points_animation: Option<u32>,
}

impl Controller {
    pub fn new(setting: TimerSetting, notifier: Box<dyn Notifier>, now_ms: u64) -> Self {
        Self {
            engine: MonitorEngine::new(setting, now_ms),
            queue: EventQueue::new(),
            catalog: Catalog::standard(),
            rng: Mcg128Xsl64::from_entropy(),
            notifier,
            permission: PermissionStatus::Undetermined,
            lifecycle: Lifecycle::new(),
            camera: CameraFacing::default(),
            points_animation: None,
        }
    }

    /// Make activity picks reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mcg128Xsl64::seed_from_u64(seed);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &MonitorEngine {
        &self.engine
    }

    pub fn state(&self) -> MonitorState {
        self.engine.state()
    }

    pub fn permission(&self) -> PermissionStatus {
        self.permission
    }

    pub fn app_state(&self) -> AppState {
        self.lifecycle.current()
    }

    pub fn camera(&self) -> CameraFacing {
        self.camera
    }

    /// Points shown in the overlay, while it is visible.
    pub fn points_animation(&self) -> Option<u32> {
        self.points_animation
    }

    pub fn is_pending(&self, kind: ScheduledKind) -> bool {
        self.queue.is_pending(kind)
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.queue.next_due_ms()
    }

    pub fn snapshot(&self, now_ms: u64) -> Event {
        self.engine.snapshot(now_ms)
    }

    // ── Setup ────────────────────────────────────────────────────────

    /// Ask the notifier once. A denial is final for this launch.
    pub fn request_permission(&mut self) -> PermissionStatus {
        self.permission = self.notifier.request_permission();
        match self.permission {
            PermissionStatus::Granted => info!("notification permission granted"),
            PermissionStatus::Denied => warn!("notification permission denied"),
            PermissionStatus::Undetermined => debug!("notification permission undetermined"),
        }
        self.permission
    }

    // ── Stimuli ──────────────────────────────────────────────────────

    pub fn start(&mut self, now_ms: u64) -> Vec<Event> {
        let mut out = Vec::new();
        if let Some(event) = self.engine.start(now_ms) {
            info!(minutes = self.engine.setting().minutes(), "monitoring started");
            self.restart_countdown(now_ms);
            out.push(event);
        }
        self.record(out)
    }

    pub fn stop(&mut self, _now_ms: u64) -> Vec<Event> {
        let mut out = Vec::new();
        if let Some(event) = self.engine.stop() {
            info!("monitoring stopped");
            self.queue.cancel_kind(ScheduledKind::CountdownTick);
            out.push(event);
        }
        self.record(out)
    }

    pub fn signal_movement(&mut self, now_ms: u64) -> Vec<Event> {
        let mut out = Vec::new();
        if let Some(event) = self.engine.signal_movement(now_ms) {
            debug!("movement signaled");
            self.restart_countdown(now_ms);
            out.push(event);
        }
        self.record(out)
    }

    pub fn set_timer(&mut self, setting: TimerSetting, now_ms: u64) -> Vec<Event> {
        let mut out = Vec::new();
        if let Some(event) = self.engine.set_setting(setting) {
            info!(minutes = setting.minutes(), "timer setting changed");
            if self.engine.state() == MonitorState::Monitoring {
                self.restart_countdown(now_ms);
            }
            out.push(event);
        }
        self.record(out)
    }

    pub fn change_activity(&mut self, _now_ms: u64) -> Vec<Event> {
        let mut out = Vec::new();
        if let Some(event) = self.engine.change_activity(&self.catalog, &mut self.rng) {
            out.push(event);
        }
        self.record(out)
    }

    pub fn complete_activity(&mut self, now_ms: u64) -> Vec<Event> {
        let mut out = Vec::new();
        if let Some(event) = self.engine.complete_activity(now_ms) {
            if let Event::ActivityCompleted {
                points_awarded,
                total_points,
                ..
            } = &event
            {
                info!(points = points_awarded, total = total_points, "activity completed");
                self.points_animation = Some(*points_awarded);
            }
            self.queue.cancel_kind(ScheduledKind::HidePointsAnimation);
            self.queue
                .schedule(now_ms + POINTS_ANIMATION_MS, ScheduledKind::HidePointsAnimation);
            if self.engine.state() == MonitorState::Monitoring {
                self.restart_countdown(now_ms);
            }
            out.push(event);
        }
        self.record(out)
    }

    pub fn switch_camera(&mut self) -> Vec<Event> {
        self.camera = self.camera.toggled();
        let event = Event::CameraSwitched {
            facing: self.camera,
            at: Utc::now(),
        };
        self.record(vec![event])
    }

    /// Feed an OS lifecycle change.
    ///
    /// The countdown is suspended while the app is not in the foreground. On
    /// re-entry an overdue user goes straight to the alert; otherwise the
    /// countdown resumes where it left off.
    pub fn set_app_state(&mut self, next: AppState, now_ms: u64) -> Vec<Event> {
        let Some(transition) = self.lifecycle.transition(next) else {
            return Vec::new();
        };
        let mut out = vec![Event::AppStateChanged {
            from: transition.from,
            to: transition.to,
            at: Utc::now(),
        }];

        if !next.is_foreground() {
            self.queue.cancel_kind(ScheduledKind::CountdownTick);
        } else if transition.is_reentry() {
            if self.engine.is_overdue(now_ms) {
                if let Some(alert) = self.engine.force_alert(&self.catalog, &mut self.rng) {
                    info!(
                        since_movement_ms = self.engine.since_movement_ms(now_ms),
                        "overdue on foreground re-entry"
                    );
                    self.queue.cancel_kind(ScheduledKind::CountdownTick);
                    out.push(alert);
                    out.extend(self.send_alert());
                }
            } else if self.engine.state() == MonitorState::Monitoring
                && !self.queue.is_pending(ScheduledKind::CountdownTick)
            {
                self.queue.schedule(now_ms + TICK_MS, ScheduledKind::CountdownTick);
            }
        }
        self.record(out)
    }

    /// Deliver every scheduled entry due at or before `now_ms`.
    pub fn advance_to(&mut self, now_ms: u64) -> Vec<Event> {
        let mut out = Vec::new();
        while let Some(due) = self.queue.pop_due(now_ms) {
            match due.kind {
                ScheduledKind::CountdownTick => {
                    if let Some(alert) = self.engine.tick(&self.catalog, &mut self.rng) {
                        info!("countdown reached zero");
                        out.push(alert);
                        out.extend(self.send_alert());
                    } else if self.engine.state() == MonitorState::Monitoring {
                        self.queue
                            .schedule(due.due_ms + TICK_MS, ScheduledKind::CountdownTick);
                    }
                }
                ScheduledKind::HidePointsAnimation => {
                    self.points_animation = None;
                    out.push(Event::PointsAnimationHidden { at: Utc::now() });
                }
            }
        }
        self.record(out)
    }

    /// Periodic background check. Never changes monitoring state.
    pub fn background_check(&mut self, now_ms: u64) -> (FetchResult, Vec<Event>) {
        let result = background::check(
            self.engine.last_movement_ms(),
            self.engine.setting(),
            now_ms,
        );
        debug!(?result, "background check");
        let out = match result {
            FetchResult::NewData => self.send_alert(),
            FetchResult::NoData => Vec::new(),
        };
        (result, self.record(out))
    }

    /// Teardown: nothing scheduled fires after this.
    pub fn shutdown(&mut self) {
        self.queue.clear();
        debug!("controller shut down");
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn restart_countdown(&mut self, now_ms: u64) {
        self.queue.cancel_kind(ScheduledKind::CountdownTick);
        if self.lifecycle.current().is_foreground() {
            self.queue.schedule(now_ms + TICK_MS, ScheduledKind::CountdownTick);
        }
    }

    fn send_alert(&mut self) -> Vec<Event> {
        if self.permission != PermissionStatus::Granted {
            debug!(permission = ?self.permission, "alert not sent");
            return Vec::new();
        }
        let notification = Notification::zombie_alert();
        match self.notifier.notify(&notification) {
            Ok(()) => vec![Event::NotificationSent {
                title: notification.title,
                body: notification.body,
                at: notification.created_at,
            }],
            Err(e) => {
                warn!(error = %e, "failed to deliver notification");
                Vec::new()
            }
        }
    }

    fn record(&self, events: Vec<Event>) -> Vec<Event> {
        for event in &events {
            debug!(kind = event.kind(), "event");
        }
        events
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("engine", &self.engine)
            .field("queue", &self.queue)
            .field("permission", &self.permission)
            .field("lifecycle", &self.lifecycle)
            .field("camera", &self.camera)
            .field("points_animation", &self.points_animation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;

    fn controller(minutes: u32) -> (Controller, MemoryNotifier) {
        let notifier = MemoryNotifier::new(PermissionStatus::Granted);
        let mut c = Controller::new(
            TimerSetting::new(minutes).unwrap(),
            Box::new(notifier.clone()),
            0,
        )
        .with_seed(42);
        c.request_permission();
        (c, notifier)
    }

    #[test]
    fn start_arms_one_tick() {
        let (mut c, _) = controller(5);
        c.start(0);
        assert!(c.is_pending(ScheduledKind::CountdownTick));
        assert_eq!(c.next_due_ms(), Some(1_000));
    }

    #[test]
    fn each_second_delivers_one_tick() {
        let (mut c, _) = controller(5);
        c.start(0);
        c.advance_to(10_000);
        assert_eq!(c.engine().remaining_ms(), 290_000);
        c.advance_to(10_500);
        assert_eq!(c.engine().remaining_ms(), 290_000);
    }

    #[test]
    fn stop_cancels_ticks() {
        let (mut c, _) = controller(5);
        c.start(0);
        c.advance_to(3_000);
        c.stop(3_000);
        assert!(!c.is_pending(ScheduledKind::CountdownTick));
        c.advance_to(600_000);
        assert_eq!(c.state(), MonitorState::Idle);
    }

    #[test]
    fn movement_realigns_tick_phase() {
        let (mut c, _) = controller(5);
        c.start(0);
        c.advance_to(2_500);
        c.signal_movement(2_500);
        assert_eq!(c.next_due_ms(), Some(3_500));
        assert_eq!(c.engine().remaining_ms(), 300_000);
    }

    #[test]
    fn countdown_alert_sends_notification() {
        let (mut c, notifier) = controller(5);
        c.start(0);
        let events = c.advance_to(300_000);
        assert_eq!(c.state(), MonitorState::Alerting);
        assert!(events.iter().any(|e| e.kind() == "alert_raised"));
        assert!(events.iter().any(|e| e.kind() == "notification_sent"));
        assert_eq!(notifier.sent().len(), 1);
        assert!(!c.is_pending(ScheduledKind::CountdownTick));
    }

    #[test]
    fn denied_permission_suppresses_notification() {
        let notifier = MemoryNotifier::new(PermissionStatus::Denied);
        let mut c = Controller::new(TimerSetting::new(5).unwrap(), Box::new(notifier.clone()), 0);
        assert_eq!(c.request_permission(), PermissionStatus::Denied);
        c.start(0);
        c.advance_to(300_000);
        assert_eq!(c.state(), MonitorState::Alerting);
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn delivery_failure_does_not_block_alert() {
        let notifier = MemoryNotifier::new(PermissionStatus::Granted).failing();
        let mut c = Controller::new(TimerSetting::new(5).unwrap(), Box::new(notifier), 0);
        c.request_permission();
        c.start(0);
        let events = c.advance_to(300_000);
        assert_eq!(c.state(), MonitorState::Alerting);
        assert!(!events.iter().any(|e| e.kind() == "notification_sent"));
    }

    #[test]
    fn points_animation_hides_after_two_seconds() {
        let (mut c, _) = controller(5);
        c.start(0);
        c.advance_to(300_000);
        let worth = c.engine().activity().unwrap().points;
        c.complete_activity(300_000);
        assert_eq!(c.points_animation(), Some(worth));
        c.advance_to(301_999);
        assert_eq!(c.points_animation(), Some(worth));
        let events = c.advance_to(302_000);
        assert_eq!(c.points_animation(), None);
        assert!(events.iter().any(|e| e.kind() == "points_animation_hidden"));
    }

    #[test]
    fn background_suspends_and_reentry_resumes() {
        let (mut c, _) = controller(5);
        c.start(0);
        c.advance_to(10_000);
        c.set_app_state(AppState::Background, 10_000);
        assert!(!c.is_pending(ScheduledKind::CountdownTick));
        c.advance_to(60_000);
        assert_eq!(c.engine().remaining_ms(), 290_000);

        let events = c.set_app_state(AppState::Active, 60_000);
        assert_eq!(events.len(), 1);
        assert_eq!(c.state(), MonitorState::Monitoring);
        assert_eq!(c.next_due_ms(), Some(61_000));
    }

    #[test]
    fn overdue_reentry_forces_alert() {
        let (mut c, notifier) = controller(5);
        c.start(0);
        c.set_app_state(AppState::Background, 1_000);
        let events = c.set_app_state(AppState::Active, 400_000);
        assert_eq!(c.state(), MonitorState::Alerting);
        assert_eq!(c.engine().remaining_ms(), 0);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::AlertRaised {
                trigger: crate::events::AlertTrigger::ForegroundCheck,
                ..
            }
        )));
        assert_eq!(notifier.sent().len(), 1);
    }

    #[test]
    fn background_check_notifies_without_state_change() {
        let (mut c, notifier) = controller(5);
        c.set_app_state(AppState::Background, 0);
        let (result, _) = c.background_check(60_000);
        assert_eq!(result, FetchResult::NoData);
        let (result, events) = c.background_check(360_000);
        assert_eq!(result, FetchResult::NewData);
        assert_eq!(events.len(), 1);
        assert_eq!(c.state(), MonitorState::Idle);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[test]
    fn camera_switch_toggles() {
        let (mut c, _) = controller(5);
        c.switch_camera();
        assert_eq!(c.camera(), CameraFacing::Back);
    }

    #[test]
    fn shutdown_clears_queue() {
        let (mut c, _) = controller(5);
        c.start(0);
        c.shutdown();
        assert_eq!(c.next_due_ms(), None);
        c.advance_to(1_000_000);
        assert_eq!(c.state(), MonitorState::Monitoring);
        assert_eq!(c.engine().remaining_ms(), 300_000);
    }
}
