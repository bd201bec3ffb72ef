//! Local alert delivery.
//!
//! Real push delivery lives outside this crate. The [`Notifier`] trait is the
//! seam; [`LogNotifier`] reports through `tracing` and [`MemoryNotifier`]
//! records what was sent.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{CoreError, Result};

pub const ALERT_TITLE: &str = "🧟‍♂️ ZOMBIE ALERT! 🧟‍♀️";
pub const ALERT_BODY: &str = "You're turning into a zombie! Time to move and stay alive!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    #[default]
    Undetermined,
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// The fixed inactivity alert.
    pub fn zombie_alert() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: ALERT_TITLE.to_string(),
            body: ALERT_BODY.to_string(),
            created_at: Utc::now(),
        }
    }
}

pub trait Notifier {
    /// Ask once. Callers do not retry on `Denied`.
    fn request_permission(&mut self) -> PermissionStatus;

    fn notify(&mut self, notification: &Notification) -> Result<()>;
}

/// Emits notifications as `tracing` events.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    permission: PermissionStatus,
}

impl LogNotifier {
    /// `enabled = false` behaves like a user who declined the prompt.
    pub fn new(enabled: bool) -> Self {
        Self {
            permission: if enabled {
                PermissionStatus::Granted
            } else {
                PermissionStatus::Denied
            },
        }
    }
}

impl Notifier for LogNotifier {
    fn request_permission(&mut self) -> PermissionStatus {
        self.permission
    }

    fn notify(&mut self, notification: &Notification) -> Result<()> {
        if self.permission != PermissionStatus::Granted {
            return Err(CoreError::Notification("permission not granted".into()));
        }
        info!(
            id = %notification.id,
            title = %notification.title,
            body = %notification.body,
            "notification"
        );
        Ok(())
    }
}

/// Records sent notifications. Clones share the same outbox.
#[derive(Debug, Clone)]
pub struct MemoryNotifier {
    permission: PermissionStatus,
    fail_delivery: bool,
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub fn new(permission: PermissionStatus) -> Self {
        Self {
            permission,
            fail_delivery: false,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every `notify` call errors.
    pub fn failing(mut self) -> Self {
        self.fail_delivery = true;
        self
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn request_permission(&mut self) -> PermissionStatus {
        self.permission
    }

    fn notify(&mut self, notification: &Notification) -> Result<()> {
        if self.fail_delivery {
            return Err(CoreError::Notification("delivery failed".into()));
        }
        self.sent
            .lock()
            .map_err(|e| CoreError::Notification(e.to_string()))?
            .push(notification.clone());
        Ok(())
    }
}
