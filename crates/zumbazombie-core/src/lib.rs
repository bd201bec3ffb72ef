//! # Zumba Zombie Core Library
//!
//! Business logic for the Zumba Zombie inactivity reminder. Sit still for too
//! long and the countdown turns you into a zombie: an alert suggests a
//! movement and pays out zompoints when you do it.
//!
//! ## Architecture
//!
//! - **Monitor Engine**: A tick-driven state machine (idle, monitoring,
//!   alerting) with no clock of its own
//! - **Controller**: Owns the engine, a scheduled-event queue, the activity
//!   RNG and the notifier; every stimulus goes through it
//! - **Runtime**: Single-threaded tokio driver that feeds the controller real
//!   time, user commands and background checks
//! - **Storage**: TOML-based configuration (points are never persisted)
//!
//! ## Key Components
//!
//! - [`MonitorEngine`]: Core monitoring state machine
//! - [`Controller`]: Stimulus entry point and timer queue
//! - [`Runtime`]: Real-time driver
//! - [`Config`]: Application configuration management
//! - [`Notifier`]: Trait for alert delivery

pub mod activity;
pub mod background;
pub mod command;
pub mod controller;
pub mod error;
pub mod events;
pub mod format;
pub mod ledger;
pub mod lifecycle;
pub mod notify;
pub mod runtime;
pub mod storage;
pub mod timer;
pub mod view;

pub use activity::{Activity, Catalog};
pub use background::{BackgroundOptions, BackgroundRegistrar, FetchResult};
pub use command::Command;
pub use controller::Controller;
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::{AlertTrigger, Event};
pub use ledger::PointsLedger;
pub use lifecycle::{AppState, CameraFacing};
pub use notify::{LogNotifier, MemoryNotifier, Notification, Notifier, PermissionStatus};
pub use runtime::{Runtime, Update};
pub use storage::Config;
pub use timer::{MonitorEngine, MonitorState, TimerSetting};
pub use view::Screen;
