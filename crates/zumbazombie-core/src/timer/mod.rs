mod engine;
mod queue;
mod setting;

pub use engine::{MonitorEngine, MonitorState, TICK_MS};
pub use queue::{EventQueue, Scheduled, ScheduledKind};
pub use setting::TimerSetting;
