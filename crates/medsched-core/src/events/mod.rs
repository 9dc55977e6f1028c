//! Unified scheduling event system.

mod broadcaster;
mod hooks;
mod types;

pub use broadcaster::EventBroadcaster;
pub use hooks::{HookError, SchedulingHook, spawn_hook};
pub use types::{EventEnvelope, SchedulingEvent};
