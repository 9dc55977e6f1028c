pub mod appointment;
pub mod error;
pub mod events;
pub mod id;
pub mod person;
pub mod slot;
pub mod time;

pub use appointment::{Appointment, AppointmentStatus};
pub use error::{CoreError, ErrorCategory, Result};
pub use events::{EventBroadcaster, EventEnvelope, SchedulingEvent, SchedulingHook, spawn_hook};
pub use id::{generate_id, parse_id};
pub use person::{Person, Role};
pub use slot::{Slot, TimeRange};
pub use time::now_utc;
