//! Reminder notifications.
//!
//! # Responsibility
//! - Decide when reminders fire and suppress duplicates (`engine`).
//! - Drive the engine on a fixed interval off the control thread (`timer`).
//!
//! # Invariants
//! - Reminder evaluation reads event snapshots and never mutates events.

pub mod clock;
pub mod engine;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{is_due, ReminderEngine, ReminderNotice};
pub use timer::{check_feed, ReminderTimer, DEFAULT_REMINDER_INTERVAL};
