//! Core domain logic for the dayplan scheduler.
//! Profiles, per-profile event storage and reminders live here; front ends
//! talk to the `Scheduler` facade.

pub mod codec;
pub mod config;
pub mod logging;
pub mod model;
pub mod notify;
pub mod registry;
pub mod reminder;
pub mod service;
pub mod storage;
pub mod store;

pub use codec::{decode_events, decode_events_with_report, encode_events, DecodeReport};
pub use config::{default_data_dir, ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_for, logging_status, LoggingError,
};
pub use model::event::{
    parse_date, parse_date_time, parse_time, Accent, Category, Event, EventDraft, EventId,
    EventValidationError, Priority, ReminderOffset,
};
pub use model::profile::{Profile, ProfileId, DEFAULT_PROFILE_NAME};
pub use notify::{CoreNotification, Notifier};
pub use registry::ProfileRegistryError;
pub use reminder::{Clock, ManualClock, ReminderNotice, SystemClock};
pub use service::{Scheduler, SchedulerError, SchedulerResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
