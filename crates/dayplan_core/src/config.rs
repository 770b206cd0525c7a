//! Runtime configuration for the scheduler core.
//!
//! # Responsibility
//! - Resolve the data directory and the reminder polling interval.
//! - Carry the injected clock used by reminder checks.
//!
//! # Invariants
//! - A `None` reminder interval means no background timer is started.
//! - Environment parsing never panics; bad values surface as `ConfigError`.

use crate::reminder::{Clock, SystemClock, DEFAULT_REMINDER_INTERVAL};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const DATA_DIR_ENV: &str = "DAYPLAN_DATA_DIR";
pub const REMINDER_SECS_ENV: &str = "DAYPLAN_REMINDER_SECS";

const APP_DIR_NAME: &str = "dayplan";
const LOG_DIR_NAME: &str = "logs";

/// Configuration resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No data directory given and the platform has no default.
    MissingDataDir,
    /// `DAYPLAN_REMINDER_SECS` is not a non-negative integer.
    InvalidReminderInterval(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDataDir => write!(
                f,
                "no data directory configured; set {DATA_DIR_ENV}"
            ),
            Self::InvalidReminderInterval(value) => write!(
                f,
                "invalid {REMINDER_SECS_ENV} value `{value}`; expected whole seconds"
            ),
        }
    }
}

impl Error for ConfigError {}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings consumed by `Scheduler::open`.
#[derive(Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub reminder_interval: Option<Duration>,
    pub clock: Arc<dyn Clock>,
}

impl CoreConfig {
    /// Config rooted at `data_dir` with the default interval and system clock.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            reminder_interval: Some(DEFAULT_REMINDER_INTERVAL),
            clock: Arc::new(SystemClock),
        }
    }

    /// Reads `DAYPLAN_DATA_DIR` and `DAYPLAN_REMINDER_SECS`.
    ///
    /// # Errors
    /// - `MissingDataDir` when neither the variable nor a platform default exists.
    /// - `InvalidReminderInterval` when the interval is not an integer.
    pub fn from_env() -> ConfigResult<Self> {
        let data_dir = std::env::var(DATA_DIR_ENV).ok();
        let reminder_secs = std::env::var(REMINDER_SECS_ENV).ok();
        Self::from_values(data_dir.as_deref(), reminder_secs.as_deref())
    }

    /// Resolves config from raw optional values; blank values count as absent.
    pub fn from_values(data_dir: Option<&str>, reminder_secs: Option<&str>) -> ConfigResult<Self> {
        let data_dir = match data_dir.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => PathBuf::from(value),
            None => default_data_dir().ok_or(ConfigError::MissingDataDir)?,
        };

        let config = Self::new(data_dir);
        match reminder_secs.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => {
                let secs = value
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidReminderInterval(value.to_string()))?;
                Ok(config.with_reminder_interval(Duration::from_secs(secs)))
            }
            None => Ok(config),
        }
    }

    /// Sets the timer interval; a zero duration disables the timer.
    pub fn with_reminder_interval(mut self, interval: Duration) -> Self {
        self.reminder_interval = (!interval.is_zero()).then_some(interval);
        self
    }

    pub fn without_reminder_timer(mut self) -> Self {
        self.reminder_interval = None;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `<data_dir>/logs`.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("data_dir", &self.data_dir)
            .field("reminder_interval", &self.reminder_interval)
            .finish_non_exhaustive()
    }
}

/// Platform data directory joined with `dayplan`.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::reminder::DEFAULT_REMINDER_INTERVAL;
    use std::path::Path;
    use std::time::Duration;

    #[test]
    fn explicit_values_override_defaults() {
        let config =
            CoreConfig::from_values(Some("/tmp/dayplan-test"), Some("5")).expect("valid config");
        assert_eq!(config.data_dir(), Path::new("/tmp/dayplan-test"));
        assert_eq!(config.reminder_interval, Some(Duration::from_secs(5)));
        assert_eq!(config.log_dir(), Path::new("/tmp/dayplan-test/logs"));
    }

    #[test]
    fn zero_interval_disables_timer() {
        let config = CoreConfig::from_values(Some("/tmp/dayplan-test"), Some("0"))
            .expect("valid config");
        assert_eq!(config.reminder_interval, None);
    }

    #[test]
    fn missing_interval_uses_default() {
        let config =
            CoreConfig::from_values(Some("/tmp/dayplan-test"), Some("  ")).expect("valid config");
        assert_eq!(config.reminder_interval, Some(DEFAULT_REMINDER_INTERVAL));
    }

    #[test]
    fn non_numeric_interval_is_rejected() {
        let error = CoreConfig::from_values(Some("/tmp/dayplan-test"), Some("soon"))
            .expect_err("interval must be numeric");
        assert_eq!(
            error,
            ConfigError::InvalidReminderInterval("soon".to_string())
        );
    }
}
