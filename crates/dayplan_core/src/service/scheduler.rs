//! Scheduler use-case facade.
//!
//! # Responsibility
//! - Provide the command surface used by presentation layers.
//! - Own the save queue, the profile registry, the active event store and the
//!   reminder machinery, and tie their lifecycles together.
//!
//! # Invariants
//! - Drafts are validated here, before any store mutation.
//! - A profile switch and the matching store reload happen as one command.
//! - Reminder notices reach listeners only on the thread that calls
//!   `check_reminders` or `dispatch_reminders`.
//! - `shutdown` stops the timer before draining pending writes.

use crate::config::{ConfigError, CoreConfig};
use crate::model::event::{Event, EventDraft, EventId, EventValidationError};
use crate::model::profile::{Profile, ProfileId};
use crate::notify::{CoreNotification, Notifier};
use crate::registry::{ProfileRegistry, ProfileRegistryError};
use crate::reminder::{check_feed, Clock, ReminderEngine, ReminderNotice, ReminderTimer};
use crate::storage::{DataLayout, SaveQueue};
use crate::store::EventStore;
use chrono::NaiveDate;
use crossbeam_channel as chan;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

/// Errors returned by scheduler commands.
#[derive(Debug)]
pub enum SchedulerError {
    /// Draft rejected at the edit boundary.
    Validation(EventValidationError),
    /// Profile command rejected by the registry.
    Profile(ProfileRegistryError),
    /// Configuration could not be resolved.
    Config(ConfigError),
    /// A worker thread could not be started.
    Io(io::Error),
}

impl Display for SchedulerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Profile(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "scheduler startup failed: {err}"),
        }
    }
}

impl Error for SchedulerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Profile(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<EventValidationError> for SchedulerError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ProfileRegistryError> for SchedulerError {
    fn from(value: ProfileRegistryError) -> Self {
        Self::Profile(value)
    }
}

impl From<ConfigError> for SchedulerError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<io::Error> for SchedulerError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Day planner core: profiles, events and reminders behind one handle.
pub struct Scheduler {
    notifier: Notifier,
    registry: ProfileRegistry,
    store: EventStore,
    engine: Arc<Mutex<ReminderEngine>>,
    clock: Arc<dyn Clock>,
    timer: Option<ReminderTimer>,
    fired_rx: chan::Receiver<ReminderNotice>,
    save_queue: SaveQueue,
    closed: bool,
}

impl Scheduler {
    /// Loads profiles and the active profile's events, then starts workers.
    ///
    /// An unwritable data directory is logged and the session continues
    /// in memory.
    ///
    /// # Errors
    /// - `Io` when the save or reminder thread cannot be spawned.
    pub fn open(config: CoreConfig) -> SchedulerResult<Self> {
        let layout = DataLayout::new(config.data_dir.clone());
        layout.ensure_root();

        let save_queue = SaveQueue::start()?;
        let notifier = Notifier::new();
        let registry = ProfileRegistry::load(layout.clone(), save_queue.handle(), notifier.clone());
        let store = EventStore::open(
            registry.active_id(),
            layout,
            save_queue.handle(),
            notifier.clone(),
        );

        let engine = Arc::new(Mutex::new(ReminderEngine::new()));
        let (fired_tx, fired_rx) = chan::unbounded::<ReminderNotice>();
        let timer = match config.reminder_interval {
            Some(interval) => Some(ReminderTimer::start(
                interval,
                store.feed(),
                Arc::clone(&engine),
                Arc::clone(&config.clock),
                fired_tx,
            )?),
            None => None,
        };

        info!(
            "event=scheduler_open module=service status=ok profiles={} active_id={} events={} reminder_timer={}",
            registry.len(),
            registry.active_id(),
            store.len(),
            timer.is_some()
        );

        Ok(Self {
            notifier,
            registry,
            store,
            engine,
            clock: config.clock,
            timer,
            fired_rx,
            save_queue,
            closed: false,
        })
    }

    /// Registers a listener for every future notification.
    pub fn add_listener(&self, listener: impl Fn(&CoreNotification) + Send + Sync + 'static) {
        self.notifier.subscribe(listener);
    }

    // Events (active profile)

    /// Validates and stores a new event.
    ///
    /// # Errors
    /// - `Validation` when the draft is rejected; nothing is stored.
    pub fn create_event(&mut self, draft: EventDraft) -> SchedulerResult<EventId> {
        draft.validate()?;
        Ok(self.store.add(draft))
    }

    /// Replaces the editable fields of an existing event.
    ///
    /// Returns `Ok(false)` when `id` is unknown.
    ///
    /// # Errors
    /// - `Validation` when the draft is rejected; the event is unchanged.
    pub fn edit_event(&mut self, id: EventId, draft: &EventDraft) -> SchedulerResult<bool> {
        draft.validate()?;
        Ok(self.store.update(id, |event| draft.apply_to(event)))
    }

    /// Returns `false` when `id` is unknown.
    pub fn delete_event(&mut self, id: EventId) -> bool {
        self.store.remove(id)
    }

    pub fn event(&self, id: EventId) -> Option<Event> {
        self.store.get(id).cloned()
    }

    pub fn query_by_date(&self, date: NaiveDate) -> Vec<Event> {
        self.store.by_date(date)
    }

    pub fn events_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<Event> {
        self.store.between(from, to)
    }

    pub fn search(&self, text: &str) -> Vec<Event> {
        self.store.search(text)
    }

    pub fn all_events(&self) -> Vec<Event> {
        self.store.all()
    }

    // Profiles

    pub fn profiles(&self) -> &[Profile] {
        self.registry.profiles()
    }

    pub fn active_profile(&self) -> &Profile {
        self.registry.active()
    }

    /// # Errors
    /// - `Profile(InvalidName)` when `name` is blank.
    pub fn create_profile(&mut self, name: &str) -> SchedulerResult<ProfileId> {
        Ok(self.registry.create(name)?)
    }

    /// # Errors
    /// - `Profile(InvalidName)` when `name` is blank.
    pub fn rename_profile(&mut self, id: ProfileId, name: &str) -> SchedulerResult<bool> {
        Ok(self.registry.rename(id, name)?)
    }

    /// Activates `id` and loads its events.
    ///
    /// Returns `false` for unknown ids and the already-active id.
    pub fn switch_profile(&mut self, id: ProfileId) -> bool {
        if !self.registry.switch_to(id) {
            return false;
        }
        self.store.reload(id);
        true
    }

    /// Removes a profile and its events; reloads when the active one went away.
    ///
    /// # Errors
    /// - `Profile(LastProfile)` when only one profile remains.
    pub fn delete_profile(&mut self, id: ProfileId) -> SchedulerResult<bool> {
        let active_changed = self.registry.delete(id)?;
        if active_changed {
            self.store.reload(self.registry.active_id());
        }
        self.engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .forget_profile(id);
        Ok(active_changed)
    }

    // Reminders

    /// Runs one reminder tick inline and notifies listeners of each notice.
    pub fn check_reminders(&self) -> Vec<ReminderNotice> {
        let notices = check_feed(&self.store.feed(), &self.engine, self.clock.now());
        for notice in &notices {
            self.notifier
                .emit(&CoreNotification::ReminderFired(notice.clone()));
        }
        notices
    }

    /// Delivers notices queued by the background timer to listeners.
    ///
    /// Notices for profiles deleted since they were queued are dropped.
    /// Returns the number of notices delivered.
    pub fn dispatch_reminders(&self) -> usize {
        let mut delivered = 0;
        for notice in self.fired_rx.try_iter() {
            if self.registry.get(notice.profile_id).is_none() {
                debug!(
                    "event=reminder_dispatch module=service status=skipped reason=profile_deleted profile_id={}",
                    notice.profile_id
                );
                continue;
            }
            self.notifier.emit(&CoreNotification::ReminderFired(notice));
            delivered += 1;
        }
        delivered
    }

    /// Receiver side of the timer's notice channel, for callers that block on it.
    ///
    /// Notices taken from it bypass `dispatch_reminders`.
    pub fn reminder_receiver(&self) -> chan::Receiver<ReminderNotice> {
        self.fired_rx.clone()
    }

    /// Blocks until queued writes are on disk.
    pub fn flush(&self) -> bool {
        self.save_queue.handle().flush()
    }

    /// Stops the reminder timer and drains pending writes.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(mut timer) = self.timer.take() {
            timer.stop();
        }
        self.save_queue.shutdown();
        info!("event=scheduler_close module=service status=ok");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::{Scheduler, SchedulerError};
    use crate::config::CoreConfig;
    use crate::model::event::{EventDraft, EventValidationError};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn create_event_rejects_end_before_start() {
        let dir = tempdir().expect("temp dir");
        let mut scheduler = Scheduler::open(CoreConfig::new(dir.path()).without_reminder_timer())
            .expect("scheduler should open");
        let day = NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid date");
        let start = day.and_hms_opt(10, 0, 0).expect("valid time");
        let end = day.and_hms_opt(9, 0, 0).expect("valid time");

        let result = scheduler.create_event(EventDraft::new("Backwards", start, end));
        assert!(matches!(
            result,
            Err(SchedulerError::Validation(EventValidationError::EndBeforeStart { .. }))
        ));
        assert!(scheduler.all_events().is_empty());
    }

    #[test]
    fn shutdown_persists_default_profile() {
        let dir = tempdir().expect("temp dir");
        let scheduler = Scheduler::open(CoreConfig::new(dir.path()).without_reminder_timer())
            .expect("scheduler should open");
        scheduler.shutdown();
        assert!(dir.path().join("profiles.json").exists());
    }
}
