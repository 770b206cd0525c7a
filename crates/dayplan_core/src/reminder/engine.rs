//! Reminder firing rules and duplicate suppression.
//!
//! # Responsibility
//! - Decide which events are inside their reminder window at `now`.
//! - Remember which (event id, start) pairs already fired.
//!
//! # Invariants
//! - An event fires iff `start - offset <= now < start`.
//! - Each (event id, start) pair fires at most once per process, per profile.
//! - Notified state is in-memory only and never persisted.
//! - Editing `start` produces a new pair and re-arms the reminder; edits that
//!   keep `start` do not.
//! - A forgotten (deleted) profile never fires again, even from a snapshot
//!   taken before its deletion was published.

use crate::model::event::{Event, EventId, Priority, ReminderOffset};
use crate::model::profile::ProfileId;
use chrono::NaiveDateTime;
use log::{debug, info};
use std::collections::{HashMap, HashSet};

const START_DISPLAY_FORMAT: &str = "%b %-d, %Y %-I:%M %p";
const LOCATION_PLACEHOLDER: &str = "Not specified";

type NotifiedPair = (EventId, NaiveDateTime);

/// One fired reminder, carrying what the presentation layer shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderNotice {
    pub profile_id: ProfileId,
    pub event_id: EventId,
    pub title: String,
    pub start: NaiveDateTime,
    pub location: String,
    pub priority: Priority,
    pub offset: ReminderOffset,
}

impl ReminderNotice {
    fn from_event(profile_id: ProfileId, event: &Event) -> Self {
        Self {
            profile_id,
            event_id: event.id(),
            title: event.title.clone(),
            start: event.start,
            location: event.location.clone(),
            priority: event.priority,
            offset: event.reminder,
        }
    }

    /// Start formatted like `Jun 10, 2024 9:00 AM`.
    pub fn formatted_start(&self) -> String {
        self.start.format(START_DISPLAY_FORMAT).to_string()
    }

    /// Location, or a placeholder when blank.
    pub fn location_label(&self) -> &str {
        if self.location.trim().is_empty() {
            LOCATION_PLACEHOLDER
        } else {
            self.location.as_str()
        }
    }

    /// Multi-line reminder body.
    pub fn message(&self) -> String {
        format!(
            "Event: {}\nTime: {}\nLocation: {}",
            self.title,
            self.formatted_start(),
            self.location_label()
        )
    }
}

/// Returns whether `event` is inside its reminder window at `now`.
pub fn is_due(event: &Event, now: NaiveDateTime) -> bool {
    match event.reminder_trigger() {
        Some(trigger) => trigger <= now && now < event.start,
        None => false,
    }
}

/// Tracks notified pairs per profile.
#[derive(Debug, Default)]
pub struct ReminderEngine {
    notified: HashMap<ProfileId, HashSet<NotifiedPair>>,
    retired: HashSet<ProfileId>,
}

impl ReminderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one tick over a profile's events.
    ///
    /// Returned notices are ordered by start, then priority, then title.
    pub fn tick(
        &mut self,
        profile_id: ProfileId,
        events: &[Event],
        now: NaiveDateTime,
    ) -> Vec<ReminderNotice> {
        if self.retired.contains(&profile_id) {
            debug!(
                "event=reminder_tick module=reminder status=skipped reason=profile_deleted profile_id={}",
                profile_id
            );
            return Vec::new();
        }
        let notified = self.notified.entry(profile_id).or_default();
        let mut due: Vec<&Event> = events
            .iter()
            .filter(|event| is_due(event, now))
            .filter(|event| !notified.contains(&(event.id(), event.start)))
            .collect();
        due.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(a.priority.rank().cmp(&b.priority.rank()))
                .then_with(|| a.title.cmp(&b.title))
        });

        let notices: Vec<ReminderNotice> = due
            .into_iter()
            .map(|event| {
                notified.insert((event.id(), event.start));
                ReminderNotice::from_event(profile_id, event)
            })
            .collect();

        if !notices.is_empty() {
            info!(
                "event=reminder_tick module=reminder status=ok profile_id={} fired={}",
                profile_id,
                notices.len()
            );
        }
        notices
    }

    pub fn is_notified(
        &self,
        profile_id: ProfileId,
        event_id: EventId,
        start: NaiveDateTime,
    ) -> bool {
        self.notified
            .get(&profile_id)
            .is_some_and(|pairs| pairs.contains(&(event_id, start)))
    }

    /// Total notified pairs across all profiles.
    pub fn notified_count(&self) -> usize {
        self.notified.values().map(HashSet::len).sum()
    }

    /// Drops suppression state for a deleted profile and stops it firing.
    pub fn forget_profile(&mut self, profile_id: ProfileId) {
        self.notified.remove(&profile_id);
        self.retired.insert(profile_id);
    }

    pub fn is_retired(&self, profile_id: ProfileId) -> bool {
        self.retired.contains(&profile_id)
    }
}
