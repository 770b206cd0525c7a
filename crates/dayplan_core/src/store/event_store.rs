//! Event store for the active profile.
//!
//! # Responsibility
//! - Provide CRUD and query entry points over one profile's events.
//! - Persist every mutation through the save queue and notify listeners.
//!
//! # Invariants
//! - Memory is updated before the write is enqueued; reads always see the
//!   latest state regardless of write completion.
//! - The enqueued bytes are encoded at mutation time.
//! - Unknown ids on update/remove are silent no-ops: nothing is persisted and
//!   no notification is sent.
//! - End/start ordering is not re-validated here; that belongs to the edit
//!   boundary.

use crate::codec::encode_events;
use crate::model::event::{Event, EventDraft, EventId};
use crate::model::profile::ProfileId;
use crate::notify::{CoreNotification, Notifier};
use crate::storage::event_file::load_events;
use crate::storage::{DataLayout, SaveHandle};
use crate::store::feed::{EventFeed, EventSnapshot};
use chrono::NaiveDate;
use log::{debug, info};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct StoredEvent {
    /// Insertion order; final sort tie-break.
    seq: u64,
    event: Event,
}

/// In-memory event collection bound to one profile's backing file.
pub struct EventStore {
    profile_id: ProfileId,
    layout: DataLayout,
    entries: HashMap<EventId, StoredEvent>,
    next_seq: u64,
    feed: EventFeed,
    saver: SaveHandle,
    notifier: Notifier,
}

impl EventStore {
    /// Loads the profile's events from disk.
    ///
    /// Does not notify; the store is not observable before it exists.
    pub fn open(
        profile_id: ProfileId,
        layout: DataLayout,
        saver: SaveHandle,
        notifier: Notifier,
    ) -> Self {
        let feed = EventFeed::new(EventSnapshot {
            profile_id,
            events: Arc::from(Vec::new()),
        });
        let mut store = Self {
            profile_id,
            layout,
            entries: HashMap::new(),
            next_seq: 0,
            feed,
            saver,
            notifier,
        };
        store.replace_contents(profile_id);
        store
    }

    /// Discards the current collection and loads another profile's file.
    ///
    /// Pending writes are flushed first so a queued save for the target
    /// profile lands before it is read back.
    pub fn reload(&mut self, profile_id: ProfileId) {
        self.saver.flush();
        self.replace_contents(profile_id);
        info!(
            "event=store_reload module=store status=ok profile_id={} events={}",
            profile_id,
            self.entries.len()
        );
        self.notifier.emit(&CoreNotification::EventsChanged);
    }

    pub fn profile_id(&self) -> ProfileId {
        self.profile_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot slot shared with background readers.
    pub fn feed(&self) -> EventFeed {
        self.feed.clone()
    }

    /// Inserts a new event with a freshly generated id.
    ///
    /// The draft is assumed validated by the caller.
    pub fn add(&mut self, draft: EventDraft) -> EventId {
        let event = draft.into_event();
        let id = event.id();
        let seq = self.take_seq();
        self.entries.insert(id, StoredEvent { seq, event });
        debug!(
            "event=event_add module=store status=ok profile_id={} event_id={}",
            self.profile_id, id
        );
        self.commit();
        id
    }

    /// Applies `mutate` to the stored event with `id`.
    ///
    /// Returns `false` without side effects when `id` is unknown. The id itself
    /// cannot be changed by `mutate`.
    pub fn update(&mut self, id: EventId, mutate: impl FnOnce(&mut Event)) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            debug!(
                "event=event_update module=store status=skipped profile_id={} event_id={} reason=not_found",
                self.profile_id, id
            );
            return false;
        };
        let mut replacement = entry.event.clone();
        mutate(&mut replacement);
        entry.event = replacement;
        debug!(
            "event=event_update module=store status=ok profile_id={} event_id={}",
            self.profile_id, id
        );
        self.commit();
        true
    }

    /// Deletes the event with `id`; returns `false` when it was not present.
    pub fn remove(&mut self, id: EventId) -> bool {
        if self.entries.remove(&id).is_none() {
            debug!(
                "event=event_remove module=store status=skipped profile_id={} event_id={} reason=not_found",
                self.profile_id, id
            );
            return false;
        }
        debug!(
            "event=event_remove module=store status=ok profile_id={} event_id={}",
            self.profile_id, id
        );
        self.commit();
        true
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.entries.get(&id).map(|entry| &entry.event)
    }

    /// Events starting on `date`, in list order.
    pub fn by_date(&self, date: NaiveDate) -> Vec<Event> {
        self.ordered(|event| event.occurs_on(date))
    }

    /// Events starting within `from..=to`, in list order.
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> Vec<Event> {
        self.ordered(|event| {
            let date = event.start_date();
            from <= date && date <= to
        })
    }

    /// Case-insensitive substring match on title; a blank query lists all.
    pub fn search(&self, query: &str) -> Vec<Event> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.all();
        }
        self.ordered(|event| event.title.to_lowercase().contains(&needle))
    }

    /// Every event, in list order.
    pub fn all(&self) -> Vec<Event> {
        self.ordered(|_| true)
    }

    fn ordered(&self, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
        let mut matched: Vec<&StoredEvent> = self
            .entries
            .values()
            .filter(|entry| keep(&entry.event))
            .collect();
        matched.sort_by(|a, b| list_order(a, b));
        matched.into_iter().map(|entry| entry.event.clone()).collect()
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn replace_contents(&mut self, profile_id: ProfileId) {
        let path = self.layout.events_path(profile_id);
        let loaded = load_events(&path);

        self.profile_id = profile_id;
        self.entries.clear();
        self.next_seq = 0;
        for event in loaded {
            let seq = self.take_seq();
            self.entries.insert(event.id(), StoredEvent { seq, event });
        }
        self.publish();
    }

    fn publish(&self) {
        self.feed.publish(EventSnapshot {
            profile_id: self.profile_id,
            events: Arc::from(self.all()),
        });
    }

    /// Publishes, enqueues the encoded snapshot, then notifies.
    fn commit(&self) {
        self.publish();

        // File order follows insertion so reloads keep tie-break order.
        let mut in_insertion_order: Vec<&StoredEvent> = self.entries.values().collect();
        in_insertion_order.sort_by_key(|entry| entry.seq);
        let bytes = encode_events(in_insertion_order.iter().map(|entry| &entry.event));
        self.saver
            .write(self.layout.events_path(self.profile_id), bytes);

        self.notifier.emit(&CoreNotification::EventsChanged);
    }
}

fn list_order(a: &StoredEvent, b: &StoredEvent) -> Ordering {
    a.event
        .priority
        .rank()
        .cmp(&b.event.priority.rank())
        .then(a.event.start.cmp(&b.event.start))
        .then(a.seq.cmp(&b.seq))
}
