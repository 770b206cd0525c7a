//! Read-only snapshot channel between the store and background readers.

use crate::model::event::Event;
use crate::model::profile::ProfileId;
use std::sync::{Arc, PoisonError, RwLock};

/// Immutable view of one profile's events at a point in time.
#[derive(Debug, Clone)]
pub struct EventSnapshot {
    pub profile_id: ProfileId,
    /// Events in list order.
    pub events: Arc<[Event]>,
}

/// Shared, swappable snapshot slot.
///
/// The store replaces the whole snapshot in one write, so readers never see a
/// mix of two profiles.
#[derive(Debug, Clone)]
pub struct EventFeed {
    slot: Arc<RwLock<EventSnapshot>>,
}

impl EventFeed {
    pub(crate) fn new(snapshot: EventSnapshot) -> Self {
        Self {
            slot: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Returns the latest published snapshot.
    pub fn current(&self) -> EventSnapshot {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn publish(&self, snapshot: EventSnapshot) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}
