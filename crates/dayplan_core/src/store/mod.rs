//! In-memory event store for the active profile.
//!
//! # Responsibility
//! - Own the active profile's events and answer date/text queries.
//! - Publish immutable snapshots for readers on other threads.
//!
//! # Invariants
//! - Mutations are serialized on one control thread (`&mut self`).
//! - Query ordering is computed at read time: priority, start, insertion.

pub mod event_store;
pub mod feed;

pub use event_store::EventStore;
pub use feed::{EventFeed, EventSnapshot};
