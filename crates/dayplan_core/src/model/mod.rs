//! Domain model for scheduled events and profiles.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep edit-boundary validation next to the types it protects.
//!
//! # Invariants
//! - Every event and profile is identified by a stable UUID.
//! - Deletion is a hard delete; there are no tombstones.

pub mod event;
pub mod profile;
