//! Durable storage: data-directory layout, ordered background writes, and
//! file-level load helpers.
//!
//! # Responsibility
//! - Map profiles to their backing files.
//! - Serialize every write/remove through one worker so older snapshots never
//!   land after newer ones.
//!
//! # Invariants
//! - I/O failures are logged and never propagated as fatal errors.
//! - A missing file reads as an empty collection.

pub mod event_file;
pub mod layout;
pub mod profile_file;
pub mod save_queue;

pub use layout::DataLayout;
pub use save_queue::{SaveHandle, SaveQueue};
