//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate the registry, the store and reminders into command-level APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod scheduler;

pub use scheduler::{Scheduler, SchedulerError, SchedulerResult};
