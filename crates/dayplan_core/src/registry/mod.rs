//! Profile isolation layer.
//!
//! # Responsibility
//! - Track which profiles exist and which one is active.
//!
//! # Invariants
//! - The last remaining profile cannot be deleted.
//! - Each profile's events live in a file keyed by the profile id.

pub mod profile_registry;

pub use profile_registry::{
    normalize_profile_name, ProfileRegistry, ProfileRegistryError, ProfileRegistryResult,
};
