//! Profile domain model.
//!
//! # Invariants
//! - `id` is generated once and keys the profile's event file, so renames
//!   never orphan data.
//! - `name` is a display label only and is not required to be unique.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one profile.
pub type ProfileId = Uuid;

/// Name given to the profile created on first start.
pub const DEFAULT_PROFILE_NAME: &str = "Default";

/// Isolated, named container for one event collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
}

impl Profile {
    /// Creates a profile with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
