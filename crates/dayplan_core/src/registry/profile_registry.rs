//! Profile registry and active-profile selection.
//!
//! # Responsibility
//! - Own the ordered profile list and the active profile pointer.
//! - Persist both independently through the save queue.
//!
//! # Invariants
//! - At least one profile always exists.
//! - The active id always resolves to a registered profile.
//! - The registry does not own event data; the caller reloads the store after
//!   the active profile changes.
//! - A profile list that exists but cannot be read is never overwritten; the
//!   session keeps its profiles in memory only.

use crate::model::profile::{Profile, ProfileId, DEFAULT_PROFILE_NAME};
use crate::notify::{CoreNotification, Notifier};
use crate::storage::profile_file::{
    encode_active_profile_id, encode_profiles, read_active_profile_id, read_profiles,
    ProfilesRead,
};
use crate::storage::{DataLayout, SaveHandle};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Profile registry errors surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileRegistryError {
    /// The only remaining profile cannot be deleted.
    LastProfile,
    /// Profile name is blank after normalization.
    InvalidName(String),
}

impl Display for ProfileRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastProfile => write!(f, "cannot delete the last profile"),
            Self::InvalidName(value) => write!(f, "profile name is invalid: `{value}`"),
        }
    }
}

impl Error for ProfileRegistryError {}

pub type ProfileRegistryResult<T> = Result<T, ProfileRegistryError>;

/// Registered profiles plus the active selection.
pub struct ProfileRegistry {
    profiles: Vec<Profile>,
    active_id: ProfileId,
    layout: DataLayout,
    saver: SaveHandle,
    notifier: Notifier,
    persist: bool,
}

impl ProfileRegistry {
    /// Loads the registry, creating `Default` when no profile is stored.
    ///
    /// An active pointer that is missing or names an unknown profile falls
    /// back to the first profile, and the repaired pointer is persisted.
    ///
    /// When the profile list exists but cannot be read, nothing is written
    /// back for the rest of the session.
    pub fn load(layout: DataLayout, saver: SaveHandle, notifier: Notifier) -> Self {
        let read = read_profiles(&layout.profiles_path());
        let persist = read != ProfilesRead::Unreadable;
        if !persist {
            warn!(
                "event=profiles_load module=registry status=skipped reason=registry_unreadable mode=in_memory"
            );
        }
        let mut profiles = read.into_profiles();
        let created_default = profiles.is_empty();
        if created_default {
            profiles.push(Profile::new(DEFAULT_PROFILE_NAME));
        }
        let first_id = profiles[0].id;

        let stored_active = read_active_profile_id(&layout.active_profile_path());
        let active_id = stored_active
            .filter(|id| profiles.iter().any(|profile| profile.id == *id))
            .unwrap_or(first_id);

        let registry = Self {
            profiles,
            active_id,
            layout,
            saver,
            notifier,
            persist,
        };

        if created_default {
            info!(
                "event=profiles_load module=registry status=ok created_default=true profile_id={}",
                active_id
            );
            registry.persist_profiles();
        }
        if stored_active != Some(active_id) {
            if stored_active.is_some() {
                warn!(
                    "event=active_profile_load module=registry status=repaired reason=unknown_id fallback_id={}",
                    active_id
                );
            }
            registry.persist_active();
        }

        info!(
            "event=profiles_load module=registry status=ok profiles={} active_id={}",
            registry.profiles.len(),
            registry.active_id
        );
        registry
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns `true` when no profiles are registered.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Whether changes are written to the data directory.
    pub fn persists_to_disk(&self) -> bool {
        self.persist
    }

    pub fn get(&self, id: ProfileId) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.id == id)
    }

    pub fn active_id(&self) -> ProfileId {
        self.active_id
    }

    pub fn active(&self) -> &Profile {
        // The active id is kept resolvable by every mutation below.
        self.get(self.active_id).unwrap_or(&self.profiles[0])
    }

    /// Appends a new profile; does not switch to it.
    ///
    /// # Errors
    /// - `InvalidName` when `name` is blank.
    pub fn create(&mut self, name: &str) -> ProfileRegistryResult<ProfileId> {
        let normalized = normalize_profile_name(name)?;
        let profile = Profile::new(normalized);
        let id = profile.id;
        self.profiles.push(profile);
        info!(
            "event=profile_create module=registry status=ok profile_id={} profiles={}",
            id,
            self.profiles.len()
        );
        self.persist_profiles();
        self.notifier.emit(&CoreNotification::ProfilesChanged);
        Ok(id)
    }

    /// Replaces a profile's display name. Unknown ids are a silent no-op.
    ///
    /// # Errors
    /// - `InvalidName` when `name` is blank.
    pub fn rename(&mut self, id: ProfileId, name: &str) -> ProfileRegistryResult<bool> {
        let normalized = normalize_profile_name(name)?;
        let Some(profile) = self.profiles.iter_mut().find(|profile| profile.id == id) else {
            return Ok(false);
        };
        profile.name = normalized;
        info!("event=profile_rename module=registry status=ok profile_id={id}");
        self.persist_profiles();
        self.notifier.emit(&CoreNotification::ProfilesChanged);
        Ok(true)
    }

    /// Makes `id` active.
    ///
    /// Returns `true` when the active profile changed. Unknown ids and the
    /// already-active id are no-ops.
    pub fn switch_to(&mut self, id: ProfileId) -> bool {
        if self.get(id).is_none() {
            info!(
                "event=profile_switch module=registry status=skipped profile_id={id} reason=not_found"
            );
            return false;
        }
        if self.active_id == id {
            return false;
        }
        self.active_id = id;
        info!("event=profile_switch module=registry status=ok profile_id={id}");
        self.persist_active();
        self.notifier.emit(&CoreNotification::ProfilesChanged);
        true
    }

    /// Removes a profile and its event file.
    ///
    /// Returns `true` when the active profile changed as a result. Unknown ids
    /// are a silent no-op.
    ///
    /// # Errors
    /// - `LastProfile` when only one profile remains; nothing is changed.
    pub fn delete(&mut self, id: ProfileId) -> ProfileRegistryResult<bool> {
        if self.profiles.len() <= 1 {
            warn!(
                "event=profile_delete module=registry status=error error_code=last_profile profile_id={id}"
            );
            return Err(ProfileRegistryError::LastProfile);
        }
        let Some(index) = self.profiles.iter().position(|profile| profile.id == id) else {
            info!(
                "event=profile_delete module=registry status=skipped profile_id={id} reason=not_found"
            );
            return Ok(false);
        };

        self.profiles.remove(index);
        self.saver.remove(self.layout.events_path(id));

        let active_changed = self.active_id == id;
        if active_changed {
            self.active_id = self.profiles[0].id;
            self.persist_active();
        }
        self.persist_profiles();
        info!(
            "event=profile_delete module=registry status=ok profile_id={} active_changed={} active_id={}",
            id, active_changed, self.active_id
        );
        self.notifier.emit(&CoreNotification::ProfilesChanged);
        Ok(active_changed)
    }

    fn persist_profiles(&self) {
        if !self.persist {
            return;
        }
        if let Some(bytes) = encode_profiles(&self.profiles) {
            self.saver.write(self.layout.profiles_path(), bytes);
        }
    }

    fn persist_active(&self) {
        if !self.persist {
            return;
        }
        self.saver.write(
            self.layout.active_profile_path(),
            encode_active_profile_id(self.active_id),
        );
    }
}

/// Trims and collapses internal whitespace.
///
/// # Errors
/// - `InvalidName` when nothing remains.
pub fn normalize_profile_name(name: &str) -> ProfileRegistryResult<String> {
    let collapsed = WHITESPACE_RE.replace_all(name.trim(), " ").into_owned();
    if collapsed.is_empty() {
        return Err(ProfileRegistryError::InvalidName(name.to_string()));
    }
    Ok(collapsed)
}

#[cfg(test)]
mod tests {
    use super::{normalize_profile_name, ProfileRegistry, ProfileRegistryError};
    use crate::notify::Notifier;
    use crate::storage::{DataLayout, SaveQueue};
    use tempfile::tempdir;
    use uuid::Uuid;

    #[test]
    fn normalize_profile_name_collapses_whitespace() {
        assert_eq!(
            normalize_profile_name("  Work \t  Team ").expect("valid name"),
            "Work Team"
        );
        assert_eq!(
            normalize_profile_name(" \n "),
            Err(ProfileRegistryError::InvalidName(" \n ".to_string()))
        );
    }

    #[test]
    fn fresh_directory_gets_default_profile() {
        let dir = tempdir().expect("temp dir");
        let queue = SaveQueue::start().expect("worker should start");
        let registry =
            ProfileRegistry::load(DataLayout::new(dir.path()), queue.handle(), Notifier::new());

        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
        assert_eq!(registry.active().name, "Default");
    }

    #[test]
    fn switch_to_unknown_or_active_is_noop() {
        let dir = tempdir().expect("temp dir");
        let queue = SaveQueue::start().expect("worker should start");
        let mut registry =
            ProfileRegistry::load(DataLayout::new(dir.path()), queue.handle(), Notifier::new());
        let active = registry.active_id();

        assert!(!registry.switch_to(Uuid::new_v4()));
        assert!(!registry.switch_to(active));
        assert_eq!(registry.active_id(), active);
    }

    #[test]
    fn rename_keeps_id_and_rejects_blank() {
        let dir = tempdir().expect("temp dir");
        let queue = SaveQueue::start().expect("worker should start");
        let mut registry =
            ProfileRegistry::load(DataLayout::new(dir.path()), queue.handle(), Notifier::new());
        let id = registry.active_id();

        assert_eq!(registry.rename(id, "Home"), Ok(true));
        assert_eq!(registry.active().name, "Home");
        assert_eq!(registry.active_id(), id);
        assert!(registry.rename(id, "  ").is_err());
        assert_eq!(registry.rename(Uuid::new_v4(), "Ghost"), Ok(false));
    }

    #[test]
    fn unreadable_profile_list_is_left_untouched() {
        let dir = tempdir().expect("temp dir");
        let layout = DataLayout::new(dir.path());
        std::fs::create_dir(layout.profiles_path()).expect("dir should be created");
        let queue = SaveQueue::start().expect("worker should start");
        let mut registry = ProfileRegistry::load(layout.clone(), queue.handle(), Notifier::new());

        assert!(!registry.persists_to_disk());
        assert_eq!(registry.active().name, "Default");
        let work = registry.create("Work").expect("valid name");
        assert!(registry.switch_to(work));
        assert!(queue.handle().flush());

        assert!(layout.profiles_path().is_dir());
        assert!(!layout.active_profile_path().exists());
        assert_eq!(registry.len(), 2);
    }
}
