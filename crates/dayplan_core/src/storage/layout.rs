//! Data-directory layout.

use crate::model::profile::ProfileId;
use log::warn;
use std::path::{Path, PathBuf};

const PROFILES_FILE_NAME: &str = "profiles.json";
const ACTIVE_PROFILE_FILE_NAME: &str = "active_profile";
const EVENTS_FILE_PREFIX: &str = "events_";
const EVENTS_FILE_EXTENSION: &str = "dat";

/// Resolves every persisted file below one root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ordered `{id, name}` list.
    pub fn profiles_path(&self) -> PathBuf {
        self.root.join(PROFILES_FILE_NAME)
    }

    /// Single active profile id.
    pub fn active_profile_path(&self) -> PathBuf {
        self.root.join(ACTIVE_PROFILE_FILE_NAME)
    }

    /// Event file for one profile, keyed by id so renames never orphan data.
    pub fn events_path(&self, profile_id: ProfileId) -> PathBuf {
        self.root.join(format!(
            "{EVENTS_FILE_PREFIX}{profile_id}.{EVENTS_FILE_EXTENSION}"
        ))
    }

    /// Creates the root directory. Failure is logged; callers continue in memory.
    pub fn ensure_root(&self) -> bool {
        match std::fs::create_dir_all(&self.root) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "event=data_dir_create module=storage status=error path={} error={}",
                    self.root.display(),
                    err
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DataLayout;
    use uuid::Uuid;

    #[test]
    fn events_path_is_keyed_by_profile_id() {
        let layout = DataLayout::new("/data/dayplan");
        let id = Uuid::nil();
        let path = layout.events_path(id);
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("events_00000000-0000-0000-0000-000000000000.dat")
        );
        assert_eq!(path.parent(), Some(layout.root()));
    }

    #[test]
    fn registry_files_are_separate() {
        let layout = DataLayout::new("/data/dayplan");
        assert_ne!(layout.profiles_path(), layout.active_profile_path());
    }
}
