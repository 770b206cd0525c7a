//! Profile registry files: the ordered profile list and the active pointer.
//!
//! The two files are read independently so losing one never invalidates the
//! other.

use crate::model::profile::{Profile, ProfileId};
use log::{error, warn};
use std::collections::HashSet;
use std::io;
use std::path::Path;
use uuid::Uuid;

/// Outcome of reading the profile list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfilesRead {
    /// No file yet.
    Missing,
    Loaded(Vec<Profile>),
    /// The file parsed badly and may be replaced.
    Corrupt,
    /// The file exists but could not be read; it must not be overwritten.
    Unreadable,
}

impl ProfilesRead {
    /// Profiles that were read; empty for every other outcome.
    pub fn into_profiles(self) -> Vec<Profile> {
        match self {
            Self::Loaded(profiles) => profiles,
            Self::Missing | Self::Corrupt | Self::Unreadable => Vec::new(),
        }
    }
}

/// Reads the ordered profile list.
///
/// Duplicate ids keep their first occurrence.
pub fn read_profiles(path: &Path) -> ProfilesRead {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return ProfilesRead::Missing,
        Err(err) => {
            error!(
                "event=profiles_load module=storage status=error error_code=unreadable_registry path={} error={}",
                path.display(),
                err
            );
            return ProfilesRead::Unreadable;
        }
    };

    let parsed: Vec<Profile> = match serde_json::from_slice(&bytes) {
        Ok(profiles) => profiles,
        Err(err) => {
            warn!(
                "event=profiles_load module=storage status=error path={} error_code=corrupt_registry error={}",
                path.display(),
                err
            );
            return ProfilesRead::Corrupt;
        }
    };

    let mut seen = HashSet::new();
    ProfilesRead::Loaded(
        parsed
            .into_iter()
            .filter(|profile| seen.insert(profile.id))
            .collect(),
    )
}

/// Encodes the ordered profile list.
pub fn encode_profiles(profiles: &[Profile]) -> Option<Vec<u8>> {
    match serde_json::to_vec_pretty(profiles) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            error!(
                "event=profiles_encode module=storage status=error error={}",
                err
            );
            None
        }
    }
}

/// Reads the active profile pointer; anything unparsable reads as `None`.
pub fn read_active_profile_id(path: &Path) -> Option<ProfileId> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(err) => {
            error!(
                "event=active_profile_load module=storage status=error path={} error={}",
                path.display(),
                err
            );
            return None;
        }
    };

    let parsed = Uuid::parse_str(text.trim()).ok();
    if parsed.is_none() {
        warn!(
            "event=active_profile_load module=storage status=error path={} error_code=corrupt_pointer",
            path.display()
        );
    }
    parsed
}

pub fn encode_active_profile_id(id: ProfileId) -> Vec<u8> {
    id.to_string().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::{
        encode_active_profile_id, encode_profiles, read_active_profile_id, read_profiles,
        ProfilesRead,
    };
    use crate::model::profile::Profile;
    use tempfile::tempdir;

    #[test]
    fn profiles_roundtrip_in_order() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("profiles.json");
        let profiles = vec![Profile::new("Default"), Profile::new("Work")];
        std::fs::write(&path, encode_profiles(&profiles).expect("encodable"))
            .expect("write should succeed");

        assert_eq!(read_profiles(&path), ProfilesRead::Loaded(profiles));
    }

    #[test]
    fn missing_and_unreadable_profiles_are_told_apart() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("profiles.json");
        assert_eq!(read_profiles(&path), ProfilesRead::Missing);

        std::fs::create_dir(&path).expect("dir should be created");
        assert_eq!(read_profiles(&path), ProfilesRead::Unreadable);
    }

    #[test]
    fn corrupt_profiles_read_as_empty() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("profiles.json");
        std::fs::write(&path, b"[{\"id\": 12").expect("write should succeed");
        assert_eq!(read_profiles(&path), ProfilesRead::Corrupt);
    }

    #[test]
    fn duplicate_profile_ids_keep_first() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("profiles.json");
        let first = Profile::new("First");
        let mut clone = first.clone();
        clone.name = "Second".to_string();
        std::fs::write(&path, encode_profiles(&[first.clone(), clone]).expect("encodable"))
            .expect("write should succeed");

        assert_eq!(read_profiles(&path).into_profiles(), vec![first]);
    }

    #[test]
    fn active_pointer_tolerates_whitespace_and_garbage() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("active_profile");
        assert_eq!(read_active_profile_id(&path), None);

        let profile = Profile::new("Default");
        let mut bytes = encode_active_profile_id(profile.id);
        bytes.push(b'\n');
        std::fs::write(&path, bytes).expect("write should succeed");
        assert_eq!(read_active_profile_id(&path), Some(profile.id));

        std::fs::write(&path, b"not-a-uuid").expect("write should succeed");
        assert_eq!(read_active_profile_id(&path), None);
    }
}
