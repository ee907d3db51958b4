//! Flat-file persistence for user profiles.
//!
//! The store is one JSON object: keys are stringified user ids, values are
//! serialized [`UserProfile`]s. Loading is best-effort (bad entries are
//! skipped); saving always rewrites the whole document.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::types::UserProfile;

/// Read every profile that parses. Never fails: a missing file is an empty
/// store, an unreadable or non-object document is logged and treated as empty.
pub fn load_profiles(path: &Path) -> HashMap<i64, UserProfile> {
    let mut profiles = HashMap::new();

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "user store not found, starting empty");
            return profiles;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read user store");
            return profiles;
        }
    };

    if raw.trim().is_empty() {
        return profiles;
    }

    let doc: serde_json::Map<String, Value> = match serde_json::from_str(&raw) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "user store is not a JSON object, ignoring");
            return profiles;
        }
    };

    for (key, value) in doc {
        let user_id: i64 = match key.parse() {
            Ok(id) => id,
            Err(_) => {
                warn!(key = %key, "skipping user store entry with non-numeric key");
                continue;
            }
        };
        let mut profile: UserProfile = match serde_json::from_value(value) {
            Ok(p) => p,
            Err(e) => {
                warn!(user_id, error = %e, "skipping malformed user profile");
                continue;
            }
        };
        if profile.user_id != user_id {
            warn!(
                key = user_id,
                stored = profile.user_id,
                "user profile id disagrees with its key, using the key"
            );
            profile.user_id = user_id;
        }
        profiles.insert(user_id, profile);
    }

    info!(path = %path.display(), users = profiles.len(), "user store loaded");
    profiles
}

/// Overwrite the store with the complete map.
///
/// Writes a sibling temp file first and renames it over the target so a
/// crash mid-write leaves the previous document intact.
pub fn save_profiles(path: &Path, profiles: &HashMap<i64, UserProfile>) -> std::io::Result<()> {
    let sorted: BTreeMap<i64, &UserProfile> = profiles.iter().map(|(k, v)| (*k, v)).collect();
    let json = serde_json::to_string_pretty(&sorted)?;

    let tmp = temp_path(path);
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Create the directory that will hold the store.
pub fn ensure_parent_dir(path: &Path) {
    if let Some(parent) = path.parent() {
        if parent.as_os_str().is_empty() {
            return;
        }
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!(path = %parent.display(), error = %e, "failed to create user store directory");
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomEnhancer;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let profiles = load_profiles(&dir.path().join("absent.json"));
        assert!(profiles.is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"{
                "1": {"user_id": 1, "custom_enhancers": [], "language": "ru"},
                "2": {"user_id": "not a number"},
                "abc": {"user_id": 3},
                "4": {"user_id": 4, "custom_enhancers": [{"id": "custom_1", "name": "A", "prompt": "B"}]}
            }"#,
        )
        .unwrap();

        let profiles = load_profiles(&path);
        assert_eq!(profiles.len(), 2);
        assert!(profiles.contains_key(&1));
        assert_eq!(profiles[&4].custom_enhancers[0].description, None);
        assert_eq!(profiles[&4].language, "ru");
    }

    #[test]
    fn non_object_document_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(load_profiles(&path).is_empty());
    }

    #[test]
    fn key_wins_over_stored_user_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"{"9": {"user_id": 8}}"#).unwrap();
        assert_eq!(load_profiles(&path)[&9].user_id, 9);
    }

    #[test]
    fn save_writes_string_keys_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let mut profiles = HashMap::new();
        let mut p = UserProfile::new(42);
        p.custom_enhancers.push(CustomEnhancer {
            id: "custom_1".into(),
            name: "Формальный".into(),
            prompt: "Перепиши".into(),
            description: None,
        });
        profiles.insert(42, p);

        save_profiles(&path, &profiles).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["42"]["user_id"], 42);
        // non-ASCII is written as-is, not escaped
        assert!(raw.contains("Формальный"));
        assert!(!temp_path(&path).exists());
    }
}
