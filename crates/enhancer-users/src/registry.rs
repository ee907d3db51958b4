use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::{RegistryError, Result};
use crate::store;
use crate::types::{CustomEnhancer, UserProfile};

/// Owns every user's custom enhancers and the file they persist to.
///
/// One mutex guards the whole map, and the file rewrite happens while it is
/// held, so mutations (and their writes) are serialized across all users.
pub struct EnhancerRegistry {
    path: PathBuf,
    max_enhancers: usize,
    profiles: Mutex<HashMap<i64, UserProfile>>,
}

impl EnhancerRegistry {
    /// Load the registry from `path`. A missing or partly corrupt store is
    /// not an error: whatever parses is kept.
    pub fn open(path: impl Into<PathBuf>, max_enhancers: usize) -> Self {
        let path = path.into();
        store::ensure_parent_dir(&path);
        let profiles = store::load_profiles(&path);
        Self {
            path,
            max_enhancers,
            profiles: Mutex::new(profiles),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Per-user cap on custom enhancers.
    pub fn max_enhancers(&self) -> usize {
        self.max_enhancers
    }

    /// Return the user's profile, creating and persisting a default one on
    /// first access.
    pub fn get_profile(&self, user_id: i64) -> UserProfile {
        let mut profiles = self.lock();
        Self::profile_mut(&mut profiles, &self.path, user_id).clone()
    }

    /// Append a new enhancer, or fail when the user is at the cap.
    pub fn add_enhancer(
        &self,
        user_id: i64,
        name: &str,
        prompt: &str,
        description: Option<&str>,
    ) -> Result<CustomEnhancer> {
        let mut profiles = self.lock();
        let profile = Self::profile_mut(&mut profiles, &self.path, user_id);

        if profile.custom_enhancers.len() >= self.max_enhancers {
            debug!(user_id, limit = self.max_enhancers, "custom enhancer limit reached");
            return Err(RegistryError::LimitExceeded {
                limit: self.max_enhancers,
            });
        }

        let enhancer = CustomEnhancer {
            id: profile.next_enhancer_id(),
            name: name.to_string(),
            prompt: prompt.to_string(),
            description: description.map(str::to_string),
        };
        profile.custom_enhancers.push(enhancer.clone());
        info!(user_id, enhancer_id = %enhancer.id, "custom enhancer added");

        self.persist(&profiles);
        Ok(enhancer)
    }

    /// Remove the enhancer with `enhancer_id`. Returns `false` (and writes
    /// nothing) when the user has no such enhancer.
    pub fn remove_enhancer(&self, user_id: i64, enhancer_id: &str) -> bool {
        let mut profiles = self.lock();
        let profile = Self::profile_mut(&mut profiles, &self.path, user_id);

        let Some(pos) = profile
            .custom_enhancers
            .iter()
            .position(|e| e.id == enhancer_id)
        else {
            return false;
        };
        profile.custom_enhancers.remove(pos);
        info!(user_id, enhancer_id, "custom enhancer removed");

        self.persist(&profiles);
        true
    }

    pub fn get_enhancer(&self, user_id: i64, enhancer_id: &str) -> Option<CustomEnhancer> {
        let mut profiles = self.lock();
        Self::profile_mut(&mut profiles, &self.path, user_id)
            .custom_enhancers
            .iter()
            .find(|e| e.id == enhancer_id)
            .cloned()
    }

    /// Snapshot of the user's enhancers in insertion order.
    pub fn list_enhancers(&self, user_id: i64) -> Vec<CustomEnhancer> {
        let mut profiles = self.lock();
        Self::profile_mut(&mut profiles, &self.path, user_id)
            .custom_enhancers
            .clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, UserProfile>> {
        self.profiles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the profile, inserting and persisting a default on first contact.
    fn profile_mut<'a>(
        profiles: &'a mut HashMap<i64, UserProfile>,
        path: &Path,
        user_id: i64,
    ) -> &'a mut UserProfile {
        if !profiles.contains_key(&user_id) {
            info!(user_id, "new user profile");
            profiles.insert(user_id, UserProfile::new(user_id));
            write_or_warn(path, profiles);
        }
        profiles
            .entry(user_id)
            .or_insert_with(|| UserProfile::new(user_id))
    }

    fn persist(&self, profiles: &HashMap<i64, UserProfile>) {
        write_or_warn(&self.path, profiles);
    }
}

/// A failed write leaves memory as the (unsynced) truth until the next
/// successful write.
fn write_or_warn(path: &Path, profiles: &HashMap<i64, UserProfile>) {
    if let Err(e) = store::save_profiles(path, profiles) {
        warn!(path = %path.display(), error = %e, "failed to save user store");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (tempfile::TempDir, EnhancerRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let reg = EnhancerRegistry::open(dir.path().join("data/users.json"), 3);
        (dir, reg)
    }

    #[test]
    fn new_user_gets_default_profile_and_is_persisted() {
        let (_dir, reg) = registry();
        let profile = reg.get_profile(123);
        assert_eq!(profile, UserProfile::new(123));
        assert!(reg.path().exists());

        let reloaded = EnhancerRegistry::open(reg.path(), 3);
        assert_eq!(reloaded.get_profile(123), profile);
    }

    #[test]
    fn add_enhancer_returns_created_record() {
        let (_dir, reg) = registry();
        let e = reg
            .add_enhancer(123, "Formal", "Rewrite formally", Some("Business tone"))
            .unwrap();
        assert_eq!(
            e,
            CustomEnhancer {
                id: "custom_1".into(),
                name: "Formal".into(),
                prompt: "Rewrite formally".into(),
                description: Some("Business tone".into()),
            }
        );
        assert_eq!(reg.list_enhancers(123), vec![e]);
    }

    #[test]
    fn add_succeeds_only_below_cap() {
        let (_dir, reg) = registry();
        for i in 0..3 {
            assert_eq!(reg.list_enhancers(123).len(), i);
            reg.add_enhancer(123, &format!("E{i}"), &format!("P{i}"), None)
                .unwrap();
        }
        for _ in 0..2 {
            let err = reg.add_enhancer(123, "E4", "P4", None).unwrap_err();
            assert_eq!(err, RegistryError::LimitExceeded { limit: 3 });
            assert_eq!(reg.list_enhancers(123).len(), 3);
        }
    }

    #[test]
    fn add_then_remove_restores_list() {
        let (_dir, reg) = registry();
        reg.add_enhancer(7, "A", "a", None).unwrap();
        let before = reg.list_enhancers(7);

        let added = reg.add_enhancer(7, "B", "b", Some("bee")).unwrap();
        assert!(reg.remove_enhancer(7, &added.id));
        assert_eq!(reg.list_enhancers(7), before);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let (_dir, reg) = registry();
        reg.add_enhancer(7, "A", "a", None).unwrap();
        let before = reg.get_profile(7);
        assert!(!reg.remove_enhancer(7, "nonexistent"));
        assert_eq!(reg.get_profile(7), before);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let (_dir, reg) = registry();
        for name in ["A", "B", "C"] {
            reg.add_enhancer(1, name, "p", None).unwrap();
        }
        assert!(reg.remove_enhancer(1, "custom_2"));
        let d = reg.add_enhancer(1, "D", "p", None).unwrap();
        assert_eq!(d.id, "custom_4");

        let ids: Vec<String> = reg.list_enhancers(1).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["custom_1", "custom_3", "custom_4"]);
    }

    #[test]
    fn id_counter_survives_restart() {
        let (_dir, reg) = registry();
        reg.add_enhancer(1, "A", "p", None).unwrap();
        reg.add_enhancer(1, "B", "p", None).unwrap();
        assert!(reg.remove_enhancer(1, "custom_2"));

        let reloaded = EnhancerRegistry::open(reg.path(), 3);
        let c = reloaded.add_enhancer(1, "C", "p", None).unwrap();
        assert_eq!(c.id, "custom_3");
    }

    #[test]
    fn round_trip_through_store() {
        for n in 0..=3usize {
            let (_dir, reg) = registry();
            for i in 0..n {
                let desc = (i % 2 == 0).then(|| format!("desc {i}"));
                reg.add_enhancer(55, &format!("name {i}"), &format!("prompt {i}"), desc.as_deref())
                    .unwrap();
            }
            let original = reg.get_profile(55);

            let fresh = EnhancerRegistry::open(reg.path(), 3);
            assert_eq!(fresh.get_profile(55), original, "n = {n}");
        }
    }

    #[test]
    fn lookups_miss_cleanly() {
        let (_dir, reg) = registry();
        assert!(reg.get_enhancer(9, "custom_1").is_none());
        let e = reg.add_enhancer(9, "A", "a", None).unwrap();
        assert_eq!(reg.get_enhancer(9, "custom_1"), Some(e));
        assert!(reg.get_enhancer(10, "custom_1").is_none());
    }

    #[test]
    fn list_is_a_snapshot() {
        let (_dir, reg) = registry();
        reg.add_enhancer(3, "A", "a", None).unwrap();
        let mut snapshot = reg.list_enhancers(3);
        snapshot.clear();
        assert_eq!(reg.list_enhancers(3).len(), 1);
    }

    #[test]
    fn users_are_isolated() {
        let (_dir, reg) = registry();
        for _ in 0..3 {
            reg.add_enhancer(1, "A", "a", None).unwrap();
        }
        assert!(reg.add_enhancer(2, "B", "b", None).is_ok());
        assert_eq!(reg.list_enhancers(2)[0].id, "custom_1");
    }

    #[test]
    fn write_failure_keeps_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        // The store path is a directory, so every write fails.
        let path = dir.path().join("blocked");
        std::fs::create_dir_all(&path).unwrap();
        let reg = EnhancerRegistry::open(&path, 3);

        let e = reg.add_enhancer(1, "A", "a", None).unwrap();
        assert_eq!(reg.list_enhancers(1), vec![e]);
    }
}
