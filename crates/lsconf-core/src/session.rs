use crate::error::SettingsError;
use crate::merge::{OverridePolicy, merge_settings_with_policy};
use crate::settings::{CanonicalSettingsTable, RawSettingsTable};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Process-wide global settings, published as immutable snapshots.
///
/// Readers clone the current `Arc` and merge against it without holding the
/// lock. [`replace`](Self::replace) swaps in a new snapshot; merges already
/// running keep the one they started with.
#[derive(Debug)]
pub struct GlobalSettings {
    inner: RwLock<Snapshot>,
}

#[derive(Debug, Clone)]
struct Snapshot {
    generation: u64,
    table: Arc<RawSettingsTable>,
}

impl GlobalSettings {
    pub fn new(table: RawSettingsTable) -> Self {
        Self {
            inner: RwLock::new(Snapshot {
                generation: 0,
                table: Arc::new(table),
            }),
        }
    }

    /// Current global table.
    pub fn snapshot(&self) -> Arc<RawSettingsTable> {
        self.snapshot_with_generation().1
    }

    /// Number of times the table has been replaced.
    pub fn generation(&self) -> u64 {
        self.snapshot_with_generation().0
    }

    /// Current generation and table, read together.
    pub fn snapshot_with_generation(&self) -> (u64, Arc<RawSettingsTable>) {
        // Snapshots are immutable, so a poisoned lock still guards a whole one.
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        (guard.generation, Arc::clone(&guard.table))
    }

    /// Publish a new global table and return the previous one.
    pub fn replace(&self, table: RawSettingsTable) -> Arc<RawSettingsTable> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let next_generation = guard.generation + 1;
        tracing::debug!(
            generation = next_generation,
            old_entries = guard.table.len(),
            new_entries = table.len(),
            "replacing global language settings"
        );
        let previous = std::mem::replace(&mut guard.table, Arc::new(table));
        guard.generation = next_generation;
        previous
    }
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self::new(RawSettingsTable::new())
    }
}

/// Language settings for one opened project.
///
/// The canonical table is derived lazily and cached per global generation.
/// Failed merges are never cached.
#[derive(Debug)]
pub struct ProjectSettings {
    global: Arc<GlobalSettings>,
    project_raw: RawSettingsTable,
    policy: OverridePolicy,
    cached: Mutex<Option<CachedTable>>,
}

#[derive(Debug)]
struct CachedTable {
    generation: u64,
    table: Arc<CanonicalSettingsTable>,
}

impl ProjectSettings {
    pub fn new(
        global: Arc<GlobalSettings>,
        project_raw: RawSettingsTable,
        policy: OverridePolicy,
    ) -> Self {
        Self {
            global,
            project_raw,
            policy,
            cached: Mutex::new(None),
        }
    }

    pub fn project_raw(&self) -> &RawSettingsTable {
        &self.project_raw
    }

    pub fn policy(&self) -> OverridePolicy {
        self.policy
    }

    /// Swap the project table, dropping any cached result.
    pub fn set_project_raw(&mut self, project_raw: RawSettingsTable) {
        self.project_raw = project_raw;
        *self
            .cached
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Canonical settings for this project against the current global
    /// snapshot.
    ///
    /// Best-effort caching: if the cache lock is unavailable the table is
    /// rebuilt rather than failing the caller.
    pub fn resolve(&self) -> Result<Arc<CanonicalSettingsTable>, SettingsError> {
        let (generation, global) = self.global.snapshot_with_generation();

        if let Ok(guard) = self.cached.lock()
            && let Some(cached) = guard.as_ref()
            && cached.generation == generation
        {
            return Ok(Arc::clone(&cached.table));
        }

        let table = Arc::new(merge_settings_with_policy(
            &global,
            &self.project_raw,
            self.policy,
        )?);
        tracing::debug!(
            generation,
            languages = table.len(),
            policy = %self.policy,
            "resolved project language settings"
        );

        if let Ok(mut guard) = self.cached.lock()
            && guard
                .as_ref()
                .is_none_or(|cached| cached.generation < generation)
        {
            *guard = Some(CachedTable {
                generation,
                table: Arc::clone(&table),
            });
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::Language;
    use crate::settings::SettingsMap;
    use serde_json::json;

    fn settings(value: serde_json::Value) -> SettingsMap {
        value.as_object().cloned().unwrap()
    }

    fn single(tag: &str, value: serde_json::Value) -> RawSettingsTable {
        let mut table = RawSettingsTable::new();
        table.insert(tag, settings(value));
        table
    }

    #[test]
    fn replace_bumps_generation_and_keeps_old_snapshots_intact() {
        let global = GlobalSettings::new(single("cpp", json!({"x": 1})));
        let before = global.snapshot();
        assert_eq!(global.generation(), 0);

        let previous = global.replace(single("cpp", json!({"x": 2})));

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.get("cpp"), Some(&settings(json!({"x": 1}))));
        assert_eq!(global.snapshot().get("cpp"), Some(&settings(json!({"x": 2}))));
        assert_eq!(global.generation(), 1);
    }

    #[test]
    fn resolve_reuses_cached_table_until_global_reload() {
        let global = Arc::new(GlobalSettings::new(single("cpp", json!({"x": 1}))));
        let project = ProjectSettings::new(
            Arc::clone(&global),
            single("python", json!({"y": 1})),
            OverridePolicy::default(),
        );

        let first = project.resolve().unwrap();
        let second = project.resolve().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        global.replace(single("cpp", json!({"x": 2})));
        let third = project.resolve().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first.get(Language::Cpp), Some(&settings(json!({"x": 1}))));
        assert_eq!(third.get(Language::Cpp), Some(&settings(json!({"x": 2}))));
    }

    #[test]
    fn set_project_raw_invalidates_cache() {
        let global = Arc::new(GlobalSettings::default());
        let mut project = ProjectSettings::new(
            global,
            single("python", json!({"y": 1})),
            OverridePolicy::default(),
        );
        let first = project.resolve().unwrap();

        project.set_project_raw(single("python", json!({"y": 2})));
        assert_eq!(
            project.project_raw().get("python"),
            Some(&settings(json!({"y": 2})))
        );
        assert_eq!(project.policy(), OverridePolicy::ReplaceLanguage);
        let second = project.resolve().unwrap();
        assert_eq!(first.get(Language::Python), Some(&settings(json!({"y": 1}))));
        assert_eq!(second.get(Language::Python), Some(&settings(json!({"y": 2}))));
    }

    #[test]
    fn failed_resolution_is_not_cached() {
        let global = Arc::new(GlobalSettings::new(single("pyhton", json!({}))));
        let project = ProjectSettings::new(
            Arc::clone(&global),
            RawSettingsTable::new(),
            OverridePolicy::default(),
        );

        assert_eq!(project.resolve().unwrap_err().tag(), "pyhton");

        global.replace(single("python", json!({"ok": true})));
        let resolved = project.resolve().unwrap();
        assert_eq!(
            resolved.get(Language::Python),
            Some(&settings(json!({"ok": true})))
        );
    }

    #[test]
    fn concurrent_sessions_share_one_global_snapshot() {
        let global = Arc::new(GlobalSettings::new(single("cpp", json!({"x": 1}))));
        let handles: Vec<_> = ["python", "go", "rust", "java"]
            .into_iter()
            .map(|tag| {
                let global = Arc::clone(&global);
                std::thread::spawn(move || {
                    let project = ProjectSettings::new(
                        global,
                        single(tag, json!({})),
                        OverridePolicy::default(),
                    );
                    project.resolve().unwrap()
                })
            })
            .collect();

        for handle in handles {
            let table = handle.join().unwrap();
            assert_eq!(table.get(Language::Cpp), Some(&settings(json!({"x": 1}))));
            assert_eq!(table.len(), 2);
        }
        assert_eq!(global.snapshot().len(), 1);
    }
}
