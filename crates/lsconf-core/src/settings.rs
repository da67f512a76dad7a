use crate::languages::Language;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Backend-specific settings for one language. The schema belongs to the
/// backend; this layer never looks inside.
pub type SettingsMap = serde_json::Map<String, serde_json::Value>;

/// Origin of a raw settings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Global,
    Project,
}

impl Scope {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Project => "project",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings keyed by unvalidated language tags, in source order.
///
/// Tags are stored exactly as written. Inserting an identical tag string again
/// replaces its settings in place; tags that differ only in case are kept
/// apart and reconciled by the merge engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSettingsTable {
    entries: Vec<(String, SettingsMap)>,
}

impl RawSettingsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>, settings: SettingsMap) {
        let tag = tag.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == tag) {
            Some((_, slot)) => *slot = settings,
            None => self.entries.push((tag, settings)),
        }
    }

    pub fn get(&self, tag: &str) -> Option<&SettingsMap> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == tag)
            .map(|(_, settings)| settings)
    }

    pub fn get_mut(&mut self, tag: &str) -> Option<&mut SettingsMap> {
        self.entries
            .iter_mut()
            .find(|(existing, _)| existing == tag)
            .map(|(_, settings)| settings)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingsMap)> {
        self.entries
            .iter()
            .map(|(tag, settings)| (tag.as_str(), settings))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(tag, _)| tag.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Into<String>> FromIterator<(T, SettingsMap)> for RawSettingsTable {
    fn from_iter<I: IntoIterator<Item = (T, SettingsMap)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (tag, settings) in iter {
            table.insert(tag, settings);
        }
        table
    }
}

impl Serialize for RawSettingsTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for RawSettingsTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawTableVisitor;

        impl<'de> Visitor<'de> for RawTableVisitor {
            type Value = RawSettingsTable;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a table of language tags to settings tables")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = RawSettingsTable::new();
                while let Some((tag, settings)) = access.next_entry::<String, SettingsMap>()? {
                    table.insert(tag, settings);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(RawTableVisitor)
    }
}

/// Settings keyed by resolved [`Language`]. Only the merge engine builds one,
/// so every key has been validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CanonicalSettingsTable {
    entries: BTreeMap<Language, SettingsMap>,
}

impl CanonicalSettingsTable {
    pub(crate) fn insert(
        &mut self,
        language: Language,
        settings: SettingsMap,
    ) -> Option<SettingsMap> {
        self.entries.insert(language, settings)
    }

    pub(crate) fn get_mut(&mut self, language: Language) -> Option<&mut SettingsMap> {
        self.entries.get_mut(&language)
    }

    pub fn get(&self, language: Language) -> Option<&SettingsMap> {
        self.entries.get(&language)
    }

    /// Settings for `language`, or an empty map when neither scope set any.
    pub fn settings_for(&self, language: Language) -> SettingsMap {
        self.get(language).cloned().unwrap_or_default()
    }

    pub fn contains(&self, language: Language) -> bool {
        self.entries.contains_key(&language)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Language, &SettingsMap)> {
        self.entries
            .iter()
            .map(|(language, settings)| (*language, settings))
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
