//! Combines the global and project settings tables into the canonical table
//! handed to backend construction.
//!
//! Tags are resolved scope by scope, global first, each in source order. The
//! first tag that does not name a supported language aborts the merge; no
//! partial table is ever returned.

use crate::error::SettingsError;
use crate::languages::Language;
use crate::settings::{CanonicalSettingsTable, RawSettingsTable, Scope, SettingsMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How project settings for a language combine with global settings for the
/// same language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverridePolicy {
    /// The project map replaces the global map wholesale. Global keys the
    /// project map omits are dropped.
    #[default]
    #[serde(alias = "replace")]
    ReplaceLanguage,
    /// Key-wise union; project values win per key and nested tables merge
    /// recursively.
    #[serde(alias = "merge")]
    MergeKeys,
}

impl OverridePolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReplaceLanguage => "replace",
            Self::MergeKeys => "merge",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "replace" | "replace_language" => Some(Self::ReplaceLanguage),
            "merge" | "merge_keys" => Some(Self::MergeKeys),
            _ => None,
        }
    }
}

impl std::fmt::Display for OverridePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge with the default [`OverridePolicy::ReplaceLanguage`] policy.
pub fn merge_settings(
    global: &RawSettingsTable,
    project: &RawSettingsTable,
) -> Result<CanonicalSettingsTable, SettingsError> {
    merge_settings_with_policy(global, project, OverridePolicy::default())
}

/// Resolve every tag in both tables and build a fresh canonical table.
///
/// Settings are copied out of the raw tables, so later edits to either input
/// never show through the result.
pub fn merge_settings_with_policy(
    global: &RawSettingsTable,
    project: &RawSettingsTable,
    policy: OverridePolicy,
) -> Result<CanonicalSettingsTable, SettingsError> {
    let global_entries = resolve_scope(global, Scope::Global)?;
    let project_entries = resolve_scope(project, Scope::Project)?;

    let mut merged = CanonicalSettingsTable::default();
    for (language, settings) in global_entries {
        merged.insert(language, settings.clone());
    }

    for (language, settings) in project_entries {
        match (policy, merged.get_mut(language)) {
            (OverridePolicy::MergeKeys, Some(base)) => {
                tracing::debug!(
                    %language,
                    %policy,
                    "merging project settings into global settings"
                );
                merge_settings_maps(base, settings);
            }
            (OverridePolicy::ReplaceLanguage, Some(base)) => {
                tracing::debug!(%language, %policy, "project settings replace global settings");
                *base = settings.clone();
            }
            (_, None) => {
                merged.insert(language, settings.clone());
            }
        }
    }

    Ok(merged)
}

/// Resolve all tags of one scope, keeping source order.
///
/// When two tags in the same scope name the same language, the later entry
/// takes the earlier entry's slot.
fn resolve_scope(
    table: &RawSettingsTable,
    scope: Scope,
) -> Result<Vec<(Language, &SettingsMap)>, SettingsError> {
    let mut resolved: Vec<(Language, &SettingsMap, &str)> = Vec::with_capacity(table.len());
    for (tag, settings) in table.iter() {
        let language = Language::from_tag(tag).map_err(|err| err.in_scope(scope))?;
        match resolved.iter_mut().find(|(existing, _, _)| *existing == language) {
            Some(slot) => {
                tracing::warn!(
                    %scope,
                    %language,
                    earlier_tag = slot.2,
                    later_tag = tag,
                    "duplicate language tags in one scope; later entry wins"
                );
                *slot = (language, settings, tag);
            }
            None => resolved.push((language, settings, tag)),
        }
    }
    Ok(resolved
        .into_iter()
        .map(|(language, settings, _)| (language, settings))
        .collect())
}

/// Deep-merge `overlay` into `base`. Only keys present in `overlay` are written.
fn merge_settings_maps(base: &mut SettingsMap, overlay: &SettingsMap) {
    for (key, overlay_val) in overlay {
        match (base.get_mut(key), overlay_val) {
            (Some(Value::Object(base_nested)), Value::Object(overlay_nested)) => {
                merge_settings_maps(base_nested, overlay_nested);
            }
            (Some(base_val), _) => *base_val = overlay_val.clone(),
            (None, _) => {
                base.insert(key.clone(), overlay_val.clone());
            }
        }
    }
}
