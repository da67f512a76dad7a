use crate::constants;
use crate::error::{ConfigError, SettingsError};
use crate::languages::Language;
use crate::merge::OverridePolicy;
use crate::settings::{RawSettingsTable, Scope};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User-wide configuration: `$LSCONF_HOME/config.toml`, default
/// `~/.lsconf/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub ls_specific_settings: RawSettingsTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_override_policy")]
    pub override_policy: String,
}

/// Per-project descriptor: `<project_root>/.lsconf/project.toml`.
///
/// Language tags here are not validated on load; they are resolved when the
/// project's settings are merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub ls_specific_settings: RawSettingsTable,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_override_policy() -> String {
    OverridePolicy::default().as_str().into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            override_policy: default_override_policy(),
        }
    }
}

impl SettingsConfig {
    pub fn override_policy_typed(&self) -> OverridePolicy {
        OverridePolicy::parse(&self.override_policy).unwrap_or_default()
    }
}

impl GlobalConfig {
    /// Load from `config_file` when given (it must exist), otherwise from the
    /// default location. A missing default file, or no home directory, yields
    /// defaults.
    ///
    /// Environment variables (`LSCONF_<SECTION>_<KEY>`) override file values.
    /// Unrecognized values fall back to defaults with a warning.
    pub fn load_with_file(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_layers(config_file, |key| std::env::var(key).ok(), false)
    }

    /// Like [`load_with_file`](Self::load_with_file), but an unrecognized
    /// override policy in the file or the environment is an
    /// [`ConfigError::InvalidValue`] instead of a fallback.
    pub fn load_strict(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_layers(config_file, |key| std::env::var(key).ok(), true)
    }

    fn load_layers<F>(
        config_file: Option<&Path>,
        lookup: F,
        strict: bool,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match config_file {
            Some(path) => read_config_file(path)?,
            None => match global_config_path() {
                Some(path) if path.exists() => read_config_file(&path)?,
                Some(path) => {
                    tracing::debug!(
                        path = %path.display(),
                        "no global config file; using defaults"
                    );
                    Self::default()
                }
                None => {
                    tracing::debug!("no home directory; skipping global config");
                    Self::default()
                }
            },
        };

        if strict {
            require_override_policy(
                "settings.override_policy",
                &config.settings.override_policy,
            )?;
            if let Some(v) = lookup(OVERRIDE_POLICY_ENV) {
                require_override_policy(OVERRIDE_POLICY_ENV, &v)?;
            }
        }

        apply_env_overrides(&mut config, &lookup);
        config.normalize();
        Ok(config)
    }

    /// Load an explicit config file without consulting the environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = read_config_file(path)?;
        config.normalize();
        Ok(config)
    }

    fn normalize(&mut self) {
        self.logging.level = normalize_log_level(&self.logging.level);
        self.settings.override_policy = normalize_override_policy(&self.settings.override_policy);
    }
}

impl ProjectConfig {
    /// Load `<project_root>/.lsconf/project.toml`. A missing descriptor yields
    /// an empty config named after the project directory.
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        let path = project_root.join(constants::PROJECT_CONFIG_FILE);
        let mut config = if path.exists() {
            read_config_file(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no project descriptor; using defaults");
            Self::default()
        };

        config.project_name = config.project_name.trim().to_string();
        if config.project_name.is_empty() {
            config.project_name = project_root
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(config)
    }

    /// Resolve the declared `languages` list, dropping repeats in first-seen
    /// order.
    pub fn resolved_languages(&self) -> Result<Vec<Language>, SettingsError> {
        let mut languages = Vec::with_capacity(self.languages.len());
        for tag in &self.languages {
            let language = Language::from_tag(tag).map_err(|err| err.in_scope(Scope::Project))?;
            if !languages.contains(&language) {
                languages.push(language);
            }
        }
        Ok(languages)
    }
}

const OVERRIDE_POLICY_ENV: &str = "LSCONF_SETTINGS_OVERRIDE_POLICY";

/// Directory holding the global config: `$LSCONF_HOME`, else `~/.lsconf`.
/// `None` when neither is available.
pub fn global_data_dir() -> Option<PathBuf> {
    data_dir_from(
        std::env::var(constants::HOME_ENV_VAR).ok(),
        dirs::home_dir(),
    )
}

pub fn global_config_path() -> Option<PathBuf> {
    global_data_dir().map(|dir| dir.join(constants::GLOBAL_CONFIG_FILE))
}

fn data_dir_from(lsconf_home: Option<String>, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(home) = lsconf_home
        && !home.trim().is_empty()
    {
        return Some(PathBuf::from(expand_tilde(home.trim())));
    }
    home_dir.map(|home| home.join(constants::DEFAULT_DATA_DIR))
}

fn require_override_policy(field: &str, raw: &str) -> Result<OverridePolicy, ConfigError> {
    OverridePolicy::parse(raw).ok_or_else(|| {
        ConfigError::invalid_value(
            field,
            format!("unrecognized override policy `{raw}` (expected `replace` or `merge`)"),
        )
    })
}

fn read_config_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))
}

/// Apply environment variable overrides to config fields.
/// Convention: `LSCONF_<SECTION>_<KEY>` in UPPER_SNAKE_CASE.
fn apply_env_overrides<F>(config: &mut GlobalConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("LSCONF_LOGGING_LEVEL")
        && !v.trim().is_empty()
    {
        config.logging.level = v;
    }
    if let Some(v) = lookup(OVERRIDE_POLICY_ENV) {
        if OverridePolicy::parse(&v).is_some() {
            config.settings.override_policy = v;
        } else {
            tracing::warn!(
                field = OVERRIDE_POLICY_ENV,
                value = %v,
                "ignoring unrecognized override policy from environment"
            );
        }
    }
}

fn normalize_log_level(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        default_log_level()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

fn normalize_override_policy(raw: &str) -> String {
    match OverridePolicy::parse(raw) {
        Some(policy) => policy.as_str().to_string(),
        None => {
            tracing::warn!(
                field = "settings.override_policy",
                value = raw,
                fallback = %OverridePolicy::default(),
                "unrecognized override policy; falling back to default"
            );
            default_override_policy()
        }
    }
}

fn expand_tilde(path: &str) -> String {
    if path.starts_with('~')
        && let Some(home) = dirs::home_dir()
    {
        return path.replacen('~', &home.to_string_lossy(), 1);
    }
    path.to_string()
}
