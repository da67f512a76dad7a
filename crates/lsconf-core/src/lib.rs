pub mod config;
pub mod constants;
pub mod error;
pub mod languages;
pub mod merge;
pub mod session;
pub mod settings;

pub use error::{ConfigError, SettingsError};
pub use languages::Language;
pub use merge::{OverridePolicy, merge_settings, merge_settings_with_policy};
pub use session::{GlobalSettings, ProjectSettings};
pub use settings::{CanonicalSettingsTable, RawSettingsTable, Scope, SettingsMap};
