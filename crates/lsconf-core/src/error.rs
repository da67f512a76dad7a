use crate::settings::Scope;
use thiserror::Error;

/// The single error kind raised while resolving language settings.
///
/// `tag` is kept exactly as it appeared in the configuration source so the
/// user can find the typo.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unrecognized language tag `{tag}`{}", scope_suffix(.scope))]
    UnrecognizedLanguage { tag: String, scope: Option<Scope> },
}

impl SettingsError {
    pub fn unrecognized_language(tag: impl Into<String>) -> Self {
        Self::UnrecognizedLanguage {
            tag: tag.into(),
            scope: None,
        }
    }

    /// Attach the scope the offending tag came from.
    pub fn in_scope(self, scope: Scope) -> Self {
        match self {
            Self::UnrecognizedLanguage { tag, .. } => Self::UnrecognizedLanguage {
                tag,
                scope: Some(scope),
            },
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::UnrecognizedLanguage { tag, .. } => tag,
        }
    }

    pub fn scope(&self) -> Option<Scope> {
        match self {
            Self::UnrecognizedLanguage { scope, .. } => *scope,
        }
    }
}

fn scope_suffix(scope: &Option<Scope>) -> String {
    match scope {
        Some(scope) => format!(" in {scope} settings"),
        None => String::new(),
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("failed to parse config: {0}")]
    ParseError(String),

    #[error("invalid config value: {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
