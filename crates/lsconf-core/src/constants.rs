/// Default data directory name under home.
pub const DEFAULT_DATA_DIR: &str = ".lsconf";

/// Environment variable that relocates the global data directory.
pub const HOME_ENV_VAR: &str = "LSCONF_HOME";

/// Global config file name, relative to the data directory.
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Project descriptor path, relative to the project root.
pub const PROJECT_CONFIG_FILE: &str = ".lsconf/project.toml";
