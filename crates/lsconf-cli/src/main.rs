mod commands;

use clap::{Parser, Subcommand};
use lsconf_core::config::GlobalConfig;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

#[derive(Parser)]
#[command(
    name = "lsconf",
    version,
    about = "Resolve per-language backend settings for a project",
    long_about = "lsconf combines the global language settings (~/.lsconf/config.toml)\n\
        with a project's descriptor (.lsconf/project.toml) into the settings each\n\
        language backend is started with.\n\n\
        Project settings for a language replace the global settings for that\n\
        language unless settings.override_policy = \"merge\".\n\n\
        Quick start:\n  \
        lsconf check\n  \
        lsconf resolve --language python\n  \
        lsconf languages"
)]
struct Cli {
    /// Enable verbose logging (set log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the global config file (default: ~/.lsconf/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved settings table as JSON
    ///
    /// Examples:
    ///   lsconf resolve
    ///   lsconf resolve --language CPP
    ///   lsconf resolve --path /path/to/project
    Resolve {
        /// Path to the project root (default: current directory)
        #[arg(short, long)]
        path: Option<String>,

        /// Only print the settings for this language (any casing or alias)
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Validate every language tag in the global config and project descriptor
    ///
    /// Exits non-zero on the first unrecognized tag.
    ///
    /// Example: lsconf check --path /path/to/project
    Check {
        /// Path to the project root (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },
    /// List supported languages and their accepted aliases
    Languages,
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Tracing goes up before the config loads so its warnings are printed.
    let filter = init_tracing(cli.verbose);
    let config_file = cli.config.as_deref().map(std::path::Path::new);

    match cli.command {
        Commands::Resolve { path, language } => {
            let path = resolve_path(path)?;
            let global = GlobalConfig::load_with_file(config_file)?;
            apply_config_level(&filter, &global, cli.verbose);
            commands::resolve::run(&path, &global, language.as_deref())?;
        }
        Commands::Check { path } => {
            let path = resolve_path(path)?;
            let global = GlobalConfig::load_strict(config_file);
            if let Ok(global) = &global {
                apply_config_level(&filter, global, cli.verbose);
            }
            commands::check::run(&path, global)?;
        }
        Commands::Languages => {
            commands::languages::run();
        }
    }

    Ok(())
}

/// `RUST_LOG` wins, then `--verbose`, then `info` until the config is read.
fn init_tracing(verbose: bool) -> FilterHandle {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let (filter, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
    handle
}

/// Switch to `logging.level` unless `RUST_LOG` or `--verbose` already chose.
fn apply_config_level(handle: &FilterHandle, global: &GlobalConfig, verbose: bool) {
    if verbose || std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }
    match EnvFilter::try_new(&global.logging.level) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                tracing::warn!(error = %e, "failed to apply logging.level");
            }
        }
        Err(e) => {
            tracing::warn!(
                level = %global.logging.level,
                error = %e,
                "invalid logging.level; keeping info"
            );
        }
    }
}

fn resolve_path(path: Option<String>) -> anyhow::Result<std::path::PathBuf> {
    match path {
        Some(p) => Ok(std::path::PathBuf::from(p)),
        None => Ok(std::env::current_dir()?),
    }
}
