use anyhow::{Context, Result, bail};
use lsconf_core::config::{GlobalConfig, ProjectConfig};
use lsconf_core::{ConfigError, merge_settings_with_policy};
use std::path::Path;

/// `global` is the strictly loaded global config; a load error is reported
/// as a failed check.
pub fn run(project_root: &Path, global: Result<GlobalConfig, ConfigError>) -> Result<()> {
    let project_root =
        std::fs::canonicalize(project_root).context("Failed to resolve project path")?;
    let project = ProjectConfig::load(&project_root)?;
    tracing::debug!(root = %project_root.display(), "checking project");

    println!("lsconf check: {}", project.project_name);
    println!("==================");
    println!();

    print!("Global config ... ");
    let global = match global {
        Ok(global) => {
            println!("OK");
            global
        }
        Err(e) => {
            println!("FAIL: {e}");
            bail!("fix the global config and re-run `lsconf check`");
        }
    };
    let policy = global.settings.override_policy_typed();
    println!("Override policy ... {policy}");

    print!("Declared languages ... ");
    match project.resolved_languages() {
        Ok(languages) if languages.is_empty() => println!("none"),
        Ok(languages) => {
            let names: Vec<&str> = languages.iter().map(|l| l.as_str()).collect();
            println!("OK ({})", names.join(", "));
        }
        Err(e) => {
            println!("FAIL: {e}");
            bail!("project descriptor declares an unsupported language");
        }
    }

    print!("Language settings ... ");
    match merge_settings_with_policy(
        &global.ls_specific_settings,
        &project.ls_specific_settings,
        policy,
    ) {
        Ok(table) => {
            println!(
                "OK ({} global, {} project, {} resolved)",
                global.ls_specific_settings.len(),
                project.ls_specific_settings.len(),
                table.len()
            );
        }
        Err(e) => {
            println!("FAIL: {e}");
            bail!("fix the language tag `{}` and re-run `lsconf check`", e.tag());
        }
    }

    println!();
    println!("All checks passed.");
    Ok(())
}
