use anyhow::{Context, Result};
use lsconf_core::config::{GlobalConfig, ProjectConfig};
use lsconf_core::{GlobalSettings, Language, ProjectSettings};
use std::path::Path;
use std::sync::Arc;

pub fn run(project_root: &Path, global: &GlobalConfig, language: Option<&str>) -> Result<()> {
    let project_root =
        std::fs::canonicalize(project_root).context("Failed to resolve project path")?;
    let project = ProjectConfig::load(&project_root)?;

    let store = Arc::new(GlobalSettings::new(global.ls_specific_settings.clone()));
    let session = ProjectSettings::new(
        store,
        project.ls_specific_settings,
        global.settings.override_policy_typed(),
    );
    tracing::debug!(
        root = %project_root.display(),
        project_entries = session.project_raw().len(),
        policy = %session.policy(),
        "resolving project settings"
    );
    let table = session.resolve().with_context(|| {
        format!(
            "Invalid language settings for project {}",
            project.project_name
        )
    })?;

    let output = match language {
        Some(tag) => {
            let language = Language::from_tag(tag)?;
            serde_json::to_string_pretty(&table.settings_for(language))?
        }
        None => serde_json::to_string_pretty(table.as_ref())?,
    };
    println!("{output}");
    Ok(())
}
