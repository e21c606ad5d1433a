pub mod edit;
pub mod export;
pub mod info;
pub mod init;
pub mod plan;
pub mod validate;

use std::path::Path;

use reframe_common::config::AppConfig;
use reframe_editing_core::{EditSession, EditorSettings};
use reframe_project_model::LoadedProject;

/// Load a project and open an editing session on it.
pub(crate) fn open_session(
    config: &AppConfig,
    path: &Path,
) -> anyhow::Result<(LoadedProject, EditSession)> {
    let loaded =
        LoadedProject::load(path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let settings = EditorSettings::from_defaults(&config.editor);
    let session = EditSession::from_project(&loaded.project, settings)
        .map_err(|e| anyhow::anyhow!("Failed to open project: {e}"))?;
    Ok((loaded, session))
}

/// Make `clip` live if one was named.
pub(crate) fn select_clip(session: &mut EditSession, clip: Option<&str>) -> anyhow::Result<()> {
    if let Some(id) = clip {
        session.switch_to(id)?;
    }
    Ok(())
}
