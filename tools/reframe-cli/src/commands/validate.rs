//! Validate a Reframe project bundle.

use std::path::PathBuf;

use reframe_common::config::AppConfig;
use reframe_editing_core::{ClipEditor, EditorSettings};
use reframe_project_model::LoadedProject;

pub fn run(config: &AppConfig, path: PathBuf) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    println!("  Name: {}", project.project.name);
    println!("  Version: {}", project.project.version);
    println!("  Target aspect: {}", project.project.target_aspect);
    println!("  Clips: {}", project.project.clips.len());

    let mut errors = project.validate();

    // Clips that look well-formed must also hydrate into an editor.
    let settings = EditorSettings::from_defaults(&config.editor);
    for clip in project.project.clips.iter().filter(|c| c.problems().is_empty()) {
        if let Err(e) =
            ClipEditor::from_snapshot(clip, project.project.target_aspect, settings.clone())
        {
            errors.push(format!("{}: {e}", clip.name));
        }
    }

    if errors.is_empty() {
        println!("\nProject is valid.");
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        println!(
            "\n{} issue(s) found. Project may not be fully usable.",
            errors.len()
        );
    }

    Ok(())
}
