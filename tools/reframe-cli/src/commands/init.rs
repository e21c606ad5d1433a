//! Initialize a new Reframe project.

use std::path::PathBuf;

use reframe_common::config::AppConfig;
use reframe_project_model::{AspectRatio, LoadedProject};

pub fn run(
    config: &AppConfig,
    name: String,
    output: PathBuf,
    aspect: Option<String>,
) -> anyhow::Result<()> {
    let aspect: AspectRatio = aspect
        .unwrap_or_else(|| config.editor.target_aspect.clone())
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid target aspect: {e}"))?;

    let project_dir = output.join(&name);
    println!("Creating project '{}' at {}", name, project_dir.display());

    let project = LoadedProject::create(&project_dir, &name, aspect)
        .map_err(|e| anyhow::anyhow!("Failed to create project: {e}"))?;

    println!("Project created successfully:");
    println!("  Directory: {}", project.root.display());
    println!("  Target aspect: {aspect}");
    println!();
    println!("Directory structure:");
    println!("  {}/", name);
    println!("  ├── sources/     (source media)");
    println!("  ├── meta/        (project.json)");
    println!("  └── exports/     (export requests)");
    println!();
    println!("Add a clip with: reframe edit {} add-clip --source <FILE> ...", project_dir.display());

    Ok(())
}
