//! Assemble and write the export request.

use std::path::PathBuf;

use reframe_common::config::AppConfig;
use reframe_render_engine::{
    assemble_export, export_with, ExportJob, ExportProgress, JsonRequestBackend, ProgressCallback,
};

use super::open_session;

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    compact: bool,
) -> anyhow::Result<()> {
    let (loaded, session) = open_session(config, &path)?;

    let request = assemble_export(&session, &loaded.project.name)?;
    let output_path = output.unwrap_or_else(|| {
        loaded
            .root
            .join("exports")
            .join(format!("{}-request.json", file_safe(&loaded.project.name)))
    });

    println!("Exporting project: {}", loaded.project.name);
    println!("  Clips: {}", request.clips.len());
    println!("  Target aspect: {}", request.target_aspect);
    println!("  Visual duration: {:.3}s", request.visual_duration());
    println!("  Output: {}", output_path.display());

    let job = ExportJob {
        output_path,
        request,
    };
    let progress: ProgressCallback = Box::new(|p: ExportProgress| {
        tracing::debug!(stage = ?p.stage, progress = p.progress, "Export progress");
    });
    let mut backend = if compact {
        JsonRequestBackend::compact()
    } else {
        JsonRequestBackend::new()
    };
    let artifact = export_with(&job, &mut backend, Some(progress))?;

    println!(
        "Wrote {} clip(s), {} bytes to {}",
        artifact.clips,
        artifact.bytes,
        artifact.path.display()
    );
    Ok(())
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
