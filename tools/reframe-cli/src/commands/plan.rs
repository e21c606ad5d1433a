//! Compute the per-frame plan of a clip.

use std::path::PathBuf;

use reframe_common::config::AppConfig;
use reframe_render_engine::compute_frame_plan;

use super::{open_session, select_clip};

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    clip: Option<String>,
    fps: Option<f64>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (_loaded, mut session) = open_session(config, &path)?;
    select_clip(&mut session, clip.as_deref())?;
    let editor = session
        .live()
        .ok_or_else(|| anyhow::anyhow!("Project has no clips"))?;

    let fps = fps.unwrap_or(config.export.output_fps);
    let plan = compute_frame_plan(editor, fps)?;

    if let Some(output) = output {
        let json = serde_json::to_string_pretty(&plan)?;
        std::fs::write(&output, json)?;
        println!("Frame plan written to {}", output.display());
        return Ok(());
    }

    println!("Clip: {} [{}]", editor.name(), plan.clip_id);
    println!(
        "  Visual duration: {:.3}s of {:.3}s source",
        plan.visual_duration,
        editor.duration()
    );
    println!("  Frames: {} @ {}fps", plan.frames.len(), plan.output_fps);
    println!("  Sped-up frames: {}", plan.sped_up_frames());
    println!("  Highlighted frames: {}", plan.highlighted_frames());
    if let (Some(first), Some(last)) = (plan.frames.first(), plan.frames.last()) {
        println!(
            "  Source span: {:.3}s - {:.3}s",
            first.source_time, last.source_time
        );
    }

    Ok(())
}
