//! Show project information.

use std::path::PathBuf;

use reframe_project_model::{ClipSnapshot, LoadedProject};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    let p = &project.project;

    println!("Project: {}", p.name);
    println!("  ID: {}", p.id);
    println!("  Created: {}", p.created_at);
    println!("  Modified: {}", p.modified_at);
    println!("  Target aspect: {}", p.target_aspect);
    println!();

    println!("Clips ({}):", p.clips.len());
    for clip in &p.clips {
        let marker = if p.active_clip.as_deref() == Some(clip.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{marker} {} [{}]", clip.name, clip.id);
        print_clip(clip);
    }
    if p.clips.is_empty() {
        println!("  (none)");
    }

    Ok(())
}

fn print_clip(clip: &ClipSnapshot) {
    let s = &clip.source;
    println!(
        "    Source: {} ({:.1}s, {}x{} @ {}fps)",
        s.path, s.duration_secs, s.width, s.height, s.framerate
    );

    match &clip.segments {
        Some(segments) => {
            println!(
                "    Segments: {} (speeds: {:?})",
                segments.segment_speeds.len(),
                segments.segment_speeds
            );
            if let Some(trim) = segments.trim_range {
                println!("    Visible: {:.3}s - {:.3}s", trim.start, trim.end);
            }
        }
        None => println!("    Segments: never edited"),
    }

    println!("    Crop keyframes: {}", clip.crop_keyframes.len());
    println!(
        "    Highlight: {} ({} keyframes{})",
        if clip.highlight.enabled { "on" } else { "off" },
        clip.highlight.keyframes.len(),
        clip.highlight
            .duration_secs
            .map(|d| format!(", {d:.1}s"))
            .unwrap_or_default()
    );
}
