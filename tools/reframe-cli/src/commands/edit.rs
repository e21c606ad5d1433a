//! Apply a single edit to a clip and save the project.

use std::path::PathBuf;

use clap::Subcommand;

use reframe_common::config::AppConfig;
use reframe_editing_core::{ClipEditor, EditSession};
use reframe_project_model::{AspectRatio, CropRect, HighlightRegion, SourceMedia};

use super::{open_session, select_clip};

#[derive(Subcommand)]
pub enum EditOp {
    /// Add a clip to the project
    AddClip {
        /// Source media path, relative to the project root
        #[arg(long)]
        source: String,

        /// Display name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,

        /// Source duration in seconds
        #[arg(long)]
        duration: f64,

        /// Source framerate (defaults to the configured value)
        #[arg(long)]
        fps: Option<f64>,

        #[arg(long, default_value = "1920")]
        width: u32,

        #[arg(long, default_value = "1080")]
        height: u32,
    },

    /// Remove the selected clip
    RemoveClip,

    /// Split the segment under a source time
    Split {
        /// Source time in seconds
        #[arg(long)]
        at: f64,
    },

    /// Merge a segment with the one after it
    Merge {
        #[arg(long)]
        segment: usize,
    },

    /// Change a segment's playback speed
    Speed {
        #[arg(long)]
        segment: usize,

        #[arg(long)]
        multiplier: f64,
    },

    /// Trim or restore an edge segment
    Trim {
        #[arg(long)]
        segment: usize,
    },

    /// Set the crop rectangle at a source time
    Crop {
        #[arg(long)]
        at: f64,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
    },

    /// Delete the crop keyframe at a source time
    DeleteCrop {
        #[arg(long)]
        at: f64,
    },

    /// Place the highlight at a source time
    Highlight {
        #[arg(long)]
        at: f64,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        /// Radius in source pixels (defaults to the configured ratio)
        #[arg(long)]
        radius: Option<f64>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        opacity: Option<f64>,
    },

    /// Delete the highlight keyframe at a source time
    DeleteHighlight {
        #[arg(long)]
        at: f64,
    },

    /// Turn the highlight on or off
    HighlightEnabled {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// Set how long the highlight lasts
    HighlightDuration {
        /// Seconds from the start of the source
        secs: f64,
    },

    /// Change the project's target aspect ratio
    Aspect {
        /// Ratio such as 9:16
        ratio: String,
    },
}

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    clip: Option<String>,
    op: EditOp,
) -> anyhow::Result<()> {
    let (mut loaded, mut session) = open_session(config, &path)?;

    match op {
        EditOp::AddClip {
            source,
            name,
            duration,
            fps,
            width,
            height,
        } => {
            let name = name.unwrap_or_else(|| display_name(&source));
            let media = SourceMedia {
                path: source,
                duration_secs: duration,
                framerate: fps.unwrap_or(config.editor.framerate),
                width,
                height,
            };
            let id = session.add_clip(&name, media)?;
            println!("Added clip '{name}' [{id}]");
        }
        EditOp::RemoveClip => {
            let id = target_clip(&session, clip.as_deref())?;
            let removed = session.remove_clip(&id)?;
            println!("Removed clip '{}'", removed.name);
        }
        EditOp::Aspect { ratio } => {
            let aspect: AspectRatio = ratio
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid target aspect: {e}"))?;
            session.set_target_aspect(aspect);
            println!("Target aspect set to {aspect}");
        }
        op => {
            select_clip(&mut session, clip.as_deref())?;
            let editor = session
                .live_mut()
                .ok_or_else(|| anyhow::anyhow!("Project has no clips to edit"))?;
            apply_clip_op(editor, op)?;
        }
    }

    session.store_into(&mut loaded.project);
    loaded
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;
    tracing::info!(project = %loaded.root.display(), "Project saved");

    Ok(())
}

fn apply_clip_op(editor: &mut ClipEditor, op: EditOp) -> anyhow::Result<()> {
    match op {
        EditOp::Split { at } => {
            let index = editor.add_boundary(at)?;
            println!("Split at {at:.3}s, new segment {index}");
        }
        EditOp::Merge { segment } => {
            editor.remove_boundary(segment)?;
            println!("Merged segment {segment} with segment {}", segment + 1);
        }
        EditOp::Speed {
            segment,
            multiplier,
        } => {
            editor.set_segment_speed(segment, multiplier)?;
            println!("Segment {segment} now plays at {multiplier}x");
        }
        EditOp::Trim { segment } => {
            let t = editor.toggle_trim(segment)?;
            let verb = if t.trimmed { "Trimmed" } else { "Restored" };
            println!(
                "{verb} segment {} ({:?} edge now at {:.3}s)",
                t.segment_index, t.edge, t.boundary
            );
        }
        EditOp::Crop {
            at,
            x,
            y,
            width,
            height,
        } => {
            editor.set_crop(at, CropRect::new(x, y, width, height));
            if let Some(rect) = editor.crop_at(editor.clamp_seek(at)) {
                println!(
                    "Crop at {at:.3}s: {:.1},{:.1} {:.1}x{:.1}",
                    rect.x, rect.y, rect.width, rect.height
                );
            }
        }
        EditOp::DeleteCrop { at } => {
            let outcome = editor.delete_crop_keyframe(at)?;
            println!("Crop keyframe at {at:.3}s: {outcome:?}");
        }
        EditOp::Highlight {
            at,
            x,
            y,
            radius,
            color,
            opacity,
        } => {
            let style = &editor.settings().highlight;
            let radius =
                radius.unwrap_or_else(|| f64::from(editor.source().height) * style.radius_ratio);
            let region = HighlightRegion {
                x,
                y,
                radius_x: radius,
                radius_y: radius,
                opacity: opacity.unwrap_or(style.opacity),
                color: color.unwrap_or_else(|| style.color.clone()),
            };
            editor.set_highlight(at, region);
            println!("Highlight keyframe set at {at:.3}s");
        }
        EditOp::DeleteHighlight { at } => {
            let outcome = editor.delete_highlight_keyframe(at)?;
            println!("Highlight keyframe at {at:.3}s: {outcome:?}");
        }
        EditOp::HighlightEnabled { enabled } => {
            editor.set_highlight_enabled(enabled);
            println!("Highlight {}", if enabled { "enabled" } else { "disabled" });
        }
        EditOp::HighlightDuration { secs } => {
            editor.set_highlight_duration(secs)?;
            println!("Highlight lasts {:.3}s", editor.highlight().duration());
        }
        EditOp::AddClip { .. } | EditOp::RemoveClip | EditOp::Aspect { .. } => {
            anyhow::bail!("not a clip edit")
        }
    }

    let segments = editor.segments();
    println!(
        "Clip '{}': {} segment(s), {:.3}s visible of {:.3}s",
        editor.name(),
        segments.segments().len(),
        segments.visual_duration(),
        segments.source_duration()
    );
    Ok(())
}

fn target_clip(session: &EditSession, clip: Option<&str>) -> anyhow::Result<String> {
    clip.or_else(|| session.live_id())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Project has no clips"))
}

fn display_name(source: &str) -> String {
    std::path::Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source)
        .to_string()
}
