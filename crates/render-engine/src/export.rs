//! Export assembly and the renderer boundary.
//!
//! Editing state lives in the frame domain. Renderers get time-domain
//! keyframes, trim-filtered with one context keyframe on each side so they
//! reproduce the interpolation the editor showed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use reframe_common::error::{ReframeError, ReframeResult};
use reframe_editing_core::{ClipEditor, EditSession, SegmentModel};
use reframe_project_model::frame::{sanitize_framerate, time_to_frame};
use reframe_project_model::keyframe::{Keyframe, KeyframeOrigin, TimedKeyframe};
use reframe_project_model::project::ClipSnapshot;
use reframe_project_model::region::{AspectRatio, CropRect, HighlightRegion};
use reframe_project_model::segment::{SegmentSnapshot, TrimRange};

/// Schema version of [`ExportRequest`].
pub const EXPORT_REQUEST_VERSION: &str = "1.0";

/// Time-domain keyframes to hand to a renderer.
///
/// Without a trim everything is returned. With a trim `[s, e]`, the result
/// is the nearest keyframe strictly before `s`, every keyframe with
/// `s <= t <= e`, and the nearest keyframe strictly after `e`. Comparisons
/// happen on frames, so a keyframe sitting exactly on a trim edge is in
/// range and never doubles as context.
pub fn filter_keyframes_for_export<T: Clone>(
    keyframes: &[Keyframe<T>],
    trim: Option<TrimRange>,
    framerate: f64,
) -> Vec<TimedKeyframe<T>> {
    let Some(trim) = trim else {
        return keyframes.iter().map(|kf| kf.to_timed(framerate)).collect();
    };
    let start = time_to_frame(trim.start, framerate);
    let end = time_to_frame(trim.end, framerate);

    let before = keyframes.iter().rev().find(|kf| kf.frame < start);
    let inside = keyframes
        .iter()
        .filter(|kf| kf.frame >= start && kf.frame <= end);
    let after = keyframes.iter().find(|kf| kf.frame > end);

    before
        .into_iter()
        .chain(inside)
        .chain(after)
        .map(|kf| kf.to_timed(framerate))
        .collect()
}

/// Segment layout in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentExportData {
    /// First visible source time.
    pub trim_start: f64,
    /// Last visible source time.
    pub trim_end: f64,
    pub boundaries: Vec<f64>,
    pub segment_speeds: Vec<f64>,
}

impl SegmentExportData {
    pub fn from_model(model: &SegmentModel) -> Self {
        Self {
            trim_start: model.visible_start(),
            trim_end: model.visible_end(),
            boundaries: model.boundaries(),
            segment_speeds: model.segment_speeds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightExportData {
    pub enabled: bool,
    /// Seconds from source time 0.
    pub duration: f64,
    pub keyframes: Vec<TimedKeyframe<HighlightRegion>>,
}

/// Everything a renderer needs for one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipExportPayload {
    pub clip_id: String,
    pub name: String,
    pub source_path: String,
    pub source_duration: f64,
    pub framerate: f64,
    pub width: u32,
    pub height: u32,
    /// Length of the edited timeline.
    pub visual_duration: f64,
    pub crop_keyframes: Vec<TimedKeyframe<CropRect>>,
    pub highlight: HighlightExportData,
    pub segments: SegmentExportData,
}

impl ClipExportPayload {
    /// Payload for the live clip, straight from the editor.
    pub fn from_editor(editor: &ClipEditor) -> Self {
        let segments = editor.segments();
        let trim = segments.trim_range();
        let fps = editor.framerate();
        let source = editor.source();
        let highlight = editor.highlight();

        Self {
            clip_id: editor.id().to_string(),
            name: editor.name().to_string(),
            source_path: source.path.clone(),
            source_duration: editor.duration(),
            framerate: fps,
            width: source.width,
            height: source.height,
            visual_duration: segments.visual_duration(),
            crop_keyframes: filter_keyframes_for_export(editor.crop().keyframes(), trim, fps),
            highlight: HighlightExportData {
                enabled: highlight.is_enabled(),
                duration: highlight.duration(),
                keyframes: filter_keyframes_for_export(highlight.keyframes(), trim, fps),
            },
            segments: SegmentExportData::from_model(segments),
        }
    }

    /// Payload for a saved clip that is not live.
    ///
    /// A clip that was never opened has no crop keyframes; it gets a
    /// centered crop of `target_aspect` at both ends. Saved crops are
    /// re-fit to `target_aspect`, the same way hydrating the clip would.
    pub fn from_snapshot(snapshot: &ClipSnapshot, target_aspect: AspectRatio) -> ReframeResult<Self> {
        let source = &snapshot.source;
        let fps = sanitize_framerate(source.framerate);
        let duration = source.duration_secs;

        let layout = snapshot
            .segments
            .clone()
            .unwrap_or_else(|| SegmentSnapshot::full(duration));
        let model = SegmentModel::from_snapshot(&layout, duration, fps)?;
        let trim = model.trim_range();

        let crop_keyframes = if snapshot.crop_keyframes.is_empty() {
            tracing::warn!(
                clip = %snapshot.id,
                aspect = %target_aspect,
                "Clip has no crop keyframes, exporting a centered default"
            );
            default_crop_keyframes(snapshot, target_aspect, fps)
        } else {
            let (width, height) = (f64::from(source.width), f64::from(source.height));
            snapshot
                .crop_keyframes
                .iter()
                .map(|kf| {
                    Keyframe::new(
                        kf.frame,
                        kf.payload.constrained_to_aspect(target_aspect, width, height),
                        kf.origin,
                    )
                })
                .collect()
        };

        let highlight_duration = snapshot
            .highlight
            .duration_secs
            .filter(|d| d.is_finite() && *d > 0.0)
            .map_or(duration, |d| d.min(duration));

        Ok(Self {
            clip_id: snapshot.id.clone(),
            name: snapshot.name.clone(),
            source_path: source.path.clone(),
            source_duration: duration,
            framerate: fps,
            width: source.width,
            height: source.height,
            visual_duration: model.visual_duration(),
            crop_keyframes: filter_keyframes_for_export(&crop_keyframes, trim, fps),
            highlight: HighlightExportData {
                enabled: snapshot.highlight.enabled,
                duration: highlight_duration,
                keyframes: filter_keyframes_for_export(&snapshot.highlight.keyframes, trim, fps),
            },
            segments: SegmentExportData::from_model(&model),
        })
    }
}

fn default_crop_keyframes(
    snapshot: &ClipSnapshot,
    aspect: AspectRatio,
    framerate: f64,
) -> Vec<Keyframe<CropRect>> {
    let source = &snapshot.source;
    let rect = CropRect::centered_for_aspect(f64::from(source.width), f64::from(source.height), aspect);
    let end = time_to_frame(source.duration_secs, framerate);
    vec![
        Keyframe::new(0, rect, KeyframeOrigin::Permanent),
        Keyframe::new(end, rect, KeyframeOrigin::Permanent),
    ]
}

/// One export job's worth of clips, as consumed by a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub version: String,
    pub project_name: String,
    pub target_aspect: AspectRatio,
    /// When the request was assembled (ISO 8601).
    pub assembled_at: String,
    pub clips: Vec<ClipExportPayload>,
}

impl ExportRequest {
    /// Refuse requests a renderer cannot reproduce.
    pub fn validate(&self) -> ReframeResult<()> {
        if self.clips.is_empty() {
            return Err(ReframeError::export("Nothing to export: project has no clips"));
        }
        for clip in &self.clips {
            if clip.crop_keyframes.is_empty() {
                return Err(ReframeError::export(format!(
                    "Cannot export clip '{}' with zero crop keyframes",
                    clip.name
                )));
            }
            if clip.highlight.enabled && clip.highlight.keyframes.is_empty() {
                return Err(ReframeError::export(format!(
                    "Cannot export clip '{}': highlight is enabled but has zero keyframes",
                    clip.name
                )));
            }
            if clip.visual_duration <= 0.0 {
                return Err(ReframeError::export(format!(
                    "Cannot export clip '{}': nothing is visible",
                    clip.name
                )));
            }
        }
        Ok(())
    }

    /// Total length of all clips on the edited timeline.
    pub fn visual_duration(&self) -> f64 {
        self.clips.iter().map(|c| c.visual_duration).sum()
    }
}

/// Assemble every clip of the session: the live clip from memory, the
/// rest from their last saved snapshots.
pub fn assemble_export(session: &EditSession, project_name: &str) -> ReframeResult<ExportRequest> {
    let mut clips = Vec::with_capacity(session.len());
    for snapshot in session.clips() {
        let payload = match session.live() {
            Some(live) if live.id() == snapshot.id => ClipExportPayload::from_editor(live),
            _ => ClipExportPayload::from_snapshot(snapshot, session.target_aspect())?,
        };
        clips.push(payload);
    }

    tracing::info!(
        project = project_name,
        clips = clips.len(),
        live = ?session.live_id(),
        "Export request assembled"
    );

    Ok(ExportRequest {
        version: EXPORT_REQUEST_VERSION.to_string(),
        project_name: project_name.to_string(),
        target_aspect: session.target_aspect(),
        assembled_at: chrono::Utc::now().to_rfc3339(),
        clips,
    })
}

/// An export job ready to be handed to a backend.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Output file path.
    pub output_path: PathBuf,

    pub request: ExportRequest,
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Rendering,
    Complete,
    Failed,
}

/// What a backend produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderArtifact {
    pub path: PathBuf,
    pub bytes: u64,
    pub clips: usize,
}

/// Trait for render backends.
pub trait RenderBackend: Send {
    /// Execute the export job.
    fn render(
        &mut self,
        job: &ExportJob,
        progress: Option<&ProgressCallback>,
    ) -> ReframeResult<RenderArtifact>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Writes the request as JSON for an out-of-process renderer.
#[derive(Debug)]
pub struct JsonRequestBackend {
    pretty: bool,
}

impl Default for JsonRequestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRequestBackend {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl RenderBackend for JsonRequestBackend {
    fn render(
        &mut self,
        job: &ExportJob,
        progress: Option<&ProgressCallback>,
    ) -> ReframeResult<RenderArtifact> {
        let json = if self.pretty {
            serde_json::to_string_pretty(&job.request)?
        } else {
            serde_json::to_string(&job.request)?
        };
        report(progress, 0.5, ExportStage::Rendering);
        std::fs::write(&job.output_path, &json)?;

        Ok(RenderArtifact {
            path: job.output_path.clone(),
            bytes: json.len() as u64,
            clips: job.request.clips.len(),
        })
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "json-request"
    }
}

/// Validate the job and run it on `backend`.
pub fn export_with(
    job: &ExportJob,
    backend: &mut dyn RenderBackend,
    progress: Option<ProgressCallback>,
) -> ReframeResult<RenderArtifact> {
    tracing::info!(
        output = %job.output_path.display(),
        clips = job.request.clips.len(),
        backend = backend.name(),
        "Starting export"
    );
    report(progress.as_ref(), 0.0, ExportStage::Preparing);

    if let Err(err) = job.request.validate() {
        report(progress.as_ref(), 0.0, ExportStage::Failed);
        return Err(err);
    }
    if !backend.is_available() {
        return Err(ReframeError::unsupported(format!(
            "Render backend '{}' is not available",
            backend.name()
        )));
    }
    ensure_parent_dir(&job.output_path)?;

    match backend.render(job, progress.as_ref()) {
        Ok(artifact) => {
            report(progress.as_ref(), 1.0, ExportStage::Complete);
            tracing::info!(path = %artifact.path.display(), bytes = artifact.bytes, "Export complete");
            Ok(artifact)
        }
        Err(err) => {
            report(progress.as_ref(), 0.0, ExportStage::Failed);
            Err(ReframeError::render(format!("{} failed: {err}", backend.name())))
        }
    }
}

/// Validate the job and write the request with [`JsonRequestBackend`].
pub fn export_request(job: &ExportJob, progress: Option<ProgressCallback>) -> ReframeResult<RenderArtifact> {
    export_with(job, &mut JsonRequestBackend::new(), progress)
}

fn ensure_parent_dir(path: &Path) -> ReframeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn report(progress: Option<&ProgressCallback>, value: f64, stage: ExportStage) {
    if let Some(cb) = progress {
        cb(ExportProgress {
            progress: value,
            stage,
        });
    }
}
