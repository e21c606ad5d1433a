//! Project metadata and per-clip snapshots.
//!
//! A project ties together one or more source clips, each with its own
//! crop/highlight keyframes and segment layout, plus the target aspect
//! ratio every clip is reframed to.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::keyframe::Keyframe;
use crate::region::{AspectRatio, CropRect, HighlightRegion};
use crate::segment::SegmentSnapshot;

/// Top-level project file (`meta/project.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Schema version.
    pub version: String,

    /// Human-readable project name.
    pub name: String,

    /// Unique project identifier (UUID).
    pub id: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,

    /// Aspect ratio every clip is cropped to.
    #[serde(default)]
    pub target_aspect: AspectRatio,

    /// Clip that was live when the project was saved.
    #[serde(default)]
    pub active_clip: Option<String>,

    /// Clips in export order.
    #[serde(default)]
    pub clips: Vec<ClipSnapshot>,
}

/// Source media metadata reported by the playback collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMedia {
    /// Path to the media file, relative to the project root or absolute.
    pub path: String,

    /// Duration in seconds.
    pub duration_secs: f64,

    /// Frames per second.
    pub framerate: f64,

    /// Frame size in pixels.
    pub width: u32,
    pub height: u32,
}

/// Saved state of a single clip.
///
/// Keyframes are stored in the frame domain. A freshly added clip that was
/// never opened has empty keyframe lists and no segment layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSnapshot {
    /// Unique clip identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    pub source: SourceMedia,

    #[serde(default)]
    pub crop_keyframes: Vec<Keyframe<CropRect>>,

    #[serde(default)]
    pub highlight: HighlightSnapshot,

    #[serde(default)]
    pub segments: Option<SegmentSnapshot>,
}

/// Saved highlight overlay state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HighlightSnapshot {
    pub enabled: bool,

    /// How long the highlight is shown, from source time 0. `None` means
    /// the full clip.
    pub duration_secs: Option<f64>,

    pub keyframes: Vec<Keyframe<HighlightRegion>>,
}

impl ClipSnapshot {
    /// A new, never-edited clip.
    pub fn new(name: impl Into<String>, source: SourceMedia) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            source,
            crop_keyframes: vec![],
            highlight: HighlightSnapshot::default(),
            segments: None,
        }
    }

    /// Structural problems with this clip, if any.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = vec![];
        let label = &self.name;

        if !(self.source.duration_secs.is_finite() && self.source.duration_secs > 0.0) {
            problems.push(format!("{label}: source duration must be positive"));
        }
        if self.source.width == 0 || self.source.height == 0 {
            problems.push(format!("{label}: source has zero frame size"));
        }
        if !frames_strictly_increasing(&self.crop_keyframes) {
            problems.push(format!("{label}: crop keyframes are not sorted by frame"));
        }
        if !frames_strictly_increasing(&self.highlight.keyframes) {
            problems.push(format!(
                "{label}: highlight keyframes are not sorted by frame"
            ));
        }
        if let Some(duration) = self.highlight.duration_secs {
            if duration <= 0.0 || duration > self.source.duration_secs + 1e-6 {
                problems.push(format!(
                    "{label}: highlight duration {duration:.3}s is outside the clip"
                ));
            }
        }
        if let Some(segments) = &self.segments {
            problems.extend(
                segments
                    .problems(self.source.duration_secs)
                    .into_iter()
                    .map(|p| format!("{label}: {p}")),
            );
        }

        problems
    }
}

fn frames_strictly_increasing<T>(keyframes: &[Keyframe<T>]) -> bool {
    keyframes.windows(2).all(|w| w[0].frame < w[1].frame)
}

/// The complete in-memory representation of a loaded project.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    /// Filesystem path to the project directory.
    pub root: PathBuf,

    /// Project metadata and clips.
    pub project: Project,
}

impl Project {
    /// Create a new, empty project.
    pub fn new(name: impl Into<String>, target_aspect: AspectRatio) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: "1.0".to_string(),
            name: name.into(),
            id: generate_id(),
            created_at: now.clone(),
            modified_at: now,
            target_aspect,
            active_clip: None,
            clips: vec![],
        }
    }

    pub fn clip(&self, id: &str) -> Option<&ClipSnapshot> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Mark the project as modified now.
    pub fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }
}

impl LoadedProject {
    /// Load a project from a directory.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();
        let project_path = root.join("meta").join("project.json");

        let project_json =
            std::fs::read_to_string(&project_path).map_err(|e| ProjectError::IoError {
                path: project_path.clone(),
                source: e,
            })?;

        let project: Project =
            serde_json::from_str(&project_json).map_err(|e| ProjectError::ParseError {
                path: project_path,
                source: e,
            })?;

        Ok(Self { root, project })
    }

    /// Save the project to disk.
    pub fn save(&self) -> Result<(), ProjectError> {
        let meta_dir = self.root.join("meta");
        std::fs::create_dir_all(&meta_dir).map_err(|e| ProjectError::IoError {
            path: meta_dir.clone(),
            source: e,
        })?;

        let project_path = meta_dir.join("project.json");
        let project_json =
            serde_json::to_string_pretty(&self.project).map_err(|e| ProjectError::ParseError {
                path: project_path.clone(),
                source: e,
            })?;
        std::fs::write(&project_path, project_json).map_err(|e| ProjectError::IoError {
            path: project_path,
            source: e,
        })?;

        Ok(())
    }

    /// Create a new project on disk with the standard directory structure.
    pub fn create(
        root: impl AsRef<Path>,
        name: impl Into<String>,
        target_aspect: AspectRatio,
    ) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();

        for subdir in &["sources", "meta", "exports"] {
            std::fs::create_dir_all(root.join(subdir)).map_err(|e| ProjectError::IoError {
                path: root.join(subdir),
                source: e,
            })?;
        }

        let loaded = Self {
            root,
            project: Project::new(name, target_aspect),
        };
        loaded.save()?;
        Ok(loaded)
    }

    /// Validate clip structure and that referenced source files exist.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];

        if let Some(active) = &self.project.active_clip {
            if self.project.clip(active).is_none() {
                errors.push(format!("Active clip {active} is not in the project"));
            }
        }

        for clip in &self.project.clips {
            errors.extend(clip.problems());

            let path = self.root.join(&clip.source.path);
            if !path.exists() {
                errors.push(format!(
                    "{} source missing: {}",
                    clip.name, clip.source.path
                ));
            }
        }

        errors
    }
}

/// Errors that can occur when working with projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Generate a simple UUID v4-shaped identifier without external dependency.
///
/// The first three groups come from the clock. The last two carry a
/// process-wide counter, so ids from one process never repeat.
pub fn generate_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        (nanos & 0xFFFF_FFFF) as u32,
        ((nanos >> 32) & 0xFFFF) as u16,
        ((nanos >> 48) & 0x0FFF) as u16,
        0x8000 | (count & 0x3FFF) as u16,
        (count >> 14) & 0xFFFF_FFFF_FFFF,
    )
}
