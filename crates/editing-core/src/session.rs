//! Multi-clip editing session.
//!
//! Exactly one clip is live as a [`ClipEditor`]; every other clip exists
//! only as its last saved [`ClipSnapshot`]. Switching clips saves the live
//! one and hydrates the next in a single call.

use reframe_project_model::project::{ClipSnapshot, Project, SourceMedia};
use reframe_project_model::region::AspectRatio;

use crate::editor::{ClipEditor, EditorSettings};
use crate::error::{rejected, EditError, EditResult};

#[derive(Debug, Clone)]
pub struct EditSession {
    target_aspect: AspectRatio,
    settings: EditorSettings,
    clips: Vec<ClipSnapshot>,
    live: Option<ClipEditor>,
}

impl EditSession {
    /// An empty session.
    pub fn new(target_aspect: AspectRatio, settings: EditorSettings) -> Self {
        Self {
            target_aspect,
            settings,
            clips: Vec::new(),
            live: None,
        }
    }

    /// Open a project, making its saved active clip (or the first clip)
    /// live.
    pub fn from_project(project: &Project, settings: EditorSettings) -> EditResult<Self> {
        let mut session = Self {
            target_aspect: project.target_aspect,
            settings,
            clips: project.clips.clone(),
            live: None,
        };

        let active = project
            .active_clip
            .as_deref()
            .filter(|id| session.position(id).is_some())
            .or_else(|| project.clips.first().map(|c| c.id.as_str()));
        if let Some(id) = active {
            session.switch_to(id)?;
        }

        tracing::info!(
            project = %project.name,
            clips = session.clips.len(),
            live = ?session.live_id(),
            "Session opened"
        );
        Ok(session)
    }

    /// Write the session back into `project`, live clip included.
    pub fn store_into(&self, project: &mut Project) {
        project.target_aspect = self.target_aspect;
        project.clips = self.snapshots();
        project.active_clip = self.live_id().map(str::to_string);
        project.touch();
    }

    pub fn target_aspect(&self) -> AspectRatio {
        self.target_aspect
    }

    /// Change the output aspect ratio. The live crop is re-constrained now;
    /// saved clips are re-constrained when they are next hydrated or
    /// exported.
    pub fn set_target_aspect(&mut self, aspect: AspectRatio) {
        self.target_aspect = aspect;
        if let Some(live) = &mut self.live {
            live.set_target_aspect(aspect);
        }
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Saved clip states, in order. The live clip's entry is only as fresh
    /// as the last [`save_live`](Self::save_live).
    pub fn clips(&self) -> &[ClipSnapshot] {
        &self.clips
    }

    /// Every clip's current state, live clip taken from the editor.
    pub fn snapshots(&self) -> Vec<ClipSnapshot> {
        self.clips
            .iter()
            .map(|clip| match &self.live {
                Some(live) if live.id() == clip.id => live.to_snapshot(),
                _ => clip.clone(),
            })
            .collect()
    }

    pub fn live(&self) -> Option<&ClipEditor> {
        self.live.as_ref()
    }

    pub fn live_mut(&mut self) -> Option<&mut ClipEditor> {
        self.live.as_mut()
    }

    pub fn live_id(&self) -> Option<&str> {
        self.live.as_ref().map(ClipEditor::id)
    }

    pub fn is_live(&self, id: &str) -> bool {
        self.live_id() == Some(id)
    }

    /// Persist the live editor into its snapshot slot.
    pub fn save_live(&mut self) {
        let Some(live) = &self.live else {
            return;
        };
        let snapshot = live.to_snapshot();
        if let Some(slot) = self.clips.iter_mut().find(|c| c.id == snapshot.id) {
            *slot = snapshot;
        }
    }

    /// Make clip `id` live: save the current clip, then hydrate the next.
    pub fn switch_to(&mut self, id: &str) -> EditResult<()> {
        let Some(pos) = self.position(id) else {
            return rejected(EditError::UnknownClip { id: id.to_string() });
        };
        if self.is_live(id) {
            return Ok(());
        }

        self.save_live();
        let next = ClipEditor::from_snapshot(&self.clips[pos], self.target_aspect, self.settings.clone())?;
        let previous = self.live.replace(next);
        tracing::info!(
            from = previous.as_ref().map(ClipEditor::id),
            to = id,
            "Switched live clip"
        );
        Ok(())
    }

    /// Append a never-edited clip. It becomes live if nothing else is.
    pub fn add_clip(&mut self, name: impl Into<String>, source: SourceMedia) -> EditResult<String> {
        let snapshot = ClipSnapshot::new(name, source);
        let editor = ClipEditor::from_snapshot(&snapshot, self.target_aspect, self.settings.clone())?;
        let id = snapshot.id.clone();
        self.clips.push(snapshot);
        if self.live.is_none() {
            self.live = Some(editor);
        }
        tracing::info!(clip = %id, "Clip added");
        Ok(id)
    }

    /// Drop a clip. Removing the live clip makes a neighbour live.
    pub fn remove_clip(&mut self, id: &str) -> EditResult<ClipSnapshot> {
        let Some(pos) = self.position(id) else {
            return rejected(EditError::UnknownClip { id: id.to_string() });
        };

        if self.is_live(id) {
            let neighbour = self
                .clips
                .get(pos + 1)
                .or_else(|| pos.checked_sub(1).and_then(|p| self.clips.get(p)))
                .map(|c| c.id.clone());
            match neighbour {
                Some(next) => self.switch_to(&next)?,
                None => {
                    self.save_live();
                    self.live = None;
                }
            }
        }

        let removed = self.clips.remove(pos);
        tracing::info!(clip = %removed.id, "Clip removed");
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_project_model::region::CropRect;

    fn media(duration: f64) -> SourceMedia {
        SourceMedia {
            path: "sources/a.mp4".to_string(),
            duration_secs: duration,
            framerate: 30.0,
            width: 1920,
            height: 1080,
        }
    }

    fn two_clip_session() -> (EditSession, String, String) {
        let mut session = EditSession::new(AspectRatio::PORTRAIT, EditorSettings::default());
        let a = session.add_clip("A", media(60.0)).unwrap();
        let b = session.add_clip("B", media(30.0)).unwrap();
        (session, a, b)
    }

    #[test]
    fn test_first_added_clip_is_live() {
        let (session, a, _) = two_clip_session();
        assert_eq!(session.live_id(), Some(a.as_str()));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_switch_saves_live_edits() {
        let (mut session, a, b) = two_clip_session();
        session.live_mut().unwrap().add_boundary(20.0).unwrap();
        session.switch_to(&b).unwrap();

        let saved_a = session.clips().iter().find(|c| c.id == a).unwrap();
        assert_eq!(saved_a.segments.as_ref().unwrap().boundaries, vec![0.0, 20.0, 60.0]);
        assert_eq!(session.live().unwrap().duration(), 30.0);

        session.switch_to(&a).unwrap();
        assert_eq!(session.live().unwrap().segments().segments().len(), 2);
    }

    #[test]
    fn test_switch_to_unknown_clip_is_rejected() {
        let (mut session, a, _) = two_clip_session();
        assert_eq!(
            session.switch_to("missing"),
            Err(EditError::UnknownClip { id: "missing".to_string() })
        );
        assert_eq!(session.live_id(), Some(a.as_str()));
    }

    #[test]
    fn test_snapshots_reflect_unsaved_live_state() {
        let (mut session, a, _) = two_clip_session();
        session
            .live_mut()
            .unwrap()
            .set_crop(5.0, CropRect::new(0.0, 0.0, 607.5, 1080.0));
        let stale = session.clips().iter().find(|c| c.id == a).unwrap();
        assert!(stale.crop_keyframes.is_empty());

        let fresh = session.snapshots();
        assert_eq!(fresh[0].crop_keyframes.len(), 3);
    }

    #[test]
    fn test_remove_live_clip_promotes_neighbour() {
        let (mut session, a, b) = two_clip_session();
        session.remove_clip(&a).unwrap();
        assert_eq!(session.live_id(), Some(b.as_str()));
        session.remove_clip(&b).unwrap();
        assert!(session.live().is_none());
        assert!(session.is_empty());
    }

    #[test]
    fn test_project_round_trip_keeps_active_clip() {
        let (mut session, _, b) = two_clip_session();
        session.switch_to(&b).unwrap();
        let mut project = Project::new("demo", AspectRatio::PORTRAIT);
        session.store_into(&mut project);
        assert_eq!(project.active_clip.as_deref(), Some(b.as_str()));

        let reopened = EditSession::from_project(&project, EditorSettings::default()).unwrap();
        assert_eq!(reopened.live_id(), Some(b.as_str()));
        assert_eq!(reopened.snapshots(), project.clips);
    }

    #[test]
    fn test_add_clip_rejects_bad_source() {
        let mut session = EditSession::new(AspectRatio::PORTRAIT, EditorSettings::default());
        assert!(session.add_clip("broken", media(0.0)).is_err());
        assert!(session.is_empty());
    }
}
