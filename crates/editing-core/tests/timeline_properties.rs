use proptest::prelude::*;

use reframe_editing_core::{ClipEditor, EditorSettings, KeyframeTrack, RemoveOutcome, SegmentModel};
use reframe_project_model::project::SourceMedia;
use reframe_project_model::region::{AspectRatio, CropRect};

fn screen_recording(duration_secs: f64) -> SourceMedia {
    SourceMedia {
        path: "sources/screen.mp4".to_string(),
        duration_secs,
        framerate: 30.0,
        width: 1920,
        height: 1080,
    }
}

fn editor(duration_secs: f64) -> ClipEditor {
    ClipEditor::new(
        "clip",
        "Screen",
        screen_recording(duration_secs),
        AspectRatio::PORTRAIT,
        EditorSettings::default(),
    )
    .expect("valid source")
}

fn split_model(boundaries: &[f64], speeds: &[f64]) -> SegmentModel {
    let mut model = SegmentModel::new(60.0, 30.0).expect("positive duration");
    for &b in boundaries {
        let _ = model.add_boundary(b);
    }
    for i in 0..model.segments().len() {
        let _ = model.set_segment_speed(i, speeds[i % speeds.len()]);
    }
    model
}

#[test]
fn speed_change_shortens_visual_timeline() {
    let mut ed = editor(60.0);
    ed.add_boundary(30.0).unwrap();
    ed.set_segment_speed(1, 2.0).unwrap();

    assert!((ed.visual_duration() - 45.0).abs() < 1e-9);
    assert!((ed.source_to_visual(45.0) - 37.5).abs() < 1e-9);
    assert!((ed.visual_to_source(37.5) - 45.0).abs() < 1e-9);
}

#[test]
fn crop_interpolates_halfway_between_keyframes() {
    let mut track: KeyframeTrack<CropRect> = KeyframeTrack::new(30.0);
    track.add_or_update_keyframe(0.0, CropRect::new(0.0, 0.0, 100.0, 100.0), 10.0);
    track.add_or_update_keyframe(1.0, CropRect::new(50.0, 50.0, 100.0, 100.0), 10.0);

    let mid = track.interpolate(0.5).unwrap();
    assert!((mid.x - 25.0).abs() < 1e-9);
    assert!((mid.y - 25.0).abs() < 1e-9);
    assert!((mid.width - 100.0).abs() < 1e-9);
}

#[test]
fn trimming_tail_pins_value_in_effect_at_hidden_keyframe() {
    let mut ed = editor(60.0);
    ed.add_boundary(40.0).unwrap();
    ed.set_crop(50.0, CropRect::new(1000.0, 0.0, 607.5, 1080.0));
    let in_effect = ed.crop_at(50.0).unwrap();

    ed.toggle_trim(1).unwrap();

    let crop = ed.crop().track();
    assert!(crop.keyframe_at_frame(1500).is_none());
    let pinned = crop.keyframe_at_frame(1200).expect("boundary keyframe");
    assert!(pinned.is_permanent());
    assert_eq!(pinned.payload, in_effect);
    assert_eq!(ed.crop_at(40.0), Some(in_effect));
}

#[test]
fn trim_then_restore_recovers_edge_value() {
    let mut ed = editor(60.0);
    ed.add_boundary(10.0).unwrap();
    ed.add_boundary(45.0).unwrap();
    ed.set_crop(20.0, CropRect::new(200.0, 0.0, 607.5, 1080.0));
    ed.set_crop(60.0, CropRect::new(1300.0, 0.0, 607.5, 1080.0));
    ed.set_crop(0.0, CropRect::new(50.0, 0.0, 607.5, 1080.0));
    let start = ed.crop_at(0.0).unwrap();
    let end = ed.crop_at(60.0).unwrap();

    ed.toggle_trim(0).unwrap();
    ed.toggle_trim(2).unwrap();
    assert!((ed.visual_duration() - 35.0).abs() < 1e-9);

    ed.toggle_trim(2).unwrap();
    ed.toggle_trim(0).unwrap();
    assert_eq!(ed.crop_at(0.0), Some(start));
    assert_eq!(ed.crop_at(60.0), Some(end));
    assert!(ed.segments().trim_range().is_none());
}

#[test]
fn deleting_both_keyframes_then_adding_one_is_valid() {
    let mut track: KeyframeTrack<f64> = KeyframeTrack::new(30.0);
    track.add_or_update_keyframe(0.0, 1.0, 10.0);
    track.add_or_update_keyframe(10.0, 2.0, 10.0);

    assert_eq!(track.remove_keyframe(0.0, 0.0), RemoveOutcome::Removed);
    assert_eq!(track.remove_keyframe(10.0, 0.0), RemoveOutcome::Reset);
    track.add_or_update_keyframe(4.0, 9.0, 10.0);

    assert_eq!(track.len(), 1);
    for time in [0.0, 2.0, 4.0, 7.5, 10.0] {
        assert_eq!(track.interpolate(time), Some(9.0));
    }
}

#[test]
fn selection_is_cleared_when_keyframe_is_deleted() {
    let mut ed = editor(20.0);
    ed.set_crop(5.0, CropRect::new(300.0, 0.0, 607.5, 1080.0));
    assert!(ed.selected_crop_keyframe(5.0).is_some());
    ed.delete_crop_keyframe(5.0).unwrap();
    assert!(ed.selected_crop_keyframe(5.0).is_none());
}

proptest! {
    #[test]
    fn untouched_timeline_is_identity(
        boundaries in prop::collection::vec(1.0f64..59.0, 0..6),
        t in -10.0f64..70.0,
    ) {
        let model = split_model(&boundaries, &[1.0]);
        let expected = t.clamp(0.0, 60.0);
        prop_assert!((model.source_time_to_visual_time(t) - expected).abs() < 1e-9);
        prop_assert!((model.visual_time_to_source_time(t) - expected).abs() < 1e-9);
    }

    #[test]
    fn visible_source_time_round_trips(
        boundaries in prop::collection::vec(1.0f64..59.0, 1..6),
        speeds in prop::collection::vec(0.25f64..4.0, 1..6),
        trim_first in any::<bool>(),
        trim_last in any::<bool>(),
        pick in any::<prop::sample::Index>(),
        frac in 0.0f64..=1.0,
    ) {
        let mut model = split_model(&boundaries, &speeds);
        let last = model.segments().len() - 1;
        if trim_first {
            let _ = model.toggle_trim_segment(0);
        }
        if trim_last {
            let _ = model.toggle_trim_segment(last);
        }

        let visible: Vec<_> = model.segments().iter().filter(|s| !s.is_trimmed).cloned().collect();
        prop_assume!(!visible.is_empty());
        let segment = pick.get(&visible);
        let t = segment.source_start + frac * segment.source_len();

        let back = model.visual_time_to_source_time(model.source_time_to_visual_time(t));
        prop_assert!((back - t).abs() < 1e-6, "t={} back={}", t, back);
    }

    #[test]
    fn mappings_are_monotonic(
        boundaries in prop::collection::vec(1.0f64..59.0, 0..6),
        speeds in prop::collection::vec(0.25f64..4.0, 1..6),
        a in 0.0f64..60.0,
        b in 0.0f64..60.0,
    ) {
        let model = split_model(&boundaries, &speeds);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(model.source_time_to_visual_time(lo) <= model.source_time_to_visual_time(hi) + 1e-12);
    }
}
