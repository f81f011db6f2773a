use anyhow::Result;
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use spectacle_vision::landmark::{FrameSize, NormalizedLandmark, LEFT_EYE_OUTER, NOSE_TIP, RIGHT_EYE_OUTER};
use spectacle_vision::render::{self, Compositor, MARKER_COLOR};
use spectacle_vision::source::{JsonLinesSource, LandmarkSource};
use spectacle_vision::{FitParams, OverlayTracker, Placement};

fn face(left: (f32, f32), right: (f32, f32), nose: (f32, f32)) -> Vec<NormalizedLandmark> {
    let mut lm = vec![NormalizedLandmark::default(); 478];
    lm[LEFT_EYE_OUTER] = NormalizedLandmark { x: left.0, y: left.1, z: 0.0 };
    lm[RIGHT_EYE_OUTER] = NormalizedLandmark { x: right.0, y: right.1, z: 0.0 };
    lm[NOSE_TIP] = NormalizedLandmark { x: nose.0, y: nose.1, z: 0.0 };
    lm
}

#[test]
fn test_no_face_frame_does_not_leak_previous_placement() -> Result<()> {
    let mut tracker = OverlayTracker::new(FitParams::default(), false);
    let frame = FrameSize::new(640, 480);

    let seen = tracker
        .on_results(frame, &[face((0.6, 0.4), (0.4, 0.4), (0.5, 0.55))])
        .expect("frame size is known");
    assert!(seen.placement.visible);
    assert!(seen.placement.width > 0.0);

    let gone = tracker.on_results(frame, &[]).expect("frame size is known");
    assert_eq!(gone.placement, Placement::hidden());

    // Recovery on the next frame with a face gives the same answer as before.
    let back = tracker
        .on_results(frame, &[face((0.6, 0.4), (0.4, 0.4), (0.5, 0.55))])
        .expect("frame size is known");
    assert_eq!(back.placement, seen.placement);
    Ok(())
}

#[test]
fn test_only_first_face_is_used() -> Result<()> {
    let mut tracker = OverlayTracker::new(FitParams::default(), false);
    let frame = FrameSize::new(100, 100);
    let first = face((0.6, 0.3), (0.4, 0.3), (0.5, 0.4));
    let second = face((0.9, 0.8), (0.7, 0.8), (0.8, 0.9));

    let both = tracker.on_results(frame, &[first.clone(), second]).unwrap();
    let alone = tracker.on_results(frame, &[first]).unwrap();
    assert_eq!(both.placement, alone.placement);
    Ok(())
}

#[test]
fn test_frame_size_change_rescales_placement() -> Result<()> {
    let mut tracker = OverlayTracker::new(FitParams::default(), false);
    let f = face((0.6, 0.4), (0.4, 0.4), (0.5, 0.6));

    let small = tracker.on_results(FrameSize::new(320, 240), &[f.clone()]).unwrap();
    let large = tracker.on_results(FrameSize::new(640, 480), &[f]).unwrap();

    assert_eq!(tracker.surface(), FrameSize::new(640, 480));
    assert!((large.placement.width - 2.0 * small.placement.width).abs() < 1e-3);
    assert!((large.placement.center_y - 2.0 * small.placement.center_y).abs() < 1e-3);
    Ok(())
}

#[test]
fn test_stream_drives_rendering() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut lines = String::new();
    let visible = serde_json::json!({ "faces": [face((0.6, 0.5), (0.4, 0.5), (0.5, 0.6))] });
    lines.push_str(&visible.to_string());
    lines.push('\n');
    lines.push_str("{\"faces\":[]}\n");

    let mut source = JsonLinesSource::new(lines.as_bytes());
    let mut tracker = OverlayTracker::new(FitParams::default(), true);
    let compositor = Compositor::new(RgbaImage::from_pixel(44, 10, Rgba([0, 200, 0, 255])));
    let frame_size = FrameSize::new(100, 80);

    let mut rendered = Vec::new();
    while let Some(results) = source.next_result()? {
        let mut frame = RgbImage::from_pixel(frame_size.width, frame_size.height, Rgb([0, 0, 90]));
        let update = tracker
            .on_results(frame_size, &results.faces)
            .expect("frame size is known");
        render::mirror_frame(&mut frame);
        compositor.composite(&mut frame, &update.placement);
        render::draw_markers(&mut frame, &update.markers, 2, MARKER_COLOR);
        rendered.push((frame, update));
    }
    assert_eq!(rendered.len(), 2);

    let (with_face, update) = &rendered[0];
    assert!(update.placement.visible);
    assert_eq!(update.markers.len(), 3);
    // Eye midpoint (50, 40) pulled 2px toward the nose.
    let (cx, cy) = (update.placement.center_x, update.placement.center_y);
    assert!((cx - 50.0).abs() < 1e-3 && (cy - 42.0).abs() < 1e-3);
    assert_eq!(with_face.get_pixel(50, 44).0, [0, 200, 0]);
    // Nose marker is drawn last, on top of the overlay.
    assert_eq!(with_face.get_pixel(50, 48).0, [255, 0, 0]);

    let (without_face, update) = &rendered[1];
    assert!(!update.placement.visible);
    assert!(update.markers.is_empty());
    assert!(without_face.pixels().all(|p| p.0 == [0, 0, 90]));
    Ok(())
}
