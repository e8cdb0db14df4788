use super::*;
use crate::foundation::error::SignplayError;
use crate::model::topology::{HAND_POINT_COUNT, POSE_POINT_COUNT};

fn surface(w: u32, h: u32) -> CpuSurface {
    CpuSurface::new(Canvas {
        width: w,
        height: h,
    })
    .unwrap()
}

fn points(n: usize) -> Vec<Landmark> {
    (0..n)
        .map(|i| Landmark::new(0.1 + 0.8 * (i as f64) / (n.max(1) as f64), 0.5))
        .collect()
}

#[test]
fn empty_frame_only_clears_to_background() {
    let mut s = surface(32, 32);
    let drawer = LandmarkDrawer::default();
    let stats = drawer.render(&mut s, &FrameData::default()).unwrap();
    assert_eq!(stats, DrawStats::default());
    assert_eq!(s.pixel(0, 0), Some(drawer.style().background.premultiplied()));
    assert_eq!(s.pixel(31, 31), Some(drawer.style().background.premultiplied()));
}

#[test]
fn point_lands_at_scaled_position_in_group_color() {
    let mut s = surface(64, 32);
    let drawer = LandmarkDrawer::default();
    let frame = FrameData {
        left_hand: vec![Landmark::new(0.25, 0.5)],
        ..FrameData::default()
    };
    let stats = drawer.render(&mut s, &frame).unwrap();
    assert_eq!(stats.points, 1);
    assert_eq!(stats.connections, 0);
    // (0.25 * 64, 0.5 * 32) = (16, 16); the pixel just inside the dot is fully covered.
    assert_eq!(s.pixel(16, 16), Some(drawer.style().left_hand.premultiplied()));
    assert_eq!(s.pixel(40, 16), Some(drawer.style().background.premultiplied()));
}

#[test]
fn connections_require_both_endpoints() {
    let mut s = surface(64, 64);
    let drawer = LandmarkDrawer::default();

    let short = FrameData {
        left_hand: points(3),
        ..FrameData::default()
    };
    let stats = drawer.render(&mut s, &short).unwrap();
    assert_eq!(stats.points, 3);
    // Only (0,1) and (1,2) of the hand table fit in three points.
    assert_eq!(stats.connections, 2);

    let single = FrameData {
        right_hand: points(1),
        ..FrameData::default()
    };
    assert_eq!(drawer.render(&mut s, &single).unwrap().connections, 0);

    let full = FrameData {
        pose: points(POSE_POINT_COUNT),
        left_hand: points(HAND_POINT_COUNT),
        right_hand: points(HAND_POINT_COUNT),
    };
    let stats = drawer.render(&mut s, &full).unwrap();
    assert_eq!(
        stats.points,
        POSE_POINT_COUNT + 2 * HAND_POINT_COUNT
    );
    assert_eq!(
        stats.connections,
        POSE_CONNECTIONS.len() + 2 * HAND_CONNECTIONS.len()
    );
}

#[test]
fn truncated_pose_skips_missing_joints() {
    let mut s = surface(32, 32);
    let drawer = LandmarkDrawer::default();
    // Indices 0..=10 cover the face connections only.
    let frame = FrameData {
        pose: points(11),
        ..FrameData::default()
    };
    let stats = drawer.render(&mut s, &frame).unwrap();
    assert_eq!(stats.connections, 9);
}

#[test]
fn detached_surface_reports_unavailable() {
    let mut s = surface(16, 16);
    s.detach();
    let err = LandmarkDrawer::default()
        .render(&mut s, &FrameData::default())
        .unwrap_err();
    assert!(matches!(err, SignplayError::SurfaceUnavailable(_)));
}

#[test]
fn style_deserializes_with_defaults() {
    let style: DrawStyle = serde_json::from_str(r#"{ "point_radius": 6.0 }"#).unwrap();
    assert_eq!(style.point_radius, 6.0);
    assert_eq!(style.pose, DrawStyle::default().pose);
}
