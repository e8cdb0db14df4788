use super::*;

#[test]
fn frame_index_wraps_exactly_at_count() {
    assert_eq!(FrameIndex(0).advance(3), (FrameIndex(1), false));
    assert_eq!(FrameIndex(1).advance(3), (FrameIndex(2), false));
    assert_eq!(FrameIndex(2).advance(3), (FrameIndex(0), true));
    assert_eq!(FrameIndex(0).advance(1), (FrameIndex(0), true));
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::new(20, 1).unwrap().interval(), Duration::from_millis(50));
}

#[test]
fn fps_scaled_stays_rational() {
    let base = Fps::new(20, 1).unwrap();
    assert_eq!(base.scaled(Speed::NORMAL).unwrap(), Fps::new(20, 1).unwrap());
    assert_eq!(
        base.scaled(Speed::new(0.5).unwrap()).unwrap(),
        Fps::new(10, 1).unwrap()
    );
    assert_eq!(
        base.scaled(Speed::new(1.5).unwrap()).unwrap(),
        Fps::new(30, 1).unwrap()
    );

    let ntsc = Fps::new(30000, 1001).unwrap();
    let half = ntsc.scaled(Speed::new(0.5).unwrap()).unwrap();
    assert!((half.as_f64() - ntsc.as_f64() / 2.0).abs() < 1e-9);
}

#[test]
fn speed_validation() {
    assert!(Speed::new(0.0).is_err());
    assert!(Speed::new(-1.0).is_err());
    assert!(Speed::new(f64::NAN).is_err());
    assert!(Speed::new(f64::INFINITY).is_err());
    assert_eq!(Speed::new(1.5).unwrap().get(), 1.5);
    assert_eq!(Speed::default(), Speed::NORMAL);
}

#[test]
fn speed_deserializes_through_validation() {
    let s: Speed = serde_json::from_str("0.5").unwrap();
    assert_eq!(s.get(), 0.5);
    assert!(serde_json::from_str::<Speed>("0").is_err());
}

#[test]
fn canvas_projects_normalized_points() {
    let c = Canvas {
        width: 640,
        height: 480,
    };
    assert_eq!(c.project(0.5, 0.5), Point::new(320.0, 240.0));
    assert_eq!(c.project(0.0, 1.0), Point::new(0.0, 480.0));
}

#[test]
fn rgba_premultiplies() {
    assert_eq!(Rgba8::rgb(10, 20, 30).premultiplied(), [10, 20, 30, 255]);
    assert_eq!(Rgba8([255, 0, 0, 128]).premultiplied(), [128, 0, 0, 128]);
}
