use super::*;

#[test]
fn parses_sets_with_optional_fields_and_missing_groups() {
    let json = r#"
{
  "sequences": [
    [
      { "pose": [{ "x": 0.5, "y": 0.25, "z": -0.1, "visibility": 0.9 }], "left_hand": [] },
      { "right_hand": [{ "x": 0.1, "y": 0.2 }] }
    ],
    [
      { "pose_landmarks": [{ "x": 0.3, "y": 0.3 }] }
    ]
  ]
}
"#;
    let set = SignSequenceSet::from_json_str(json).unwrap();
    assert_eq!(set.sequences.len(), 2);
    assert_eq!(set.total_frames(), 3);

    let f0 = &set.sequences[0].frames[0];
    assert_eq!(f0.pose[0].z, Some(-0.1));
    assert_eq!(f0.pose[0].visibility, Some(0.9));
    assert!(f0.left_hand.is_empty());
    assert!(f0.right_hand.is_empty());

    let f1 = &set.sequences[0].frames[1];
    assert!(f1.pose.is_empty());
    assert_eq!(f1.right_hand[0], Landmark::new(0.1, 0.2));

    assert_eq!(set.sequences[1].frames[0].pose.len(), 1);
}

#[test]
fn into_frames_concatenates_in_order() {
    let mk = |x: f64| FrameData {
        pose: vec![Landmark::new(x, 0.0)],
        ..FrameData::default()
    };
    let set = SignSequenceSet::new(vec![
        Sequence::new(vec![mk(0.1), mk(0.2), mk(0.3)]),
        Sequence::new(vec![]),
        Sequence::new(vec![mk(0.4), mk(0.5)]),
    ]);
    assert_eq!(set.total_frames(), 5);
    let xs: Vec<f64> = set.into_frames().iter().map(|f| f.pose[0].x).collect();
    assert_eq!(xs, vec![0.1, 0.2, 0.3, 0.4, 0.5]);
}

#[test]
fn empty_sets_report_empty() {
    assert!(SignSequenceSet::default().is_empty());
    assert!(SignSequenceSet::new(vec![Sequence::default()]).is_empty());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = SignSequenceSet::from_json_str("{ \"sequences\": 3 }").unwrap_err();
    assert!(err.to_string().contains("serialization error:"));
}

#[test]
fn sequence_parses_bare_frame_array() {
    let seq = Sequence::from_reader(r#"[{ "pose": [] }, {}]"#.as_bytes()).unwrap();
    assert_eq!(seq.len(), 2);
    assert!(!seq.is_empty());
}

#[test]
fn optional_fields_are_omitted_when_serializing() {
    let s = serde_json::to_string(&Landmark::new(0.5, 0.5)).unwrap();
    assert_eq!(s, r#"{"x":0.5,"y":0.5}"#);
}

#[test]
fn landmark_projects_to_pixels() {
    let lm = Landmark::new(0.25, 0.5);
    let p = lm.project(Canvas {
        width: 100,
        height: 40,
    });
    assert_eq!(p, Point::new(25.0, 20.0));
}
