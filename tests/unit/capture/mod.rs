use super::*;
use crate::capture::gif::GifCapture;
use crate::capture::memory::InMemoryCapture;

fn surface(w: u32, h: u32) -> CpuSurface {
    CpuSurface::new(Canvas {
        width: w,
        height: h,
    })
    .unwrap()
}

fn fps20() -> Fps {
    Fps::new(20, 1).unwrap()
}

fn artifact(session: u64) -> CaptureArtifact {
    CaptureArtifact {
        session: SessionHandle(session),
        format: MediaFormat::RawRgba,
        canvas: Canvas {
            width: 1,
            height: 1,
        },
        fps: fps20(),
        frame_count: 1,
        bytes: Arc::from(vec![0u8; 4]),
    }
}

#[test]
fn file_name_uses_first_ten_chars_with_underscored_whitespace() {
    assert_eq!(
        artifact_file_name("hello world", MediaFormat::Mp4),
        "sign_language_hello_worl.mp4"
    );
    assert_eq!(
        artifact_file_name("hi", MediaFormat::Gif),
        "sign_language_hi.gif"
    );
    assert_eq!(
        artifact_file_name("a  \t b", MediaFormat::Mp4),
        "sign_language_a_b.mp4"
    );
}

#[test]
fn file_name_falls_back_to_video_and_strips_separators() {
    assert_eq!(
        artifact_file_name("", MediaFormat::Gif),
        "sign_language_video.gif"
    );
    assert_eq!(
        artifact_file_name("../etc", MediaFormat::Mp4),
        "sign_language_.._etc.mp4"
    );
    assert_eq!(
        artifact(1).file_name("thank you"),
        "sign_language_thank_you.rgba"
    );
}

#[test]
fn slot_keeps_the_newest_session() {
    let slot = ArtifactSlot::default();
    assert!(slot.latest().is_none());
    assert!(slot.publish(artifact(2)));
    assert!(!slot.publish(artifact(1)));
    assert_eq!(slot.latest().unwrap().session, SessionHandle(2));
    assert!(slot.publish(artifact(3)));
    assert_eq!(slot.latest().unwrap().session, SessionHandle(3));
}

#[test]
fn disabled_capture_never_opens() {
    let s = surface(4, 4);
    let mut cap = DisabledCapture::new("no recorder");
    let err = cap.begin_session(&s, fps20()).unwrap_err();
    assert!(matches!(err, SignplayError::CaptureUnsupported(_)));
    assert!(cap.open_session().is_none());
    assert!(cap.latest_artifact().is_none());
    cap.end_session(SessionHandle(1)).unwrap();
}

#[test]
fn open_capture_off_is_disabled() {
    let s = surface(4, 4);
    let mut cap = open_capture(CaptureKind::Off, CaptureOpts::default());
    assert!(matches!(
        cap.begin_session(&s, fps20()),
        Err(SignplayError::CaptureUnsupported(_))
    ));
}

#[test]
fn memory_session_records_frames_and_publishes_on_end() {
    let mut s = surface(2, 2);
    s.paint(|_ctx| ()).unwrap();
    let mut cap = InMemoryCapture::default();

    let h = cap.begin_session(&s, fps20()).unwrap();
    assert_eq!(cap.open_session(), Some(h));
    cap.capture_frame(h, &s).unwrap();
    cap.capture_frame(h, &s).unwrap();
    assert_eq!(cap.open_frames(), Some(2));
    assert!(cap.latest_artifact().is_none());

    cap.end_session(h).unwrap();
    cap.end_session(h).unwrap();
    assert_eq!(cap.sessions_ended(), 1);
    let art = cap.latest_artifact().unwrap();
    assert_eq!(art.session, h);
    assert_eq!(art.frame_count, 2);
    assert_eq!(art.bytes.len(), 2 * 2 * 2 * 4);
    assert!(art.bytes.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn memory_begin_ends_the_previous_session() {
    let s = surface(2, 2);
    let mut cap = InMemoryCapture::default();
    let a = cap.begin_session(&s, fps20()).unwrap();
    cap.capture_frame(a, &s).unwrap();
    let b = cap.begin_session(&s, fps20()).unwrap();
    assert!(b > a);
    assert_eq!(cap.sessions_ended(), 1);
    assert_eq!(cap.latest_artifact().unwrap().session, a);
    assert!(cap.capture_frame(a, &s).is_err());
}

#[test]
fn memory_discards_empty_sessions() {
    let s = surface(2, 2);
    let mut cap = InMemoryCapture::default();
    let h = cap.begin_session(&s, fps20()).unwrap();
    cap.end_session(h).unwrap();
    assert!(cap.latest_artifact().is_none());
    assert!(cap.open_session().is_none());
}

#[test]
fn gif_session_encodes_in_background() {
    let mut s = surface(8, 8);
    s.paint(|_ctx| ()).unwrap();
    let mut cap = GifCapture::new(CaptureOpts::default());
    let h = cap.begin_session(&s, fps20()).unwrap();
    for _ in 0..3 {
        cap.capture_frame(h, &s).unwrap();
    }
    cap.end_session(h).unwrap();
    assert!(cap.open_session().is_none());

    cap.wait_idle();
    let art = cap.latest_artifact().unwrap();
    assert_eq!(art.format, MediaFormat::Gif);
    assert_eq!(art.frame_count, 3);
    assert!(art.bytes.starts_with(b"GIF89a"));
}

#[test]
fn boxed_pipeline_forwards() {
    let s = surface(2, 2);
    let mut cap: Box<dyn CapturePipeline> = Box::new(InMemoryCapture::default());
    let h = cap.begin_session(&s, fps20()).unwrap();
    cap.capture_frame(h, &s).unwrap();
    cap.end_session(h).unwrap();
    cap.wait_idle();
    assert_eq!(cap.latest_artifact().unwrap().frame_count, 1);
}
