use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn fps20() -> Fps {
    Fps::new(20, 1).unwrap()
}

#[test]
fn first_tick_is_due_immediately_then_every_interval() {
    let mut c = FrameClock::new();
    c.start(5, fps20(), Speed::NORMAL, ms(100)).unwrap();
    assert_eq!(c.next_deadline(), Some(ms(100)));
    assert_eq!(c.poll(ms(99)), None);

    let t = c.poll(ms(100)).unwrap();
    assert_eq!(t.index, FrameIndex(0));
    assert_eq!(c.next_deadline(), Some(ms(150)));
    assert_eq!(c.poll(ms(149)), None);
    assert_eq!(c.poll(ms(150)).unwrap().index, FrameIndex(1));
}

#[test]
fn wraps_once_per_pass() {
    let mut c = FrameClock::new();
    c.start(5, fps20(), Speed::NORMAL, ms(0)).unwrap();

    let mut seen = Vec::new();
    let mut wraps = 0;
    let mut now = ms(0);
    for _ in 0..5 {
        let t = c.poll(now).unwrap();
        seen.push(t.index.0);
        if t.wrapped {
            wraps += 1;
        }
        now += ms(50);
    }
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    assert_eq!(wraps, 1);
    assert_eq!(c.position(), Some(FrameIndex(0)));

    let t = c.poll(now).unwrap();
    assert_eq!(t.index, FrameIndex(0));
    assert!(!t.wrapped);
}

#[test]
fn single_frame_wraps_every_tick() {
    let mut c = FrameClock::new();
    c.start(1, fps20(), Speed::NORMAL, ms(0)).unwrap();
    let t = c.poll(ms(0)).unwrap();
    assert_eq!((t.index, t.next, t.wrapped), (FrameIndex(0), FrameIndex(0), true));
}

#[test]
fn speed_scales_interval() {
    let mut c = FrameClock::new();
    c.start(5, fps20(), Speed::new(2.0).unwrap(), ms(0)).unwrap();
    assert_eq!(c.interval(), Some(ms(25)));
    c.restart(5, fps20(), Speed::new(0.5).unwrap(), FrameIndex(0), ms(0))
        .unwrap();
    assert_eq!(c.interval(), Some(ms(100)));
}

#[test]
fn stop_cancels_and_is_idempotent() {
    let mut c = FrameClock::new();
    c.stop();
    assert!(!c.is_running());

    c.start(3, fps20(), Speed::NORMAL, ms(0)).unwrap();
    assert!(c.is_running());
    c.stop();
    c.stop();
    assert!(!c.is_running());
    assert_eq!(c.poll(ms(10_000)), None);
    assert_eq!(c.next_deadline(), None);
}

#[test]
fn restart_replaces_the_pending_schedule() {
    let mut c = FrameClock::new();
    c.start(10, fps20(), Speed::NORMAL, ms(0)).unwrap();
    c.poll(ms(0)).unwrap();
    c.poll(ms(50)).unwrap();
    let before = c.generation();

    c.restart(10, fps20(), Speed::new(0.5).unwrap(), FrameIndex(2), ms(60))
        .unwrap();
    assert_eq!(c.generation(), before + 1);
    // The old run's tick at 100ms no longer exists.
    assert_eq!(c.next_deadline(), Some(ms(60)));
    assert_eq!(c.poll(ms(60)).unwrap().index, FrameIndex(2));
    assert_eq!(c.poll(ms(100)), None);
    assert_eq!(c.poll(ms(160)).unwrap().index, FrameIndex(3));
}

#[test]
fn start_validates_arguments() {
    let mut c = FrameClock::new();
    assert!(c.start(0, fps20(), Speed::NORMAL, ms(0)).is_err());
    assert!(
        c.start_at(3, fps20(), Speed::NORMAL, FrameIndex(3), ms(0))
            .is_err()
    );
    assert!(!c.is_running());
}

#[test]
fn late_poll_does_not_burst() {
    let mut c = FrameClock::new();
    c.start(10, fps20(), Speed::NORMAL, ms(0)).unwrap();
    c.poll(ms(0)).unwrap();
    // Far behind schedule: one tick, then the next is an interval later.
    assert_eq!(c.poll(ms(1_000)).unwrap().index, FrameIndex(1));
    assert_eq!(c.poll(ms(1_000)), None);
    assert_eq!(c.next_deadline(), Some(ms(1_050)));
}

#[test]
fn rejected_restart_keeps_the_running_clock() {
    let mut c = FrameClock::new();
    c.start(5, fps20(), Speed::NORMAL, ms(0)).unwrap();
    c.poll(ms(0)).unwrap();
    let generation = c.generation();

    let err = c
        .restart(5, fps20(), Speed::new(1e-300).unwrap(), FrameIndex(1), ms(10))
        .unwrap_err();
    assert!(matches!(err, SignplayError::Validation(_)));
    assert!(c.is_running());
    assert_eq!(c.generation(), generation);
    assert_eq!(c.interval(), Some(ms(50)));
    assert_eq!(c.next_deadline(), Some(ms(50)));
    assert_eq!(c.poll(ms(50)).unwrap().index, FrameIndex(1));
}
