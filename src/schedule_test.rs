use super::*;

#[test]
fn advance_returns_due_timers_earliest_first() {
    let mut s = ManualScheduler::new();
    let late = s.delay(300.0);
    let early = s.delay(100.0);
    assert!(s.advance(50.0).is_empty());
    assert_eq!(s.advance(300.0), vec![early, late]);
    assert_eq!(s.pending_timers(), 0);
}

#[test]
fn timer_fires_exactly_at_deadline() {
    let mut s = ManualScheduler::new();
    let id = s.delay(250.0);
    assert!(s.advance(249.0).is_empty());
    assert_eq!(s.advance(1.0), vec![id]);
}

#[test]
fn cancelled_timer_never_fires() {
    let mut s = ManualScheduler::new();
    let id = s.delay(10.0);
    s.cancel_delay(id);
    assert!(s.advance(100.0).is_empty());
}

#[test]
fn frames_drain_once() {
    let mut s = ManualScheduler::new();
    let a = s.request_frame();
    let b = s.request_frame();
    assert_ne!(a, b);
    assert_eq!(s.pending_frames(), 2);
    assert_eq!(s.take_frames(), vec![a, b]);
    assert!(s.take_frames().is_empty());
}

#[test]
fn cancel_frame_removes_request() {
    let mut s = ManualScheduler::new();
    let a = s.request_frame();
    s.cancel_frame(a);
    s.cancel_frame(FrameId(999));
    assert_eq!(s.pending_frames(), 0);
}

#[test]
fn clock_accumulates() {
    let mut s = ManualScheduler::new();
    s.advance(10.0);
    s.advance(5.5);
    assert!((s.now_ms() - 15.5).abs() < f64::EPSILON);
}
