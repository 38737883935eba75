use super::*;

#[test]
fn timers_fire_once_at_their_deadline() {
    let mut q = TimerQueue::new();
    q.schedule(500.0, "a");
    assert!(q.take_due(499.9).is_empty());
    assert_eq!(q.take_due(500.0), vec!["a"]);
    assert!(q.take_due(1000.0).is_empty());
    assert!(q.is_empty());
}

#[test]
fn due_timers_come_out_earliest_first() {
    let mut q = TimerQueue::new();
    q.schedule(30.0, "c");
    q.schedule(10.0, "a");
    q.schedule(20.0, "b");
    q.schedule(10.0, "a2");
    assert_eq!(q.next_deadline(), Some(10.0));
    assert_eq!(q.take_due(25.0), vec!["a", "a2", "b"]);
    assert_eq!(q.next_deadline(), Some(30.0));
    assert_eq!(q.len(), 1);
}

#[test]
fn cancelled_timers_never_fire() {
    let mut q = TimerQueue::new();
    let a = q.schedule(10.0, 1);
    q.schedule(20.0, 2);
    assert!(q.cancel(a));
    assert!(!q.cancel(a));
    assert_eq!(q.take_due(100.0), vec![2]);

    q.schedule(5.0, 3);
    q.clear();
    assert!(q.take_due(100.0).is_empty());
    assert_eq!(q.next_deadline(), None);
}

#[test]
fn idle_scheduler_needs_no_frames() {
    let s = FrameScheduler::new(1000.0);
    assert!(!s.needs_frame(0.0, false, false));
    assert!(s.needs_frame(0.0, true, false));
    assert!(s.needs_frame(0.0, false, true));
    assert_eq!(s.settle_start(), None);
}

#[test]
fn structural_event_opens_settle_window() {
    let mut s = FrameScheduler::new(1000.0);
    s.note_structural(100.0);
    s.frame_drawn();
    assert_eq!(s.settle_start(), Some(100.0));
    assert!(s.needs_frame(500.0, false, false));
    assert!(s.needs_frame(1099.0, false, false));
    assert!(!s.needs_frame(1100.0, false, false));
}

#[test]
fn resize_extends_window_but_keeps_reveal_clock() {
    let mut s = FrameScheduler::new(1000.0);
    s.note_structural(0.0);
    s.note_resize(800.0);
    s.frame_drawn();
    assert_eq!(s.settle_start(), Some(0.0));
    assert!(s.needs_frame(1500.0, false, false));
    assert!(!s.needs_frame(1800.0, false, false));
}

#[test]
fn scroll_requests_exactly_one_frame() {
    let mut s = FrameScheduler::new(1000.0);
    s.note_scroll();
    assert!(s.needs_frame(0.0, false, false));
    s.frame_drawn();
    assert!(!s.needs_frame(0.0, false, false));
}

#[test]
fn cancel_closes_everything() {
    let mut s = FrameScheduler::new(1000.0);
    s.note_structural(0.0);
    s.cancel();
    assert!(!s.needs_frame(10.0, false, false));
}
