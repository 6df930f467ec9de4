use super::*;

// =============================================================
// FrameRequest
// =============================================================

#[test]
fn many_requests_schedule_once() {
    let frames = FrameRequest::new();
    assert!(frames.request());
    assert!(!frames.request());
    assert!(!frames.request());
    assert!(frames.take_schedule());
    assert!(!frames.take_schedule());
}

#[test]
fn begin_frame_reopens_requests() {
    let frames = FrameRequest::new();
    frames.request();
    let _ = frames.take_schedule();
    assert!(frames.is_pending());
    assert!(frames.begin_frame());
    assert!(!frames.is_pending());
    assert!(frames.request());
    assert!(frames.take_schedule());
}

#[test]
fn begin_frame_without_request_is_false() {
    let frames = FrameRequest::new();
    assert!(!frames.begin_frame());
}

#[test]
fn clones_share_state() {
    let frames = FrameRequest::new();
    let listener_side = frames.clone();
    listener_side.request();
    assert!(frames.is_pending());
    assert!(!frames.request());
    assert!(frames.take_schedule());
}

#[test]
fn cancel_allows_retry() {
    let frames = FrameRequest::new();
    frames.request();
    frames.cancel();
    assert!(!frames.is_pending());
    assert!(!frames.take_schedule());
    assert!(frames.request());
}

// =============================================================
// Lifecycle
// =============================================================

fn observe_all(sizes: &[(f64, f64)]) -> Lifecycle {
    sizes.iter().fold(Lifecycle::default(), |state, (w, h)| state.observe_size(*w, *h))
}

#[test]
fn starts_uninitialized() {
    let state = Lifecycle::default();
    assert_eq!(state, Lifecycle::Uninitialized);
    assert!(!state.is_ready());
    assert_eq!(state.size(), None);
}

#[test]
fn three_identical_sizes_reach_ready() {
    let state = observe_all(&[(400.0, 400.0), (400.0, 400.0)]);
    assert!(!state.is_ready());
    let state = state.observe_size(400.0, 400.0);
    assert_eq!(state.size(), Some((400.0, 400.0)));
}

#[test]
fn changing_size_restarts_count() {
    let state = observe_all(&[(400.0, 400.0), (400.0, 400.0), (420.0, 400.0), (420.0, 400.0)]);
    assert!(!state.is_ready());
    assert!(state.observe_size(420.0, 400.0).is_ready());
}

#[test]
fn small_sizes_keep_sizing() {
    let state = observe_all(&[(0.0, 0.0), (49.0, 300.0), (300.0, 49.0)]);
    assert_eq!(state, Lifecycle::Sizing { last: None, stable: 0 });
}

#[test]
fn nan_size_is_not_ready() {
    let state = observe_all(&[(f64::NAN, 300.0), (f64::NAN, 300.0), (f64::NAN, 300.0)]);
    assert!(!state.is_ready());
}

#[test]
fn ready_accepts_new_sizes_directly() {
    let state = observe_all(&[(400.0, 400.0), (400.0, 400.0), (400.0, 400.0)]);
    let state = state.observe_size(600.0, 500.0);
    assert_eq!(state.size(), Some((600.0, 500.0)));
}

#[test]
fn ready_drops_back_on_collapse() {
    let state = observe_all(&[(400.0, 400.0), (400.0, 400.0), (400.0, 400.0), (0.0, 0.0)]);
    assert!(!state.is_ready());
    assert!(matches!(state, Lifecycle::Sizing { .. }));
}
