//! Property-based tests for volume, backoff and the session state machine
//!
//! Uses proptest to verify invariants across many random inputs.

mod common;

use common::Harness;
use proptest::prelude::*;
use radio_connectivity::ConnectivityStatus;
use radio_playback::{
    reconnect::MAX_DELAY, ReconnectPolicy, SessionState, StreamFault, StreamStatus, Volume,
};
use std::time::Duration;

// ===== Helpers =====

#[derive(Debug, Clone)]
enum VolumeOp {
    Up,
    Down,
    Set(f32),
}

fn volume_op() -> impl Strategy<Value = VolumeOp> {
    prop_oneof![
        Just(VolumeOp::Up),
        Just(VolumeOp::Down),
        (-2.0f32..3.0).prop_map(VolumeOp::Set),
    ]
}

#[derive(Debug, Clone)]
enum Input {
    Start,
    Pause,
    Toggle,
    VolumeUp,
    VolumeDown,
    Loaded,
    Fault,
    Offline,
    Online,
    RetryDue,
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        Just(Input::Start),
        Just(Input::Pause),
        Just(Input::Toggle),
        Just(Input::VolumeUp),
        Just(Input::VolumeDown),
        Just(Input::Loaded),
        Just(Input::Fault),
        Just(Input::Offline),
        Just(Input::Online),
        Just(Input::RetryDue),
    ]
}

fn on_grid(volume: f32) -> bool {
    ((volume * 10.0).round() - volume * 10.0).abs() < 1e-4
}

// ===== Property Tests =====

proptest! {
    /// Property: volume stays in [0,1] on the 0.1 grid for any sequence
    #[test]
    fn volume_stays_bounded_on_grid(
        initial in -1.0f32..2.0,
        ops in prop::collection::vec(volume_op(), 0..100)
    ) {
        let mut volume = Volume::new(initial);
        for op in ops {
            let before = volume.value();
            match op {
                VolumeOp::Up => {
                    if volume.increase() {
                        prop_assert!((volume.value() - before - 0.1).abs() < 1e-4);
                    }
                }
                VolumeOp::Down => {
                    if volume.decrease() {
                        prop_assert!((before - volume.value() - 0.1).abs() < 1e-4);
                    }
                }
                VolumeOp::Set(v) => {
                    volume.set(v);
                }
            }
            prop_assert!((0.0..=1.0).contains(&volume.value()));
            prop_assert!(on_grid(volume.value()));
        }
    }

    /// Property: k decreases from full volume land exactly on 1.0 - 0.1k
    #[test]
    fn decreases_from_full_are_exact(k in 0u8..=15) {
        let mut volume = Volume::new(1.0);
        for _ in 0..k {
            volume.decrease();
        }
        prop_assert_eq!(volume.steps(), 10u8.saturating_sub(k));
    }

    /// Property: backoff is monotonic, starts at 1 s and never exceeds 30 s
    #[test]
    fn backoff_is_monotonic_and_capped(retries in 1usize..80) {
        let mut policy = ReconnectPolicy::new();
        let mut previous = Duration::ZERO;
        for i in 0..retries {
            let delay = policy.next_delay();
            if i == 0 {
                prop_assert_eq!(delay, Duration::from_millis(1000));
            }
            prop_assert!(delay >= previous);
            prop_assert!(delay <= MAX_DELAY);
            previous = delay;
        }
        prop_assert_eq!(policy.attempts() as usize, retries);
    }

    /// Property: for any input sequence the session holds at most one
    /// stream, closes every handle exactly once and keeps its invariants
    #[test]
    fn session_invariants_hold(inputs in prop::collection::vec(input(), 0..60)) {
        let mut h = Harness::new();

        for input in inputs {
            match input {
                Input::Start => h.manager.start(),
                Input::Pause => h.manager.pause(),
                Input::Toggle => h.manager.toggle(),
                Input::VolumeUp => h.manager.volume_up(),
                Input::VolumeDown => h.manager.volume_down(),
                Input::Loaded | Input::Fault => {
                    if h.opened() > 0 {
                        let status = if matches!(input, Input::Loaded) {
                            StreamStatus::Loaded
                        } else {
                            StreamStatus::Error(StreamFault::new("network glitch"))
                        };
                        h.report(h.opened() - 1, status);
                    }
                }
                Input::Offline => h.go_offline(),
                Input::Online => h.manager.on_connectivity_change(ConnectivityStatus::unknown()),
                Input::RetryDue => {
                    if let Some(ticket) = h.manager.pending_retry() {
                        h.manager.on_retry_due(ticket);
                    }
                }
            }

            let snapshot = h.manager.snapshot();
            prop_assert!((0.0..=1.0).contains(&snapshot.volume));
            prop_assert_eq!(
                snapshot.last_error.is_some(),
                snapshot.state == SessionState::Error
            );
            if snapshot.state == SessionState::Playing {
                prop_assert_eq!(snapshot.reconnect_attempts, 0);
                prop_assert!(h.manager.has_stream());
            }

            let opened = h.opened();
            let closed = h.platform.log.lock().unwrap().total_closed();
            let live = usize::from(h.manager.has_stream());
            prop_assert_eq!(opened, closed + live);
        }

        h.manager.shutdown();
        let log = h.platform.log.lock().unwrap();
        for index in 0..log.opened.len() {
            prop_assert_eq!(log.closed(index), 1);
        }
    }
}
