//! Session lifecycle scenarios
//!
//! Drives the manager through realistic sequences against a mock platform:
//! start/pause, load failures, network loss and recovery, reconnect
//! backoff, and stale callbacks.

mod common;

use common::{scheduled_retry, Harness, HandleCommand};
use radio_connectivity::ConnectivityStatus;
use radio_playback::{
    station::STREAM_URL, ErrorKind, SessionConfig, SessionEvent, SessionState, StreamFault,
    StreamStatus, CONNECTION_LOST_MESSAGE,
};
use std::time::Duration;

// ============================================================================
// START / PAUSE
// ============================================================================

#[test]
fn start_while_unreachable_does_not_open_stream() {
    let mut h = Harness::new();
    h.go_offline();

    h.manager.start();

    assert_eq!(h.manager.state(), SessionState::Error);
    assert_eq!(h.manager.last_error(), Some(ErrorKind::NetworkUnavailable));
    assert_eq!(h.opened(), 0);
    // Parked until the network returns
    assert!(h.manager.pending_retry().is_none());
}

#[test]
fn start_opens_fixed_endpoint_with_current_volume() {
    let mut h = Harness::with_config(SessionConfig {
        initial_volume: 0.6,
    });

    h.manager.start();
    assert_eq!(h.manager.state(), SessionState::Loading);
    assert!(h.manager.snapshot().is_buffering());

    {
        let log = h.platform.log.lock().unwrap();
        assert_eq!(log.opened.len(), 1);
        assert_eq!(log.opened[0].uri, STREAM_URL);
        assert!(log.opened[0].start_playing);
        assert_eq!(log.opened[0].initial_volume, 0.6);
    }

    h.report(0, StreamStatus::Loaded);
    assert_eq!(h.manager.state(), SessionState::Playing);
    assert_eq!(h.manager.last_error(), None);
    assert_eq!(h.manager.reconnect_attempts(), 0);
}

#[test]
fn start_is_ignored_while_loading_or_playing() {
    let mut h = Harness::new();

    h.manager.start();
    h.manager.start();
    assert_eq!(h.opened(), 1);

    h.report(0, StreamStatus::Loaded);
    h.manager.start();
    assert_eq!(h.opened(), 1);
    assert_eq!(h.manager.state(), SessionState::Playing);
}

#[test]
fn toggle_twice_from_idle_plays_then_pauses() {
    let mut h = Harness::new();

    h.manager.toggle();
    h.report(0, StreamStatus::Loaded);
    assert_eq!(h.manager.state(), SessionState::Playing);

    h.manager.toggle();
    assert_eq!(h.manager.state(), SessionState::Paused);

    let log = h.platform.log.lock().unwrap();
    assert_eq!(log.commands_for(0), vec![HandleCommand::Pause]);
}

#[test]
fn pause_is_noop_unless_playing() {
    let mut h = Harness::new();

    h.manager.pause();
    assert_eq!(h.manager.state(), SessionState::Idle);

    h.manager.start();
    h.manager.pause();
    assert_eq!(h.manager.state(), SessionState::Loading);

    assert!(h.platform.log.lock().unwrap().commands_for(0).is_empty());
}

#[test]
fn start_from_paused_resumes_same_stream() {
    let mut h = Harness::new();
    h.play();
    h.manager.pause();

    h.manager.start();

    assert_eq!(h.manager.state(), SessionState::Playing);
    assert_eq!(h.opened(), 1);
    let log = h.platform.log.lock().unwrap();
    assert_eq!(
        log.commands_for(0),
        vec![HandleCommand::Pause, HandleCommand::Play]
    );
}

// ============================================================================
// VOLUME
// ============================================================================

#[test]
fn volume_applies_to_open_stream() {
    let mut h = Harness::new();
    h.play();

    h.manager.volume_down();
    h.manager.volume_down();
    h.manager.set_volume(0.25);

    assert_eq!(h.manager.volume(), 0.3);
    let log = h.platform.log.lock().unwrap();
    assert_eq!(
        log.commands_for(0),
        vec![
            HandleCommand::SetVolume(0.9),
            HandleCommand::SetVolume(0.8),
            HandleCommand::SetVolume(0.3),
        ]
    );
}

#[test]
fn volume_persists_without_stream() {
    let mut h = Harness::new();

    for _ in 0..5 {
        h.manager.volume_down();
    }
    assert_eq!(h.manager.volume(), 0.5);

    let events = h.manager.drain_events();
    assert_eq!(events.len(), 5);
    assert_eq!(events[4], SessionEvent::VolumeChanged { volume: 0.5 });

    h.manager.start();
    assert_eq!(h.platform.log.lock().unwrap().opened[0].initial_volume, 0.5);
}

#[test]
fn volume_at_bound_emits_nothing() {
    let mut h = Harness::new();
    h.manager.volume_up();
    h.manager.set_volume(3.0);
    assert!(!h.manager.has_pending_events());
}

// ============================================================================
// FAILURE CLASSIFICATION
// ============================================================================

#[test]
fn network_load_failure_is_network_error() {
    let mut h = Harness::new();
    h.manager.start();

    h.report(
        0,
        StreamStatus::Error(StreamFault::new("network: connection refused")),
    );

    assert_eq!(h.manager.state(), SessionState::Error);
    assert_eq!(h.manager.last_error(), Some(ErrorKind::NetworkError));
    assert_eq!(h.platform.log.lock().unwrap().closed(0), 1);

    let (_, delay, attempt) = scheduled_retry(&h.manager.drain_events()).unwrap();
    assert_eq!(delay, Duration::from_millis(1000));
    assert_eq!(attempt, 1);
}

#[test]
fn generic_load_failure_is_stream_load_error() {
    let mut h = Harness::new();
    h.manager.start();

    h.report(
        0,
        StreamStatus::Error(StreamFault::new("unsupported container")),
    );

    assert_eq!(h.manager.last_error(), Some(ErrorKind::StreamLoadError));
    assert_eq!(
        h.manager.snapshot().status_message(),
        Some("Failed to load stream. Please try again.")
    );
    // Every kind keeps retrying
    assert!(h.manager.pending_retry().is_some());
}

#[test]
fn rejected_open_is_classified() {
    let mut h = Harness::new();
    h.fail_next_open("Request timeout");

    h.manager.start();

    assert_eq!(h.manager.state(), SessionState::Error);
    assert_eq!(h.manager.last_error(), Some(ErrorKind::NetworkError));
    assert!(!h.manager.has_stream());
    assert!(h.manager.pending_retry().is_some());
}

#[test]
fn fault_after_load_is_playback_fault() {
    let mut h = Harness::new();
    h.play();

    h.report(0, StreamStatus::Error(StreamFault::new("decoder: bad frame")));

    assert_eq!(h.manager.state(), SessionState::Error);
    assert_eq!(h.manager.last_error(), Some(ErrorKind::PlaybackFault));
    assert!(!h.manager.has_stream());
    assert!(h.manager.pending_retry().is_some());
}

#[test]
fn fault_while_paused_stays_paused() {
    let mut h = Harness::new();
    h.play();
    h.manager.pause();
    h.manager.drain_events();

    h.report(0, StreamStatus::Error(StreamFault::new("network: reset")));

    assert_eq!(h.manager.state(), SessionState::Paused);
    assert!(!h.manager.has_stream());
    assert!(h.manager.pending_retry().is_none());
    assert!(h.manager.drain_events().is_empty());

    // Resuming needs a fresh stream
    h.manager.start();
    assert_eq!(h.opened(), 2);
    assert_eq!(h.manager.state(), SessionState::Loading);
}

// ============================================================================
// CONNECTIVITY
// ============================================================================

#[test]
fn network_drop_and_restore_reconnects() {
    let mut h = Harness::new();
    h.play();
    h.manager.drain_events();

    h.go_offline();
    assert_eq!(h.manager.state(), SessionState::Error);
    assert_eq!(h.manager.last_error(), Some(ErrorKind::NetworkUnavailable));
    assert_eq!(
        h.manager.snapshot().status_message(),
        Some(CONNECTION_LOST_MESSAGE)
    );
    assert!(h.manager.pending_retry().is_none());
    assert_eq!(
        h.platform.log.lock().unwrap().commands_for(0),
        vec![HandleCommand::Pause]
    );

    h.go_online();
    let (ticket, delay, _) = scheduled_retry(&h.manager.drain_events()).unwrap();
    assert_eq!(delay, Duration::from_millis(1000));
    assert_eq!(h.manager.reconnect_attempts(), 1);

    h.manager.on_retry_due(ticket);
    assert_eq!(h.manager.state(), SessionState::Loading);
    assert_eq!(h.opened(), 2);
    assert_eq!(h.platform.log.lock().unwrap().closed(0), 1);

    h.report(1, StreamStatus::Loaded);
    assert_eq!(h.manager.state(), SessionState::Playing);
    assert_eq!(h.manager.reconnect_attempts(), 0);
    assert_eq!(h.manager.last_error(), None);
    assert!(!h.manager.snapshot().connection_lost);
}

#[test]
fn restore_after_unreachable_start_arms_retry() {
    let mut h = Harness::new();
    h.go_offline();
    h.manager.start();

    h.go_online();

    assert!(h.manager.pending_retry().is_some());
    assert!(h.manager.snapshot().retry_pending);
}

#[test]
fn restore_without_play_intent_does_nothing() {
    let mut h = Harness::new();
    h.play();
    h.manager.pause();

    h.go_offline();
    assert_eq!(h.manager.state(), SessionState::Paused);

    h.go_online();
    assert_eq!(h.manager.state(), SessionState::Paused);
    assert!(h.manager.pending_retry().is_none());
}

#[test]
fn repeated_status_is_not_an_event() {
    let mut h = Harness::new();
    h.go_offline();
    h.manager.drain_events();

    h.manager
        .on_connectivity_change(ConnectivityStatus::offline());
    assert!(!h.manager.has_pending_events());
}

// ============================================================================
// RECONNECT POLICY
// ============================================================================

#[test]
fn backoff_grows_across_failed_retries_and_resets_on_playing() {
    let mut h = Harness::new();
    h.manager.start();

    let mut delays = Vec::new();
    for index in 0..6 {
        h.report(index, StreamStatus::Error(StreamFault::new("connection lost")));
        let (ticket, delay, _) = scheduled_retry(&h.manager.drain_events()).unwrap();
        delays.push(delay.as_millis() as u64);
        h.manager.on_retry_due(ticket);
    }

    assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000, 30000]);
    assert_eq!(h.manager.reconnect_attempts(), 6);

    h.report(6, StreamStatus::Loaded);
    assert_eq!(h.manager.state(), SessionState::Playing);
    assert_eq!(h.manager.reconnect_attempts(), 0);
}

#[test]
fn manual_start_supersedes_pending_retry() {
    let mut h = Harness::new();
    h.manager.start();
    h.report(0, StreamStatus::Error(StreamFault::new("timeout")));
    let (ticket, _, _) = scheduled_retry(&h.manager.drain_events()).unwrap();

    h.manager.start();
    let events = h.manager.drain_events();
    assert!(events.contains(&SessionEvent::RetryCancelled { ticket }));
    assert_eq!(h.opened(), 2);

    // The superseded timer fires late
    h.manager.on_retry_due(ticket);
    assert_eq!(h.opened(), 2);
    assert_eq!(h.manager.state(), SessionState::Loading);
}

#[test]
fn stale_stream_status_is_ignored() {
    let mut h = Harness::new();
    h.manager.start();
    h.report(0, StreamStatus::Error(StreamFault::new("network down")));
    h.manager.start();

    // Late callbacks from the released first stream
    h.report(0, StreamStatus::Loaded);
    h.report(0, StreamStatus::Error(StreamFault::new("network down")));
    assert_eq!(h.manager.state(), SessionState::Loading);

    h.report(1, StreamStatus::Loaded);
    assert_eq!(h.manager.state(), SessionState::Playing);
}

#[test]
fn retry_while_offline_parks_again() {
    let mut h = Harness::new();
    h.manager.start();
    h.report(0, StreamStatus::Error(StreamFault::new("connection reset")));
    let (ticket, _, _) = scheduled_retry(&h.manager.drain_events()).unwrap();

    h.go_offline();
    h.manager.on_retry_due(ticket);

    assert_eq!(h.manager.last_error(), Some(ErrorKind::NetworkUnavailable));
    assert_eq!(h.opened(), 1);
    assert!(h.manager.pending_retry().is_none());

    h.go_online();
    let (_, delay, attempt) = scheduled_retry(&h.manager.drain_events()).unwrap();
    assert_eq!(delay, Duration::from_millis(2000));
    assert_eq!(attempt, 2);
}

// ============================================================================
// SHUTDOWN
// ============================================================================

#[test]
fn shutdown_cancels_retry_and_closes_stream_once() {
    let mut h = Harness::new();
    h.play();
    h.manager.pause();
    h.manager.start();
    h.manager.shutdown();

    let log = h.platform.log.lock().unwrap();
    assert_eq!(log.total_closed(), 1);
    drop(log);

    let mut h = Harness::new();
    h.manager.start();
    h.report(0, StreamStatus::Error(StreamFault::new("timeout")));
    let (ticket, _, _) = scheduled_retry(&h.manager.drain_events()).unwrap();

    h.manager.shutdown();
    assert!(h
        .manager
        .drain_events()
        .contains(&SessionEvent::RetryCancelled { ticket }));

    h.manager.on_retry_due(ticket);
    h.manager.start();
    h.manager.volume_down();
    assert_eq!(h.opened(), 1);
    assert!(!h.manager.has_pending_events());
}
