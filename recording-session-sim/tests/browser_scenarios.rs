use std::sync::Arc;

use recording_session_core::{
    Notice, PermissionState, Progress, RecorderState, SessionError, SessionState, StreamCapture,
    StreamEvent, StreamSession, StreamSessionConfig,
};
use recording_session_sim::{CollectingDelegate, SimBrowser, SimMediaDevices, SimNotifier};

struct Harness {
    browser: SimBrowser,
    delegate: Arc<CollectingDelegate<StreamCapture>>,
    notifier: Arc<SimNotifier>,
    session: StreamSession<SimMediaDevices>,
}

impl Harness {
    fn new(browser: SimBrowser, config: StreamSessionConfig) -> Self {
        let delegate = CollectingDelegate::new();
        let notifier = SimNotifier::new();
        let session = StreamSession::new(
            browser.media_devices(),
            config,
            delegate.clone(),
            notifier.clone(),
        )
        .unwrap();
        Self {
            browser,
            delegate,
            notifier,
            session,
        }
    }

    /// Initialize and grant the stream.
    fn ready(config: StreamSessionConfig) -> Self {
        let mut h = Self::new(SimBrowser::new(), config);
        h.session.initialize().unwrap();
        h.session.on_stream_ready(h.browser.grant()).unwrap();
        h.pump();
        h
    }

    fn pump(&mut self) {
        self.browser.pump(&mut self.session);
        assert_eq!(self.browser.pending_events(), 0);
    }

    fn record_seconds(&mut self, secs: u32) {
        for _ in 0..secs {
            self.session.tick();
        }
    }
}

#[test]
fn one_second_session_uploads_buffer_once() {
    let mut h = Harness::ready(StreamSessionConfig::default());

    h.session.start().unwrap();
    h.pump();
    h.record_seconds(1);
    h.browser.capture(b"first");
    h.browser.capture(b"second");
    h.session.stop().unwrap();
    assert!(h.browser.pending_events() > 0);
    h.pump();

    let inactive: Vec<Progress> = h
        .delegate
        .progress()
        .into_iter()
        .filter(|p| p.state == RecorderState::Inactive)
        .collect();
    assert_eq!(inactive, vec![Progress::new(1, RecorderState::Inactive)]);

    let captures = h.delegate.take_captures();
    assert_eq!(captures.len(), 1);
    let payload: Vec<&[u8]> = captures[0].fragments.iter().map(|f| f.data.as_slice()).collect();
    assert_eq!(payload, vec![&b"first"[..], &b"second"[..]]);
    assert_eq!(captures[0].total_bytes, 11);
    assert_eq!(h.session.buffered_fragments(), 0);
    assert_eq!(h.session.state(), SessionState::Idle);
}

#[test]
fn ceiling_stops_and_reports_inactive() {
    let mut h = Harness::ready(StreamSessionConfig {
        max_duration_secs: 3,
        ..Default::default()
    });

    h.session.start().unwrap();
    h.pump();
    h.record_seconds(4);
    h.pump();

    assert_eq!(h.browser.recorder_calls(), vec!["start", "stop"]);
    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(
        h.delegate.progress().last(),
        Some(&Progress::new(3, RecorderState::Inactive))
    );
    assert_eq!(h.delegate.capture_count(), 1);
}

#[test]
fn second_session_starts_from_zero() {
    let mut h = Harness::ready(StreamSessionConfig::default());

    h.session.start().unwrap();
    h.pump();
    h.record_seconds(5);
    h.session.stop().unwrap();
    h.pump();

    h.session.start().unwrap();
    h.pump();
    assert_eq!(h.session.elapsed_secs(), 0);
    assert_eq!(h.session.tick(), Some(Progress::new(1, RecorderState::Recording)));
}

#[test]
fn page_load_continue_waits_for_stream() {
    let mut h = Harness::new(SimBrowser::new(), StreamSessionConfig::default());

    h.session.continue_recording(true).unwrap();
    h.session.initialize().unwrap();
    assert!(h.browser.recorder_calls().is_empty());

    h.session.on_stream_ready(h.browser.grant()).unwrap();
    h.pump();
    assert_eq!(h.session.state(), SessionState::Recording);
}

#[test]
fn pause_resume_cycle() {
    let mut h = Harness::ready(StreamSessionConfig::default());

    h.session.start().unwrap();
    h.pump();
    h.record_seconds(2);
    h.session.pause().unwrap();
    h.pump();
    assert_eq!(h.session.state(), SessionState::Paused);

    h.session.continue_recording(false).unwrap();
    h.pump();
    h.record_seconds(1);
    assert_eq!(h.session.elapsed_secs(), 3);

    h.session.stop().unwrap();
    h.pump();
    let captures = h.delegate.take_captures();
    assert_eq!(captures[0].elapsed_secs, 3);
}

#[test]
fn stop_from_idle_changes_nothing() {
    let mut h = Harness::ready(StreamSessionConfig::default());
    let states_before = h.delegate.states();

    h.session.stop().unwrap();
    h.pump();

    assert_eq!(h.delegate.states(), states_before);
    assert_eq!(h.delegate.capture_count(), 0);
    assert!(h.browser.recorder_calls().is_empty());
}

#[test]
fn unsupported_browser_alerts_and_stays_idle() {
    let mut h = Harness::new(SimBrowser::unsupported(), StreamSessionConfig::default());

    assert_eq!(h.session.initialize(), Err(SessionError::UnsupportedEnvironment));
    assert_eq!(h.notifier.notices(), vec![Notice::UnsupportedEnvironment]);
    assert_eq!(h.session.start(), Err(SessionError::DeviceUnavailable));
    assert_eq!(h.session.state(), SessionState::Idle);
}

#[test]
fn permission_denials_are_distinguished() {
    let mut h = Harness::new(SimBrowser::new(), StreamSessionConfig::default());
    h.session.initialize().unwrap();
    let result = h.browser.reject("NotAllowedError", "Permission denied");
    assert!(h.session.on_stream_ready(result).is_err());

    h.session.initialize().unwrap();
    let result = h.browser.reject("NotAllowedError", "Permission dismissed");
    assert!(h.session.on_stream_ready(result).is_err());

    assert_eq!(
        h.notifier.notices(),
        vec![
            Notice::PermissionDenied { permanent: true },
            Notice::PermissionDenied { permanent: false },
        ]
    );
    assert_eq!(h.browser.stream_requests(), 2);
}

#[test]
fn known_denial_skips_the_prompt() {
    let browser = SimBrowser::new();
    browser.set_permission(PermissionState::Denied);
    let mut h = Harness::new(browser, StreamSessionConfig::default());

    assert_eq!(
        h.session.initialize(),
        Err(SessionError::PermissionDenied { permanent: true })
    );
    assert_eq!(h.browser.stream_requests(), 0);
}

#[test]
fn device_loss_aborts_silently() {
    let mut h = Harness::ready(StreamSessionConfig::default());

    h.session.start().unwrap();
    h.pump();
    h.record_seconds(2);
    h.browser.raise_error("NotReadableError: device lost");
    h.pump();

    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(h.session.tick(), None);
    assert_eq!(h.delegate.capture_count(), 0);
    assert_eq!(
        h.delegate.errors(),
        vec![SessionError::Recorder("NotReadableError: device lost".into())]
    );

    // The session can record again afterwards.
    h.session.start().unwrap();
    h.pump();
    assert_eq!(h.session.state(), SessionState::Recording);
}

#[test]
fn user_agent_pause_is_tracked() {
    let mut h = Harness::ready(StreamSessionConfig::default());
    h.session.start().unwrap();
    h.pump();
    h.record_seconds(1);

    h.browser.raise(StreamEvent::Paused);
    h.pump();

    assert_eq!(h.session.state(), SessionState::Paused);
    assert_eq!(h.session.tick(), None);
}

/// Drive a fixed pseudo-random operation sequence and check that the
/// recorder is never asked to start while a session is already recording.
#[test]
fn random_operation_sequences_stay_single_flight() {
    let mut h = Harness::ready(StreamSessionConfig {
        max_duration_secs: 4,
        ..Default::default()
    });
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;

    for _ in 0..500 {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;

        let was_recording = h.browser.recorder_state() != RecorderState::Inactive;
        let starts_before = h.browser.recorder_calls().iter().filter(|c| **c == "start").count();

        match seed % 6 {
            0 => {
                let _ = h.session.start();
            }
            1 => {
                let _ = h.session.stop();
            }
            2 => {
                let _ = h.session.pause();
            }
            3 => {
                let _ = h.session.continue_recording(false);
            }
            4 => {
                h.session.tick();
            }
            _ => {}
        }

        let starts_after = h.browser.recorder_calls().iter().filter(|c| **c == "start").count();
        if was_recording {
            assert_eq!(starts_before, starts_after);
        }
        h.pump();

        if h.session.state() == SessionState::Recording {
            assert_eq!(h.browser.recorder_state(), RecorderState::Recording);
        }
    }

    assert!(h.delegate.errors().is_empty());
}
