use std::sync::Arc;

use approx::assert_relative_eq;

use recording_session_core::{
    AuthorizationOutcome, ManagedCapture, ManagedSession, ManagedSessionConfig, Notice,
    PermissionGate, SessionError, SessionState,
};
use recording_session_sim::{
    CollectingDelegate, SimMiniProgram, SimNotifier, SimRecorderManager, SimScreen,
};

struct Harness {
    runtime: SimMiniProgram,
    delegate: Arc<CollectingDelegate<ManagedCapture>>,
    notifier: Arc<SimNotifier>,
    session: ManagedSession<SimRecorderManager, SimScreen>,
}

impl Harness {
    fn new(config: ManagedSessionConfig) -> Self {
        let runtime = SimMiniProgram::new();
        let delegate = CollectingDelegate::new();
        let notifier = SimNotifier::new();
        let session = ManagedSession::new(
            runtime.recorder_manager(),
            runtime.screen(),
            config,
            delegate.clone(),
            notifier.clone(),
        )
        .unwrap();
        Self {
            runtime,
            delegate,
            notifier,
            session,
        }
    }

    fn recording(config: ManagedSessionConfig) -> Self {
        let mut h = Self::new(config);
        h.session.start().unwrap();
        h.pump();
        h
    }

    fn pump(&mut self) {
        self.runtime.pump(&mut self.session);
    }
}

#[test]
fn manual_stop_uploads_result() {
    let mut h = Harness::recording(ManagedSessionConfig::default());
    assert!(h.runtime.is_screen_on());

    h.runtime.advance(4_500);
    h.session.stop().unwrap();
    h.pump();

    let captures = h.delegate.take_captures();
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].segments.len(), 1);
    assert_eq!(captures[0].segments[0].duration_ms, 4_500);
    assert!(!h.runtime.is_screen_on());
    assert_eq!(h.session.state(), SessionState::Idle);
}

#[test]
fn unsolicited_pause_resumes_without_caller() {
    let mut h = Harness::recording(ManagedSessionConfig::default());
    h.runtime.advance(2_000);

    h.runtime.interrupt();
    assert!(h.session.is_recording());
    h.pump();

    assert_eq!(h.runtime.recorder_calls(), vec!["start", "resume"]);
    assert!(h.runtime.is_host_recording());
    assert!(h.session.is_recording());
    assert_eq!(h.session.state(), SessionState::Recording);

    h.runtime.advance(1_000);
    h.session.stop().unwrap();
    h.pump();
    assert_eq!(h.delegate.capture_count(), 1);
}

#[test]
fn interruption_end_resumes() {
    let mut h = Harness::recording(ManagedSessionConfig::default());

    h.runtime.interrupt();
    h.runtime.end_interruption();
    h.pump();

    assert_eq!(h.runtime.recorder_calls(), vec!["start", "resume", "resume"]);
    assert_eq!(h.session.state(), SessionState::Recording);
    assert!(h.delegate.errors().is_empty());
}

#[test]
fn failed_resume_forces_stop_without_upload() {
    let mut h = Harness::recording(ManagedSessionConfig::default());
    h.runtime.advance(30_000);
    h.runtime.fail_resume(true);

    h.runtime.interrupt();
    h.pump();

    assert_eq!(h.runtime.recorder_calls(), vec!["start", "resume", "stop"]);
    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(h.delegate.capture_count(), 0);
    assert!(!h.runtime.is_screen_on());
    assert!(matches!(h.delegate.errors().as_slice(), [SessionError::ResumeFailed(_)]));

    // A later session is unaffected.
    h.runtime.fail_resume(false);
    h.session.start().unwrap();
    h.pump();
    assert!(!h.session.resume_failed());
    h.runtime.advance(2_000);
    h.session.stop().unwrap();
    h.pump();
    assert_eq!(h.delegate.capture_count(), 1);
}

#[test]
fn sub_second_recording_toasts() {
    let mut h = Harness::recording(ManagedSessionConfig::default());
    h.runtime.advance(600);

    h.session.stop().unwrap();
    h.pump();

    assert_eq!(h.delegate.capture_count(), 0);
    assert_eq!(h.notifier.notices(), vec![Notice::RecordingTooShort]);
    assert!(!h.session.is_recording());
}

#[test]
fn host_ceiling_uploads_when_not_continuing() {
    let mut h = Harness::recording(ManagedSessionConfig::default());

    h.runtime.advance(600_000);
    h.pump();

    assert_eq!(h.runtime.recorder_calls(), vec!["start"]);
    let captures = h.delegate.take_captures();
    assert_eq!(captures.len(), 1);
    assert_relative_eq!(captures[0].total_duration_secs(), 600.0);
}

#[test]
fn auto_continue_delivers_all_segments_once() {
    let mut h = Harness::recording(ManagedSessionConfig {
        auto_continue: true,
        ..Default::default()
    });

    h.runtime.advance(600_000);
    h.pump();
    h.runtime.advance(600_000);
    h.pump();
    assert_eq!(h.delegate.capture_count(), 0);
    assert_eq!(h.runtime.recorder_calls(), vec!["start", "start", "start"]);
    assert!(h.runtime.is_screen_on());

    h.runtime.advance(90_000);
    h.session.stop().unwrap();
    h.pump();

    let captures = h.delegate.take_captures();
    assert_eq!(captures.len(), 1);
    let durations: Vec<u64> = captures[0].segments.iter().map(|s| s.duration_ms).collect();
    assert_eq!(durations, vec![600_000, 600_000, 90_000]);
    assert_relative_eq!(captures[0].total_duration_secs(), 1290.0);
}

#[test]
fn stop_while_idle_is_noop() {
    let mut h = Harness::new(ManagedSessionConfig::default());

    h.session.stop().unwrap();
    h.pump();

    assert!(h.runtime.recorder_calls().is_empty());
    assert!(h.delegate.states().is_empty());
}

#[test]
fn permission_gate_flow() {
    let runtime = SimMiniProgram::new();
    let notifier = SimNotifier::new();
    let gate = PermissionGate::new(runtime.authorization(), notifier.clone());

    assert!(!gate.check().unwrap());
    assert_eq!(gate.ensure().unwrap(), AuthorizationOutcome::Granted);
    assert!(gate.check().unwrap());

    let refused = SimMiniProgram::new();
    refused.allow_authorize(false);
    let gate = PermissionGate::new(refused.authorization(), notifier.clone());
    notifier.accept_confirmations(true);
    assert_eq!(gate.ensure().unwrap(), AuthorizationOutcome::SettingsOpened);
    assert_eq!(refused.settings_opened(), 1);

    notifier.accept_confirmations(false);
    assert_eq!(gate.request(), AuthorizationOutcome::Declined);
    assert_eq!(notifier.notices().last(), Some(&Notice::AuthorizationFailed));

    let granted_earlier = SimMiniProgram::new();
    granted_earlier.allow_authorize(false);
    granted_earlier.grant_record_scope(true);
    let gate = PermissionGate::new(granted_earlier.authorization(), notifier.clone());
    assert_eq!(gate.ensure().unwrap(), AuthorizationOutcome::Granted);
    assert_eq!(granted_earlier.settings_opened(), 0);
}
