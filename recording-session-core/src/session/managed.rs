use std::sync::Arc;

use uuid::Uuid;

use crate::guards::keep_alive::KeepAliveGuard;
use crate::models::capture::{ManagedCapture, ManagedRecording};
use crate::models::config::ManagedSessionConfig;
use crate::models::error::{FaultKind, RecorderFault, SessionError};
use crate::models::state::SessionState;
use crate::processing::capture_buffer::CaptureBuffer;
use crate::traits::host_services::ScreenKeepAlive;
use crate::traits::notifier::{Notice, Notifier};
use crate::traits::recorder_manager::{ManagerEvent, RecorderManager};
use crate::traits::session_delegate::SessionDelegate;

/// Recording session over a host-managed recorder service (host B).
///
/// The host owns capture and reports a single result when it stops. The
/// session keeps the recording alive across host pauses and interruptions,
/// holds the screen awake while recording, and never uploads a capture whose
/// resume failed.
pub struct ManagedSession<R: RecorderManager, K: ScreenKeepAlive> {
    recorder: R,
    keep_alive: KeepAliveGuard<K>,
    config: ManagedSessionConfig,
    delegate: Arc<dyn SessionDelegate<ManagedCapture>>,
    notifier: Arc<dyn Notifier>,

    state: SessionState,
    session_id: Uuid,
    segments: CaptureBuffer<ManagedRecording>,

    pending_stop: bool,
    manual_stop_requested: bool,
    resume_failed: bool,
}

impl<R: RecorderManager, K: ScreenKeepAlive> ManagedSession<R, K> {
    pub fn new(
        recorder: R,
        screen: K,
        config: ManagedSessionConfig,
        delegate: Arc<dyn SessionDelegate<ManagedCapture>>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            recorder,
            keep_alive: KeepAliveGuard::new(screen),
            config,
            delegate,
            notifier,
            state: SessionState::Idle,
            session_id: Uuid::new_v4(),
            segments: CaptureBuffer::new(),
            pending_stop: false,
            manual_stop_requested: false,
            resume_failed: false,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a session holds the recorder, including while it is being
    /// resumed after an interruption.
    pub fn is_recording(&self) -> bool {
        self.state.is_active()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &ManagedSessionConfig {
        &self.config
    }

    pub fn manual_stop_requested(&self) -> bool {
        self.manual_stop_requested
    }

    pub fn resume_failed(&self) -> bool {
        self.resume_failed
    }

    pub fn is_screen_kept_on(&self) -> bool {
        self.keep_alive.is_held()
    }

    /// Completed segments waiting for the final stop.
    pub fn pending_segments(&self) -> usize {
        self.segments.len()
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn screen(&self) -> &K {
        self.keep_alive.screen()
    }

    /// Start a new session. No-op while one is already active.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state.is_active() {
            log::debug!("start ignored: session already {}", self.state.as_str());
            return Ok(());
        }

        self.session_id = Uuid::new_v4();
        self.segments.clear();
        self.pending_stop = false;
        self.manual_stop_requested = false;
        self.resume_failed = false;
        self.set_state(SessionState::Initializing);

        log::info!("starting session {}", self.session_id);
        if let Err(e) = self.recorder.start(&self.config.recorder_options) {
            self.abort(e.clone());
            return Err(e);
        }
        Ok(())
    }

    /// Stop the session; the capture is uploaded when the host confirms.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle | SessionState::Error | SessionState::Stopping => {
                log::debug!("stop ignored: session {}", self.state.as_str());
                Ok(())
            }
            SessionState::Initializing => {
                log::info!("stop requested before the recorder started");
                self.manual_stop_requested = true;
                self.pending_stop = true;
                Ok(())
            }
            SessionState::Recording | SessionState::Interrupted | SessionState::Paused => {
                self.manual_stop_requested = true;
                self.request_stop()
            }
        }
    }

    /// Apply a recorder event.
    pub fn handle_event(&mut self, event: ManagerEvent) {
        match event {
            ManagerEvent::Started => self.on_started(),
            ManagerEvent::Paused => self.on_host_paused(),
            ManagerEvent::Resumed => {
                self.resume_failed = false;
                if self.state == SessionState::Interrupted {
                    self.set_state(SessionState::Recording);
                }
            }
            ManagerEvent::InterruptionBegin => {
                if self.state == SessionState::Recording {
                    log::info!("recording interrupted");
                    self.set_state(SessionState::Interrupted);
                }
            }
            ManagerEvent::InterruptionEnd => {
                log::info!("interruption ended; resuming");
                self.issue_resume();
            }
            ManagerEvent::Error(fault) => self.on_fault(fault),
            ManagerEvent::Stopped(recording) => self.on_stopped(recording),
        }
    }

    // --- Internal helpers ---

    fn request_stop(&mut self) -> Result<(), SessionError> {
        self.set_state(SessionState::Stopping);
        if let Err(e) = self.recorder.stop() {
            self.abort(e.clone());
            return Err(e);
        }
        Ok(())
    }

    fn on_started(&mut self) {
        self.resume_failed = false;
        self.keep_alive.acquire();
        self.set_state(SessionState::Recording);

        if self.pending_stop {
            self.pending_stop = false;
            if let Err(e) = self.request_stop() {
                log::error!("deferred stop failed: {}", e);
            }
        }
    }

    /// The host paused on its own. Recording always continues.
    fn on_host_paused(&mut self) {
        match self.state {
            SessionState::Recording | SessionState::Interrupted => {
                log::info!("host paused recording; resuming");
                self.set_state(SessionState::Interrupted);
                self.issue_resume();
            }
            _ => log::debug!("pause event ignored: session {}", self.state.as_str()),
        }
    }

    fn issue_resume(&mut self) {
        if let Err(e) = self.recorder.resume() {
            self.on_fault(RecorderFault::new(FaultKind::ResumeFailed, e.to_string()));
        }
    }

    fn on_fault(&mut self, fault: RecorderFault) {
        if !self.state.is_active() {
            log::warn!("recorder fault outside a session: {}", fault.message);
            return;
        }

        if fault.is_resume_failure() {
            log::error!("resume failed, discarding session {}: {}", self.session_id, fault.message);
            self.keep_alive.release();
            self.resume_failed = true;
            self.manual_stop_requested = false;
            self.pending_stop = false;
            self.delegate.on_error(&SessionError::from(fault));
            // Hard stop; the stop confirmation finds `resume_failed` and discards.
            self.set_state(SessionState::Stopping);
            if let Err(e) = self.recorder.stop() {
                log::error!("hard stop after failed resume failed: {}", e);
                self.segments.clear();
                self.set_state(SessionState::Idle);
            }
            return;
        }

        self.abort(SessionError::from(fault));
    }

    /// End the session after a recorder error. Segments that already
    /// finished are still uploaded; the failed segment is lost.
    fn abort(&mut self, error: SessionError) {
        log::error!("session {} aborted: {}", self.session_id, error);
        self.keep_alive.release();
        self.pending_stop = false;
        self.delegate.on_error(&error);
        self.set_state(SessionState::Error);
        if self.segments.is_empty() {
            self.finish();
        } else {
            log::warn!(
                "delivering {} completed segments of aborted session {}",
                self.segments.len(),
                self.session_id
            );
            self.deliver();
        }
    }

    fn on_stopped(&mut self, recording: ManagedRecording) {
        if !self.state.is_active() {
            log::debug!("stop event ignored: session {}", self.state.as_str());
            return;
        }
        self.keep_alive.release();

        if self.resume_failed {
            log::warn!(
                "discarding {}ms recording of session {} after failed resume",
                recording.duration_ms,
                self.session_id
            );
            self.segments.clear();
            self.finish();
            return;
        }

        if recording.duration_ms <= self.config.min_duration_ms {
            log::info!("recording too short ({}ms); not uploading", recording.duration_ms);
            self.notifier.notify(&Notice::RecordingTooShort);
            self.deliver();
            return;
        }

        let hit_ceiling = recording.duration_ms >= self.config.recorder_options.duration_ms;
        if self.config.auto_continue && hit_ceiling && !self.manual_stop_requested {
            log::info!(
                "segment {} of session {} reached the host ceiling; continuing",
                self.segments.len() + 1,
                self.session_id
            );
            self.segments.push(recording);
            self.set_state(SessionState::Initializing);
            if let Err(e) = self.recorder.start(&self.config.recorder_options) {
                log::error!("could not start continuation segment: {}", e);
                self.abort(e);
            }
            return;
        }

        self.segments.push(recording);
        self.deliver();
    }

    /// Hand every buffered segment to the upload callback and end the session.
    fn deliver(&mut self) {
        let segments = self.segments.flush();
        if !segments.is_empty() {
            let capture = ManagedCapture {
                session_id: self.session_id,
                segments,
                finished_at: chrono::Utc::now().to_rfc3339(),
            };
            log::info!(
                "session {} finished ({} segments, {:.1}s, manual: {})",
                capture.session_id,
                capture.segments.len(),
                capture.total_duration_secs(),
                self.manual_stop_requested
            );
            self.delegate.on_capture_finished(capture);
        }
        self.finish();
    }

    fn finish(&mut self) {
        self.manual_stop_requested = false;
        self.pending_stop = false;
        self.set_state(SessionState::Idle);
    }

    fn set_state(&mut self, new_state: SessionState) {
        if self.state == new_state {
            return;
        }
        log::debug!("session state {} -> {}", self.state.as_str(), new_state.as_str());
        self.state = new_state;
        self.delegate.on_state_changed(&new_state);
    }
}
