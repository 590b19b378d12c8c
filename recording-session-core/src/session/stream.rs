use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::models::capture::{AudioFragment, StreamCapture};
use crate::models::config::StreamSessionConfig;
use crate::models::error::{AcquireError, SessionError};
use crate::models::state::{Progress, RecorderState, SessionState};
use crate::processing::capture_buffer::{self, CaptureBuffer};
use crate::processing::elapsed_tracker::{ElapsedTracker, TickOutcome, TickToken};
use crate::processing::tick_driver::Pollable;
use crate::traits::media_devices::{MediaDevices, PermissionState, StreamEvent, StreamRecorder};
use crate::traits::notifier::{Notice, Notifier};
use crate::traits::session_delegate::SessionDelegate;

/// Recording session over a browser continuous-stream recorder (host A).
///
/// Single-threaded and event driven: the host glue calls the public
/// operations, reports stream acquisition through [`on_stream_ready`], feeds
/// recorder events into [`handle_event`] and drives time with [`tick`] or
/// [`poll`]. Wrap in `Arc<parking_lot::Mutex<_>>` to share it with a
/// `TickDriver`.
///
/// ```text
/// initialize() → request_stream ─→ on_stream_ready(recorder)
/// start() → recorder.start ─→ Started → Recording (tracker armed)
/// stop()  → recorder.stop  ─→ DataAvailable* → Stopped → upload → Idle
/// ```
///
/// [`on_stream_ready`]: StreamSession::on_stream_ready
/// [`handle_event`]: StreamSession::handle_event
/// [`tick`]: StreamSession::tick
/// [`poll`]: StreamSession::poll
pub struct StreamSession<D: MediaDevices> {
    devices: D,
    recorder: Option<D::Recorder>,
    config: StreamSessionConfig,
    delegate: Arc<dyn SessionDelegate<StreamCapture>>,
    notifier: Arc<dyn Notifier>,

    state: SessionState,
    session_id: Uuid,
    tracker: ElapsedTracker,
    buffer: CaptureBuffer<AudioFragment>,

    stream_requested: bool,
    pending_auto_start: bool,
    pending_stop: bool,
    manual_stop_requested: bool,
    // The ceiling tick already sent the terminal progress report.
    ceiling_reported: bool,
}

impl<D: MediaDevices> StreamSession<D> {
    pub fn new(
        devices: D,
        config: StreamSessionConfig,
        delegate: Arc<dyn SessionDelegate<StreamCapture>>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let pending_auto_start = config.start_on_ready;
        Ok(Self {
            devices,
            recorder: None,
            config,
            delegate,
            notifier,
            state: SessionState::Idle,
            session_id: Uuid::new_v4(),
            tracker: ElapsedTracker::new(),
            buffer: CaptureBuffer::new(),
            stream_requested: false,
            pending_auto_start,
            pending_stop: false,
            manual_stop_requested: false,
            ceiling_reported: false,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.tracker.elapsed_secs()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &StreamSessionConfig {
        &self.config
    }

    /// Whether a recorder has been built on an acquired stream.
    pub fn is_ready(&self) -> bool {
        self.recorder.is_some()
    }

    pub fn pending_auto_start(&self) -> bool {
        self.pending_auto_start
    }

    pub fn manual_stop_requested(&self) -> bool {
        self.manual_stop_requested
    }

    pub fn buffered_fragments(&self) -> usize {
        self.buffer.len()
    }

    /// Token of the running elapsed-time interval, for hosts that run one
    /// timer per interval and call [`tick_with`](StreamSession::tick_with).
    pub fn tick_token(&self) -> Option<TickToken> {
        self.tracker.token()
    }

    pub fn recorder_state(&self) -> RecorderState {
        self.recorder
            .as_ref()
            .map(|r| r.state())
            .unwrap_or(RecorderState::Inactive)
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    /// Check the environment and permission, then request the audio stream.
    ///
    /// The session stays `Initializing` until the host calls
    /// [`on_stream_ready`](StreamSession::on_stream_ready).
    pub fn initialize(&mut self) -> Result<(), SessionError> {
        if self.recorder.is_some() || self.stream_requested {
            log::debug!("initialize ignored: stream already requested");
            return Ok(());
        }

        if !self.devices.is_supported() {
            return Err(self.fail_acquisition(SessionError::UnsupportedEnvironment));
        }

        if self.devices.query_permission() == PermissionState::Denied {
            return Err(self.fail_acquisition(SessionError::PermissionDenied { permanent: true }));
        }

        self.set_state(SessionState::Initializing);
        self.stream_requested = true;
        if let Err(e) = self.devices.request_stream() {
            self.stream_requested = false;
            return Err(self.fail_acquisition(e.into()));
        }
        log::info!("audio stream requested");
        Ok(())
    }

    /// Completion of the stream request issued by `initialize`.
    pub fn on_stream_ready(
        &mut self,
        result: Result<D::Recorder, AcquireError>,
    ) -> Result<(), SessionError> {
        self.stream_requested = false;

        let recorder = match result {
            Ok(recorder) => recorder,
            Err(e) => return Err(self.fail_acquisition(e.into())),
        };

        if self.recorder.is_some() {
            log::warn!("stream ready twice; keeping the existing recorder");
            return Ok(());
        }
        self.recorder = Some(recorder);
        log::info!("stream recorder ready");

        if self.pending_stop {
            log::info!("stop requested during initialization; not starting");
            self.pending_stop = false;
            self.pending_auto_start = false;
            self.manual_stop_requested = false;
            self.set_state(SessionState::Idle);
            return Ok(());
        }

        self.set_state(SessionState::Idle);
        if self.pending_auto_start {
            self.pending_auto_start = false;
            self.start()?;
        }
        Ok(())
    }

    /// Start a new session. No-op while one is already active.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Initializing && self.recorder.is_none() {
            log::debug!("start deferred until the stream is ready");
            self.pending_auto_start = true;
            return Ok(());
        }
        if self.state.is_active() {
            log::debug!("start ignored: session already {}", self.state.as_str());
            return Ok(());
        }

        let recorder_state = match self.recorder.as_ref() {
            Some(recorder) => recorder.state(),
            None => {
                log::warn!("start ignored: recorder not initialized");
                return Err(SessionError::DeviceUnavailable);
            }
        };
        if recorder_state != RecorderState::Inactive {
            log::debug!("start ignored: recorder is {}", recorder_state.as_str());
            return Ok(());
        }

        self.session_id = Uuid::new_v4();
        self.buffer.clear();
        self.manual_stop_requested = false;
        self.pending_stop = false;
        self.ceiling_reported = false;
        self.set_state(SessionState::Initializing);

        log::info!("starting session {}", self.session_id);
        self.with_recorder(|r| r.start())
    }

    /// Stop the active session. The upload happens on the recorder's stop
    /// confirmation; a session still initializing is stopped once ready.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle | SessionState::Error | SessionState::Stopping => {
                log::debug!("stop ignored: session {}", self.state.as_str());
                Ok(())
            }
            SessionState::Initializing => {
                log::info!("stop requested while initializing");
                self.pending_stop = true;
                self.pending_auto_start = false;
                self.manual_stop_requested = true;
                Ok(())
            }
            SessionState::Recording | SessionState::Paused | SessionState::Interrupted => {
                self.manual_stop_requested = true;
                self.request_stop()
            }
        }
    }

    /// Pause recording. Transitions: recording → paused.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Recording {
            return Err(SessionError::InvalidState(
                "can only pause from recording state".into(),
            ));
        }
        self.with_recorder(|r| r.pause())?;
        self.enter_paused();
        Ok(())
    }

    /// Resume recording. Transitions: paused → recording.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Paused {
            return Err(SessionError::InvalidState(
                "can only resume from paused state".into(),
            ));
        }
        self.with_recorder(|r| r.resume())?;
        self.enter_resumed();
        Ok(())
    }

    /// Resume a paused session, or start a fresh one.
    ///
    /// `is_initial_load` marks the call made when the page first shows; if
    /// the stream is not ready yet the start is deferred until it is.
    pub fn continue_recording(&mut self, is_initial_load: bool) -> Result<(), SessionError> {
        let elapsed = self.tracker.elapsed_secs();
        if self.state == SessionState::Paused && elapsed > 0 {
            self.resume()
        } else if self.recorder.is_none() && is_initial_load && elapsed == 0 {
            log::debug!("recording will start once the stream is ready");
            self.pending_auto_start = true;
            Ok(())
        } else if elapsed == 0 {
            self.start()
        } else {
            log::debug!("continue ignored: {} at {}s", self.state.as_str(), elapsed);
            Ok(())
        }
    }

    /// Drop the recorder and its stream. Only allowed between sessions.
    pub fn release(&mut self) -> Result<(), SessionError> {
        if self.state.is_active() {
            return Err(SessionError::InvalidState(
                "cannot release the recorder during a session".into(),
            ));
        }
        if self.recorder.take().is_some() {
            log::info!("stream recorder released");
        }
        Ok(())
    }

    /// Apply a recorder event.
    pub fn handle_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Started => self.on_started(),
            StreamEvent::Paused => {
                if self.state == SessionState::Recording {
                    self.enter_paused();
                }
            }
            StreamEvent::Resumed => {
                if self.state == SessionState::Paused {
                    self.enter_resumed();
                }
            }
            StreamEvent::DataAvailable(fragment) => {
                if self.state.is_active() {
                    self.buffer.push(fragment);
                } else {
                    log::warn!("dropping {} byte fragment outside a session", fragment.len());
                }
            }
            StreamEvent::Stopped => self.on_stopped(),
            StreamEvent::Error(message) => self.on_recorder_error(SessionError::Recorder(message)),
        }
    }

    /// Advance the elapsed time by one second.
    ///
    /// At the ceiling the session is stopped and the terminal progress
    /// report is returned instead.
    pub fn tick(&mut self) -> Option<Progress> {
        let token = self.tracker.token()?;
        self.tick_with(token)
    }

    /// Like [`tick`](StreamSession::tick), ignored unless `token` names the running interval.
    pub fn tick_with(&mut self, token: TickToken) -> Option<Progress> {
        if self.state != SessionState::Recording {
            return None;
        }
        match self.tracker.tick_with(token, self.config.max_duration_secs)? {
            TickOutcome::Advanced(elapsed) => {
                let progress = Progress::new(elapsed, self.recorder_state());
                self.delegate.on_progress(&progress);
                Some(progress)
            }
            TickOutcome::CeilingReached(elapsed) => {
                log::info!("max duration {}s reached; stopping", self.config.max_duration_secs);
                self.ceiling_reported = true;
                if let Err(e) = self.request_stop() {
                    log::error!("forced stop failed: {}", e);
                }
                let progress = Progress::new(elapsed, RecorderState::Inactive);
                self.delegate.on_progress(&progress);
                Some(progress)
            }
        }
    }

    // --- Internal helpers ---

    fn with_recorder<T>(
        &mut self,
        op: impl FnOnce(&mut D::Recorder) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let Some(recorder) = self.recorder.as_mut() else {
            return Err(SessionError::DeviceUnavailable);
        };
        match op(recorder) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.on_recorder_error(e.clone());
                Err(e)
            }
        }
    }

    fn request_stop(&mut self) -> Result<(), SessionError> {
        self.set_state(SessionState::Stopping);
        self.with_recorder(|r| r.stop())
    }

    fn on_started(&mut self) {
        if self.state != SessionState::Initializing {
            log::warn!("recorder started while session {}", self.state.as_str());
        }
        self.tracker.reset();
        self.tracker.arm(Instant::now());
        self.set_state(SessionState::Recording);

        if self.pending_stop {
            self.pending_stop = false;
            if let Err(e) = self.request_stop() {
                log::error!("deferred stop failed: {}", e);
            }
        }
    }

    fn enter_paused(&mut self) {
        if self.tracker.cancel() {
            self.delegate
                .on_progress(&Progress::new(self.tracker.elapsed_secs(), self.recorder_state()));
        }
        self.set_state(SessionState::Paused);
    }

    fn enter_resumed(&mut self) {
        self.tracker.arm(Instant::now());
        self.set_state(SessionState::Recording);
    }

    fn on_stopped(&mut self) {
        if !matches!(
            self.state,
            SessionState::Recording | SessionState::Paused | SessionState::Stopping
        ) {
            log::debug!("stop event ignored: session {}", self.state.as_str());
            return;
        }

        let elapsed = self.tracker.elapsed_secs();
        self.tracker.cancel();
        if !self.ceiling_reported {
            self.delegate
                .on_progress(&Progress::new(elapsed, RecorderState::Inactive));
        }

        let fragments = self.buffer.flush();
        let manual = self.manual_stop_requested;
        self.manual_stop_requested = false;
        self.ceiling_reported = false;

        let min = self.config.min_duration_secs;
        if min > 0 && elapsed <= min {
            log::info!(
                "discarding {}s session {} (minimum {}s)",
                elapsed,
                self.session_id,
                self.config.min_duration_secs
            );
        } else {
            let capture = StreamCapture {
                session_id: self.session_id,
                elapsed_secs: elapsed,
                total_bytes: capture_buffer::total_bytes(&fragments),
                checksum: capture_buffer::fragment_checksum(&fragments),
                finished_at: chrono::Utc::now().to_rfc3339(),
                fragments,
            };
            log::info!(
                "session {} finished ({}s, {} fragments, {} bytes, manual: {})",
                capture.session_id,
                capture.elapsed_secs,
                capture.fragments.len(),
                capture.total_bytes,
                manual
            );
            self.delegate.on_capture_finished(capture);
        }

        self.set_state(SessionState::Idle);
    }

    fn on_recorder_error(&mut self, error: SessionError) {
        log::error!("recorder error in {} session: {}", self.state.as_str(), error);
        if self.tracker.cancel() {
            self.delegate
                .on_progress(&Progress::new(self.tracker.elapsed_secs(), self.recorder_state()));
        }
        self.buffer.clear();
        self.manual_stop_requested = false;
        self.pending_stop = false;
        self.pending_auto_start = false;
        self.ceiling_reported = false;
        self.delegate.on_error(&error);
        self.set_state(SessionState::Error);
        self.set_state(SessionState::Idle);
    }

    fn fail_acquisition(&mut self, error: SessionError) -> SessionError {
        log::error!("audio stream unavailable: {}", error);
        let notice = match &error {
            SessionError::UnsupportedEnvironment => Notice::UnsupportedEnvironment,
            SessionError::PermissionDenied { permanent } => Notice::PermissionDenied {
                permanent: *permanent,
            },
            other => Notice::DeviceFailure(other.to_string()),
        };
        self.notifier.notify(&notice);
        self.delegate.on_error(&error);
        self.pending_auto_start = false;
        self.pending_stop = false;
        self.manual_stop_requested = false;
        self.set_state(SessionState::Error);
        self.set_state(SessionState::Idle);
        error
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

impl<D: MediaDevices> Pollable for StreamSession<D> {
    /// Apply every elapsed-time tick that has come due by `now`.
    fn poll(&mut self, now: Instant) {
        for _ in 0..self.tracker.due_ticks(now) {
            self.tick();
        }
    }
}
