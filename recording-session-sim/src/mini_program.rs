//! Simulated mini-program runtime: recorder manager, screen and authorization.
//!
//! The recorder keeps a simulated clock. [`SimMiniProgram::advance`] moves it
//! forward and stops the recording on its own at the options' duration,
//! as the runtime does.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use recording_session_core::models::capture::ManagedRecording;
use recording_session_core::models::config::RecorderOptions;
use recording_session_core::models::error::{RecorderFault, SessionError};
use recording_session_core::session::managed::ManagedSession;
use recording_session_core::traits::host_services::{RecordAuthorization, ScreenKeepAlive};
use recording_session_core::traits::recorder_manager::{ManagerEvent, RecorderManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostRecorderState {
    Idle,
    Recording,
    Paused,
}

struct RuntimeInner {
    events: VecDeque<ManagerEvent>,
    recorder_calls: Vec<&'static str>,
    recorder_state: HostRecorderState,
    segment_ms: u64,
    ceiling_ms: u64,
    segments_started: u32,
    fail_resume: bool,
    screen_calls: Vec<bool>,
    record_scope_granted: bool,
    allow_authorize: bool,
    settings_opened: u32,
}

/// Handle on a simulated mini-program runtime.
#[derive(Clone)]
pub struct SimMiniProgram {
    inner: Arc<Mutex<RuntimeInner>>,
}

impl SimMiniProgram {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RuntimeInner {
                events: VecDeque::new(),
                recorder_calls: Vec::new(),
                recorder_state: HostRecorderState::Idle,
                segment_ms: 0,
                ceiling_ms: 0,
                segments_started: 0,
                fail_resume: false,
                screen_calls: Vec::new(),
                record_scope_granted: false,
                allow_authorize: true,
                settings_opened: 0,
            })),
        }
    }

    pub fn recorder_manager(&self) -> SimRecorderManager {
        SimRecorderManager {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn screen(&self) -> SimScreen {
        SimScreen {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn authorization(&self) -> SimAuthorization {
        SimAuthorization {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Let `ms` of recording time pass. Stops at the host ceiling.
    pub fn advance(&self, ms: u64) {
        let mut inner = self.inner.lock();
        if inner.recorder_state != HostRecorderState::Recording {
            return;
        }
        inner.segment_ms = (inner.segment_ms + ms).min(inner.ceiling_ms);
        if inner.segment_ms >= inner.ceiling_ms {
            finish_segment(&mut inner);
        }
    }

    /// The OS suspends recording, e.g. for an incoming call.
    pub fn interrupt(&self) {
        let mut inner = self.inner.lock();
        if inner.recorder_state == HostRecorderState::Recording {
            inner.recorder_state = HostRecorderState::Paused;
            inner.events.push_back(ManagerEvent::InterruptionBegin);
            inner.events.push_back(ManagerEvent::Paused);
        }
    }

    /// The interruption is over.
    pub fn end_interruption(&self) {
        self.inner.lock().events.push_back(ManagerEvent::InterruptionEnd);
    }

    /// Make every resume fail, as after a screen lock on some devices.
    pub fn fail_resume(&self, fail: bool) {
        self.inner.lock().fail_resume = fail;
    }

    pub fn grant_record_scope(&self, granted: bool) {
        self.inner.lock().record_scope_granted = granted;
    }

    pub fn allow_authorize(&self, allow: bool) {
        self.inner.lock().allow_authorize = allow;
    }

    pub fn settings_opened(&self) -> u32 {
        self.inner.lock().settings_opened
    }

    pub fn recorder_calls(&self) -> Vec<&'static str> {
        self.inner.lock().recorder_calls.clone()
    }

    pub fn screen_calls(&self) -> Vec<bool> {
        self.inner.lock().screen_calls.clone()
    }

    pub fn is_screen_on(&self) -> bool {
        self.inner.lock().screen_calls.last().copied().unwrap_or(false)
    }

    pub fn is_host_recording(&self) -> bool {
        self.inner.lock().recorder_state == HostRecorderState::Recording
    }

    /// Deliver every queued event to the session, including events raised
    /// while handling earlier ones. Returns how many were delivered.
    pub fn pump(&self, session: &mut ManagedSession<SimRecorderManager, SimScreen>) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.inner.lock().events.pop_front();
            let Some(event) = next else {
                return delivered;
            };
            log::trace!("runtime event: {:?}", event);
            session.handle_event(event);
            delivered += 1;
        }
    }
}

impl Default for SimMiniProgram {
    fn default() -> Self {
        Self::new()
    }
}

fn finish_segment(inner: &mut RuntimeInner) {
    let recording = ManagedRecording {
        temp_file_path: format!("wxfile://tmp/segment_{}.mp3", inner.segments_started),
        duration_ms: inner.segment_ms,
        // Roughly 128 kbit/s.
        file_size: inner.segment_ms * 16,
    };
    inner.recorder_state = HostRecorderState::Idle;
    inner.segment_ms = 0;
    inner.events.push_back(ManagerEvent::Stopped(recording));
}

fn operate_fail(op: &str) -> SessionError {
    SessionError::Recorder(format!("operateRecorder:fail {} fail", op))
}

/// Recorder manager of a [`SimMiniProgram`].
pub struct SimRecorderManager {
    inner: Arc<Mutex<RuntimeInner>>,
}

impl RecorderManager for SimRecorderManager {
    fn start(&mut self, options: &RecorderOptions) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.recorder_calls.push("start");
        if inner.recorder_state != HostRecorderState::Idle {
            return Err(operate_fail("start"));
        }
        inner.recorder_state = HostRecorderState::Recording;
        inner.segment_ms = 0;
        inner.ceiling_ms = options.duration_ms;
        inner.segments_started += 1;
        inner.events.push_back(ManagerEvent::Started);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.recorder_calls.push("stop");
        if inner.recorder_state == HostRecorderState::Idle {
            return Err(operate_fail("stop"));
        }
        finish_segment(&mut inner);
        Ok(())
    }

    /// Failures are reported asynchronously through the error event, as the runtime does.
    fn resume(&mut self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.recorder_calls.push("resume");
        if inner.fail_resume || inner.recorder_state == HostRecorderState::Idle {
            inner
                .events
                .push_back(ManagerEvent::Error(RecorderFault::from_err_msg(
                    "operateRecorder:fail resume fail",
                )));
            return Ok(());
        }
        if inner.recorder_state == HostRecorderState::Paused {
            inner.recorder_state = HostRecorderState::Recording;
            inner.events.push_back(ManagerEvent::Resumed);
        }
        Ok(())
    }
}

/// Screen wake-lock of a [`SimMiniProgram`].
pub struct SimScreen {
    inner: Arc<Mutex<RuntimeInner>>,
}

impl ScreenKeepAlive for SimScreen {
    fn set_keep_screen_on(&mut self, keep_on: bool) {
        self.inner.lock().screen_calls.push(keep_on);
    }
}

/// Record-scope authorization of a [`SimMiniProgram`].
pub struct SimAuthorization {
    inner: Arc<Mutex<RuntimeInner>>,
}

impl RecordAuthorization for SimAuthorization {
    fn get_setting(&self) -> Result<bool, SessionError> {
        Ok(self.inner.lock().record_scope_granted)
    }

    fn authorize(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        if inner.allow_authorize {
            inner.record_scope_granted = true;
            Ok(())
        } else {
            Err(SessionError::PermissionDenied { permanent: true })
        }
    }

    fn open_setting(&self) {
        self.inner.lock().settings_opened += 1;
    }
}
