//! Simulated browser: `navigator.mediaDevices` plus a `MediaRecorder`.
//!
//! Like the real recorder, encoded data is only delivered when recording
//! stops, as `DataAvailable` events right before `Stopped`.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use recording_session_core::models::capture::AudioFragment;
use recording_session_core::models::error::{AcquireError, SessionError};
use recording_session_core::models::state::RecorderState;
use recording_session_core::session::stream::StreamSession;
use recording_session_core::traits::media_devices::{
    MediaDevices, PermissionState, StreamEvent, StreamRecorder,
};

struct BrowserInner {
    supported: bool,
    permission: PermissionState,
    stream_requests: u32,
    events: VecDeque<StreamEvent>,
    recorder_calls: Vec<&'static str>,
    recorder_state: RecorderState,
    // Fragments delivered on the next stop.
    pending_data: Vec<AudioFragment>,
    fail_next_start: Option<String>,
}

/// Handle on a simulated browser, shared with the devices and recorders it hands out.
#[derive(Clone)]
pub struct SimBrowser {
    inner: Arc<Mutex<BrowserInner>>,
}

impl SimBrowser {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BrowserInner {
                supported: true,
                permission: PermissionState::Prompt,
                stream_requests: 0,
                events: VecDeque::new(),
                recorder_calls: Vec::new(),
                recorder_state: RecorderState::Inactive,
                pending_data: Vec::new(),
                fail_next_start: None,
            })),
        }
    }

    /// A browser without any capture API.
    pub fn unsupported() -> Self {
        let browser = Self::new();
        browser.inner.lock().supported = false;
        browser
    }

    pub fn set_permission(&self, permission: PermissionState) {
        self.inner.lock().permission = permission;
    }

    pub fn media_devices(&self) -> SimMediaDevices {
        SimMediaDevices {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of `getUserMedia` calls so far.
    pub fn stream_requests(&self) -> u32 {
        self.inner.lock().stream_requests
    }

    /// Resolve the pending stream request with a recorder.
    pub fn grant(&self) -> Result<SimStreamRecorder, AcquireError> {
        Ok(SimStreamRecorder {
            inner: Arc::clone(&self.inner),
        })
    }

    /// Reject the pending stream request like `getUserMedia` would.
    pub fn reject(&self, name: &str, message: &str) -> Result<SimStreamRecorder, AcquireError> {
        Err(AcquireError::from_dom_exception(name, message))
    }

    /// Queue encoded audio to be delivered on the next stop.
    pub fn capture(&self, data: &[u8]) {
        self.inner
            .lock()
            .pending_data
            .push(AudioFragment::new(data.to_vec(), "audio/webm;codecs=opus"));
    }

    /// Make the next `start()` call fail.
    pub fn fail_next_start(&self, reason: &str) {
        self.inner.lock().fail_next_start = Some(reason.to_string());
    }

    /// Raise a recorder error event, as the browser does on device loss.
    pub fn raise_error(&self, message: &str) {
        let mut inner = self.inner.lock();
        inner.recorder_state = RecorderState::Inactive;
        inner.events.push_back(StreamEvent::Error(message.to_string()));
    }

    /// Raise an event without any recorder request, e.g. a user-agent pause.
    pub fn raise(&self, event: StreamEvent) {
        self.inner.lock().events.push_back(event);
    }

    pub fn recorder_calls(&self) -> Vec<&'static str> {
        self.inner.lock().recorder_calls.clone()
    }

    pub fn recorder_state(&self) -> RecorderState {
        self.inner.lock().recorder_state
    }

    pub fn pending_events(&self) -> usize {
        self.inner.lock().events.len()
    }

    /// Deliver every queued event to the session, including events raised
    /// while handling earlier ones. Returns how many were delivered.
    pub fn pump(&self, session: &mut StreamSession<SimMediaDevices>) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.inner.lock().events.pop_front();
            let Some(event) = next else {
                return delivered;
            };
            log::trace!("browser event: {:?}", event);
            session.handle_event(event);
            delivered += 1;
        }
    }
}

impl Default for SimBrowser {
    fn default() -> Self {
        Self::new()
    }
}

/// `navigator.mediaDevices` of a [`SimBrowser`].
pub struct SimMediaDevices {
    inner: Arc<Mutex<BrowserInner>>,
}

impl MediaDevices for SimMediaDevices {
    type Recorder = SimStreamRecorder;

    fn is_supported(&self) -> bool {
        self.inner.lock().supported
    }

    fn query_permission(&self) -> PermissionState {
        self.inner.lock().permission
    }

    fn request_stream(&mut self) -> Result<(), AcquireError> {
        let mut inner = self.inner.lock();
        if !inner.supported {
            return Err(AcquireError::NotSupported);
        }
        inner.stream_requests += 1;
        Ok(())
    }
}

/// `MediaRecorder` of a [`SimBrowser`].
pub struct SimStreamRecorder {
    inner: Arc<Mutex<BrowserInner>>,
}

impl SimStreamRecorder {
    fn transition(
        &mut self,
        call: &'static str,
        from: &[RecorderState],
        to: RecorderState,
        event: StreamEvent,
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.recorder_calls.push(call);
        if !from.contains(&inner.recorder_state) {
            return Err(SessionError::Recorder(format!(
                "InvalidStateError: cannot {} while {}",
                call,
                inner.recorder_state.as_str()
            )));
        }
        inner.recorder_state = to;
        inner.events.push_back(event);
        Ok(())
    }
}

impl StreamRecorder for SimStreamRecorder {
    fn state(&self) -> RecorderState {
        self.inner.lock().recorder_state
    }

    fn start(&mut self) -> Result<(), SessionError> {
        let failure = self.inner.lock().fail_next_start.take();
        if let Some(reason) = failure {
            return Err(SessionError::Recorder(reason));
        }
        self.transition(
            "start",
            &[RecorderState::Inactive],
            RecorderState::Recording,
            StreamEvent::Started,
        )
    }

    fn pause(&mut self) -> Result<(), SessionError> {
        self.transition(
            "pause",
            &[RecorderState::Recording],
            RecorderState::Paused,
            StreamEvent::Paused,
        )
    }

    fn resume(&mut self) -> Result<(), SessionError> {
        self.transition(
            "resume",
            &[RecorderState::Paused],
            RecorderState::Recording,
            StreamEvent::Resumed,
        )
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.recorder_calls.push("stop");
        if inner.recorder_state == RecorderState::Inactive {
            return Err(SessionError::Recorder(
                "InvalidStateError: recorder is inactive".into(),
            ));
        }
        inner.recorder_state = RecorderState::Inactive;
        let data = std::mem::take(&mut inner.pending_data);
        for fragment in data {
            inner.events.push_back(StreamEvent::DataAvailable(fragment));
        }
        inner.events.push_back(StreamEvent::Stopped);
        Ok(())
    }
}
