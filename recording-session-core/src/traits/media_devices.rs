use crate::models::capture::AudioFragment;
use crate::models::error::{AcquireError, SessionError};
use crate::models::state::RecorderState;

/// Result of a microphone permission query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    /// The user has not decided yet; requesting the stream will prompt.
    Prompt,
    Denied,
}

/// Browser device access (host A).
///
/// Implemented by the host glue around `navigator.mediaDevices`.
pub trait MediaDevices: Send {
    type Recorder: StreamRecorder;

    /// Whether the host exposes a capture API at all.
    fn is_supported(&self) -> bool;

    /// Current microphone permission, if the host can report it without prompting.
    fn query_permission(&self) -> PermissionState {
        PermissionState::Prompt
    }

    /// Ask the host for an audio stream.
    ///
    /// Completes asynchronously: the host reports the outcome through
    /// `StreamSession::on_stream_ready`. An `Err` here means the request
    /// could not even be issued.
    fn request_stream(&mut self) -> Result<(), AcquireError>;
}

/// Continuous-stream recorder built on an acquired stream (host A).
///
/// Every request is confirmed later by a [`StreamEvent`] the host glue feeds
/// back into the session.
pub trait StreamRecorder: Send {
    fn state(&self) -> RecorderState;

    fn start(&mut self) -> Result<(), SessionError>;

    fn pause(&mut self) -> Result<(), SessionError>;

    fn resume(&mut self) -> Result<(), SessionError>;

    fn stop(&mut self) -> Result<(), SessionError>;
}

/// Events raised by a stream recorder.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Started,
    Paused,
    Resumed,
    /// Encoded audio; the browser only delivers this right before `Stopped`.
    DataAvailable(AudioFragment),
    Stopped,
    Error(String),
}
