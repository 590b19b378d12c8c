use crate::models::capture::ManagedRecording;
use crate::models::config::RecorderOptions;
use crate::models::error::{RecorderFault, SessionError};

/// Host-managed recorder service (host B).
///
/// One instance is owned by each `ManagedSession`; hosts that only offer a
/// process-wide manager should wrap it once at startup and hand it in.
pub trait RecorderManager: Send {
    fn start(&mut self, options: &RecorderOptions) -> Result<(), SessionError>;

    fn stop(&mut self) -> Result<(), SessionError>;

    fn resume(&mut self) -> Result<(), SessionError>;
}

/// Events raised by a host-managed recorder.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerEvent {
    Started,
    /// The host paused recording. Never requested by the session itself.
    Paused,
    Resumed,
    Stopped(ManagedRecording),
    Error(RecorderFault),
    InterruptionBegin,
    InterruptionEnd,
}
