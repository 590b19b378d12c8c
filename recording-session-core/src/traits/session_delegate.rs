use crate::models::error::SessionError;
use crate::models::state::{Progress, SessionState};

/// Event delegate for recording session notifications.
///
/// `C` is the capture type handed off when a session completes.
/// Calls happen on whichever thread drives the session; implementations
/// should marshal to the UI thread if needed.
pub trait SessionDelegate<C>: Send + Sync {
    /// The upload callback. Called at most once per completed session and
    /// receives the capture by value.
    fn on_capture_finished(&self, capture: C);

    /// Called every elapsed second while recording, and once more when the
    /// elapsed-time tracker is cancelled.
    fn on_progress(&self, _progress: &Progress) {}

    fn on_state_changed(&self, _state: &SessionState) {}

    /// Called for failures that aborted or degraded the session.
    fn on_error(&self, _error: &SessionError) {}
}
