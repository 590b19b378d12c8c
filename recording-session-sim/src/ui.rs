//! Recording UI and upload callback for simulated hosts.

use std::sync::Arc;

use parking_lot::Mutex;

use recording_session_core::models::error::SessionError;
use recording_session_core::models::state::{Progress, SessionState};
use recording_session_core::traits::notifier::{Notice, Notifier};
use recording_session_core::traits::session_delegate::SessionDelegate;

/// Notifier that records every notice and answers confirmations with a fixed choice.
#[derive(Default)]
pub struct SimNotifier {
    notices: Mutex<Vec<Notice>>,
    accept_confirm: Mutex<bool>,
}

impl SimNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn accept_confirmations(&self, accept: bool) {
        *self.accept_confirm.lock() = accept;
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

impl Notifier for SimNotifier {
    fn notify(&self, notice: &Notice) {
        log::info!("[ui] {}", notice);
        self.notices.lock().push(notice.clone());
    }

    fn confirm(&self, notice: &Notice) -> bool {
        let accept = *self.accept_confirm.lock();
        log::info!("[ui] {} -> {}", notice, if accept { "confirm" } else { "cancel" });
        self.notices.lock().push(notice.clone());
        accept
    }
}

/// Session delegate that keeps every callback it receives.
pub struct CollectingDelegate<C> {
    captures: Mutex<Vec<C>>,
    progress: Mutex<Vec<Progress>>,
    states: Mutex<Vec<SessionState>>,
    errors: Mutex<Vec<SessionError>>,
}

impl<C> CollectingDelegate<C> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            captures: Mutex::new(Vec::new()),
            progress: Mutex::new(Vec::new()),
            states: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        })
    }

    pub fn capture_count(&self) -> usize {
        self.captures.lock().len()
    }

    /// Remove and return the delivered captures.
    pub fn take_captures(&self) -> Vec<C> {
        std::mem::take(&mut *self.captures.lock())
    }

    pub fn progress(&self) -> Vec<Progress> {
        self.progress.lock().clone()
    }

    pub fn states(&self) -> Vec<SessionState> {
        self.states.lock().clone()
    }

    pub fn errors(&self) -> Vec<SessionError> {
        self.errors.lock().clone()
    }
}

impl<C: Send> SessionDelegate<C> for CollectingDelegate<C> {
    fn on_capture_finished(&self, capture: C) {
        self.captures.lock().push(capture);
    }

    fn on_progress(&self, progress: &Progress) {
        self.progress.lock().push(*progress);
    }

    fn on_state_changed(&self, state: &SessionState) {
        self.states.lock().push(*state);
    }

    fn on_error(&self, error: &SessionError) {
        self.errors.lock().push(error.clone());
    }
}
