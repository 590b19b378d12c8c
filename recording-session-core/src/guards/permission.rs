use std::sync::Arc;

use crate::models::error::SessionError;
use crate::traits::host_services::RecordAuthorization;
use crate::traits::notifier::{Notice, Notifier};

/// How a microphone authorization request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Granted,
    /// The user was sent to the settings screen; re-check when they return.
    SettingsOpened,
    Declined,
}

/// Microphone authorization flow of a mini-program runtime (host B).
pub struct PermissionGate<A: RecordAuthorization> {
    auth: A,
    notifier: Arc<dyn Notifier>,
}

impl<A: RecordAuthorization> PermissionGate<A> {
    pub fn new(auth: A, notifier: Arc<dyn Notifier>) -> Self {
        Self { auth, notifier }
    }

    /// Whether the record scope is granted, without prompting.
    pub fn check(&self) -> Result<bool, SessionError> {
        self.auth.get_setting()
    }

    /// Prompt for the record scope. On refusal, offer the settings screen.
    pub fn request(&self) -> AuthorizationOutcome {
        match self.auth.authorize() {
            Ok(()) => AuthorizationOutcome::Granted,
            Err(e) => {
                log::info!("record authorization refused: {}", e);
                if self.notifier.confirm(&Notice::MicrophoneAccessRequired) {
                    self.auth.open_setting();
                    AuthorizationOutcome::SettingsOpened
                } else {
                    self.notifier.notify(&Notice::AuthorizationFailed);
                    AuthorizationOutcome::Declined
                }
            }
        }
    }

    /// Check first, prompting only when the scope is not yet granted.
    pub fn ensure(&self) -> Result<AuthorizationOutcome, SessionError> {
        if self.check()? {
            return Ok(AuthorizationOutcome::Granted);
        }
        Ok(self.request())
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct Auth {
        granted: bool,
        allow: bool,
        settings_opened: Mutex<u32>,
    }

    impl RecordAuthorization for Auth {
        fn get_setting(&self) -> Result<bool, SessionError> {
            Ok(self.granted)
        }

        fn authorize(&self) -> Result<(), SessionError> {
            if self.allow {
                Ok(())
            } else {
                Err(SessionError::PermissionDenied { permanent: true })
            }
        }

        fn open_setting(&self) {
            *self.settings_opened.lock() += 1;
        }
    }

    #[derive(Default)]
    struct Ui {
        accept: bool,
        shown: Mutex<Vec<Notice>>,
    }

    impl Notifier for Ui {
        fn notify(&self, notice: &Notice) {
            self.shown.lock().push(notice.clone());
        }

        fn confirm(&self, notice: &Notice) -> bool {
            self.shown.lock().push(notice.clone());
            self.accept
        }
    }

    #[test]
    fn granted_scope_skips_prompt() {
        let ui = Arc::new(Ui::default());
        let gate = PermissionGate::new(Auth { granted: true, ..Default::default() }, ui.clone());

        assert_eq!(gate.ensure().unwrap(), AuthorizationOutcome::Granted);
        assert!(ui.shown.lock().is_empty());
    }

    #[test]
    fn refusal_offers_settings() {
        let ui = Arc::new(Ui { accept: true, ..Default::default() });
        let gate = PermissionGate::new(Auth::default(), ui.clone());

        assert_eq!(gate.request(), AuthorizationOutcome::SettingsOpened);
        assert_eq!(*gate.auth.settings_opened.lock(), 1);
        assert_eq!(*ui.shown.lock(), vec![Notice::MicrophoneAccessRequired]);
    }

    #[test]
    fn declining_settings_shows_failure() {
        let ui = Arc::new(Ui::default());
        let gate = PermissionGate::new(Auth::default(), ui.clone());

        assert_eq!(gate.request(), AuthorizationOutcome::Declined);
        assert_eq!(
            *ui.shown.lock(),
            vec![Notice::MicrophoneAccessRequired, Notice::AuthorizationFailed]
        );
    }
}
