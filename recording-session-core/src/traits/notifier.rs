use std::fmt;

/// User-facing notices a session may raise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    UnsupportedEnvironment,
    PermissionDenied { permanent: bool },
    DeviceFailure(String),
    RecordingTooShort,
    /// Asks whether to open the settings screen to grant microphone access.
    MicrophoneAccessRequired,
    AuthorizationFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedEnvironment => write!(f, "This environment does not support audio recording"),
            Self::PermissionDenied { permanent: true } => {
                write!(f, "Microphone access was denied; clear the site data or app cache and try again")
            }
            Self::PermissionDenied { permanent: false } => {
                write!(f, "Microphone access was not granted; please try again")
            }
            Self::DeviceFailure(reason) => write!(f, "{}", reason),
            Self::RecordingTooShort => write!(f, "Recording must be longer than 1 second"),
            Self::MicrophoneAccessRequired => write!(f, "Recording needs microphone access"),
            Self::AuthorizationFailed => write!(f, "Authorization failed"),
        }
    }
}

/// Host UI for alerts, toasts and confirmation dialogs.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);

    /// Show a confirmation dialog; `true` when the user accepts.
    fn confirm(&self, notice: &Notice) -> bool {
        self.notify(notice);
        false
    }
}

/// Notifier that only logs, for hosts without UI.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        log::warn!("notice: {}", notice);
    }
}
