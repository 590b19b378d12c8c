use thiserror::Error;

/// Errors that can occur while driving a recording session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The host has no recording primitive at all. Not retried.
    #[error("recording is not supported in this environment")]
    UnsupportedEnvironment,

    /// Microphone access was refused. A permanent denial needs the
    /// user to reset site data or app settings before it can succeed.
    #[error("microphone permission denied (permanent: {permanent})")]
    PermissionDenied { permanent: bool },

    #[error("device acquisition failed: {0}")]
    DeviceAcquisition(String),

    /// No recorder is ready to take the request.
    #[error("recording device not available")]
    DeviceUnavailable,

    #[error("resume failed: {0}")]
    ResumeFailed(String),

    #[error("recorder error: {0}")]
    Recorder(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("configuration failed: {0}")]
    Configuration(String),
}

/// Classified failure of a host-managed recorder (host B).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Resuming after an interruption or screen lock failed.
    ResumeFailed,
    Other,
}

/// Error reported by a host-managed recorder, classified at the host boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderFault {
    pub kind: FaultKind,
    pub message: String,
}

impl RecorderFault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a raw `errMsg` string from the mini-program runtime.
    ///
    /// The runtime only reports failures as text such as
    /// `"operateRecorder:fail resume fail"`; this is the single place that
    /// text is inspected.
    pub fn from_err_msg(err_msg: &str) -> Self {
        let lower = err_msg.to_ascii_lowercase();
        let kind = if lower.contains("resume") && lower.contains("fail") {
            FaultKind::ResumeFailed
        } else {
            FaultKind::Other
        };
        Self::new(kind, err_msg)
    }

    pub fn is_resume_failure(&self) -> bool {
        self.kind == FaultKind::ResumeFailed
    }
}

impl From<RecorderFault> for SessionError {
    fn from(fault: RecorderFault) -> Self {
        match fault.kind {
            FaultKind::ResumeFailed => SessionError::ResumeFailed(fault.message),
            FaultKind::Other => SessionError::Recorder(fault.message),
        }
    }
}

/// Failure of a browser stream acquisition (host A), classified at the host boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    NotSupported,
    PermissionDenied { permanent: bool },
    Device(String),
}

impl AcquireError {
    /// Classify a `DOMException` raised by `getUserMedia`.
    pub fn from_dom_exception(name: &str, message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        match name {
            "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
                // "Permission dismissed" means the prompt was closed and can be retried.
                Self::PermissionDenied {
                    permanent: !lower.contains("dismissed"),
                }
            }
            "NotSupportedError" => Self::NotSupported,
            _ if lower.contains("denied") && lower.contains("permission") => {
                Self::PermissionDenied { permanent: true }
            }
            _ => Self::Device(format!("{}: {}", name, message)),
        }
    }
}

impl From<AcquireError> for SessionError {
    fn from(err: AcquireError) -> Self {
        match err {
            AcquireError::NotSupported => SessionError::UnsupportedEnvironment,
            AcquireError::PermissionDenied { permanent } => SessionError::PermissionDenied { permanent },
            AcquireError::Device(msg) => SessionError::DeviceAcquisition(msg),
        }
    }
}
