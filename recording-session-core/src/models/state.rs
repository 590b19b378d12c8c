use serde::{Deserialize, Serialize};

/// Recording session state machine.
///
/// State transitions:
/// ```text
/// idle → initializing → recording ⇄ paused
///                          ↓  ↑        ↓
///                     interrupted   stopping → idle
///
/// error is reachable from any state and recovers to idle.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Initializing,
    Recording,
    /// The host suspended capture on its own (phone call, screen lock).
    Interrupted,
    Paused,
    Stopping,
    Error,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Whether this state holds the microphone for the current session.
    ///
    /// At most one session per controller may be active.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Initializing | Self::Recording | Self::Interrupted | Self::Paused | Self::Stopping
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::Recording => "recording",
            Self::Interrupted => "interrupted",
            Self::Paused => "paused",
            Self::Stopping => "stopping",
            Self::Error => "error",
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

/// State reported by the underlying recording primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    Inactive,
    Recording,
    Paused,
}

impl RecorderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Recording => "recording",
            Self::Paused => "paused",
        }
    }
}

/// Progress report delivered to the caller while recording.
///
/// Serializes as `{"time": 12, "state": "recording"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(rename = "time")]
    pub elapsed_secs: u32,
    pub state: RecorderState,
}

impl Progress {
    pub fn new(elapsed_secs: u32, state: RecorderState) -> Self {
        Self { elapsed_secs, state }
    }
}
