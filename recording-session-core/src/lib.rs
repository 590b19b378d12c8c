//! # recording-session-core
//!
//! Host-agnostic audio recording session core.
//!
//! Owns the session state machine, elapsed-time tracking, max-duration
//! enforcement and the hand-off of captured audio to an upload callback.
//! Hosts implement the traits in `traits/` around their recording
//! primitive and feed its events back into a session:
//!
//! - `StreamSession` drives a browser continuous-stream recorder
//!   (`MediaDevices` + `StreamRecorder`).
//! - `ManagedSession` drives a mini-program recorder service
//!   (`RecorderManager` + `ScreenKeepAlive`).
//!
//! ## Architecture
//!
//! ```text
//! recording-session-core (this crate)
//! ├── traits/      ← MediaDevices, StreamRecorder, RecorderManager, SessionDelegate, Notifier, host services
//! ├── models/      ← SessionError, SessionState, Progress, configs, captures
//! ├── processing/  ← ElapsedTracker, CaptureBuffer, TickDriver
//! ├── guards/      ← KeepAliveGuard, PermissionGate
//! └── session/     ← StreamSession, ManagedSession
//! ```

pub mod guards;
pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use guards::keep_alive::KeepAliveGuard;
pub use guards::permission::{AuthorizationOutcome, PermissionGate};
pub use models::capture::{AudioFragment, CaptureSummary, ManagedCapture, ManagedRecording, StreamCapture};
pub use models::config::{AudioFormat, ManagedSessionConfig, RecorderOptions, StreamSessionConfig};
pub use models::error::{AcquireError, FaultKind, RecorderFault, SessionError};
pub use models::state::{Progress, RecorderState, SessionState};
pub use processing::capture_buffer::CaptureBuffer;
pub use processing::elapsed_tracker::{ElapsedTracker, TickOutcome, TickToken};
pub use processing::tick_driver::{Pollable, TickDriver};
pub use session::managed::ManagedSession;
pub use session::stream::StreamSession;
pub use traits::host_services::{RecordAuthorization, ScreenKeepAlive};
pub use traits::media_devices::{MediaDevices, PermissionState, StreamEvent, StreamRecorder};
pub use traits::notifier::{LogNotifier, Notice, Notifier};
pub use traits::recorder_manager::{ManagerEvent, RecorderManager};
pub use traits::session_delegate::SessionDelegate;
