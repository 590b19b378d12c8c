//! # recording-session-sim
//!
//! Scripted in-memory hosts for recording-session-core.
//!
//! Provides:
//! - `SimBrowser` / `SimMediaDevices` / `SimStreamRecorder` — a browser with
//!   `getUserMedia` and a continuous-stream recorder
//! - `SimMiniProgram` / `SimRecorderManager` / `SimScreen` / `SimAuthorization` —
//!   a mini-program runtime with a managed recorder service
//! - `SimNotifier` and `CollectingDelegate` — UI and upload callback that record what they see
//!
//! Host requests never call back into a session directly. Each host queues
//! the events its real counterpart would raise, and the test or demo pumps
//! them into the session, the way a host event loop would.
//!
//! ## Usage
//! ```ignore
//! use recording_session_core::{StreamSession, StreamSessionConfig};
//! use recording_session_sim::{CollectingDelegate, SimBrowser, SimNotifier};
//!
//! let browser = SimBrowser::new();
//! let delegate = CollectingDelegate::new();
//! let mut session = StreamSession::new(
//!     browser.media_devices(),
//!     StreamSessionConfig::default(),
//!     delegate.clone(),
//!     SimNotifier::new(),
//! )?;
//! session.initialize()?;
//! session.on_stream_ready(browser.grant())?;
//! ```

pub mod browser;
pub mod mini_program;
pub mod ui;

pub use browser::{SimBrowser, SimMediaDevices, SimStreamRecorder};
pub use mini_program::{SimAuthorization, SimMiniProgram, SimRecorderManager, SimScreen};
pub use ui::{CollectingDelegate, SimNotifier};
