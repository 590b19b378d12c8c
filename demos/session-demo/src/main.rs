use std::sync::Arc;

use recording_session_core::{
    ManagedCapture, ManagedSession, ManagedSessionConfig, PermissionGate, Progress,
    SessionDelegate, SessionError, SessionState, StreamCapture, StreamSession, StreamSessionConfig,
};
use recording_session_sim::{SimBrowser, SimMiniProgram, SimNotifier};

/// Delegate that prints what an app would upload or show.
struct PrintingDelegate;

impl SessionDelegate<StreamCapture> for PrintingDelegate {
    fn on_capture_finished(&self, capture: StreamCapture) {
        print_summary("browser", serde_json::to_string_pretty(&capture.summary()));
    }

    fn on_progress(&self, progress: &Progress) {
        match serde_json::to_string(progress) {
            Ok(json) => println!("progress {}", json),
            Err(e) => log::error!("failed to serialize progress: {}", e),
        }
    }

    fn on_state_changed(&self, state: &SessionState) {
        log::info!("browser session -> {}", state.as_str());
    }
}

impl SessionDelegate<ManagedCapture> for PrintingDelegate {
    fn on_capture_finished(&self, capture: ManagedCapture) {
        print_summary("mini-program", serde_json::to_string_pretty(&capture.summary()));
    }

    fn on_state_changed(&self, state: &SessionState) {
        log::info!("mini-program session -> {}", state.as_str());
    }

    fn on_error(&self, error: &SessionError) {
        log::warn!("mini-program session error: {}", error);
    }
}

fn print_summary(host: &str, json: serde_json::Result<String>) {
    match json {
        Ok(json) => println!("{} upload:\n{}", host, json),
        Err(e) => log::error!("failed to serialize capture summary: {}", e),
    }
}

fn run_browser() -> Result<(), SessionError> {
    let browser = SimBrowser::new();
    let config = StreamSessionConfig::from_json(r#"{ "start_on_ready": true, "max_duration_secs": 3 }"#)?;
    let mut session = StreamSession::new(
        browser.media_devices(),
        config,
        Arc::new(PrintingDelegate),
        SimNotifier::new(),
    )?;

    session.initialize()?;
    session.on_stream_ready(browser.grant())?;
    browser.pump(&mut session);

    browser.capture(&[0x1a, 0x45, 0xdf, 0xa3]);
    browser.capture(&[0x42, 0x86, 0x81, 0x01]);
    // Run past the ceiling; the session stops itself.
    for _ in 0..4 {
        session.tick();
        browser.pump(&mut session);
    }
    Ok(())
}

fn run_mini_program() -> Result<(), SessionError> {
    let runtime = SimMiniProgram::new();
    let notifier = SimNotifier::new();
    notifier.accept_confirmations(true);

    let gate = PermissionGate::new(runtime.authorization(), notifier.clone());
    log::info!("record authorization: {:?}", gate.ensure()?);

    let config = ManagedSessionConfig::from_json(
        r#"{ "recorder_options": { "duration": 60000 }, "auto_continue": true }"#,
    )?;
    let mut session = ManagedSession::new(
        runtime.recorder_manager(),
        runtime.screen(),
        config,
        Arc::new(PrintingDelegate),
        notifier,
    )?;

    session.start()?;
    runtime.pump(&mut session);

    runtime.advance(45_000);
    runtime.interrupt();
    runtime.pump(&mut session);
    runtime.end_interruption();
    runtime.pump(&mut session);

    // Crosses the 60 s host ceiling; a second segment starts.
    runtime.advance(30_000);
    runtime.pump(&mut session);
    runtime.advance(20_000);

    session.stop()?;
    runtime.pump(&mut session);
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run_browser() {
        log::error!("browser walkthrough failed: {}", e);
    }
    if let Err(e) = run_mini_program() {
        log::error!("mini-program walkthrough failed: {}", e);
    }
}
