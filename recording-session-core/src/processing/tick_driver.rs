use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::error::SessionError;

/// Something that consumes elapsed wall-clock time.
pub trait Pollable: Send {
    fn poll(&mut self, now: Instant);
}

/// Background thread that polls a shared session at a fixed interval.
///
/// Stands in for the host's timer on platforms without an event loop. The
/// session decides which polls turn into ticks, so the interval only bounds
/// the tick latency.
pub struct TickDriver {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl TickDriver {
    pub fn spawn<P>(target: Arc<Mutex<P>>, interval: Duration) -> Result<Self, SessionError>
    where
        P: Pollable + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("session-ticker".into())
            .spawn(move || {
                while flag.load(Ordering::SeqCst) {
                    thread::sleep(interval);
                    if !flag.load(Ordering::SeqCst) {
                        break;
                    }
                    target.lock().poll(Instant::now());
                }
            })
            .map_err(|e| SessionError::InvalidState(format!("failed to spawn ticker thread: {}", e)))?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop polling and join the thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
