use crate::traits::host_services::ScreenKeepAlive;

/// Holds the display wake-lock for as long as a session is recording.
///
/// Only forwards changes to the host and releases the lock when dropped.
pub struct KeepAliveGuard<K: ScreenKeepAlive> {
    screen: K,
    held: bool,
}

impl<K: ScreenKeepAlive> KeepAliveGuard<K> {
    pub fn new(screen: K) -> Self {
        Self { screen, held: false }
    }

    pub fn acquire(&mut self) {
        if !self.held {
            log::debug!("keeping screen on");
            self.screen.set_keep_screen_on(true);
            self.held = true;
        }
    }

    pub fn release(&mut self) {
        if self.held {
            log::debug!("releasing screen keep-alive");
            self.screen.set_keep_screen_on(false);
            self.held = false;
        }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn screen(&self) -> &K {
        &self.screen
    }
}

impl<K: ScreenKeepAlive> Drop for KeepAliveGuard<K> {
    fn drop(&mut self) {
        self.release();
    }
}
