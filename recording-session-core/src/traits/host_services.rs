use crate::models::error::SessionError;

/// Display wake-lock of a host-managed runtime (host B).
pub trait ScreenKeepAlive: Send {
    fn set_keep_screen_on(&mut self, keep_on: bool);
}

/// Record-scope authorization calls of a mini-program runtime (host B).
pub trait RecordAuthorization: Send + Sync {
    /// Whether the record scope is already granted.
    fn get_setting(&self) -> Result<bool, SessionError>;

    /// Prompt for the record scope. Fails when the user refuses or has refused before.
    fn authorize(&self) -> Result<(), SessionError>;

    /// Open the runtime settings screen.
    fn open_setting(&self);
}
