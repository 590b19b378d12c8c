pub mod host_services;
pub mod media_devices;
pub mod notifier;
pub mod recorder_manager;
pub mod session_delegate;
