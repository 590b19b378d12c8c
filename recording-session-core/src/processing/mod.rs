pub mod capture_buffer;
pub mod elapsed_tracker;
pub mod tick_driver;
