pub mod managed;
pub mod stream;
