//! Utilities shared by the Palaver binaries: logging setup and time helpers.

pub mod logger;
pub mod time;
