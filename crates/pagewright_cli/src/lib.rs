//! Pagewright CLI library exports for integration testing.

pub mod commands;
pub mod errors;
pub mod options;
