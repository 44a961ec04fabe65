//! Shared utilities for the portfolio assistant workspace
//!
//! This crate provides the common plumbing used across the workspace:
//! tracing setup and environment-driven settings.

pub mod logging;
pub mod settings;

pub use logging::init_tracing;
pub use settings::Settings;
