//! Core abstractions for the portfolio assistant
//!
//! This crate defines the fundamental traits and types shared by the agent
//! crates: the `Agent` trait, the execution `Context`, and the core error
//! type.

pub mod agent;
pub mod context;
pub mod error;

pub use agent::Agent;
pub use context::Context;
pub use error::{Error, Result};
