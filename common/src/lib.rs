//! Shared library for the muster collector and agent.

pub mod config;
pub mod protocol;
pub mod record;
