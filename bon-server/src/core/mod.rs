//! Core module - server configuration and state
//!
//! # Contents
//!
//! - [`Config`] - configuration read from the environment
//! - [`ServerState`] - shared state of the HTTP handlers

pub mod config;
pub mod state;

pub use config::Config;
pub use state::ServerState;
