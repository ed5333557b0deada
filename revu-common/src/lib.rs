//! # revu common library
//!
//! Shared code for the revu services:
//! - Error and result types
//! - TOML bootstrap configuration and config file discovery
//! - Tracing initialisation
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use error::{Error, Result};
