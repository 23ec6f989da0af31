//! # tagcluster common library
//!
//! Shared code for the tagcluster services:
//! - Error types
//! - TOML bootstrap configuration and config-file discovery

pub mod config;
pub mod error;

pub use error::{Error, Result};
