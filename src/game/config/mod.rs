//! Config Module
//!
//! Centralized configuration for the placement core.

pub mod build_config;

pub use build_config::{BuildConfig, CommitPolicy, ConfigError};
