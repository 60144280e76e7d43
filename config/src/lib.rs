//! # Configuration System
//!
//! Centralized configuration for the clinical notes service.
//!
//! Loaded once at startup from environment variables (12-factor style) into
//! an immutable [`Config`] value that is passed to constructors; nothing
//! reads the environment ambiently at call time.

pub mod config;
pub mod loader;

pub use config::{AzureOpenAiConfig, Config, Environment, ServiceConfig};
pub use loader::{load_from_env, verify_at_startup};
pub use validator::Validate;
