//! cliconf - Layered configuration for command-line tools
//!
//! This library provides functionality to:
//! - Persist option values grouped into named sections in a per-user config file
//! - Override any single value through environment variables derived from the tool name
//! - Read values through typed accessors with fallback defaults
//!
//! Resolution is deterministic: the environment always wins over the
//! persisted file, and a fallback only substitutes for a value missing from
//! both sources.

pub mod env;
pub mod error;
pub mod snapshot;
pub mod store;

pub use env::{Environment, ProcessEnv};
pub use error::ConfigError;
pub use snapshot::ConfigSnapshot;
pub use store::CliConfig;
