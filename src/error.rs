//! Error types for configuration lookup and persistence.

use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error while reading or writing the config file
    #[error("Failed to access config: {0}")]
    Io(#[from] std::io::Error),
    /// The persisted file is not valid structured text
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The snapshot could not be rendered to text
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Option absent from both the environment and the persisted store
    #[error("No option '{option}' in section '{section}'")]
    MissingOption {
        /// Section that was queried
        section: String,
        /// Option that was queried
        option: String,
    },
    /// A present value is not a recognized boolean token
    #[error("Not a boolean: '{value}' ({section}.{option})")]
    InvalidBoolean {
        /// Section that was queried
        section: String,
        /// Option that was queried
        option: String,
        /// The offending value
        value: String,
    },
    /// A present value does not parse as a number
    #[error("Not a number: '{value}' ({section}.{option})")]
    InvalidNumeric {
        /// Section that was queried
        section: String,
        /// Option that was queried
        option: String,
        /// The offending value
        value: String,
    },
    /// No home directory to derive the default config location from
    #[error("Could not determine a home directory for the config dir")]
    HomeDirUnavailable,
}
