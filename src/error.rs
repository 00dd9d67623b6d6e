// Error types

use std::path::PathBuf;
use thiserror::Error;

use crate::models::SessionField;

pub type SessionLimitResult<T> = Result<T, SessionLimitError>;
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while evaluating a session limiting decision
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionLimitError {
    /// The record opts into session limiting and a dimension is enforced,
    /// but the record has no column to compare that dimension against.
    /// Fix the record schema or disable the dimension.
    #[error("{0} is missing")]
    FieldMisconfiguration(SessionField),
}

impl SessionLimitError {
    /// Field whose absence caused the error
    pub fn field(&self) -> SessionField {
        match self {
            SessionLimitError::FieldMisconfiguration(field) => *field,
        }
    }
}

/// Errors raised while loading policy configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value '{value}' for {var}: expected true/false")]
    InvalidEnv { var: String, value: String },
}
