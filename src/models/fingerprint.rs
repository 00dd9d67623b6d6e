// Session fingerprint token

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token identifying the one session an account is allowed to hold
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionFingerprint(String);

impl SessionFingerprint {
    /// Generate a fresh random fingerprint
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionFingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionFingerprint {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for SessionFingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
