// Session limiting policy flags

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::SessionField;

/// Which dimensions of session identity are enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPolicy {
    /// Reject requests whose session fingerprint differs from the stored one
    #[serde(default = "default_on_unique_id")]
    pub on_unique_id: bool,
    /// Reject requests coming from a different IP than the stored one
    #[serde(default)]
    pub on_ip: bool,
    /// Reject requests whose user agent differs from the stored one
    #[serde(default)]
    pub on_user_agent: bool,
}

fn default_on_unique_id() -> bool {
    true
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            on_unique_id: default_on_unique_id(),
            on_ip: false,
            on_user_agent: false,
        }
    }
}

impl SessionPolicy {
    /// Policy with every dimension disabled
    pub fn disabled() -> Self {
        Self {
            on_unique_id: false,
            on_ip: false,
            on_user_agent: false,
        }
    }

    /// Policy with every dimension enabled
    pub fn strict() -> Self {
        Self {
            on_unique_id: true,
            on_ip: true,
            on_user_agent: true,
        }
    }

    pub fn is_enforced(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::UniqueId => self.on_unique_id,
            Dimension::Ip => self.on_ip,
            Dimension::UserAgent => self.on_user_agent,
        }
    }

    /// Return a copy with `dimension` switched on or off
    pub fn with(mut self, dimension: Dimension, enforced: bool) -> Self {
        match dimension {
            Dimension::UniqueId => self.on_unique_id = enforced,
            Dimension::Ip => self.on_ip = enforced,
            Dimension::UserAgent => self.on_user_agent = enforced,
        }
        self
    }

    /// Enforced dimensions, in evaluation order
    pub fn enforced_dimensions(&self) -> impl Iterator<Item = Dimension> + '_ {
        Dimension::ALL
            .into_iter()
            .filter(move |dimension| self.is_enforced(*dimension))
    }
}

/// One dimension of session identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    UniqueId,
    Ip,
    UserAgent,
}

impl Dimension {
    /// All dimensions in evaluation order
    pub const ALL: [Dimension; 3] = [Dimension::UniqueId, Dimension::Ip, Dimension::UserAgent];

    /// Stored column this dimension compares against
    pub fn stored_field(&self) -> SessionField {
        match self {
            Dimension::UniqueId => SessionField::UniqueSessionId,
            Dimension::Ip => SessionField::CurrentSignInIp,
            Dimension::UserAgent => SessionField::CurrentUserAgent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::UniqueId => "unique_id",
            Dimension::Ip => "ip",
            Dimension::UserAgent => "user_agent",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
