// Identifiers observed on the current request

use serde::{Deserialize, Serialize};

/// Values extracted by the caller from the incoming request
/// (cookie, headers, peer address) before an evaluation runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedContext {
    /// Session fingerprint carried by the request
    pub unique_session_id: Option<String>,
    /// User-Agent header
    pub user_agent: Option<String>,
    /// Remote IP address
    pub remote_ip: Option<String>,
}

impl ObservedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unique_session_id(mut self, unique_session_id: impl Into<String>) -> Self {
        self.unique_session_id = Some(unique_session_id.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_remote_ip(mut self, remote_ip: impl Into<String>) -> Self {
        self.remote_ip = Some(remote_ip.into());
        self
    }
}
