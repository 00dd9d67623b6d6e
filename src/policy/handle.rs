// Process-wide policy holder

use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use super::types::SessionPolicy;

/// Shared, replaceable session policy
///
/// Readers always get a whole `SessionPolicy` copy, so an evaluation never
/// sees a mix of old and new flags.
#[derive(Debug, Clone, Default)]
pub struct PolicyHandle {
    inner: Arc<RwLock<SessionPolicy>>,
}

impl PolicyHandle {
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            inner: Arc::new(RwLock::new(policy)),
        }
    }

    /// Copy of the current policy
    pub fn snapshot(&self) -> SessionPolicy {
        // SessionPolicy is Copy, so a poisoned lock still holds a whole value
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Swap in a new policy, returning the previous one
    pub fn replace(&self, policy: SessionPolicy) -> SessionPolicy {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, policy);
        info!(
            "Session policy replaced: unique_id={} ip={} user_agent={}",
            policy.on_unique_id, policy.on_ip, policy.on_user_agent
        );
        previous
    }
}

impl From<SessionPolicy> for PolicyHandle {
    fn from(policy: SessionPolicy) -> Self {
        Self::new(policy)
    }
}
