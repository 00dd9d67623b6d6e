// Session limiting policy
// Keeps one active session per account and rejects authenticated requests
// whose session context no longer matches the last accepted sign-in

pub mod config;
pub mod error;
pub mod limiter;
pub mod models;
pub mod policy;

pub use error::{ConfigError, ConfigResult, SessionLimitError, SessionLimitResult};
pub use limiter::{record_sign_in, AccessDecision, SessionLimitEvaluator};
pub use models::{
    AccountRecord, Capability, CapabilitySet, LimitableView, ObservedContext, SessionField,
    SessionFingerprint, SessionLimitable, StoredField,
};
pub use policy::{Dimension, PolicyHandle, SessionPolicy};
