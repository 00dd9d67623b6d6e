pub mod context;
pub mod fingerprint;
pub mod record;

pub use context::ObservedContext;
pub use fingerprint::SessionFingerprint;
pub use record::{
    AccountRecord, Capability, CapabilitySet, LimitableView, SessionField, SessionLimitable,
    StoredField,
};
