// Account record capability surface

use serde::{Deserialize, Serialize};
use std::fmt;

use super::fingerprint::SessionFingerprint;

/// Capabilities an account record may advertise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// The record can persist a new session fingerprint.
    /// Presence of this capability is what opts a record into session limiting.
    UpdateSessionFingerprint,
}

impl Capability {
    fn bit(self) -> u8 {
        match self {
            Capability::UpdateSessionFingerprint => 1 << 0,
        }
    }
}

/// Small set of capabilities exposed by a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    bits: u8,
}

impl CapabilitySet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Return a copy of the set with `capability` added
    pub fn with(mut self, capability: Capability) -> Self {
        self.bits |= capability.bit();
        self
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.bits & capability.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter()
            .fold(CapabilitySet::empty(), |set, capability| set.with(capability))
    }
}

/// Stored columns consulted by the session limiting dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionField {
    UniqueSessionId,
    CurrentSignInIp,
    CurrentUserAgent,
}

impl SessionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionField::UniqueSessionId => "unique_session_id",
            SessionField::CurrentSignInIp => "current_sign_in_ip",
            SessionField::CurrentUserAgent => "current_user_agent",
        }
    }
}

impl fmt::Display for SessionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a stored column as seen through a record
///
/// `Absent` means the record has no such column at all, which is a schema
/// problem. `Present(None)` is an existing column that holds no value yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredField<'a> {
    Absent,
    Present(Option<&'a str>),
}

impl<'a> StoredField<'a> {
    pub fn is_present(&self) -> bool {
        matches!(self, StoredField::Present(_))
    }

    /// Whether the observed value differs from the stored one.
    /// An absent column never matches anything; evaluation rejects absent
    /// columns in the integrity check before any comparison runs.
    pub fn differs_from(&self, observed: Option<&str>) -> bool {
        match self {
            StoredField::Absent => true,
            StoredField::Present(stored) => *stored != observed,
        }
    }
}

impl<'a> From<Option<&'a str>> for StoredField<'a> {
    fn from(value: Option<&'a str>) -> Self {
        StoredField::Present(value)
    }
}

impl<'a> From<&'a str> for StoredField<'a> {
    fn from(value: &'a str) -> Self {
        StoredField::Present(Some(value))
    }
}

/// Read-only view of an account record used during evaluation
///
/// Every accessor defaults to "not exposed", so a record only overrides
/// what its schema actually has.
pub trait AccountRecord {
    /// Capabilities this record advertises
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::empty()
    }

    /// Fingerprint persisted at the last accepted sign-in
    fn unique_session_id(&self) -> StoredField<'_> {
        StoredField::Absent
    }

    /// IP address observed at the last accepted sign-in
    fn current_sign_in_ip(&self) -> StoredField<'_> {
        StoredField::Absent
    }

    /// User agent observed at the last accepted sign-in
    fn current_user_agent(&self) -> StoredField<'_> {
        StoredField::Absent
    }

    /// Look up a stored column by name
    fn stored_field(&self, field: SessionField) -> StoredField<'_> {
        match field {
            SessionField::UniqueSessionId => self.unique_session_id(),
            SessionField::CurrentSignInIp => self.current_sign_in_ip(),
            SessionField::CurrentUserAgent => self.current_user_agent(),
        }
    }
}

/// Mutating side of the update-session-fingerprint capability
///
/// Implementing this trait is itself the opt-in: evaluate such records
/// through [`SessionLimitable::limitable_view`], which always advertises
/// [`Capability::UpdateSessionFingerprint`] whether or not the record's own
/// `capabilities()` does.
pub trait SessionLimitable: AccountRecord {
    /// Persist a new fingerprint as the record's unique session id
    fn update_unique_session_id(&mut self, fingerprint: &SessionFingerprint);

    /// Read-only view of this record that advertises the update capability
    fn limitable_view(&self) -> LimitableView<'_, Self> {
        LimitableView { record: self }
    }
}

/// Record view that derives the opt-in from the [`SessionLimitable`] impl
pub struct LimitableView<'a, R: ?Sized> {
    record: &'a R,
}

impl<R: AccountRecord + ?Sized> AccountRecord for LimitableView<'_, R> {
    fn capabilities(&self) -> CapabilitySet {
        self.record
            .capabilities()
            .with(Capability::UpdateSessionFingerprint)
    }

    fn unique_session_id(&self) -> StoredField<'_> {
        self.record.unique_session_id()
    }

    fn current_sign_in_ip(&self) -> StoredField<'_> {
        self.record.current_sign_in_ip()
    }

    fn current_user_agent(&self) -> StoredField<'_> {
        self.record.current_user_agent()
    }
}
