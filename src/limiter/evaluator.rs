// Session limiting evaluator
// Decides whether a sign-in refreshes the stored fingerprint and whether an
// authenticated request must be rejected because its session context changed

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::capability::opts_in;
use super::integrity;
use super::restriction::Restriction;
use crate::error::SessionLimitResult;
use crate::models::{AccountRecord, ObservedContext, SessionFingerprint, SessionLimitable};
use crate::policy::{Dimension, PolicyHandle, SessionPolicy};

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "dimension", rename_all = "snake_case")]
pub enum AccessDecision {
    /// The record does not opt into session limiting
    NotApplicable,
    /// Every enforced dimension matches the stored values
    Permitted,
    /// The request diverges on the given dimension
    Rejected(Dimension),
}

impl AccessDecision {
    pub fn is_rejected(&self) -> bool {
        matches!(self, AccessDecision::Rejected(_))
    }

    pub fn rejected_dimension(&self) -> Option<Dimension> {
        match self {
            AccessDecision::Rejected(dimension) => Some(*dimension),
            _ => None,
        }
    }
}

/// Evaluator scoped to one record and one authentication event
///
/// The policy is copied in at construction, so a concurrent policy change
/// never affects an evaluation already in progress.
pub struct SessionLimitEvaluator<'a, R: AccountRecord + ?Sized> {
    record: &'a R,
    policy: SessionPolicy,
    observed: ObservedContext,
}

impl<'a, R: AccountRecord + ?Sized> SessionLimitEvaluator<'a, R> {
    pub fn new(record: &'a R, policy: SessionPolicy) -> Self {
        Self {
            record,
            policy,
            observed: ObservedContext::default(),
        }
    }

    /// Create an evaluator using the current snapshot of a shared policy
    pub fn from_handle(record: &'a R, handle: &PolicyHandle) -> Self {
        Self::new(record, handle.snapshot())
    }

    pub fn with_observed(mut self, observed: ObservedContext) -> Self {
        self.observed = observed;
        self
    }

    pub fn set_unique_session_id(&mut self, unique_session_id: Option<String>) {
        self.observed.unique_session_id = unique_session_id;
    }

    pub fn set_user_agent(&mut self, user_agent: Option<String>) {
        self.observed.user_agent = user_agent;
    }

    pub fn set_remote_ip(&mut self, remote_ip: Option<String>) {
        self.observed.remote_ip = remote_ip;
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn observed(&self) -> &ObservedContext {
        &self.observed
    }

    /// Run `action` when a sign-in should refresh the stored fingerprint
    ///
    /// Returns `Ok(None)` without running the action for records that do not
    /// opt in. For opted-in records the field integrity check runs first and
    /// its error is returned before the action can run.
    pub fn evaluate_sign_in<F, T>(&self, action: F) -> SessionLimitResult<Option<T>>
    where
        F: FnOnce() -> T,
    {
        if !opts_in(self.record) {
            debug!("Record does not use session limiting, skipping sign-in update");
            return Ok(None);
        }

        integrity::check(self.record, &self.policy)?;

        Ok(Some(action()))
    }

    /// Decide whether the current request violates the session policy
    pub fn check_unauthorized_access(&self) -> SessionLimitResult<AccessDecision> {
        if !opts_in(self.record) {
            debug!("Record does not use session limiting, skipping access check");
            return Ok(AccessDecision::NotApplicable);
        }

        integrity::check(self.record, &self.policy)?;

        let record = self.record;
        let observed = &self.observed;

        let unique_id = Restriction::new(Dimension::UniqueId, self.policy.on_unique_id, || {
            record
                .unique_session_id()
                .differs_from(observed.unique_session_id.as_deref())
        });
        let ip = Restriction::new(Dimension::Ip, self.policy.on_ip, || {
            record
                .current_sign_in_ip()
                .differs_from(observed.remote_ip.as_deref())
        });
        let user_agent = Restriction::new(Dimension::UserAgent, self.policy.on_user_agent, || {
            record
                .current_user_agent()
                .differs_from(observed.user_agent.as_deref())
        });

        let rejected = unique_id
            .evaluate()
            .or_else(|| ip.evaluate())
            .or_else(|| user_agent.evaluate());

        match rejected {
            Some(dimension) => {
                info!("Session rejected: {} differs from the stored value", dimension);
                Ok(AccessDecision::Rejected(dimension))
            }
            None => Ok(AccessDecision::Permitted),
        }
    }

    /// Run `action` when the current request must be treated as unauthorized
    ///
    /// Any single enforced dimension that differs from the stored value is
    /// enough to run the action.
    pub fn evaluate_unauthorized_access<F, T>(&self, action: F) -> SessionLimitResult<Option<T>>
    where
        F: FnOnce() -> T,
    {
        if self.check_unauthorized_access()?.is_rejected() {
            Ok(Some(action()))
        } else {
            Ok(None)
        }
    }
}

/// Evaluate a sign-in and persist a freshly generated fingerprint on the record
///
/// The record opts in by implementing [`SessionLimitable`], so the sign-in
/// always applies once the integrity check passes. Returns the new
/// fingerprint so the caller can hand it to the client.
pub fn record_sign_in<R: SessionLimitable + ?Sized>(
    record: &mut R,
    policy: SessionPolicy,
) -> SessionLimitResult<Option<SessionFingerprint>> {
    let view = record.limitable_view();
    let fingerprint =
        SessionLimitEvaluator::new(&view, policy).evaluate_sign_in(SessionFingerprint::generate)?;

    if let Some(fingerprint) = &fingerprint {
        record.update_unique_session_id(fingerprint);
        debug!("Stored new session fingerprint");
    }

    Ok(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionLimitError;
    use crate::models::{Capability, CapabilitySet, SessionField, StoredField};
    use std::cell::Cell;

    /// Opted-in record with every column
    #[derive(Default)]
    struct User {
        unique_session_id: Option<String>,
        current_sign_in_ip: Option<String>,
        current_user_agent: Option<String>,
    }

    impl AccountRecord for User {
        fn capabilities(&self) -> CapabilitySet {
            CapabilitySet::empty().with(Capability::UpdateSessionFingerprint)
        }

        fn unique_session_id(&self) -> StoredField<'_> {
            self.unique_session_id.as_deref().into()
        }

        fn current_sign_in_ip(&self) -> StoredField<'_> {
            self.current_sign_in_ip.as_deref().into()
        }

        fn current_user_agent(&self) -> StoredField<'_> {
            self.current_user_agent.as_deref().into()
        }
    }

    impl SessionLimitable for User {
        fn update_unique_session_id(&mut self, fingerprint: &SessionFingerprint) {
            self.unique_session_id = Some(fingerprint.to_string());
        }
    }

    /// Opted-in record that only has the unique session id column
    struct Minimal(&'static str);

    impl AccountRecord for Minimal {
        fn capabilities(&self) -> CapabilitySet {
            CapabilitySet::empty().with(Capability::UpdateSessionFingerprint)
        }

        fn unique_session_id(&self) -> StoredField<'_> {
            StoredField::from(self.0)
        }
    }

    fn user() -> User {
        User {
            unique_session_id: Some("abc".to_string()),
            current_sign_in_ip: Some("10.0.0.1".to_string()),
            current_user_agent: Some("Mozilla/5.0".to_string()),
        }
    }

    fn matching_context() -> ObservedContext {
        ObservedContext::new()
            .with_unique_session_id("abc")
            .with_remote_ip("10.0.0.1")
            .with_user_agent("Mozilla/5.0")
    }

    #[test]
    fn test_sign_in_returns_action_output() {
        let record = user();
        let evaluator = SessionLimitEvaluator::new(&record, SessionPolicy::default());

        let result = evaluator.evaluate_sign_in(|| 42).unwrap();
        assert_eq!(result, Some(42));
    }

    #[test]
    fn test_sign_in_ignores_observed_values() {
        let record = user();
        let evaluator = SessionLimitEvaluator::new(&record, SessionPolicy::strict())
            .with_observed(ObservedContext::new().with_unique_session_id("other"));

        let calls = Cell::new(0);
        evaluator
            .evaluate_sign_in(|| calls.set(calls.get() + 1))
            .unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_matching_context_is_permitted() {
        let record = user();
        let evaluator = SessionLimitEvaluator::new(&record, SessionPolicy::strict())
            .with_observed(matching_context());

        assert_eq!(
            evaluator.check_unauthorized_access().unwrap(),
            AccessDecision::Permitted
        );
    }

    #[test]
    fn test_each_dimension_compares_its_own_field() {
        let record = user();

        let evaluator = SessionLimitEvaluator::new(&record, SessionPolicy::strict())
            .with_observed(matching_context().with_remote_ip("192.168.1.1"));
        assert_eq!(
            evaluator.check_unauthorized_access().unwrap(),
            AccessDecision::Rejected(Dimension::Ip)
        );

        let evaluator = SessionLimitEvaluator::new(&record, SessionPolicy::strict())
            .with_observed(matching_context().with_user_agent("curl/8.0"));
        assert_eq!(
            evaluator.check_unauthorized_access().unwrap(),
            AccessDecision::Rejected(Dimension::UserAgent)
        );
    }

    #[test]
    fn test_first_diverging_dimension_is_reported() {
        let record = user();
        let evaluator = SessionLimitEvaluator::new(&record, SessionPolicy::strict()).with_observed(
            ObservedContext::new()
                .with_unique_session_id("xyz")
                .with_remote_ip("192.168.1.1")
                .with_user_agent("curl/8.0"),
        );

        let decision = evaluator.check_unauthorized_access().unwrap();
        assert_eq!(decision.rejected_dimension(), Some(Dimension::UniqueId));
    }

    #[test]
    fn test_disabled_dimension_is_ignored() {
        let record = user();
        let evaluator = SessionLimitEvaluator::new(&record, SessionPolicy::default())
            .with_observed(
                matching_context()
                    .with_remote_ip("192.168.1.1")
                    .with_user_agent("curl/8.0"),
            );

        assert_eq!(
            evaluator.check_unauthorized_access().unwrap(),
            AccessDecision::Permitted
        );
    }

    #[test]
    fn test_missing_observed_value_is_a_mismatch() {
        let record = user();
        let evaluator = SessionLimitEvaluator::new(&record, SessionPolicy::default());

        assert!(evaluator.check_unauthorized_access().unwrap().is_rejected());
    }

    #[test]
    fn test_setters_update_observed_context() {
        let record = user();
        let mut evaluator = SessionLimitEvaluator::new(&record, SessionPolicy::strict());
        evaluator.set_unique_session_id(Some("abc".to_string()));
        evaluator.set_remote_ip(Some("10.0.0.1".to_string()));
        evaluator.set_user_agent(Some("Mozilla/5.0".to_string()));

        assert_eq!(evaluator.observed(), &matching_context());
        assert_eq!(
            evaluator.check_unauthorized_access().unwrap(),
            AccessDecision::Permitted
        );
    }

    #[test]
    fn test_enabling_ip_without_column_is_misconfiguration() {
        let record = Minimal("abc");
        let policy = SessionPolicy::default().with(Dimension::Ip, true);
        let evaluator = SessionLimitEvaluator::new(&record, policy)
            .with_observed(ObservedContext::new().with_unique_session_id("abc"));

        let called = Cell::new(false);
        let err = evaluator
            .evaluate_unauthorized_access(|| called.set(true))
            .unwrap_err();
        assert_eq!(
            err,
            SessionLimitError::FieldMisconfiguration(SessionField::CurrentSignInIp)
        );
        assert!(!called.get());

        let err = evaluator.evaluate_sign_in(|| called.set(true)).unwrap_err();
        assert_eq!(err.field(), SessionField::CurrentSignInIp);
        assert!(!called.get());
    }

    #[test]
    fn test_from_handle_takes_snapshot() {
        let record = Minimal("abc");
        let handle = PolicyHandle::new(SessionPolicy::default());
        let evaluator = SessionLimitEvaluator::from_handle(&record, &handle)
            .with_observed(ObservedContext::new().with_unique_session_id("abc"));

        // Switching on a dimension the record cannot support after construction
        // must not affect this evaluator
        handle.replace(SessionPolicy::strict());

        assert_eq!(evaluator.policy(), &SessionPolicy::default());
        assert_eq!(
            evaluator.check_unauthorized_access().unwrap(),
            AccessDecision::Permitted
        );
    }

    #[test]
    fn test_record_sign_in_persists_fingerprint() {
        let mut record = user();
        let fingerprint = record_sign_in(&mut record, SessionPolicy::default())
            .unwrap()
            .unwrap();

        assert_eq!(
            record.unique_session_id.as_deref(),
            Some(fingerprint.as_str())
        );
        assert_ne!(fingerprint.as_str(), "abc");

        // The old fingerprint is no longer accepted
        let evaluator = SessionLimitEvaluator::new(&record, SessionPolicy::default())
            .with_observed(ObservedContext::new().with_unique_session_id("abc"));
        assert!(evaluator.check_unauthorized_access().unwrap().is_rejected());
    }

    #[test]
    fn test_decision_serialization() {
        let json = serde_json::to_value(AccessDecision::Rejected(Dimension::Ip)).unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["dimension"], "ip");

        let json = serde_json::to_value(AccessDecision::Permitted).unwrap();
        assert_eq!(json["outcome"], "permitted");
    }
}
