// Record field integrity guard

use tracing::warn;

use crate::error::{SessionLimitError, SessionLimitResult};
use crate::models::AccountRecord;
use crate::policy::SessionPolicy;

/// Verify the record exposes the stored column of every enforced dimension
///
/// Dimensions are checked in evaluation order and the first missing column
/// is reported.
pub fn check<R: AccountRecord + ?Sized>(record: &R, policy: &SessionPolicy) -> SessionLimitResult<()> {
    for dimension in policy.enforced_dimensions() {
        let field = dimension.stored_field();
        if !record.stored_field(field).is_present() {
            warn!(
                "Session limiting on {} is enabled but the record has no {} column",
                dimension, field
            );
            return Err(SessionLimitError::FieldMisconfiguration(field));
        }
    }
    Ok(())
}
