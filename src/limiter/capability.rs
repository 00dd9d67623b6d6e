// Session limiting opt-in detection

use crate::models::{AccountRecord, Capability};

/// Whether the record opts into session limiting
///
/// A record opts in by advertising the update-session-fingerprint
/// capability; records without it are never limited.
pub fn opts_in<R: AccountRecord + ?Sized>(record: &R) -> bool {
    record
        .capabilities()
        .contains(Capability::UpdateSessionFingerprint)
}
