// Session limiting core
// Capability detection, field integrity checks, per-dimension restrictions
// and the evaluator that ties them together

pub mod capability;
pub mod evaluator;
pub mod integrity;
pub mod restriction;

pub use capability::opts_in;
pub use evaluator::{record_sign_in, AccessDecision, SessionLimitEvaluator};
pub use integrity::check;
pub use restriction::{restricted, Restriction};
