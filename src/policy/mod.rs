// Session limiting policy
// Flags selecting which dimensions of session identity are enforced

pub mod handle;
pub mod types;

pub use handle::PolicyHandle;
pub use types::{Dimension, SessionPolicy};
