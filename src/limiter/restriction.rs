// Per-dimension restriction predicates

use crate::policy::Dimension;

/// Run `compare` only when the dimension is enabled
///
/// A disabled dimension is never restricted and its comparison is not
/// invoked at all.
pub fn restricted<F>(enabled: bool, compare: F) -> bool
where
    F: FnOnce() -> bool,
{
    enabled && compare()
}

/// Restriction predicate bound to one dimension
pub struct Restriction<F>
where
    F: FnOnce() -> bool,
{
    dimension: Dimension,
    enabled: bool,
    compare: F,
}

impl<F> Restriction<F>
where
    F: FnOnce() -> bool,
{
    pub fn new(dimension: Dimension, enabled: bool, compare: F) -> Self {
        Self {
            dimension,
            enabled,
            compare,
        }
    }

    /// Returns the dimension when the observed value diverges from the stored one
    pub fn evaluate(self) -> Option<Dimension> {
        if restricted(self.enabled, self.compare) {
            Some(self.dimension)
        } else {
            None
        }
    }
}
