//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions over the triggering event. A guarded
//! transition whose guard rejects the event behaves exactly like a missing
//! transition: the event is reported back to the caller as not handled.

use super::event::Event;
use std::fmt;

/// Pure predicate that decides whether an event-triggered transition may
/// fire.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{Guard, Signal};
///
/// let only_retries = Guard::new(|event| event.name().starts_with("Retry"));
///
/// assert!(only_retries.check(&Signal("RetryUpload")));
/// assert!(!only_retries.check(&Signal("Cancel")));
/// ```
pub struct Guard {
    predicate: Box<dyn Fn(&dyn Event) -> bool + Send + Sync>,
}

impl Guard {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and free of side effects; it may
    /// be evaluated on every dispatch.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&dyn Event) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Check whether the guard admits this event.
    pub fn check(&self, event: &dyn Event) -> bool {
        (self.predicate)(event)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
