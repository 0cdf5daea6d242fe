//! Transition history tracking.
//!
//! Every machine (including each nested region) keeps an ordered, in-memory
//! record of the transitions it has taken. History is immutable - `record`
//! returns a new history with the transition appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single transition taken by a machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Name of the state that was left.
    pub from: String,
    /// Name of the state that was entered.
    pub to: String,
    /// Tag of the triggering event, or `None` for a completion transition.
    pub event: Option<String>,
    /// When the transition occurred.
    pub at: DateTime<Utc>,
}

/// Ordered history of the transitions a machine has taken.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{StateHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let history = StateHistory::new();
/// let history = history.record(TransitionRecord {
///     from: "Init".to_owned(),
///     to: "Working".to_owned(),
///     event: Some("Start".to_owned()),
///     at: Utc::now(),
/// });
///
/// assert_eq!(history.path(), vec!["Init", "Working"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<TransitionRecord>,
}

impl StateHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, record: TransitionRecord) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(record);
        Self { transitions }
    }

    /// All recorded transitions, oldest first.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// The path of state names traversed: the starting state followed by
    /// the target of every transition. Empty if nothing was recorded.
    pub fn path(&self) -> Vec<&str> {
        let Some(first) = self.transitions.first() else {
            return Vec::new();
        };
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        path.push(first.from.as_str());
        path.extend(self.transitions.iter().map(|t| t.to.as_str()));
        path
    }

    /// Wall-clock span between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.first()?;
        let last = self.transitions.last()?;
        (last.at - first.at).to_std().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hop(from: &str, to: &str, event: Option<&str>) -> TransitionRecord {
        TransitionRecord {
            from: from.to_owned(),
            to: to.to_owned(),
            event: event.map(str::to_owned),
            at: Utc::now(),
        }
    }

    #[test]
    fn history_preserves_order() {
        let history = StateHistory::new()
            .record(hop("A", "B", Some("Next")))
            .record(hop("B", "C", None));

        assert_eq!(history.path(), vec!["A", "B", "C"]);
        assert_eq!(history.transitions()[1].event, None);
    }

    #[test]
    fn record_does_not_mutate_the_original() {
        let original = StateHistory::new();
        let extended = original.record(hop("A", "B", None));

        assert!(original.transitions().is_empty());
        assert_eq!(extended.transitions().len(), 1);
    }

    #[test]
    fn empty_history_has_empty_path() {
        let history = StateHistory::new();

        assert!(history.path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn history_round_trips_through_json() {
        let history = StateHistory::new().record(hop("A", "B", Some("Go")));

        let json = serde_json::to_string(&history).unwrap();
        let back: StateHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(back.transitions(), history.transitions());
    }
}
