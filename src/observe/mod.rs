//! Change notifications for external observers.
//!
//! Every transition a machine or any of its nested regions takes is
//! reported as a [`StateChange`] to the subscribed observers, one record
//! per hop, in the order the hops occurred. The record carries normalized
//! state identifiers that are stable across runs, so an external
//! visualizer can use them directly as graph-node keys.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Observer of machine transitions.
///
/// The hook fires while dispatch is still in progress; implementations
/// must not call back into the machine that produced the change.
pub trait StateObserver: Send + Sync {
    /// Called once per (old state, new state) hop.
    fn state_changed(&self, change: &StateChange);
}

/// Notification record for one transition.
///
/// Serializes to the wire shape consumed by the debug adapter:
/// `{ machineName, oldStateName, oldStateId, newStateName, newStateId }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChange {
    /// Identity of the machine that moved: the root machine name plus the
    /// path through nested regions, e.g. `Player/Loading/Audio`.
    pub machine_name: String,
    /// Name of the state that was left.
    pub old_state_name: String,
    /// Normalized identifier of the old state.
    pub old_state_id: String,
    /// Name of the state that was entered.
    pub new_state_name: String,
    /// Normalized identifier of the new state.
    pub new_state_id: String,
}

impl StateChange {
    /// Build the record for one hop of `machine`.
    pub fn new(machine: &str, old_state: &str, new_state: &str) -> Self {
        StateChange {
            machine_name: machine.to_owned(),
            old_state_name: old_state.to_owned(),
            old_state_id: state_id(machine, old_state),
            new_state_name: new_state.to_owned(),
            new_state_id: state_id(machine, new_state),
        }
    }
}

/// Derive the normalized identifier of a state.
///
/// The id is a readable slug of the qualified name followed by a short
/// UUIDv5 digest of the raw `(machine, state)` pair. Deterministic across
/// runs; the digest keeps names that normalize to the same slug apart.
pub fn state_id(machine: &str, state: &str) -> String {
    // 0x1f keeps ("a", "bc") and ("ab", "c") from hashing alike
    let digest = Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!("{machine}\u{1f}{state}").as_bytes(),
    );
    let digest = digest.simple().to_string();
    format!("{}-{}-{}", slug(machine), slug(state), &digest[..8])
}

fn slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut gap = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if gap && !out.is_empty() {
                out.push('-');
            }
            gap = false;
            out.push(c.to_ascii_lowercase());
        } else {
            gap = true;
        }
    }
    out
}
