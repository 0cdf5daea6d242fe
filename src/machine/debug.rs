//! Introspection and the test-only state override.
//!
//! Everything here is read-only navigation over the composite tree, except
//! [`Machine::force_state`]: a deliberate backdoor around the normal
//! transition invariants, kept separate from dispatch so its scope stays
//! obvious.

use super::Machine;
use std::sync::Arc;
use thiserror::Error;

/// Errors from [`Machine::force_state`].
#[derive(Debug, Error)]
pub enum OverrideError {
    #[error("Machine '{machine}' has no state named '{state}'")]
    UnknownState { machine: String, state: String },
}

impl Machine {
    /// The live regions of the current composite state, in declaration
    /// order. Empty whenever the current state is not composite.
    pub fn regions(&self) -> &[Machine] {
        &self.regions
    }

    /// Look up a live region by its declared name.
    pub fn region(&self, name: &str) -> Option<&Machine> {
        self.regions.iter().find(|r| r.chart.name() == name)
    }

    /// Mutable access to a live region, for nested overrides.
    pub fn region_mut(&mut self, name: &str) -> Option<&mut Machine> {
        self.regions.iter_mut().find(|r| r.chart.name() == name)
    }

    /// Replace the current-state pointer without running any transition
    /// logic.
    ///
    /// No notification fires, no history is recorded, and no completion
    /// chain runs. Forcing into a composite state still seeds fresh
    /// regions at their declared initial states (equally silently), so the
    /// tree stays well formed for subsequent dispatch. Intended purely for
    /// seeding test fixtures; production callers should drive the machine
    /// through [`trigger`](Machine::trigger).
    pub fn force_state(&mut self, name: &str) -> Result<(), OverrideError> {
        let Some(id) = self.chart.state_named(name) else {
            return Err(OverrideError::UnknownState {
                machine: self.path.clone(),
                state: name.to_owned(),
            });
        };
        self.regions.clear();
        self.current = id;
        self.seed_regions();
        Ok(())
    }

    /// Region instantiation for the forced path: raw initial states, no
    /// completion chains, no notifications.
    fn seed_regions(&mut self) {
        let chart = Arc::clone(&self.chart);
        let node = chart.state(self.current);
        for region in node.regions() {
            let path = format!("{}/{}/{}", self.path, node.name(), region.name());
            let mut seeded = Machine {
                current: region.initial(),
                path,
                chart: Arc::clone(region),
                regions: Vec::new(),
                observers: self.observers.clone(),
                history: crate::core::StateHistory::new(),
            };
            seeded.seed_regions();
            self.regions.push(seeded);
        }
    }
}
