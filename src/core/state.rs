//! The state graph: nodes, transitions, and the immutable chart.
//!
//! A [`Chart`] is the validated, immutable description of one machine:
//! every state it can occupy, each state's outgoing transitions, and the
//! initial state. Charts are built with
//! [`ChartBuilder`](crate::builder::ChartBuilder) and shared by reference;
//! a running [`Machine`](crate::machine::Machine) never mutates them.

use super::event::Event;
use super::guard::Guard;
use std::sync::Arc;

/// Index of a state within its owning [`Chart`].
///
/// Ids are produced by the chart that owns the state and are only
/// meaningful relative to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateId(pub(crate) usize);

/// What kind of node a state is.
///
/// The variant set is closed on purpose: dispatch pattern-matches
/// exhaustively instead of dynamically downcasting.
#[derive(Debug)]
pub enum StateKind {
    /// Ordinary node; dispatch consults its outgoing transitions.
    Simple,
    /// Terminal node. Entering it ends the owning machine or region, which
    /// from then on reports every event as not handled.
    Final,
    /// Node backed by one or more independently progressing regions, each
    /// described by its own chart.
    Composite {
        /// Region charts, in declaration order.
        regions: Vec<Arc<Chart>>,
    },
}

/// A single outgoing edge of a state.
///
/// An edge either waits for an event (`event` is the tag it matches) or is
/// a *completion transition* (`event` is `None`) taken automatically when
/// the state is entered.
#[derive(Debug)]
pub struct Transition {
    pub(crate) event: Option<String>,
    pub(crate) target: StateId,
    pub(crate) guard: Option<Guard>,
}

impl Transition {
    /// The event tag this transition matches, or `None` for a completion
    /// transition.
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    /// The state this transition leads to.
    pub fn target(&self) -> StateId {
        self.target
    }

    /// Whether this is a completion transition.
    pub fn is_completion(&self) -> bool {
        self.event.is_none()
    }

    pub(crate) fn allows(&self, event: &dyn Event) -> bool {
        self.guard.as_ref().is_none_or(|g| g.check(event))
    }
}

/// Named node in a chart together with its outgoing transitions.
///
/// Transitions are fixed at construction. Lookup scans only this node's
/// own edges, so its cost is bounded by the node's out-degree, never by
/// the size of the whole chart.
#[derive(Debug)]
pub struct StateNode {
    pub(crate) name: String,
    pub(crate) kind: StateKind,
    pub(crate) transitions: Vec<Transition>,
}

impl StateNode {
    /// The state's name, unique within its chart.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's kind.
    pub fn kind(&self) -> &StateKind {
        &self.kind
    }

    /// Whether entering this state ends the owning machine or region.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, StateKind::Final)
    }

    /// Whether this state is backed by regions.
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, StateKind::Composite { .. })
    }

    /// Look up the transition keyed by `event`, if any. Exact tag match
    /// only.
    pub fn transition_on(&self, event: &str) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|t| t.event.as_deref() == Some(event))
    }

    /// The completion transition taken automatically on entry, if declared.
    pub fn completion(&self) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.event.is_none())
    }

    /// All outgoing transitions, in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Region charts of a composite state; empty for other kinds.
    pub fn regions(&self) -> &[Arc<Chart>] {
        match &self.kind {
            StateKind::Composite { regions } => regions,
            _ => &[],
        }
    }
}

/// Immutable, validated description of one machine.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::ChartBuilder;
///
/// let chart = ChartBuilder::new("Door")
///     .state("Closed", |s| s.on("Open", "Opened"))
///     .state("Opened", |s| s.on("Close", "Closed"))
///     .initial("Closed")
///     .build()
///     .unwrap();
///
/// let closed = chart.state_named("Closed").unwrap();
/// assert!(chart.state(closed).transition_on("Open").is_some());
/// assert!(chart.state(closed).transition_on("Lock").is_none());
/// ```
#[derive(Debug)]
pub struct Chart {
    pub(crate) name: String,
    pub(crate) states: Vec<StateNode>,
    pub(crate) initial: StateId,
}

impl Chart {
    /// The machine name this chart describes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared initial state.
    pub fn initial(&self) -> StateId {
        self.initial
    }

    /// Resolve a state id produced by this chart.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different chart and is out of range.
    pub fn state(&self, id: StateId) -> &StateNode {
        &self.states[id.0]
    }

    /// Look up a state id by name.
    pub fn state_named(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .position(|s| s.name == name)
            .map(StateId)
    }

    /// Iterate all states in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &StateNode> {
        self.states.iter()
    }

    /// Number of states in this chart.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::ChartBuilder;
    use crate::core::Signal;

    fn door() -> crate::core::Chart {
        ChartBuilder::new("Door")
            .state("Closed", |s| s.on("Open", "Opening"))
            .state("Opening", |s| s.on_completion("Opened"))
            .state("Opened", |s| s.on("Close", "Closed"))
            .final_state("Removed")
            .initial("Closed")
            .build()
            .unwrap()
    }

    #[test]
    fn lookup_is_exact_tag_match() {
        let chart = door();
        let closed = chart.state(chart.state_named("Closed").unwrap());

        assert!(closed.transition_on("Open").is_some());
        assert!(closed.transition_on("open").is_none());
        assert!(closed.transition_on("OpenWide").is_none());
    }

    #[test]
    fn completion_is_separate_from_event_lookup() {
        let chart = door();
        let opening = chart.state(chart.state_named("Opening").unwrap());

        assert!(opening.completion().is_some());
        assert!(opening.transition_on("Opened").is_none());
    }

    #[test]
    fn final_states_are_terminal_and_edgeless() {
        let chart = door();
        let removed = chart.state(chart.state_named("Removed").unwrap());

        assert!(removed.is_terminal());
        assert!(removed.transitions().is_empty());
        assert!(removed.completion().is_none());
    }

    #[test]
    fn unguarded_transitions_allow_any_event() {
        let chart = door();
        let closed = chart.state(chart.state_named("Closed").unwrap());
        let transition = closed.transition_on("Open").unwrap();

        assert!(transition.allows(&Signal("Open")));
    }

    #[test]
    fn state_named_resolves_round_trip() {
        let chart = door();

        for state in chart.states() {
            let id = chart.state_named(state.name()).unwrap();
            assert_eq!(chart.state(id).name(), state.name());
        }
        assert!(chart.state_named("Basement").is_none());
    }

    #[test]
    fn regions_is_empty_for_simple_states() {
        let chart = door();
        let closed = chart.state(chart.state_named("Closed").unwrap());

        assert!(closed.regions().is_empty());
        assert!(!closed.is_composite());
    }
}
