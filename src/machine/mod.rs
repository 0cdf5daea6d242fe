//! Running machine instances and the dispatch algorithm.
//!
//! A [`Machine`] pairs an immutable [`Chart`] with a current-state pointer.
//! `trigger` is synchronous and cooperative: the entire completion chain,
//! including forwarding into regions, finishes before it returns. Regions
//! are structural, not threads - they are dispatched in declaration order,
//! each running to completion before the next one sees the event. Callers
//! that dispatch from multiple threads must serialize externally.

mod debug;

pub use debug::OverrideError;

use crate::core::{Chart, Event, StateHistory, StateId, StateNode, TransitionRecord};
use crate::observe::{StateChange, StateObserver};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A running state machine.
///
/// Machines move only through [`trigger`](Machine::trigger) (or the
/// test-only [`force_state`](Machine::force_state) override). Every hop is
/// reported to subscribed observers, including each intermediate hop of a
/// completion chain.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::ChartBuilder;
/// use statecraft::core::Signal;
/// use statecraft::machine::Machine;
///
/// let chart = ChartBuilder::new("Door")
///     .state("Closed", |s| s.on("Open", "Opening"))
///     .state("Opening", |s| s.on_completion("Open"))
///     .state("Open", |s| s.on("Close", "Closed"))
///     .initial("Closed")
///     .build()
///     .unwrap();
///
/// let mut door = Machine::new(chart);
/// assert!(door.trigger(&Signal("Open")));
/// assert_eq!(door.current_state().name(), "Open");
/// assert!(!door.trigger(&Signal("Open")));
/// ```
pub struct Machine {
    path: String,
    chart: Arc<Chart>,
    current: StateId,
    /// Live regions while the current state is composite; empty otherwise.
    regions: Vec<Machine>,
    observers: Vec<Arc<dyn StateObserver>>,
    history: StateHistory,
}

impl Machine {
    /// Start a machine at the chart's initial state.
    ///
    /// The initial state's completion chain runs immediately, so the
    /// machine may settle several hops past the declared initial state
    /// before this returns.
    pub fn new(chart: impl Into<Arc<Chart>>) -> Self {
        Self::with_observers(chart, Vec::new())
    }

    /// Start a machine with observers already attached.
    ///
    /// Unlike [`subscribe`](Machine::subscribe) after the fact, observers
    /// passed here also see the hops of the initial completion chain.
    pub fn with_observers(
        chart: impl Into<Arc<Chart>>,
        observers: Vec<Arc<dyn StateObserver>>,
    ) -> Self {
        let chart = chart.into();
        let path = chart.name().to_owned();
        Self::start(chart, path, observers)
    }

    fn start(chart: Arc<Chart>, path: String, observers: Vec<Arc<dyn StateObserver>>) -> Self {
        let mut machine = Machine {
            current: chart.initial(),
            path,
            chart,
            regions: Vec::new(),
            observers,
            history: StateHistory::new(),
        };
        machine.enter_regions();
        machine.run_to_completion();
        machine
    }

    /// Dispatch one event. Returns whether anything handled it.
    ///
    /// Unmatched events are ignored silently: the state does not change
    /// and the caller gets `false` back. A machine resting in a final
    /// state handles nothing.
    pub fn trigger(&mut self, event: &dyn Event) -> bool {
        let node = self.chart.state(self.current);
        if node.is_terminal() {
            return false;
        }
        if node.is_composite() {
            let mut handled = false;
            // every region sees the event; no short-circuit
            for region in &mut self.regions {
                handled |= region.trigger(event);
            }
            if handled {
                // a region may just have finished the AND-join
                self.run_to_completion();
            } else {
                trace!(
                    machine = %self.path,
                    event = event.name(),
                    "event not handled by any region"
                );
            }
            return handled;
        }
        self.dispatch_leaf(event)
    }

    /// Attach an observer, propagating into every live region.
    ///
    /// Regions created later inherit all observers attached to their
    /// owning machine at creation time.
    pub fn subscribe(&mut self, observer: Arc<dyn StateObserver>) {
        for region in &mut self.regions {
            region.subscribe(Arc::clone(&observer));
        }
        self.observers.push(observer);
    }

    /// The state the machine currently occupies.
    pub fn current_state(&self) -> &StateNode {
        self.chart.state(self.current)
    }

    /// Identity of this machine: the root machine name plus the path
    /// through nested regions, unique across the composite tree.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The chart this machine runs against.
    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    /// Whether the machine has reached a final state.
    pub fn is_finished(&self) -> bool {
        self.current_state().is_terminal()
    }

    /// The transitions this machine has taken, oldest first. Regions keep
    /// their own histories.
    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    fn dispatch_leaf(&mut self, event: &dyn Event) -> bool {
        let chart = Arc::clone(&self.chart);
        let node = chart.state(self.current);
        let Some(transition) = node.transition_on(event.name()) else {
            trace!(
                machine = %self.path,
                state = node.name(),
                event = event.name(),
                "event ignored"
            );
            return false;
        };
        if !transition.allows(event) {
            trace!(
                machine = %self.path,
                state = node.name(),
                event = event.name(),
                "guard rejected event"
            );
            return false;
        }
        self.perform(transition.target(), Some(event.name()));
        self.run_to_completion();
        true
    }

    /// Take one transition: exit the current state, enter the target,
    /// record and notify.
    fn perform(&mut self, target: StateId, event: Option<&str>) {
        let old = self.current;
        // leaving a composite discards its regions outright
        self.regions.clear();
        self.current = target;

        let chart = Arc::clone(&self.chart);
        let from = chart.state(old).name();
        let to = chart.state(target).name();
        debug!(
            machine = %self.path,
            %from,
            %to,
            event = event.unwrap_or("(completion)"),
            "transition"
        );

        self.history = self.history.record(TransitionRecord {
            from: from.to_owned(),
            to: to.to_owned(),
            event: event.map(str::to_owned),
            at: Utc::now(),
        });
        self.notify(from, to);
        self.enter_regions();
    }

    /// Instantiate fresh regions when the current state is composite.
    ///
    /// Each region runs its own completion chain from its declared initial
    /// state before the next region starts.
    fn enter_regions(&mut self) {
        let chart = Arc::clone(&self.chart);
        let node = chart.state(self.current);
        for region in node.regions() {
            let path = format!("{}/{}/{}", self.path, node.name(), region.name());
            self.regions
                .push(Machine::start(Arc::clone(region), path, self.observers.clone()));
        }
    }

    /// Follow completion transitions until the machine settles.
    ///
    /// The builder rejects completion cycles, so a chain visits each state
    /// at most once. A composite state joins the chain only once all of
    /// its regions have finished.
    fn run_to_completion(&mut self) {
        let mut hops = 0usize;
        loop {
            let chart = Arc::clone(&self.chart);
            let node = chart.state(self.current);
            if node.is_composite() && !self.regions_done() {
                break;
            }
            let Some(transition) = node.completion() else {
                break;
            };
            hops += 1;
            debug_assert!(hops <= chart.state_count(), "completion chain outran the state count");
            self.perform(transition.target(), None);
        }
    }

    /// AND-join over regions: all of them have reached a final state.
    fn regions_done(&self) -> bool {
        !self.regions.is_empty() && self.regions.iter().all(Machine::is_finished)
    }

    fn notify(&self, from: &str, to: &str) {
        if self.observers.is_empty() {
            return;
        }
        let change = StateChange::new(&self.path, from, to);
        for observer in &self.observers {
            observer.state_changed(&change);
        }
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("path", &self.path)
            .field("current", &self.current_state().name())
            .field("regions", &self.regions)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::recorder::Recorder;
    use super::*;
    use crate::builder::ChartBuilder;
    use crate::core::Signal;

    fn workflow() -> Chart {
        // Init --Next--> Preparing --(completion)--> Working --(completion)--> Final
        ChartBuilder::new("Workflow")
            .state("Init", |s| s.on("Next", "Preparing"))
            .state("Preparing", |s| s.on_completion("Working"))
            .state("Working", |s| s.on_completion("Final"))
            .final_state("Final")
            .initial("Init")
            .build()
            .unwrap()
    }

    #[test]
    fn unmatched_event_is_ignored() {
        let mut machine = Machine::new(workflow());

        assert!(!machine.trigger(&Signal("Bogus")));
        assert_eq!(machine.current_state().name(), "Init");
        assert!(machine.history().transitions().is_empty());
    }

    #[test]
    fn one_trigger_drives_the_whole_completion_chain() {
        let recorder = Arc::new(Recorder::new());
        let mut machine = Machine::new(workflow());
        machine.subscribe(recorder.clone());

        assert!(machine.trigger(&Signal("Next")));

        assert_eq!(machine.current_state().name(), "Final");
        assert!(machine.is_finished());
        assert_eq!(
            recorder.hops(),
            vec![
                ("Workflow".into(), "Init".into(), "Preparing".into()),
                ("Workflow".into(), "Preparing".into(), "Working".into()),
                ("Workflow".into(), "Working".into(), "Final".into()),
            ]
        );
    }

    #[test]
    fn finished_machine_handles_nothing() {
        let mut machine = Machine::new(workflow());
        machine.trigger(&Signal("Next"));
        assert!(machine.is_finished());

        assert!(!machine.trigger(&Signal("Next")));
        assert_eq!(machine.current_state().name(), "Final");
    }

    #[test]
    fn settled_machine_does_not_move_on_its_own() {
        let chart = ChartBuilder::new("M")
            .state("A", |s| s.on("Go", "B"))
            .state("B", |s| s.on("Go", "C"))
            .state("C", |s| s)
            .initial("A")
            .build()
            .unwrap();
        let mut machine = Machine::new(chart);

        assert!(machine.trigger(&Signal("Go")));
        assert_eq!(machine.current_state().name(), "B");
        // same event again moves exactly one more step, no further
        assert!(machine.trigger(&Signal("Go")));
        assert_eq!(machine.current_state().name(), "C");
        assert!(!machine.trigger(&Signal("Go")));
        assert_eq!(machine.current_state().name(), "C");
    }

    #[test]
    fn initial_completion_chain_runs_at_construction() {
        let chart = ChartBuilder::new("M")
            .state("Boot", |s| s.on_completion("Ready"))
            .state("Ready", |s| s)
            .initial("Boot")
            .build()
            .unwrap();

        let recorder = Arc::new(Recorder::new());
        let machine = Machine::with_observers(chart, vec![recorder.clone()]);

        assert_eq!(machine.current_state().name(), "Ready");
        assert_eq!(
            recorder.hops(),
            vec![("M".into(), "Boot".into(), "Ready".into())]
        );
    }

    #[test]
    fn guard_rejection_reports_not_handled() {
        let chart = ChartBuilder::new("M")
            .state("A", |s| s.on_if("Go", "B", |_| false))
            .state("B", |s| s)
            .initial("A")
            .build()
            .unwrap();
        let mut machine = Machine::new(chart);

        assert!(!machine.trigger(&Signal("Go")));
        assert_eq!(machine.current_state().name(), "A");
    }

    #[test]
    fn history_records_every_hop() {
        let mut machine = Machine::new(workflow());
        machine.trigger(&Signal("Next"));

        let records = machine.history().transitions();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].event.as_deref(), Some("Next"));
        assert_eq!(records[1].event, None);
        assert_eq!(records[2].event, None);
        assert_eq!(
            machine.history().path(),
            vec!["Init", "Preparing", "Working", "Final"]
        );
    }
}
