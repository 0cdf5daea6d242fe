//! Builder API for declaring charts.
//!
//! Charts are validated eagerly: duplicate transition keys, dangling
//! targets, completion cycles, and malformed composites are all rejected at
//! build time with a [`BuildError`], so a machine never dispatches against
//! a broken graph.

pub mod error;
pub mod macros;

pub use error::BuildError;

use crate::core::{Chart, Event, Guard, StateId, StateKind, StateNode, Transition};
use std::collections::HashSet;
use std::sync::Arc;

/// Fluent builder for one machine's [`Chart`].
///
/// Region charts of a composite state are themselves declared with
/// `ChartBuilder`, nested into [`composite`](ChartBuilder::composite).
///
/// # Example
///
/// ```rust
/// use statecraft::builder::ChartBuilder;
///
/// let chart = ChartBuilder::new("Job")
///     .state("Queued", |s| s.on("Claim", "Running"))
///     .state("Running", |s| s.on("Finish", "Done").on("Abort", "Failed"))
///     .final_state("Done")
///     .final_state("Failed")
///     .initial("Queued")
///     .build()
///     .unwrap();
///
/// assert_eq!(chart.name(), "Job");
/// assert_eq!(chart.state_count(), 4);
/// ```
pub struct ChartBuilder {
    name: String,
    initial: Option<String>,
    states: Vec<StateDecl>,
}

struct StateDecl {
    name: String,
    kind: DeclKind,
    transitions: Vec<TransitionDecl>,
}

enum DeclKind {
    Simple,
    Final,
    Composite(Vec<ChartBuilder>),
}

struct TransitionDecl {
    event: Option<String>,
    target: String,
    guard: Option<Guard>,
}

/// Collects the outgoing transitions of a single state declaration.
///
/// Obtained through the closure passed to [`ChartBuilder::state`] or
/// [`ChartBuilder::composite`].
pub struct StateBuilder {
    transitions: Vec<TransitionDecl>,
}

impl StateBuilder {
    fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Declare an event-triggered transition to `target`.
    pub fn on(mut self, event: &str, target: &str) -> Self {
        self.transitions.push(TransitionDecl {
            event: Some(event.to_owned()),
            target: target.to_owned(),
            guard: None,
        });
        self
    }

    /// Declare an event-triggered transition gated by a [`Guard`].
    pub fn on_guarded(mut self, event: &str, target: &str, guard: Guard) -> Self {
        self.transitions.push(TransitionDecl {
            event: Some(event.to_owned()),
            target: target.to_owned(),
            guard: Some(guard),
        });
        self
    }

    /// Declare a guarded transition from a closure predicate.
    pub fn on_if<F>(self, event: &str, target: &str, predicate: F) -> Self
    where
        F: Fn(&dyn Event) -> bool + Send + Sync + 'static,
    {
        self.on_guarded(event, target, Guard::new(predicate))
    }

    /// Declare the completion transition taken automatically on entry.
    ///
    /// At most one completion transition may be declared per state.
    pub fn on_completion(mut self, target: &str) -> Self {
        self.transitions.push(TransitionDecl {
            event: None,
            target: target.to_owned(),
            guard: None,
        });
        self
    }
}

impl ChartBuilder {
    /// Start declaring a machine with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial: None,
            states: Vec::new(),
        }
    }

    /// Declare an ordinary state and its outgoing transitions.
    pub fn state(mut self, name: &str, decl: impl FnOnce(StateBuilder) -> StateBuilder) -> Self {
        let builder = decl(StateBuilder::new());
        self.states.push(StateDecl {
            name: name.to_owned(),
            kind: DeclKind::Simple,
            transitions: builder.transitions,
        });
        self
    }

    /// Declare a terminal state.
    ///
    /// Final states have no outgoing transitions; entering one ends the
    /// machine (or region) that owns it.
    pub fn final_state(mut self, name: &str) -> Self {
        self.states.push(StateDecl {
            name: name.to_owned(),
            kind: DeclKind::Final,
            transitions: Vec::new(),
        });
        self
    }

    /// Declare a composite state backed by the given region charts.
    ///
    /// A composite may only declare completion transitions of its own; its
    /// observable behavior while active comes from the regions.
    pub fn composite(
        mut self,
        name: &str,
        regions: impl IntoIterator<Item = ChartBuilder>,
        decl: impl FnOnce(StateBuilder) -> StateBuilder,
    ) -> Self {
        let builder = decl(StateBuilder::new());
        self.states.push(StateDecl {
            name: name.to_owned(),
            kind: DeclKind::Composite(regions.into_iter().collect()),
            transitions: builder.transitions,
        });
        self
    }

    /// Name the state the machine starts in (required).
    pub fn initial(mut self, name: &str) -> Self {
        self.initial = Some(name.to_owned());
        self
    }

    /// Validate the declaration and produce an immutable [`Chart`].
    pub fn build(self) -> Result<Chart, BuildError> {
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        let names: Vec<String> = self.states.iter().map(|d| d.name.clone()).collect();
        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(BuildError::DuplicateState(name.clone()));
            }
        }

        let initial_name = self.initial.ok_or(BuildError::MissingInitialState)?;
        let Some(initial) = names.iter().position(|n| *n == initial_name) else {
            return Err(BuildError::UnknownInitial(initial_name));
        };

        for decl in &self.states {
            validate_state(decl)?;
        }

        let mut states = Vec::with_capacity(self.states.len());
        for decl in self.states {
            let StateDecl {
                name: state_name,
                kind,
                transitions,
            } = decl;

            let mut built_transitions = Vec::with_capacity(transitions.len());
            for t in transitions {
                let Some(target) = names.iter().position(|n| *n == t.target) else {
                    return Err(BuildError::UnknownTarget {
                        state: state_name,
                        target: t.target,
                    });
                };
                built_transitions.push(Transition {
                    event: t.event,
                    target: StateId(target),
                    guard: t.guard,
                });
            }

            let kind = match kind {
                DeclKind::Simple => StateKind::Simple,
                DeclKind::Final => StateKind::Final,
                DeclKind::Composite(regions) => {
                    let mut built = Vec::with_capacity(regions.len());
                    for region in regions {
                        let region_name = region.name.clone();
                        let chart = region.build().map_err(|source| BuildError::Region {
                            state: state_name.clone(),
                            region: region_name,
                            source: Box::new(source),
                        })?;
                        built.push(Arc::new(chart));
                    }
                    StateKind::Composite { regions: built }
                }
            };

            states.push(StateNode {
                name: state_name,
                kind,
                transitions: built_transitions,
            });
        }

        if let Some(cycle) = completion_cycle(&states) {
            return Err(BuildError::CompletionCycle(cycle.join(" -> ")));
        }

        Ok(Chart {
            name: self.name,
            states,
            initial: StateId(initial),
        })
    }
}

fn validate_state(decl: &StateDecl) -> Result<(), BuildError> {
    let mut tags = HashSet::new();
    let mut completions = 0usize;
    for t in &decl.transitions {
        match &t.event {
            Some(event) => {
                if matches!(decl.kind, DeclKind::Composite(_)) {
                    return Err(BuildError::EventOnComposite {
                        state: decl.name.clone(),
                        event: event.clone(),
                    });
                }
                if !tags.insert(event.as_str()) {
                    return Err(BuildError::DuplicateTransition {
                        state: decl.name.clone(),
                        event: event.clone(),
                    });
                }
            }
            None => {
                completions += 1;
                if completions > 1 {
                    return Err(BuildError::DuplicateCompletion(decl.name.clone()));
                }
            }
        }
    }

    if let DeclKind::Composite(regions) = &decl.kind {
        if regions.is_empty() {
            return Err(BuildError::EmptyComposite(decl.name.clone()));
        }
        let mut region_names = HashSet::new();
        for region in regions {
            if !region_names.insert(region.name.as_str()) {
                return Err(BuildError::DuplicateRegion {
                    state: decl.name.clone(),
                    region: region.name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Detect a cycle among completion transitions.
///
/// Each state has at most one completion edge, so the edges form a
/// functional graph; every chain is walked once.
fn completion_cycle(states: &[StateNode]) -> Option<Vec<String>> {
    // 0 = unvisited, 1 = on the current trail, 2 = settled
    let mut color = vec![0u8; states.len()];
    for start in 0..states.len() {
        if color[start] != 0 {
            continue;
        }
        let mut trail: Vec<usize> = Vec::new();
        let mut cur = start;
        loop {
            match color[cur] {
                2 => break,
                1 => {
                    let pos = trail.iter().position(|&s| s == cur).unwrap_or(0);
                    let mut cycle: Vec<String> = trail[pos..]
                        .iter()
                        .map(|&s| states[s].name().to_owned())
                        .collect();
                    cycle.push(states[cur].name().to_owned());
                    return Some(cycle);
                }
                _ => {
                    color[cur] = 1;
                    trail.push(cur);
                    match states[cur].completion() {
                        Some(t) => cur = t.target().0,
                        None => break,
                    }
                }
            }
        }
        for &s in &trail {
            color[s] = 2;
        }
    }
    None
}
