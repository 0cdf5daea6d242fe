//! Statecraft: an embeddable hierarchical state machine runtime.
//!
//! Applications declare states, typed events, and transitions; the runtime
//! dispatches incoming events, advances the active state, and reports every
//! transition to subscribed observers so an external tool can visualize the
//! machine live.
//!
//! # Core Concepts
//!
//! - **Chart**: immutable, validated description of a machine, built with
//!   [`ChartBuilder`]
//! - **Machine**: a running instance with a current state; dispatch via
//!   [`Machine::trigger`]
//! - **Completion transitions**: automatic hops taken immediately on state
//!   entry
//! - **Composite states**: states backed by independently progressing
//!   regions, joined with AND semantics
//! - **Observers**: change-notification hooks fired once per hop, consumed
//!   for example by the [`adapter`] streaming client
//!
//! # Example
//!
//! ```rust
//! use statecraft::builder::ChartBuilder;
//! use statecraft::core::Signal;
//! use statecraft::machine::Machine;
//!
//! let chart = ChartBuilder::new("Workflow")
//!     .state("Init", |s| s.on("Next", "Preparing"))
//!     .state("Preparing", |s| s.on_completion("Working"))
//!     .state("Working", |s| s.on("Finish", "Done"))
//!     .final_state("Done")
//!     .initial("Init")
//!     .build()
//!     .unwrap();
//!
//! let mut machine = Machine::new(chart);
//!
//! // one trigger rides the completion chain through Preparing
//! assert!(machine.trigger(&Signal("Next")));
//! assert_eq!(machine.current_state().name(), "Working");
//!
//! // unmatched events are ignored, not errors
//! assert!(!machine.trigger(&Signal("Bogus")));
//!
//! assert!(machine.trigger(&Signal("Finish")));
//! assert!(machine.is_finished());
//! ```

pub mod adapter;
pub mod builder;
pub mod core;
pub mod machine;
pub mod observe;

// Re-export commonly used types
pub use crate::builder::{BuildError, ChartBuilder, StateBuilder};
pub use crate::core::{Chart, Event, Guard, Signal, StateHistory, StateKind, StateNode};
pub use crate::machine::Machine;
pub use crate::observe::{StateChange, StateObserver};
