//! Build errors for chart construction.

use thiserror::Error;

/// Errors detected while validating a chart definition.
///
/// All of these are configuration mistakes. They surface at build time and
/// are fatal; dispatch never has to cope with a malformed graph.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No states defined. Add at least one state")]
    NoStates,

    #[error("Duplicate state '{0}'")]
    DuplicateState(String),

    #[error("State '{state}' has more than one transition for event '{event}'")]
    DuplicateTransition { state: String, event: String },

    #[error("State '{0}' has more than one completion transition")]
    DuplicateCompletion(String),

    #[error("Transition from '{state}' targets unknown state '{target}'")]
    UnknownTarget { state: String, target: String },

    #[error("Initial state '{0}' is not declared in this machine")]
    UnknownInitial(String),

    #[error("Completion transitions form a cycle: {0}")]
    CompletionCycle(String),

    #[error("Composite state '{0}' declares no regions")]
    EmptyComposite(String),

    #[error("Duplicate region '{region}' on composite state '{state}'")]
    DuplicateRegion { state: String, region: String },

    #[error("Composite state '{state}' may only declare completion transitions, found one for event '{event}'")]
    EventOnComposite { state: String, event: String },

    #[error("In region '{region}' of composite state '{state}': {source}")]
    Region {
        state: String,
        region: String,
        #[source]
        source: Box<BuildError>,
    },
}
