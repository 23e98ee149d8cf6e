use std::time::Duration;

use thiserror::Error;

use crate::color::EntityId;

/// opaque error returned by an external collaborator (fact source, attribute source, sink)
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// result type of the scheduling engine
pub type Result<T> = std::result::Result<T, Error>;

/// errors of a scheduling run. None of them is retried automatically.
#[derive(Error, Debug)]
pub enum Error {
    /// a collaborator failed; the failure is surfaced as-is
    #[error("collaborator error during {operation}: {source}")]
    Collaborator {
        /// collaborator operation that failed
        operation: &'static str,
        /// underlying error
        source: CollaboratorError,
    },

    /// the slot calendar has no template
    #[error("slot calendar has no template")]
    EmptyCalendar,

    /// a slot template is malformed (unknown day, bad time, start not before end)
    #[error("invalid slot template: {0}")]
    InvalidTemplate(String),

    /// a stacked cycle pushes the time block past midnight
    #[error("color {color} does not fit in the slot calendar (time block leaves the day)")]
    CalendarOverflow {
        /// color index that could not be mapped
        color: usize,
    },

    /// unable to parse an input value
    #[error("parse error: {0}")]
    Parse(String),

    /// the repair step bumped an entity to a color that was not fresh
    #[error("repair invariant violated: {entity} bumped to color {color} while max color is {max_color}")]
    RepairInvariant {
        /// bumped entity
        entity: EntityId,
        /// color it received
        color: usize,
        /// maximum color in use before the bump
        max_color: usize,
    },

    /// a colorer produced an assignment that is not a proper coloring
    #[error("improper coloring: {0}")]
    ImproperColoring(String),

    /// the run exceeded the caller-supplied time limit; its result was discarded
    #[error("run took {elapsed:?}, limit is {limit:?}; result discarded")]
    Timeout {
        /// time spent computing
        elapsed: Duration,
        /// configured limit
        limit: Duration,
    },

    /// I/O error (configuration or catalog files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// wraps a collaborator failure
    pub fn collaborator(operation: &'static str, source: CollaboratorError) -> Self {
        Self::Collaborator { operation, source }
    }
}
