//! Stamp Workflow - placement engine and the four-step stamping wizard
//!
//! [`PlacementEngine`] ties the placement store, the pointer state machine,
//! per-page geometry and undo history together behind one API.
//! [`Workflow`] walks the user from choosing a contract to the stamping
//! result and owns the state shared between steps.

mod engine;
mod history;
mod wizard;

pub use engine::PlacementEngine;
pub use history::History;
pub use wizard::{snap_stamp_size, Contract, Workflow, WorkflowStep};

use thiserror::Error;

/// Errors that can occur while driving the workflow
///
/// Messages are shown to the user as they are.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Please select a contract first")]
    MissingDocument,

    #[error("Please select a seal or signature first")]
    MissingStamp,

    #[error("Submit the placements to finish this step")]
    SubmissionRequired,

    #[error("Stamping is finished, restart to stamp another contract")]
    Finished,

    #[error("Step {0:?} has not been reached yet")]
    StepNotReached(WorkflowStep),

    #[error("Please place at least one stamp")]
    NoPlacements,
}

/// Result type for workflow operations
pub type Result<T> = std::result::Result<T, WorkflowError>;
