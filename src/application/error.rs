//! # Application Errors
//!
//! Typed failures of scenario construction and dispatch.

use thiserror::Error;

use crate::domain::petrinet::{DefinitionError, WorkflowError};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("malformed scenario at `{path}`: {reason}")]
    Malformed { path: String, reason: String },
    #[error("unknown action `{name}` in state `{state}`")]
    UnknownAction { name: String, state: String },
    #[error("unknown command type `{kind}` in state `{state}`")]
    UnknownCommand { kind: String, state: String },
    #[error("state `{state}` declares transition `{transition}` towards both `{first}` and `{second}`")]
    AmbiguousTransition {
        state: String,
        transition: String,
        first: String,
        second: String,
    },
    #[error("invalid scenario definition: {0}")]
    Definition(#[from] DefinitionError),
}

impl BuildError {
    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        BuildError::Malformed {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("action `{action}` failed in state `{state}`: {reason:#}")]
    Action {
        action: String,
        state: String,
        reason: anyhow::Error,
    },
    #[error("instant transitions chained more than {limit} times (last state `{state}`)")]
    InstantChainTooLong { limit: usize, state: String },
    #[error("no state is bound to the current marking {places:?}")]
    NoCurrentState { places: Vec<String> },
}
