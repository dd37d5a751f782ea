use thiserror::Error;

use super::blocker::BlockerList;
use super::marking::Discipline;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("initial place `{place}` does not exist")]
    NonExistentInitialPlace { place: String },
    #[error("place `{place}` referenced in transition `{transition}` does not exist")]
    NonExistentPlace { place: String, transition: String },
}

impl DefinitionError {
    /// The missing place, whatever referenced it.
    pub fn place(&self) -> &str {
        match self {
            DefinitionError::NonExistentInitialPlace { place } => place,
            DefinitionError::NonExistentPlace { place, .. } => place,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkingError {
    #[error("place `{place}` not found in marking")]
    NotMarked { place: String },
    #[error("marking field holds a {found} value but the workflow is {expected}")]
    FieldShape {
        expected: Discipline,
        found: Discipline,
    },
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("the marking is empty and there is no initial place for workflow `{workflow}`")]
    EmptyMarking { workflow: String },
    #[error("place `{place}` is not valid for workflow `{workflow}`")]
    UnknownPlace { place: String, workflow: String },
    #[error("transition `{transition}` is not defined for workflow `{workflow}`")]
    NotDefinedTransition {
        transition: String,
        workflow: String,
        blockers: BlockerList,
    },
    #[error("transition `{transition}` is not enabled for workflow `{workflow}`: {blockers}")]
    NotEnabledTransition {
        transition: String,
        workflow: String,
        blockers: BlockerList,
    },
    #[error(transparent)]
    Marking(#[from] MarkingError),
}

impl WorkflowError {
    /// Firing rejections are recoverable; everything else points at a broken
    /// scenario or subject.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            WorkflowError::NotDefinedTransition { .. } | WorkflowError::NotEnabledTransition { .. }
        )
    }

    pub fn blockers(&self) -> Option<&BlockerList> {
        match self {
            WorkflowError::NotDefinedTransition { blockers, .. }
            | WorkflowError::NotEnabledTransition { blockers, .. } => Some(blockers),
            _ => None,
        }
    }
}
