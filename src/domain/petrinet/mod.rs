//! # Petri Net
//!
//! A small Petri-net workflow engine: places, transitions, a marking bound to
//! an external subject, and firing rules with diagnosable blockers.
//!
//! The engine knows nothing about chats. Anything that implements
//! [`Markable`] can be driven through a [`Workflow`].

pub mod blocker;
pub mod definition;
pub mod error;
pub mod marking;
pub mod transition;
pub mod workflow;

pub use blocker::{Blocker, BlockerCode, BlockerList};
pub use definition::Definition;
pub use error::{DefinitionError, MarkingError, WorkflowError};
pub use marking::{Discipline, Markable, Marking, MarkingField, MarkingStorage};
pub use transition::Transition;
pub use workflow::Workflow;
