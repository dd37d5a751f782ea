use std::collections::BTreeSet;
use std::sync::Arc;

use super::blocker::{Blocker, BlockerList};
use super::definition::Definition;
use super::error::WorkflowError;
use super::marking::{Markable, Marking, MarkingStorage};
use super::transition::Transition;

/// A [`Definition`] bound to a marking discipline.
///
/// Every operation resolves the subject's marking first, seeding it from the
/// initial places when the persisted field is empty.
#[derive(Debug, Clone)]
pub struct Workflow {
    name: String,
    definition: Arc<Definition>,
    storage: MarkingStorage,
}

impl Workflow {
    pub fn new(name: impl Into<String>, definition: Arc<Definition>, storage: MarkingStorage) -> Self {
        Self {
            name: name.into(),
            definition,
            storage,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn storage(&self) -> MarkingStorage {
        self.storage
    }

    pub fn get_marking<S: Markable + ?Sized>(&self, subject: &mut S) -> Result<Marking, WorkflowError> {
        let mut marking = self.storage.get_marking(subject)?;

        if marking.is_empty() {
            let initial = self.definition.initial_places();
            if initial.is_empty() {
                return Err(WorkflowError::EmptyMarking {
                    workflow: self.name.clone(),
                });
            }
            for place in initial {
                marking.mark(place.clone());
            }
            tracing::debug!(workflow = %self.name, places = ?marking.places(), "seeded marking from initial places");
            self.storage.set_marking(subject, &marking)?;
        }

        if let Some(unknown) = marking.places().iter().find(|p| !self.definition.has_place(p)) {
            return Err(WorkflowError::UnknownPlace {
                place: unknown.clone(),
                workflow: self.name.clone(),
            });
        }

        Ok(marking)
    }

    pub fn transition_blockers(&self, marking: &Marking, transition: &Transition) -> BlockerList {
        let mut blockers = BlockerList::new();
        for place in &transition.from {
            if !marking.has(place) {
                blockers.push(Blocker::not_enabled(place));
            }
        }
        blockers
    }

    pub fn can_fire<S: Markable + ?Sized>(&self, subject: &mut S, transition: &str) -> Result<bool, WorkflowError> {
        let marking = self.get_marking(subject)?;
        Ok(self
            .definition
            .transitions_named(transition)
            .any(|t| self.transition_blockers(&marking, t).is_empty()))
    }

    /// Applies every enabled arc-set named `transition` and persists the
    /// result. The subject is left untouched on any failure.
    pub fn fire<S: Markable + ?Sized>(&self, subject: &mut S, transition: &str) -> Result<Marking, WorkflowError> {
        let current = self.get_marking(subject)?;

        let mut defined = false;
        let mut approved = Vec::new();
        let mut blockers = BlockerList::new();
        for t in self.definition.transitions_named(transition) {
            defined = true;
            let found = self.transition_blockers(&current, t);
            if found.is_empty() {
                approved.push(t);
            } else {
                blockers.extend(found);
            }
        }

        if !defined {
            let mut blockers = BlockerList::new();
            blockers.push(Blocker::unknown(format!("no transition named `{transition}`")));
            return Err(WorkflowError::NotDefinedTransition {
                transition: transition.to_string(),
                workflow: self.name.clone(),
                blockers,
            });
        }
        if approved.is_empty() {
            return Err(WorkflowError::NotEnabledTransition {
                transition: transition.to_string(),
                workflow: self.name.clone(),
                blockers,
            });
        }

        let mut next = current.clone();
        for t in approved {
            for place in &t.from {
                next.unmark(place)?;
            }
            for place in &t.to {
                next.mark(place.clone());
            }
        }

        self.storage.set_marking(subject, &next)?;
        tracing::debug!(
            workflow = %self.name,
            transition,
            from = ?current.places(),
            to = ?next.places(),
            "fired transition"
        );
        Ok(next)
    }

    /// Distinct names of the transitions that can fire right now.
    pub fn enabled_transitions<S: Markable + ?Sized>(&self, subject: &mut S) -> Result<Vec<String>, WorkflowError> {
        let marking = self.get_marking(subject)?;
        let names: BTreeSet<String> = self
            .definition
            .transitions()
            .iter()
            .filter(|t| self.transition_blockers(&marking, t).is_empty())
            .map(|t| t.name.clone())
            .collect();
        Ok(names.into_iter().collect())
    }
}
