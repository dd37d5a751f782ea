use std::collections::BTreeSet;
use std::sync::Arc;

use super::error::DefinitionError;
use super::transition::Transition;

/// Static graph of places and transitions.
///
/// Transitions are held behind `Arc` so scenario states can point at the same
/// transition object the definition fires.
#[derive(Debug, Clone, Default)]
pub struct Definition {
    places: BTreeSet<String>,
    initial_places: BTreeSet<String>,
    transitions: Vec<Arc<Transition>>,
}

impl Definition {
    /// Builds a definition, checking that every initial place and every place
    /// referenced by a transition is declared.
    pub fn new<T, I, P>(transitions: T, initial_places: I, places: P) -> Result<Self, DefinitionError>
    where
        T: IntoIterator<Item = Arc<Transition>>,
        I: IntoIterator,
        I::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let places: BTreeSet<String> = places.into_iter().map(Into::into).collect();
        let initial_places: BTreeSet<String> = initial_places.into_iter().map(Into::into).collect();

        if let Some(missing) = initial_places.iter().find(|p| !places.contains(*p)) {
            return Err(DefinitionError::NonExistentInitialPlace {
                place: missing.clone(),
            });
        }

        let transitions: Vec<Arc<Transition>> = transitions.into_iter().collect();
        for transition in &transitions {
            check_transition(&places, transition)?;
        }

        Ok(Self {
            places,
            initial_places,
            transitions,
        })
    }

    /// Registers a place. The first place added to an empty definition also
    /// becomes its initial place. Re-adding a known place is a no-op.
    pub fn add_place(&mut self, place: impl Into<String>) {
        let place = place.into();
        if self.places.is_empty() {
            self.initial_places.insert(place.clone());
        }
        self.places.insert(place);
    }

    /// Appends a transition after validating its places. Not transactional
    /// across calls: earlier additions survive a failed one.
    pub fn add_transition(&mut self, transition: Arc<Transition>) -> Result<(), DefinitionError> {
        check_transition(&self.places, &transition)?;
        self.transitions.push(transition);
        Ok(())
    }

    pub fn set_initial_places<I>(&mut self, places: I) -> Result<(), DefinitionError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let initial: BTreeSet<String> = places.into_iter().map(Into::into).collect();
        if let Some(missing) = initial.iter().find(|p| !self.places.contains(*p)) {
            return Err(DefinitionError::NonExistentInitialPlace {
                place: missing.clone(),
            });
        }
        self.initial_places = initial;
        Ok(())
    }

    pub fn has_place(&self, place: &str) -> bool {
        self.places.contains(place)
    }

    pub fn places(&self) -> &BTreeSet<String> {
        &self.places
    }

    pub fn initial_places(&self) -> &BTreeSet<String> {
        &self.initial_places
    }

    pub fn transitions(&self) -> &[Arc<Transition>] {
        &self.transitions
    }

    /// All arc-sets carrying `name`, in declaration order.
    pub fn transitions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<Transition>> + 'a {
        self.transitions.iter().filter(move |t| t.name == name)
    }
}

fn check_transition(places: &BTreeSet<String>, transition: &Transition) -> Result<(), DefinitionError> {
    match transition.places().find(|p| !places.contains(*p)) {
        Some(missing) => Err(DefinitionError::NonExistentPlace {
            place: missing.to_string(),
            transition: transition.name.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_transitions() -> Vec<Arc<Transition>> {
        Vec::new()
    }

    fn arc(name: &str, from: &[&str], to: &[&str]) -> Arc<Transition> {
        Arc::new(Transition::new(name, from.iter().copied(), to.iter().copied()))
    }

    #[test]
    fn test_places_are_registered() {
        let d = Definition::new(no_transitions(), Vec::<String>::new(), ["a", "b"]).unwrap();
        assert_eq!(d.places().len(), 2);
        assert!(d.has_place("a"));
        assert!(d.has_place("b"));
    }

    #[test]
    fn test_initial_place_must_exist() {
        assert!(Definition::new(no_transitions(), ["a"], ["a", "b"]).is_ok());

        let err = Definition::new(no_transitions(), ["x"], ["a", "b"]).unwrap_err();
        assert_eq!(err, DefinitionError::NonExistentInitialPlace { place: "x".into() });
    }

    #[test]
    fn test_transition_from_place_must_exist() {
        let err = Definition::new(vec![arc("test", &["x"], &["b"])], Vec::<String>::new(), ["a", "b"]).unwrap_err();
        assert_eq!(err.place(), "x");
    }

    #[test]
    fn test_transition_to_place_must_exist() {
        let err = Definition::new(vec![arc("test", &["a"], &["x"])], Vec::<String>::new(), ["a", "b"]).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::NonExistentPlace {
                place: "x".into(),
                transition: "test".into()
            }
        );
    }

    #[test]
    fn test_first_missing_place_is_reported() {
        let err = Definition::new(vec![arc("t", &["a", "y"], &["z"])], Vec::<String>::new(), ["a"]).unwrap_err();
        assert_eq!(err.place(), "y");
    }

    #[test]
    fn test_add_place_is_idempotent() {
        let mut d = Definition::default();
        d.add_place("x");
        d.add_place("x");
        assert_eq!(d.places().len(), 1);
        assert!(d.has_place("x"));
    }

    #[test]
    fn test_first_added_place_becomes_initial() {
        let mut d = Definition::default();
        d.add_place("start");
        d.add_place("menu");
        assert_eq!(d.initial_places().iter().collect::<Vec<_>>(), vec!["start"]);
    }

    #[test]
    fn test_add_transition() {
        let mut d = Definition::default();
        d.add_place("a");
        d.add_place("b");
        d.add_transition(arc("test", &["a"], &["b"])).unwrap();

        assert_eq!(d.transitions().len(), 1);
        let t = &d.transitions()[0];
        assert_eq!(t.name, "test");
        assert_eq!(t.from, vec!["a"]);
        assert_eq!(t.to, vec!["b"]);
    }

    #[test]
    fn test_failed_add_transition_keeps_previous_state() {
        let mut d = Definition::default();
        d.add_place("a");
        d.add_place("b");
        d.add_transition(arc("ok", &["a"], &["b"])).unwrap();

        assert!(d.add_transition(arc("broken", &["a"], &["nowhere"])).is_err());
        assert_eq!(d.transitions().len(), 1);
        assert_eq!(d.places().len(), 2);
    }

    #[test]
    fn test_transitions_named_returns_every_arc_set() {
        let d = Definition::new(
            vec![arc("t", &["a"], &["b"]), arc("u", &["b"], &["a"]), arc("t", &["b"], &["a"])],
            ["a"],
            ["a", "b"],
        )
        .unwrap();
        assert_eq!(d.transitions_named("t").count(), 2);
        assert_eq!(d.transitions_named("missing").count(), 0);
    }
}
