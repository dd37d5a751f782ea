use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::MarkingError;

/// The set of places currently active for one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marking {
    places: BTreeSet<String>,
}

impl Marking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_places<I>(places: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            places: places.into_iter().map(Into::into).collect(),
        }
    }

    pub fn mark(&mut self, place: impl Into<String>) {
        self.places.insert(place.into());
    }

    pub fn unmark(&mut self, place: &str) -> Result<(), MarkingError> {
        if self.places.remove(place) {
            Ok(())
        } else {
            Err(MarkingError::NotMarked {
                place: place.to_string(),
            })
        }
    }

    pub fn has(&self, place: &str) -> bool {
        self.places.contains(place)
    }

    pub fn places(&self) -> &BTreeSet<String> {
        &self.places
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }
}

/// How many places a subject may occupy at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    /// Exactly one active place, persisted as a string.
    #[default]
    Single,
    /// Any subset of places, persisted as a set.
    Multi,
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discipline::Single => write!(f, "single-state"),
            Discipline::Multi => write!(f, "multi-state"),
        }
    }
}

/// The persisted shape of a subject's marking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkingField {
    Single(String),
    Multi(BTreeSet<String>),
}

impl MarkingField {
    /// An empty field of the shape `discipline` expects.
    pub fn empty(discipline: Discipline) -> Self {
        match discipline {
            Discipline::Single => MarkingField::Single(String::new()),
            Discipline::Multi => MarkingField::Multi(BTreeSet::new()),
        }
    }

    pub fn discipline(&self) -> Discipline {
        match self {
            MarkingField::Single(_) => Discipline::Single,
            MarkingField::Multi(_) => Discipline::Multi,
        }
    }
}

impl Default for MarkingField {
    fn default() -> Self {
        MarkingField::empty(Discipline::Single)
    }
}

/// Typed adapter over the one field of a subject the engine owns.
pub trait Markable {
    fn marking_field(&self) -> &MarkingField;

    fn set_marking_field(&mut self, field: MarkingField);
}

/// Reads and writes a [`Marking`] through a subject's [`MarkingField`],
/// enforcing the workflow's discipline.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkingStorage {
    discipline: Discipline,
}

impl MarkingStorage {
    pub fn new(discipline: Discipline) -> Self {
        Self { discipline }
    }

    pub fn single_state() -> Self {
        Self::new(Discipline::Single)
    }

    pub fn multi_state() -> Self {
        Self::new(Discipline::Multi)
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    pub fn get_marking<S: Markable + ?Sized>(&self, subject: &S) -> Result<Marking, MarkingError> {
        match (self.discipline, subject.marking_field()) {
            (Discipline::Single, MarkingField::Single(place)) => {
                if place.is_empty() {
                    Ok(Marking::new())
                } else {
                    Ok(Marking::from_places([place.clone()]))
                }
            }
            (Discipline::Multi, MarkingField::Multi(places)) => Ok(Marking::from_places(places.iter().cloned())),
            (expected, field) => Err(MarkingError::FieldShape {
                expected,
                found: field.discipline(),
            }),
        }
    }

    pub fn set_marking<S: Markable + ?Sized>(&self, subject: &mut S, marking: &Marking) -> Result<(), MarkingError> {
        let found = subject.marking_field().discipline();
        if found != self.discipline {
            return Err(MarkingError::FieldShape {
                expected: self.discipline,
                found,
            });
        }

        let field = match self.discipline {
            Discipline::Single => {
                if marking.len() > 1 {
                    tracing::warn!(
                        places = ?marking.places(),
                        "single-state marking holds several places, keeping the first"
                    );
                }
                MarkingField::Single(marking.places().iter().next().cloned().unwrap_or_default())
            }
            Discipline::Multi => MarkingField::Multi(marking.places().clone()),
        };
        subject.set_marking_field(field);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Subject {
        field: MarkingField,
    }

    impl Markable for Subject {
        fn marking_field(&self) -> &MarkingField {
            &self.field
        }

        fn set_marking_field(&mut self, field: MarkingField) {
            self.field = field;
        }
    }

    fn multi(places: &[&str]) -> Subject {
        Subject {
            field: MarkingField::Multi(places.iter().map(|p| p.to_string()).collect()),
        }
    }

    #[test]
    fn test_unmark_absent_place_fails() {
        let mut marking = Marking::from_places(["a"]);
        assert!(marking.unmark("a").is_ok());
        assert_eq!(
            marking.unmark("a"),
            Err(MarkingError::NotMarked { place: "a".into() })
        );
    }

    #[test]
    fn test_get_marking_for_multistate() {
        let subject = multi(&["place1", "place2"]);
        let marking = MarkingStorage::multi_state().get_marking(&subject).unwrap();

        assert_eq!(marking.len(), 2);
        assert!(marking.has("place1"));
        assert!(marking.has("place2"));
    }

    #[test]
    fn test_get_marking_for_singlestate() {
        let subject = Subject {
            field: MarkingField::Single("place".into()),
        };
        let marking = MarkingStorage::single_state().get_marking(&subject).unwrap();

        assert_eq!(marking.len(), 1);
        assert!(marking.has("place"));
    }

    #[test]
    fn test_empty_string_is_empty_marking() {
        let subject = Subject {
            field: MarkingField::Single(String::new()),
        };
        assert!(MarkingStorage::single_state().get_marking(&subject).unwrap().is_empty());
    }

    #[test]
    fn test_set_marking_for_multistate() {
        let mut subject = multi(&[]);
        let marking = Marking::from_places(["place1", "place2"]);
        MarkingStorage::multi_state().set_marking(&mut subject, &marking).unwrap();

        match &subject.field {
            MarkingField::Multi(places) => {
                assert_eq!(places.len(), 2);
                assert!(places.contains("place1"));
                assert!(places.contains("place2"));
            }
            other => panic!("unexpected field {other:?}"),
        }
    }

    #[test]
    fn test_set_marking_for_singlestate() {
        let mut subject = Subject {
            field: MarkingField::Single(String::new()),
        };
        MarkingStorage::single_state()
            .set_marking(&mut subject, &Marking::from_places(["place"]))
            .unwrap();
        assert_eq!(subject.field, MarkingField::Single("place".into()));
    }

    #[test]
    fn test_set_marking_for_singlestate_keeps_first_place() {
        let mut subject = Subject {
            field: MarkingField::Single(String::new()),
        };
        MarkingStorage::single_state()
            .set_marking(&mut subject, &Marking::from_places(["b", "a"]))
            .unwrap();
        assert_eq!(subject.field, MarkingField::Single("a".into()));
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let mut subject = multi(&["a"]);
        let err = MarkingStorage::single_state().get_marking(&subject).unwrap_err();
        assert_eq!(
            err,
            MarkingError::FieldShape {
                expected: Discipline::Single,
                found: Discipline::Multi
            }
        );

        assert!(
            MarkingStorage::single_state()
                .set_marking(&mut subject, &Marking::from_places(["b"]))
                .is_err()
        );
        assert_eq!(subject.field, MarkingField::Multi(["a".to_string()].into()));
    }

    #[test]
    fn test_marking_field_serde_shapes() {
        let single: MarkingField = serde_json::from_str("\"menu\"").unwrap();
        assert_eq!(single, MarkingField::Single("menu".into()));

        let multi: MarkingField = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(multi.discipline(), Discipline::Multi);
    }
}
