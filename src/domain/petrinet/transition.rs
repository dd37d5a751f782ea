use serde::{Deserialize, Serialize};

/// A named hyperarc consuming tokens from `from` and producing them in `to`.
///
/// Names are not unique inside a definition: several arc-sets may share one
/// name and are evaluated independently when that name is fired.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub name: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
}

impl Transition {
    pub fn new<N, F, T>(name: N, from: F, to: T) -> Self
    where
        N: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            name: name.into(),
            from: from.into_iter().map(Into::into).collect(),
            to: to.into_iter().map(Into::into).collect(),
        }
    }

    /// Every place this transition touches, inputs first.
    pub fn places(&self) -> impl Iterator<Item = &str> {
        self.from.iter().chain(self.to.iter()).map(String::as_str)
    }
}
