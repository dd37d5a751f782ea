use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockerCode {
    /// An input place of the transition is not marked.
    NotEnabled,
    Unknown,
}

impl BlockerCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockerCode::NotEnabled => "not-enabled",
            BlockerCode::Unknown => "unknown",
        }
    }
}

/// A reason a transition cannot fire for the current marking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocker {
    pub code: BlockerCode,
    pub message: String,
}

impl Blocker {
    pub fn not_enabled(place: &str) -> Self {
        Self {
            code: BlockerCode::NotEnabled,
            message: format!("Transition is prohibited by marking: place `{place}` is not marked"),
        }
    }

    pub fn unknown(reason: impl Into<String>) -> Self {
        Self {
            code: BlockerCode::Unknown,
            message: reason.into(),
        }
    }
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockerList {
    blockers: Vec<Blocker>,
}

impl BlockerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, blocker: Blocker) {
        self.blockers.push(blocker);
    }

    pub fn extend(&mut self, other: BlockerList) {
        self.blockers.extend(other.blockers);
    }

    pub fn has(&self, code: BlockerCode) -> bool {
        self.blockers.iter().any(|b| b.code == code)
    }

    pub fn is_empty(&self) -> bool {
        self.blockers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blockers.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Blocker> {
        self.blockers.iter()
    }
}

impl<'a> IntoIterator for &'a BlockerList {
    type Item = &'a Blocker;
    type IntoIter = std::slice::Iter<'a, Blocker>;

    fn into_iter(self) -> Self::IntoIter {
        self.blockers.iter()
    }
}

impl fmt::Display for BlockerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.blockers.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join("; "))
    }
}
