use std::fmt;
use std::hash::{Hash, Hasher};

/// Opaque handle to a node of the host document.
///
/// Only identity comparison is meaningful. Documents never hand out the same
/// id twice, so an id that outlives its node cannot alias a newer one.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Best-effort poster of a content item. Either field may be empty.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default)]
pub struct Author {
    pub user_id: String,
    pub user_name: String,
}

impl Author {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }
}

// Identity is the user id when both sides have one and the display name when
// neither does. An author with an id never equals one without.
impl PartialEq for Author {
    fn eq(&self, other: &Self) -> bool {
        match (self.user_id.is_empty(), other.user_id.is_empty()) {
            (false, false) => self.user_id == other.user_id,
            (true, true) => self.user_name == other.user_name,
            _ => false,
        }
    }
}

impl Eq for Author {}

impl Hash for Author {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.user_id.is_empty() {
            self.user_name.hash(state);
        } else {
            self.user_id.hash(state);
        }
    }
}

/// One extracted, author-attributed item plus the node it was found at.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct ContentEntity {
    pub author: Author,
    pub text: String,
    pub node: NodeId,
}

impl ContentEntity {
    pub fn new(author: Author, text: impl Into<String>, node: NodeId) -> Self {
        Self {
            author,
            text: text.into(),
            node,
        }
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum VerdictKind {
    Allow,
    Block,
}

impl fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictKind::Allow => f.write_str("allow"),
            VerdictKind::Block => f.write_str("block"),
        }
    }
}

/// Outcome of a decision. `score` is `None` only when the scorer failed and a
/// failure policy picked the verdict instead.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Verdict {
    pub kind: VerdictKind,
    pub score: Option<f64>,
}

impl Verdict {
    pub fn allow(score: f64) -> Self {
        Self {
            kind: VerdictKind::Allow,
            score: Some(score),
        }
    }

    pub fn block(score: f64) -> Self {
        Self {
            kind: VerdictKind::Block,
            score: Some(score),
        }
    }

    pub fn fallback(kind: VerdictKind) -> Self {
        Self { kind, score: None }
    }

    pub fn is_allow(&self) -> bool {
        self.kind == VerdictKind::Allow
    }

    pub fn is_block(&self) -> bool {
        self.kind == VerdictKind::Block
    }

    /// True when the verdict came from the scorer rather than a failure policy.
    pub fn is_measured(&self) -> bool {
        self.score.is_some()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.score {
            Some(score) => write!(f, "{} ({score:.3})", self.kind),
            None => write!(f, "{} (fallback)", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn authors_compare_by_id_when_both_have_one() {
        let a = Author::new("jane.doe", "Jane");
        let b = Author::new("jane.doe", "Jane D.");
        assert_eq!(a, b);
        assert_ne!(a, Author::new("john", "Jane"));
    }

    #[test]
    fn authors_fall_back_to_name_without_ids() {
        assert_eq!(Author::new("", "Bakers Club"), Author::new("", "Bakers Club"));
        assert_ne!(Author::new("", "Bakers Club"), Author::new("bakers", "Bakers Club"));
    }

    #[test]
    fn author_hash_agrees_with_equality() {
        let mut set = HashSet::new();
        set.insert(Author::new("jane.doe", "Jane"));
        set.insert(Author::new("jane.doe", "J."));
        set.insert(Author::new("", "Jane"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn fallback_verdict_is_not_measured() {
        assert!(Verdict::allow(0.4).is_measured());
        let fallback = Verdict::fallback(VerdictKind::Allow);
        assert!(fallback.is_allow());
        assert!(!fallback.is_measured());
        assert_eq!(fallback.to_string(), "allow (fallback)");
    }
}
