use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a revision relates to one of its parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentEdgeType {
    /// Immediate parent, present in the snapshot
    Direct,
    /// Parent reached through elided revisions
    Indirect,
    /// Parent outside the snapshot
    Missing,
}

/// One entry in a revision's ordered parent list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentEdge {
    /// Commit ID of the parent
    pub parent_id: String,
    /// Edge classification
    pub edge_type: ParentEdgeType,
}

impl ParentEdge {
    pub fn direct(parent_id: impl Into<String>) -> Self {
        Self { parent_id: parent_id.into(), edge_type: ParentEdgeType::Direct }
    }

    pub fn indirect(parent_id: impl Into<String>) -> Self {
        Self { parent_id: parent_id.into(), edge_type: ParentEdgeType::Indirect }
    }

    pub fn missing(parent_id: impl Into<String>) -> Self {
        Self { parent_id: parent_id.into(), edge_type: ParentEdgeType::Missing }
    }
}

/// One revision as currently known.
///
/// `commit_id` is the content-addressed identity and changes whenever the
/// revision is rewritten; `change_id` survives amends and rebases and is the
/// primary UI key. Display fields (author, description, timestamp) are
/// carried for the UI and never influence layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub commit_id: String,
    pub change_id: String,
    /// Ordered parent edges, first parent first
    pub parents: Vec<ParentEdge>,
    pub is_working_copy: bool,
    pub is_trunk: bool,
    pub is_immutable: bool,
    pub is_divergent: bool,
    /// Disambiguates revisions sharing a change_id
    pub divergent_index: Option<usize>,
    /// Named pointers at this revision
    pub bookmarks: Vec<String>,
    pub description: String,
    pub author: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Revision {
    /// A bare revision with all flags cleared; tests and callers fill in
    /// the rest field by field.
    pub fn new(
        commit_id: impl Into<String>,
        change_id: impl Into<String>,
        parents: Vec<ParentEdge>,
    ) -> Self {
        Self {
            commit_id: commit_id.into(),
            change_id: change_id.into(),
            parents,
            is_working_copy: false,
            is_trunk: false,
            is_immutable: false,
            is_divergent: false,
            divergent_index: None,
            bookmarks: Vec::new(),
            description: String::new(),
            author: String::new(),
            timestamp: None,
        }
    }

    /// Check if this is a root revision (no parents at all)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Pinned revisions are always shown individually: never hidden by a
    /// collapsed stack, never the top of one.
    pub fn is_pinned(&self) -> bool {
        self.is_working_copy || self.is_trunk || !self.bookmarks.is_empty() || self.is_divergent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_flags() {
        let mut rev = Revision::new("c1", "q1", vec![]);
        assert!(!rev.is_pinned());

        rev.is_working_copy = true;
        assert!(rev.is_pinned());

        rev.is_working_copy = false;
        rev.bookmarks.push("main".to_string());
        assert!(rev.is_pinned());

        rev.bookmarks.clear();
        rev.is_divergent = true;
        assert!(rev.is_pinned());
    }

    #[test]
    fn immutable_is_not_pinned_by_itself() {
        let mut rev = Revision::new("c1", "q1", vec![]);
        rev.is_immutable = true;
        assert!(!rev.is_pinned());
    }

    #[test]
    fn root_detection() {
        let root = Revision::new("r", "qr", vec![]);
        let child = Revision::new("c", "qc", vec![ParentEdge::direct("r")]);
        assert!(root.is_root());
        assert!(!child.is_root());
    }
}
