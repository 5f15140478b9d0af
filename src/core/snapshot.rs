use std::collections::HashMap;

use tracing::warn;

use super::revision::{ParentEdge, ParentEdgeType, Revision};

/// Immutable set of revisions one layout is computed from.
///
/// Revisions keep their received order; lookup maps are derived once at
/// construction. The snapshot is never mutated after that — a refreshed
/// view of the repository arrives as a brand-new snapshot.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    revisions: Vec<Revision>,
    by_commit: HashMap<String, usize>,
    by_change: HashMap<String, usize>,
    unreferenced_parents: usize,
}

impl Snapshot {
    pub fn new(revisions: Vec<Revision>) -> Self {
        let mut kept: Vec<Revision> = Vec::with_capacity(revisions.len());
        let mut by_commit = HashMap::with_capacity(revisions.len());

        for rev in revisions {
            if by_commit.contains_key(&rev.commit_id) {
                warn!(commit_id = %rev.commit_id, "duplicate commit id in snapshot, dropping");
                continue;
            }
            by_commit.insert(rev.commit_id.clone(), kept.len());
            kept.push(rev);
        }

        let mut by_change = HashMap::with_capacity(kept.len());
        for (idx, rev) in kept.iter().enumerate() {
            // Divergent change ids resolve to their first occurrence.
            by_change.entry(rev.change_id.clone()).or_insert(idx);
        }

        let mut unreferenced_parents = 0;
        for rev in &kept {
            for edge in &rev.parents {
                if edge.edge_type != ParentEdgeType::Missing
                    && !by_commit.contains_key(&edge.parent_id)
                {
                    warn!(
                        commit_id = %rev.commit_id,
                        parent_id = %edge.parent_id,
                        "parent not in snapshot, treating edge as missing"
                    );
                    unreferenced_parents += 1;
                }
            }
        }

        Self { revisions: kept, by_commit, by_change, unreferenced_parents }
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Revision> {
        self.revisions.iter()
    }

    pub fn get(&self, commit_id: &str) -> Option<&Revision> {
        self.by_commit.get(commit_id).map(|&idx| &self.revisions[idx])
    }

    pub fn get_by_change(&self, change_id: &str) -> Option<&Revision> {
        self.by_change.get(change_id).map(|&idx| &self.revisions[idx])
    }

    pub fn contains(&self, commit_id: &str) -> bool {
        self.by_commit.contains_key(commit_id)
    }

    pub fn working_copy(&self) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.is_working_copy)
    }

    /// Parent edges usable for layout: not marked missing and resolving to
    /// a revision in this snapshot. Unreferenced parents fall out here.
    pub fn visible_parents<'a>(&'a self, rev: &'a Revision) -> impl Iterator<Item = &'a ParentEdge> {
        rev.parents
            .iter()
            .filter(move |e| e.edge_type != ParentEdgeType::Missing && self.contains(&e.parent_id))
    }

    /// Count of non-missing parent edges whose target was absent — a
    /// data-quality signal, not an error.
    pub fn unreferenced_parents(&self) -> usize {
        self.unreferenced_parents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rev(commit_id: &str, parents: &[&str]) -> Revision {
        Revision::new(
            commit_id,
            format!("q{commit_id}"),
            parents.iter().map(|p| ParentEdge::direct(*p)).collect(),
        )
    }

    #[test]
    fn lookup_by_commit_and_change() {
        let snapshot = Snapshot::new(vec![rev("a", &[]), rev("b", &["a"])]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("b").unwrap().change_id, "qb");
        assert_eq!(snapshot.get_by_change("qa").unwrap().commit_id, "a");
        assert!(snapshot.get("zzz").is_none());
    }

    #[test]
    fn duplicate_commit_ids_keep_first() {
        let mut second = rev("a", &[]);
        second.description = "duplicate".to_string();
        let snapshot = Snapshot::new(vec![rev("a", &[]), second]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("a").unwrap().description, "");
    }

    #[test]
    fn unreferenced_parent_is_treated_as_missing() {
        let snapshot = Snapshot::new(vec![rev("a", &["ghost"])]);
        assert_eq!(snapshot.unreferenced_parents(), 1);
        let a = snapshot.get("a").unwrap();
        assert_eq!(snapshot.visible_parents(a).count(), 0);
    }

    #[test]
    fn missing_edges_are_not_visible() {
        let child = Revision::new(
            "b",
            "qb",
            vec![ParentEdge::direct("a"), ParentEdge::missing("outside")],
        );
        let snapshot = Snapshot::new(vec![rev("a", &[]), child]);
        assert_eq!(snapshot.unreferenced_parents(), 0);
        let b = snapshot.get("b").unwrap();
        let visible: Vec<_> = snapshot.visible_parents(b).map(|e| e.parent_id.as_str()).collect();
        assert_eq!(visible, vec!["a"]);
    }

    #[test]
    fn working_copy_lookup() {
        let mut wc = rev("w", &["a"]);
        wc.is_working_copy = true;
        let snapshot = Snapshot::new(vec![rev("a", &[]), wc]);
        assert_eq!(snapshot.working_copy().unwrap().commit_id, "w");
    }
}
