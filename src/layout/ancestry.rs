use std::collections::{HashMap, HashSet, VecDeque};

use smallvec::SmallVec;

use crate::core::Snapshot;

/// Commit id list sized for the common case of one or two entries
pub type IdList = SmallVec<[String; 2]>;

/// Parent/child relation and transitive reachability, restricted to the
/// snapshot.
///
/// Built once per snapshot from the visible-parent relation (missing and
/// unreferenced edges excluded). Traversals are guarded by visited sets, so
/// cyclic input degrades to mutual ancestry instead of hanging; on a valid
/// DAG no commit is its own ancestor.
#[derive(Debug, Clone, Default)]
pub struct Ancestry {
    parents: HashMap<String, IdList>,
    children: HashMap<String, IdList>,
    ancestors: HashMap<String, HashSet<String>>,
    descendants: HashMap<String, HashSet<String>>,
}

impl Ancestry {
    pub fn resolve(snapshot: &Snapshot) -> Self {
        let mut parents: HashMap<String, IdList> = HashMap::with_capacity(snapshot.len());
        let mut children: HashMap<String, IdList> = HashMap::with_capacity(snapshot.len());

        for rev in snapshot.iter() {
            children.entry(rev.commit_id.clone()).or_default();
            let visible: IdList =
                snapshot.visible_parents(rev).map(|e| e.parent_id.clone()).collect();
            for parent_id in &visible {
                children.entry(parent_id.clone()).or_default().push(rev.commit_id.clone());
            }
            parents.insert(rev.commit_id.clone(), visible);
        }

        let mut ancestors = HashMap::with_capacity(snapshot.len());
        let mut descendants = HashMap::with_capacity(snapshot.len());
        for rev in snapshot.iter() {
            ancestors.insert(rev.commit_id.clone(), reachable(&rev.commit_id, &parents));
            descendants.insert(rev.commit_id.clone(), reachable(&rev.commit_id, &children));
        }

        Self { parents, children, ancestors, descendants }
    }

    /// Visible parents, in parent-edge order
    pub fn parents_of(&self, commit_id: &str) -> &[String] {
        self.parents.get(commit_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Visible children, in snapshot order
    pub fn children_of(&self, commit_id: &str) -> &[String] {
        self.children.get(commit_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn ancestors_of(&self, commit_id: &str) -> Option<&HashSet<String>> {
        self.ancestors.get(commit_id)
    }

    pub fn descendants_of(&self, commit_id: &str) -> Option<&HashSet<String>> {
        self.descendants.get(commit_id)
    }

    pub fn is_ancestor(&self, ancestor: &str, of: &str) -> bool {
        self.ancestors.get(of).is_some_and(|set| set.contains(ancestor))
    }
}

/// Breadth-first reachability over one direction of the relation
fn reachable(seed: &str, step: &HashMap<String, IdList>) -> HashSet<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    if let Some(direct) = step.get(seed) {
        for id in direct {
            queue.push_back(id);
        }
    }
    while let Some(id) = queue.pop_front() {
        if seen.insert(id.to_string()) {
            if let Some(next) = step.get(id) {
                for n in next {
                    if !seen.contains(n.as_str()) {
                        queue.push_back(n);
                    }
                }
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ParentEdge, Revision};

    fn rev(commit_id: &str, parents: &[&str]) -> Revision {
        Revision::new(
            commit_id,
            format!("q{commit_id}"),
            parents.iter().map(|p| ParentEdge::direct(*p)).collect(),
        )
    }

    fn snapshot(revisions: Vec<Revision>) -> Snapshot {
        Snapshot::new(revisions)
    }

    #[test]
    fn linear_chain() {
        let snap = snapshot(vec![rev("root", &[]), rev("a", &["root"]), rev("b", &["a"])]);
        let ancestry = Ancestry::resolve(&snap);

        assert_eq!(ancestry.parents_of("b"), ["a"]);
        assert_eq!(ancestry.children_of("root"), ["a"]);
        assert!(ancestry.children_of("b").is_empty());

        let b_ancestors = ancestry.ancestors_of("b").unwrap();
        assert!(b_ancestors.contains("a") && b_ancestors.contains("root"));
        assert!(!b_ancestors.contains("b"));

        let root_descendants = ancestry.descendants_of("root").unwrap();
        assert_eq!(root_descendants.len(), 2);
    }

    #[test]
    fn merge_has_both_parents() {
        let snap = snapshot(vec![
            rev("root", &[]),
            rev("f", &["root"]),
            rev("t", &["root"]),
            rev("m", &["f", "t"]),
        ]);
        let ancestry = Ancestry::resolve(&snap);

        assert_eq!(ancestry.parents_of("m"), ["f", "t"]);
        assert!(ancestry.is_ancestor("root", "m"));
        assert!(ancestry.is_ancestor("f", "m"));
        assert!(!ancestry.is_ancestor("m", "f"));
    }

    #[test]
    fn restricted_to_snapshot() {
        // "outside" is referenced but absent, so it must not appear anywhere.
        let snap = snapshot(vec![rev("a", &["outside"]), rev("b", &["a"])]);
        let ancestry = Ancestry::resolve(&snap);

        assert!(ancestry.parents_of("a").is_empty());
        assert!(ancestry.ancestors_of("b").unwrap().contains("a"));
        assert!(!ancestry.ancestors_of("b").unwrap().contains("outside"));
    }

    #[test]
    fn cycle_degrades_to_mutual_ancestry() {
        let snap = snapshot(vec![rev("x", &["y"]), rev("y", &["x"])]);
        let ancestry = Ancestry::resolve(&snap);

        assert!(ancestry.is_ancestor("y", "x"));
        assert!(ancestry.is_ancestor("x", "y"));
        // Members of a cycle reach themselves; the guard just keeps this finite.
        assert!(ancestry.ancestors_of("x").unwrap().contains("x"));
    }
}
