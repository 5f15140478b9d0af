use std::collections::HashSet;

use serde::Serialize;

use crate::core::Snapshot;

use super::ancestry::Ancestry;

/// A maximal linear run of revisions that the UI may collapse into a single
/// element. Only the intermediates disappear when collapsed; the top and
/// bottom stay visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionStack {
    /// Stack identity: the top member's change id
    pub id: String,
    /// All members, top to bottom
    pub change_ids: Vec<String>,
    pub top_change_id: String,
    pub bottom_change_id: String,
    /// Strictly interior members, hidden while collapsed
    pub intermediate_change_ids: Vec<String>,
}

/// Finds collapsible stacks, scanning chain tops in display order.
///
/// A chain top must be mutable, unpinned, and have exactly one linear parent
/// (a visible parent whose only visible child is this commit). The walk
/// follows unique linear parents downward and stops without extending on an
/// ambiguous merge point, an immutable or already-claimed parent, or a
/// parent with no visible parents of its own. A pinned parent may close the
/// chain as its bottom member once the chain has at least two members; it is
/// never buried as an intermediate. Chains of fewer than three members are
/// discarded, and members are claimed so no revision lands in two stacks.
pub fn detect_stacks(
    snapshot: &Snapshot,
    ancestry: &Ancestry,
    order: &[String],
) -> Vec<RevisionStack> {
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut stacks = Vec::new();

    for commit_id in order {
        let Some(top) = snapshot.get(commit_id) else { continue };
        if claimed.contains(commit_id.as_str()) || top.is_immutable || top.is_pinned() {
            continue;
        }
        let mut chain: Vec<&str> = vec![commit_id.as_str()];
        let mut current = commit_id.as_str();
        loop {
            let Some(parent_id) = unique_linear_parent(ancestry, current) else { break };
            if claimed.contains(parent_id) {
                break;
            }
            let Some(parent) = snapshot.get(parent_id) else { break };
            if parent.is_immutable {
                break;
            }
            // A revision with no visible parents anchors the graph and never
            // joins a chain.
            if ancestry.parents_of(parent_id).is_empty() {
                break;
            }
            if parent.is_pinned() {
                if chain.len() >= 2 {
                    chain.push(parent_id);
                }
                break;
            }
            chain.push(parent_id);
            current = parent_id;
        }

        if chain.len() < 3 {
            continue;
        }
        for member in &chain {
            claimed.insert(member);
        }

        let change_ids: Vec<String> = chain
            .iter()
            .filter_map(|id| snapshot.get(id))
            .map(|rev| rev.change_id.clone())
            .collect();
        stacks.push(RevisionStack {
            id: change_ids[0].clone(),
            top_change_id: change_ids[0].clone(),
            bottom_change_id: change_ids[change_ids.len() - 1].clone(),
            intermediate_change_ids: change_ids[1..change_ids.len() - 1].to_vec(),
            change_ids,
        });
    }

    stacks
}

/// The unique visible parent whose only visible child is `commit_id`, if
/// exactly one parent qualifies. Two qualifying parents are an ambiguous
/// merge point and yield nothing.
fn unique_linear_parent<'a>(ancestry: &'a Ancestry, commit_id: &str) -> Option<&'a str> {
    let mut found: Option<&str> = None;
    for parent_id in ancestry.parents_of(commit_id) {
        if ancestry.children_of(parent_id).len() == 1 {
            if found.is_some() {
                return None;
            }
            found = Some(parent_id);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ParentEdge, Revision};
    use crate::layout::order::display_order;
    use pretty_assertions::assert_eq;

    fn rev(commit_id: &str, parents: &[&str]) -> Revision {
        Revision::new(
            commit_id,
            format!("q{commit_id}"),
            parents.iter().map(|p| ParentEdge::direct(*p)).collect(),
        )
    }

    fn stacks_of(revisions: Vec<Revision>) -> Vec<RevisionStack> {
        let snapshot = Snapshot::new(revisions);
        let ancestry = Ancestry::resolve(&snapshot);
        let order = display_order(&snapshot, &ancestry, None).unwrap();
        detect_stacks(&snapshot, &ancestry, &order)
    }

    #[test]
    fn chain_of_three_above_root_is_one_stack() {
        let stacks =
            stacks_of(vec![rev("root", &[]), rev("a", &["root"]), rev("b", &["a"]), rev("c", &["b"])]);
        assert_eq!(stacks.len(), 1);
        let stack = &stacks[0];
        assert_eq!(stack.id, "qc");
        assert_eq!(stack.change_ids, ["qc", "qb", "qa"]);
        assert_eq!(stack.top_change_id, "qc");
        assert_eq!(stack.bottom_change_id, "qa");
        assert_eq!(stack.intermediate_change_ids, ["qb"]);
    }

    #[test]
    fn chain_of_two_is_no_stack() {
        // The root never joins a chain, so only [b, a] remains.
        let stacks = stacks_of(vec![rev("root", &[]), rev("a", &["root"]), rev("b", &["a"])]);
        assert!(stacks.is_empty());
    }

    #[test]
    fn pinned_commit_never_starts_a_stack() {
        let mut c = rev("c", &["b"]);
        c.is_working_copy = true;
        let stacks = stacks_of(vec![rev("root", &[]), rev("a", &["root"]), rev("b", &["a"]), c]);
        // c is pinned; b..a is too short.
        assert!(stacks.is_empty());
    }

    #[test]
    fn pinned_parent_closes_the_chain_as_bottom() {
        let mut b = rev("b", &["a"]);
        b.bookmarks.push("feature".to_string());
        let stacks = stacks_of(vec![
            rev("root", &[]),
            rev("a", &["root"]),
            b,
            rev("c", &["b"]),
            rev("d", &["c"]),
        ]);
        assert_eq!(stacks.len(), 1);
        let stack = &stacks[0];
        assert_eq!(stack.change_ids, ["qd", "qc", "qb"]);
        assert_eq!(stack.intermediate_change_ids, ["qc"]);
        // The pinned member is the visible bottom, never an intermediate.
        assert!(!stack.intermediate_change_ids.contains(&"qb".to_string()));
    }

    #[test]
    fn pinned_parent_without_enough_chain_stops_the_walk() {
        let mut b = rev("b", &["a"]);
        b.bookmarks.push("feature".to_string());
        let stacks =
            stacks_of(vec![rev("root", &[]), rev("a", &["root"]), b, rev("c", &["b"])]);
        assert!(stacks.is_empty());
    }

    #[test]
    fn immutable_parent_stops_the_walk() {
        let mut a = rev("a", &["root"]);
        a.is_immutable = true;
        let stacks = stacks_of(vec![
            rev("root", &[]),
            a,
            rev("b", &["a"]),
            rev("c", &["b"]),
            rev("d", &["c"]),
        ]);
        assert_eq!(stacks.len(), 1);
        assert_eq!(stacks[0].change_ids, ["qd", "qc", "qb"]);
    }

    #[test]
    fn ambiguous_merge_point_stops_the_walk() {
        // m's parents are both linear; the chain refuses to pick one.
        let revisions = vec![
            rev("root", &[]),
            rev("p1", &["root"]),
            rev("p2", &["root"]),
            rev("m", &["p1", "p2"]),
            rev("c", &["m"]),
            rev("d", &["c"]),
        ];
        let stacks = stacks_of(revisions);
        assert_eq!(stacks.len(), 1);
        assert_eq!(stacks[0].change_ids, ["qd", "qc", "qm"]);
    }

    #[test]
    fn stacks_never_overlap() {
        let revisions = vec![
            rev("root", &[]),
            rev("a", &["root"]),
            rev("b", &["a"]),
            rev("c", &["b"]),
            rev("d", &["c"]),
            rev("e", &["d"]),
            rev("f", &["e"]),
        ];
        let stacks = stacks_of(revisions);
        assert_eq!(stacks.len(), 1);

        let mut seen = HashSet::new();
        for stack in &stacks {
            assert!(stack.change_ids.len() >= 3);
            assert!(!stack.intermediate_change_ids.is_empty());
            for change_id in &stack.change_ids {
                assert!(seen.insert(change_id.clone()), "{change_id} in two stacks");
            }
        }
    }

    #[test]
    fn divergent_commit_is_never_an_intermediate() {
        let mut c = rev("c", &["b"]);
        c.is_divergent = true;
        c.divergent_index = Some(0);
        let stacks = stacks_of(vec![
            rev("root", &[]),
            rev("a", &["root"]),
            rev("b", &["a"]),
            c,
            rev("d", &["c"]),
            rev("e", &["d"]),
        ]);
        for stack in &stacks {
            assert!(!stack.intermediate_change_ids.contains(&"qc".to_string()));
        }
    }
}
