use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::core::{Revision, Snapshot};
use crate::error::GraphError;

use super::ancestry::Ancestry;

/// Optional oracle from commit id to last-touched time, used only to rank
/// branch heads against each other.
pub type RecencyMap = HashMap<String, DateTime<Utc>>;

/// Computes the row order: a topological order where every child precedes
/// its parents and each branch is emitted in full before an unrelated
/// branch starts.
///
/// Head priority: the branch holding the working copy first, then branch
/// recency (max recency over the head and its ancestors) descending, then
/// change id. A commit shared by several branches is emitted only once its
/// last unemitted child has been emitted.
///
/// Fails with [`GraphError::CycleDetected`] when the snapshot is not a DAG;
/// the counter bookkeeping would silently drop cycle members otherwise.
pub fn display_order(
    snapshot: &Snapshot,
    ancestry: &Ancestry,
    recency: Option<&RecencyMap>,
) -> Result<Vec<String>, GraphError> {
    if snapshot.is_empty() {
        return Ok(Vec::new());
    }

    let mut heads: Vec<&Revision> = snapshot
        .iter()
        .filter(|r| ancestry.children_of(&r.commit_id).is_empty())
        .collect();

    let wc_id = snapshot.working_copy().map(|r| r.commit_id.clone());
    heads.sort_by_cached_key(|head| {
        let on_wc_branch = match &wc_id {
            Some(wc) => head.commit_id == *wc || ancestry.is_ancestor(wc, &head.commit_id),
            None => false,
        };
        (
            !on_wc_branch,
            Reverse(branch_recency(head, ancestry, recency)),
            head.change_id.clone(),
        )
    });

    // Remaining visible children per commit; a commit becomes ready when
    // its counter drains to zero.
    let mut pending: HashMap<&str, usize> = snapshot
        .iter()
        .map(|r| (r.commit_id.as_str(), ancestry.children_of(&r.commit_id).len()))
        .collect();

    let mut order: Vec<String> = Vec::with_capacity(snapshot.len());
    let mut stack: Vec<&str> = Vec::new();

    for head in &heads {
        stack.push(head.commit_id.as_str());
        while let Some(commit_id) = stack.pop() {
            order.push(commit_id.to_string());
            // Reversed so the first parent is explored first.
            for parent_id in ancestry.parents_of(commit_id).iter().rev() {
                if let Some(count) = pending.get_mut(parent_id.as_str()) {
                    *count -= 1;
                    if *count == 0 {
                        stack.push(parent_id);
                    }
                }
            }
        }
    }

    if order.len() != snapshot.len() {
        return Err(GraphError::CycleDetected { emitted: order.len(), total: snapshot.len() });
    }
    Ok(order)
}

/// Newest recency-map entry over the head and everything it reaches
fn branch_recency(
    head: &Revision,
    ancestry: &Ancestry,
    recency: Option<&RecencyMap>,
) -> i64 {
    let Some(map) = recency else { return i64::MIN };
    let mut best = map.get(&head.commit_id).map(|t| t.timestamp_millis()).unwrap_or(i64::MIN);
    if let Some(ancestors) = ancestry.ancestors_of(&head.commit_id) {
        for id in ancestors {
            if let Some(t) = map.get(id) {
                best = best.max(t.timestamp_millis());
            }
        }
    }
    best
}
