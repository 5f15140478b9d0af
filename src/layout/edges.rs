use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::core::{ParentEdgeType, Revision, Snapshot};

use super::lanes::{LaneIdx, LaneLayout};
use super::stacks::RevisionStack;

/// One visible parent of a node, resolved against the computed rows.
/// `row` is `None` exactly for missing-parent stubs.
#[derive(Debug, Clone, Serialize)]
pub struct ParentConnection {
    pub parent_id: String,
    pub row: Option<usize>,
    pub lane: LaneIdx,
    pub edge_type: ParentEdgeType,
    pub deemphasized: bool,
    pub missing: bool,
}

/// A row's revision together with its resolved parent connections
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub revision: Revision,
    pub row: usize,
    pub lane: LaneIdx,
    pub parents: Vec<ParentConnection>,
}

/// A drawable edge between two rows.
///
/// `collapsed_stack_id`/`collapsed_count` mark edges rerouted around a
/// collapsed stack; `expanded_stack_id` marks edges interior to an expanded
/// one, so the UI can offer recollapsing from the edge itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeBinding {
    pub source: String,
    pub target: String,
    pub source_lane: LaneIdx,
    pub target_lane: LaneIdx,
    pub edge_type: ParentEdgeType,
    pub deemphasized: bool,
    pub missing_stub: bool,
    pub collapsed_stack_id: Option<String>,
    pub collapsed_count: Option<usize>,
    pub expanded_stack_id: Option<String>,
}

/// Resolves every parent edge of every row into a [`ParentConnection`].
///
/// Missing parents (and unreferenced ones, treated alike) become stubs on
/// the node's own lane. An edge from a mutable merge to an immutable parent
/// is deemphasized unless that parent is the first-listed visible one, which
/// keeps the mainline edge dominant when trunk was merged into a feature.
pub fn resolve_nodes(
    snapshot: &Snapshot,
    order: &[String],
    row_of: &HashMap<String, usize>,
    lanes: &LaneLayout,
) -> Vec<GraphNode> {
    let mut nodes = Vec::with_capacity(order.len());

    for commit_id in order {
        let Some(rev) = snapshot.get(commit_id) else { continue };
        let Some(&row) = row_of.get(commit_id) else { continue };
        let lane = lanes.lanes.get(commit_id).copied().unwrap_or(0);

        let visible_count = snapshot.visible_parents(rev).count();
        let first_visible =
            snapshot.visible_parents(rev).next().map(|e| e.parent_id.clone());

        let mut parents = Vec::with_capacity(rev.parents.len());
        for edge in &rev.parents {
            let resolved = edge.edge_type != ParentEdgeType::Missing
                && snapshot.contains(&edge.parent_id);
            if !resolved {
                parents.push(ParentConnection {
                    parent_id: edge.parent_id.clone(),
                    row: None,
                    lane,
                    edge_type: ParentEdgeType::Missing,
                    deemphasized: false,
                    missing: true,
                });
                continue;
            }

            let parent_rev = snapshot.get(&edge.parent_id);
            let deemphasized = visible_count > 1
                && !rev.is_immutable
                && parent_rev.is_some_and(|p| p.is_immutable)
                && first_visible.as_deref() != Some(edge.parent_id.as_str());
            parents.push(ParentConnection {
                parent_id: edge.parent_id.clone(),
                row: row_of.get(&edge.parent_id).copied(),
                lane: lanes.lanes.get(&edge.parent_id).copied().unwrap_or(0),
                edge_type: edge.edge_type,
                deemphasized,
                missing: false,
            });
        }

        nodes.push(GraphNode { revision: rev.clone(), row, lane, parents });
    }

    nodes
}

/// Emits one binding per connection, then remaps for the current
/// collapsed/expanded stack set and removes duplicate `(source, target)`
/// pairs. Recomputed in full whenever the stack set changes.
pub fn bind_edges(
    nodes: &[GraphNode],
    stacks: &[RevisionStack],
    snapshot: &Snapshot,
    collapsed: &HashSet<String>,
    expanded: &HashSet<String>,
    lanes: &HashMap<String, LaneIdx>,
) -> Vec<EdgeBinding> {
    // Intermediate commit -> (stack bottom commit, stack id, hidden count).
    let mut reroute: HashMap<String, (String, String, usize)> = HashMap::new();
    // Member commit -> expanded stack id.
    let mut expanded_member: HashMap<String, String> = HashMap::new();

    for stack in stacks {
        if collapsed.contains(&stack.id) {
            let Some(bottom) = snapshot.get_by_change(&stack.bottom_change_id) else { continue };
            for change_id in &stack.intermediate_change_ids {
                if let Some(member) = snapshot.get_by_change(change_id) {
                    reroute.insert(
                        member.commit_id.clone(),
                        (
                            bottom.commit_id.clone(),
                            stack.id.clone(),
                            stack.intermediate_change_ids.len(),
                        ),
                    );
                }
            }
        }
        if expanded.contains(&stack.id) {
            for change_id in &stack.change_ids {
                if let Some(member) = snapshot.get_by_change(change_id) {
                    expanded_member.insert(member.commit_id.clone(), stack.id.clone());
                }
            }
        }
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut bindings = Vec::new();

    for node in nodes {
        // Edges out of a hidden intermediate are drawn by the collapsed
        // element itself, not individually.
        if reroute.contains_key(&node.revision.commit_id) {
            continue;
        }
        for conn in &node.parents {
            let mut binding = EdgeBinding {
                source: node.revision.commit_id.clone(),
                target: conn.parent_id.clone(),
                source_lane: node.lane,
                target_lane: conn.lane,
                edge_type: conn.edge_type,
                deemphasized: conn.deemphasized,
                missing_stub: conn.missing,
                collapsed_stack_id: None,
                collapsed_count: None,
                expanded_stack_id: None,
            };

            if let Some((bottom, stack_id, hidden)) = reroute.get(&binding.target) {
                binding.target = bottom.clone();
                binding.target_lane = lanes.get(bottom).copied().unwrap_or(binding.target_lane);
                binding.collapsed_stack_id = Some(stack_id.clone());
                binding.collapsed_count = Some(*hidden);
            }

            if let (Some(source_stack), Some(target_stack)) = (
                expanded_member.get(&binding.source),
                expanded_member.get(&binding.target),
            ) {
                if source_stack == target_stack {
                    binding.expanded_stack_id = Some(source_stack.clone());
                }
            }

            if seen.insert((binding.source.clone(), binding.target.clone())) {
                bindings.push(binding);
            }
        }
    }

    bindings
}
