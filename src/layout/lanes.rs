use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::core::{Revision, Snapshot};

/// A lane is a vertical column in the rendered graph
pub type LaneIdx = usize;

/// One visible row: a revision, its lane, and the highest lane any edge
/// touches while crossing this row.
#[derive(Debug, Clone, Serialize)]
pub struct GraphRow {
    pub revision: Revision,
    pub lane: LaneIdx,
    pub max_lane_on_row: LaneIdx,
}

/// Lane assignment for one computed row order
#[derive(Debug, Clone, Default)]
pub struct LaneLayout {
    /// commit id -> assigned lane
    pub lanes: HashMap<String, LaneIdx>,
    /// Per row, the highest occupied lane
    pub max_lane_on_row: Vec<LaneIdx>,
    /// 1 + highest assigned lane, never zero
    pub lane_count: usize,
}

/// Assigns lanes and computes per-row occupancy.
///
/// Lane policy: commits on the primary chain (the working copy's first-parent
/// ancestry) or flagged as trunk sit on lane 0, everything else on lane 1.
/// Occupancy uses a sweep line over edge intervals rather than per-row
/// overlap scans, so the whole pass is O(n log n).
pub fn assign_lanes(
    snapshot: &Snapshot,
    order: &[String],
    row_of: &HashMap<String, usize>,
) -> LaneLayout {
    if order.is_empty() {
        return LaneLayout { lanes: HashMap::new(), max_lane_on_row: Vec::new(), lane_count: 1 };
    }

    let primary = primary_chain(snapshot, order);

    let mut lanes: HashMap<String, LaneIdx> = HashMap::with_capacity(order.len());
    let mut max_assigned = 0;
    for commit_id in order {
        let lane = match snapshot.get(commit_id) {
            Some(rev) if rev.is_trunk || primary.contains(commit_id.as_str()) => 0,
            Some(_) => 1,
            None => continue,
        };
        max_assigned = max_assigned.max(lane);
        lanes.insert(commit_id.clone(), lane);
    }
    let lane_count = max_assigned + 1;

    // Baseline occupancy is each row's own node lane; cross-lane edges add a
    // point update at their source row for both lanes they touch.
    let mut row_max: Vec<LaneIdx> =
        order.iter().map(|id| lanes.get(id).copied().unwrap_or(0)).collect();

    // Half-open intervals [child_row + 1, parent_row) on the target lane for
    // every edge spanning more than one row.
    let mut events: Vec<(usize, LaneIdx, isize)> = Vec::new();
    for commit_id in order {
        let Some(rev) = snapshot.get(commit_id) else { continue };
        let Some(&child_row) = row_of.get(commit_id) else { continue };
        let child_lane = lanes.get(commit_id).copied().unwrap_or(0);

        for edge in snapshot.visible_parents(rev) {
            let Some(&parent_row) = row_of.get(&edge.parent_id) else { continue };
            let parent_lane = lanes.get(&edge.parent_id).copied().unwrap_or(0);
            if parent_row > child_row + 1 {
                events.push((child_row + 1, parent_lane, 1));
                events.push((parent_row, parent_lane, -1));
            }
            if parent_lane != child_lane {
                row_max[child_row] = row_max[child_row].max(parent_lane.max(child_lane));
            }
        }
    }
    events.sort_unstable_by_key(|&(row, _, delta)| (row, delta));

    let mut active = vec![0isize; lane_count];
    let mut next = 0;
    for (row, entry) in row_max.iter_mut().enumerate() {
        while next < events.len() && events[next].0 == row {
            let (_, lane, delta) = events[next];
            active[lane] += delta;
            next += 1;
        }
        for lane in (0..lane_count).rev() {
            if active[lane] > 0 {
                *entry = (*entry).max(lane);
                break;
            }
        }
    }

    LaneLayout { lanes, max_lane_on_row: row_max, lane_count }
}

/// Follow the working copy's first visible parent edge repeatedly. Without a
/// working copy the chain starts at the topmost row instead.
fn primary_chain<'a>(snapshot: &'a Snapshot, order: &'a [String]) -> HashSet<&'a str> {
    let seed = snapshot
        .working_copy()
        .map(|r| r.commit_id.as_str())
        .or_else(|| order.first().map(|id| id.as_str()));

    let mut chain: HashSet<&str> = HashSet::new();
    let mut current = seed;
    while let Some(commit_id) = current {
        if !chain.insert(commit_id) {
            break;
        }
        current = snapshot
            .get(commit_id)
            .and_then(|rev| snapshot.visible_parents(rev).next())
            .map(|edge| edge.parent_id.as_str());
    }
    chain
}
