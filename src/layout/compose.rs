use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::core::{Revision, Snapshot};
use crate::error::GraphError;

use super::ancestry::Ancestry;
use super::edges::{bind_edges, resolve_nodes, EdgeBinding, GraphNode};
use super::lanes::{assign_lanes, GraphRow};
use super::order::{display_order, RecencyMap};
use super::stacks::{detect_stacks, RevisionStack};

/// Which stacks the user has collapsed or explicitly expanded. Owned by the
/// UI and passed in on every call; the engine keeps no state between calls.
#[derive(Debug, Clone, Default)]
pub struct StackState {
    pub collapsed: HashSet<String>,
    pub expanded: HashSet<String>,
}

/// Everything the UI needs to draw the graph for one snapshot
#[derive(Debug, Clone, Serialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub rows: Vec<GraphRow>,
    pub lane_count: usize,
    pub edge_bindings: Vec<EdgeBinding>,
}

/// One complete layout result
#[derive(Debug, Clone, Serialize)]
pub struct GraphLayout {
    pub data: GraphData,
    pub stacks: Vec<RevisionStack>,
    /// Row order as plain revisions, for lane-free list views
    pub ordered: Vec<Revision>,
}

/// Runs the whole pipeline: ancestry, row order, lanes, stacks, nodes and
/// edge bindings. Pure and synchronous; every call recomputes from scratch.
///
/// An empty snapshot yields the empty shape with `lane_count` 1. The only
/// error is [`GraphError::CycleDetected`] from the row orderer.
pub fn compose_graph(
    snapshot: &Snapshot,
    recency: Option<&RecencyMap>,
    stack_state: &StackState,
) -> Result<GraphLayout, GraphError> {
    if snapshot.is_empty() {
        return Ok(GraphLayout {
            data: GraphData {
                nodes: Vec::new(),
                rows: Vec::new(),
                lane_count: 1,
                edge_bindings: Vec::new(),
            },
            stacks: Vec::new(),
            ordered: Vec::new(),
        });
    }

    let ancestry = Ancestry::resolve(snapshot);
    let order = display_order(snapshot, &ancestry, recency)?;
    let row_of: HashMap<String, usize> =
        order.iter().enumerate().map(|(row, id)| (id.clone(), row)).collect();

    let lane_layout = assign_lanes(snapshot, &order, &row_of);
    let stacks = detect_stacks(snapshot, &ancestry, &order);
    let nodes = resolve_nodes(snapshot, &order, &row_of, &lane_layout);

    let rows: Vec<GraphRow> = nodes
        .iter()
        .map(|node| GraphRow {
            revision: node.revision.clone(),
            lane: node.lane,
            max_lane_on_row: lane_layout.max_lane_on_row.get(node.row).copied().unwrap_or(node.lane),
        })
        .collect();

    let edge_bindings = bind_edges(
        &nodes,
        &stacks,
        snapshot,
        &stack_state.collapsed,
        &stack_state.expanded,
        &lane_layout.lanes,
    );
    let ordered: Vec<Revision> = nodes.iter().map(|node| node.revision.clone()).collect();

    debug!(
        revisions = snapshot.len(),
        lane_count = lane_layout.lane_count,
        stacks = stacks.len(),
        bindings = edge_bindings.len(),
        "graph layout computed"
    );

    Ok(GraphLayout {
        data: GraphData { nodes, rows, lane_count: lane_layout.lane_count, edge_bindings },
        stacks,
        ordered,
    })
}
