pub mod core;
pub mod error;
pub mod layout;

pub use self::core::{ParentEdge, ParentEdgeType, Revision, Snapshot};
pub use error::GraphError;
pub use layout::{
    compose_graph, display_order, Ancestry, EdgeBinding, GraphData, GraphLayout, GraphNode,
    GraphRow, LaneIdx, ParentConnection, RecencyMap, RevisionStack, StackState,
};
