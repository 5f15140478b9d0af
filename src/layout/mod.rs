pub mod ancestry;
pub mod compose;
pub mod edges;
pub mod lanes;
pub mod order;
pub mod stacks;

pub use ancestry::Ancestry;
pub use compose::{compose_graph, GraphData, GraphLayout, StackState};
pub use edges::{EdgeBinding, GraphNode, ParentConnection};
pub use lanes::{GraphRow, LaneIdx, LaneLayout};
pub use order::{display_order, RecencyMap};
pub use stacks::{detect_stacks, RevisionStack};
