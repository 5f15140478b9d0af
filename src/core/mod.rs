pub mod revision;
pub mod snapshot;

pub use revision::{ParentEdge, ParentEdgeType, Revision};
pub use snapshot::Snapshot;
