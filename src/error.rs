use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The snapshot violates the DAG precondition. The row order cannot be
    /// produced; cycle members are the revisions left unemitted.
    #[error("revision graph contains a cycle: emitted {emitted} of {total} revisions")]
    CycleDetected { emitted: usize, total: usize },
}
