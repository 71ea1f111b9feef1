//! DAG node envelopes
//!
//! A [`TensorOpNode`] wraps a shared [`TensorOperation`] with the mutable
//! runtime state the graph tracks per vertex: status, wall-clock timings,
//! an opaque executor ticket, and error info. The graph owns the node
//! exclusively; the operation it carries is shared with the submitter.

use crate::op::TensorOperation;
use crate::tensor::VertexId;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Execution status of a DAG node.
///
/// The discriminants are a stable external contract: executors observe them
/// across the programmatic boundary and they do not change between builds.
///
/// Legal transitions:
/// Pending → Ready → Executing → Completed | Failed. Nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum NodeStatus {
    /// Submitted; some dependency is not yet Completed.
    Pending = 0,
    /// All dependencies Completed; available for claiming.
    Ready = 1,
    /// Claimed by an executor.
    Executing = 2,
    /// Finished successfully. Terminal.
    Completed = 3,
    /// Finished with an error. Terminal.
    Failed = 4,
}

impl NodeStatus {
    /// Stable numeric code of the status.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// TRUE iff `next` is a legal successor of this status.
    pub fn can_transition_to(&self, next: NodeStatus) -> bool {
        matches!(
            (self, next),
            (NodeStatus::Pending, NodeStatus::Ready)
                | (NodeStatus::Ready, NodeStatus::Executing)
                | (NodeStatus::Executing, NodeStatus::Completed)
                | (NodeStatus::Executing, NodeStatus::Failed)
        )
    }

    /// TRUE for Completed and Failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeStatus::Completed | NodeStatus::Failed)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeStatus::Pending => "Pending",
            NodeStatus::Ready => "Ready",
            NodeStatus::Executing => "Executing",
            NodeStatus::Completed => "Completed",
            NodeStatus::Failed => "Failed",
        };
        write!(f, "{}", s)
    }
}

/// A DAG node: a shared tensor operation plus its runtime state.
///
/// Snapshots of a node are cheap to clone — the operation itself is behind
/// an [`Arc`].
#[derive(Debug, Clone)]
pub struct TensorOpNode {
    /// Vertex id assigned at submission.
    pub id: VertexId,
    /// The operation this node carries, shared with the submitter.
    pub operation: Arc<TensorOperation>,
    /// Current execution status.
    pub status: NodeStatus,
    /// Opaque ticket assigned by the executor that claimed the node.
    pub executor_ticket: Option<u64>,
    /// When the node was appended to the graph.
    pub submitted_at: Instant,
    /// When the node entered Executing.
    pub started_at: Option<Instant>,
    /// When the node entered a terminal status.
    pub finished_at: Option<Instant>,
    /// Error recorded when the node Failed.
    pub error: Option<String>,
}

impl TensorOpNode {
    /// Wrap an operation in a fresh Pending node.
    pub fn new(id: VertexId, operation: Arc<TensorOperation>) -> Self {
        Self {
            id,
            operation,
            status: NodeStatus::Pending,
            executor_ticket: None,
            submitted_at: Instant::now(),
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// Wall-clock execution time, available once the node is terminal.
    pub fn execution_time(&self) -> Option<Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(finish)) => Some(finish.duration_since(start)),
            _ => None,
        }
    }
}

impl fmt::Display for TensorOpNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node {} [{}]: {}", self.id, self.status, self.operation)
    }
}
