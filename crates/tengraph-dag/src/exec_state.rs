//! DAG execution state
//!
//! [`ExecutionState`] tracks, per tensor, the epoch used to derive dependency
//! edges, and per node, the execution status. An epoch is either a *write
//! epoch* (a single writer vertex) or a *read epoch* (a non-empty set of
//! reader vertices):
//!
//! - a tensor has no entry until the first operation referencing it,
//! - a write registration replaces the epoch with a fresh write epoch holding
//!   only that writer,
//! - a read registration appends to a read epoch, or replaces a write epoch
//!   with a read epoch holding only that reader.
//!
//! The state is not internally synchronized: the owning
//! [`TensorGraph`](crate::TensorGraph) guards it together with the adjacency
//! structure under one lock, which is what makes epoch registration atomic
//! with respect to dependency derivation.

use std::collections::HashMap;
use tengraph_core::{CoreError, NodeStatus, TensorRef, VertexId};

/// Kind of the current epoch of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochKind {
    /// A single writer holds the tensor.
    Write,
    /// One or more readers hold the tensor.
    Read,
}

#[derive(Debug, Clone)]
enum TensorEpoch {
    Write(VertexId),
    Read(Vec<VertexId>),
}

/// Per-tensor epoch table and per-node status table.
#[derive(Debug, Default)]
pub struct ExecutionState {
    /// Tensor identity hash → current epoch.
    epochs: HashMap<u64, TensorEpoch>,
    /// Node status, indexed by vertex id (ids are dense).
    statuses: Vec<NodeStatus>,
}

impl ExecutionState {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking the next vertex as Pending. Ids are dense and assigned
    /// in submission order, so `vertex` must equal the current count.
    pub(crate) fn track_node(&mut self, vertex: VertexId) -> Result<(), CoreError> {
        if vertex != self.statuses.len() {
            return Err(CoreError::InvariantViolation(format!(
                "vertex {} tracked out of order (expected {})",
                vertex,
                self.statuses.len()
            )));
        }
        self.statuses.push(NodeStatus::Pending);
        Ok(())
    }

    /// Replace the epoch of `tensor` with a write epoch holding `vertex`.
    pub fn register_write(&mut self, tensor: &TensorRef, vertex: VertexId) {
        self.epochs
            .insert(tensor.identity_hash(), TensorEpoch::Write(vertex));
    }

    /// Register `vertex` as a reader of `tensor`: joins the current read
    /// epoch, or opens a fresh one if the tensor is unseen or being written.
    pub fn register_read(&mut self, tensor: &TensorRef, vertex: VertexId) {
        let slot = self
            .epochs
            .entry(tensor.identity_hash())
            .or_insert_with(|| TensorEpoch::Read(Vec::new()));
        match slot {
            TensorEpoch::Read(readers) => {
                // The epoch is a set: a vertex reading a tensor through two
                // operand slots joins it once
                if !readers.contains(&vertex) {
                    readers.push(vertex);
                }
            }
            TensorEpoch::Write(_) => *slot = TensorEpoch::Read(vec![vertex]),
        }
    }

    /// The current epoch of `tensor`: its kind and member vertices, or None
    /// if the tensor is unseen.
    pub fn epoch_nodes(&self, tensor: &TensorRef) -> Option<(EpochKind, Vec<VertexId>)> {
        match self.epochs.get(&tensor.identity_hash()) {
            Some(TensorEpoch::Write(writer)) => Some((EpochKind::Write, vec![*writer])),
            Some(TensorEpoch::Read(readers)) => Some((EpochKind::Read, readers.clone())),
            None => None,
        }
    }

    /// Status of a node, or None for an unknown vertex.
    pub fn status(&self, vertex: VertexId) -> Option<NodeStatus> {
        self.statuses.get(vertex).copied()
    }

    /// Transition a node's status, enforcing the legal state machine
    /// (Pending → Ready → Executing → Completed | Failed).
    pub fn update_status(&mut self, vertex: VertexId, next: NodeStatus) -> Result<(), CoreError> {
        let current = self
            .statuses
            .get_mut(vertex)
            .ok_or_else(|| CoreError::NotFound(format!("vertex {}", vertex)))?;
        if !current.can_transition_to(next) {
            return Err(CoreError::InvariantViolation(format!(
                "illegal status transition {} -> {} on vertex {}",
                current, next, vertex
            )));
        }
        *current = next;
        Ok(())
    }

    /// Number of tracked nodes.
    pub fn num_nodes(&self) -> usize {
        self.statuses.len()
    }

    /// Number of tensors with a live epoch entry.
    pub fn num_tensors(&self) -> usize {
        self.epochs.len()
    }

    /// Discard all epoch and status entries. Safe only when no other
    /// component holds vertex ids.
    pub fn clear(&mut self) {
        self.epochs.clear();
        self.statuses.clear();
    }
}
