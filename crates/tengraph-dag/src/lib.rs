//! # tengraph-dag
//!
//! A dynamically growing directed acyclic graph of tensor operations.
//!
//! Vertices are submitted [`TensorOperation`](tengraph_core::TensorOperation)s
//! wrapped in [`TensorOpNode`](tengraph_core::TensorOpNode) envelopes; a
//! directed edge from node `u` to node `v` means `u` depends on `v` and may
//! not execute before `v` completes. Edges are derived automatically from the
//! read/write sets of each operation's tensor operands, tracked per tensor in
//! an epoch table ([`ExecutionState`]):
//!
//! - a write after anything orders behind the tensor's whole current epoch
//!   (write-after-write and write-after-read),
//! - a read after a write orders behind the current writer (read-after-write),
//! - reads of the same tensor never order against each other.
//!
//! This yields the minimum edge set enforcing sequential-memory semantics on
//! each tensor.
//!
//! The graph is append-only: nodes and edges are only removed by a global
//! [`clear`](TensorGraph::clear). Because edges always point from a newly
//! appended node to already-present nodes, acyclicity holds by construction
//! and vertex ids form a linear extension of the dependency order.
//!
//! [`TensorGraph`] presents a thread-safe façade guarded by a single
//! `parking_lot::Mutex` over the adjacency structure and the execution state;
//! no operation blocks on I/O or waits on other operations.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use tengraph_core::{ElementType, TensorOperation, TensorRef};
//! use tengraph_dag::TensorGraph;
//!
//! let graph = TensorGraph::new();
//! let t = TensorRef::new("T", &[8, 8], ElementType::F64);
//!
//! let v1 = graph.add_operation(Arc::new(TensorOperation::assign(t.clone()))).unwrap();
//! let v2 = graph.add_operation(Arc::new(TensorOperation::assign(t))).unwrap();
//!
//! // Write-after-write: v2 depends on v1
//! assert!(graph.dependency_exists(v2, v1));
//! assert_eq!(graph.frontier(), vec![v1]);
//! ```

pub mod exec_state;
pub mod graph;

pub use exec_state::{EpochKind, ExecutionState};
pub use graph::{ShortestPaths, TensorGraph};
