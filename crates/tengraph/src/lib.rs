//! # TenGraph
//!
//! A numerical tensor-algebra runtime core: a thread-safe DAG of tensor
//! operations with dependency tracking derived from tensor read/write sets,
//! and a tensor-network contraction-sequence optimizer.
//!
//! This is the meta crate re-exporting all TenGraph components:
//!
//! - [`core`] — tensor identity, operations, node envelopes, status codes
//! - [`dag`] — the append-only operation DAG and its execution state
//! - [`planner`] — tensor networks, cost model, contraction-sequence
//!   optimizers, and the optimizer factory
//! - [`lower`] — the glue that turns an optimized contraction sequence into
//!   operations submitted to a graph
//!
//! ## Quick Start
//!
//! Lower a tensor network into the DAG and drive it like an executor would:
//!
//! ```
//! use tengraph::prelude::*;
//!
//! // T0[il] = T1[ij] * T2[jk] * T3[kl]
//! let network = TensorNetwork::from_subscripts(
//!     "ij,jk,kl->il",
//!     &[vec![2, 3], vec![3, 4], vec![4, 5]],
//! ).unwrap();
//!
//! let graph = TensorGraph::new();
//! let submitted = submit_network(&graph, &network, "heuro", ElementType::F64).unwrap();
//! assert_eq!(submitted.len(), 2);
//!
//! // The second contraction consumes the first one's intermediate
//! assert!(graph.dependency_exists(submitted[1], submitted[0]));
//!
//! // Executor loop: claim ready nodes, report completion
//! while let Some(&vertex) = graph.frontier().first() {
//!     graph.mark_executing(vertex).unwrap();
//!     graph.mark_completed(vertex).unwrap();
//! }
//! assert_eq!(graph.node_status(submitted[1]), Some(NodeStatus::Completed));
//! ```

pub use tengraph_core as core;
pub use tengraph_dag as dag;
pub use tengraph_planner as planner;

pub mod lower;

/// Convenient single-import surface.
pub mod prelude {
    pub use crate::lower::{lower_sequence, submit_network};
    pub use tengraph_core::{
        CoreError, ElementType, NodeStatus, TensorOpCode, TensorOpNode, TensorOperation,
        TensorRef, VertexId,
    };
    pub use tengraph_dag::{EpochKind, ExecutionState, ShortestPaths, TensorGraph};
    pub use tengraph_planner::{
        contraction_cost, create_optimizer, evaluate_sequence, register_optimizer,
        result_volume, ContrTriple, ContractionPlan, ContractionSeqOptimizer, DummyOptimizer,
        GreedyOptimizer, HeuroOptimizer, Leg, NetworkTensor, PartitionOptimizer, TensorNetwork,
    };
}
