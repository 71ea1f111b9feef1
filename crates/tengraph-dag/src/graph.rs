//! The tensor-operation DAG
//!
//! [`TensorGraph`] is an append-only directed acyclic graph of
//! [`TensorOpNode`]s. A directed edge from `u` to `v` means `u` depends on
//! `v`. All public methods take `&self`: one mutex guards the adjacency
//! structure and the [`ExecutionState`] together, so every observer sees a
//! consistent snapshot and epoch registration is atomic with respect to
//! dependency derivation. Lock holding time is bounded by work proportional
//! to the touched operand and epoch set sizes.

use crate::exec_state::{EpochKind, ExecutionState};
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;
use tengraph_core::{CoreError, NodeStatus, TensorOpNode, TensorOperation, TensorRef, VertexId};

/// Result of a single-source shortest-path computation over the DAG.
///
/// Entries are indexed by vertex id. Unreachable vertices have infinite
/// distance and themselves as parent.
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    /// Cheapest cumulative edge weight from the source to each vertex.
    pub distances: Vec<f64>,
    /// Predecessor of each vertex on its cheapest path.
    pub parents: Vec<VertexId>,
}

/// Everything the graph mutates, guarded by one lock.
#[derive(Default)]
struct GraphInner {
    nodes: Vec<TensorOpNode>,
    /// adjacency[u] lists (dependee, edge weight) pairs in insertion order.
    adjacency: Vec<Vec<(VertexId, f64)>>,
    num_edges: usize,
    exec: ExecutionState,
}

impl GraphInner {
    /// Add the edge dependent → dependee if absent. Self-edges are skipped.
    /// The weight is the dependee's estimated execution cost.
    fn link(&mut self, dependent: VertexId, dependee: VertexId) {
        if dependent == dependee {
            return;
        }
        if self.adjacency[dependent].iter().any(|&(d, _)| d == dependee) {
            return;
        }
        let weight = self.nodes[dependee].operation.flop_estimate();
        self.adjacency[dependent].push((dependee, weight));
        self.num_edges += 1;
    }

    /// Transition a node's status, keeping the node envelope and the status
    /// table in step.
    fn set_status(&mut self, vertex: VertexId, status: NodeStatus) -> Result<(), CoreError> {
        self.exec.update_status(vertex, status)?;
        self.nodes[vertex].status = status;
        Ok(())
    }
}

/// Thread-safe, append-only DAG of tensor operations.
///
/// Nodes are created by [`add_operation`](TensorGraph::add_operation) and
/// destroyed only by [`clear`](TensorGraph::clear). Edges are derived from
/// tensor read/write epochs on append, or added explicitly with
/// [`add_dependency`](TensorGraph::add_dependency).
pub struct TensorGraph {
    inner: Mutex<GraphInner>,
}

impl TensorGraph {
    /// Empty graph.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(GraphInner::default()),
        }
    }

    /// Append a node carrying `operation` and derive its dependency edges,
    /// returning the new vertex id.
    ///
    /// For output tensor `t0` and inputs `t1..tk`:
    /// - an edge is added to every member of `t0`'s current epoch
    ///   (write-after-write or write-after-read), then the node becomes
    ///   `t0`'s writer;
    /// - for each input, an edge is added to the current writer if the
    ///   input's epoch is a write epoch (read-after-write), then the node
    ///   joins the input's readers.
    ///
    /// The new node is Pending and every required edge exists exactly once.
    /// Submitting an operation that is not fully set is an
    /// [`InvariantViolation`](CoreError::InvariantViolation).
    pub fn add_operation(&self, operation: Arc<TensorOperation>) -> Result<VertexId, CoreError> {
        if !operation.is_set() {
            return Err(CoreError::InvariantViolation(format!(
                "operation {} submitted with {}/{} operands set",
                operation.opcode(),
                operation.num_operands_set(),
                operation.num_operands()
            )));
        }
        let output = operation
            .output()
            .ok_or_else(|| {
                CoreError::InvariantViolation("operation has no output operand".into())
            })?
            .clone();

        let mut g = self.inner.lock();
        let vertex = g.nodes.len();
        g.exec.track_node(vertex)?;
        g.adjacency.push(Vec::new());
        g.nodes.push(TensorOpNode::new(vertex, operation.clone()));

        if let Some((_, previous)) = g.exec.epoch_nodes(&output) {
            for dependee in previous {
                g.link(vertex, dependee);
            }
        }
        g.exec.register_write(&output, vertex);

        for input in operation.inputs() {
            if let Some((EpochKind::Write, previous)) = g.exec.epoch_nodes(input) {
                for dependee in previous {
                    g.link(vertex, dependee);
                }
            }
            g.exec.register_read(input, vertex);
        }

        Ok(vertex)
    }

    /// Add the edge `dependent → dependee` if absent.
    ///
    /// Fails with an [`InvariantViolation`](CoreError::InvariantViolation) if
    /// the edge would create a cycle. Ids increase monotonically with
    /// insertion, so `dependee < dependent` is the complete acyclicity check.
    pub fn add_dependency(
        &self,
        dependent: VertexId,
        dependee: VertexId,
    ) -> Result<(), CoreError> {
        let mut g = self.inner.lock();
        let count = g.nodes.len();
        if dependent >= count || dependee >= count {
            return Err(CoreError::NotFound(format!(
                "edge {} -> {} references a vertex outside the graph of {} nodes",
                dependent, dependee, count
            )));
        }
        if dependee >= dependent {
            return Err(CoreError::InvariantViolation(format!(
                "edge {} -> {} would create a cycle",
                dependent, dependee
            )));
        }
        g.link(dependent, dependee);
        Ok(())
    }

    /// TRUE iff the direct edge `dependent → dependee` exists.
    pub fn dependency_exists(&self, dependent: VertexId, dependee: VertexId) -> bool {
        let g = self.inner.lock();
        g.adjacency
            .get(dependent)
            .map(|edges| edges.iter().any(|&(d, _)| d == dependee))
            .unwrap_or(false)
    }

    /// Number of outgoing edges (dependencies) of a vertex; 0 for an unknown
    /// vertex.
    pub fn node_degree(&self, vertex: VertexId) -> usize {
        let g = self.inner.lock();
        g.adjacency.get(vertex).map(Vec::len).unwrap_or(0)
    }

    /// Total number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.inner.lock().nodes.len()
    }

    /// Total number of dependency edges.
    pub fn num_dependencies(&self) -> usize {
        self.inner.lock().num_edges
    }

    /// Direct dependencies of a vertex in insertion order; empty for an
    /// unknown vertex.
    pub fn neighbor_list(&self, vertex: VertexId) -> Vec<VertexId> {
        let g = self.inner.lock();
        g.adjacency
            .get(vertex)
            .map(|edges| edges.iter().map(|&(d, _)| d).collect())
            .unwrap_or_default()
    }

    /// Snapshot of a node's envelope (the operation is shared via `Arc`, so
    /// the clone is cheap); None for an unknown vertex.
    pub fn node_properties(&self, vertex: VertexId) -> Option<TensorOpNode> {
        self.inner.lock().nodes.get(vertex).cloned()
    }

    /// The operation carried by a vertex.
    pub fn operation(&self, vertex: VertexId) -> Option<Arc<TensorOperation>> {
        self.inner
            .lock()
            .nodes
            .get(vertex)
            .map(|n| n.operation.clone())
    }

    /// Current status of a vertex.
    pub fn node_status(&self, vertex: VertexId) -> Option<NodeStatus> {
        self.inner.lock().exec.status(vertex)
    }

    /// The current epoch of a tensor in the execution state: its kind and
    /// member vertices, or None if no submitted operation referenced it.
    pub fn epoch_nodes(&self, tensor: &TensorRef) -> Option<(EpochKind, Vec<VertexId>)> {
        self.inner.lock().exec.epoch_nodes(tensor)
    }

    /// Record that an executor claimed the node: Ready → Executing.
    pub fn mark_executing(&self, vertex: VertexId) -> Result<(), CoreError> {
        let mut g = self.inner.lock();
        g.set_status(vertex, NodeStatus::Executing)?;
        g.nodes[vertex].started_at = Some(Instant::now());
        Ok(())
    }

    /// Attach the claiming executor's opaque ticket to a node.
    pub fn set_executor_ticket(&self, vertex: VertexId, ticket: u64) -> Result<(), CoreError> {
        let mut g = self.inner.lock();
        let node = g
            .nodes
            .get_mut(vertex)
            .ok_or_else(|| CoreError::NotFound(format!("vertex {}", vertex)))?;
        node.executor_ticket = Some(ticket);
        Ok(())
    }

    /// Record successful completion: Executing → Completed.
    pub fn mark_completed(&self, vertex: VertexId) -> Result<(), CoreError> {
        let mut g = self.inner.lock();
        g.set_status(vertex, NodeStatus::Completed)?;
        g.nodes[vertex].finished_at = Some(Instant::now());
        Ok(())
    }

    /// Record an execution failure: Executing → Failed, storing the error on
    /// the node. Dependents stay Pending; failure does not cascade.
    pub fn mark_failed(&self, vertex: VertexId, error: impl Into<String>) -> Result<(), CoreError> {
        let mut g = self.inner.lock();
        g.set_status(vertex, NodeStatus::Failed)?;
        g.nodes[vertex].finished_at = Some(Instant::now());
        g.nodes[vertex].error = Some(error.into());
        Ok(())
    }

    /// The dependency-free frontier: every Pending node whose dependencies
    /// are all Completed is promoted to Ready, and all currently-Ready nodes
    /// are returned in id order.
    ///
    /// Derived from status on demand; repeated calls return unclaimed Ready
    /// nodes again until an executor marks them Executing.
    pub fn frontier(&self) -> Vec<VertexId> {
        let mut g = self.inner.lock();
        let mut ready = Vec::new();
        for vertex in 0..g.nodes.len() {
            match g.exec.status(vertex) {
                Some(NodeStatus::Ready) => ready.push(vertex),
                Some(NodeStatus::Pending) => {
                    let unblocked = g.adjacency[vertex]
                        .iter()
                        .all(|&(dep, _)| g.exec.status(dep) == Some(NodeStatus::Completed));
                    if unblocked && g.set_status(vertex, NodeStatus::Ready).is_ok() {
                        ready.push(vertex);
                    }
                }
                _ => {}
            }
        }
        ready
    }

    /// Single-source shortest paths over the dependency edges (binary-heap
    /// Dijkstra; weights are the dependees' estimated execution costs, so
    /// graph executors can prioritize expensive chains).
    pub fn shortest_path(&self, source: VertexId) -> Result<ShortestPaths, CoreError> {
        let g = self.inner.lock();
        let count = g.nodes.len();
        if source >= count {
            return Err(CoreError::NotFound(format!("vertex {}", source)));
        }

        let mut distances = vec![f64::INFINITY; count];
        let mut parents: Vec<VertexId> = (0..count).collect();
        distances[source] = 0.0;

        let mut heap = BinaryHeap::new();
        heap.push(HeapEntry {
            distance: 0.0,
            vertex: source,
        });

        while let Some(HeapEntry { distance, vertex }) = heap.pop() {
            if distance > distances[vertex] {
                continue; // stale entry
            }
            for &(next, weight) in &g.adjacency[vertex] {
                let candidate = distance + weight;
                if candidate < distances[next] {
                    distances[next] = candidate;
                    parents[next] = vertex;
                    heap.push(HeapEntry {
                        distance: candidate,
                        vertex: next,
                    });
                }
            }
        }

        Ok(ShortestPaths { distances, parents })
    }

    /// Diagnostic listing of every node, its status, and its dependencies.
    pub fn dump(&self) -> String {
        let g = self.inner.lock();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Tensor operation DAG: {} nodes, {} dependencies",
            g.nodes.len(),
            g.num_edges
        );
        for node in &g.nodes {
            let deps: Vec<String> = g.adjacency[node.id]
                .iter()
                .map(|(d, _)| d.to_string())
                .collect();
            let _ = writeln!(out, "{} depends on {{{}}}", node, deps.join(", "));
        }
        out
    }

    /// Drop every node, edge, and epoch entry at once.
    pub fn clear(&self) {
        let mut g = self.inner.lock();
        log::debug!(
            "clearing tensor graph: dropping {} nodes and {} dependencies",
            g.nodes.len(),
            g.num_edges
        );
        g.nodes.clear();
        g.adjacency.clear();
        g.num_edges = 0;
        g.exec.clear();
    }
}

impl Default for TensorGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TensorGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dump())
    }
}

/// Min-heap entry for Dijkstra (BinaryHeap is a max-heap, so the ordering is
/// reversed). Distances are finite sums of finite weights, never NaN.
struct HeapEntry {
    distance: f64,
    vertex: VertexId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tengraph_core::{ElementType, TensorRef};

    fn tref(name: &str, shape: &[usize]) -> TensorRef {
        TensorRef::new(name, shape, ElementType::F64)
    }

    fn assign(graph: &TensorGraph, name: &str) -> VertexId {
        graph
            .add_operation(Arc::new(TensorOperation::assign(tref(name, &[4, 4]))))
            .unwrap()
    }

    #[test]
    fn test_unset_operation_rejected() {
        let graph = TensorGraph::new();
        let mut op = TensorOperation::new(tengraph_core::TensorOpCode::Add);
        op.set_tensor_operand(tref("D", &[2])).unwrap();
        let err = graph.add_operation(Arc::new(op)).unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation(_)));
        assert_eq!(graph.num_nodes(), 0);
    }

    #[test]
    fn test_independent_operations_have_no_edges() {
        let graph = TensorGraph::new();
        let v1 = assign(&graph, "A");
        let v2 = assign(&graph, "B");
        assert_eq!(graph.num_nodes(), 2);
        assert_eq!(graph.num_dependencies(), 0);
        assert_eq!(graph.node_degree(v1), 0);
        assert_eq!(graph.node_degree(v2), 0);
    }

    #[test]
    fn test_explicit_dependency_and_cycle_guard() {
        let graph = TensorGraph::new();
        let v1 = assign(&graph, "A");
        let v2 = assign(&graph, "B");

        graph.add_dependency(v2, v1).unwrap();
        assert!(graph.dependency_exists(v2, v1));
        assert!(!graph.dependency_exists(v1, v2));

        // Duplicate insertion is a no-op
        graph.add_dependency(v2, v1).unwrap();
        assert_eq!(graph.num_dependencies(), 1);

        // Reverse edge and self edge would create cycles
        assert!(matches!(
            graph.add_dependency(v1, v2),
            Err(CoreError::InvariantViolation(_))
        ));
        assert!(matches!(
            graph.add_dependency(v1, v1),
            Err(CoreError::InvariantViolation(_))
        ));
        assert_eq!(graph.num_dependencies(), 1);
    }

    #[test]
    fn test_unknown_vertices() {
        let graph = TensorGraph::new();
        let v1 = assign(&graph, "A");
        assert!(matches!(
            graph.add_dependency(v1, 99),
            Err(CoreError::NotFound(_))
        ));
        assert!(graph.node_properties(99).is_none());
        assert!(graph.neighbor_list(99).is_empty());
        assert_eq!(graph.node_degree(99), 0);
    }

    #[test]
    fn test_shortest_path_weights() {
        // Chain A <- B <- C over the same tensor: edge weight is the
        // dependee's flop estimate (2 * 16 = 32 for a 4x4 assign).
        let graph = TensorGraph::new();
        let v1 = assign(&graph, "T");
        let v2 = graph
            .add_operation(Arc::new(TensorOperation::assign(tref("T", &[4, 4]))))
            .unwrap();
        let v3 = graph
            .add_operation(Arc::new(TensorOperation::assign(tref("T", &[4, 4]))))
            .unwrap();

        let paths = graph.shortest_path(v3).unwrap();
        assert_eq!(paths.distances[v3], 0.0);
        assert_eq!(paths.distances[v2], 32.0);
        assert_eq!(paths.distances[v1], 64.0);
        assert_eq!(paths.parents[v1], v2);
        assert_eq!(paths.parents[v2], v3);

        // From the oldest node nothing is reachable
        let paths = graph.shortest_path(v1).unwrap();
        assert!(paths.distances[v3].is_infinite());
        assert_eq!(paths.parents[v3], v3);
    }

    #[test]
    fn test_shortest_path_unknown_source() {
        let graph = TensorGraph::new();
        assert!(matches!(
            graph.shortest_path(0),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_dump_lists_nodes() {
        let graph = TensorGraph::new();
        let v1 = assign(&graph, "A");
        let v2 = assign(&graph, "A");
        let text = graph.dump();
        assert!(text.contains("2 nodes, 1 dependencies"));
        assert!(text.contains(&format!("Node {} [Pending]", v2)));
        assert!(text.contains(&format!("depends on {{{}}}", v1)));
    }

    #[test]
    fn test_clear_resets_everything() {
        let graph = TensorGraph::new();
        assign(&graph, "A");
        assign(&graph, "A");
        graph.clear();
        assert_eq!(graph.num_nodes(), 0);
        assert_eq!(graph.num_dependencies(), 0);

        // Epochs are gone: the same tensor starts a fresh history
        let v = assign(&graph, "A");
        assert_eq!(v, 0);
        assert_eq!(graph.node_degree(v), 0);
    }

    #[test]
    fn test_executor_ticket() {
        let graph = TensorGraph::new();
        let v = assign(&graph, "A");
        graph.set_executor_ticket(v, 42).unwrap();
        assert_eq!(graph.node_properties(v).unwrap().executor_ticket, Some(42));
        assert!(matches!(
            graph.set_executor_ticket(9, 1),
            Err(CoreError::NotFound(_))
        ));
    }
}
