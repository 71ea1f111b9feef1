//! Lowering contraction sequences into the DAG
//!
//! The control-flow glue between the planner and the graph: each
//! [`ContrTriple`] of an optimized sequence becomes one Contract
//! [`TensorOperation`] (output operand first), with intermediate tensor
//! shapes tracked through the merges. Submitting the operations in sequence
//! order lets the DAG derive the read-after-write edges between consecutive
//! contractions automatically.

use anyhow::{anyhow, bail, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tengraph_core::{ElementType, TensorOperation, TensorRef, VertexId};
use tengraph_dag::TensorGraph;
use tengraph_planner::network::merged_legs;
use tengraph_planner::{create_optimizer, ContractionPlan, NetworkTensor, TensorNetwork};

fn to_tensor_ref(tensor: &NetworkTensor, element_type: ElementType) -> TensorRef {
    TensorRef::new(tensor.name(), &tensor.shape(), element_type)
}

fn leg_list(tensor: &NetworkTensor) -> String {
    tensor
        .legs()
        .iter()
        .map(|leg| format!("u{}", leg.label))
        .collect::<Vec<_>>()
        .join(",")
}

/// Symbolic index pattern of one pairwise contraction, e.g.
/// `t4(u0,u2)+=t1(u0,u1)*t2(u1,u2)`. Opaque to the runtime core.
fn contraction_pattern(result: &NetworkTensor, left: &NetworkTensor, right: &NetworkTensor) -> String {
    format!(
        "{}({})+={}({})*{}({})",
        result.name(),
        leg_list(result),
        left.name(),
        leg_list(left),
        right.name(),
        leg_list(right)
    )
}

/// Turn an optimized contraction sequence into Contract operations, one per
/// triple, in execution order.
///
/// Intermediate tensors get their shapes from the symmetric difference of
/// their parents' legs; the final triple (`result_id == 0`) writes the
/// network's designated output tensor.
pub fn lower_sequence(
    network: &TensorNetwork,
    plan: &ContractionPlan,
    element_type: ElementType,
) -> Result<Vec<TensorOperation>> {
    if plan.is_infeasible() {
        bail!("cannot lower an infeasible contraction plan");
    }

    let mut tensors: BTreeMap<u32, NetworkTensor> = network
        .input_ids()
        .filter_map(|id| network.tensor(id).map(|t| (id, t.clone())))
        .collect();

    let mut operations = Vec::with_capacity(plan.sequence.len());
    for triple in &plan.sequence {
        let left = tensors
            .remove(&triple.left_id)
            .ok_or_else(|| anyhow!("triple references unknown tensor {}", triple.left_id))?;
        let right = tensors
            .remove(&triple.right_id)
            .ok_or_else(|| anyhow!("triple references unknown tensor {}", triple.right_id))?;

        let result = if triple.result_id == 0 {
            network.output().clone()
        } else {
            NetworkTensor::new(format!("t{}", triple.result_id), merged_legs(&left, &right))
        };

        let operation = TensorOperation::contract(
            to_tensor_ref(&result, element_type),
            to_tensor_ref(&left, element_type),
            to_tensor_ref(&right, element_type),
            contraction_pattern(&result, &left, &right),
        )?;
        operations.push(operation);
        tensors.insert(triple.result_id, result);
    }
    Ok(operations)
}

/// The full upstream control flow: optimize the network with the named
/// optimizer, lower the sequence, submit every operation, and return the
/// vertex ids in submission order.
pub fn submit_network(
    graph: &TensorGraph,
    network: &TensorNetwork,
    optimizer_name: &str,
    element_type: ElementType,
) -> Result<Vec<VertexId>> {
    let optimizer = create_optimizer(optimizer_name)?;
    let mut next_id = network.input_ids().max().unwrap_or(0);
    let plan = optimizer.determine_contraction_sequence(network, &mut || {
        next_id += 1;
        next_id
    })?;
    if plan.is_infeasible() {
        bail!("no contraction sequence exists for the network");
    }

    let mut vertices = Vec::with_capacity(plan.sequence.len());
    for operation in lower_sequence(network, &plan, element_type)? {
        vertices.push(graph.add_operation(Arc::new(operation))?);
    }
    Ok(vertices)
}
