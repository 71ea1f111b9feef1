//! Recursive-bisection optimizer
//!
//! Splits the network into two balanced halves minimizing the total extent
//! crossing the cut, contracts each half recursively, then contracts the
//! two results. Registered as `"metis"`: the reference delegated the
//! bisection to the METIS graph partitioner, replaced here by an internal
//! greedy swap refinement over the leg-adjacency structure.

use crate::greed::GreedyOptimizer;
use crate::network::{LegLabel, TensorNetwork};
use crate::optimizer::{pair_cost, ContrTriple, ContractionPlan, ContractionSeqOptimizer};
use anyhow::Result;
use std::collections::HashMap;

/// Maximum refinement sweeps per bisection. Each sweep is O(n²) cut
/// evaluations; the cut weight decreases monotonically, so a small cap
/// bounds planning time without hurting quality much.
const MAX_REFINEMENT_SWEEPS: usize = 8;

/// Min-cut bisection contraction-sequence optimizer.
///
/// Produces divide-and-conquer contraction trees: good when the network has
/// weakly coupled clusters, since contracting within a cluster before
/// crossing the cut keeps intermediates small.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartitionOptimizer;

impl PartitionOptimizer {
    /// Create a new bisection optimizer.
    pub fn new() -> Self {
        Self
    }
}

impl ContractionSeqOptimizer for PartitionOptimizer {
    fn name(&self) -> &'static str {
        "metis"
    }

    fn determine_contraction_sequence(
        &self,
        network: &TensorNetwork,
        intermediate_id_gen: &mut dyn FnMut() -> u32,
    ) -> Result<ContractionPlan> {
        let n = network.num_inputs();
        if n == 0 {
            return Ok(ContractionPlan::infeasible());
        }
        if n == 1 {
            return Ok(ContractionPlan::empty());
        }
        if n < 4 {
            // Bisection is degenerate below four tensors
            log::debug!("partition optimizer: {} inputs, delegating to greedy", n);
            return GreedyOptimizer::new()
                .determine_contraction_sequence(network, intermediate_id_gen);
        }

        let mut net = network.clone();
        let group: Vec<u32> = net.input_ids().collect();
        let mut sequence = Vec::with_capacity(n - 1);
        let mut flops = 0.0;

        contract_group(
            &mut net,
            group,
            intermediate_id_gen,
            &mut sequence,
            &mut flops,
            true,
        )?;

        Ok(ContractionPlan { sequence, flops })
    }
}

/// Contract every tensor of `group` down to one, recording the triples in
/// post-order, and return the id of the resulting tensor. The root merge
/// writes into the output tensor (`result_id == 0`).
fn contract_group(
    net: &mut TensorNetwork,
    group: Vec<u32>,
    intermediate_id_gen: &mut dyn FnMut() -> u32,
    sequence: &mut Vec<ContrTriple>,
    flops: &mut f64,
    is_root: bool,
) -> Result<u32> {
    if let [only] = group.as_slice() {
        return Ok(*only);
    }

    let (left_half, right_half) = bisect(net, &group);
    let left_id = contract_group(net, left_half, intermediate_id_gen, sequence, flops, false)?;
    let right_id = contract_group(net, right_half, intermediate_id_gen, sequence, flops, false)?;

    *flops += pair_cost(net, left_id, right_id)?;
    let intermediate_id = intermediate_id_gen();
    net.merge(left_id, right_id, intermediate_id)?;
    sequence.push(ContrTriple {
        result_id: if is_root { 0 } else { intermediate_id },
        left_id,
        right_id,
    });
    Ok(intermediate_id)
}

/// Split `group` into two balanced halves, then greedily swap elements
/// across the cut while that lowers the crossing weight.
fn bisect(net: &TensorNetwork, group: &[u32]) -> (Vec<u32>, Vec<u32>) {
    let half = group.len() / 2;
    let mut left = group[..half].to_vec();
    let mut right = group[half..].to_vec();

    let mut current = cut_weight(net, &left, &right);
    for _ in 0..MAX_REFINEMENT_SWEEPS {
        let mut improved = false;
        'sweep: for li in 0..left.len() {
            for ri in 0..right.len() {
                std::mem::swap(&mut left[li], &mut right[ri]);
                let candidate = cut_weight(net, &left, &right);
                if candidate < current {
                    current = candidate;
                    improved = true;
                    break 'sweep;
                }
                std::mem::swap(&mut left[li], &mut right[ri]);
            }
        }
        if !improved {
            break;
        }
    }
    (left, right)
}

/// Weight of the cut between two tensor groups: the sum of log-extents of
/// the leg labels appearing on both sides. Log keeps the weight additive
/// while ranking cuts by the product of crossing extents.
fn cut_weight(net: &TensorNetwork, left: &[u32], right: &[u32]) -> f64 {
    let side_labels = |ids: &[u32]| -> HashMap<LegLabel, usize> {
        let mut labels = HashMap::new();
        for &id in ids {
            if let Some(tensor) = net.tensor(id) {
                for leg in tensor.legs() {
                    labels.insert(leg.label, leg.extent);
                }
            }
        }
        labels
    };

    let left_labels = side_labels(left);
    let right_labels = side_labels(right);
    left_labels
        .iter()
        .filter(|(label, _)| right_labels.contains_key(label))
        .map(|(_, &extent)| (extent as f64).ln())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::evaluate_sequence;

    fn run(net: &TensorNetwork) -> ContractionPlan {
        let mut next = net.num_inputs() as u32;
        PartitionOptimizer::new()
            .determine_contraction_sequence(net, &mut || {
                next += 1;
                next
            })
            .unwrap()
    }

    #[test]
    fn test_four_tensor_chain() {
        let net = TensorNetwork::from_subscripts(
            "ab,bc,cd,de->ae",
            &[vec![2, 3], vec![3, 4], vec![4, 5], vec![5, 6]],
        )
        .unwrap();
        let plan = run(&net);

        assert_eq!(plan.sequence.len(), 3);
        assert_eq!(plan.sequence.last().unwrap().result_id, 0);
        // Reported cost replays exactly
        assert_eq!(evaluate_sequence(&net, &plan.sequence).unwrap(), plan.flops);
    }

    #[test]
    fn test_clustered_network_cuts_the_thin_bond() {
        // Two dense 2-cliques joined by a single extent-2 bond: the cut must
        // separate {1,2} from {3,4}, so the first two merges stay inside the
        // clusters.
        let net = TensorNetwork::from_subscripts(
            "ab,bc,cd,da->",
            &[vec![8, 8], vec![8, 2], vec![2, 8], vec![8, 8]],
        )
        .unwrap();
        let plan = run(&net);
        assert_eq!(plan.sequence.len(), 3);

        let first_pairs: Vec<(u32, u32)> = plan.sequence[..2]
            .iter()
            .map(|t| (t.left_id.min(t.right_id), t.left_id.max(t.right_id)))
            .collect();
        for (left, right) in &first_pairs {
            assert!(
                *right <= 4,
                "early merges contract original tensors, got ({}, {})",
                left,
                right
            );
        }
        assert_eq!(evaluate_sequence(&net, &plan.sequence).unwrap(), plan.flops);
    }

    #[test]
    fn test_small_network_delegates() {
        let net =
            TensorNetwork::from_subscripts("ij,jk,kl->il", &[vec![2, 3], vec![3, 4], vec![4, 5]])
                .unwrap();
        let plan = run(&net);
        assert_eq!(plan.sequence.len(), 2);
        assert_eq!(plan.flops, 128.0);
        assert_eq!(plan.sequence.last().unwrap().result_id, 0);
    }

    #[test]
    fn test_deterministic() {
        let net = TensorNetwork::from_subscripts(
            "ab,bc,cd,de,ef->af",
            &[vec![2, 3], vec![3, 4], vec![4, 5], vec![5, 6], vec![6, 7]],
        )
        .unwrap();
        let first = run(&net);
        let second = run(&net);
        assert_eq!(first.sequence, second.sequence);
        assert_eq!(first.flops, second.flops);
    }
}
