//! The contraction-sequence optimizer contract
//!
//! An optimizer turns a [`TensorNetwork`] into an ordered list of pairwise
//! contractions. Each step is a [`ContrTriple`]: contract `left_id` with
//! `right_id` into `result_id`. A sequence for a network of `n` inputs has
//! `n - 1` triples and its final triple writes into the output tensor
//! (`result_id == 0`).

use crate::cost::contraction_cost;
use crate::network::TensorNetwork;
use anyhow::{anyhow, Result};

/// One pairwise contraction step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContrTriple {
    /// Id of the produced tensor (0 for the network output).
    pub result_id: u32,
    /// Id of the first contracted tensor.
    pub left_id: u32,
    /// Id of the second contracted tensor.
    pub right_id: u32,
}

/// An optimized contraction sequence with its estimated total cost.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContractionPlan {
    /// Pairwise contractions in execution order.
    pub sequence: Vec<ContrTriple>,
    /// Estimated total floating-point operations.
    pub flops: f64,
}

impl ContractionPlan {
    /// The empty plan of a single-tensor network: nothing to contract.
    pub fn empty() -> Self {
        Self {
            sequence: Vec::new(),
            flops: 0.0,
        }
    }

    /// The sentinel returned for ill-formed input where no contraction is
    /// possible: infinite cost, no sequence.
    pub fn infeasible() -> Self {
        Self {
            sequence: Vec::new(),
            flops: f64::INFINITY,
        }
    }

    /// TRUE for the ill-formed-input sentinel.
    pub fn is_infeasible(&self) -> bool {
        self.flops.is_infinite()
    }
}

/// Uniform contract of all contraction-sequence optimizers.
///
/// Implementations are reentrant: no shared mutable state, single-threaded
/// per invocation. `intermediate_id_gen` is a caller-provided source of
/// fresh tensor ids, guaranteed distinct (and absent from the network)
/// within one call; determinism of the result follows from determinism of
/// the network and the generator.
pub trait ContractionSeqOptimizer {
    /// Registry name of the optimizer subtype.
    fn name(&self) -> &'static str;

    /// Produce an ordered contraction sequence for `network` and its
    /// estimated total flop cost.
    fn determine_contraction_sequence(
        &self,
        network: &TensorNetwork,
        intermediate_id_gen: &mut dyn FnMut() -> u32,
    ) -> Result<ContractionPlan>;
}

/// Cost of contracting the pair `(i, j)` of a network.
pub(crate) fn pair_cost(network: &TensorNetwork, i: u32, j: u32) -> Result<f64> {
    let a = network
        .tensor(i)
        .ok_or_else(|| anyhow!("tensor {} not in network", i))?;
    let b = network
        .tensor(j)
        .ok_or_else(|| anyhow!("tensor {} not in network", j))?;
    Ok(contraction_cost(a, b))
}

/// Replay a contraction sequence against its input network and return the
/// sum of per-pair costs. This is the reference evaluation the optimizers'
/// reported totals must agree with.
pub fn evaluate_sequence(network: &TensorNetwork, sequence: &[ContrTriple]) -> Result<f64> {
    let mut net = network.clone();
    // Fresh ids for replay merges, clear of both the network and the sequence
    let mut next_free = network
        .input_ids()
        .chain(sequence.iter().flat_map(|t| {
            [t.result_id, t.left_id, t.right_id]
        }))
        .max()
        .unwrap_or(0)
        + 1;

    let mut total = 0.0;
    for triple in sequence {
        total += pair_cost(&net, triple.left_id, triple.right_id)?;
        let merge_id = if triple.result_id == 0 {
            next_free += 1;
            next_free - 1
        } else {
            triple.result_id
        };
        net.merge(triple.left_id, triple.right_id, merge_id)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Leg, NetworkTensor};

    fn chain_network() -> TensorNetwork {
        TensorNetwork::from_subscripts("ij,jk,kl->il", &[vec![2, 3], vec![3, 4], vec![4, 5]])
            .unwrap()
    }

    #[test]
    fn test_plan_sentinels() {
        assert_eq!(ContractionPlan::empty().flops, 0.0);
        assert!(ContractionPlan::infeasible().is_infeasible());
        assert!(!ContractionPlan::empty().is_infeasible());
    }

    #[test]
    fn test_evaluate_sequence_chain() {
        let net = chain_network();
        // ((t1 * t2) -> t4, then t4 * t3 -> output)
        let seq = vec![
            ContrTriple {
                result_id: 4,
                left_id: 1,
                right_id: 2,
            },
            ContrTriple {
                result_id: 0,
                left_id: 4,
                right_id: 3,
            },
        ];
        // 2*(2*3*4) + 2*(2*4*5)
        assert_eq!(evaluate_sequence(&net, &seq).unwrap(), 128.0);
    }

    #[test]
    fn test_evaluate_sequence_other_order() {
        let net = chain_network();
        let seq = vec![
            ContrTriple {
                result_id: 4,
                left_id: 2,
                right_id: 3,
            },
            ContrTriple {
                result_id: 0,
                left_id: 1,
                right_id: 4,
            },
        ];
        // 2*(3*4*5) + 2*(2*3*5)
        assert_eq!(evaluate_sequence(&net, &seq).unwrap(), 180.0);
    }

    #[test]
    fn test_evaluate_sequence_rejects_unknown_ids() {
        let net = chain_network();
        let seq = vec![ContrTriple {
            result_id: 4,
            left_id: 1,
            right_id: 9,
        }];
        assert!(evaluate_sequence(&net, &seq).is_err());
    }

    #[test]
    fn test_pair_cost_matches_cost_model() {
        let mut net = TensorNetwork::new(NetworkTensor::new("out", []));
        net.add_input(1, NetworkTensor::new("A", [Leg::new(0, 3)]))
            .unwrap();
        net.add_input(2, NetworkTensor::new("B", [Leg::new(0, 3)]))
            .unwrap();
        assert_eq!(pair_cost(&net, 1, 2).unwrap(), 6.0);
        assert!(pair_cost(&net, 1, 7).is_err());
    }
}
