//! Greedy locally-cheapest-pair optimizer

use crate::network::TensorNetwork;
use crate::optimizer::{pair_cost, ContrTriple, ContractionPlan, ContractionSeqOptimizer};
use anyhow::{bail, Result};

/// Contracts the locally cheapest pair of input tensors on every pass.
///
/// Equivalent to a beam search of width one, but without cloning networks:
/// each pass scans all remaining pairs once and commits immediately. Ties
/// go to the pair encountered first in ascending id order.
///
/// # Complexity
///
/// O(n³) on the number of input tensors: n − 1 passes, each scanning
/// O(n²) pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyOptimizer;

impl GreedyOptimizer {
    /// Create a new greedy optimizer.
    pub fn new() -> Self {
        Self
    }
}

impl ContractionSeqOptimizer for GreedyOptimizer {
    fn name(&self) -> &'static str {
        "greed"
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
        let num_contractions = n - 1;
        if num_contractions == 0 {
            return Ok(ContractionPlan::empty());
        }

        let mut net = network.clone();
        let mut sequence = Vec::with_capacity(num_contractions);
        let mut flops = 0.0;

        for pass in 0..num_contractions {
            let intermediate_id = intermediate_id_gen();
            let ids: Vec<u32> = net.input_ids().collect();

            let mut best: Option<(f64, u32, u32)> = None;
            for (x, &i) in ids.iter().enumerate() {
                for &j in &ids[x + 1..] {
                    let cost = pair_cost(&net, i, j)?;
                    let better = match best {
                        Some((best_cost, _, _)) => cost < best_cost,
                        None => true,
                    };
                    if better {
                        best = Some((cost, i, j));
                    }
                }
            }

            let (cost, i, j) = match best {
                Some(found) => found,
                None => bail!("no contraction candidates remain"),
            };

            flops += cost;
            net.merge(i, j, intermediate_id)?;
            let result_id = if pass == num_contractions - 1 {
                0
            } else {
                intermediate_id
            };
            sequence.push(ContrTriple {
                result_id,
                left_id: i,
                right_id: j,
            });
        }

        Ok(ContractionPlan { sequence, flops })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::evaluate_sequence;

    #[test]
    fn test_picks_cheap_side_of_chain() {
        // Contracting (t1, t2) first costs 48; (t2, t3) first costs 120
        let net =
            TensorNetwork::from_subscripts("ij,jk,kl->il", &[vec![2, 3], vec![3, 4], vec![4, 5]])
                .unwrap();
        let mut next = 3u32;
        let plan = GreedyOptimizer::new()
            .determine_contraction_sequence(&net, &mut || {
                next += 1;
                next
            })
            .unwrap();

        assert_eq!(plan.sequence.len(), 2);
        assert_eq!(
            (plan.sequence[0].left_id, plan.sequence[0].right_id),
            (1, 2)
        );
        assert_eq!(plan.flops, 128.0);
        assert_eq!(plan.sequence[1].result_id, 0);
        assert_eq!(evaluate_sequence(&net, &plan.sequence).unwrap(), plan.flops);
    }

    #[test]
    fn test_deterministic_tie_break() {
        // Fully symmetric star: every pair costs the same; the first pair in
        // id order must win every time
        let net = TensorNetwork::from_subscripts(
            "ia,ib,ic->abc",
            &[vec![2, 3], vec![2, 3], vec![2, 3]],
        )
        .unwrap();
        for _ in 0..3 {
            let mut next = 3u32;
            let plan = GreedyOptimizer::new()
                .determine_contraction_sequence(&net, &mut || {
                    next += 1;
                    next
                })
                .unwrap();
            assert_eq!(
                (plan.sequence[0].left_id, plan.sequence[0].right_id),
                (1, 2)
            );
        }
    }

    #[test]
    fn test_singleton() {
        let net = TensorNetwork::from_subscripts("i->i", &[vec![9]]).unwrap();
        let mut gen = || 5;
        let plan = GreedyOptimizer::new()
            .determine_contraction_sequence(&net, &mut gen)
            .unwrap();
        assert!(plan.sequence.is_empty());
        assert_eq!(plan.flops, 0.0);
    }
}
