//! Bounded-beam best-first search optimizer
//!
//! Explores contraction orders with a beam of candidate states. Each state
//! is a partially contracted network together with the sequence that
//! produced it and its cumulative cost. The beam is global over a pass: the
//! candidates produced by *all* parent states compete for the same
//! `num_walkers` slots, so a cheap continuation of one parent can evict an
//! expensive continuation of another.

use crate::network::TensorNetwork;
use crate::optimizer::{pair_cost, ContrTriple, ContractionPlan, ContractionSeqOptimizer};
use anyhow::{bail, Result};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Default number of retained candidate states per pass.
pub const DEFAULT_NUM_WALKERS: usize = 1;

/// One candidate contraction path: the partially contracted network, the
/// sequence that led to it, and the cumulative flop count.
#[derive(Debug, Clone)]
struct SearchPath {
    network: TensorNetwork,
    sequence: Vec<ContrTriple>,
    flops: f64,
    /// Insertion sequence number; breaks cost ties stably (earlier wins).
    order: u64,
}

impl PartialEq for SearchPath {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchPath {}

impl PartialOrd for SearchPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchPath {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: the greatest element is the costliest path, with later
        // insertion losing ties, so popping on overflow keeps the cheapest
        // and earliest states.
        self.flops
            .total_cmp(&other.flops)
            .then_with(|| self.order.cmp(&other.order))
    }
}

/// Beam-search contraction-sequence optimizer.
///
/// With one walker this degenerates to a greedy search; widening the beam
/// trades planning time for sequence quality.
///
/// # Algorithm
///
/// Exactly `n − 1` passes for `n` input tensors. In each pass, for every
/// retained state, every unordered pair of remaining input tensors is a
/// candidate contraction: its cost is estimated, the network is cloned and
/// the pair merged under a fresh intermediate id, and the extended path is
/// offered to a bounded priority queue keyed by cumulative cost. When the
/// queue exceeds `num_walkers`, the costliest path is evicted. The survivors
/// become the next pass's states; after the last pass the single cheapest
/// path is returned, its final triple writing into the output tensor
/// (`result_id == 0`).
///
/// # Complexity
///
/// O(W · n³) candidate evaluations for beam width W.
#[derive(Debug, Clone)]
pub struct HeuroOptimizer {
    num_walkers: usize,
}

impl HeuroOptimizer {
    /// Optimizer with the default walker count.
    pub fn new() -> Self {
        Self {
            num_walkers: DEFAULT_NUM_WALKERS,
        }
    }

    /// Optimizer with a custom walker count (at least one).
    pub fn with_num_walkers(num_walkers: usize) -> Self {
        Self {
            num_walkers: num_walkers.max(1),
        }
    }

    /// Change the walker count of an existing optimizer.
    pub fn reset_num_walkers(&mut self, num_walkers: usize) {
        self.num_walkers = num_walkers.max(1);
    }

    /// Current walker count.
    pub fn num_walkers(&self) -> usize {
        self.num_walkers
    }
}

impl Default for HeuroOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractionSeqOptimizer for HeuroOptimizer {
    fn name(&self) -> &'static str {
        "heuro"
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

        let mut input_paths = vec![SearchPath {
            network: network.clone(),
            sequence: Vec::new(),
            flops: 0.0,
            order: 0,
        }];
        let mut order: u64 = 0;

        for pass in 0..num_contractions {
            // One fresh intermediate id per pass, shared by all candidates
            let intermediate_id = intermediate_id_gen();
            let last_pass = pass == num_contractions - 1;

            let mut beam: BinaryHeap<SearchPath> = BinaryHeap::new();
            for path in &input_paths {
                let ids: Vec<u32> = path.network.input_ids().collect();
                for (x, &i) in ids.iter().enumerate() {
                    for &j in &ids[x + 1..] {
                        let cost = pair_cost(&path.network, i, j)?;

                        let mut candidate_net = path.network.clone();
                        candidate_net.merge(i, j, intermediate_id)?;

                        let mut candidate_seq = path.sequence.clone();
                        candidate_seq.push(ContrTriple {
                            // The very last contraction writes the output
                            result_id: if last_pass { 0 } else { intermediate_id },
                            left_id: i,
                            right_id: j,
                        });

                        order += 1;
                        beam.push(SearchPath {
                            network: candidate_net,
                            sequence: candidate_seq,
                            flops: path.flops + cost,
                            order,
                        });
                        if beam.len() > self.num_walkers {
                            beam.pop(); // evict the costliest path
                        }
                    }
                }
            }

            if beam.is_empty() {
                bail!("no contraction candidates in pass {}", pass);
            }

            // Ascending (cost, insertion order): cheapest and earliest first
            let mut survivors = beam.into_sorted_vec();
            if last_pass {
                let best = survivors.swap_remove(0);
                return Ok(ContractionPlan {
                    sequence: best.sequence,
                    flops: best.flops,
                });
            }
            input_paths = survivors;
        }

        bail!("pass loop ended without reaching the final pass")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::evaluate_sequence;

    fn chain() -> TensorNetwork {
        TensorNetwork::from_subscripts("ij,jk,kl->il", &[vec![2, 3], vec![3, 4], vec![4, 5]])
            .unwrap()
    }

    fn run(optimizer: &HeuroOptimizer, net: &TensorNetwork) -> ContractionPlan {
        let mut next = net.num_inputs() as u32;
        optimizer
            .determine_contraction_sequence(net, &mut || {
                next += 1;
                next
            })
            .unwrap()
    }

    #[test]
    fn test_three_tensor_chain() {
        let net = chain();
        let plan = run(&HeuroOptimizer::new(), &net);

        // ((t1*t2)*t3): 2*2*3*4 + 2*2*4*5 = 128, beating (t1*(t2*t3)) = 180
        assert_eq!(plan.flops, 128.0);
        assert_eq!(plan.sequence.len(), 2);
        assert_eq!(
            (plan.sequence[0].left_id, plan.sequence[0].right_id),
            (1, 2)
        );
        assert_eq!(plan.sequence[1].result_id, 0);
        assert_eq!(evaluate_sequence(&net, &plan.sequence).unwrap(), plan.flops);
    }

    #[test]
    fn test_singleton_network() {
        let net = TensorNetwork::from_subscripts("ij->ij", &[vec![3, 3]]).unwrap();
        let plan = run(&HeuroOptimizer::new(), &net);
        assert!(plan.sequence.is_empty());
        assert_eq!(plan.flops, 0.0);
    }

    #[test]
    fn test_deterministic() {
        let net = chain();
        let first = run(&HeuroOptimizer::with_num_walkers(4), &net);
        let second = run(&HeuroOptimizer::with_num_walkers(4), &net);
        assert_eq!(first.sequence, second.sequence);
        assert_eq!(first.flops, second.flops);
    }

    #[test]
    fn test_wider_beam_escapes_greedy_trap() {
        // Pass 1 pair costs: (t1,t2) = 800, (t2,t3) = 800, (t1,t3) = 1600.
        // A single walker keeps (t1,t2) on the tie and finishes at
        // 800 + 800 = 1600; two walkers also keep (t2,t3), whose
        // continuation closes at 800 + 16 = 816.
        let net = TensorNetwork::from_subscripts(
            "ab,bc,cd->ad",
            &[vec![2, 2], vec![2, 100], vec![100, 2]],
        )
        .unwrap();
        let narrow = run(&HeuroOptimizer::new(), &net);
        let wide = run(&HeuroOptimizer::with_num_walkers(2), &net);

        assert_eq!(narrow.flops, 1600.0);
        assert_eq!(
            (narrow.sequence[0].left_id, narrow.sequence[0].right_id),
            (1, 2),
            "ties keep the earliest-inserted candidate"
        );
        assert_eq!(wide.flops, 816.0);
        assert_eq!(
            (wide.sequence[0].left_id, wide.sequence[0].right_id),
            (2, 3)
        );
        assert_eq!(wide.sequence.last().unwrap().result_id, 0);
        assert_eq!(evaluate_sequence(&net, &wide.sequence).unwrap(), 816.0);
    }

    #[test]
    fn test_reset_num_walkers() {
        let mut optimizer = HeuroOptimizer::new();
        assert_eq!(optimizer.num_walkers(), DEFAULT_NUM_WALKERS);
        optimizer.reset_num_walkers(12);
        assert_eq!(optimizer.num_walkers(), 12);
        optimizer.reset_num_walkers(0);
        assert_eq!(optimizer.num_walkers(), 1, "walker count stays positive");
    }

    #[test]
    fn test_empty_network_sentinel() {
        let net = TensorNetwork::new(crate::network::NetworkTensor::new("out", []));
        let mut gen = || 1;
        let plan = HeuroOptimizer::new()
            .determine_contraction_sequence(&net, &mut gen)
            .unwrap();
        assert!(plan.is_infeasible());
        assert!(plan.sequence.is_empty());
    }
}
