//! Baseline left-to-right optimizer

use crate::network::TensorNetwork;
use crate::optimizer::{pair_cost, ContrTriple, ContractionPlan, ContractionSeqOptimizer};
use anyhow::{bail, Result};

/// Contracts the two lowest-id input tensors on every pass.
///
/// No search at all — the baseline other optimizers are measured against,
/// and a cheap fallback when planning time must be negligible.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyOptimizer;

impl DummyOptimizer {
    /// Create a new dummy optimizer.
    pub fn new() -> Self {
        Self
    }
}

impl ContractionSeqOptimizer for DummyOptimizer {
    fn name(&self) -> &'static str {
        "dummy"
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
            let first_two: Vec<u32> = net.input_ids().take(2).collect();
            let (i, j) = match first_two.as_slice() {
                [i, j] => (*i, *j),
                _ => bail!("network lost inputs mid-pass"),
            };

            flops += pair_cost(&net, i, j)?;
            net.merge(i, j, intermediate_id)?;

            let result_id = if pass == num_contractions - 1 {
                0 // the last contraction writes into the output tensor
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
