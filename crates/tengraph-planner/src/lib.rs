//! # tengraph-planner
//!
//! Contraction-sequence optimization for tensor networks.
//!
//! Given a tensor network — a set of tensors joined by shared leg labels,
//! with one designated output — the optimizers in this crate produce an
//! ordered list of pairwise contractions ([`ContrTriple`]s) that minimizes
//! an estimated floating-point cost. The sequence is what an upstream layer
//! submits to the operation DAG, one Contract operation per triple.
//!
//! ## Optimizers
//!
//! All optimizers share the [`ContractionSeqOptimizer`] contract and are
//! available through the process-wide [factory](factory::create_optimizer):
//!
//! - **`"dummy"`** ([`DummyOptimizer`]) — contracts left to right; the
//!   baseline.
//! - **`"greed"`** ([`GreedyOptimizer`]) — locally cheapest pair each pass;
//!   fast, good on most networks.
//! - **`"heuro"`** ([`HeuroOptimizer`]) — bounded-beam best-first search over
//!   contraction states; quality scales with the walker count.
//! - **`"metis"`** ([`PartitionOptimizer`]) — recursive min-cut bisection of
//!   the network.
//!
//! ## Quick Start
//!
//! ```
//! use tengraph_planner::{HeuroOptimizer, ContractionSeqOptimizer, TensorNetwork};
//!
//! // T0[il] = T1[ij] * T2[jk] * T3[kl] with extents i=2, j=3, k=4, l=5
//! let network = TensorNetwork::from_subscripts(
//!     "ij,jk,kl->il",
//!     &[vec![2, 3], vec![3, 4], vec![4, 5]],
//! ).unwrap();
//!
//! let mut next_id = network.num_inputs() as u32;
//! let plan = HeuroOptimizer::new()
//!     .determine_contraction_sequence(&network, &mut || {
//!         next_id += 1;
//!         next_id
//!     })
//!     .unwrap();
//!
//! assert_eq!(plan.sequence.len(), 2);
//! assert_eq!(plan.sequence.last().unwrap().result_id, 0);
//! assert_eq!(plan.flops, 128.0);
//! ```

#![deny(warnings)]

pub mod cost;
pub mod dummy;
pub mod factory;
pub mod greed;
pub mod heuro;
pub mod network;
pub mod optimizer;
pub mod partition;

pub use cost::{contraction_cost, result_volume};
pub use dummy::DummyOptimizer;
pub use factory::{create_optimizer, register_optimizer, registered_optimizers, OptimizerCtor};
pub use greed::GreedyOptimizer;
pub use heuro::HeuroOptimizer;
pub use network::{Leg, LegLabel, Legs, NetworkTensor, TensorNetwork};
pub use optimizer::{evaluate_sequence, ContrTriple, ContractionPlan, ContractionSeqOptimizer};
pub use partition::PartitionOptimizer;
