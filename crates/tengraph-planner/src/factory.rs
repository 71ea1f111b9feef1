//! Process-wide optimizer factory
//!
//! Maps subtype names to constructors so callers can pick an optimizer by
//! configuration. The registry is lazily initialized with the builtin
//! subtypes on first access; registration and lookup are thread-safe
//! (registration happens during bootstrap, lookup is read-mostly).

use crate::dummy::DummyOptimizer;
use crate::greed::GreedyOptimizer;
use crate::heuro::HeuroOptimizer;
use crate::optimizer::ContractionSeqOptimizer;
use crate::partition::PartitionOptimizer;
use anyhow::{bail, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Constructor signature stored in the registry.
pub type OptimizerCtor = fn() -> Box<dyn ContractionSeqOptimizer + Send>;

static REGISTRY: OnceLock<RwLock<HashMap<String, OptimizerCtor>>> = OnceLock::new();

fn make_dummy() -> Box<dyn ContractionSeqOptimizer + Send> {
    Box::new(DummyOptimizer::new())
}

fn make_greed() -> Box<dyn ContractionSeqOptimizer + Send> {
    Box::new(GreedyOptimizer::new())
}

fn make_heuro() -> Box<dyn ContractionSeqOptimizer + Send> {
    Box::new(HeuroOptimizer::new())
}

fn make_partition() -> Box<dyn ContractionSeqOptimizer + Send> {
    Box::new(PartitionOptimizer::new())
}

fn registry() -> &'static RwLock<HashMap<String, OptimizerCtor>> {
    REGISTRY.get_or_init(|| {
        let mut builtins: HashMap<String, OptimizerCtor> = HashMap::new();
        builtins.insert("dummy".into(), make_dummy);
        builtins.insert("greed".into(), make_greed);
        builtins.insert("heuro".into(), make_heuro);
        builtins.insert("metis".into(), make_partition);
        RwLock::new(builtins)
    })
}

/// Register a new optimizer subtype under `name`, replacing any previous
/// registration of that name.
pub fn register_optimizer(name: impl Into<String>, ctor: OptimizerCtor) {
    registry().write().insert(name.into(), ctor);
}

/// Create a new instance of the optimizer registered under `name`.
pub fn create_optimizer(name: &str) -> Result<Box<dyn ContractionSeqOptimizer + Send>> {
    match registry().read().get(name) {
        Some(ctor) => Ok(ctor()),
        None => bail!("unknown contraction-sequence optimizer {:?}", name),
    }
}

/// Names currently registered, sorted.
pub fn registered_optimizers() -> Vec<String> {
    let mut names: Vec<String> = registry().read().keys().cloned().collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::TensorNetwork;

    #[test]
    fn test_builtin_names() {
        for name in ["dummy", "greed", "heuro", "metis"] {
            let optimizer = create_optimizer(name).unwrap();
            assert_eq!(optimizer.name(), name);
        }
        assert!(create_optimizer("no-such-optimizer").is_err());
    }

    #[test]
    fn test_registered_list_contains_builtins() {
        let names = registered_optimizers();
        for name in ["dummy", "greed", "heuro", "metis"] {
            assert!(names.contains(&name.to_string()), "missing {}", name);
        }
    }

    #[test]
    fn test_created_instances_share_the_contract() {
        let net =
            TensorNetwork::from_subscripts("ij,jk,kl->il", &[vec![2, 3], vec![3, 4], vec![4, 5]])
                .unwrap();
        for name in ["dummy", "greed", "heuro", "metis"] {
            let optimizer = create_optimizer(name).unwrap();
            let mut next = 3u32;
            let plan = optimizer
                .determine_contraction_sequence(&net, &mut || {
                    next += 1;
                    next
                })
                .unwrap();
            assert_eq!(plan.sequence.len(), 2, "{}", name);
            assert_eq!(plan.sequence.last().unwrap().result_id, 0, "{}", name);
        }
    }

    #[test]
    fn test_custom_registration() {
        fn make_wide_heuro() -> Box<dyn ContractionSeqOptimizer + Send> {
            Box::new(crate::heuro::HeuroOptimizer::with_num_walkers(16))
        }
        register_optimizer("heuro-wide", make_wide_heuro);
        let optimizer = create_optimizer("heuro-wide").unwrap();
        assert_eq!(optimizer.name(), "heuro");
    }
}
