//! Tensor-network representation
//!
//! A [`TensorNetwork`] is a collection of tensors indexed by small integer
//! ids: id 0 is the designated output tensor, ids ≥ 1 are inputs. Each
//! tensor carries labeled legs; a leg label shared between two tensors
//! denotes contraction over that leg. Merging two inputs replaces them with
//! a tensor whose legs are the symmetric difference of the pair's legs.

use anyhow::{anyhow, bail, Result};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Label identifying a leg; equal labels contract.
pub type LegLabel = u32;

/// A labeled leg with its extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    /// Contraction label.
    pub label: LegLabel,
    /// Dimension extent of the leg.
    pub extent: usize,
}

impl Leg {
    /// Shorthand constructor.
    pub fn new(label: LegLabel, extent: usize) -> Self {
        Self { label, extent }
    }
}

/// Leg list, inline up to rank 6.
pub type Legs = SmallVec<[Leg; 6]>;

/// One tensor of a network: a name and its labeled legs.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkTensor {
    name: String,
    legs: Legs,
}

impl NetworkTensor {
    /// Create a tensor from its legs.
    pub fn new(name: impl Into<String>, legs: impl IntoIterator<Item = Leg>) -> Self {
        Self {
            name: name.into(),
            legs: legs.into_iter().collect(),
        }
    }

    /// Tensor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The labeled legs in order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Extents of the legs, in leg order.
    pub fn shape(&self) -> Vec<usize> {
        self.legs.iter().map(|leg| leg.extent).collect()
    }

    /// Total number of elements.
    pub fn volume(&self) -> f64 {
        self.legs.iter().map(|leg| leg.extent as f64).product()
    }

    /// TRUE iff the tensor carries a leg with the given label.
    pub fn has_label(&self, label: LegLabel) -> bool {
        self.legs.iter().any(|leg| leg.label == label)
    }
}

/// The symmetric difference of two tensors' legs: every leg whose label
/// appears in exactly one of the pair, left legs first, in input order.
/// This is the leg list of the tensor a pairwise contraction produces.
pub fn merged_legs(a: &NetworkTensor, b: &NetworkTensor) -> Legs {
    let labels_a: HashSet<LegLabel> = a.legs.iter().map(|leg| leg.label).collect();
    let labels_b: HashSet<LegLabel> = b.legs.iter().map(|leg| leg.label).collect();
    a.legs
        .iter()
        .filter(|leg| !labels_b.contains(&leg.label))
        .chain(b.legs.iter().filter(|leg| !labels_a.contains(&leg.label)))
        .copied()
        .collect()
}

/// A tensor network: tensors indexed by id, with id 0 the output.
#[derive(Debug, Clone)]
pub struct TensorNetwork {
    tensors: BTreeMap<u32, NetworkTensor>,
}

impl TensorNetwork {
    /// Create a network holding only its designated output tensor (id 0).
    pub fn new(output: NetworkTensor) -> Self {
        let mut tensors = BTreeMap::new();
        tensors.insert(0, output);
        Self { tensors }
    }

    /// Add an input tensor under the given id (ids ≥ 1).
    pub fn add_input(&mut self, id: u32, tensor: NetworkTensor) -> Result<()> {
        if id == 0 {
            bail!("id 0 is reserved for the output tensor");
        }
        if self.tensors.contains_key(&id) {
            bail!("tensor id {} already present in the network", id);
        }
        self.tensors.insert(id, tensor);
        Ok(())
    }

    /// Build a network from einsum-style subscripts, e.g.
    /// `"ij,jk,kl->il"` with one shape per input.
    ///
    /// Each distinct subscript letter becomes a leg label; extents must be
    /// consistent wherever a letter repeats, and every output letter must
    /// appear in some input. Inputs get ids 1..=n in order.
    pub fn from_subscripts(spec: &str, shapes: &[Vec<usize>]) -> Result<Self> {
        let spec = spec.trim();
        let parts: Vec<&str> = spec.split("->").collect();
        if parts.len() != 2 {
            bail!("subscripts must contain exactly one '->': {:?}", spec);
        }

        let inputs: Vec<&str> = parts[0].split(',').map(str::trim).collect();
        let output = parts[1].trim();
        if inputs.iter().any(|s| s.is_empty()) {
            bail!("empty input subscript in {:?}", spec);
        }
        for subscript in inputs.iter().chain(std::iter::once(&output)) {
            if !subscript.chars().all(|c| c.is_ascii_lowercase()) {
                bail!("subscripts allow lowercase a-z only: {:?}", subscript);
            }
        }
        if inputs.len() != shapes.len() {
            bail!(
                "subscripts name {} inputs but {} shapes were provided",
                inputs.len(),
                shapes.len()
            );
        }

        // Letter -> extent, validated across repeats
        let mut extents: HashMap<char, usize> = HashMap::new();
        for (i, (subscript, shape)) in inputs.iter().zip(shapes.iter()).enumerate() {
            if subscript.len() != shape.len() {
                bail!(
                    "input {}: subscript {:?} has {} indices but the shape has {} dimensions",
                    i,
                    subscript,
                    subscript.len(),
                    shape.len()
                );
            }
            for (c, &extent) in subscript.chars().zip(shape.iter()) {
                match extents.get(&c) {
                    Some(&prev) if prev != extent => {
                        bail!("extent mismatch for index '{}': {} vs {}", c, prev, extent)
                    }
                    _ => {
                        extents.insert(c, extent);
                    }
                }
            }
        }

        let legs_of = |subscript: &str| -> Result<Legs> {
            subscript
                .chars()
                .map(|c| {
                    let extent = extents
                        .get(&c)
                        .ok_or_else(|| anyhow!("output index '{}' appears in no input", c))?;
                    Ok(Leg::new(c as u32, *extent))
                })
                .collect()
        };

        let mut network = TensorNetwork::new(NetworkTensor::new("t0", legs_of(output)?));
        for (i, subscript) in inputs.iter().enumerate() {
            let id = (i + 1) as u32;
            network.add_input(id, NetworkTensor::new(format!("t{}", id), legs_of(subscript)?))?;
        }
        Ok(network)
    }

    /// The designated output tensor.
    pub fn output(&self) -> &NetworkTensor {
        // id 0 is inserted at construction and merge never removes it
        &self.tensors[&0]
    }

    /// Number of input-side tensors (the output does not count).
    pub fn num_inputs(&self) -> usize {
        self.tensors.len() - 1
    }

    /// Ids of the input-side tensors in ascending order.
    pub fn input_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.tensors.keys().copied().filter(|&id| id != 0)
    }

    /// The tensor under an id, or None.
    pub fn tensor(&self, id: u32) -> Option<&NetworkTensor> {
        self.tensors.get(&id)
    }

    /// Replace inputs `i` and `j` with their contraction under `new_id`.
    /// The merged tensor's legs are the symmetric difference of the pair's.
    pub fn merge(&mut self, i: u32, j: u32, new_id: u32) -> Result<()> {
        if i == 0 || j == 0 {
            bail!("the output tensor cannot be merged");
        }
        if i == j {
            bail!("cannot merge tensor {} with itself", i);
        }
        if self.tensors.contains_key(&new_id) {
            bail!("merge target id {} already present in the network", new_id);
        }
        // Check `j` up front so a missing operand never leaves the network
        // half mutated
        if !self.tensors.contains_key(&j) {
            bail!("tensor {} not in network", j);
        }
        let a = self
            .tensors
            .remove(&i)
            .ok_or_else(|| anyhow!("tensor {} not in network", i))?;
        let b = self
            .tensors
            .remove(&j)
            .ok_or_else(|| anyhow!("tensor {} not in network", j))?;
        let merged = NetworkTensor {
            name: format!("t{}", new_id),
            legs: merged_legs(&a, &b),
        };
        self.tensors.insert(new_id, merged);
        Ok(())
    }
}
