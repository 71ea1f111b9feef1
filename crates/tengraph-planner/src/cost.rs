//! Pairwise contraction cost model
//!
//! Pure estimators for the floating-point cost and intermediate volume of
//! contracting two network tensors over their shared legs.

use crate::network::{LegLabel, NetworkTensor};
use std::collections::HashSet;

/// Estimated floating-point operations for contracting `a` with `b`.
///
/// The contraction sums over the shared legs: every element of the result
/// (non-shared extents) accumulates one product per point of the summed
/// subspace (shared extents), so the cost is the product of all distinct
/// leg extents across `a ∪ b`, times two for the multiply and the add.
///
/// A pair with no shared legs degenerates to the outer product and costs
/// twice the product of all extents.
///
/// # Examples
///
/// ```
/// use tengraph_planner::network::{Leg, NetworkTensor};
/// use tengraph_planner::cost::contraction_cost;
///
/// // Matrix product: [i=10, j=20] x [j=20, k=30]
/// let a = NetworkTensor::new("A", [Leg::new(0, 10), Leg::new(1, 20)]);
/// let b = NetworkTensor::new("B", [Leg::new(1, 20), Leg::new(2, 30)]);
/// assert_eq!(contraction_cost(&a, &b), 12_000.0);
/// ```
pub fn contraction_cost(a: &NetworkTensor, b: &NetworkTensor) -> f64 {
    let mut seen: HashSet<LegLabel> = HashSet::new();
    let mut volume = 1.0;
    for leg in a.legs().iter().chain(b.legs()) {
        if seen.insert(leg.label) {
            volume *= leg.extent as f64;
        }
    }
    2.0 * volume
}

/// Volume of the intermediate tensor produced by contracting `a` with `b`:
/// the product of the non-shared extents.
pub fn result_volume(a: &NetworkTensor, b: &NetworkTensor) -> f64 {
    let labels_a: HashSet<LegLabel> = a.legs().iter().map(|leg| leg.label).collect();
    let labels_b: HashSet<LegLabel> = b.legs().iter().map(|leg| leg.label).collect();
    let mut volume = 1.0;
    for leg in a.legs() {
        if !labels_b.contains(&leg.label) {
            volume *= leg.extent as f64;
        }
    }
    for leg in b.legs() {
        if !labels_a.contains(&leg.label) {
            volume *= leg.extent as f64;
        }
    }
    volume
}
