//! Tensor operations
//!
//! A [`TensorOperation`] is a formal numerical operation on one or more
//! tensors: an opcode, an ordered list of operand slots (slot 0 is the
//! written output, slots ≥ 1 are read inputs), complex scalar prefactors,
//! and an opaque symbolic index pattern. Operations are built incrementally
//! and must be fully set before submission to the graph; the numerical
//! kernels that execute them live outside this crate.

use crate::error::CoreError;
use crate::tensor::TensorRef;
use num_complex::Complex64;
use std::fmt;

/// Opcode of a tensor operation.
///
/// Each opcode fixes the number of tensor operands and scalar prefactors
/// the operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TensorOpCode {
    /// Allocate a tensor.
    Create,
    /// Deallocate a tensor.
    Destroy,
    /// Initialize a tensor to a scalar value.
    Assign,
    /// Accumulate one tensor into another: `op0 += alpha * op1`.
    Add,
    /// Pairwise contraction: `op0 += alpha * op1 * op2`.
    Contract,
    /// Apply a unary transformation in place.
    Transform,
    /// Replicate a tensor across processes.
    Broadcast,
    /// Element-wise reduction across processes.
    Allreduce,
}

impl TensorOpCode {
    /// Number of tensor operand slots the opcode requires (slot 0 = output).
    pub fn num_operands(&self) -> usize {
        match self {
            TensorOpCode::Create
            | TensorOpCode::Destroy
            | TensorOpCode::Assign
            | TensorOpCode::Transform
            | TensorOpCode::Broadcast
            | TensorOpCode::Allreduce => 1,
            TensorOpCode::Add => 2,
            TensorOpCode::Contract => 3,
        }
    }

    /// Number of scalar prefactors the opcode requires.
    pub fn num_scalars(&self) -> usize {
        match self {
            TensorOpCode::Assign | TensorOpCode::Add | TensorOpCode::Contract => 1,
            _ => 0,
        }
    }

    /// Uppercase mnemonic used in diagnostics.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            TensorOpCode::Create => "CREATE",
            TensorOpCode::Destroy => "DESTROY",
            TensorOpCode::Assign => "ASSIGN",
            TensorOpCode::Add => "ADD",
            TensorOpCode::Contract => "CONTRACT",
            TensorOpCode::Transform => "TRANSFORM",
            TensorOpCode::Broadcast => "BROADCAST",
            TensorOpCode::Allreduce => "ALLREDUCE",
        }
    }
}

impl fmt::Display for TensorOpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// A tensor operation value: opcode, operand slots, scalar prefactors, and
/// symbolic index pattern.
///
/// Built incrementally: operand slots are filled in order with
/// [`set_tensor_operand`](TensorOperation::set_tensor_operand), scalars
/// default to one and may be overwritten, and the index pattern can only be
/// attached once all operands are present. [`is_set`](TensorOperation::is_set)
/// reports whether every slot is filled; the graph rejects unset operations.
///
/// # Examples
///
/// ```
/// use tengraph_core::{ElementType, TensorOpCode, TensorOperation, TensorRef};
///
/// let mut op = TensorOperation::new(TensorOpCode::Add);
/// assert!(!op.is_set());
///
/// op.set_tensor_operand(TensorRef::new("D", &[4, 4], ElementType::F64)).unwrap();
/// op.set_tensor_operand(TensorRef::new("S", &[4, 4], ElementType::F64)).unwrap();
/// assert!(op.is_set());
/// assert_eq!(op.inputs().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TensorOperation {
    opcode: TensorOpCode,
    operands: Vec<TensorRef>,
    scalars: Vec<Complex64>,
    pattern: String,
}

impl TensorOperation {
    /// Start a yet-unset operation for the given opcode. Scalar prefactors
    /// default to one.
    pub fn new(opcode: TensorOpCode) -> Self {
        Self {
            opcode,
            operands: Vec::with_capacity(opcode.num_operands()),
            scalars: vec![Complex64::new(1.0, 0.0); opcode.num_scalars()],
            pattern: String::new(),
        }
    }

    /// Single-operand `Create`.
    pub fn create(tensor: TensorRef) -> Self {
        let mut op = Self::new(TensorOpCode::Create);
        op.operands.push(tensor);
        op
    }

    /// Single-operand `Destroy`.
    pub fn destroy(tensor: TensorRef) -> Self {
        let mut op = Self::new(TensorOpCode::Destroy);
        op.operands.push(tensor);
        op
    }

    /// `Assign` with the default unit value.
    pub fn assign(tensor: TensorRef) -> Self {
        let mut op = Self::new(TensorOpCode::Assign);
        op.operands.push(tensor);
        op
    }

    /// `Add`: `dst += src`.
    pub fn add(dst: TensorRef, src: TensorRef) -> Self {
        let mut op = Self::new(TensorOpCode::Add);
        op.operands.push(dst);
        op.operands.push(src);
        op
    }

    /// Fully-set `Contract` with its symbolic index pattern:
    /// `dst += left * right`.
    pub fn contract(
        dst: TensorRef,
        left: TensorRef,
        right: TensorRef,
        pattern: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let mut op = Self::new(TensorOpCode::Contract);
        op.set_tensor_operand(dst)?;
        op.set_tensor_operand(left)?;
        op.set_tensor_operand(right)?;
        op.set_index_pattern(pattern)?;
        Ok(op)
    }

    /// Opcode of this operation.
    pub fn opcode(&self) -> TensorOpCode {
        self.opcode
    }

    /// Number of tensor operand slots required by the opcode.
    pub fn num_operands(&self) -> usize {
        self.opcode.num_operands()
    }

    /// Number of operand slots filled so far.
    pub fn num_operands_set(&self) -> usize {
        self.operands.len()
    }

    /// TRUE iff every operand slot is filled.
    pub fn is_set(&self) -> bool {
        self.operands.len() == self.opcode.num_operands()
    }

    /// Fill the next operand slot.
    pub fn set_tensor_operand(&mut self, tensor: TensorRef) -> Result<(), CoreError> {
        if self.operands.len() == self.opcode.num_operands() {
            return Err(CoreError::InvariantViolation(format!(
                "{} takes {} tensor operands, all already set",
                self.opcode,
                self.opcode.num_operands()
            )));
        }
        self.operands.push(tensor);
        Ok(())
    }

    /// A specific operand slot, or None if not yet filled.
    pub fn operand(&self, slot: usize) -> Option<&TensorRef> {
        self.operands.get(slot)
    }

    /// The output operand (slot 0), or None if not yet filled.
    pub fn output(&self) -> Option<&TensorRef> {
        self.operands.first()
    }

    /// The input operands (slots ≥ 1, in slot order).
    pub fn inputs(&self) -> &[TensorRef] {
        if self.operands.is_empty() {
            &[]
        } else {
            &self.operands[1..]
        }
    }

    /// Number of scalar prefactors required by the opcode.
    pub fn num_scalars(&self) -> usize {
        self.opcode.num_scalars()
    }

    /// A specific scalar prefactor.
    pub fn scalar(&self, index: usize) -> Option<Complex64> {
        self.scalars.get(index).copied()
    }

    /// Overwrite a scalar prefactor.
    pub fn set_scalar(&mut self, index: usize, value: Complex64) -> Result<(), CoreError> {
        match self.scalars.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(CoreError::InvariantViolation(format!(
                "{} takes {} scalars, index {} out of range",
                self.opcode,
                self.opcode.num_scalars(),
                index
            ))),
        }
    }

    /// The symbolic index pattern (opaque to the runtime core; empty when
    /// the opcode needs none).
    pub fn index_pattern(&self) -> &str {
        &self.pattern
    }

    /// Attach the symbolic index pattern. All tensor operands must be set
    /// first, since the pattern names them positionally.
    pub fn set_index_pattern(&mut self, pattern: impl Into<String>) -> Result<(), CoreError> {
        if !self.is_set() {
            return Err(CoreError::InvariantViolation(format!(
                "index pattern attached before all {} operands were set",
                self.opcode.num_operands()
            )));
        }
        self.pattern = pattern.into();
        Ok(())
    }

    /// Rough per-operation execution cost used for DAG edge weights.
    ///
    /// The core does not know the contracted-leg structure (the index
    /// pattern is opaque), so compute opcodes are costed at twice the
    /// largest operand volume; bookkeeping opcodes cost one.
    pub fn flop_estimate(&self) -> f64 {
        match self.opcode {
            TensorOpCode::Create | TensorOpCode::Destroy => 1.0,
            _ => {
                let max_volume = self
                    .operands
                    .iter()
                    .map(|t| t.volume())
                    .max()
                    .unwrap_or(0);
                (max_volume as f64) * 2.0
            }
        }
    }
}

impl fmt::Display for TensorOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.opcode)?;
        for (i, t) in self.operands.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", t.name())?;
        }
        write!(f, ")")?;
        if !self.pattern.is_empty() {
            write!(f, " :: {}", self.pattern)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::ElementType;

    fn tref(name: &str, shape: &[usize]) -> TensorRef {
        TensorRef::new(name, shape, ElementType::F64)
    }

    #[test]
    fn test_opcode_arities() {
        assert_eq!(TensorOpCode::Create.num_operands(), 1);
        assert_eq!(TensorOpCode::Add.num_operands(), 2);
        assert_eq!(TensorOpCode::Contract.num_operands(), 3);
        assert_eq!(TensorOpCode::Contract.num_scalars(), 1);
        assert_eq!(TensorOpCode::Destroy.num_scalars(), 0);
    }

    #[test]
    fn test_incremental_build() {
        let mut op = TensorOperation::new(TensorOpCode::Contract);
        assert!(!op.is_set());
        assert_eq!(op.num_operands_set(), 0);

        op.set_tensor_operand(tref("C", &[2, 4])).unwrap();
        op.set_tensor_operand(tref("A", &[2, 3])).unwrap();
        assert!(!op.is_set());

        op.set_tensor_operand(tref("B", &[3, 4])).unwrap();
        assert!(op.is_set());
        assert_eq!(op.output().unwrap().name(), "C");
        assert_eq!(op.inputs().len(), 2);

        // A fourth operand overflows the arity
        assert!(op.set_tensor_operand(tref("X", &[1])).is_err());
    }

    #[test]
    fn test_pattern_requires_full_operands() {
        let mut op = TensorOperation::new(TensorOpCode::Contract);
        op.set_tensor_operand(tref("C", &[2, 4])).unwrap();
        assert!(op.set_index_pattern("C(i,k)+=A(i,j)*B(j,k)").is_err());

        op.set_tensor_operand(tref("A", &[2, 3])).unwrap();
        op.set_tensor_operand(tref("B", &[3, 4])).unwrap();
        assert!(op.set_index_pattern("C(i,k)+=A(i,j)*B(j,k)").is_ok());
        assert_eq!(op.index_pattern(), "C(i,k)+=A(i,j)*B(j,k)");
    }

    #[test]
    fn test_scalars_default_to_one() {
        let op = TensorOperation::assign(tref("T", &[8]));
        assert_eq!(op.scalar(0), Some(Complex64::new(1.0, 0.0)));
        assert_eq!(op.scalar(1), None);
    }

    #[test]
    fn test_set_scalar() {
        let mut op = TensorOperation::add(tref("D", &[4]), tref("S", &[4]));
        op.set_scalar(0, Complex64::new(-0.5, 1.0)).unwrap();
        assert_eq!(op.scalar(0), Some(Complex64::new(-0.5, 1.0)));
        assert!(op.set_scalar(1, Complex64::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn test_flop_estimate() {
        let op = TensorOperation::create(tref("T", &[1000, 1000]));
        assert_eq!(op.flop_estimate(), 1.0);

        let op = TensorOperation::add(tref("D", &[10, 10]), tref("S", &[10, 10]));
        assert_eq!(op.flop_estimate(), 200.0);
    }

    #[test]
    fn test_display() {
        let op = TensorOperation::contract(
            tref("C", &[2, 4]),
            tref("A", &[2, 3]),
            tref("B", &[3, 4]),
            "C(i,k)+=A(i,j)*B(j,k)",
        )
        .unwrap();
        assert_eq!(op.to_string(), "CONTRACT(C,A,B) :: C(i,k)+=A(i,j)*B(j,k)");
    }
}
