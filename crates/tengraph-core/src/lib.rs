//! # tengraph-core
//!
//! Core value types for the TenGraph tensor-operation runtime.
//!
//! This crate defines the vocabulary shared by the DAG and the contraction
//! planner:
//!
//! - **Tensor identity** ([`TensorRef`]) — a stable 64-bit identity hash plus
//!   shape and element-type metadata for cost estimation
//! - **Tensor operations** ([`TensorOperation`]) — opcode, ordered operand
//!   slots (slot 0 is the output), complex scalar prefactors, and an opaque
//!   symbolic index pattern
//! - **DAG node envelopes** ([`TensorOpNode`]) — an operation plus its mutable
//!   runtime state (status, timings, executor ticket, error info)
//! - **Status codes** ([`NodeStatus`]) — the stable execution state machine
//!
//! No numerical kernels live here: a [`TensorRef`] carries no storage, and
//! two operations referencing the same tensor imply no ownership relation.
//!
//! ## Quick Start
//!
//! ```
//! use tengraph_core::{ElementType, TensorOperation, TensorRef};
//!
//! let a = TensorRef::new("A", &[16, 32], ElementType::F64);
//! let b = TensorRef::new("B", &[32, 8], ElementType::F64);
//! let c = TensorRef::new("C", &[16, 8], ElementType::F64);
//!
//! let op = TensorOperation::contract(c, a, b, "C(i,k)+=A(i,j)*B(j,k)").unwrap();
//! assert!(op.is_set());
//! assert_eq!(op.output().unwrap().name(), "C");
//! ```

pub mod error;
pub mod node;
pub mod op;
pub mod tensor;

pub use error::CoreError;
pub use node::{NodeStatus, TensorOpNode};
pub use op::{TensorOpCode, TensorOperation};
pub use tensor::{ElementType, Shape, TensorRef, VertexId};
