//! Tensor identity values
//!
//! A [`TensorRef`] names a tensor without owning its storage. Equality and
//! hashing go through a stable 64-bit identity hash derived from the tensor's
//! name, shape, and element type, so two references built independently from
//! the same metadata compare equal across the process lifetime.

use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Shape type using SmallVec to avoid heap allocation for common ranks.
pub type Shape = SmallVec<[usize; 6]>;

/// Identifier of a vertex (DAG node) returned by graph insertion.
///
/// Vertex ids increase monotonically with insertion order, which makes them
/// a linear extension of the dependency order.
pub type VertexId = usize;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Element type of a tensor's storage.
///
/// Informational for cost estimation; the core never touches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementType {
    /// 32-bit real
    F32,
    /// 64-bit real
    F64,
    /// 32-bit complex (two f32)
    C32,
    /// 64-bit complex (two f64)
    C64,
}

impl ElementType {
    /// Size of a single element in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            ElementType::F32 => 4,
            ElementType::F64 => 8,
            ElementType::C32 => 8,
            ElementType::C64 => 16,
        }
    }

    /// Whether the element type is complex-valued.
    pub fn is_complex(&self) -> bool {
        matches!(self, ElementType::C32 | ElementType::C64)
    }

    fn tag(&self) -> u8 {
        match self {
            ElementType::F32 => 0,
            ElementType::F64 => 1,
            ElementType::C32 => 2,
            ElementType::C64 => 3,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
            ElementType::C32 => "c32",
            ElementType::C64 => "c64",
        };
        write!(f, "{}", s)
    }
}

/// An identity value for a tensor.
///
/// Carries a stable 64-bit hash of name + shape + element type. Equality is
/// by hash; shape and element type are informational for cost estimation.
/// No ownership relation is implied between two operations referencing the
/// same `TensorRef`.
///
/// # Examples
///
/// ```
/// use tengraph_core::{ElementType, TensorRef};
///
/// let a = TensorRef::new("A", &[10, 20], ElementType::F64);
/// let b = TensorRef::new("A", &[10, 20], ElementType::F64);
/// assert_eq!(a, b);
/// assert_eq!(a.identity_hash(), b.identity_hash());
/// assert_eq!(a.volume(), 200);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TensorRef {
    name: String,
    shape: Shape,
    element_type: ElementType,
    hash: u64,
}

impl TensorRef {
    /// Create a tensor reference from its identity metadata.
    pub fn new(name: impl Into<String>, shape: &[usize], element_type: ElementType) -> Self {
        let name = name.into();
        let shape: Shape = shape.iter().copied().collect();
        let hash = Self::compute_hash(&name, &shape, element_type);
        Self {
            name,
            shape,
            element_type,
            hash,
        }
    }

    /// FNV-1a over the identity metadata. Stable across builds, which keeps
    /// epoch-table keys reproducible between runs.
    fn compute_hash(name: &str, shape: &[usize], element_type: ElementType) -> u64 {
        let mut h = FNV_OFFSET_BASIS;
        let mut eat = |byte: u8| {
            h ^= u64::from(byte);
            h = h.wrapping_mul(FNV_PRIME);
        };
        for b in name.bytes() {
            eat(b);
        }
        eat(0xff); // separator between name and shape
        for &extent in shape {
            for b in (extent as u64).to_le_bytes() {
                eat(b);
            }
        }
        eat(element_type.tag());
        h
    }

    /// Tensor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tensor shape (extent of each leg).
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of legs.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Element type of the tensor's storage.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// The stable 64-bit identity hash.
    pub fn identity_hash(&self) -> u64 {
        self.hash
    }

    /// Total number of elements.
    pub fn volume(&self) -> usize {
        self.shape.iter().product()
    }

    /// Storage footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        self.volume() * self.element_type.size_bytes()
    }
}

impl PartialEq for TensorRef {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for TensorRef {}

impl Hash for TensorRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Display for TensorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.name)?;
        for (i, extent) in self.shape.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", extent)?;
        }
        write!(f, "]:{}", self.element_type)
    }
}
