use crate::types::DType;
use thiserror::Error;

/// Custom error type for the convgrad core.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum ConvGradError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Rank mismatch: expected {expected}, got {actual}")]
    RankMismatch { expected: usize, actual: usize },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Invalid permutation: dims {dims:?} are not a valid permutation for rank {rank}")]
    InvalidPermutation { dims: Vec<usize>, rank: usize },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("DType mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    DTypeMismatch {
        expected: DType,
        actual: DType,
        operation: String,
    },

    #[error("Backward called on non-scalar tensor without explicit gradient.")]
    BackwardNonScalar,

    #[error("Backward returned {actual} gradients, but the node has {expected} parents")]
    GradientCountMismatch { expected: usize, actual: usize },

    #[error("No saved tensors available for backward of '{operation}' (was it run under no_grad?)")]
    NoSavedTensors { operation: String },

    #[error("Variables from different graphs cannot be combined in one operation")]
    GraphMismatch,

    #[error("Internal error: {0}")]
    InternalError(String),
}
