//! # Differentiable operations (`ops`)
//!
//! Operations are grouped by kind. Each one comes in up to three layers:
//!
//! - an `xxx_op` function computing the forward result on plain tensors;
//! - a `XxxFun` struct implementing [`Function`](crate::autograd::Function),
//!   pairing that forward with its gradient rule;
//! - an `xxx` function taking [`Var`](crate::autograd::Var)s, which records
//!   the operation through [`Graph::apply`](crate::autograd::Graph::apply).
//!
//! ## Submodules
//!
//! - [`conv`]: 1D and 2D convolution and their kernels.
//! - [`arithmetic`]: same-shape elementwise add and mul.
//! - [`reduction`]: full sum.
//! - [`view`]: axis permutation.

use crate::error::ConvGradError;
use crate::tensor::Tensor;

pub mod arithmetic;
pub mod conv;
pub mod reduction;
pub mod traits;
pub mod view;

/// Fails unless `a` and `b` have the same shape and dtype.
pub(crate) fn check_same_shape_dtype(a: &Tensor, b: &Tensor, operation: &str) -> Result<(), ConvGradError> {
    if a.shape() != b.shape() {
        return Err(ConvGradError::ShapeMismatch {
            expected: a.shape().to_vec(),
            actual: b.shape().to_vec(),
            operation: operation.to_string(),
        });
    }
    if a.dtype() != b.dtype() {
        return Err(ConvGradError::DTypeMismatch {
            expected: a.dtype(),
            actual: b.dtype(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}
