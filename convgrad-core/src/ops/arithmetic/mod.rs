//! Same-shape elementwise arithmetic.

use crate::error::ConvGradError;
use crate::ops::check_same_shape_dtype;
use crate::ops::traits::numeric::GradNumeric;
use crate::tensor::Tensor;
use crate::types::DType;

pub mod add;
pub mod mul;

pub use add::{add, add_op, AddFun};
pub use mul::{mul, mul_op, MulFun};

/// Applies `f` elementwise to two tensors of equal shape and dtype.
///
/// Inputs may have any layout; the output is contiguous.
pub(crate) fn binary_map(
    a: &Tensor,
    b: &Tensor,
    operation: &str,
    f32_op: impl Fn(f32, f32) -> f32,
    f64_op: impl Fn(f64, f64) -> f64,
) -> Result<Tensor, ConvGradError> {
    check_same_shape_dtype(a, b, operation)?;
    match a.dtype() {
        DType::F32 => Tensor::new(zip_typed(a, b, operation, f32_op)?, a.shape().to_vec()),
        DType::F64 => Tensor::new_f64(zip_typed(a, b, operation, f64_op)?, a.shape().to_vec()),
    }
}

fn zip_typed<T: GradNumeric>(
    a: &Tensor,
    b: &Tensor,
    operation: &str,
    f: impl Fn(T, T) -> T,
) -> Result<Vec<T>, ConvGradError> {
    let a_data = a.to_vec_typed::<T>(operation)?;
    let b_data = b.to_vec_typed::<T>(operation)?;
    Ok(a_data.into_iter().zip(b_data).map(|(x, y)| f(x, y)).collect())
}
