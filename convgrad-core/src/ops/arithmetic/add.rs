use crate::autograd::{Context, Function, Var};
use crate::error::ConvGradError;
use crate::ops::arithmetic::binary_map;
use crate::tensor::Tensor;

/// Elementwise sum of two tensors of the same shape and dtype.
///
/// # Errors
/// `ShapeMismatch` or `DTypeMismatch` when the operands disagree.
pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, ConvGradError> {
    binary_map(a, b, "add", |x, y| x + y, |x, y| x + y)
}

/// `a + b`; the gradient passes through unchanged to both operands.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddFun;

impl Function for AddFun {
    fn name(&self) -> &'static str {
        "add"
    }

    fn forward(&self, _ctx: &mut Context, inputs: &[Tensor]) -> Result<Tensor, ConvGradError> {
        let [a, b] = inputs else {
            return Err(ConvGradError::InternalError(format!(
                "add expects 2 inputs, got {}",
                inputs.len()
            )));
        };
        add_op(a, b)
    }

    fn backward(&self, _ctx: &Context, grad_output: &Tensor) -> Result<Vec<Tensor>, ConvGradError> {
        Ok(vec![grad_output.clone(), grad_output.clone()])
    }
}

/// Records `a + b` in the graph of `a`.
pub fn add(a: &Var, b: &Var) -> Result<Var, ConvGradError> {
    a.graph().apply(AddFun, &[a, b])
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
