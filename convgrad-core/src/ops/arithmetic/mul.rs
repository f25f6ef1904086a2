use crate::autograd::function::saved;
use crate::autograd::{Context, Function, Var};
use crate::error::ConvGradError;
use crate::ops::arithmetic::binary_map;
use crate::tensor::Tensor;

/// Elementwise product of two tensors of the same shape and dtype.
pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, ConvGradError> {
    binary_map(a, b, "mul", |x, y| x * y, |x, y| x * y)
}

/// `a * b`, with gradients `(g * b, g * a)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MulFun;

impl Function for MulFun {
    fn name(&self) -> &'static str {
        "mul"
    }

    fn forward(&self, ctx: &mut Context, inputs: &[Tensor]) -> Result<Tensor, ConvGradError> {
        let [a, b] = inputs else {
            return Err(ConvGradError::InternalError(format!(
                "mul expects 2 inputs, got {}",
                inputs.len()
            )));
        };
        ctx.save_for_backward(&[a.clone(), b.clone()]);
        mul_op(a, b)
    }

    fn backward(&self, ctx: &Context, grad_output: &Tensor) -> Result<Vec<Tensor>, ConvGradError> {
        let [a, b] = saved::<2>(ctx, self.name())?;
        Ok(vec![mul_op(grad_output, &b)?, mul_op(grad_output, &a)?])
    }
}

pub fn mul(a: &Var, b: &Var) -> Result<Var, ConvGradError> {
    a.graph().apply(MulFun, &[a, b])
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
