use crate::autograd::{Context, Function, Var};
use crate::error::ConvGradError;
use crate::tensor::Tensor;

use super::{conv_backward, conv_forward, conv_op, ConvKind};

/// 2D convolution of input `(batch, in_channels, height, width)` with weight
/// `(out_channels, in_channels, k_height, k_width)`, zero-padded to keep the
/// spatial extents.
///
/// Backward returns `[grad_input, grad_weight]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Conv2dFun;

impl Function for Conv2dFun {
    fn name(&self) -> &'static str {
        ConvKind::Conv2d.name()
    }

    fn forward(&self, ctx: &mut Context, inputs: &[Tensor]) -> Result<Tensor, ConvGradError> {
        conv_forward(ConvKind::Conv2d, ctx, inputs)
    }

    fn backward(&self, ctx: &Context, grad_output: &Tensor) -> Result<Vec<Tensor>, ConvGradError> {
        conv_backward(ConvKind::Conv2d, ctx, grad_output)
    }
}

/// Records `conv2d(input, weight)` in the graph of `input`.
pub fn conv2d(input: &Var, weight: &Var) -> Result<Var, ConvGradError> {
    input.graph().apply(Conv2dFun, &[input, weight])
}

/// Forward 2D convolution on plain tensors.
pub fn conv2d_op(input: &Tensor, weight: &Tensor) -> Result<Tensor, ConvGradError> {
    conv_op(ConvKind::Conv2d, input, weight)
}

#[cfg(test)]
#[path = "conv2d_test.rs"]
mod tests;
