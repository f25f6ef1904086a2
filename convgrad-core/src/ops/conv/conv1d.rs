use crate::autograd::{Context, Function, Var};
use crate::error::ConvGradError;
use crate::tensor::Tensor;

use super::{conv_backward, conv_forward, conv_op, ConvKind};

/// 1D convolution of input `(batch, in_channels, width)` with weight
/// `(out_channels, in_channels, k_width)`, zero-padded to keep the width.
///
/// Backward returns `[grad_input, grad_weight]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Conv1dFun;

impl Function for Conv1dFun {
    fn name(&self) -> &'static str {
        ConvKind::Conv1d.name()
    }

    fn forward(&self, ctx: &mut Context, inputs: &[Tensor]) -> Result<Tensor, ConvGradError> {
        conv_forward(ConvKind::Conv1d, ctx, inputs)
    }

    fn backward(&self, ctx: &Context, grad_output: &Tensor) -> Result<Vec<Tensor>, ConvGradError> {
        conv_backward(ConvKind::Conv1d, ctx, grad_output)
    }
}

/// Records `conv1d(input, weight)` in the graph of `input`.
pub fn conv1d(input: &Var, weight: &Var) -> Result<Var, ConvGradError> {
    input.graph().apply(Conv1dFun, &[input, weight])
}

/// Forward 1D convolution on plain tensors.
pub fn conv1d_op(input: &Tensor, weight: &Tensor) -> Result<Tensor, ConvGradError> {
    conv_op(ConvKind::Conv1d, input, weight)
}

#[cfg(test)]
#[path = "conv1d_test.rs"]
mod tests;
