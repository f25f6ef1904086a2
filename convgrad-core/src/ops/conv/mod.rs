//! Convolution as differentiable functions.
//!
//! One kernel per rank serves three purposes. The forward pass runs it with
//! the weight anchored at the start of the window. The weight gradient runs
//! it on the input and upstream gradient with their first two axes swapped,
//! so the batch axis becomes the reduction axis. The input gradient runs it
//! on the upstream gradient against the channel-swapped weight with the
//! window anchored at its end. All three operate on zero-copy views.

use log::debug;

use crate::autograd::function::saved;
use crate::autograd::Context;
use crate::error::ConvGradError;
use crate::ops::traits::numeric::GradNumeric;
use crate::tensor::utils::calculate_strides;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;

pub mod conv1d;
pub mod conv2d;
pub mod kernels;

pub use conv1d::{conv1d, conv1d_op, Conv1dFun};
pub use conv2d::{conv2d, conv2d_op, Conv2dFun};
pub use kernels::{tensor_conv1d, tensor_conv2d};

/// Signature shared by [`tensor_conv1d`] and [`tensor_conv2d`].
pub type ConvKernelFn<T> = fn(
    &mut [T],
    &[usize],
    &[usize],
    usize,
    &[T],
    &[usize],
    &[usize],
    &[T],
    &[usize],
    &[usize],
    bool,
);

/// Spatial rank of a convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvKind {
    Conv1d,
    Conv2d,
}

impl ConvKind {
    pub fn name(self) -> &'static str {
        match self {
            ConvKind::Conv1d => "conv1d",
            ConvKind::Conv2d => "conv2d",
        }
    }

    /// Tensor rank of every operand: batch/channel axes plus the spatial axes.
    pub fn rank(self) -> usize {
        match self {
            ConvKind::Conv1d => 3,
            ConvKind::Conv2d => 4,
        }
    }

    fn kernel<T: GradNumeric>(self) -> ConvKernelFn<T> {
        match self {
            ConvKind::Conv1d => tensor_conv1d::<T>,
            ConvKind::Conv2d => tensor_conv2d::<T>,
        }
    }

    /// Axis order swapping the first two axes.
    fn channel_swap(self) -> Vec<usize> {
        let mut dims: Vec<usize> = (0..self.rank()).collect();
        dims.swap(0, 1);
        dims
    }
}

/// Validates `input` and `weight` for `kind` and returns the output shape
/// `(batch, out_channels, spatial..)`, whose spatial extents are the input's.
pub fn output_shape(kind: ConvKind, input: &Tensor, weight: &Tensor) -> Result<Vec<usize>, ConvGradError> {
    let rank = kind.rank();
    for operand in [input, weight] {
        if operand.rank() != rank {
            return Err(ConvGradError::RankMismatch {
                expected: rank,
                actual: operand.rank(),
            });
        }
    }
    if input.dtype() != weight.dtype() {
        return Err(ConvGradError::DTypeMismatch {
            expected: input.dtype(),
            actual: weight.dtype(),
            operation: kind.name().to_string(),
        });
    }
    let (input_shape, weight_shape) = (input.shape(), weight.shape());
    if input_shape[1] != weight_shape[1] {
        return Err(ConvGradError::ShapeMismatch {
            expected: vec![weight_shape[0], input_shape[1]],
            actual: weight_shape[..2].to_vec(),
            operation: format!("{} (weight channels)", kind.name()),
        });
    }
    let mut shape = vec![input_shape[0], weight_shape[0]];
    shape.extend_from_slice(&input_shape[2..]);
    Ok(shape)
}

/// Runs the kernel of `kind` into a fresh contiguous tensor of `out_shape`
/// with the dtype of `input`.
pub(crate) fn launch(
    kind: ConvKind,
    out_shape: &[usize],
    input: &Tensor,
    weight: &Tensor,
    reverse: bool,
) -> Result<Tensor, ConvGradError> {
    match input.dtype() {
        DType::F32 => launch_typed::<f32>(kind, out_shape, input, weight, reverse),
        DType::F64 => launch_typed::<f64>(kind, out_shape, input, weight, reverse),
    }
}

fn launch_typed<T: GradNumeric>(
    kind: ConvKind,
    out_shape: &[usize],
    input: &Tensor,
    weight: &Tensor,
    reverse: bool,
) -> Result<Tensor, ConvGradError> {
    let input_storage = input.storage::<T>(kind.name())?;
    let weight_storage = weight.storage::<T>(kind.name())?;
    let out_size: usize = out_shape.iter().product();
    let out_strides = calculate_strides(out_shape);
    let mut out = vec![T::zero(); out_size];

    let kernel = kind.kernel::<T>();
    kernel(
        &mut out,
        out_shape,
        &out_strides,
        out_size,
        input_storage,
        input.shape(),
        input.strides(),
        weight_storage,
        weight.shape(),
        weight.strides(),
        reverse,
    );
    Tensor::from_data(TensorData::new(out, out_shape.to_vec())?)
}

/// Forward convolution without graph recording.
pub(crate) fn conv_op(kind: ConvKind, input: &Tensor, weight: &Tensor) -> Result<Tensor, ConvGradError> {
    let out_shape = output_shape(kind, input, weight)?;
    launch(kind, &out_shape, input, weight, false)
}

pub(crate) fn conv_forward(
    kind: ConvKind,
    ctx: &mut Context,
    inputs: &[Tensor],
) -> Result<Tensor, ConvGradError> {
    let [input, weight] = inputs else {
        return Err(ConvGradError::InternalError(format!(
            "{} expects 2 inputs, got {}",
            kind.name(),
            inputs.len()
        )));
    };
    let output = conv_op(kind, input, weight)?;
    debug!(
        "[{}] forward input {:?} weight {:?} -> {:?}",
        kind.name(),
        input.shape(),
        weight.shape(),
        output.shape()
    );
    ctx.save_for_backward(&[input.clone(), weight.clone()]);
    Ok(output)
}

/// Returns `[grad_input, grad_weight]`.
pub(crate) fn conv_backward(
    kind: ConvKind,
    ctx: &Context,
    grad_output: &Tensor,
) -> Result<Vec<Tensor>, ConvGradError> {
    let [input, weight] = saved::<2>(ctx, kind.name())?;
    let expected = output_shape(kind, &input, &weight)?;
    if grad_output.shape() != expected.as_slice() {
        return Err(ConvGradError::ShapeMismatch {
            expected,
            actual: grad_output.shape().to_vec(),
            operation: format!("{} backward", kind.name()),
        });
    }
    if grad_output.dtype() != input.dtype() {
        return Err(ConvGradError::DTypeMismatch {
            expected: input.dtype(),
            actual: grad_output.dtype(),
            operation: format!("{} backward", kind.name()),
        });
    }
    let swap = kind.channel_swap();

    let mut grad_weight_shape = vec![input.shape()[1], weight.shape()[0]];
    grad_weight_shape.extend_from_slice(&weight.shape()[2..]);
    let grad_weight = launch(
        kind,
        &grad_weight_shape,
        &input.permute(&swap)?,
        &grad_output.permute(&swap)?,
        false,
    )?
    .permute(&swap)?;

    let grad_input = launch(
        kind,
        input.shape(),
        grad_output,
        &weight.permute(&swap)?,
        true,
    )?;

    debug!(
        "[{}] backward grad_output {:?} -> grad_input {:?}, grad_weight {:?}",
        kind.name(),
        grad_output.shape(),
        grad_input.shape(),
        grad_weight.shape()
    );
    Ok(vec![grad_input, grad_weight])
}
