use std::fmt::Debug;

use crate::autograd::context::Context;
use crate::error::ConvGradError;
use crate::tensor::Tensor;

/// A differentiable operation: a forward computation paired with the
/// gradient rule that inverts it.
///
/// Implementations are stateless apart from their configuration (for
/// example the axes of a permutation). Everything the backward pass needs
/// from a particular call travels through the [`Context`] the graph creates
/// for that call and keeps on the resulting node.
///
/// The trait requires `Debug + Send + Sync` because functions are held as
/// `Arc<dyn Function>` by graph nodes, which can be shared between threads.
pub trait Function: Debug + Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Computes the output from `inputs`, saving whatever `backward` needs
    /// through [`Context::save_for_backward`].
    fn forward(&self, ctx: &mut Context, inputs: &[Tensor]) -> Result<Tensor, ConvGradError>;

    /// Given `grad_output` (dL/dOutput), returns one gradient per forward
    /// input, in input order, each with its input's shape.
    ///
    /// Fails with `ConvGradError::NoSavedTensors` when the forward pass ran
    /// under a no-grad context.
    fn backward(&self, ctx: &Context, grad_output: &Tensor) -> Result<Vec<Tensor>, ConvGradError>;
}

/// Fetches exactly `N` saved tensors from `ctx`.
pub(crate) fn saved<const N: usize>(
    ctx: &Context,
    operation: &str,
) -> Result<[Tensor; N], ConvGradError> {
    let saved = ctx.saved_tensors();
    if saved.len() != N {
        return Err(ConvGradError::NoSavedTensors {
            operation: operation.to_string(),
        });
    }
    Ok(std::array::from_fn(|i| saved[i].clone()))
}
