use crate::autograd::{Context, Function, Var};
use crate::error::ConvGradError;
use crate::tensor::Tensor;

use super::utils::{inverse_permutation, validate_permutation};

/// Zero-copy axis permutation, `dims[i]` naming the source axis of axis `i`.
pub fn permute_op(input: &Tensor, dims: &[usize]) -> Result<Tensor, ConvGradError> {
    input.permute(dims)
}

/// Differentiable permutation. The backward pass applies the inverse
/// permutation to the upstream gradient, again without copying.
#[derive(Debug, Clone)]
pub struct PermuteFun {
    dims: Vec<usize>,
}

impl PermuteFun {
    pub fn new(dims: &[usize]) -> Self {
        PermuteFun { dims: dims.to_vec() }
    }
}

impl Function for PermuteFun {
    fn name(&self) -> &'static str {
        "permute"
    }

    fn forward(&self, _ctx: &mut Context, inputs: &[Tensor]) -> Result<Tensor, ConvGradError> {
        let [input] = inputs else {
            return Err(ConvGradError::InternalError(format!(
                "permute expects 1 input, got {}",
                inputs.len()
            )));
        };
        permute_op(input, &self.dims)
    }

    fn backward(&self, _ctx: &Context, grad_output: &Tensor) -> Result<Vec<Tensor>, ConvGradError> {
        Ok(vec![grad_output.permute(&inverse_permutation(&self.dims))?])
    }
}

/// Records a permutation of `input`. The axes are validated before anything is recorded.
pub fn permute(input: &Var, dims: &[usize]) -> Result<Var, ConvGradError> {
    validate_permutation(input.value().rank(), dims)?;
    input.graph().apply(PermuteFun::new(dims), &[input])
}

#[cfg(test)]
#[path = "permute_test.rs"]
mod tests;
