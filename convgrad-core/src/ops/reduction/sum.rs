use crate::autograd::{Context, Function, Var};
use crate::error::ConvGradError;
use crate::ops::traits::numeric::GradNumeric;
use crate::tensor::create::full_of;
use crate::tensor::Tensor;
use crate::types::DType;

/// Sums every element into a rank-0 tensor of the same dtype.
pub fn sum_op(input: &Tensor) -> Result<Tensor, ConvGradError> {
    match input.dtype() {
        DType::F32 => Tensor::new(vec![sum_typed::<f32>(input)?], vec![]),
        DType::F64 => Tensor::new_f64(vec![sum_typed::<f64>(input)?], vec![]),
    }
}

fn sum_typed<T: GradNumeric>(input: &Tensor) -> Result<T, ConvGradError> {
    Ok(input
        .to_vec_typed::<T>("sum")?
        .into_iter()
        .fold(T::zero(), |acc, x| acc + x))
}

/// Full reduction. The scalar upstream gradient is broadcast back to the input shape.
#[derive(Debug, Clone, Default)]
pub struct SumFun {
    input_shape: Vec<usize>,
}

impl SumFun {
    pub fn new(input_shape: &[usize]) -> Self {
        SumFun {
            input_shape: input_shape.to_vec(),
        }
    }
}

impl Function for SumFun {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn forward(&self, _ctx: &mut Context, inputs: &[Tensor]) -> Result<Tensor, ConvGradError> {
        let [input] = inputs else {
            return Err(ConvGradError::InternalError(format!(
                "sum expects 1 input, got {}",
                inputs.len()
            )));
        };
        if input.shape() != self.input_shape.as_slice() {
            return Err(ConvGradError::ShapeMismatch {
                expected: self.input_shape.clone(),
                actual: input.shape().to_vec(),
                operation: "sum".to_string(),
            });
        }
        sum_op(input)
    }

    fn backward(&self, _ctx: &Context, grad_output: &Tensor) -> Result<Vec<Tensor>, ConvGradError> {
        let g = grad_output.item_f64()?;
        Ok(vec![full_of(&self.input_shape, g, grad_output.dtype())?])
    }
}

pub fn sum(input: &Var) -> Result<Var, ConvGradError> {
    input.graph().apply(SumFun::new(input.shape()), &[input])
}

#[cfg(test)]
#[path = "sum_test.rs"]
mod tests;
