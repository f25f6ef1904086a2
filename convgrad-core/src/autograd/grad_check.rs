use std::cell::RefCell;

use approx::relative_eq;
use log::debug;
use thiserror::Error;

use crate::autograd::session::Graph;
use crate::autograd::var::Var;
use crate::error::ConvGradError;
use crate::ops::traits::numeric::GradNumeric;
use crate::tensor::Tensor;
use crate::types::DType;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}, element {element_index}: analytical {analytical_grad:?} != numerical {numerical_grad:?} (difference {difference:?})")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(ConvGradError),
    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(ConvGradError),
    #[error("Tensor error during intermediate calculation: {0}")]
    TensorError(ConvGradError),
    #[error("Input {input_index} has no gradient after the backward pass.")]
    MissingAnalyticalGrad { input_index: usize },
    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index}.")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
    },
    #[error("Analytical gradient is NaN or infinite for input {input_index}, element {element_index}. Value: {value:?}")]
    AnalyticalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        value: f64,
    },
}

impl From<ConvGradError> for GradCheckError {
    fn from(err: ConvGradError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Symmetric finite-difference estimate of ∂f/∂vals[arg]:
/// `(f(x + ε) − f(x − ε)) / (2ε)`, every other argument held fixed.
pub fn central_difference<F>(f: F, vals: &[f64], arg: usize, epsilon: f64) -> f64
where
    F: Fn(&[f64]) -> f64,
{
    let mut plus = vals.to_vec();
    plus[arg] += epsilon;
    let mut minus = vals.to_vec();
    minus[arg] -= epsilon;
    (f(&plus) - f(&minus)) / (2.0 * epsilon)
}

/// Checks the gradients a graph produces against central differences.
///
/// `func` builds its output from leaves wrapping `inputs`; the output is
/// back-propagated with seed `output_grad`, so each analytical gradient is
/// that of the scalar `L(x) = Σ output(x) · output_grad`. Every element of
/// every input is then perturbed by ±`epsilon` and `L` re-evaluated in a
/// no-grad graph. An element fails when its absolute difference and its
/// relative difference (to the larger magnitude) both exceed `tolerance`.
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    output_grad: &Tensor,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&Graph, &[Var]) -> Result<Var, ConvGradError>,
{
    let graph = Graph::new();
    let leaves: Vec<Var> = inputs.iter().map(|t| graph.leaf(t.clone())).collect();
    let output = func(&graph, &leaves).map_err(GradCheckError::ForwardPassError)?;
    output
        .backward_with(output_grad.clone())
        .map_err(GradCheckError::BackwardPassError)?;

    for (input_index, leaf) in leaves.iter().enumerate() {
        let analytical = leaf
            .grad()
            .ok_or(GradCheckError::MissingAnalyticalGrad { input_index })?
            .to_f64_vec()?;
        let original = inputs[input_index].to_f64_vec()?;

        let failure: RefCell<Option<ConvGradError>> = RefCell::new(None);
        let loss_at = |perturbed: &[f64]| -> f64 {
            match perturbed_loss(&func, inputs, input_index, perturbed, output_grad) {
                Ok(loss) => loss,
                Err(e) => {
                    failure.borrow_mut().get_or_insert(e);
                    f64::NAN
                }
            }
        };

        for element_index in 0..original.len() {
            let numerical_grad = central_difference(&loss_at, &original, element_index, epsilon);
            if let Some(e) = failure.borrow_mut().take() {
                return Err(GradCheckError::ForwardPassError(e));
            }
            if !numerical_grad.is_finite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    input_index,
                    element_index,
                });
            }
            let analytical_grad = analytical[element_index];
            if !analytical_grad.is_finite() {
                return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                    input_index,
                    element_index,
                    value: analytical_grad,
                });
            }

            if !relative_eq!(
                analytical_grad,
                numerical_grad,
                epsilon = tolerance,
                max_relative = tolerance
            ) {
                return Err(GradCheckError::GradientMismatch {
                    input_index,
                    element_index,
                    analytical_grad,
                    numerical_grad,
                    difference: (analytical_grad - numerical_grad).abs(),
                });
            }
        }
        debug!(
            "[check_grad] input {} ({} elements) agrees with central differences",
            input_index,
            original.len()
        );
    }
    Ok(())
}

/// Evaluates `L` with input `input_index` replaced by `values`.
fn perturbed_loss<F>(
    func: &F,
    inputs: &[Tensor],
    input_index: usize,
    values: &[f64],
    output_grad: &Tensor,
) -> Result<f64, ConvGradError>
where
    F: Fn(&Graph, &[Var]) -> Result<Var, ConvGradError>,
{
    let graph = Graph::new();
    graph.set_no_grad(true);
    let mut vars = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let value = if i == input_index {
            tensor_from_f64(values, input.shape(), input.dtype())?
        } else {
            input.clone()
        };
        vars.push(graph.constant(value));
    }
    let output = func(&graph, &vars)?;
    weighted_sum(output.value(), output_grad)
}

fn tensor_from_f64(values: &[f64], shape: &[usize], dtype: DType) -> Result<Tensor, ConvGradError> {
    match dtype {
        DType::F32 => Tensor::new(values.iter().copied().map(f32::cast_f64).collect(), shape.to_vec()),
        DType::F64 => Tensor::new_f64(values.to_vec(), shape.to_vec()),
    }
}

/// `Σ output · weights`, accumulated in f64.
fn weighted_sum(output: &Tensor, weights: &Tensor) -> Result<f64, ConvGradError> {
    if output.shape() != weights.shape() {
        return Err(ConvGradError::ShapeMismatch {
            expected: output.shape().to_vec(),
            actual: weights.shape().to_vec(),
            operation: "check_grad loss".to_string(),
        });
    }
    Ok(output
        .to_f64_vec()?
        .iter()
        .zip(weights.to_f64_vec()?.iter())
        .map(|(o, w)| o * w)
        .sum())
}

#[cfg(test)]
#[path = "grad_check_test.rs"]
mod tests;
