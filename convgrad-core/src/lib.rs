//! Reverse-mode automatic differentiation with stride-aware convolution kernels.
//!
//! A [`Graph`] records [`Var`] nodes as differentiable functions are applied
//! to them; [`Var::backward`] distributes gradients back to the leaves.
//! [`conv1d`] and [`conv2d`] are the convolution entry points; their
//! gradients re-use the forward kernels on axis-permuted views.

pub mod autograd;
pub mod buffer;
pub mod error;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod types;
pub mod utils;

pub use autograd::{
    backpropagate, central_difference, check_grad, topological_sort, Context, Derivative, Function,
    GradCheckError, Graph, Var, Variable, VariableId,
};
pub use error::ConvGradError;
pub use ops::arithmetic::{add, mul};
pub use ops::conv::{conv1d, conv1d_op, conv2d, conv2d_op, Conv1dFun, Conv2dFun};
pub use ops::reduction::sum;
pub use ops::view::permute;
pub use tensor::Tensor;
pub use types::DType;

// Re-export traits required by public functions/structs
pub use num_traits;
