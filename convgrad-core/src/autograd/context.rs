use crate::tensor::Tensor;

/// Per-invocation record bridging a function's forward pass to its backward pass.
///
/// A `Context` is created fresh for every forward call, written during
/// `forward`, read during `backward`, and dropped with the graph node that
/// owns it. When `no_grad` is set, [`Context::save_for_backward`] keeps
/// nothing, so forward passes that will never be differentiated do not
/// retain their inputs.
#[derive(Debug, Clone, Default)]
pub struct Context {
    no_grad: bool,
    saved_values: Vec<Tensor>,
}

impl Context {
    pub fn new(no_grad: bool) -> Self {
        Context {
            no_grad,
            saved_values: Vec::new(),
        }
    }

    pub fn is_no_grad(&self) -> bool {
        self.no_grad
    }

    /// Stores `values` for the backward pass, replacing anything saved before.
    ///
    /// No-op when gradient tracking is disabled for this context.
    pub fn save_for_backward(&mut self, values: &[Tensor]) {
        if self.no_grad {
            return;
        }
        self.saved_values = values.to_vec();
    }

    /// The values recorded by the last [`Context::save_for_backward`] call.
    pub fn saved_tensors(&self) -> &[Tensor] {
        &self.saved_values
    }
}
