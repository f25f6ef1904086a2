use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use log::debug;

use crate::autograd::context::Context;
use crate::autograd::function::Function;
use crate::autograd::var::{NodeKind, Var};
use crate::autograd::variable::VariableId;
use crate::error::ConvGradError;
use crate::tensor::Tensor;

#[derive(Debug)]
struct GraphState {
    next_id: AtomicUsize,
    no_grad: AtomicBool,
}

/// Puts the no-grad switch back when a [`Graph::no_grad_scope`] ends.
struct NoGradRestore<'a> {
    graph: &'a Graph,
    previous: bool,
}

impl Drop for NoGradRestore<'_> {
    fn drop(&mut self) {
        self.graph.set_no_grad(self.previous);
    }
}

/// A computation-graph session.
///
/// The graph hands out node identities and holds the no-grad switch. It is a
/// cheap-clone handle: every clone, and every [`Var`] created through it,
/// refers to the same session state. Separate `Graph`s share nothing and can
/// be driven from different threads at the same time.
#[derive(Debug, Clone)]
pub struct Graph {
    state: Arc<GraphState>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            state: Arc::new(GraphState {
                next_id: AtomicUsize::new(1),
                no_grad: AtomicBool::new(false),
            }),
        }
    }

    /// Allocates the next node identity. The first id is 1.
    pub fn next_id(&self) -> VariableId {
        VariableId::new(self.state.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn set_no_grad(&self, no_grad: bool) {
        self.state.no_grad.store(no_grad, Ordering::Relaxed);
    }

    pub fn is_no_grad(&self) -> bool {
        self.state.no_grad.load(Ordering::Relaxed)
    }

    /// Runs `f` with gradient recording disabled, restoring the previous mode
    /// afterwards, also when `f` unwinds.
    pub fn no_grad_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        let previous = self.state.no_grad.swap(true, Ordering::Relaxed);
        let _restore = NoGradRestore {
            graph: self,
            previous,
        };
        f()
    }

    /// True when both handles refer to the same session.
    pub fn same_graph(&self, other: &Graph) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Wraps `value` as a differentiable input that collects gradients.
    pub fn leaf(&self, value: Tensor) -> Var {
        Var::from_parts(self.clone(), self.next_id(), value, NodeKind::leaf())
    }

    /// Wraps `value` as an input that is never differentiated.
    pub fn constant(&self, value: Tensor) -> Var {
        Var::from_parts(self.clone(), self.next_id(), value, NodeKind::Constant)
    }

    /// Runs `function` forward on the values of `inputs` and records the result.
    ///
    /// The forward pass gets a fresh [`Context`]. When the graph is in no-grad
    /// mode, or none of the inputs can carry a gradient, that context is a
    /// no-grad one and the result is returned as a constant: nothing is saved
    /// and nothing downstream will back-propagate into it. Otherwise the result
    /// is an operation node whose parents are `inputs`, in order.
    ///
    /// # Errors
    /// `ConvGradError::GraphMismatch` if an input belongs to another graph, and
    /// whatever `function.forward` returns.
    pub fn apply<F: Function + 'static>(
        &self,
        function: F,
        inputs: &[&Var],
    ) -> Result<Var, ConvGradError> {
        if inputs.iter().any(|input| !self.same_graph(input.graph())) {
            return Err(ConvGradError::GraphMismatch);
        }

        let no_grad = self.is_no_grad() || inputs.iter().all(|input| input.is_constant());
        let mut ctx = Context::new(no_grad);
        let values: Vec<Tensor> = inputs.iter().map(|input| input.value().clone()).collect();
        let output = function.forward(&mut ctx, &values)?;

        if no_grad {
            debug!(
                "[Graph::apply] {} -> constant {:?} (no grad)",
                function.name(),
                output.shape()
            );
            return Ok(self.constant(output));
        }

        let id = self.next_id();
        debug!(
            "[Graph::apply] {} -> node {} {:?}",
            function.name(),
            id,
            output.shape()
        );
        let parents = inputs.iter().map(|input| (*input).clone()).collect();
        Ok(Var::from_parts(
            self.clone(),
            id,
            output,
            NodeKind::Op {
                function: Arc::new(function),
                ctx,
                parents,
            },
        ))
    }
}
