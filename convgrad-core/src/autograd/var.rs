use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};

use crate::autograd::context::Context;
use crate::autograd::function::Function;
use crate::autograd::graph::backpropagate;
use crate::autograd::session::Graph;
use crate::autograd::variable::{Derivative, Variable, VariableId};
use crate::error::ConvGradError;
use crate::tensor::{ones_like, Tensor};

pub(crate) enum NodeKind {
    Leaf {
        grad: RwLock<Option<Tensor>>,
    },
    Constant,
    Op {
        function: Arc<dyn Function>,
        ctx: Context,
        parents: Vec<Var>,
    },
}

impl NodeKind {
    pub(crate) fn leaf() -> Self {
        NodeKind::Leaf {
            grad: RwLock::new(None),
        }
    }
}

struct Node {
    id: VariableId,
    value: Tensor,
    kind: NodeKind,
}

/// A tensor value recorded in a [`Graph`].
///
/// `Var` is a cheap-clone handle; clones refer to the same node. A node is
/// one of three kinds, fixed when it is created:
///
/// - a leaf ([`Graph::leaf`]), which accumulates the gradients sent to it;
/// - a constant ([`Graph::constant`]), which back-propagation never enters;
/// - an operation node ([`Graph::apply`]), which keeps its function, the
///   forward [`Context`] and its parents.
///
/// Parents are held by strong reference, so a node keeps alive everything
/// needed to differentiate it.
#[derive(Clone)]
pub struct Var {
    node: Arc<Node>,
    graph: Graph,
}

impl Var {
    pub(crate) fn from_parts(graph: Graph, id: VariableId, value: Tensor, kind: NodeKind) -> Self {
        Var {
            node: Arc::new(Node { id, value, kind }),
            graph,
        }
    }

    pub fn id(&self) -> VariableId {
        self.node.id
    }

    pub fn value(&self) -> &Tensor {
        &self.node.value
    }

    pub fn shape(&self) -> &[usize] {
        self.node.value.shape()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.node.kind, NodeKind::Leaf { .. })
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.node.kind, NodeKind::Constant)
    }

    /// Name of the function that produced this node, if any.
    pub fn function_name(&self) -> Option<&'static str> {
        match &self.node.kind {
            NodeKind::Op { function, .. } => Some(function.name()),
            _ => None,
        }
    }

    fn grad_slot(&self) -> Option<&RwLock<Option<Tensor>>> {
        match &self.node.kind {
            NodeKind::Leaf { grad } => Some(grad),
            _ => None,
        }
    }

    fn read_grad(slot: &RwLock<Option<Tensor>>) -> RwLockReadGuard<'_, Option<Tensor>> {
        slot.read().unwrap_or_else(|poisoned| {
            warn!("Gradient lock was poisoned while reading. Recovering read guard.");
            poisoned.into_inner()
        })
    }

    fn write_grad(slot: &RwLock<Option<Tensor>>) -> RwLockWriteGuard<'_, Option<Tensor>> {
        slot.write().unwrap_or_else(|poisoned| {
            warn!("Gradient lock was poisoned while writing. Recovering write guard.");
            poisoned.into_inner()
        })
    }

    /// The gradient accumulated on this leaf so far.
    ///
    /// `None` for non-leaf nodes and for leaves no backward pass has reached.
    pub fn grad(&self) -> Option<Tensor> {
        self.grad_slot().and_then(|slot| Self::read_grad(slot).clone())
    }

    /// Clears the accumulated gradient of a leaf. No-op for other nodes.
    pub fn zero_grad(&self) {
        if let Some(slot) = self.grad_slot() {
            *Self::write_grad(slot) = None;
        }
    }

    /// Back-propagates from a one-element node, seeding the pass with 1.
    ///
    /// # Errors
    /// `ConvGradError::BackwardNonScalar` if the value has more than one element.
    pub fn backward(&self) -> Result<(), ConvGradError> {
        if self.value().numel() != 1 {
            return Err(ConvGradError::BackwardNonScalar);
        }
        self.backward_with(ones_like(self.value())?)
    }

    /// Back-propagates `grad` (dL/dself) to every leaf this node depends on.
    ///
    /// Gradients are added to whatever the leaves already hold.
    ///
    /// # Errors
    /// `ConvGradError::ShapeMismatch` if `grad` does not have this node's shape,
    /// plus any error raised by a function's backward pass.
    pub fn backward_with(&self, grad: Tensor) -> Result<(), ConvGradError> {
        if grad.shape() != self.shape() {
            return Err(ConvGradError::ShapeMismatch {
                expected: self.shape().to_vec(),
                actual: grad.shape().to_vec(),
                operation: "backward".to_string(),
            });
        }
        debug!("[Var::backward] from node {} {:?}", self.id(), self.shape());
        backpropagate(self, grad)
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.node.kind {
            NodeKind::Leaf { .. } => "leaf",
            NodeKind::Constant => "constant",
            NodeKind::Op { function, .. } => function.name(),
        };
        f.debug_struct("Var")
            .field("id", &self.id())
            .field("kind", &kind)
            .field("shape", &self.shape())
            .field("dtype", &self.value().dtype())
            .finish()
    }
}

impl Variable for Var {
    type Derivative = Tensor;

    fn unique_id(&self) -> VariableId {
        self.id()
    }

    fn is_leaf(&self) -> bool {
        Var::is_leaf(self)
    }

    fn is_constant(&self) -> bool {
        Var::is_constant(self)
    }

    fn parents(&self) -> Vec<Self> {
        match &self.node.kind {
            NodeKind::Op { parents, .. } => parents.clone(),
            _ => Vec::new(),
        }
    }

    fn chain_rule(&self, d_output: &Tensor) -> Result<Vec<(Self, Tensor)>, ConvGradError> {
        let NodeKind::Op {
            function,
            ctx,
            parents,
        } = &self.node.kind
        else {
            return Ok(Vec::new());
        };
        let grads = function.backward(ctx, d_output)?;
        if grads.len() != parents.len() {
            return Err(ConvGradError::GradientCountMismatch {
                expected: parents.len(),
                actual: grads.len(),
            });
        }
        Ok(parents.iter().cloned().zip(grads).collect())
    }

    fn accumulate_derivative(&self, d: Tensor) -> Result<(), ConvGradError> {
        let Some(slot) = self.grad_slot() else {
            return Err(ConvGradError::InternalError(format!(
                "accumulate_derivative called on non-leaf node {}",
                self.id()
            )));
        };
        if d.shape() != self.shape() {
            return Err(ConvGradError::ShapeMismatch {
                expected: self.shape().to_vec(),
                actual: d.shape().to_vec(),
                operation: "accumulate_derivative".to_string(),
            });
        }
        let mut guard = Self::write_grad(slot);
        let total = match guard.as_ref() {
            Some(existing) => existing.clone().accumulate(d)?,
            None => d,
        };
        *guard = Some(total);
        Ok(())
    }
}

#[cfg(test)]
#[path = "var_test.rs"]
mod tests;
