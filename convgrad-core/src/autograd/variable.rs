use std::fmt;

use crate::error::ConvGradError;
use crate::ops::arithmetic::add_op;
use crate::tensor::Tensor;

/// Identity of a graph node, unique within the [`Graph`](super::Graph) that allocated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(usize);

impl VariableId {
    pub fn new(raw: usize) -> Self {
        VariableId(raw)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A derivative value that can absorb another contribution to the same node.
///
/// Summation is what makes multiple paths through the graph add up to the
/// total derivative.
pub trait Derivative: Clone {
    fn accumulate(self, other: Self) -> Result<Self, ConvGradError>;
}

impl Derivative for f64 {
    fn accumulate(self, other: Self) -> Result<Self, ConvGradError> {
        Ok(self + other)
    }
}

impl Derivative for f32 {
    fn accumulate(self, other: Self) -> Result<Self, ConvGradError> {
        Ok(self + other)
    }
}

impl Derivative for Tensor {
    fn accumulate(self, other: Self) -> Result<Self, ConvGradError> {
        add_op(&self, &other)
    }
}

/// Capability set every differentiable graph node implements.
///
/// Node kinds differ only in how they answer these questions: a leaf has
/// no parents and accepts derivatives, a constant is excluded from traversal,
/// and an intermediate node maps an upstream derivative to one derivative per
/// parent through [`Variable::chain_rule`].
pub trait Variable: Clone {
    type Derivative: Derivative;

    fn unique_id(&self) -> VariableId;

    fn is_leaf(&self) -> bool;

    fn is_constant(&self) -> bool;

    /// Inputs consumed by the forward computation that produced this node, in order.
    fn parents(&self) -> Vec<Self>;

    /// Maps `d_output` to `(parent, d_parent)` pairs, one per parent, in parent order.
    fn chain_rule(
        &self,
        d_output: &Self::Derivative,
    ) -> Result<Vec<(Self, Self::Derivative)>, ConvGradError>;

    /// Adds `d` to the derivative stored on a leaf. Never overwrites.
    fn accumulate_derivative(&self, d: Self::Derivative) -> Result<(), ConvGradError>;
}
