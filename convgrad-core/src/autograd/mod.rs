//! Reverse-mode automatic differentiation.
//!
//! A [`Graph`] session records [`Var`] nodes as differentiable
//! [`Function`]s are applied to them. [`topological_sort`] orders the
//! recorded DAG and [`backpropagate`] walks that order, calling each node's
//! chain rule until every leaf has accumulated its total derivative.
//! Both algorithms are written against the [`Variable`] trait only.

pub mod context;
pub mod function;
pub mod grad_check;
pub mod graph;
pub mod session;
pub mod var;
pub mod variable;

pub use context::Context;
pub use function::Function;
pub use grad_check::{central_difference, check_grad, GradCheckError};
pub use graph::{backpropagate, topological_sort};
pub use session::Graph;
pub use var::Var;
pub use variable::{Derivative, Variable, VariableId};
