use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::autograd::variable::{Derivative, Variable, VariableId};
use crate::error::ConvGradError;

/// Orders every non-constant node reachable from `variable` so that each node
/// comes before all of its parents (consumers before producers).
///
/// The traversal is an iterative depth-first search: the top of an explicit
/// stack is the current node, its unvisited parents are pushed on top of it,
/// and a node is emitted only once it is back on top with no unvisited parents
/// left. Stale stack entries for nodes emitted through another path are
/// dropped. The resulting post-order (producers first) is reversed before it
/// is returned.
///
/// Given the same parent enumeration order at every node the output is
/// deterministic. The graph must be acyclic.
pub fn topological_sort<V: Variable>(variable: &V) -> Vec<V> {
    if variable.is_constant() {
        return Vec::new();
    }

    let mut stack: Vec<V> = vec![variable.clone()];
    let mut visited: HashSet<VariableId> = HashSet::new();
    let mut post_order: Vec<V> = Vec::new();

    while let Some(current) = stack.last() {
        let current_id = current.unique_id();
        if visited.contains(&current_id) {
            stack.pop();
            continue;
        }

        let unvisited: Vec<V> = current
            .parents()
            .into_iter()
            .filter(|parent| !parent.is_constant() && !visited.contains(&parent.unique_id()))
            .collect();

        if unvisited.is_empty() {
            if let Some(node) = stack.pop() {
                trace!("[topological_sort] emit {}", current_id);
                visited.insert(current_id);
                post_order.push(node);
            }
        } else {
            stack.extend(unvisited);
        }
    }

    post_order.reverse();
    debug!(
        "[topological_sort] {} nodes ordered from sink {}",
        post_order.len(),
        variable.unique_id()
    );
    post_order
}

/// Distributes `deriv`, the derivative of some downstream scalar with respect
/// to `variable`, to every leaf ancestor via `accumulate_derivative`.
///
/// Nodes are visited in [`topological_sort`] order with a pending derivative
/// per node id. Since every consumer of a node precedes it in that order, a
/// node's pending entry holds the sum of all contributions by the time it is
/// reached:
///
/// - a leaf receives that sum through `accumulate_derivative`;
/// - a constant never receives anything, and contributions to constant
///   parents are dropped;
/// - any other node runs `chain_rule` once and adds each parent derivative
///   into the parent's pending entry.
///
/// The result on each leaf is the total derivative: the sum over every
/// non-constant path from `variable`.
pub fn backpropagate<V: Variable>(variable: &V, deriv: V::Derivative) -> Result<(), ConvGradError> {
    let order = topological_sort(variable);
    debug!(
        "[backpropagate] walking {} nodes from sink {}",
        order.len(),
        variable.unique_id()
    );

    let mut pending: HashMap<VariableId, V::Derivative> = HashMap::new();
    pending.insert(variable.unique_id(), deriv);

    for node in order {
        let node_id = node.unique_id();
        let Some(d_node) = pending.remove(&node_id) else {
            trace!("[backpropagate] {} received no derivative, skipping", node_id);
            continue;
        };

        if node.is_leaf() {
            trace!("[backpropagate] accumulate into leaf {}", node_id);
            node.accumulate_derivative(d_node)?;
            continue;
        }

        for (parent, d_parent) in node.chain_rule(&d_node)? {
            if parent.is_constant() {
                continue;
            }
            let parent_id = parent.unique_id();
            let merged = match pending.remove(&parent_id) {
                Some(existing) => existing.accumulate(d_parent)?,
                None => d_parent,
            };
            pending.insert(parent_id, merged);
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
