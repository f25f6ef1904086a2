//! Graph algorithms exercised on a scalar graph whose chain rule multiplies
//! the upstream derivative by a fixed local derivative per edge.

use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

enum ScalarKind {
    Leaf(Mutex<f64>),
    Constant(Vec<ScalarNode>),
    Op(Vec<(ScalarNode, f64)>),
}

struct ScalarData {
    id: VariableId,
    kind: ScalarKind,
}

#[derive(Clone)]
struct ScalarNode(Arc<ScalarData>);

struct Builder {
    next: usize,
}

impl Builder {
    fn new() -> Self {
        Builder { next: 1 }
    }

    fn make(&mut self, kind: ScalarKind) -> ScalarNode {
        let id = VariableId::new(self.next);
        self.next += 1;
        ScalarNode(Arc::new(ScalarData { id, kind }))
    }

    fn leaf(&mut self) -> ScalarNode {
        self.make(ScalarKind::Leaf(Mutex::new(0.0)))
    }

    fn constant(&mut self, parents: Vec<ScalarNode>) -> ScalarNode {
        self.make(ScalarKind::Constant(parents))
    }

    fn op(&mut self, parents: &[(&ScalarNode, f64)]) -> ScalarNode {
        let parents = parents.iter().map(|(p, d)| ((*p).clone(), *d)).collect();
        self.make(ScalarKind::Op(parents))
    }
}

impl ScalarNode {
    fn derivative(&self) -> f64 {
        match &self.0.kind {
            ScalarKind::Leaf(d) => *d.lock().unwrap(),
            _ => panic!("not a leaf"),
        }
    }
}

impl Variable for ScalarNode {
    type Derivative = f64;

    fn unique_id(&self) -> VariableId {
        self.0.id
    }

    fn is_leaf(&self) -> bool {
        matches!(self.0.kind, ScalarKind::Leaf(_))
    }

    fn is_constant(&self) -> bool {
        matches!(self.0.kind, ScalarKind::Constant(_))
    }

    fn parents(&self) -> Vec<Self> {
        match &self.0.kind {
            ScalarKind::Leaf(_) => vec![],
            ScalarKind::Constant(parents) => parents.clone(),
            ScalarKind::Op(parents) => parents.iter().map(|(p, _)| p.clone()).collect(),
        }
    }

    fn chain_rule(&self, d_output: &f64) -> Result<Vec<(Self, f64)>, ConvGradError> {
        match &self.0.kind {
            ScalarKind::Op(parents) => Ok(parents
                .iter()
                .map(|(p, local)| (p.clone(), d_output * local))
                .collect()),
            _ => Ok(vec![]),
        }
    }

    fn accumulate_derivative(&self, d: f64) -> Result<(), ConvGradError> {
        match &self.0.kind {
            ScalarKind::Leaf(slot) => {
                *slot.lock().unwrap() += d;
                Ok(())
            }
            _ => Err(ConvGradError::InternalError("not a leaf".to_string())),
        }
    }
}

fn ids(order: &[ScalarNode]) -> Vec<usize> {
    order.iter().map(|n| n.unique_id().get()).collect()
}

fn assert_consumers_first(order: &[ScalarNode]) {
    let position: HashMap<VariableId, usize> = order
        .iter()
        .enumerate()
        .map(|(i, n)| (n.unique_id(), i))
        .collect();
    assert_eq!(position.len(), order.len(), "a node was emitted twice");
    for node in order {
        for parent in node.parents() {
            if parent.is_constant() {
                continue;
            }
            assert!(
                position[&node.unique_id()] < position[&parent.unique_id()],
                "{} must precede its parent {}",
                node.unique_id(),
                parent.unique_id()
            );
        }
    }
}

#[test]
fn test_topological_sort_diamond_order() {
    let mut g = Builder::new();
    let x = g.leaf(); // 1
    let a = g.op(&[(&x, 2.0)]); // 2
    let b = g.op(&[(&x, 5.0)]); // 3
    let c = g.op(&[(&a, 1.0), (&b, 1.0)]); // 4

    let order = topological_sort(&c);
    assert_eq!(ids(&order), vec![4, 2, 3, 1]);
    assert_consumers_first(&order);
}

#[test]
fn test_topological_sort_is_deterministic() {
    let mut g = Builder::new();
    let x = g.leaf();
    let y = g.leaf();
    let a = g.op(&[(&x, 1.0), (&y, 1.0)]);
    let b = g.op(&[(&a, 1.0), (&x, 1.0)]);
    let c = g.op(&[(&b, 1.0), (&a, 1.0), (&y, 1.0)]);
    let first = ids(&topological_sort(&c));
    for _ in 0..5 {
        assert_eq!(ids(&topological_sort(&c)), first);
    }
    assert_eq!(first.len(), 5);
}

#[test]
fn test_topological_sort_same_parent_twice() {
    let mut g = Builder::new();
    let x = g.leaf();
    let sq = g.op(&[(&x, 3.0), (&x, 3.0)]);
    let order = topological_sort(&sq);
    assert_eq!(ids(&order), vec![2, 1]);
}

#[test]
fn test_topological_sort_skips_constants() {
    let mut g = Builder::new();
    let x = g.leaf();
    let hidden = g.leaf();
    let k = g.constant(vec![hidden.clone()]);
    let c = g.op(&[(&x, 1.0), (&k, 4.0)]);
    let order = topological_sort(&c);
    assert_eq!(ids(&order), vec![c.unique_id().get(), x.unique_id().get()]);
    assert!(topological_sort(&k).is_empty());
}

#[test]
fn test_topological_sort_random_dags_respect_edges() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let mut g = Builder::new();
        let mut nodes: Vec<ScalarNode> = (0..4).map(|_| g.leaf()).collect();
        for _ in 0..30 {
            let fan_in = rng.gen_range(1..=3);
            let picked: Vec<ScalarNode> = (0..fan_in)
                .map(|_| nodes[rng.gen_range(0..nodes.len())].clone())
                .collect();
            let edges: Vec<(&ScalarNode, f64)> = picked.iter().map(|p| (p, 1.0)).collect();
            let node = g.op(&edges);
            nodes.push(node);
        }
        let sink = nodes.last().unwrap().clone();
        let order = topological_sort(&sink);
        assert_eq!(order[0].unique_id(), sink.unique_id());
        assert_consumers_first(&order);
    }
}

#[test]
fn test_backpropagate_sums_two_paths() {
    let mut g = Builder::new();
    let x = g.leaf();
    let a = g.op(&[(&x, 2.0)]);
    let b = g.op(&[(&x, 5.0)]);
    let c = g.op(&[(&a, 1.0), (&b, 1.0)]);

    backpropagate(&c, 1.0).unwrap();
    assert_eq!(x.derivative(), 7.0);
}

#[test]
fn test_backpropagate_scales_by_upstream_derivative() {
    let mut g = Builder::new();
    let x = g.leaf();
    let y = g.leaf();
    let a = g.op(&[(&x, 3.0), (&y, -1.0)]);
    let b = g.op(&[(&a, 2.0), (&x, 1.0)]);

    backpropagate(&b, 0.5).unwrap();
    // db/dx = 2 * 3 + 1, db/dy = 2 * -1
    assert_eq!(x.derivative(), 3.5);
    assert_eq!(y.derivative(), -1.0);
}

#[test]
fn test_backpropagate_constant_isolation() {
    let mut g = Builder::new();
    let x = g.leaf();
    let exclusive = g.leaf();
    let shared = g.leaf();
    let k = g.constant(vec![exclusive.clone(), shared.clone()]);
    let a = g.op(&[(&k, 10.0), (&shared, 2.0)]);
    let c = g.op(&[(&a, 1.0), (&x, 1.0)]);

    backpropagate(&c, 1.0).unwrap();
    assert_eq!(x.derivative(), 1.0);
    assert_eq!(shared.derivative(), 2.0);
    assert_eq!(exclusive.derivative(), 0.0);
}

#[test]
fn test_backpropagate_on_leaf_and_constant_sinks() {
    let mut g = Builder::new();
    let x = g.leaf();
    backpropagate(&x, 4.0).unwrap();
    assert_eq!(x.derivative(), 4.0);

    let hidden = g.leaf();
    let k = g.constant(vec![hidden.clone()]);
    backpropagate(&k, 1.0).unwrap();
    assert_eq!(hidden.derivative(), 0.0);
}

#[test]
fn test_backpropagate_twice_accumulates() {
    let mut g = Builder::new();
    let x = g.leaf();
    let a = g.op(&[(&x, 3.0)]);
    backpropagate(&a, 1.0).unwrap();
    backpropagate(&a, 1.0).unwrap();
    assert_eq!(x.derivative(), 6.0);
}

#[test]
fn test_backpropagate_deep_chain_is_iterative() {
    let mut g = Builder::new();
    let x = g.leaf();
    let mut current = g.op(&[(&x, 1.0)]);
    for _ in 0..2_000 {
        current = g.op(&[(&current, 1.0)]);
    }
    let order = topological_sort(&current);
    assert_eq!(order.len(), 2_002);
    backpropagate(&current, 1.0).unwrap();
    assert_eq!(x.derivative(), 1.0);
}

#[test]
fn test_backpropagate_many_reconverging_paths() {
    // Ladder of diamonds: each rung doubles the number of paths to x.
    let mut g = Builder::new();
    let x = g.leaf();
    let mut current = x.clone();
    for _ in 0..20 {
        let left = g.op(&[(&current, 1.0)]);
        let right = g.op(&[(&current, 1.0)]);
        current = g.op(&[(&left, 1.0), (&right, 1.0)]);
    }
    backpropagate(&current, 1.0).unwrap();
    assert_eq!(x.derivative(), (1u64 << 20) as f64);
}
