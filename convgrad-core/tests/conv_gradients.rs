use approx::assert_relative_eq;
use convgrad_core::tensor::create::ones_f64;
use convgrad_core::utils::testing::check_tensor_near;
use convgrad_core::{
    central_difference, conv1d, conv1d_op, conv2d, conv2d_op, ConvGradError, Graph, Tensor,
};

mod common;
use common::{create_test_tensor, init_logging, seeded_tensors};

type ConvOp = fn(&Tensor, &Tensor) -> Result<Tensor, ConvGradError>;

/// `Σ conv(input, weight) · grad` as a function of the flattened values of
/// one operand.
fn loss_of(
    op: ConvOp,
    input: &Tensor,
    weight: &Tensor,
    grad: &Tensor,
    perturb_input: bool,
) -> impl Fn(&[f64]) -> f64 {
    let (input, weight, grad) = (input.clone(), weight.clone(), grad.clone());
    let g = grad.get_f64_data().unwrap();
    move |values: &[f64]| {
        let (x, w) = if perturb_input {
            (create_test_tensor(values.to_vec(), input.shape().to_vec()), weight.clone())
        } else {
            (input.clone(), create_test_tensor(values.to_vec(), weight.shape().to_vec()))
        };
        let out = op(&x, &w).unwrap().get_f64_data().unwrap();
        out.iter().zip(g.iter()).map(|(o, g)| o * g).sum()
    }
}

fn assert_matches_central_difference(analytic: &Tensor, f: impl Fn(&[f64]) -> f64, at: &Tensor) {
    let values = at.get_f64_data().unwrap();
    let analytic = analytic.get_f64_data().unwrap();
    for arg in 0..values.len() {
        let numeric = central_difference(&f, &values, arg, 1e-6);
        assert_relative_eq!(analytic[arg], numeric, max_relative = 1e-2, epsilon = 1e-6);
    }
}

#[test]
fn test_conv1d_backward_matches_central_difference() {
    init_logging();
    let t = seeded_tensors(10, &[&[2, 3, 6], &[4, 3, 3], &[2, 4, 6]]);
    let (input, weight, grad) = (&t[0], &t[1], &t[2]);

    let graph = Graph::new();
    let x = graph.leaf(input.clone());
    let w = graph.leaf(weight.clone());
    conv1d(&x, &w).unwrap().backward_with(grad.clone()).unwrap();

    assert_matches_central_difference(
        &x.grad().unwrap(),
        loss_of(conv1d_op, input, weight, grad, true),
        input,
    );
    assert_matches_central_difference(
        &w.grad().unwrap(),
        loss_of(conv1d_op, input, weight, grad, false),
        weight,
    );
}

#[test]
fn test_conv2d_backward_matches_central_difference() {
    init_logging();
    let t = seeded_tensors(20, &[&[2, 2, 4, 4], &[3, 2, 3, 2], &[2, 3, 4, 4]]);
    let (input, weight, grad) = (&t[0], &t[1], &t[2]);

    let graph = Graph::new();
    let x = graph.leaf(input.clone());
    let w = graph.leaf(weight.clone());
    conv2d(&x, &w).unwrap().backward_with(grad.clone()).unwrap();

    assert_matches_central_difference(
        &x.grad().unwrap(),
        loss_of(conv2d_op, input, weight, grad, true),
        input,
    );
    assert_matches_central_difference(
        &w.grad().unwrap(),
        loss_of(conv2d_op, input, weight, grad, false),
        weight,
    );
}

#[test]
fn test_conv1d_padding_boundary_literals() {
    let input = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![1, 1, 5]);
    let weight = create_test_tensor(vec![1.0, 1.0, 1.0], vec![1, 1, 3]);
    let out = conv1d_op(&input, &weight).unwrap();
    check_tensor_near(&out, &[1, 1, 5], &[6.0, 9.0, 12.0, 9.0, 5.0], 0.0);

    // The input gradient runs the same kernel anchored at the other end.
    let graph = Graph::new();
    let x = graph.leaf(input.clone());
    let w = graph.constant(weight.clone());
    conv1d(&x, &w)
        .unwrap()
        .backward_with(input.clone())
        .unwrap();
    check_tensor_near(&x.grad().unwrap(), &[1, 1, 5], &[1.0, 3.0, 6.0, 9.0, 12.0], 0.0);
}

#[test]
fn test_conv_chain_trains_both_layers() {
    // Two stacked convolutions feeding a scalar loss.
    let t = seeded_tensors(30, &[&[1, 2, 8], &[3, 2, 3], &[1, 3, 2]]);
    let graph = Graph::new();
    let x = graph.constant(t[0].clone());
    let w1 = graph.leaf(t[1].clone());
    let w2 = graph.leaf(t[2].clone());
    let hidden = conv1d(&x, &w1).unwrap();
    let out = conv1d(&hidden, &w2).unwrap();
    out.backward_with(ones_f64(out.shape()).unwrap()).unwrap();
    assert_eq!(w1.grad().unwrap().shape(), &[3, 2, 3]);
    assert_eq!(w2.grad().unwrap().shape(), &[1, 3, 2]);
    assert!(x.grad().is_none());
}
