use crate::tensor::Tensor;

/// Checks that `actual` has `expected_shape` and that every element, read in
/// logical order and widened to `f64`, is within `tolerance` of `expected_data`.
///
/// Panics with the first offending index otherwise. Works for either dtype
/// and any layout.
pub fn check_tensor_near(
    actual: &Tensor,
    expected_shape: &[usize],
    expected_data: &[f64],
    tolerance: f64,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");

    let actual_data = actual
        .to_f64_vec()
        .expect("Failed to read tensor data in check_tensor_near");

    assert_eq!(
        actual_data.len(),
        expected_data.len(),
        "Data length mismatch"
    );

    for (i, (a, e)) in actual_data.iter().zip(expected_data.iter()).enumerate() {
        let diff = (a - e).abs();
        if diff > tolerance {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}
