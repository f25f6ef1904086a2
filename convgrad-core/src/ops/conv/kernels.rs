//! Stride-aware direct convolution kernels.
//!
//! Both kernels take the same positional contract: the output storage with
//! its shape, strides and size, then the input and weight storage each with
//! shape and strides, then the `reverse` flag. Nothing is assumed about
//! memory layout beyond what the stride tuples say, which is what lets the
//! backward passes feed the kernels axis-permuted views of the forward
//! operands.
//!
//! Padding is implicit: a kernel offset that lands outside the input
//! contributes nothing.

use num_traits::Float;

use crate::tensor::utils::{dense_axis_order, to_index_by_strides};

/// Input position for output position `j` and kernel offset `k`:
/// `j + k`, or `j - k` when `reverse`. `None` outside `0..extent`.
#[inline]
fn shifted(j: usize, k: usize, reverse: bool, extent: usize) -> Option<usize> {
    let position = if reverse { j.checked_sub(k)? } else { j + k };
    (position < extent).then_some(position)
}

/// Writes `value_at(ordinal)` into every output slot.
///
/// Output positions are independent: each one is computed by a single
/// worker that reads only the inputs and writes only its own slot.
#[cfg(feature = "parallel")]
fn fill_output<T, F>(out: &mut [T], value_at: F)
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    use rayon::prelude::*;
    out.par_iter_mut()
        .enumerate()
        .for_each(|(ordinal, slot)| *slot = value_at(ordinal));
}

#[cfg(not(feature = "parallel"))]
fn fill_output<T, F>(out: &mut [T], value_at: F)
where
    F: Fn(usize) -> T,
{
    out.iter_mut()
        .enumerate()
        .for_each(|(ordinal, slot)| *slot = value_at(ordinal));
}

/// 1D convolution.
///
/// Given input `(batch, in_channels, width)` and weight
/// `(out_channels, in_channels, k_width)`, computes
///
/// ```text
/// out[b, oc, j] = Σ_ic Σ_k input[b, ic, j ± k] · weight[oc, ic, k]
/// ```
///
/// with `+k` when `reverse` is false (weight anchored left) and `-k` when it
/// is true (anchored right). The output extent along the last axis is taken
/// from `out_shape` and need not equal the input width.
///
/// `out` must be a dense layout of `out_shape` (any axis order); element
/// `out[ordinal]` is mapped back to its logical index through `out_strides`.
///
/// # Panics
/// If any operand is not rank 3, if batch, in-channel or out-channel extents
/// disagree, or if `out_size` differs from `out.len()`.
#[allow(clippy::too_many_arguments)]
pub fn tensor_conv1d<T: Float + Send + Sync>(
    out: &mut [T],
    out_shape: &[usize],
    out_strides: &[usize],
    out_size: usize,
    input: &[T],
    input_shape: &[usize],
    input_strides: &[usize],
    weight: &[T],
    weight_shape: &[usize],
    weight_strides: &[usize],
    reverse: bool,
) {
    assert!(
        out_shape.len() == 3 && input_shape.len() == 3 && weight_shape.len() == 3,
        "tensor_conv1d expects rank-3 operands, got out {:?}, input {:?}, weight {:?}",
        out_shape,
        input_shape,
        weight_shape
    );
    let (batch_, out_channels) = (out_shape[0], out_shape[1]);
    let (batch, in_channels, width) = (input_shape[0], input_shape[1], input_shape[2]);
    let (out_channels_, in_channels_, kw) = (weight_shape[0], weight_shape[1], weight_shape[2]);
    assert!(
        batch == batch_ && in_channels == in_channels_ && out_channels == out_channels_,
        "tensor_conv1d shape mismatch: out {:?}, input {:?}, weight {:?}",
        out_shape,
        input_shape,
        weight_shape
    );
    assert_eq!(out_size, out.len(), "tensor_conv1d: out_size does not match output storage");

    let axis_order = dense_axis_order(out_shape, out_strides);
    fill_output(out, |ordinal| {
        let mut out_index = [0usize; 3];
        to_index_by_strides(ordinal, &axis_order, out_strides, &mut out_index);
        let [b, oc, j] = out_index;

        let mut acc = T::zero();
        for ic in 0..in_channels {
            let input_base = b * input_strides[0] + ic * input_strides[1];
            let weight_base = oc * weight_strides[0] + ic * weight_strides[1];
            for k in 0..kw {
                let Some(x) = shifted(j, k, reverse, width) else {
                    continue;
                };
                acc = acc
                    + input[input_base + x * input_strides[2]]
                        * weight[weight_base + k * weight_strides[2]];
            }
        }
        acc
    });
}

/// 2D convolution.
///
/// Given input `(batch, in_channels, height, width)` and weight
/// `(out_channels, in_channels, k_height, k_width)`, computes
///
/// ```text
/// out[b, oc, i, j] = Σ_ic Σ_ki Σ_kj input[b, ic, i ± ki, j ± kj] · weight[oc, ic, ki, kj]
/// ```
///
/// Both spatial offsets take the same sign: `+` with the weight anchored
/// top-left (`reverse` false), `-` anchored bottom-right. Each spatial
/// boundary is zero-padded independently.
///
/// # Panics
/// Under the same conditions as [`tensor_conv1d`], with rank 4.
#[allow(clippy::too_many_arguments)]
pub fn tensor_conv2d<T: Float + Send + Sync>(
    out: &mut [T],
    out_shape: &[usize],
    out_strides: &[usize],
    out_size: usize,
    input: &[T],
    input_shape: &[usize],
    input_strides: &[usize],
    weight: &[T],
    weight_shape: &[usize],
    weight_strides: &[usize],
    reverse: bool,
) {
    assert!(
        out_shape.len() == 4 && input_shape.len() == 4 && weight_shape.len() == 4,
        "tensor_conv2d expects rank-4 operands, got out {:?}, input {:?}, weight {:?}",
        out_shape,
        input_shape,
        weight_shape
    );
    let (batch_, out_channels) = (out_shape[0], out_shape[1]);
    let (batch, in_channels, height, width) =
        (input_shape[0], input_shape[1], input_shape[2], input_shape[3]);
    let (out_channels_, in_channels_, kh, kw) =
        (weight_shape[0], weight_shape[1], weight_shape[2], weight_shape[3]);
    assert!(
        batch == batch_ && in_channels == in_channels_ && out_channels == out_channels_,
        "tensor_conv2d shape mismatch: out {:?}, input {:?}, weight {:?}",
        out_shape,
        input_shape,
        weight_shape
    );
    assert_eq!(out_size, out.len(), "tensor_conv2d: out_size does not match output storage");

    let axis_order = dense_axis_order(out_shape, out_strides);
    fill_output(out, |ordinal| {
        let mut out_index = [0usize; 4];
        to_index_by_strides(ordinal, &axis_order, out_strides, &mut out_index);
        let [b, oc, i, j] = out_index;

        let mut acc = T::zero();
        for ic in 0..in_channels {
            let input_base = b * input_strides[0] + ic * input_strides[1];
            let weight_base = oc * weight_strides[0] + ic * weight_strides[1];
            for ki in 0..kh {
                let Some(y) = shifted(i, ki, reverse, height) else {
                    continue;
                };
                for kj in 0..kw {
                    let Some(x) = shifted(j, kj, reverse, width) else {
                        continue;
                    };
                    acc = acc
                        + input[input_base + y * input_strides[2] + x * input_strides[3]]
                            * weight[weight_base + ki * weight_strides[2] + kj * weight_strides[3]];
                }
            }
        }
        acc
    });
}

#[cfg(test)]
#[path = "kernels_test.rs"]
mod tests;
