//! Index arithmetic shared by the tensor layer and the kernels.
//!
//! Everything here works from `(shape, strides)` tuples only, so the same
//! helpers serve contiguous tensors and permuted views alike.

/// Calculates the strides for a contiguous (row-major) tensor of the given shape.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [2, 2, 2] -> strides = [4, 2, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Dot product of an index with the strides: the storage position of `index`.
#[inline]
pub fn index_to_position(index: &[usize], strides: &[usize]) -> usize {
    index.iter().zip(strides.iter()).map(|(i, s)| i * s).sum()
}

/// Converts a logical (row-major) ordinal into a multi-dimensional index.
///
/// `ordinal` must be smaller than the product of `shape`.
pub fn to_index(ordinal: usize, shape: &[usize], out_index: &mut [usize]) {
    let mut rem = ordinal;
    for axis in (0..shape.len()).rev() {
        let dim = shape[axis];
        if dim == 0 {
            out_index[axis] = 0;
            continue;
        }
        out_index[axis] = rem % dim;
        rem /= dim;
    }
}

/// Axes of a dense layout ordered from the largest to the smallest stride.
///
/// Axes of extent 1 are left out: their index is always 0 and their stride
/// carries no information about the layout.
pub fn dense_axis_order(shape: &[usize], strides: &[usize]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..shape.len()).filter(|&axis| shape[axis] != 1).collect();
    order.sort_by(|&a, &b| strides[b].cmp(&strides[a]));
    order
}

/// Converts a storage ordinal of a dense (gap-free, possibly permuted) layout
/// back into its logical index.
///
/// `axis_order` comes from [`dense_axis_order`] for the same shape and strides.
/// Axes missing from `axis_order` are set to 0.
pub fn to_index_by_strides(
    ordinal: usize,
    axis_order: &[usize],
    strides: &[usize],
    out_index: &mut [usize],
) {
    out_index.iter_mut().for_each(|i| *i = 0);
    let mut rem = ordinal;
    for &axis in axis_order {
        let stride = strides[axis];
        if stride == 0 {
            continue;
        }
        out_index[axis] = rem / stride;
        rem %= stride;
    }
}

#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;
