// src/tensor_data.rs
use std::fmt::Debug;
use std::sync::Arc;

use crate::buffer::Buffer;
use crate::error::ConvGradError;
use crate::ops::traits::numeric::GradNumeric;
use crate::tensor::utils::{calculate_strides, index_to_position};
use crate::types::DType;

/// Internal storage and metadata for a Tensor.
///
/// Holds the shared data buffer and the shape/stride/offset triple that
/// interprets it. Several `TensorData` may point at the same buffer (views),
/// which is why nothing in the crate assumes a tensor's own layout is
/// contiguous.
#[derive(Debug)]
pub struct TensorData {
    /// The underlying typed buffer, shared with every view of it.
    pub(crate) buffer: Arc<Buffer>,
    /// The data type of the elements in the buffer.
    pub(crate) dtype: DType,
    /// The logical extent of each axis.
    pub(crate) shape: Vec<usize>,
    /// Memory jump (in elements) for one step along each axis.
    pub(crate) strides: Vec<usize>,
    /// Position of the logical element `[0, 0, ...]` inside the buffer.
    pub(crate) offset: usize,
}

impl TensorData {
    /// Creates contiguous `TensorData` owning `data_vec`.
    ///
    /// # Errors
    /// Returns `ConvGradError::TensorCreationError` if the length of `data_vec`
    /// does not match the number of elements described by `shape`.
    pub fn new<T: GradNumeric>(data_vec: Vec<T>, shape: Vec<usize>) -> Result<Self, ConvGradError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(ConvGradError::TensorCreationError { data_len, shape });
        }
        let strides = calculate_strides(&shape);
        Ok(TensorData {
            buffer: Arc::new(T::into_buffer(data_vec)),
            dtype: T::DTYPE,
            shape,
            strides,
            offset: 0,
        })
    }

    /// Creates a view over an existing buffer. No data is copied.
    pub(crate) fn new_view(
        buffer: Arc<Buffer>,
        offset: usize,
        shape: Vec<usize>,
        strides: Vec<usize>,
    ) -> Self {
        let dtype = buffer.dtype();
        TensorData {
            buffer,
            dtype,
            shape,
            strides,
            offset,
        }
    }

    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Offset into the shared buffer of the element at `indices`.
    ///
    /// Panics if the number of indices doesn't match the rank or if any index is out of bounds.
    pub fn get_offset(&self, indices: &[usize]) -> usize {
        assert_eq!(
            indices.len(),
            self.shape.len(),
            "Number of indices ({}) does not match tensor rank ({}) for shape {:?}",
            indices.len(),
            self.shape.len(),
            self.shape
        );
        for (axis, (&idx, &dim)) in indices.iter().zip(self.shape.iter()).enumerate() {
            assert!(
                idx < dim,
                "Index {} is out of bounds for dimension {} with size {} (shape: {:?})",
                idx,
                axis,
                dim,
                self.shape
            );
        }
        self.offset + index_to_position(indices, &self.strides)
    }

    /// Checks whether the elements are laid out in row-major order without gaps.
    pub fn is_contiguous(&self) -> bool {
        let mut current_stride = 1;
        for i in (0..self.shape.len()).rev() {
            let dim = self.shape[i];
            if dim == 0 {
                return true;
            }
            if dim != 1 {
                if self.strides[i] != current_stride {
                    return false;
                }
                current_stride *= dim;
            }
        }
        true
    }

    /// The typed slice of storage starting at this tensor's offset.
    ///
    /// Combined with `shape` and `strides` this is exactly the
    /// `(storage, shape, strides)` triple the kernels consume.
    pub(crate) fn storage<T: GradNumeric>(&self, operation: &str) -> Result<&[T], ConvGradError> {
        let data = T::storage(&self.buffer).ok_or_else(|| ConvGradError::DTypeMismatch {
            expected: T::DTYPE,
            actual: self.dtype,
            operation: operation.to_string(),
        })?;
        Ok(&data[self.offset..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        let err = TensorData::new(vec![1.0f64, 2.0, 3.0], vec![2, 2]).unwrap_err();
        assert_eq!(
            err,
            ConvGradError::TensorCreationError { data_len: 3, shape: vec![2, 2] }
        );
    }

    #[test]
    fn test_get_offset_uses_strides_and_offset() {
        let td = TensorData::new((0..6).map(|x| x as f64).collect(), vec![2, 3]).unwrap();
        let view = TensorData::new_view(Arc::clone(&td.buffer), 1, vec![3, 2], vec![1, 3]);
        assert_eq!(view.get_offset(&[0, 0]), 1);
        assert_eq!(view.get_offset(&[1, 1]), 5);
        assert!(!view.is_contiguous());
    }

    #[test]
    #[should_panic]
    fn test_get_offset_out_of_bounds_panics() {
        let td = TensorData::new(vec![1.0f32; 4], vec![2, 2]).unwrap();
        td.get_offset(&[2, 0]);
    }

    #[test]
    fn test_storage_dtype_check() {
        let td = TensorData::new(vec![1.0f32; 4], vec![4]).unwrap();
        assert!(td.storage::<f32>("test").is_ok());
        assert!(matches!(
            td.storage::<f64>("test"),
            Err(ConvGradError::DTypeMismatch { .. })
        ));
    }
}
