// src/tensor/view_methods.rs
use std::sync::Arc;

use crate::error::ConvGradError;
use crate::ops::view::utils::{permute_shape, permute_strides, validate_permutation};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;

impl Tensor {
    /// Reorders the axes of the tensor without copying data.
    ///
    /// The returned view shares this tensor's buffer; only its shape and
    /// strides are permuted. `dims[i]` names the source axis that becomes axis `i`.
    pub fn permute(&self, dims: &[usize]) -> Result<Tensor, ConvGradError> {
        let td = self.read_data();
        validate_permutation(td.shape.len(), dims)?;
        let view = TensorData::new_view(
            Arc::clone(&td.buffer),
            td.offset,
            permute_shape(&td.shape, dims),
            permute_strides(&td.strides, dims),
        );
        Tensor::from_data(view)
    }

    /// Returns a tensor with the same values laid out contiguously.
    ///
    /// A tensor that is already contiguous is returned as a cheap clone.
    pub fn contiguous(&self) -> Result<Tensor, ConvGradError> {
        if self.is_contiguous() {
            return Ok(self.clone());
        }
        let shape = self.shape().to_vec();
        match self.dtype() {
            DType::F32 => Tensor::new(self.get_f32_data()?, shape),
            DType::F64 => Tensor::new_f64(self.get_f64_data()?, shape),
        }
    }

    /// Allocates a fresh zero-filled tensor of `shape` with this tensor's dtype.
    pub fn zeros(&self, shape: &[usize]) -> Result<Tensor, ConvGradError> {
        super::create::zeros_of(shape, self.dtype())
    }
}
