// src/tensor/mod.rs

use crate::error::ConvGradError;
use crate::tensor_data::TensorData;
use std::sync::Arc;

mod accessors;
mod debug;
pub mod create;
mod view_methods;

pub mod utils;

pub use create::{ones, ones_like, zeros, zeros_like};

/// Represents a multi-dimensional, strided view over shared storage.
///
/// `Tensor` is a cheap handle around `Arc<TensorData>`: cloning it shares the
/// metadata and the buffer, and views such as [`Tensor::permute`] share the
/// buffer with new shape/stride metadata. Tensors are immutable once built;
/// kernels write only into freshly allocated output vectors.
#[derive(Clone)]
pub struct Tensor {
    pub(crate) data: Arc<TensorData>,
}

impl Tensor {
    /// Creates a new contiguous F32 tensor from row-major data.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, ConvGradError> {
        Self::from_data(TensorData::new(data_vec, shape)?)
    }

    /// Creates a new contiguous F64 tensor from row-major data.
    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, ConvGradError> {
        Self::from_data(TensorData::new(data_vec, shape)?)
    }

    pub(crate) fn from_data(tensor_data: TensorData) -> Result<Self, ConvGradError> {
        Ok(Tensor {
            data: Arc::new(tensor_data),
        })
    }

    /// Read access to the tensor's metadata and buffer.
    pub fn read_data(&self) -> &TensorData {
        &self.data
    }
}
