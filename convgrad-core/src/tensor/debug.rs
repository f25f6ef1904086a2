// src/tensor/debug.rs
use crate::tensor::Tensor;
use std::fmt;

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let td = self.read_data();
        write!(
            f,
            "Tensor(shape={:?}, strides={:?}, offset={}, dtype={:?}, contiguous={})",
            td.shape,
            td.strides,
            td.offset,
            td.dtype,
            td.is_contiguous()
        )
    }
}
