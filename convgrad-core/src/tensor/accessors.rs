// src/tensor/accessors.rs
use crate::{
    error::ConvGradError,
    ops::traits::numeric::GradNumeric,
    tensor::{utils::to_index, Tensor},
    types::DType,
};

impl Tensor {
    /// Returns the tensor's shape (dimensions).
    pub fn shape(&self) -> &[usize] {
        &self.read_data().shape
    }

    /// Returns the tensor's strides.
    pub fn strides(&self) -> &[usize] {
        &self.read_data().strides
    }

    /// Position of the first logical element inside the shared buffer.
    pub fn offset(&self) -> usize {
        self.read_data().offset
    }

    /// Returns the data type (`DType`) of the tensor elements.
    pub fn dtype(&self) -> DType {
        self.read_data().dtype
    }

    /// Returns the rank (number of dimensions) of the tensor.
    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    /// Returns the total number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Checks if the tensor is laid out in row-major order without gaps.
    pub fn is_contiguous(&self) -> bool {
        self.read_data().is_contiguous()
    }

    /// True when both tensors view the same underlying buffer.
    pub fn shares_storage_with(&self, other: &Tensor) -> bool {
        std::sync::Arc::ptr_eq(&self.read_data().buffer, &other.read_data().buffer)
    }

    /// Typed storage slice starting at this tensor's offset.
    ///
    /// Together with [`Tensor::shape`] and [`Tensor::strides`] this is the
    /// `(storage, shape, strides)` triple handed to the kernels.
    pub(crate) fn storage<T: GradNumeric>(&self, operation: &str) -> Result<&[T], ConvGradError> {
        self.read_data().storage(operation)
    }

    /// Copies the elements in logical (row-major) order, whatever the layout.
    pub(crate) fn to_vec_typed<T: GradNumeric>(&self, operation: &str) -> Result<Vec<T>, ConvGradError> {
        let td = self.read_data();
        let storage: &[T] = td.storage(operation)?;
        if td.is_contiguous() {
            return Ok(storage[..td.numel()].to_vec());
        }
        let mut index = vec![0; td.shape.len()];
        let mut out = Vec::with_capacity(td.numel());
        for ordinal in 0..td.numel() {
            to_index(ordinal, &td.shape, &mut index);
            out.push(storage[td.get_offset(&index) - td.offset]);
        }
        Ok(out)
    }

    /// Returns the elements as a `Vec<f32>` in logical order.
    pub fn get_f32_data(&self) -> Result<Vec<f32>, ConvGradError> {
        self.to_vec_typed::<f32>("get_f32_data")
    }

    /// Returns the elements as a `Vec<f64>` in logical order.
    pub fn get_f64_data(&self) -> Result<Vec<f64>, ConvGradError> {
        self.to_vec_typed::<f64>("get_f64_data")
    }

    /// Returns the elements widened to `f64`, for either dtype.
    pub fn to_f64_vec(&self) -> Result<Vec<f64>, ConvGradError> {
        match self.dtype() {
            DType::F32 => self.to_f64_vec_typed::<f32>(),
            DType::F64 => self.to_f64_vec_typed::<f64>(),
        }
    }

    fn to_f64_vec_typed<T: GradNumeric>(&self) -> Result<Vec<f64>, ConvGradError> {
        Ok(self
            .to_vec_typed::<T>("to_f64_vec")?
            .into_iter()
            .map(T::as_f64)
            .collect())
    }

    /// Reads one element by logical index, widened to `f64`.
    pub fn at(&self, index: &[usize]) -> Result<f64, ConvGradError> {
        let td = self.read_data();
        if index.len() != td.shape.len() {
            return Err(ConvGradError::RankMismatch {
                expected: td.shape.len(),
                actual: index.len(),
            });
        }
        if index.iter().zip(td.shape.iter()).any(|(i, d)| i >= d) {
            return Err(ConvGradError::IndexOutOfBounds {
                index: index.to_vec(),
                shape: td.shape.clone(),
            });
        }
        let position = td.get_offset(index);
        match td.dtype {
            DType::F32 => Ok(td.buffer.try_get_f32()?[position].as_f64()),
            DType::F64 => Ok(td.buffer.try_get_f64()?[position]),
        }
    }

    /// Extracts the value of a tensor holding exactly one element, as `f64`.
    pub fn item_f64(&self) -> Result<f64, ConvGradError> {
        let numel = self.numel();
        if numel != 1 {
            return Err(ConvGradError::ShapeMismatch {
                expected: vec![],
                actual: self.shape().to_vec(),
                operation: "item_f64".to_string(),
            });
        }
        let index = vec![0; self.rank()];
        self.at(&index)
    }
}
