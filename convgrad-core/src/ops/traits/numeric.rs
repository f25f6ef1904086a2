use num_traits::Float;
use std::fmt::Debug;
use std::sync::Arc;

use crate::buffer::Buffer;
use crate::types::DType;

/// Float element types the kernels are generic over.
///
/// Besides the arithmetic bounds, the trait ties each Rust type to its
/// `DType` tag and to the matching `Buffer` variant, which lets the tensor
/// layer move between typed slices and the type-erased buffer.
pub trait GradNumeric: Float + Debug + Send + Sync + 'static {
    const DTYPE: DType;

    /// Borrows the typed storage of `buffer`, or `None` for another dtype.
    fn storage(buffer: &Buffer) -> Option<&[Self]>;

    /// Wraps an owned vector into a shareable buffer.
    fn into_buffer(data: Vec<Self>) -> Buffer;

    /// Widens to `f64`, exactly.
    fn as_f64(self) -> f64;

    /// Narrows from `f64`, rounding to the nearest value of `Self`.
    fn cast_f64(value: f64) -> Self;
}

impl GradNumeric for f32 {
    const DTYPE: DType = DType::F32;

    fn storage(buffer: &Buffer) -> Option<&[Self]> {
        match buffer {
            Buffer::F32(data) => Some(data.as_slice()),
            _ => None,
        }
    }

    fn into_buffer(data: Vec<Self>) -> Buffer {
        Buffer::F32(Arc::new(data))
    }

    fn as_f64(self) -> f64 {
        self as f64
    }

    fn cast_f64(value: f64) -> Self {
        value as f32
    }
}

impl GradNumeric for f64 {
    const DTYPE: DType = DType::F64;

    fn storage(buffer: &Buffer) -> Option<&[Self]> {
        match buffer {
            Buffer::F64(data) => Some(data.as_slice()),
            _ => None,
        }
    }

    fn into_buffer(data: Vec<Self>) -> Buffer {
        Buffer::F64(Arc::new(data))
    }

    fn as_f64(self) -> f64 {
        self
    }

    fn cast_f64(value: f64) -> Self {
        value
    }
}
