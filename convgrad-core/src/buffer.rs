use std::sync::Arc;

use crate::error::ConvGradError;
use crate::types::DType;

/// Typed CPU storage shared between a tensor and all of its views.
///
/// Cloning a `Buffer` clones the inner `Arc`, never the data.
#[derive(Debug, Clone)]
pub enum Buffer {
    /// Buffer holding f32 data.
    F32(Arc<Vec<f32>>),
    /// Buffer holding f64 data.
    F64(Arc<Vec<f64>>),
}

impl Buffer {
    /// The element type stored in this buffer.
    pub fn dtype(&self) -> DType {
        match self {
            Buffer::F32(_) => DType::F32,
            Buffer::F64(_) => DType::F64,
        }
    }

    /// Number of elements in the underlying storage (not the logical size of a view).
    pub fn len(&self) -> usize {
        match self {
            Buffer::F32(data) => data.len(),
            Buffer::F64(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempts to get a reference to the underlying `Arc<Vec<f32>>`.
    pub fn try_get_f32(&self) -> Result<&Arc<Vec<f32>>, ConvGradError> {
        match self {
            Buffer::F32(data_arc) => Ok(data_arc),
            other => Err(ConvGradError::DTypeMismatch {
                expected: DType::F32,
                actual: other.dtype(),
                operation: "try_get_f32".to_string(),
            }),
        }
    }

    /// Attempts to get a reference to the underlying `Arc<Vec<f64>>`.
    pub fn try_get_f64(&self) -> Result<&Arc<Vec<f64>>, ConvGradError> {
        match self {
            Buffer::F64(data_arc) => Ok(data_arc),
            other => Err(ConvGradError::DTypeMismatch {
                expected: DType::F64,
                actual: other.dtype(),
                operation: "try_get_f64".to_string(),
            }),
        }
    }
}
