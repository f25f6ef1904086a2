// src/tensor/create.rs

use crate::error::ConvGradError;
use crate::ops::traits::numeric::GradNumeric;
use crate::tensor::Tensor;
use crate::types::DType;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Creates a tensor of `shape` and `dtype` filled with `value`.
pub fn full_of(shape: &[usize], value: f64, dtype: DType) -> Result<Tensor, ConvGradError> {
    let numel = shape.iter().product();
    match dtype {
        DType::F32 => Tensor::new(vec![f32::cast_f64(value); numel], shape.to_vec()),
        DType::F64 => Tensor::new_f64(vec![value; numel], shape.to_vec()),
    }
}

/// Creates a zero-filled tensor of `shape` and `dtype`.
pub fn zeros_of(shape: &[usize], dtype: DType) -> Result<Tensor, ConvGradError> {
    full_of(shape, 0.0, dtype)
}

/// Creates a new F32 tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Result<Tensor, ConvGradError> {
    zeros_of(shape, DType::F32)
}

/// Creates a new F64 tensor filled with zeros with the specified shape.
pub fn zeros_f64(shape: &[usize]) -> Result<Tensor, ConvGradError> {
    zeros_of(shape, DType::F64)
}

/// Creates a new F32 tensor filled with ones with the specified shape.
pub fn ones(shape: &[usize]) -> Result<Tensor, ConvGradError> {
    full_of(shape, 1.0, DType::F32)
}

/// Creates a new F64 tensor filled with ones with the specified shape.
pub fn ones_f64(shape: &[usize]) -> Result<Tensor, ConvGradError> {
    full_of(shape, 1.0, DType::F64)
}

pub fn full(shape: &[usize], value: f32) -> Result<Tensor, ConvGradError> {
    full_of(shape, value as f64, DType::F32)
}

pub fn full_f64(shape: &[usize], value: f64) -> Result<Tensor, ConvGradError> {
    full_of(shape, value, DType::F64)
}

/// Zeros with the shape and dtype of `tensor`.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, ConvGradError> {
    zeros_of(tensor.shape(), tensor.dtype())
}

/// Ones with the shape and dtype of `tensor`.
pub fn ones_like(tensor: &Tensor) -> Result<Tensor, ConvGradError> {
    full_of(tensor.shape(), 1.0, tensor.dtype())
}

pub fn from_vec_f32(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Tensor, ConvGradError> {
    Tensor::new(data_vec, shape)
}

pub fn from_vec_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Tensor, ConvGradError> {
    Tensor::new_f64(data_vec, shape)
}

/// Uniform samples in `[0, 1)` drawn from `rng`.
pub fn rand_with_rng<R: Rng + ?Sized>(
    shape: &[usize],
    dtype: DType,
    rng: &mut R,
) -> Result<Tensor, ConvGradError> {
    let numel = shape.iter().product();
    match dtype {
        DType::F32 => Tensor::new((0..numel).map(|_| rng.gen::<f32>()).collect(), shape.to_vec()),
        DType::F64 => Tensor::new_f64((0..numel).map(|_| rng.gen::<f64>()).collect(), shape.to_vec()),
    }
}

/// Standard normal samples drawn from `rng`.
pub fn randn_with_rng<R: Rng + ?Sized>(
    shape: &[usize],
    dtype: DType,
    rng: &mut R,
) -> Result<Tensor, ConvGradError> {
    let numel = shape.iter().product();
    match dtype {
        DType::F32 => Tensor::new(
            (0..numel).map(|_| StandardNormal.sample(rng)).collect(),
            shape.to_vec(),
        ),
        DType::F64 => Tensor::new_f64(
            (0..numel).map(|_| StandardNormal.sample(rng)).collect(),
            shape.to_vec(),
        ),
    }
}

// Note: rand and randn use the thread-local RNG; tests that need
// reproducible values go through the `_with_rng` variants.

pub fn rand(shape: &[usize]) -> Result<Tensor, ConvGradError> {
    rand_with_rng(shape, DType::F32, &mut rand::thread_rng())
}

pub fn randn(shape: &[usize]) -> Result<Tensor, ConvGradError> {
    randn_with_rng(shape, DType::F32, &mut rand::thread_rng())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
