use convgrad_core::tensor::create::randn_with_rng;
use convgrad_core::{DType, Tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Installs a test logger. Safe to call from every test.
#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Standard normal f64 tensors drawn from a seeded generator, one per shape.
#[allow(dead_code)]
pub fn seeded_tensors(seed: u64, shapes: &[&[usize]]) -> Vec<Tensor> {
    let mut rng = StdRng::seed_from_u64(seed);
    shapes
        .iter()
        .map(|shape| randn_with_rng(shape, DType::F64, &mut rng).expect("Test tensor creation failed"))
        .collect()
}

#[allow(dead_code)]
pub fn create_test_tensor(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    Tensor::new_f64(data, shape).expect("Test tensor creation failed")
}
