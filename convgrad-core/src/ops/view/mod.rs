pub mod permute;
pub mod utils;

pub use permute::{permute, permute_op, PermuteFun};
