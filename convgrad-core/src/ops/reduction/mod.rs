pub mod sum;

pub use sum::{sum, sum_op, SumFun};
