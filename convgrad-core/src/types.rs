/// Defines the possible data types for Tensor elements.
///
/// The convolution kernels are generic over the float type; this enum is what
/// the tensor layer dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit floating-point type.
    F32,
    /// 64-bit floating-point type.
    F64,
}
