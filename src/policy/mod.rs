//! Engine policies applied to user-supplied parameters.
pub mod retry_kernel;

pub use retry_kernel::{KernelResult, RetryKernelLimits, RetryKernelPolicy, DEFAULT_KERNEL};
