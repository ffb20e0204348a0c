//! retry_kernel.rs
//! Normalizes convolution kernels used to model delayed retries.
//!
//! Invalid coefficients are repaired rather than rejected. Every repair is
//! recorded as a message; several repairs may apply to one kernel.

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_KERNEL: [f64; 4] = [0.0, 0.6, 0.3, 0.1];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryKernelLimits {
    pub max_length: usize,
    pub max_sum: f64,
}

impl Default for RetryKernelLimits {
    fn default() -> Self {
        Self { max_length: 32, max_sum: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KernelResult {
    pub kernel: Vec<f64>,
    pub used_default: bool,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RetryKernelPolicy {
    limits: RetryKernelLimits,
}

impl RetryKernelPolicy {
    pub fn new(limits: RetryKernelLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RetryKernelLimits { &self.limits }

    pub fn apply(&self, kernel: Option<&[f64]>) -> KernelResult {
        let mut messages = Vec::new();

        let coefficients = match kernel {
            Some(k) if !k.is_empty() => k,
            Some(_) => {
                messages.push("Retry kernel was empty; using the default kernel".to_string());
                return self.finish(DEFAULT_KERNEL.to_vec(), true, messages);
            }
            None => return self.finish(DEFAULT_KERNEL.to_vec(), true, messages),
        };

        // 1. Clamp: NaN, infinities and negatives become 0.
        let mut clamped = 0;
        let mut out: Vec<f64> = coefficients
            .iter()
            .map(|&c| {
                if c.is_finite() && c >= 0.0 {
                    c
                } else {
                    clamped += 1;
                    0.0
                }
            })
            .collect();
        if clamped > 0 {
            messages.push(format!(
                "Retry kernel had {} non-finite or negative coefficient(s); clamped to 0",
                clamped
            ));
        }

        // 2. Trim
        if out.len() > self.limits.max_length {
            messages.push(format!(
                "Retry kernel length {} exceeds maximum {}; trimmed",
                out.len(),
                self.limits.max_length
            ));
            out.truncate(self.limits.max_length);
        }

        // 3. Scale
        let sum: f64 = out.iter().sum();
        if sum > self.limits.max_sum {
            let factor = self.limits.max_sum / sum;
            for c in out.iter_mut() {
                *c *= factor;
            }
            messages.push(format!(
                "Retry kernel mass {:.4} exceeds maximum {:.4}; scaled down",
                sum, self.limits.max_sum
            ));
        }

        self.finish(out, false, messages)
    }

    fn finish(&self, kernel: Vec<f64>, used_default: bool, messages: Vec<String>) -> KernelResult {
        for m in &messages {
            warn!("{}", m);
        }
        KernelResult { kernel, used_default, messages }
    }
}
