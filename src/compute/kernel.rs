//! Whole-series kernels shared by nodes and the expression evaluator.
//!
//! Numeric policy is fail-soft: division by zero yields 0.0 and non-finite
//! samples contribute nothing to backlog and convolution sums.

use crate::graph::BinaryOperator;
use crate::series::Series;
use wide::f64x4;

#[inline(always)]
fn apply(op: BinaryOperator, l: f64, r: f64) -> f64 {
    match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Sub => l - r,
        BinaryOperator::Mul => l * r,
        BinaryOperator::Div => safe_div(l, r),
    }
}

#[inline(always)]
pub fn safe_div(l: f64, r: f64) -> f64 {
    if r == 0.0 { 0.0 } else { l / r }
}

#[inline(always)]
fn finite_or_zero(v: Option<f64>) -> f64 {
    match v {
        Some(x) if x.is_finite() => x,
        _ => 0.0,
    }
}

/// Elementwise `lhs op rhs` over equal-length slices.
///
/// Add/Sub/Mul run four lanes at a time; Div stays scalar for the zero guard.
pub fn elementwise(op: BinaryOperator, lhs: &[f64], rhs: &[f64]) -> Vec<f64> {
    debug_assert_eq!(lhs.len(), rhs.len());
    let len = lhs.len().min(rhs.len());
    let mut out = Vec::with_capacity(len);

    if op == BinaryOperator::Div {
        out.extend(lhs.iter().zip(rhs).map(|(&l, &r)| safe_div(l, r)));
        return out;
    }

    let lanes = len / 4 * 4;
    for (l, r) in lhs[..lanes].chunks_exact(4).zip(rhs[..lanes].chunks_exact(4)) {
        let a = f64x4::from([l[0], l[1], l[2], l[3]]);
        let b = f64x4::from([r[0], r[1], r[2], r[3]]);
        let c = match op {
            BinaryOperator::Add => a + b,
            BinaryOperator::Sub => a - b,
            _ => a * b,
        };
        out.extend_from_slice(&c.to_array());
    }
    for i in lanes..len {
        out.push(apply(op, lhs[i], rhs[i]));
    }
    out
}

pub fn elementwise_scalar(op: BinaryOperator, lhs: &[f64], rhs: f64) -> Vec<f64> {
    lhs.iter().map(|&l| apply(op, l, rhs)).collect()
}

pub fn zip_with(lhs: &[f64], rhs: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    lhs.iter().zip(rhs).map(|(&l, &r)| f(l, r)).collect()
}

/// `y[t] = 0` for `t < lag`, else `x[t - lag]`. A zero lag returns `x` itself.
pub fn shift(x: &Series, lag: usize) -> Series {
    if lag == 0 {
        return x.clone();
    }
    let len = x.len();
    let mut out = vec![0.0; len];
    if lag < len {
        out[lag..].copy_from_slice(&x.as_slice()[..len - lag]);
    }
    Series::new(out)
}

/// Causal convolution: `y[t] = Σ_k x[t-k] * kernel[k]` over `t-k >= 0`.
///
/// The output has `bins` entries. Source indices past the end of `x` and
/// non-finite source samples contribute zero.
pub fn convolve(bins: usize, x: &[f64], kernel: &[f64]) -> Vec<f64> {
    (0..bins)
        .map(|t| {
            kernel
                .iter()
                .enumerate()
                .take(t + 1)
                .map(|(k, &w)| {
                    let v = finite_or_zero(x.get(t - k).copied());
                    v * w
                })
                .sum()
        })
        .collect()
}

/// Queue depth with the clamp applied every bin.
pub fn backlog(bins: usize, initial_depth: f64, inflow: &[f64], outflow: &[f64], loss: Option<&[f64]>) -> Vec<f64> {
    let mut depth = Vec::with_capacity(bins);
    let mut q = initial_depth;
    for t in 0..bins {
        let inn = finite_or_zero(inflow.get(t).copied());
        let out = finite_or_zero(outflow.get(t).copied());
        let lost = finite_or_zero(loss.and_then(|l| l.get(t).copied()));
        q = (q + inn - out - lost).max(0.0);
        depth.push(q);
    }
    depth
}
