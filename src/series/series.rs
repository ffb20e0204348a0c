//! Immutable fixed-length series.
//!
//! The values live behind an `Arc`, so handing a series to a dependent (or
//! returning an input unchanged, as `SHIFT(x, 0)` does) never copies data.
//! Copies happen only on export via `to_vec`.

use serde::{Serialize, Serializer};
use std::ops::Index;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    values: Arc<[f64]>,
}

impl Series {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values: values.into() }
    }

    pub fn constant(len: usize, value: f64) -> Self {
        Self::new(vec![value; len])
    }

    pub fn zeros(len: usize) -> Self {
        Self::constant(len, 0.0)
    }

    #[inline(always)]
    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    #[inline(always)]
    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[f64] { &self.values }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<f64> { self.values.to_vec() }

    #[cfg(test)]
    pub(crate) fn shares_storage(&self, other: &Series) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

impl Index<usize> for Series {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 { &self.values[i] }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self { Self::new(values) }
}

impl Serialize for Series {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.as_ref().serialize(serializer)
    }
}
