//! pcg32.rs
//! PCG-XSH-RR: 64-bit LCG state, 32-bit permuted output.
//!
//! Sequences must match bit-for-bit across runs, so every stochastic
//! operation in the crate draws from this generator. Not thread-safe:
//! concurrent samplers hold separate instances.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

pub const MULTIPLIER: u64 = 6_364_136_223_846_793_005;
pub const DEFAULT_INCREMENT: u64 = 1_442_695_040_888_963_407;

const TWO_POW_32: f64 = 4_294_967_296.0;

/// Snapshot of a generator. Restoring it continues the identical sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pcg32State {
    pub state: u64,
    pub increment: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcg32 {
    state: u64,
    increment: u64,
}

impl Pcg32 {
    /// Seeds the generator and discards one draw.
    ///
    /// Negative seeds are sign-extended into the 64-bit state.
    pub fn new(seed: i32) -> Self {
        let mut rng = Self {
            state: seed as i64 as u64,
            increment: DEFAULT_INCREMENT,
        };
        rng.next_u32();
        rng
    }

    pub fn from_state(snapshot: Pcg32State) -> Self {
        Self {
            state: snapshot.state,
            increment: snapshot.increment,
        }
    }

    pub fn state(&self) -> Pcg32State {
        Pcg32State {
            state: self.state,
            increment: self.increment,
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = old.wrapping_mul(MULTIPLIER).wrapping_add(self.increment);
        let xorshifted = (((old >> 18) ^ old) >> 27) as u32;
        let rot = (old >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Uniform draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / TWO_POW_32
    }

    /// Draw in `[min, max)`. Uses plain modulo reduction, slight bias included.
    pub fn next_int(&mut self, min: i32, max: i32) -> Result<i32> {
        if min >= max {
            return Err(EngineError::InvalidRange { min, max });
        }
        let span = (max as i64 - min as i64) as u32;
        let offset = self.next_u32() % span;
        Ok((min as i64 + offset as i64) as i32)
    }
}
