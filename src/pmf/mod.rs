//! Discrete probability distributions and their compilation onto a grid.
pub mod compiler;
pub mod distribution;
pub mod error;

pub use compiler::{CompiledPmf, PmfCompiler, PmfCompilerOptions, RepeatPolicy};
pub use distribution::Pmf;
pub use error::PmfError;
