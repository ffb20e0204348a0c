//! ledger.rs
//! Memo table for one evaluation, plus the input-resolution seam nodes read through.

use crate::error::{EngineError, Result};
use crate::graph::storage::Slot;
use crate::graph::NodeId;
use crate::series::Series;
use std::collections::HashMap;

/// Read access to series that have already been computed.
pub trait SeriesSource {
    fn series(&self, id: &NodeId) -> Option<&Series>;
}

impl SeriesSource for HashMap<NodeId, Series> {
    fn series(&self, id: &NodeId) -> Option<&Series> { self.get(id) }
}

/// Looks up an input of `owner`, failing with `MissingInput` when absent.
pub(crate) fn require<'a>(inputs: &'a dyn SeriesSource, owner: &NodeId, input: &NodeId) -> Result<&'a Series> {
    inputs.series(input).ok_or_else(|| EngineError::MissingInput {
        node: owner.clone(),
        input: input.clone(),
    })
}

/// Dense, slot-indexed storage of computed series.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    values: Vec<Option<Series>>,
}

impl Ledger {
    pub fn with_capacity(size: usize) -> Self {
        Self { values: vec![None; size] }
    }

    #[inline(always)]
    pub fn get(&self, slot: Slot) -> Option<&Series> {
        self.values.get(slot.index())?.as_ref()
    }

    #[inline(always)]
    pub fn insert(&mut self, slot: Slot, value: Series) {
        let idx = slot.index();
        if idx >= self.values.len() {
            self.values.resize(idx + 1, None);
        }
        self.values[idx] = Some(value);
    }

    pub fn computed(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Drains the ledger in slot order.
    pub fn into_values(self) -> impl Iterator<Item = (Slot, Series)> {
        self.values
            .into_iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|s| (Slot::new(i), s)))
    }
}
