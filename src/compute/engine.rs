//! A synchronous, single-threaded evaluation engine.
use crate::compute::ledger::{Ledger, SeriesSource};
use crate::error::Result;
use crate::graph::storage::GraphRegistry;
use crate::graph::{Graph, NodeId};
use crate::series::{Series, TimeGrid};
use tracing::{instrument, trace};

pub struct Evaluator<'a> {
    graph: &'a Graph,
}

/// Resolves node ids against the slots computed so far.
struct Computed<'a> {
    store: &'a GraphRegistry,
    ledger: &'a Ledger,
}

impl SeriesSource for Computed<'_> {
    fn series(&self, id: &NodeId) -> Option<&Series> {
        self.ledger.get(self.store.slot_of(id)?)
    }
}

impl<'a> Evaluator<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// Walks the topological order once. Each node's `evaluate` runs exactly one
    /// time and its result is memoized for every dependent.
    ///
    /// The first node failure aborts the run and is returned unchanged.
    #[instrument(skip_all, fields(nodes = self.graph.len(), bins = grid.bins()))]
    pub fn run(&self, grid: &TimeGrid) -> Result<Ledger> {
        let store = &self.graph.store;
        let mut ledger = Ledger::with_capacity(store.count());

        for &slot in self.graph.order_slots() {
            let node = store.node(slot);
            let series = {
                let inputs = Computed { store, ledger: &ledger };
                node.evaluate(grid, &inputs)?
            };
            trace!(node = %node.id(), len = series.len(), "node evaluated");
            ledger.insert(slot, series);
        }

        Ok(ledger)
    }
}
