//! Parallel evaluation of independent graphs.
//!
//! Each graph is still evaluated on a single thread; rayon only spreads
//! separate graphs across workers. Nothing is shared between evaluations.

use crate::error::Result;
use crate::graph::{Graph, NodeId};
use crate::series::{Series, TimeGrid};
use rayon::prelude::*;
use std::collections::HashMap;

/// Evaluates every graph against `grid`. Results keep the input order.
pub fn evaluate_batch(graphs: &[Graph], grid: &TimeGrid) -> Vec<Result<HashMap<NodeId, Series>>> {
    graphs.par_iter().map(|g| g.evaluate(grid)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use crate::series::BinUnit;

    #[test]
    fn test_batch_matches_sequential() {
        let grid = TimeGrid::new(4, 15, BinUnit::Minutes).unwrap();
        let graphs: Vec<Graph> = (0..8)
            .map(|i| {
                Graph::new(vec![
                    Node::constant("x", vec![i as f64; 4]),
                    Node::expr("y", "SHIFT(x, 1) + 1").unwrap(),
                ])
                .unwrap()
            })
            .collect();

        let parallel = evaluate_batch(&graphs, &grid);
        for (g, res) in graphs.iter().zip(parallel) {
            assert_eq!(res.unwrap(), g.evaluate(&grid).unwrap());
        }
    }

    #[test]
    fn test_batch_keeps_failures_per_graph() {
        let grid = TimeGrid::new(2, 1, BinUnit::Hours).unwrap();
        let ok = Graph::new(vec![Node::constant("a", vec![1.0, 2.0])]).unwrap();
        let bad = Graph::new(vec![Node::constant("a", vec![1.0])]).unwrap();
        let results = evaluate_batch(&[ok, bad], &grid);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
