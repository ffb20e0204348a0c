//! dag.rs
//! Wraps the low-level GraphRegistry with high-level graph algorithms.

use super::node::{Node, NodeId};
use super::storage::{GraphRegistry, Slot};
use crate::compute::Evaluator;
use crate::error::{EngineError, Result};
use crate::series::{Series, TimeGrid};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// A validated, acyclic set of nodes with a fixed evaluation order.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) store: GraphRegistry,
    order: Vec<Slot>,
}

impl Graph {
    /// Builds the graph and orders it. Fails on duplicate ids or a cycle.
    pub fn new(nodes: impl IntoIterator<Item = Node>) -> Result<Self> {
        let store = GraphRegistry::build(nodes)?;
        let order = kahn(&store)?;
        debug!(nodes = store.count(), edges = store.parents_flat.len(), "graph constructed and ordered");
        Ok(Self { store, order })
    }

    pub fn len(&self) -> usize { self.store.count() }
    pub fn is_empty(&self) -> bool { self.store.count() == 0 }

    pub fn contains(&self, id: &NodeId) -> bool { self.store.slots.contains_key(id) }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.store.slot_of(id).map(|s| self.store.node(s))
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> { self.store.nodes.iter() }

    /// A valid linearization: every in-graph input precedes its consumer.
    pub fn topological_order(&self) -> Vec<NodeId> {
        self.order.iter().map(|&s| self.store.node(s).id().clone()).collect()
    }

    pub(crate) fn order_slots(&self) -> &[Slot] { &self.order }

    /// Evaluates every node exactly once, in topological order.
    pub fn evaluate(&self, grid: &TimeGrid) -> Result<HashMap<NodeId, Series>> {
        let ledger = Evaluator::new(self).run(grid)?;
        Ok(ledger
            .into_values()
            .map(|(slot, series)| (self.store.node(slot).id().clone(), series))
            .collect())
    }
}

/// Kahn's algorithm over in-graph edges.
///
/// The queue starts with zero in-degree nodes in declaration order and children
/// are released in declaration order, so the result is stable across runs.
fn kahn(store: &GraphRegistry) -> Result<Vec<Slot>> {
    let count = store.count();
    let mut in_degree = vec![0usize; count];
    let mut queue = VecDeque::with_capacity(count);
    let mut order = Vec::with_capacity(count);

    // 1. Initialize In-Degrees O(N)
    for (i, &(_, parents)) in store.parents_ranges.iter().enumerate() {
        in_degree[i] = parents as usize;
        if parents == 0 {
            queue.push_back(Slot::new(i));
        }
    }

    // 2. Process Queue
    while let Some(slot) = queue.pop_front() {
        order.push(slot);
        for child in store.children(slot) {
            let c = child.index();
            in_degree[c] -= 1;
            if in_degree[c] == 0 {
                queue.push_back(child);
            }
        }
    }

    if order.len() != count {
        return Err(EngineError::GraphCycle { unresolved: count - order.len() });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BinaryOperator, Operand};
    use crate::series::BinUnit;

    fn add(id: &str, l: &str, r: &str) -> Node {
        Node::binary(id, BinaryOperator::Add, l, Operand::Node(r.into()))
    }

    fn pos(order: &[NodeId], id: &str) -> usize {
        order.iter().position(|x| x.as_str() == id).unwrap()
    }

    #[test]
    fn test_sort_diamond_dependency() {
        // Shape: A -> B, A -> C, B+C -> D
        let graph = Graph::new(vec![
            add("D", "B", "C"),
            add("B", "A", "A"),
            add("C", "A", "A"),
            Node::constant("A", vec![1.0]),
        ])
        .unwrap();
        let order = graph.topological_order();
        assert_eq!(order.len(), 4);
        assert!(pos(&order, "A") < pos(&order, "B"));
        assert!(pos(&order, "A") < pos(&order, "C"));
        assert!(pos(&order, "B") < pos(&order, "D"));
        assert!(pos(&order, "C") < pos(&order, "D"));
    }

    #[test]
    fn test_tie_break_follows_declaration_order() {
        let graph = Graph::new(vec![
            Node::constant("z", vec![1.0]),
            Node::constant("a", vec![1.0]),
            add("m", "z", "a"),
        ])
        .unwrap();
        let ids: Vec<String> = graph.topological_order().iter().map(|n| n.to_string()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_mutual_dependency_is_a_cycle() {
        let err = Graph::new(vec![add("A", "B", "B"), add("B", "A", "A")]).unwrap_err();
        assert!(matches!(err, EngineError::GraphCycle { unresolved: 2 }));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let err = Graph::new(vec![Node::shift("s", "s", 1).unwrap()]).unwrap_err();
        assert!(matches!(err, EngineError::GraphCycle { .. }));
    }

    #[test]
    fn test_dangling_references_do_not_block_ordering() {
        let graph = Graph::new(vec![add("b", "a", "outside"), Node::constant("a", vec![1.0])]).unwrap();
        let ids: Vec<String> = graph.topological_order().iter().map(|n| n.to_string()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_evaluate_dangling_reference_fails_at_evaluation() {
        let graph = Graph::new(vec![add("b", "a", "outside"), Node::constant("a", vec![1.0])]).unwrap();
        let grid = TimeGrid::new(1, 1, BinUnit::Hours).unwrap();
        let err = graph.evaluate(&grid).unwrap_err();
        assert!(matches!(err, EngineError::MissingInput { .. }));
    }

    #[test]
    fn test_evaluate_chain() {
        let grid = TimeGrid::new(3, 60, BinUnit::Minutes).unwrap();
        let graph = Graph::new(vec![
            Node::constant("arrivals", vec![4.0, 4.0, 4.0]),
            Node::constant("capacity", vec![3.0, 3.0, 3.0]),
            Node::backlog("queue", "arrivals", "capacity", None, 0.0),
            Node::shift("queue_prev", "queue", 1).unwrap(),
        ])
        .unwrap();
        let out = graph.evaluate(&grid).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out[&NodeId::from("queue")].to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(out[&NodeId::from("queue_prev")].to_vec(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::new(Vec::new()).unwrap();
        assert!(graph.is_empty());
        let grid = TimeGrid::new(2, 1, BinUnit::Days).unwrap();
        assert!(graph.evaluate(&grid).unwrap().is_empty());
    }
}
