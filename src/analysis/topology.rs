//! Read-only topology queries over a built [`Graph`].
//!
//! Evaluation never goes through here; these views exist for impact analysis
//! ("what changes if `demand` changes?") and for rendering the model.

use crate::graph::{Graph, NodeId};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};
use std::collections::HashMap;

/// Dependency graph with edges pointing from an input to its consumer.
pub struct Topology {
    graph: DiGraph<NodeId, &'static str>,
    index: HashMap<NodeId, NodeIndex>,
}

impl Topology {
    pub fn new(source: &Graph) -> Self {
        let mut graph = DiGraph::with_capacity(source.len(), source.len() * 2);
        let mut index = HashMap::with_capacity(source.len());

        // Declaration order, so indices line up with the engine's slots.
        for node in source.nodes() {
            let ix = graph.add_node(node.id().clone());
            index.insert(node.id().clone(), ix);
        }
        for node in source.nodes() {
            let to = index[node.id()];
            for input in node.inputs() {
                // Dangling references have no vertex to attach to.
                if let Some(&from) = index.get(input) {
                    graph.add_edge(from, to, "");
                }
            }
        }
        Self { graph, index }
    }

    /// Every node that transitively consumes `id`, in BFS order.
    pub fn dependents_of(&self, id: &NodeId) -> Vec<NodeId> {
        let Some(&start) = self.index.get(id) else { return Vec::new() };
        let mut out = Vec::new();
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(ix) = bfs.next(&self.graph) {
            if ix != start {
                out.push(self.graph[ix].clone());
            }
        }
        out
    }

    /// Every node that `id` transitively reads, in BFS order.
    pub fn dependencies_of(&self, id: &NodeId) -> Vec<NodeId> {
        let Some(&start) = self.index.get(id) else { return Vec::new() };
        let reversed = Reversed(&self.graph);
        let mut out = Vec::new();
        let mut bfs = Bfs::new(reversed, start);
        while let Some(ix) = bfs.next(reversed) {
            if ix != start {
                out.push(self.graph[ix].clone());
            }
        }
        out
    }

    /// Graphviz rendering, one vertex per node labelled by its id.
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::with_config(&self.graph, &[Config::EdgeNoLabel]))
    }
}

pub fn dependents_of(graph: &Graph, id: &NodeId) -> Vec<NodeId> {
    Topology::new(graph).dependents_of(id)
}

pub fn dependencies_of(graph: &Graph, id: &NodeId) -> Vec<NodeId> {
    Topology::new(graph).dependencies_of(id)
}

pub fn to_dot(graph: &Graph) -> String {
    Topology::new(graph).to_dot()
}
