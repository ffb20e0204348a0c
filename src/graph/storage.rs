//! storage.rs
//! Dense columnar layout: nodes live in declaration order, each addressed by a
//! `Slot`. Parents are stored CSR-style, children as per-node linked lists.
//!
//! Only edges whose source id is present in the node set are stored; dangling
//! input references are kept on the node itself but never become edges.

use super::node::{Node, NodeId};
use crate::error::{EngineError, Result};
use std::collections::HashMap;

const NO_EDGE: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Slot(pub u32);

impl Slot {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

#[derive(Debug, Clone, Default)]
pub struct GraphRegistry {
    pub nodes: Vec<Node>,
    pub slots: HashMap<NodeId, Slot>,

    // Dense Topology
    pub parents_flat: Vec<Slot>,
    pub parents_ranges: Vec<(u32, u32)>,

    // Adjacency List (Children)
    pub first_child: Vec<u32>,
    pub child_targets: Vec<Slot>,
    pub next_child: Vec<u32>,
}

impl GraphRegistry {
    pub fn build(nodes: impl IntoIterator<Item = Node>) -> Result<Self> {
        let mut reg = Self::default();

        // 1. Slots
        for node in nodes {
            let slot = Slot::new(reg.nodes.len());
            if reg.slots.insert(node.id().clone(), slot).is_some() {
                return Err(EngineError::DuplicateNode(node.id().clone()));
            }
            reg.nodes.push(node);
        }
        let count = reg.nodes.len();

        // 2. Parents (CSR append, declaration order)
        for i in 0..count {
            let start = reg.parents_flat.len() as u32;
            for input in reg.nodes[i].inputs() {
                if let Some(&parent) = reg.slots.get(input) {
                    reg.parents_flat.push(parent);
                }
            }
            let len = reg.parents_flat.len() as u32 - start;
            reg.parents_ranges.push((start, len));
        }

        // 3. Children. Prepending while walking backwards leaves every list
        // in declaration order.
        reg.first_child = vec![NO_EDGE; count];
        for i in (0..count).rev() {
            let child = Slot::new(i);
            let (start, len) = reg.parents_ranges[i];
            for p in (start..start + len).rev() {
                let p_idx = reg.parents_flat[p as usize].index();
                let head = reg.first_child[p_idx];
                let new_edge = reg.child_targets.len() as u32;
                reg.child_targets.push(child);
                reg.next_child.push(head);
                reg.first_child[p_idx] = new_edge;
            }
        }

        Ok(reg)
    }

    pub fn count(&self) -> usize { self.nodes.len() }

    #[inline(always)]
    pub fn get_parents(&self, slot: Slot) -> &[Slot] {
        let (start, count) = self.parents_ranges[slot.index()];
        &self.parents_flat[start as usize..(start + count) as usize]
    }

    pub fn children(&self, slot: Slot) -> Children<'_> {
        Children { reg: self, edge: self.first_child[slot.index()] }
    }

    pub fn slot_of(&self, id: &NodeId) -> Option<Slot> {
        self.slots.get(id).copied()
    }

    #[inline(always)]
    pub fn node(&self, slot: Slot) -> &Node { &self.nodes[slot.index()] }
}

/// Linked-list traversal over a node's children.
pub struct Children<'a> {
    reg: &'a GraphRegistry,
    edge: u32,
}

impl Iterator for Children<'_> {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        if self.edge == NO_EDGE {
            return None;
        }
        let idx = self.edge as usize;
        self.edge = self.reg.next_child[idx];
        Some(self.reg.child_targets[idx])
    }
}
