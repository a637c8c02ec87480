//! The internal network graph and the analyses that run over it.
//!
//! Stages run leaves first: [`ingest`] validates a [`NetworkDefinition`],
//! [`build`] turns the result into an arena of [`Node`]s, [`topological_order`]
//! orders it, and [`detect_parallel_groups`] (backed by [`enumerate_paths`])
//! finds the fork/join structure the synthesizer folds into `OR` terms.
//!
//! [`NetworkDefinition`]: crate::ladder::NetworkDefinition

mod branches;
mod builder;
mod ingest;
mod paths;
mod topology;

pub use branches::{ParallelGroup, detect_parallel_groups};
pub use builder::{DataInput, Network, Node, build};
pub use ingest::{EdgeKind, OrphanPolicy, ValidatedEdge, ValidatedNetwork, ingest};
pub use paths::{Path, enumerate_paths, nodes_between};
pub use topology::{TopologicalOrder, topological_order};

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Dense index of a node inside one [`Network`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A fixed-capacity set of nodes, used as transient traversal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSet {
    members: Vec<bool>,
}

impl NodeSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            members: vec![false; capacity],
        }
    }

    /// Inserts `id`, returning `true` if it was not present.
    pub fn insert(&mut self, id: NodeId) -> bool {
        match self.members.get_mut(id.0) {
            Some(slot) if !*slot => {
                *slot = true;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: NodeId) {
        if let Some(slot) = self.members.get_mut(id.0) {
            *slot = false;
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.members.get(id.0).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.members.iter().filter(|m| **m).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.members.iter().any(|m| *m)
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, m)| **m)
            .map(|(i, _)| NodeId(i))
    }

    pub fn intersection(&self, other: &NodeSet) -> NodeSet {
        NodeSet {
            members: self
                .members
                .iter()
                .zip(&other.members)
                .map(|(a, b)| *a && *b)
                .collect(),
        }
    }

    pub fn is_disjoint(&self, other: &NodeSet) -> bool {
        !self.members.iter().zip(&other.members).any(|(a, b)| *a && *b)
    }
}

/// Breadth-first reachability from `starts` (inclusive) over `next`.
pub(crate) fn reachable<S, F, I>(capacity: usize, starts: S, mut next: F) -> NodeSet
where
    S: IntoIterator<Item = NodeId>,
    F: FnMut(NodeId) -> I,
    I: IntoIterator<Item = NodeId>,
{
    let mut seen = NodeSet::new(capacity);
    let mut queue = VecDeque::new();
    for start in starts {
        if seen.insert(start) {
            queue.push_back(start);
        }
    }
    while let Some(current) = queue.pop_front() {
        for neighbour in next(current) {
            if seen.insert(neighbour) {
                queue.push_back(neighbour);
            }
        }
    }
    seen
}
