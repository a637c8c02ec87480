use super::{Network, NodeId};
use crate::error::NetworkError;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A dependency order over every node of a network.
///
/// Both power and data edges are honoured. Depth is the length of the longest
/// edge path from any node without inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologicalOrder {
    order: Vec<NodeId>,
    position: Vec<usize>,
    depth: Vec<usize>,
}

impl TopologicalOrder {
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn position(&self, id: NodeId) -> usize {
        self.position[id.0]
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.depth[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }
}

/// Kahn's algorithm; ready nodes leave the queue in ascending id order.
pub fn topological_order(network: &Network) -> Result<TopologicalOrder, NetworkError> {
    let count = network.len();
    let dependents: Vec<Vec<NodeId>> = (0..count).map(|i| network.dependents(NodeId(i))).collect();

    let mut in_degree = vec![0usize; count];
    for targets in &dependents {
        for target in targets {
            in_degree[target.0] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<NodeId>> = (0..count)
        .map(NodeId)
        .filter(|id| in_degree[id.0] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(count);
    let mut depth = vec![0usize; count];
    while let Some(Reverse(current)) = ready.pop() {
        order.push(current);
        for target in &dependents[current.0] {
            depth[target.0] = depth[target.0].max(depth[current.0] + 1);
            in_degree[target.0] -= 1;
            if in_degree[target.0] == 0 {
                ready.push(Reverse(*target));
            }
        }
    }

    if order.len() < count {
        let elements = cycle_members(network, &dependents, &in_degree);
        log::warn!(
            "Network {}: feedback cycle through {:?}",
            network.id,
            elements
        );
        return Err(NetworkError::CyclicNetwork { elements });
    }

    let mut position = vec![0usize; count];
    for (index, id) in order.iter().enumerate() {
        position[id.0] = index;
    }
    log::debug!(
        "Network {}: topological order {:?}",
        network.id,
        order
            .iter()
            .map(|id| network.element_id(*id))
            .collect::<Vec<_>>()
    );

    Ok(TopologicalOrder {
        order,
        position,
        depth,
    })
}

/// Nodes left with a positive in-degree either sit on a cycle or hang off one.
/// Peeling the ones with no remaining dependents leaves the cycles themselves.
fn cycle_members(
    network: &Network,
    dependents: &[Vec<NodeId>],
    in_degree: &[usize],
) -> Vec<String> {
    let mut remaining: Vec<bool> = in_degree.iter().map(|d| *d > 0).collect();
    loop {
        let peel: Vec<usize> = (0..remaining.len())
            .filter(|i| remaining[*i] && !dependents[*i].iter().any(|t| remaining[t.0]))
            .collect();
        if peel.is_empty() {
            break;
        }
        for i in peel {
            remaining[i] = false;
        }
    }
    let mut elements: Vec<String> = (0..remaining.len())
        .filter(|i| remaining[*i])
        .map(|i| network.element_id(NodeId(i)).to_string())
        .collect();
    elements.sort();
    elements
}
