use super::{Network, NodeId, NodeSet, TopologicalOrder, reachable};
use crate::error::NetworkError;

/// Interior nodes of one fork-to-join path, in power-flow order.
/// Empty for a direct wire from fork to join.
pub type Path = Vec<NodeId>;

/// Nodes strictly between `fork` and `join`: reachable from the fork and
/// reaching the join over power edges.
pub fn nodes_between(
    network: &Network,
    order: &TopologicalOrder,
    fork: NodeId,
    join: NodeId,
) -> NodeSet {
    let (low, high) = (order.position(fork), order.position(join));
    let forward = reachable(network.len(), [fork], |n| {
        network
            .successors(n)
            .iter()
            .copied()
            .filter(move |s| order.position(*s) < high)
    });
    let backward = reachable(network.len(), [join], |n| {
        network
            .predecessors(n)
            .iter()
            .copied()
            .filter(move |p| order.position(*p) > low)
    });
    let mut between = forward.intersection(&backward);
    between.remove(fork);
    between.remove(join);
    between
}

/// Enumerates every simple power path from `fork` to `join`.
///
/// Paths come out in depth-first order following each node's successors as
/// connected. Fails with [`NetworkError::PathExplosion`] once more than
/// `ceiling` paths exist.
pub fn enumerate_paths(
    network: &Network,
    order: &TopologicalOrder,
    fork: NodeId,
    join: NodeId,
    ceiling: usize,
) -> Result<Vec<Path>, NetworkError> {
    let mut search = PathSearch {
        network,
        join,
        ceiling,
        fork,
        between: nodes_between(network, order, fork, join),
        visited: NodeSet::new(network.len()),
        current: Vec::new(),
        paths: Vec::new(),
    };
    search.visit(fork)?;
    Ok(search.paths)
}

struct PathSearch<'a> {
    network: &'a Network,
    fork: NodeId,
    join: NodeId,
    ceiling: usize,
    between: NodeSet,
    visited: NodeSet,
    current: Path,
    paths: Vec<Path>,
}

impl PathSearch<'_> {
    fn visit(&mut self, node: NodeId) -> Result<(), NetworkError> {
        for &next in self.network.successors(node) {
            if next == self.join {
                self.paths.push(self.current.clone());
                if self.paths.len() > self.ceiling {
                    return Err(NetworkError::PathExplosion {
                        fork: self.network.element_id(self.fork).to_string(),
                        join: self.network.element_id(self.join).to_string(),
                        ceiling: self.ceiling,
                    });
                }
            } else if self.between.contains(next) && self.visited.insert(next) {
                self.current.push(next);
                self.visit(next)?;
                self.current.pop();
                self.visited.remove(next);
            }
        }
        Ok(())
    }
}
