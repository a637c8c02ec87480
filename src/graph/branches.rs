use super::paths::nodes_between;
use super::{Network, NodeId, NodeSet, Path, TopologicalOrder, enumerate_paths, reachable};
use crate::error::NetworkError;
use itertools::Itertools;

/// Parallel branches that leave `fork` and reconverge at `join`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelGroup {
    pub fork: NodeId,
    pub join: NodeId,
    /// First node of every branch, in the fork's connection order.
    /// A branch wired straight into the join has the join as its head.
    pub branches: Vec<NodeId>,
    /// Every simple path through the branches, see [`enumerate_paths`].
    pub paths: Vec<Path>,
    /// Number of groups enclosing this one.
    pub level: usize,
}

impl ParallelGroup {
    pub fn has_branches(&self, heads: &[NodeId]) -> bool {
        heads.len() == self.branches.len() && heads.iter().all(|h| self.branches.contains(h))
    }
}

/// Finds every fork/join pair in the network.
///
/// For each fork, branches are merged into clusters while scanning candidate
/// joins by ascending depth (ties by node id). Depth, the longest path from
/// the source, serves as the topological position: every edge increases it,
/// and it does not depend on how the sorter broke ties between unrelated
/// nodes. A set of clusters merges at the first node that every member branch
/// reaches, which records a group. The sink never joins: branches meeting only
/// there stay independent. Forks inside a group are handled the same way and
/// come out with a higher `level`.
///
/// A group records where branches first meet, not that every branch passes
/// through its join; the synthesizer checks that per target.
pub fn detect_parallel_groups(
    network: &Network,
    order: &TopologicalOrder,
    ceiling: usize,
) -> Result<Vec<ParallelGroup>, NetworkError> {
    let mut groups = Vec::new();
    for fork in order.iter() {
        let heads: Vec<NodeId> = network
            .successors(fork)
            .iter()
            .copied()
            .filter(|h| *h != network.sink)
            .collect();
        if heads.len() < 2 {
            continue;
        }
        for (join, branches) in cluster_joins(network, order, &heads) {
            let paths = enumerate_paths(network, order, fork, join, ceiling)?
                .into_iter()
                .filter(|path| match path.first() {
                    Some(head) => branches.contains(head),
                    None => branches.contains(&join),
                })
                .collect();
            groups.push(ParallelGroup {
                fork,
                join,
                branches,
                paths,
                level: 0,
            });
        }
    }

    assign_levels(network, order, &mut groups);
    for group in &groups {
        log::debug!(
            "Network {}: parallel group {} -> {} (level {}, {} paths)",
            network.id,
            network.element_id(group.fork),
            network.element_id(group.join),
            group.level,
            group.paths.len()
        );
    }
    Ok(groups)
}

/// Returns `(join, branch heads)` for every merge among the fork's branches.
fn cluster_joins(
    network: &Network,
    order: &TopologicalOrder,
    heads: &[NodeId],
) -> Vec<(NodeId, Vec<NodeId>)> {
    let sink = network.sink;
    let reach: Vec<NodeSet> = heads
        .iter()
        .map(|head| {
            reachable(network.len(), [*head], |n| {
                network.successors(n).iter().copied().filter(move |s| *s != sink)
            })
        })
        .collect();

    let candidates = reach
        .iter()
        .flat_map(NodeSet::iter)
        .unique()
        .sorted_by_key(|n| (order.depth(*n), *n));

    let mut clusters: Vec<Vec<usize>> = (0..heads.len()).map(|i| vec![i]).collect();
    let mut merges = Vec::new();
    for candidate in candidates {
        let eligible: Vec<usize> = clusters
            .iter()
            .enumerate()
            .filter(|(_, members)| {
                !members.is_empty() && members.iter().all(|m| reach[*m].contains(candidate))
            })
            .map(|(i, _)| i)
            .collect();
        if eligible.len() < 2 {
            continue;
        }

        let merged: Vec<usize> = eligible
            .iter()
            .flat_map(|i| std::mem::take(&mut clusters[*i]))
            .sorted()
            .collect();
        merges.push((candidate, merged.iter().map(|m| heads[*m]).collect()));
        clusters[eligible[0]] = merged;

        if clusters.iter().filter(|c| !c.is_empty()).count() < 2 {
            break;
        }
    }
    merges
}

fn assign_levels(network: &Network, order: &TopologicalOrder, groups: &mut [ParallelGroup]) {
    let interiors: Vec<NodeSet> = groups
        .iter()
        .map(|g| nodes_between(network, order, g.fork, g.join))
        .collect();
    let levels: Vec<usize> = groups
        .iter()
        .enumerate()
        .map(|(i, inner)| {
            groups
                .iter()
                .enumerate()
                .filter(|(j, outer)| {
                    *j != i
                        && (inner.fork, inner.join) != (outer.fork, outer.join)
                        && (inner.fork == outer.fork || interiors[*j].contains(inner.fork))
                        && (inner.join == outer.join || interiors[*j].contains(inner.join))
                })
                .count()
        })
        .collect();
    for (group, level) in groups.iter_mut().zip(levels) {
        group.level = level;
    }
}
