use super::terms::{self, DataInputs};
use crate::ast::{Expression, Statement};
use crate::error::{CompileError, NetworkError, SemanticError};
use crate::graph::{
    Network, NodeId, NodeSet, ParallelGroup, Path, TopologicalOrder, enumerate_paths, reachable,
};
use crate::ladder::PowerRole;
use ahash::AHashMap;

/// Statements produced for one network, plus the targets that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Synthesis {
    pub statements: Vec<Statement>,
    pub errors: Vec<SemanticError>,
}

/// Synthesizes one statement per target element, in topological order.
///
/// A failing target is recorded in [`Synthesis::errors`]; its siblings
/// still compile. Branches that route around their detected join are
/// expanded into every path up to the target, and exceeding `ceiling`
/// there fails the whole network.
pub fn synthesize(
    network: &Network,
    order: &TopologicalOrder,
    ceiling: usize,
) -> Result<Synthesis, NetworkError> {
    let mut context = SynthesisContext::new(network, order, ceiling);
    let mut synthesis = Synthesis::default();
    for id in order.iter() {
        let node = network.node(id);
        if !node.kind.is_target() {
            continue;
        }
        context.target = node.element_id.clone();
        match context.target_statement(id) {
            Ok(statement) => {
                log::debug!(
                    "Network {}: {} -> {}",
                    network.id,
                    node.element_id,
                    statement
                );
                synthesis.statements.push(statement);
            }
            Err(CompileError::Semantic(error)) => {
                log::warn!("Network {}: {}", network.id, error);
                synthesis.errors.push(error);
            }
            Err(CompileError::Network(error)) => return Err(error),
        }
    }
    Ok(synthesis)
}

/// AND terms accumulated along a power path.
#[derive(Debug, Clone, Default)]
struct Chain {
    terms: Vec<Expression>,
    /// Set once a folding element replaced the chain. A folded chain already
    /// contains everything upstream, so it cannot be factored out of a group.
    folded: bool,
}

impl Chain {
    fn folded(term: Expression) -> Self {
        Self {
            terms: vec![term],
            folded: true,
        }
    }

    fn into_expression(self) -> Expression {
        Expression::and(self.terms)
    }
}

/// The alternatives a fork splits into.
enum Branching {
    /// A detected group whose join lies on every branch.
    Group {
        group: ParallelGroup,
        join_region: NodeSet,
    },
    /// Every path from the fork to the current target.
    Paths(Vec<Path>),
}

/// Transient traversal state for one synthesis run.
struct SynthesisContext<'a> {
    network: &'a Network,
    order: &'a TopologicalOrder,
    ceiling: usize,
    /// Element id of the target being synthesized, for error reports.
    target: String,
    powered: NodeSet,
    outputs: AHashMap<NodeId, Expression>,
    upstream: AHashMap<NodeId, NodeSet>,
}

impl<'a> SynthesisContext<'a> {
    fn new(network: &'a Network, order: &'a TopologicalOrder, ceiling: usize) -> Self {
        let powered = reachable(network.len(), [network.source], |n| {
            network.successors(n).iter().copied()
        });
        Self {
            network,
            order,
            ceiling,
            target: String::new(),
            powered,
            outputs: AHashMap::new(),
            upstream: AHashMap::new(),
        }
    }

    fn target_statement(&mut self, id: NodeId) -> Result<Statement, CompileError> {
        let input = self.input(id)?;
        let data = self.data_inputs(id)?;
        Ok(terms::target_statement(
            self.network.node(id),
            input,
            &data,
            &self.target,
        )?)
    }

    /// Nodes that reach `id` over power edges, `id` included.
    fn upstream(&mut self, id: NodeId) -> NodeSet {
        let network = self.network;
        self.upstream
            .entry(id)
            .or_insert_with(|| {
                reachable(network.len(), [id], |n| network.predecessors(n).iter().copied())
            })
            .clone()
    }

    /// Power arriving at the input of `id`.
    fn input(&mut self, id: NodeId) -> Result<Expression, CompileError> {
        if id == self.network.source {
            return Ok(Expression::Literal(true));
        }
        let upstream = self.upstream(id);
        let region = self.powered.intersection(&upstream);
        if !region.contains(self.network.source) {
            return Ok(Expression::Literal(false));
        }
        let chain = self.walk(self.network.source, id, Chain::default(), &region)?;
        Ok(chain.into_expression())
    }

    /// Power leaving the output of `id`.
    fn output(&mut self, id: NodeId) -> Result<Expression, CompileError> {
        if let Some(cached) = self.outputs.get(&id) {
            return Ok(cached.clone());
        }
        let network = self.network;
        let node = network.node(id);
        let expression = match node.kind.power_role() {
            PowerRole::Rail => Expression::Literal(id == self.network.source),
            PowerRole::Transparent => self.input(id)?,
            PowerRole::Series => {
                let input = self.input(id)?;
                let data = self.data_inputs(id)?;
                input.conjoin(terms::series_term(node, &data, &self.target)?)
            }
            PowerRole::Fold => {
                let input = self.input(id)?;
                let data = self.data_inputs(id)?;
                terms::fold_term(node, input, &data, &self.target)?
            }
        };
        self.outputs.insert(id, expression.clone());
        Ok(expression)
    }

    fn data_inputs(&mut self, id: NodeId) -> Result<DataInputs, CompileError> {
        let network = self.network;
        let mut data = DataInputs::default();
        for input in &network.node(id).data_inputs {
            let expression = self.output(input.source)?;
            data.insert(&input.port, expression);
        }
        Ok(data)
    }

    /// Passes the chain through element `id`.
    fn apply(&mut self, id: NodeId, mut chain: Chain) -> Result<Chain, CompileError> {
        match self.network.node(id).kind.power_role() {
            PowerRole::Rail | PowerRole::Transparent => Ok(chain),
            PowerRole::Series => {
                let data = self.data_inputs(id)?;
                let term = terms::series_term(self.network.node(id), &data, &self.target)?;
                chain.terms.push(term);
                Ok(chain)
            }
            PowerRole::Fold => Ok(Chain::folded(self.output(id)?)),
        }
    }

    /// Follows power from the output of `from` up to (not including) `to`,
    /// staying inside `region`.
    fn walk(
        &mut self,
        from: NodeId,
        to: NodeId,
        mut chain: Chain,
        region: &NodeSet,
    ) -> Result<Chain, CompileError> {
        let mut current = from;
        loop {
            let next: Vec<NodeId> = self
                .network
                .successors(current)
                .iter()
                .copied()
                .filter(|n| region.contains(*n))
                .collect();
            match next.as_slice() {
                [] => return Ok(chain),
                [single] if *single == to => return Ok(chain),
                [single] => {
                    chain = self.apply(*single, chain)?;
                    current = *single;
                }
                heads => {
                    let branching = self.branching(current, heads, to, region)?;
                    let join = match &branching {
                        Branching::Group { group, .. } => group.join,
                        Branching::Paths(_) => to,
                    };
                    chain = self.combine(&branching, chain)?;
                    if join == to {
                        return Ok(chain);
                    }
                    chain = self.apply(join, chain)?;
                    current = join;
                }
            }
        }
    }

    /// Decides how the branches leaving `fork` towards `to` are combined.
    fn branching(
        &mut self,
        fork: NodeId,
        heads: &[NodeId],
        to: NodeId,
        region: &NodeSet,
    ) -> Result<Branching, CompileError> {
        let group = self.group_for(fork, heads, to, region)?;
        let upstream = self.upstream(group.join);
        let join_region = region.intersection(&upstream);
        if !self.bypasses_join(&group, region, &join_region) {
            return Ok(Branching::Group { group, join_region });
        }
        log::debug!(
            "Network {}: branches from '{}' bypass join '{}', expanding paths to '{}'",
            self.network.id,
            self.network.element_id(fork),
            self.network.element_id(group.join),
            self.network.element_id(to)
        );
        let paths = enumerate_paths(self.network, self.order, fork, to, self.ceiling)?;
        Ok(Branching::Paths(paths))
    }

    fn group_for(
        &self,
        fork: NodeId,
        heads: &[NodeId],
        to: NodeId,
        region: &NodeSet,
    ) -> Result<ParallelGroup, SemanticError> {
        self.network
            .groups
            .iter()
            .find(|g| {
                g.fork == fork && g.has_branches(heads) && (g.join == to || region.contains(g.join))
            })
            .cloned()
            .ok_or_else(|| SemanticError::AmbiguousFanIn {
                target: self.target.clone(),
                fork: self.network.element_id(fork).to_string(),
                branches: heads
                    .iter()
                    .map(|h| self.network.element_id(*h).to_string())
                    .collect(),
            })
    }

    /// Whether power can leave one of the group's branches and go on inside
    /// `region` without passing through the join.
    fn bypasses_join(
        &self,
        group: &ParallelGroup,
        region: &NodeSet,
        join_region: &NodeSet,
    ) -> bool {
        let network = self.network;
        let join = group.join;
        let heads = group.branches.iter().copied().filter(|h| *h != join);
        reachable(network.len(), heads, |n| {
            network
                .successors(n)
                .iter()
                .copied()
                .filter(move |s| region.contains(*s) && *s != join)
        })
        .iter()
        .any(|n| !join_region.contains(n))
    }

    /// Replaces a fork's alternatives with one `OR` term.
    ///
    /// Branches are first synthesized on their own; if none of them folds,
    /// the result is `prefix AND (b1 OR b2 ...)`. Otherwise every branch
    /// carries the full prefix.
    fn combine(&mut self, branching: &Branching, prefix: Chain) -> Result<Chain, CompileError> {
        let branches = self.alternatives(branching, Chain::default())?;
        if branches.iter().all(|b| !b.folded) {
            let mut chain = prefix;
            chain.terms.push(Expression::or(
                branches.into_iter().map(Chain::into_expression).collect(),
            ));
            return Ok(chain);
        }
        let full = self.alternatives(branching, prefix)?;
        Ok(Chain::folded(Expression::or(
            full.into_iter().map(Chain::into_expression).collect(),
        )))
    }

    fn alternatives(
        &mut self,
        branching: &Branching,
        start: Chain,
    ) -> Result<Vec<Chain>, CompileError> {
        match branching {
            Branching::Group { group, join_region } => {
                self.group_alternatives(group, start, join_region)
            }
            Branching::Paths(paths) => self.path_chains(paths, start),
        }
    }

    /// One chain per branch. Branches that share no nodes are walked, so
    /// groups nested inside them factor again; overlapping branches fall back
    /// to the group's enumerated paths.
    fn group_alternatives(
        &mut self,
        group: &ParallelGroup,
        start: Chain,
        join_region: &NodeSet,
    ) -> Result<Vec<Chain>, CompileError> {
        let network = self.network;
        let interiors: Vec<NodeSet> = group
            .branches
            .iter()
            .map(|head| {
                let join = group.join;
                let mut interior = reachable(network.len(), [*head], |n| {
                    network
                        .successors(n)
                        .iter()
                        .copied()
                        .filter(move |s| join_region.contains(*s) && *s != join)
                });
                interior.remove(group.join);
                interior
            })
            .collect();
        let disjoint = interiors
            .iter()
            .enumerate()
            .all(|(i, a)| interiors[i + 1..].iter().all(|b| a.is_disjoint(b)));
        if !disjoint {
            return self.path_chains(&group.paths, start);
        }

        let mut chains = Vec::new();
        for head in &group.branches {
            if *head == group.join {
                chains.push(start.clone());
                continue;
            }
            let chain = self.apply(*head, start.clone())?;
            chains.push(self.walk(*head, group.join, chain, join_region)?);
        }
        Ok(chains)
    }

    /// One chain per path, each element applied in path order.
    fn path_chains(&mut self, paths: &[Path], start: Chain) -> Result<Vec<Chain>, CompileError> {
        let mut chains = Vec::with_capacity(paths.len());
        for path in paths {
            let mut chain = start.clone();
            for node in path {
                chain = self.apply(*node, chain)?;
            }
            chains.push(chain);
        }
        Ok(chains)
    }
}
