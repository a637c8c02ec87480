use super::ingest::{EdgeKind, ValidatedNetwork};
use super::{NodeId, ParallelGroup};
use crate::error::StructuralIssue;
use crate::ladder::ElementKind;
use std::collections::BTreeMap;

/// A data-input connection: the node whose output drives `port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataInput {
    pub port: String,
    pub source: NodeId,
}

/// One element in graph form.
///
/// Adjacency lists hold arena indices. Power edges (`predecessors`/`successors`)
/// keep the order connections were supplied in; `data_inputs`/`data_targets`
/// hold edges into data ports.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub element_id: String,
    pub kind: ElementKind,
    pub operand: String,
    pub address: Option<String>,
    pub properties: BTreeMap<String, String>,
    pub predecessors: Vec<NodeId>,
    pub successors: Vec<NodeId>,
    pub data_inputs: Vec<DataInput>,
    pub data_targets: Vec<NodeId>,
}

impl Node {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn data_input(&self, port: &str) -> Option<NodeId> {
        self.data_inputs
            .iter()
            .find(|input| input.port == port)
            .map(|input| input.source)
    }

    pub fn has_operand(&self) -> bool {
        !self.operand.trim().is_empty()
    }
}

/// The whole graph of one rung, owned as an arena.
#[derive(Debug, Clone)]
pub struct Network {
    pub id: u32,
    pub title: String,
    pub source: NodeId,
    pub sink: NodeId,
    pub groups: Vec<ParallelGroup>,
    pub warnings: Vec<StructuralIssue>,
    nodes: Vec<Node>,
}

impl Network {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].successors
    }

    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].predecessors
    }

    /// Power successors followed by data targets, without repeats.
    pub fn dependents(&self, id: NodeId) -> Vec<NodeId> {
        let node = &self.nodes[id.0];
        let mut all = node.successors.clone();
        for target in &node.data_targets {
            if !all.contains(target) {
                all.push(*target);
            }
        }
        all
    }

    pub fn element_id(&self, id: NodeId) -> &str {
        &self.nodes[id.0].element_id
    }

    pub fn find_by_element(&self, element_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.element_id == element_id)
            .map(|n| n.id)
    }

    pub fn with_groups(mut self, groups: Vec<ParallelGroup>) -> Self {
        self.groups = groups;
        self
    }
}

/// Converts a validated network into its node arena.
pub fn build(validated: ValidatedNetwork) -> Network {
    let mut nodes: Vec<Node> = validated
        .elements
        .into_iter()
        .enumerate()
        .map(|(i, element)| Node {
            id: NodeId(i),
            element_id: element.id,
            kind: element.kind,
            operand: element.variable_name,
            address: element.address,
            properties: element.properties,
            predecessors: Vec::new(),
            successors: Vec::new(),
            data_inputs: Vec::new(),
            data_targets: Vec::new(),
        })
        .collect();

    for edge in &validated.edges {
        let (from, to) = (NodeId(edge.from), NodeId(edge.to));
        match edge.kind {
            EdgeKind::Power => {
                // Two wires between the same pair of elements are one electrical path.
                if !nodes[edge.from].successors.contains(&to) {
                    nodes[edge.from].successors.push(to);
                    nodes[edge.to].predecessors.push(from);
                }
            }
            EdgeKind::Data => {
                nodes[edge.to].data_inputs.push(DataInput {
                    port: edge.to_port.clone(),
                    source: from,
                });
                if !nodes[edge.from].data_targets.contains(&to) {
                    nodes[edge.from].data_targets.push(to);
                }
            }
        }
    }

    log::debug!(
        "Network {}: built {} nodes from {} edges",
        validated.id,
        nodes.len(),
        validated.edges.len()
    );

    Network {
        id: validated.id,
        title: validated.title,
        source: NodeId(validated.source),
        sink: NodeId(validated.sink),
        groups: Vec::new(),
        warnings: validated.warnings,
        nodes,
    }
}
