use super::{NodeId, reachable};
use crate::error::{NetworkError, StructuralIssue};
use crate::ladder::{
    ConnectionDefinition, ElementDefinition, ElementKind, NetworkDefinition, PortDirection,
};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What ingest does with elements that sit off every rail-to-output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Exclude the element and report it as a warning.
    #[default]
    Warn,
    /// Treat the element as a structural error.
    Reject,
}

/// Whether an edge carries power flow or feeds a data input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Power,
    Data,
}

/// A resolved connection. `from`/`to` index into [`ValidatedNetwork::elements`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEdge {
    pub connection: usize,
    pub from: usize,
    pub to: usize,
    pub to_port: String,
    pub kind: EdgeKind,
}

/// A network that passed every structural check, restricted to its live elements.
#[derive(Debug, Clone)]
pub struct ValidatedNetwork {
    pub id: u32,
    pub title: String,
    pub elements: Vec<ElementDefinition>,
    pub edges: Vec<ValidatedEdge>,
    pub source: usize,
    pub sink: usize,
    /// Orphans and dead logic excluded under [`OrphanPolicy::Warn`].
    pub warnings: Vec<StructuralIssue>,
}

/// Validates a network definition.
///
/// Every problem is collected before failing, so the caller sees the full
/// list at once.
pub fn ingest(
    definition: &NetworkDefinition,
    policy: OrphanPolicy,
) -> Result<ValidatedNetwork, NetworkError> {
    let mut issues = Vec::new();

    let mut index: AHashMap<&str, usize> = AHashMap::new();
    for (i, element) in definition.elements.iter().enumerate() {
        if index.contains_key(element.id.as_str()) {
            issues.push(StructuralIssue::DuplicateElement {
                element: element.id.clone(),
            });
        } else {
            index.insert(element.id.as_str(), i);
        }
    }

    let source = find_rail(definition, ElementKind::LeftRail, "left", &mut issues);
    let sink = find_rail(definition, ElementKind::RightRail, "right", &mut issues);

    let mut edges = Vec::new();
    let mut seen: AHashSet<&ConnectionDefinition> = AHashSet::new();
    for (i, connection) in definition.connections.iter().enumerate() {
        if !seen.insert(connection) {
            log::warn!(
                "Network {}: ignoring duplicate connection #{} ({}.{} -> {}.{})",
                definition.id,
                i,
                connection.from_element,
                connection.from_port,
                connection.to_element,
                connection.to_port
            );
            continue;
        }
        match resolve_connection(definition, &index, i, connection) {
            Ok(edge) => edges.push(edge),
            Err(issue) => issues.push(issue),
        }
    }

    let mut data_feeds: BTreeMap<(usize, &str), Vec<usize>> = BTreeMap::new();
    for edge in edges.iter().filter(|e| e.kind == EdgeKind::Data) {
        data_feeds
            .entry((edge.to, edge.to_port.as_str()))
            .or_default()
            .push(edge.connection);
    }
    for ((element, port), connections) in data_feeds {
        if connections.len() > 1 {
            issues.push(StructuralIssue::DataInputFanIn {
                element: definition.elements[element].id.clone(),
                port: port.to_string(),
                connections,
            });
        }
    }

    let (Some(source), Some(sink)) = (source, sink) else {
        return Err(NetworkError::Structural(issues));
    };

    let mut warnings = Vec::new();
    let live = liveness(definition, &index, &edges, source, sink, |issue| match policy {
        OrphanPolicy::Reject => issues.push(issue),
        OrphanPolicy::Warn => {
            log::warn!("Network {}: excluding {}", definition.id, issue);
            warnings.push(issue);
        }
    });

    if !issues.is_empty() {
        return Err(NetworkError::Structural(issues));
    }

    // Compact the element list down to live elements, keeping input order.
    let mut remap = vec![None; definition.elements.len()];
    let mut elements = Vec::new();
    for (i, element) in definition.elements.iter().enumerate() {
        if live[i] {
            remap[i] = Some(elements.len());
            elements.push(element.clone());
        }
    }
    let edges = edges
        .into_iter()
        .filter_map(|edge| {
            Some(ValidatedEdge {
                from: remap[edge.from]?,
                to: remap[edge.to]?,
                ..edge
            })
        })
        .collect();

    Ok(ValidatedNetwork {
        id: definition.id,
        title: definition.title.clone(),
        elements,
        edges,
        source: remap[source].unwrap_or_default(),
        sink: remap[sink].unwrap_or_default(),
        warnings,
    })
}

fn find_rail(
    definition: &NetworkDefinition,
    kind: ElementKind,
    side: &str,
    issues: &mut Vec<StructuralIssue>,
) -> Option<usize> {
    let rails: Vec<usize> = definition
        .elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind == kind)
        .map(|(i, _)| i)
        .collect();
    match rails.as_slice() {
        [single] => Some(*single),
        [] => {
            issues.push(StructuralIssue::MissingRail {
                rail: side.to_string(),
            });
            None
        }
        many => {
            issues.push(StructuralIssue::DuplicateRail {
                rail: side.to_string(),
                elements: many
                    .iter()
                    .map(|i| definition.elements[*i].id.clone())
                    .collect(),
            });
            None
        }
    }
}

fn resolve_connection(
    definition: &NetworkDefinition,
    index: &AHashMap<&str, usize>,
    connection_id: usize,
    connection: &ConnectionDefinition,
) -> Result<ValidatedEdge, StructuralIssue> {
    let lookup = |element: &str| {
        index
            .get(element)
            .copied()
            .ok_or_else(|| StructuralIssue::UnknownElement {
                connection: connection_id,
                element: element.to_string(),
            })
    };
    let from = lookup(&connection.from_element)?;
    let to = lookup(&connection.to_element)?;
    if from == to {
        return Err(StructuralIssue::SelfLoop {
            connection: connection_id,
            element: connection.from_element.clone(),
        });
    }

    let port = |element: usize, name: &str| {
        definition.elements[element]
            .port(name)
            .ok_or_else(|| StructuralIssue::UnknownPort {
                connection: connection_id,
                element: definition.elements[element].id.clone(),
                port: name.to_string(),
            })
    };
    let from_port = port(from, &connection.from_port)?;
    let to_port = port(to, &connection.to_port)?;

    if !from_port.direction.can_feed(to_port.direction) {
        return Err(StructuralIssue::IncompatiblePorts {
            connection: connection_id,
            from_element: connection.from_element.clone(),
            from_port: from_port.name,
            from_direction: from_port.direction,
            to_element: connection.to_element.clone(),
            to_port: to_port.name,
            to_direction: to_port.direction,
        });
    }

    Ok(ValidatedEdge {
        connection: connection_id,
        from,
        to,
        kind: if to_port.direction == PortDirection::DataIn {
            EdgeKind::Data
        } else {
            EdgeKind::Power
        },
        to_port: to_port.name,
    })
}

/// Marks every element that lies between the left rail and an output.
///
/// An element is live when it is reachable from the left rail and reaches the
/// right rail or a terminal element, following edges of both kinds. Rails and
/// labels are always live.
fn liveness(
    definition: &NetworkDefinition,
    index: &AHashMap<&str, usize>,
    edges: &[ValidatedEdge],
    source: usize,
    sink: usize,
    mut report: impl FnMut(StructuralIssue),
) -> Vec<bool> {
    let count = definition.elements.len();
    let mut outgoing = vec![Vec::new(); count];
    let mut incoming = vec![Vec::new(); count];
    for edge in edges {
        outgoing[edge.from].push(NodeId(edge.to));
        incoming[edge.to].push(NodeId(edge.from));
    }

    let forward = reachable(count, [NodeId(source)], |n| outgoing[n.0].iter().copied());
    let outputs = definition
        .elements
        .iter()
        .enumerate()
        .filter(|(i, e)| *i == sink || e.kind.is_terminal())
        .map(|(i, _)| NodeId(i));
    let backward = reachable(count, outputs, |n| incoming[n.0].iter().copied());

    let mut live = vec![false; count];
    for (i, element) in definition.elements.iter().enumerate() {
        // Later copies of a duplicated id are never part of the graph.
        if index.get(element.id.as_str()) != Some(&i) {
            continue;
        }
        if element.kind.is_rail() || element.kind == ElementKind::Label {
            live[i] = true;
        } else if !forward.contains(NodeId(i)) {
            report(StructuralIssue::Orphan {
                element: element.id.clone(),
            });
        } else if !backward.contains(NodeId(i)) {
            report(StructuralIssue::DeadLogic {
                element: element.id.clone(),
            });
        } else {
            live[i] = true;
        }
    }
    live
}
