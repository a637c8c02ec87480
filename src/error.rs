use crate::ladder::PortDirection;
use itertools::Itertools;
use thiserror::Error;

/// A single structural problem found while ingesting a network.
///
/// Connection references are indices into the network's connection list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralIssue {
    #[error("Connection #{connection} references unknown element '{element}'")]
    UnknownElement { connection: usize, element: String },

    #[error("Connection #{connection} references unknown port '{port}' on element '{element}'")]
    UnknownPort {
        connection: usize,
        element: String,
        port: String,
    },

    #[error(
        "Connection #{connection} from '{from_element}.{from_port}' ({from_direction}) to '{to_element}.{to_port}' ({to_direction}) joins incompatible ports"
    )]
    IncompatiblePorts {
        connection: usize,
        from_element: String,
        from_port: String,
        from_direction: PortDirection,
        to_element: String,
        to_port: String,
        to_direction: PortDirection,
    },

    #[error("Connection #{connection} loops element '{element}' back onto itself")]
    SelfLoop { connection: usize, element: String },

    #[error("Element id '{element}' is used more than once")]
    DuplicateElement { element: String },

    #[error("Network has no {rail} rail")]
    MissingRail { rail: String },

    #[error("Network has more than one {rail} rail: {elements:?}")]
    DuplicateRail { rail: String, elements: Vec<String> },

    #[error("Data input '{element}.{port}' is driven by more than one connection: {connections:?}")]
    DataInputFanIn {
        element: String,
        port: String,
        connections: Vec<usize>,
    },

    #[error("Element '{element}' is not reachable from the left rail")]
    Orphan { element: String },

    #[error("Element '{element}' never reaches the right rail or an output")]
    DeadLogic { element: String },
}

impl StructuralIssue {
    /// The element ids an editor should highlight for this issue.
    pub fn element_ids(&self) -> Vec<&str> {
        match self {
            StructuralIssue::UnknownElement { element, .. }
            | StructuralIssue::UnknownPort { element, .. }
            | StructuralIssue::SelfLoop { element, .. }
            | StructuralIssue::DuplicateElement { element }
            | StructuralIssue::DataInputFanIn { element, .. }
            | StructuralIssue::Orphan { element }
            | StructuralIssue::DeadLogic { element } => vec![element.as_str()],
            StructuralIssue::IncompatiblePorts {
                from_element,
                to_element,
                ..
            } => vec![from_element.as_str(), to_element.as_str()],
            StructuralIssue::DuplicateRail { elements, .. } => {
                elements.iter().map(String::as_str).collect()
            }
            StructuralIssue::MissingRail { .. } => Vec::new(),
        }
    }

    /// The connection indices involved in this issue, if any.
    pub fn connection_ids(&self) -> Vec<usize> {
        match self {
            StructuralIssue::UnknownElement { connection, .. }
            | StructuralIssue::UnknownPort { connection, .. }
            | StructuralIssue::IncompatiblePorts { connection, .. }
            | StructuralIssue::SelfLoop { connection, .. } => vec![*connection],
            StructuralIssue::DataInputFanIn { connections, .. } => connections.clone(),
            _ => Vec::new(),
        }
    }
}

/// Errors that abort the compilation of one network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("{} structural issue(s): {}", .0.len(), join_issues(.0))]
    Structural(Vec<StructuralIssue>),

    #[error("Network contains a feedback cycle through elements {elements:?}")]
    CyclicNetwork { elements: Vec<String> },

    #[error(
        "Parallel group from '{fork}' to '{join}' has more than {ceiling} paths; simplify the diagram or raise the path ceiling"
    )]
    PathExplosion {
        fork: String,
        join: String,
        ceiling: usize,
    },
}

fn join_issues(issues: &[StructuralIssue]) -> String {
    issues.iter().join("; ")
}

/// Errors that fail a single target (coil, block, jump) inside a network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("Target '{target}' depends on element '{element}', which has no operand")]
    UnboundOperand { target: String, element: String },

    #[error(
        "Target '{target}' is fed by branches {branches:?} forking at '{fork}' that never merge into one chain"
    )]
    AmbiguousFanIn {
        target: String,
        fork: String,
        branches: Vec<String>,
    },
}

impl SemanticError {
    pub fn target(&self) -> &str {
        match self {
            SemanticError::UnboundOperand { target, .. }
            | SemanticError::AmbiguousFanIn { target, .. } => target,
        }
    }
}

/// Any failure recorded while compiling a program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// Errors that can occur when converting a custom editor format into a `ProgramDefinition`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Invalid custom data: {0}")]
    Validation(String),

    #[error("Failed to parse program JSON: {0}")]
    Json(String),
}
