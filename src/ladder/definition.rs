use super::kind::{ElementKind, PortDirection};
use crate::error::ConversionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The complete, canonical description of a ladder program, ready for compilation.
/// This is the target structure for any custom editor format conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDefinition {
    #[serde(default = "default_program_name")]
    pub name: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default)]
    pub networks: Vec<NetworkDefinition>,
}

fn default_program_name() -> String {
    "MainProgram".to_string()
}

fn default_description() -> String {
    "Generated from Ladder Diagram".to_string()
}

impl Default for ProgramDefinition {
    fn default() -> Self {
        Self {
            name: default_program_name(),
            description: default_description(),
            networks: Vec::new(),
        }
    }
}

impl ProgramDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_network(mut self, network: NetworkDefinition) -> Self {
        self.networks.push(network);
        self
    }

    /// Parses the canonical JSON representation.
    pub fn from_json(json: &str) -> Result<Self, ConversionError> {
        serde_json::from_str(json).map_err(|e| ConversionError::Json(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConversionError> {
        serde_json::to_string_pretty(self).map_err(|e| ConversionError::Json(e.to_string()))
    }
}

/// One rung: a self-contained graph of elements between the two rails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDefinition {
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub elements: Vec<ElementDefinition>,
    #[serde(default)]
    pub connections: Vec<ConnectionDefinition>,
}

impl NetworkDefinition {
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            elements: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn element(mut self, element: ElementDefinition) -> Self {
        self.elements.push(element);
        self
    }

    /// Adds a connection from `from.from_port` to `to.to_port`.
    pub fn connect(mut self, from: &str, from_port: &str, to: &str, to_port: &str) -> Self {
        self.connections.push(ConnectionDefinition {
            from_element: from.to_string(),
            from_port: from_port.to_string(),
            to_element: to.to_string(),
            to_port: to_port.to_string(),
        });
        self
    }

    /// Connects the first power output of `from` to the first power input of `to`.
    ///
    /// Falls back to `OUT`/`IN` when an element is unknown, leaving the
    /// mistake for ingest to report.
    pub fn wire(self, from: &str, to: &str) -> Self {
        let from_port = self
            .find_element(from)
            .and_then(|e| e.first_port(PortDirection::PowerOut))
            .unwrap_or_else(|| "OUT".to_string());
        let to_port = self
            .find_element(to)
            .and_then(|e| e.first_port(PortDirection::PowerIn))
            .unwrap_or_else(|| "IN".to_string());
        self.connect(from, &from_port, to, &to_port)
    }

    pub fn find_element(&self, id: &str) -> Option<&ElementDefinition> {
        self.elements.iter().find(|e| e.id == id)
    }
}

/// Defines a single ladder element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDefinition {
    pub id: String,
    pub kind: ElementKind,
    #[serde(default)]
    pub variable_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Explicit port layout. Empty means the default layout of `kind`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortDefinition>,
    /// Kind parameters such as `preset`, `left`/`right` operands or `target_label`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl ElementDefinition {
    pub fn new(id: impl Into<String>, kind: ElementKind, variable_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            variable_name: variable_name.into(),
            address: None,
            ports: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn left_rail(id: impl Into<String>) -> Self {
        Self::new(id, ElementKind::LeftRail, "")
    }

    pub fn right_rail(id: impl Into<String>) -> Self {
        Self::new(id, ElementKind::RightRail, "")
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_ports(mut self, ports: Vec<PortDefinition>) -> Self {
        self.ports = ports;
        self
    }

    /// The ports this element actually exposes.
    pub fn resolved_ports(&self) -> Vec<PortDefinition> {
        if self.ports.is_empty() {
            self.kind.default_ports()
        } else {
            self.ports.clone()
        }
    }

    pub fn port(&self, name: &str) -> Option<PortDefinition> {
        self.resolved_ports().into_iter().find(|p| p.name == name)
    }

    fn first_port(&self, direction: PortDirection) -> Option<String> {
        self.resolved_ports()
            .into_iter()
            .find(|p| p.direction == direction)
            .map(|p| p.name)
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// A named attachment point on an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortDefinition {
    pub name: String,
    pub direction: PortDirection,
}

impl PortDefinition {
    pub fn new(name: impl Into<String>, direction: PortDirection) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }
}

/// Defines a directed connection between two element ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionDefinition {
    pub from_element: String,
    pub from_port: String,
    pub to_element: String,
    pub to_port: String,
}
