use crate::ast::Statement;
use crate::codegen::{self, Declaration};
use crate::error::{CompileError, NetworkError, SemanticError, StructuralIssue};
use crate::graph::{self, OrphanPolicy, ParallelGroup};
use crate::ladder::{NetworkDefinition, ProgramDefinition};
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

mod options;
mod synthesizer;
mod terms;

pub use options::{CompilerOptions, DEFAULT_PATH_CEILING, TIMESTAMP_FORMAT, Timestamp};
pub use synthesizer::{Synthesis, synthesize};

/// The result of compiling one network successfully.
///
/// `errors` lists targets that could not be synthesized; every other target
/// has its statement in `statements`.
#[derive(Debug, Clone)]
pub struct CompiledNetwork {
    pub id: u32,
    pub title: String,
    pub statements: Vec<Statement>,
    pub errors: Vec<SemanticError>,
    pub warnings: Vec<StructuralIssue>,
    pub groups: Vec<ParallelGroup>,
    /// Operand name to hardware address, for `AT` declarations.
    pub addresses: BTreeMap<String, String>,
}

/// What happened to one network of a program.
#[derive(Debug, Clone)]
pub enum NetworkOutcome {
    Compiled(CompiledNetwork),
    Failed {
        id: u32,
        title: String,
        error: NetworkError,
    },
}

impl NetworkOutcome {
    pub fn id(&self) -> u32 {
        match self {
            NetworkOutcome::Compiled(network) => network.id,
            NetworkOutcome::Failed { id, .. } => *id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            NetworkOutcome::Compiled(network) => &network.title,
            NetworkOutcome::Failed { title, .. } => title,
        }
    }

    pub fn compiled(&self) -> Option<&CompiledNetwork> {
        match self {
            NetworkOutcome::Compiled(network) => Some(network),
            NetworkOutcome::Failed { .. } => None,
        }
    }
}

/// A compiled program: every network's outcome plus the shared declarations.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub name: String,
    pub description: String,
    /// Rendered `Date:` header line, if any.
    pub generated_at: Option<String>,
    pub networks: Vec<NetworkOutcome>,
    pub declarations: Vec<Declaration>,
}

impl CompiledProgram {
    /// Renders the program as Structured Text.
    pub fn to_st(&self) -> String {
        codegen::emit_program(self)
    }

    /// Every failure, tagged with the id of the network it belongs to.
    pub fn errors(&self) -> Vec<(u32, CompileError)> {
        let mut errors = Vec::new();
        for outcome in &self.networks {
            match outcome {
                NetworkOutcome::Failed { id, error, .. } => {
                    errors.push((*id, CompileError::Network(error.clone())))
                }
                NetworkOutcome::Compiled(network) => errors.extend(
                    network
                        .errors
                        .iter()
                        .map(|e| (network.id, CompileError::Semantic(e.clone()))),
                ),
            }
        }
        errors
    }

    pub fn is_success(&self) -> bool {
        self.errors().is_empty()
    }

    pub fn network(&self, id: u32) -> Option<&NetworkOutcome> {
        self.networks.iter().find(|n| n.id() == id)
    }
}

pub struct Compiler {
    program: ProgramDefinition,
    options: CompilerOptions,
}

pub struct CompilerBuilder {
    program: ProgramDefinition,
    options: CompilerOptions,
}

impl CompilerBuilder {
    pub fn new(program: ProgramDefinition) -> Self {
        Self {
            program,
            options: CompilerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_path_ceiling(mut self, ceiling: usize) -> Self {
        self.options.path_ceiling = ceiling;
        self
    }

    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.options.orphan_policy = policy;
        self
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.options.timestamp = timestamp;
        self
    }

    pub fn with_numeric_type(mut self, numeric_type: &str) -> Self {
        self.options.numeric_type = numeric_type.to_string();
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            program: self.program,
            options: self.options,
        }
    }
}

impl Compiler {
    pub fn builder(program: ProgramDefinition) -> CompilerBuilder {
        CompilerBuilder::new(program)
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compiles every network. Failures are recorded per network and never
    /// stop the others.
    pub fn compile(self) -> CompiledProgram {
        log::info!(
            "Compiling program '{}' ({} networks)",
            self.program.name,
            self.program.networks.len()
        );

        #[cfg(feature = "parallel")]
        let networks: Vec<NetworkOutcome> = self
            .program
            .networks
            .par_iter()
            .map(|definition| self.outcome(definition))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let networks: Vec<NetworkOutcome> = self
            .program
            .networks
            .iter()
            .map(|definition| self.outcome(definition))
            .collect();

        let declarations = codegen::collect_declarations(&networks, &self.options.numeric_type);
        CompiledProgram {
            name: self.program.name,
            description: self.program.description,
            generated_at: self.options.timestamp.render(),
            networks,
            declarations,
        }
    }

    /// Runs the full pipeline over one network.
    pub fn compile_network(
        &self,
        definition: &NetworkDefinition,
    ) -> Result<CompiledNetwork, NetworkError> {
        let validated = graph::ingest(definition, self.options.orphan_policy)?;
        let network = graph::build(validated);
        let order = graph::topological_order(&network)?;
        let groups = graph::detect_parallel_groups(&network, &order, self.options.path_ceiling)?;
        let network = network.with_groups(groups);
        let synthesis = synthesize(&network, &order, self.options.path_ceiling)?;

        let mut addresses = BTreeMap::new();
        for node in network.nodes() {
            if let (true, Some(address)) = (node.has_operand(), &node.address) {
                if !address.trim().is_empty() {
                    addresses
                        .entry(node.operand.trim().to_string())
                        .or_insert_with(|| address.trim().to_string());
                }
            }
        }

        log::info!(
            "Compiled network {} ({} statements, {} failed targets)",
            network.id,
            synthesis.statements.len(),
            synthesis.errors.len()
        );
        Ok(CompiledNetwork {
            id: network.id,
            title: network.title,
            statements: synthesis.statements,
            errors: synthesis.errors,
            warnings: network.warnings,
            groups: network.groups,
            addresses,
        })
    }

    fn outcome(&self, definition: &NetworkDefinition) -> NetworkOutcome {
        match self.compile_network(definition) {
            Ok(network) => NetworkOutcome::Compiled(network),
            Err(error) => {
                log::warn!("Network {} not compiled: {}", definition.id, error);
                NetworkOutcome::Failed {
                    id: definition.id,
                    title: definition.title.clone(),
                    error,
                }
            }
        }
    }
}
