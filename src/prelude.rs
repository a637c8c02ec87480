//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kairo crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use kairo::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/program.json")?;
//! let program = ProgramDefinition::from_json(&json)?;
//!
//! let compiled = Compiler::builder(program).build().compile();
//! std::fs::write("path/to/program.st", compiled.to_st())?;
//! # Ok(())
//! # }
//! ```

// Compilation
pub use crate::compiler::{
    CompiledNetwork, CompiledProgram, Compiler, CompilerBuilder, CompilerOptions,
    NetworkOutcome, Timestamp,
};

// Input model
pub use crate::ladder::{
    ConnectionDefinition, ElementDefinition, ElementKind, IntoProgram, NetworkDefinition,
    PortDefinition, PortDirection, ProgramDefinition,
};

// Graph analysis
pub use crate::graph::{Network, NodeId, OrphanPolicy, ParallelGroup};

// Structured Text
pub use crate::ast::{Expression, Statement};

// Error types
pub use crate::error::{
    CompileError, ConversionError, NetworkError, SemanticError, StructuralIssue,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
