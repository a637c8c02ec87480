//! # Kairo - Ladder Diagram to Structured Text Compiler
//!
//! **Kairo** compiles ladder-logic networks (rungs of contacts, coils and function
//! blocks strung between two power rails) into IEC 61131-3 Structured Text. It turns
//! an arbitrary directed graph of elements into one boolean expression per output,
//! folding parallel branches that fork and rejoin into `OR` terms and series runs
//! into `AND` chains.
//!
//! ## Core Workflow
//!
//! The compiler is format-agnostic. It operates on a canonical model of a
//! "program definition". The primary workflow is:
//!
//! 1.  **Load Your Diagram**: Parse your editor's save format into your own Rust structs.
//! 2.  **Convert to Kairo's Model**: Implement the `IntoProgram` trait for your structs to translate them into a `ProgramDefinition`.
//! 3.  **Compile**: Use `Compiler::builder` to configure a compiler for the program. Each network is ingested, ordered, analysed for parallel branches and synthesized independently.
//! 4.  **Emit**: Render the `CompiledProgram` with `to_st()`, and surface `errors()` to the user. A broken network never stops the others.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kairo::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // rail -> NO(Start) -> NC(Stop) -> Coil(Motor) -> rail
//!     let network = NetworkDefinition::new(1, "Motor control")
//!         .element(ElementDefinition::left_rail("L"))
//!         .element(ElementDefinition::new("start", ElementKind::NormallyOpenContact, "Start"))
//!         .element(ElementDefinition::new("stop", ElementKind::NormallyClosedContact, "Stop"))
//!         .element(ElementDefinition::new("motor", ElementKind::OutputCoil, "Motor"))
//!         .element(ElementDefinition::right_rail("R"))
//!         .wire("L", "start")
//!         .wire("start", "stop")
//!         .wire("stop", "motor")
//!         .wire("motor", "R");
//!
//!     let program = ProgramDefinition::new("Conveyor").with_network(network);
//!
//!     let compiled = Compiler::builder(program)
//!         .with_timestamp(Timestamp::Omit)
//!         .build()
//!         .compile();
//!
//!     // Contains `Motor := Start AND NOT Stop;`
//!     println!("{}", compiled.to_st());
//!
//!     for (network, error) in compiled.errors() {
//!         eprintln!("network {}: {}", network, error);
//!     }
//!     Ok(())
//! }
//! ```

pub mod ast;
pub mod codegen;
pub mod compiler;
pub mod error;
pub mod graph;
pub mod ladder;
pub mod prelude;
