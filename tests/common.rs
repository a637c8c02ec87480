//! Common test utilities for building ladder networks and compiling them.
use kairo::graph::{self, Network, TopologicalOrder};
use kairo::prelude::*;

/// A network holding only its two rails, `L` and `R`.
#[allow(dead_code)]
pub fn rung(id: u32) -> NetworkDefinition {
    NetworkDefinition::new(id, format!("Rung {}", id))
        .element(ElementDefinition::left_rail("L"))
        .element(ElementDefinition::right_rail("R"))
}

#[allow(dead_code)]
pub fn no(id: &str) -> ElementDefinition {
    ElementDefinition::new(id, ElementKind::NormallyOpenContact, id)
}

#[allow(dead_code)]
pub fn nc(id: &str) -> ElementDefinition {
    ElementDefinition::new(id, ElementKind::NormallyClosedContact, id)
}

#[allow(dead_code)]
pub fn coil(id: &str) -> ElementDefinition {
    ElementDefinition::new(id, ElementKind::OutputCoil, id)
}

/// `L -> A -> NC(B) -> coil C -> R`
///
/// Expected: `C := A AND NOT B;`
#[allow(dead_code)]
pub fn series_network() -> NetworkDefinition {
    rung(1)
        .element(no("A"))
        .element(nc("B"))
        .element(coil("C"))
        .wire("L", "A")
        .wire("A", "B")
        .wire("B", "C")
        .wire("C", "R")
}

/// Two contacts in parallel straight off the rail.
///
/// Expected: `C := (A) OR (B);`
#[allow(dead_code)]
pub fn parallel_network() -> NetworkDefinition {
    rung(2)
        .element(no("A"))
        .element(no("B"))
        .element(coil("C"))
        .wire("L", "A")
        .wire("L", "B")
        .wire("A", "C")
        .wire("B", "C")
        .wire("C", "R")
}

/// `A` in series with a parallel pair: `B` alone, or `C` then `D`.
///
/// Expected: `E := A AND ((B) OR (C AND D));`
#[allow(dead_code)]
pub fn mixed_network() -> NetworkDefinition {
    rung(3)
        .element(no("A"))
        .element(no("B"))
        .element(no("C"))
        .element(no("D"))
        .element(coil("E"))
        .wire("L", "A")
        .wire("A", "B")
        .wire("A", "C")
        .wire("C", "D")
        .wire("B", "E")
        .wire("D", "E")
        .wire("E", "R")
}

/// `k` contacts `X0..Xk` in parallel feeding coil `Y`.
#[allow(dead_code)]
pub fn fan_network(k: usize) -> NetworkDefinition {
    let mut network = rung(4).element(coil("Y"));
    for i in 0..k {
        let id = format!("X{}", i);
        network = network
            .element(no(&id))
            .wire("L", &id)
            .wire(&id, "Y");
    }
    network.wire("Y", "R")
}

/// `A` and `B` feed each other in a loop.
#[allow(dead_code)]
pub fn cyclic_network() -> NetworkDefinition {
    rung(5)
        .element(no("A"))
        .element(no("B"))
        .element(coil("C"))
        .wire("L", "A")
        .wire("A", "B")
        .wire("B", "A")
        .wire("B", "C")
        .wire("C", "R")
}

/// Runs ingest, graph building and ordering over one network.
#[allow(dead_code)]
pub fn analyse(definition: &NetworkDefinition) -> (Network, TopologicalOrder) {
    let validated = graph::ingest(definition, OrphanPolicy::Warn).expect("network should ingest");
    let network = graph::build(validated);
    let order = graph::topological_order(&network).expect("network should be acyclic");
    (network, order)
}

/// Compiles networks into one program with a stable header.
#[allow(dead_code)]
pub fn compile(networks: Vec<NetworkDefinition>) -> CompiledProgram {
    let mut program = ProgramDefinition::new("TestProgram");
    for network in networks {
        program = program.with_network(network);
    }
    Compiler::builder(program)
        .with_timestamp(Timestamp::Omit)
        .build()
        .compile()
}

/// The statements one network compiled to, rendered one per line.
#[allow(dead_code)]
pub fn statements(definition: NetworkDefinition) -> Vec<String> {
    let id = definition.id;
    let program = compile(vec![definition]);
    let network = program
        .network(id)
        .and_then(NetworkOutcome::compiled)
        .expect("network should compile");
    network.statements.iter().map(|s| s.to_string()).collect()
}
