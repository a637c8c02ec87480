use clap::Parser;
use kairo::ladder::{
    ConnectionDefinition, ElementDefinition, ElementKind, NetworkDefinition, ProgramDefinition,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;

/// A CLI tool to generate random ladder programs for the Kairo compiler
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated program JSON to
    #[arg(short, long, default_value = "generated_program.json")]
    output: String,

    /// Number of networks (rungs) to generate
    #[arg(short, long, default_value_t = 5)]
    networks: u32,

    /// Maximum nesting depth of parallel branches
    #[arg(long, default_value_t = 2)]
    depth: usize,

    /// Maximum number of branches in one parallel group
    #[arg(long, default_value_t = 3)]
    width: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.width < 2 {
        eprintln!("Error: --width ({}) must be at least 2", cli.width);
        std::process::exit(1);
    }

    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);

    println!(
        "Generating {} networks (depth {}, width {}, seed {})...",
        cli.networks, cli.depth, cli.width, seed
    );

    let mut program = ProgramDefinition::new("GeneratedProgram")
        .with_description(format!("Random series-parallel rungs, seed {}", seed));
    for id in 1..=cli.networks {
        let network = RungBuilder::new(id, &mut rng, cli.width).generate(cli.depth);
        println!(
            "-> Network {}: {} elements, {} connections",
            id,
            network.elements.len(),
            network.connections.len()
        );
        program = program.with_network(network);
    }

    fs::write(&cli.output, program.to_json()?)?;

    println!("Successfully generated and saved program to '{}'", cli.output);

    Ok(())
}

/// Grows one series-parallel rung between the two rails.
struct RungBuilder<'a> {
    network: NetworkDefinition,
    rng: &'a mut StdRng,
    width: usize,
    next: usize,
}

impl<'a> RungBuilder<'a> {
    fn new(id: u32, rng: &'a mut StdRng, width: usize) -> Self {
        let network = NetworkDefinition::new(id, format!("Generated rung {}", id))
            .element(ElementDefinition::left_rail("L"))
            .element(ElementDefinition::right_rail("R"));
        Self {
            network,
            rng,
            width,
            next: 0,
        }
    }

    fn generate(mut self, depth: usize) -> NetworkDefinition {
        let last = self.series("L".to_string(), depth);
        let coil_id = format!("coil{}", self.network.id);
        let coil = ElementDefinition::new(
            coil_id.clone(),
            ElementKind::OutputCoil,
            format!("Y{}", self.network.id),
        );
        self.network.elements.push(coil);
        self.wire(&last, &coil_id);
        self.wire(&coil_id, "R");
        self.network
    }

    /// Appends one to three blocks after `from` and returns the last element id.
    fn series(&mut self, from: String, depth: usize) -> String {
        let length = self.rng.random_range(1..=3);
        let mut last = from;
        for _ in 0..length {
            last = if depth > 0 && self.rng.random_bool(0.4) {
                self.parallel(last, depth - 1)
            } else {
                let contact = self.contact();
                self.wire(&last, &contact);
                contact
            };
        }
        last
    }

    /// Forks after `from` and rejoins every branch at a fresh contact.
    fn parallel(&mut self, from: String, depth: usize) -> String {
        let branches = self.rng.random_range(2..=self.width);
        let join = self.contact();
        for _ in 0..branches {
            let end = self.series(from.clone(), depth);
            self.wire(&end, &join);
        }
        join
    }

    fn contact(&mut self) -> String {
        self.next += 1;
        let id = format!("c{}", self.next);
        let kind = if self.rng.random_bool(0.75) {
            ElementKind::NormallyOpenContact
        } else {
            ElementKind::NormallyClosedContact
        };
        let name = format!("X{}_{}", self.network.id, self.next);
        self.network
            .elements
            .push(ElementDefinition::new(id.clone(), kind, name));
        id
    }

    fn wire(&mut self, from: &str, to: &str) {
        let from_port = if from == "L" { "OUT_0" } else { "OUT" };
        let to_port = if to == "R" { "IN_0" } else { "IN" };
        let connection = ConnectionDefinition {
            from_element: from.to_string(),
            from_port: from_port.to_string(),
            to_element: to.to_string(),
            to_port: to_port.to_string(),
        };
        if !self.network.connections.contains(&connection) {
            self.network.connections.push(connection);
        }
    }
}
