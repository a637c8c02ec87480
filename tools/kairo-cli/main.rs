use clap::{ArgAction, Parser};
use kairo::compiler::CompilerOptions;
use kairo::ladder::{ArithmeticOp, CompareOp, CounterKind, TimerKind};
use kairo::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// --- JSON Deserialization Structs (Editor Scene Format) ---
// These structs match the editor's scene save file and are only used here for conversion.

#[derive(Deserialize)]
struct RawScene {
    #[serde(default)]
    program_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    elements: Vec<RawElement>,
    #[serde(default)]
    connections: Vec<RawConnection>,
}

#[derive(Deserialize)]
struct RawElement {
    id: Value,
    #[serde(rename = "type")]
    element_type: Value,
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    properties: BTreeMap<String, Value>,
    #[serde(default)]
    compare_op: Option<Value>,
    #[serde(default)]
    math_op: Option<Value>,
}

#[derive(Deserialize)]
struct RawConnection {
    #[serde(default)]
    start_element: String,
    #[serde(default)]
    start_connection_index: usize,
    #[serde(default)]
    end_element: String,
    #[serde(default)]
    end_connection_index: usize,
}

// --- Converter Implementation ---
// Scene elements reference each other by id or by display name, and ports by
// their index in the element's port layout.

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn resolve_kind(element: &RawElement) -> std::result::Result<Option<ElementKind>, ConversionError> {
    let kind = match &element.element_type {
        Value::Number(n) => {
            let ordinal = n.as_i64().unwrap_or(-1);
            // Connection lines are sometimes saved alongside elements.
            if ordinal == 32 {
                return Ok(None);
            }
            ElementKind::from_ordinal(ordinal)
        }
        Value::String(name) => ElementKind::from_type_name(name),
        _ => None,
    };
    let kind = kind.ok_or_else(|| {
        ConversionError::Validation(format!(
            "element '{}' has unsupported type {}",
            value_text(&element.id),
            element.element_type
        ))
    })?;

    let property = |key: &str| element.properties.get(key).map(value_text);
    let kind = match kind {
        ElementKind::Timer(_) => match property("timer_type").as_deref() {
            Some("TOF") | Some("1") => ElementKind::Timer(TimerKind::Tof),
            Some("TP") | Some("2") => ElementKind::Timer(TimerKind::Tp),
            Some("TON") | Some("0") => ElementKind::Timer(TimerKind::Ton),
            _ => kind,
        },
        ElementKind::Counter(_) => match property("counter_type").as_deref() {
            Some("CTD") | Some("1") => ElementKind::Counter(CounterKind::Down),
            Some("CTUD") | Some("2") => ElementKind::Counter(CounterKind::UpDown),
            Some("CTU") | Some("0") => ElementKind::Counter(CounterKind::Up),
            _ => kind,
        },
        ElementKind::Comparison(op) => {
            let raw = element
                .compare_op
                .clone()
                .or_else(|| element.properties.get("compare_op").cloned());
            ElementKind::Comparison(match raw {
                Some(Value::Number(n)) => {
                    n.as_i64().and_then(CompareOp::from_ordinal).unwrap_or(op)
                }
                Some(Value::String(s)) => CompareOp::from_symbol(&s).unwrap_or(op),
                _ => op,
            })
        }
        ElementKind::MathOp(op) => {
            let raw = element
                .math_op
                .clone()
                .or_else(|| element.properties.get("math_op").cloned());
            ElementKind::MathOp(match raw {
                Some(Value::Number(n)) => {
                    n.as_i64().and_then(ArithmeticOp::from_ordinal).unwrap_or(op)
                }
                Some(Value::String(s)) => ArithmeticOp::from_symbol(&s).unwrap_or(op),
                _ => op,
            })
        }
        other => other,
    };
    Ok(Some(kind))
}

impl IntoProgram for RawScene {
    fn into_program(self) -> std::result::Result<ProgramDefinition, ConversionError> {
        let mut network = NetworkDefinition::new(1, self.title.unwrap_or_default());
        let mut aliases: BTreeMap<String, String> = BTreeMap::new();

        for raw in &self.elements {
            let Some(kind) = resolve_kind(raw)? else {
                continue;
            };
            let id = value_text(&raw.id);
            let mut element = ElementDefinition::new(id.clone(), kind, raw.name.clone());
            if !raw.address.trim().is_empty() {
                element = element.with_address(raw.address.clone());
            }
            for (key, value) in &raw.properties {
                if !matches!(
                    key.as_str(),
                    "timer_type" | "counter_type" | "compare_op" | "math_op"
                ) {
                    element = element.with_property(key.clone(), value_text(value));
                }
            }
            if !raw.name.is_empty() {
                aliases.entry(raw.name.clone()).or_insert_with(|| id.clone());
            }
            aliases.insert(id, element.id.clone());
            network = network.element(element);
        }

        for (index, raw) in self.connections.iter().enumerate() {
            let endpoint = |reference: &str, port: usize| {
                let id = aliases.get(reference).ok_or_else(|| {
                    ConversionError::Validation(format!(
                        "connection {} references unknown element '{}'",
                        index, reference
                    ))
                })?;
                let element = network.find_element(id).ok_or_else(|| {
                    ConversionError::Validation(format!("element '{}' vanished", id))
                })?;
                let port = element.resolved_ports().into_iter().nth(port).ok_or_else(|| {
                    ConversionError::Validation(format!(
                        "connection {} uses port index {} which '{}' does not have",
                        index, port, id
                    ))
                })?;
                Ok::<_, ConversionError>((id.clone(), port))
            };
            let mut from = endpoint(&raw.start_element, raw.start_connection_index)?;
            let mut to = endpoint(&raw.end_element, raw.end_connection_index)?;
            // Wires may be drawn from an input back to an output.
            if from.1.direction != PortDirection::PowerOut
                && to.1.direction == PortDirection::PowerOut
            {
                std::mem::swap(&mut from, &mut to);
            }
            network = network.connect(&from.0, &from.1.name, &to.0, &to.1.name);
        }

        let mut program = ProgramDefinition::default().with_network(network);
        if let Some(name) = self.program_name {
            program.name = name;
        }
        if let Some(description) = self.description {
            program.description = description;
        }
        Ok(program)
    }
}

/// Compiles ladder diagrams into IEC 61131-3 Structured Text
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the program JSON file (canonical format or editor scene)
    input: String,

    /// Write the Structured Text to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// TOML file with compiler options
    #[arg(long)]
    config: Option<String>,

    /// Maximum number of paths enumerated per parallel group
    #[arg(long)]
    path_ceiling: Option<usize>,

    /// Fail networks containing orphaned or dead elements instead of warning
    #[arg(long)]
    reject_orphans: bool,

    /// Leave the generation date out of the header
    #[arg(long)]
    no_timestamp: bool,

    /// Override the program name
    #[arg(long)]
    program_name: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let total_start = Instant::now();

    // --- 1. Options ---
    let mut options = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read config file '{}': {}", path, e))
            });
            toml::from_str::<CompilerOptions>(&text).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to parse config file '{}': {}", path, e))
            })
        }
        None => CompilerOptions::default(),
    };
    if let Some(ceiling) = cli.path_ceiling {
        options.path_ceiling = ceiling;
    }
    if cli.reject_orphans {
        options.orphan_policy = OrphanPolicy::Reject;
    }
    if cli.no_timestamp {
        options.timestamp = Timestamp::Omit;
    }

    // --- 2. Loading and Conversion ---
    let json = fs::read_to_string(&cli.input).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read input file '{}': {}", cli.input, e))
    });
    let mut program = load_program(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load program: {}", e)));
    if let Some(name) = cli.program_name {
        program.name = name;
    }

    // --- 3. Compilation ---
    let compile_start = Instant::now();
    let compiled = Compiler::builder(program)
        .with_options(options)
        .build()
        .compile();
    let compile_duration = compile_start.elapsed();

    // --- 4. Output ---
    let text = compiled.to_st();
    match &cli.output {
        Some(path) => {
            fs::write(path, &text).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write output file '{}': {}", path, e))
            });
            eprintln!("Structured Text written to '{}'", path);
        }
        None => print!("{}", text),
    }

    // --- 5. Summary ---
    let failed = compiled
        .networks
        .iter()
        .filter(|n| n.compiled().is_none())
        .count();
    eprintln!("\n--- Compilation Summary ---");
    eprintln!("Program:          {}", compiled.name);
    eprintln!("Networks:         {}", compiled.networks.len());
    eprintln!("Failed networks:  {}", failed);
    eprintln!("Declarations:     {}", compiled.declarations.len());
    eprintln!("Compile time:     {:?}", compile_duration);
    eprintln!("Total time:       {:?}", total_start.elapsed());

    for network in compiled.networks.iter().filter_map(NetworkOutcome::compiled) {
        for warning in &network.warnings {
            eprintln!("warning: network {}: {}", network.id, warning);
        }
    }

    let errors = compiled.errors();
    if !errors.is_empty() {
        eprintln!("\n--- Errors ---");
        for (network, error) in &errors {
            eprintln!("network {}: {}", network, error);
        }
        std::process::exit(1);
    }
}

/// Accepts either the canonical `ProgramDefinition` JSON or an editor scene.
fn load_program(json: &str) -> std::result::Result<ProgramDefinition, ConversionError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ConversionError::Json(e.to_string()))?;
    if value.get("networks").is_some() {
        return ProgramDefinition::from_json(json);
    }
    let scene: RawScene =
        serde_json::from_value(value).map_err(|e| ConversionError::Json(e.to_string()))?;
    scene.into_program()
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kairo={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
