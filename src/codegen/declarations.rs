use crate::ast::{SymbolRole, SymbolUse};
use crate::compiler::NetworkOutcome;
use ahash::AHashMap;

/// One line of the `VAR` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub data_type: String,
    pub address: Option<String>,
}

/// How strongly a use pins down a name's type. A later, stronger use
/// replaces an earlier, weaker one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Evidence {
    Boolean,
    Numeric,
    Instance,
}

/// Collects every name the compiled networks read or write, in first-use order.
///
/// Names are `BOOL` unless used in a comparison or arithmetic context
/// (`numeric_type`) or as a function block instance (the block type).
/// Qualified names and direct addresses (`%IX0.0`) are not declared.
pub fn collect_declarations(networks: &[NetworkOutcome], numeric_type: &str) -> Vec<Declaration> {
    let mut declarations: Vec<(Declaration, Evidence)> = Vec::new();
    let mut index: AHashMap<String, usize> = AHashMap::new();

    for network in networks.iter().filter_map(NetworkOutcome::compiled) {
        let mut record = |name: &str, data_type: &str, evidence: Evidence| {
            if !is_identifier(name) {
                return;
            }
            match index.get(name) {
                Some(&i) => {
                    let (declaration, strength) = &mut declarations[i];
                    if evidence > *strength {
                        declaration.data_type = data_type.to_string();
                        *strength = evidence;
                    }
                }
                None => {
                    index.insert(name.to_string(), declarations.len());
                    declarations.push((
                        Declaration {
                            name: name.to_string(),
                            data_type: data_type.to_string(),
                            address: network.addresses.get(name).cloned(),
                        },
                        evidence,
                    ));
                }
            }
        };

        for statement in &network.statements {
            statement.visit_symbols(&mut |role| match role {
                SymbolRole::Write { name, numeric: false }
                | SymbolRole::Read(SymbolUse::Boolean(name)) => {
                    record(name, "BOOL", Evidence::Boolean)
                }
                SymbolRole::Write { name, numeric: true }
                | SymbolRole::Read(SymbolUse::Numeric(name)) => {
                    record(name, numeric_type, Evidence::Numeric)
                }
                SymbolRole::Read(SymbolUse::Time(name)) => record(name, "TIME", Evidence::Numeric),
                SymbolRole::Read(SymbolUse::Instance { name, block }) => {
                    record(name, block, Evidence::Instance)
                }
            });
        }
    }

    declarations.into_iter().map(|(d, _)| d).collect()
}

/// Whether `name` can be declared as an IEC 61131-3 variable.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    starts_well
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !matches!(name.to_ascii_uppercase().as_str(), "TRUE" | "FALSE")
}
