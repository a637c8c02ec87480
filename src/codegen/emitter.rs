use super::declarations::Declaration;
use crate::ast::Statement;
use crate::compiler::{CompiledProgram, NetworkOutcome};

/// Renders a whole program organisation unit.
pub fn emit_program(program: &CompiledProgram) -> String {
    let mut out = String::new();
    out.push_str("(*\n");
    out.push_str(&format!(" * Program: {}\n", comment_safe(&program.name)));
    out.push_str(&format!(
        " * Description: {}\n",
        comment_safe(&program.description)
    ));
    out.push_str(" * Generated from Ladder Diagram\n");
    if let Some(date) = &program.generated_at {
        out.push_str(&format!(" * Date: {}\n", comment_safe(date)));
    }
    out.push_str(" *)\n\n");

    out.push_str(&format!("PROGRAM {}\n", program.name));
    out.push_str(&emit_declarations(&program.declarations));
    for network in &program.networks {
        out.push('\n');
        out.push_str(&emit_network(network));
    }
    out.push_str("\nEND_PROGRAM\n");
    out
}

pub fn emit_declarations(declarations: &[Declaration]) -> String {
    let mut out = String::from("VAR\n");
    for declaration in declarations {
        match &declaration.address {
            Some(address) => out.push_str(&format!(
                "    {} AT {} : {};\n",
                declaration.name, address, declaration.data_type
            )),
            None => out.push_str(&format!(
                "    {} : {};\n",
                declaration.name, declaration.data_type
            )),
        }
    }
    out.push_str("END_VAR\n");
    out
}

/// Renders one network block: its heading comment, then its statements.
/// A failed network renders as a single comment line.
pub fn emit_network(outcome: &NetworkOutcome) -> String {
    let heading = heading(outcome.id(), outcome.title());
    let mut out = String::new();
    match outcome {
        NetworkOutcome::Failed { error, .. } => {
            Statement::Comment(format!(
                "{}: not compiled: {}",
                heading,
                comment_safe(&error.to_string())
            ))
            .render(0, &mut out);
        }
        NetworkOutcome::Compiled(network) => {
            Statement::Comment(heading).render(0, &mut out);
            for statement in &network.statements {
                statement.render(0, &mut out);
            }
            for error in &network.errors {
                Statement::Comment(format!("Error: {}", comment_safe(&error.to_string())))
                    .render(0, &mut out);
            }
        }
    }
    out
}

fn heading(id: u32, title: &str) -> String {
    let title = comment_safe(title.trim());
    if title.is_empty() {
        format!("Network {}", id)
    } else {
        format!("Network {} - {}", id, title)
    }
}

/// Keeps user text from closing the surrounding comment early.
fn comment_safe(text: &str) -> String {
    text.replace("*)", "* )").replace("(*", "( *")
}
