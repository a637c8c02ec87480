use super::expression::{Expression, SymbolUse};
use itertools::Itertools;
use std::fmt;

/// One Structured Text statement produced for a target element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `target := value;`
    Assign { target: String, value: Expression },
    /// `IF condition THEN body END_IF;`
    Conditional {
        condition: Expression,
        body: Vec<Statement>,
    },
    /// `instance(ARG := value, ...);`
    Call {
        instance: String,
        block: String,
        arguments: Vec<(String, Expression)>,
    },
    Jump(String),
    Return,
    Label(String),
    Comment(String),
}

/// What a statement does with a name, see [`Statement::visit_symbols`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolRole<'a> {
    Read(SymbolUse<'a>),
    /// The name is assigned; `numeric` when the assigned value is arithmetic.
    Write { name: &'a str, numeric: bool },
}

impl Statement {
    pub fn assign(target: impl Into<String>, value: Expression) -> Self {
        Statement::Assign {
            target: target.into(),
            value,
        }
    }

    pub fn when(condition: Expression, body: Statement) -> Self {
        Statement::Conditional {
            condition,
            body: vec![body],
        }
    }

    /// Appends the rendered statement to `out`, one line per ST line.
    pub fn render(&self, indent: usize, out: &mut String) {
        let pad = " ".repeat(indent);
        match self {
            Statement::Assign { target, value } => {
                out.push_str(&format!("{pad}{target} := {value};\n"));
            }
            Statement::Conditional { condition, body } => {
                out.push_str(&format!("{pad}IF {condition} THEN\n"));
                for statement in body {
                    statement.render(indent + 4, out);
                }
                out.push_str(&format!("{pad}END_IF;\n"));
            }
            Statement::Call {
                instance,
                arguments,
                ..
            } => {
                let args = arguments
                    .iter()
                    .map(|(name, value)| format!("{name} := {value}"))
                    .join(", ");
                out.push_str(&format!("{pad}{instance}({args});\n"));
            }
            Statement::Jump(label) => out.push_str(&format!("{pad}JMP {label};\n")),
            Statement::Return => out.push_str(&format!("{pad}RETURN;\n")),
            Statement::Label(label) => out.push_str(&format!("{label}:\n")),
            Statement::Comment(text) => out.push_str(&format!("{pad}(* {text} *)\n")),
        }
    }

    /// Calls `visit` for every name the statement reads or writes, in
    /// source order.
    pub fn visit_symbols<'a>(&'a self, visit: &mut impl FnMut(SymbolRole<'a>)) {
        match self {
            Statement::Assign { target, value } => {
                visit(SymbolRole::Write {
                    name: target,
                    numeric: matches!(value, Expression::Math { .. }),
                });
                value.visit_symbols(&mut |u| visit(SymbolRole::Read(u)));
            }
            Statement::Conditional { condition, body } => {
                condition.visit_symbols(&mut |u| visit(SymbolRole::Read(u)));
                for statement in body {
                    statement.visit_symbols(visit);
                }
            }
            Statement::Call {
                instance,
                block,
                arguments,
            } => {
                visit(SymbolRole::Read(SymbolUse::Instance {
                    name: instance,
                    block,
                }));
                for (parameter, value) in arguments {
                    match (parameter.as_str(), value) {
                        ("PT", Expression::Variable(name)) => {
                            visit(SymbolRole::Read(SymbolUse::Time(name)))
                        }
                        ("PV", Expression::Variable(name)) => {
                            visit(SymbolRole::Read(SymbolUse::Numeric(name)))
                        }
                        _ => value.visit_symbols(&mut |u| visit(SymbolRole::Read(u))),
                    }
                }
            }
            Statement::Jump(_)
            | Statement::Return
            | Statement::Label(_)
            | Statement::Comment(_) => {}
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(0, &mut out);
        f.write_str(out.trim_end())
    }
}
