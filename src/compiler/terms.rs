//! Per-element lowering: the term an element adds to a power chain, the term
//! a folding element produces, and the statement a target emits.

use crate::ast::{Expression, Statement};
use crate::error::SemanticError;
use crate::graph::Node;
use crate::ladder::{BistablePriority, CounterKind, ElementKind, LogicOp};

/// Expressions driving a node's data input ports, keyed by port name.
#[derive(Debug, Default)]
pub(super) struct DataInputs {
    ports: Vec<(String, Expression)>,
}

impl DataInputs {
    pub(super) fn insert(&mut self, port: &str, expression: Expression) {
        self.ports.push((port.to_string(), expression));
    }

    fn get(&self, port: &str) -> Option<&Expression> {
        self.ports
            .iter()
            .find(|(name, _)| name == port)
            .map(|(_, expression)| expression)
    }

    /// The expression wired into `port`, or `FALSE` for an unwired input.
    fn or_false(&self, port: &str) -> Expression {
        self.get(port).cloned().unwrap_or(Expression::Literal(false))
    }
}

fn unbound(target: &str, node: &Node) -> SemanticError {
    SemanticError::UnboundOperand {
        target: target.to_string(),
        element: node.element_id.clone(),
    }
}

fn operand(node: &Node, target: &str) -> Result<String, SemanticError> {
    if node.has_operand() {
        Ok(node.operand.trim().to_string())
    } else {
        Err(unbound(target, node))
    }
}

fn property(node: &Node, key: &str, target: &str) -> Result<Expression, SemanticError> {
    node.property(key)
        .map(Expression::operand)
        .ok_or_else(|| unbound(target, node))
}

/// The AND term a series element contributes to the chain passing through it.
pub(super) fn series_term(
    node: &Node,
    data: &DataInputs,
    target: &str,
) -> Result<Expression, SemanticError> {
    match node.kind {
        ElementKind::NormallyOpenContact => Ok(Expression::var(operand(node, target)?)),
        ElementKind::NormallyClosedContact => {
            Ok(Expression::not(Expression::var(operand(node, target)?)))
        }
        ElementKind::EdgeContact(edge) => Ok(Expression::Edge {
            edge,
            operand: Box::new(Expression::var(operand(node, target)?)),
        }),
        ElementKind::Comparison(op) => {
            let left = match node.property("left") {
                Some(text) => Expression::operand(text),
                None => Expression::var(operand(node, target)?),
            };
            Ok(Expression::Compare {
                op,
                left: Box::new(left),
                right: Box::new(property(node, "right", target)?),
            })
        }
        ElementKind::LogicGate(LogicOp::And) => second_input(node, data, target),
        _ => Ok(Expression::Literal(true)),
    }
}

/// The single term a folding element produces from its whole power input.
pub(super) fn fold_term(
    node: &Node,
    input: Expression,
    data: &DataInputs,
    target: &str,
) -> Result<Expression, SemanticError> {
    match node.kind {
        ElementKind::LogicGate(LogicOp::Not) => Ok(Expression::not(input)),
        ElementKind::LogicGate(LogicOp::Or) => Ok(Expression::Or(vec![
            input,
            second_input(node, data, target)?,
        ])),
        kind => match (kind.function_block(), kind.function_block_output()) {
            (Some(block), Some(field)) => Ok(Expression::Member {
                instance: operand(node, target)?,
                block: block.to_string(),
                field: field.to_string(),
            }),
            _ => Ok(input),
        },
    }
}

/// A gate's `IN2`: the wired data input, else the element's own operand.
fn second_input(node: &Node, data: &DataInputs, target: &str) -> Result<Expression, SemanticError> {
    match data.get("IN2") {
        Some(expression) => Ok(expression.clone()),
        None => Ok(Expression::var(operand(node, target)?)),
    }
}

fn timer_preset(node: &Node) -> Expression {
    let preset = node.property("preset").unwrap_or("100").trim();
    if preset.chars().all(|c| c.is_ascii_digit()) {
        Expression::Raw(format!("T#{}ms", preset))
    } else {
        Expression::operand(preset)
    }
}

fn counter_preset(node: &Node) -> Expression {
    Expression::operand(node.property("preset").unwrap_or("10"))
}

/// The statement a target element emits, given the power arriving at it.
pub(super) fn target_statement(
    node: &Node,
    input: Expression,
    data: &DataInputs,
    target: &str,
) -> Result<Statement, SemanticError> {
    let call = |arguments: Vec<(&str, Expression)>| -> Result<Statement, SemanticError> {
        Ok(Statement::Call {
            instance: operand(node, target)?,
            block: node.kind.function_block().unwrap_or_default().to_string(),
            arguments: arguments
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        })
    };

    match node.kind {
        ElementKind::OutputCoil => Ok(Statement::assign(operand(node, target)?, input)),
        ElementKind::InvertedCoil => Ok(Statement::assign(
            operand(node, target)?,
            Expression::not(input),
        )),
        ElementKind::SetCoil => Ok(Statement::when(
            input,
            Statement::assign(operand(node, target)?, Expression::Literal(true)),
        )),
        ElementKind::ResetCoil => Ok(Statement::when(
            input,
            Statement::assign(operand(node, target)?, Expression::Literal(false)),
        )),
        ElementKind::EdgeCoil(edge) => Ok(Statement::assign(
            operand(node, target)?,
            Expression::Edge {
                edge,
                operand: Box::new(input),
            },
        )),
        ElementKind::Timer(kind) => {
            let enable = match data.get("RESET") {
                Some(reset) => input.conjoin(Expression::not(reset.clone())),
                None => input,
            };
            log::trace!("lowering {:?} timer '{}'", kind, node.element_id);
            call(vec![("IN", enable), ("PT", timer_preset(node))])
        }
        ElementKind::Counter(CounterKind::Up) => call(vec![
            ("CU", input),
            ("RESET", data.or_false("RESET")),
            ("PV", counter_preset(node)),
        ]),
        ElementKind::Counter(CounterKind::Down) => call(vec![
            ("CD", input),
            ("LOAD", data.or_false("RESET")),
            ("PV", counter_preset(node)),
        ]),
        ElementKind::Counter(CounterKind::UpDown) => call(vec![
            ("CU", input),
            ("CD", data.or_false("CD")),
            ("RESET", data.or_false("RESET")),
            ("LOAD", Expression::Literal(false)),
            ("PV", counter_preset(node)),
        ]),
        ElementKind::Trigger(_) => call(vec![("CLK", input)]),
        ElementKind::Bistable(BistablePriority::SetPriority) => {
            call(vec![("S1", input), ("R", data.or_false("R"))])
        }
        ElementKind::Bistable(BistablePriority::ResetPriority) => {
            call(vec![("S", input), ("R1", data.or_false("R"))])
        }
        ElementKind::MathOp(op) => Ok(Statement::when(
            input,
            Statement::assign(
                operand(node, target)?,
                Expression::Math {
                    op,
                    left: Box::new(property(node, "left", target)?),
                    right: Box::new(property(node, "right", target)?),
                },
            ),
        )),
        ElementKind::Jump => {
            let label = match node.property("target_label") {
                Some(label) => label.trim().to_string(),
                None => operand(node, target)?,
            };
            Ok(Statement::when(input, Statement::Jump(label)))
        }
        ElementKind::Return => Ok(Statement::when(input, Statement::Return)),
        ElementKind::Label => Ok(Statement::Label(operand(node, target)?)),
        ElementKind::LeftRail
        | ElementKind::RightRail
        | ElementKind::NormallyOpenContact
        | ElementKind::NormallyClosedContact
        | ElementKind::EdgeContact(_)
        | ElementKind::LogicGate(_)
        | ElementKind::Comparison(_) => Ok(Statement::Comment(format!(
            "{} '{}' is not a target",
            node.kind, node.element_id
        ))),
    }
}

