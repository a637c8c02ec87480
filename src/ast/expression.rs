use crate::ladder::{ArithmeticOp, CompareOp, Edge};
use std::fmt;

/// A Structured Text expression, as synthesized from power flow.
///
/// `And`/`Or` are n-ary so the rendered text keeps the rung's grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Literal(bool),
    Variable(String),
    /// Numeric or typed literal passed through verbatim (`100`, `T#5s`).
    Raw(String),
    /// Output of a function block instance, e.g. `T1.Q`.
    Member {
        instance: String,
        block: String,
        field: String,
    },
    Not(Box<Expression>),
    And(Vec<Expression>),
    Or(Vec<Expression>),
    /// Edge detection helper predicate, e.g. `R_EDGE(Start)`.
    Edge {
        edge: Edge,
        operand: Box<Expression>,
    },
    Compare {
        op: CompareOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Math {
        op: ArithmeticOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

/// How a name is used inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolUse<'a> {
    Boolean(&'a str),
    Numeric(&'a str),
    /// A duration, such as a timer preset held in a variable.
    Time(&'a str),
    Instance { name: &'a str, block: &'a str },
}

impl Expression {
    pub fn var(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Expression) -> Self {
        Expression::Not(Box::new(inner))
    }

    /// Conjunction of `terms`; no terms is a plain wire (`TRUE`).
    pub fn and(mut terms: Vec<Expression>) -> Self {
        match terms.len() {
            0 => Expression::Literal(true),
            1 => terms.remove(0),
            _ => Expression::And(terms),
        }
    }

    /// `self AND term`, extending an existing conjunction rather than nesting it.
    pub fn conjoin(self, term: Expression) -> Self {
        match self {
            Expression::And(mut terms) => {
                terms.push(term);
                Expression::And(terms)
            }
            Expression::Literal(true) => term,
            other => Expression::And(vec![other, term]),
        }
    }

    pub fn or(mut alternatives: Vec<Expression>) -> Self {
        match alternatives.len() {
            0 => Expression::Literal(false),
            1 => alternatives.remove(0),
            _ => Expression::Or(alternatives),
        }
    }

    /// Reads an operand written in an element property: a literal when it
    /// looks like one, otherwise a variable.
    pub fn operand(text: &str) -> Self {
        let text = text.trim();
        match text.to_ascii_uppercase().as_str() {
            "TRUE" => return Expression::Literal(true),
            "FALSE" => return Expression::Literal(false),
            _ => {}
        }
        let numeric = text
            .strip_prefix(['-', '+'])
            .unwrap_or(text)
            .starts_with(|c: char| c.is_ascii_digit());
        if numeric || text.contains('#') {
            Expression::Raw(text.to_string())
        } else {
            Expression::Variable(text.to_string())
        }
    }

    /// Calls `visit` for every name the expression reads, tagged with the
    /// context it is read in. Operands of comparisons and math are numeric.
    pub fn visit_symbols<'a>(&'a self, visit: &mut impl FnMut(SymbolUse<'a>)) {
        self.visit_in(false, visit);
    }

    fn visit_in<'a>(&'a self, numeric: bool, visit: &mut impl FnMut(SymbolUse<'a>)) {
        match self {
            Expression::Variable(name) if numeric => visit(SymbolUse::Numeric(name)),
            Expression::Variable(name) => visit(SymbolUse::Boolean(name)),
            Expression::Member {
                instance, block, ..
            } => visit(SymbolUse::Instance {
                name: instance,
                block,
            }),
            Expression::Not(inner) => inner.visit_in(numeric, visit),
            Expression::Edge { operand, .. } => operand.visit_in(false, visit),
            Expression::And(terms) | Expression::Or(terms) => {
                for term in terms {
                    term.visit_in(numeric, visit);
                }
            }
            Expression::Compare { left, right, .. } | Expression::Math { left, right, .. } => {
                left.visit_in(true, visit);
                right.visit_in(true, visit);
            }
            Expression::Literal(_) | Expression::Raw(_) => {}
        }
    }

    fn is_compound(&self) -> bool {
        matches!(
            self,
            Expression::And(_)
                | Expression::Or(_)
                | Expression::Compare { .. }
                | Expression::Math { .. }
        )
    }

    /// Renders the expression as an operand of a surrounding operator.
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_compound() {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(true) => write!(f, "TRUE"),
            Expression::Literal(false) => write!(f, "FALSE"),
            Expression::Variable(name) | Expression::Raw(name) => write!(f, "{}", name),
            Expression::Member {
                instance, field, ..
            } => write!(f, "{}.{}", instance, field),
            Expression::Not(inner) => {
                write!(f, "NOT ")?;
                inner.fmt_operand(f)
            }
            Expression::And(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    term.fmt_operand(f)?;
                }
                Ok(())
            }
            Expression::Or(alternatives) => {
                for (i, alternative) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, " OR ")?;
                    }
                    write!(f, "({})", alternative)?;
                }
                Ok(())
            }
            Expression::Edge { edge, operand } => {
                write!(f, "{}({})", edge.predicate(), operand)
            }
            Expression::Compare { op, left, right } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", op)?;
                right.fmt_operand(f)
            }
            Expression::Math { op, left, right } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", op)?;
                right.fmt_operand(f)
            }
        }
    }
}
