use super::definition::PortDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a connection port on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
    PowerIn,
    PowerOut,
    DataIn,
}

impl PortDirection {
    /// Whether a connection may run from a port of this direction into `target`.
    pub fn can_feed(self, target: PortDirection) -> bool {
        matches!(
            (self, target),
            (PortDirection::PowerOut, PortDirection::PowerIn)
                | (PortDirection::PowerOut, PortDirection::DataIn)
        )
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::PowerIn => write!(f, "power-in"),
            PortDirection::PowerOut => write!(f, "power-out"),
            PortDirection::DataIn => write!(f, "data-in"),
        }
    }
}

/// Master macro for the operator enums: variant, ST symbol and serialized alias.
macro_rules! define_operators {
    ( $( $(#[$meta:meta])* $name:ident { $( ($variant:ident, $symbol:literal, $alias:literal) ),* $(,)? } )* ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
            pub enum $name {
                $( #[serde(rename = $alias)] $variant, )*
            }

            impl $name {
                /// The literal ST operator text.
                pub fn symbol(self) -> &'static str {
                    match self {
                        $( $name::$variant => $symbol, )*
                    }
                }

                /// Parses either the ST symbol or the short alias.
                pub fn from_symbol(text: &str) -> Option<Self> {
                    match text.trim() {
                        $( $symbol | $alias => Some($name::$variant), )*
                        _ => None,
                    }
                }

                /// Maps the editor's ordinal encoding onto an operator.
                pub fn from_ordinal(index: i64) -> Option<Self> {
                    [$( $name::$variant ),*].get(usize::try_from(index).ok()?).copied()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.symbol())
                }
            }
        )*
    };
}

define_operators! {
    /// Comparison operators, ordered as the editor stores them.
    CompareOp {
        (Eq, "=", "eq"),
        (Ne, "<>", "ne"),
        (Gt, ">", "gt"),
        (Ge, ">=", "ge"),
        (Lt, "<", "lt"),
        (Le, "<=", "le"),
    }

    /// Arithmetic operators, ordered as the editor stores them.
    ArithmeticOp {
        (Add, "+", "add"),
        (Sub, "-", "sub"),
        (Mul, "*", "mul"),
        (Div, "/", "div"),
    }
}

/// Signal transition sensed by edge contacts, edge coils and triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    #[serde(rename = "rising", alias = "r")]
    Rising,
    #[serde(rename = "falling", alias = "f")]
    Falling,
}

impl Edge {
    /// Name of the helper predicate used for this edge in ST output.
    pub fn predicate(self) -> &'static str {
        match self {
            Edge::Rising => "R_EDGE",
            Edge::Falling => "F_EDGE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Ton,
    Tof,
    Tp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    Up,
    Down,
    #[serde(alias = "up_down")]
    UpDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BistablePriority {
    SetPriority,
    ResetPriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicOp {
    And,
    Or,
    Not,
}

/// Every kind of ladder element the compiler understands.
///
/// All behaviour the compiler needs from an element is a total match over
/// this enum, so adding a kind forces every stage to decide how to treat it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    LeftRail,
    RightRail,
    NormallyOpenContact,
    NormallyClosedContact,
    EdgeContact(Edge),
    OutputCoil,
    InvertedCoil,
    SetCoil,
    ResetCoil,
    EdgeCoil(Edge),
    Timer(TimerKind),
    Counter(CounterKind),
    Trigger(Edge),
    Bistable(BistablePriority),
    LogicGate(LogicOp),
    Comparison(CompareOp),
    MathOp(ArithmeticOp),
    Jump,
    Return,
    Label,
}

/// How power passing through an element is transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerRole {
    /// Rails: the fixed source and sink.
    Rail,
    /// Adds one AND term to the incoming chain (contacts, comparisons, AND gates).
    Series,
    /// Passes power through unchanged (coils, math, jumps).
    Transparent,
    /// Replaces the incoming chain with a single derived term
    /// (NOT/OR gates, function block outputs).
    Fold,
}

impl ElementKind {
    pub fn is_rail(&self) -> bool {
        matches!(self, ElementKind::LeftRail | ElementKind::RightRail)
    }

    pub fn power_role(&self) -> PowerRole {
        match self {
            ElementKind::LeftRail | ElementKind::RightRail => PowerRole::Rail,
            ElementKind::NormallyOpenContact
            | ElementKind::NormallyClosedContact
            | ElementKind::EdgeContact(_)
            | ElementKind::Comparison(_)
            | ElementKind::LogicGate(LogicOp::And) => PowerRole::Series,
            ElementKind::OutputCoil
            | ElementKind::InvertedCoil
            | ElementKind::SetCoil
            | ElementKind::ResetCoil
            | ElementKind::EdgeCoil(_)
            | ElementKind::MathOp(_)
            | ElementKind::Jump
            | ElementKind::Return
            | ElementKind::Label => PowerRole::Transparent,
            ElementKind::Timer(_)
            | ElementKind::Counter(_)
            | ElementKind::Trigger(_)
            | ElementKind::Bistable(_)
            | ElementKind::LogicGate(LogicOp::Or)
            | ElementKind::LogicGate(LogicOp::Not) => PowerRole::Fold,
        }
    }

    /// Elements that end a power-flow path (nothing downstream is required).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ElementKind::OutputCoil
                | ElementKind::InvertedCoil
                | ElementKind::SetCoil
                | ElementKind::ResetCoil
                | ElementKind::EdgeCoil(_)
                | ElementKind::Jump
                | ElementKind::Return
        )
    }

    /// Elements that produce a statement in the generated program.
    pub fn is_target(&self) -> bool {
        match self {
            ElementKind::OutputCoil
            | ElementKind::InvertedCoil
            | ElementKind::SetCoil
            | ElementKind::ResetCoil
            | ElementKind::EdgeCoil(_)
            | ElementKind::Timer(_)
            | ElementKind::Counter(_)
            | ElementKind::Trigger(_)
            | ElementKind::Bistable(_)
            | ElementKind::MathOp(_)
            | ElementKind::Jump
            | ElementKind::Return
            | ElementKind::Label => true,
            ElementKind::LeftRail
            | ElementKind::RightRail
            | ElementKind::NormallyOpenContact
            | ElementKind::NormallyClosedContact
            | ElementKind::EdgeContact(_)
            | ElementKind::LogicGate(_)
            | ElementKind::Comparison(_) => false,
        }
    }

    /// Number of inputs the element consumes: power input plus data inputs.
    pub fn input_arity(&self) -> usize {
        match self {
            ElementKind::LeftRail | ElementKind::Label => 0,
            ElementKind::LogicGate(LogicOp::And | LogicOp::Or)
            | ElementKind::MathOp(_)
            | ElementKind::Bistable(_)
            | ElementKind::Timer(_) => 2,
            ElementKind::Counter(CounterKind::UpDown) => 3,
            ElementKind::Counter(_) => 2,
            _ => 1,
        }
    }

    /// The ST operator text this element maps to, if it is an operator.
    pub fn st_operator(&self) -> Option<&'static str> {
        match self {
            ElementKind::LogicGate(LogicOp::And) => Some("AND"),
            ElementKind::LogicGate(LogicOp::Or) => Some("OR"),
            ElementKind::LogicGate(LogicOp::Not) | ElementKind::NormallyClosedContact => {
                Some("NOT")
            }
            ElementKind::Comparison(op) => Some(op.symbol()),
            ElementKind::MathOp(op) => Some(op.symbol()),
            _ => None,
        }
    }

    /// The IEC 61131-3 function block type instantiated by this element.
    pub fn function_block(&self) -> Option<&'static str> {
        match self {
            ElementKind::Timer(TimerKind::Ton) => Some("TON"),
            ElementKind::Timer(TimerKind::Tof) => Some("TOF"),
            ElementKind::Timer(TimerKind::Tp) => Some("TP"),
            ElementKind::Counter(CounterKind::Up) => Some("CTU"),
            ElementKind::Counter(CounterKind::Down) => Some("CTD"),
            ElementKind::Counter(CounterKind::UpDown) => Some("CTUD"),
            ElementKind::Trigger(Edge::Rising) => Some("R_TRIG"),
            ElementKind::Trigger(Edge::Falling) => Some("F_TRIG"),
            ElementKind::Bistable(BistablePriority::SetPriority) => Some("SR"),
            ElementKind::Bistable(BistablePriority::ResetPriority) => Some("RS"),
            _ => None,
        }
    }

    /// Output member read downstream of a function block.
    pub fn function_block_output(&self) -> Option<&'static str> {
        match self {
            ElementKind::Timer(_) | ElementKind::Trigger(_) => Some("Q"),
            ElementKind::Counter(CounterKind::UpDown) => Some("QU"),
            ElementKind::Counter(_) => Some("Q"),
            ElementKind::Bistable(_) => Some("Q1"),
            _ => None,
        }
    }

    /// Whether the element reads or writes a symbolic operand that must be named.
    pub fn needs_operand(&self) -> bool {
        match self {
            ElementKind::LeftRail
            | ElementKind::RightRail
            | ElementKind::LogicGate(_)
            | ElementKind::Comparison(_)
            | ElementKind::Return => false,
            ElementKind::NormallyOpenContact
            | ElementKind::NormallyClosedContact
            | ElementKind::EdgeContact(_)
            | ElementKind::OutputCoil
            | ElementKind::InvertedCoil
            | ElementKind::SetCoil
            | ElementKind::ResetCoil
            | ElementKind::EdgeCoil(_)
            | ElementKind::Timer(_)
            | ElementKind::Counter(_)
            | ElementKind::Trigger(_)
            | ElementKind::Bistable(_)
            | ElementKind::MathOp(_)
            | ElementKind::Jump
            | ElementKind::Label => true,
        }
    }

    /// The port layout the editor gives an element of this kind.
    pub fn default_ports(&self) -> Vec<PortDefinition> {
        use PortDirection::*;
        let layout: &[(&str, PortDirection)] = match self {
            ElementKind::LeftRail => {
                return (0..9)
                    .map(|i| PortDefinition::new(format!("OUT_{}", i), PowerOut))
                    .collect();
            }
            ElementKind::RightRail => {
                return (0..9)
                    .map(|i| PortDefinition::new(format!("IN_{}", i), PowerIn))
                    .collect();
            }
            ElementKind::NormallyOpenContact
            | ElementKind::NormallyClosedContact
            | ElementKind::EdgeContact(_)
            | ElementKind::OutputCoil
            | ElementKind::InvertedCoil
            | ElementKind::SetCoil
            | ElementKind::ResetCoil
            | ElementKind::EdgeCoil(_)
            | ElementKind::LogicGate(LogicOp::Not)
            | ElementKind::Comparison(_) => &[("IN", PowerIn), ("OUT", PowerOut)],
            ElementKind::Timer(_) => &[("IN", PowerIn), ("OUT", PowerOut), ("RESET", DataIn)],
            ElementKind::Counter(_) => &[
                ("CU", PowerIn),
                ("CD", DataIn),
                ("RESET", DataIn),
                ("OUT", PowerOut),
            ],
            ElementKind::Trigger(_) => &[("CLK", PowerIn), ("Q", PowerOut)],
            ElementKind::Bistable(_) => &[("S", PowerIn), ("R", DataIn), ("Q", PowerOut)],
            ElementKind::LogicGate(_) | ElementKind::MathOp(_) => {
                &[("IN1", PowerIn), ("IN2", DataIn), ("OUT", PowerOut)]
            }
            ElementKind::Jump | ElementKind::Return => &[("IN", PowerIn)],
            ElementKind::Label => &[],
        };
        layout
            .iter()
            .map(|(name, direction)| PortDefinition::new(*name, *direction))
            .collect()
    }

    /// Maps the editor's element type names onto kinds.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let kind = match name {
            "LeftPowerRail" | "LeftRail" => ElementKind::LeftRail,
            "RightPowerRail" | "RightRail" => ElementKind::RightRail,
            "NormallyOpen" => ElementKind::NormallyOpenContact,
            "NormallyClosed" => ElementKind::NormallyClosedContact,
            "PositiveEdge" => ElementKind::EdgeContact(Edge::Rising),
            "NegativeEdge" => ElementKind::EdgeContact(Edge::Falling),
            "ComparisonContact" | "Comparison" => ElementKind::Comparison(CompareOp::Eq),
            "OutputCoil" => ElementKind::OutputCoil,
            "InvertedCoil" => ElementKind::InvertedCoil,
            "SetCoil" => ElementKind::SetCoil,
            "ResetCoil" => ElementKind::ResetCoil,
            "PositiveEdgeCoil" => ElementKind::EdgeCoil(Edge::Rising),
            "NegativeEdgeCoil" => ElementKind::EdgeCoil(Edge::Falling),
            "Timer" | "TimerTON" => ElementKind::Timer(TimerKind::Ton),
            "TimerTOF" => ElementKind::Timer(TimerKind::Tof),
            "TimerTP" => ElementKind::Timer(TimerKind::Tp),
            "Counter" | "CounterCTU" => ElementKind::Counter(CounterKind::Up),
            "CounterCTD" => ElementKind::Counter(CounterKind::Down),
            "CounterCTUD" => ElementKind::Counter(CounterKind::UpDown),
            "RTrig" => ElementKind::Trigger(Edge::Rising),
            "FTrig" => ElementKind::Trigger(Edge::Falling),
            "SR" => ElementKind::Bistable(BistablePriority::SetPriority),
            "RS" => ElementKind::Bistable(BistablePriority::ResetPriority),
            "MathOperation" => ElementKind::MathOp(ArithmeticOp::Add),
            "LogicAND" => ElementKind::LogicGate(LogicOp::And),
            "LogicOR" => ElementKind::LogicGate(LogicOp::Or),
            "LogicNOT" => ElementKind::LogicGate(LogicOp::Not),
            "Jump" => ElementKind::Jump,
            "Return" => ElementKind::Return,
            "Label" => ElementKind::Label,
            _ => return None,
        };
        Some(kind)
    }

    /// Maps the editor's numeric `ElementType` encoding onto kinds.
    /// Ordinal 0 (unknown) and 32 (connection line) have no kind.
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        const NAMES: [&str; 31] = [
            "LeftPowerRail",
            "RightPowerRail",
            "NormallyOpen",
            "NormallyClosed",
            "PositiveEdge",
            "NegativeEdge",
            "ComparisonContact",
            "OutputCoil",
            "InvertedCoil",
            "SetCoil",
            "ResetCoil",
            "PositiveEdgeCoil",
            "NegativeEdgeCoil",
            "Timer",
            "TimerTOF",
            "TimerTP",
            "Counter",
            "CounterCTD",
            "CounterCTUD",
            "RTrig",
            "FTrig",
            "RS",
            "SR",
            "Comparison",
            "MathOperation",
            "LogicAND",
            "LogicOR",
            "LogicNOT",
            "Jump",
            "Return",
            "Label",
        ];
        let index = usize::try_from(ordinal.checked_sub(1)?).ok()?;
        NAMES.get(index).and_then(|name| Self::from_type_name(name))
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::LeftRail => write!(f, "left rail"),
            ElementKind::RightRail => write!(f, "right rail"),
            ElementKind::NormallyOpenContact => write!(f, "normally open contact"),
            ElementKind::NormallyClosedContact => write!(f, "normally closed contact"),
            ElementKind::EdgeContact(edge) => write!(f, "{:?} edge contact", edge),
            ElementKind::OutputCoil => write!(f, "output coil"),
            ElementKind::InvertedCoil => write!(f, "inverted coil"),
            ElementKind::SetCoil => write!(f, "set coil"),
            ElementKind::ResetCoil => write!(f, "reset coil"),
            ElementKind::EdgeCoil(edge) => write!(f, "{:?} edge coil", edge),
            ElementKind::LogicGate(op) => write!(f, "{:?} gate", op),
            ElementKind::Comparison(op) => write!(f, "comparison ({})", op),
            ElementKind::MathOp(op) => write!(f, "math operation ({})", op),
            ElementKind::Jump => write!(f, "jump"),
            ElementKind::Return => write!(f, "return"),
            ElementKind::Label => write!(f, "label"),
            ElementKind::Timer(_)
            | ElementKind::Counter(_)
            | ElementKind::Trigger(_)
            | ElementKind::Bistable(_) => {
                write!(f, "{} block", self.function_block().unwrap_or("function"))
            }
        }
    }
}
