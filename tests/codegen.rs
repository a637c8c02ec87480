//! Code generation tests
//!
//! Expression and statement rendering, `VAR` declarations and the program
//! layout.
//!
mod common;
use common::*;
use kairo::codegen::{self, Declaration};
use kairo::ladder::{ArithmeticOp, CompareOp, Edge, TimerKind};
use kairo::prelude::*;

#[cfg(test)]
mod expression_tests {
    use super::*;

    #[test]
    fn test_and_of_nothing_is_true() {
        assert_eq!(Expression::and(vec![]), Expression::Literal(true));
        assert_eq!(Expression::or(vec![]), Expression::Literal(false));
        assert_eq!(Expression::and(vec![Expression::var("A")]), Expression::var("A"));
    }

    #[test]
    fn test_conjoin_extends_flat() {
        let chain = Expression::Literal(true)
            .conjoin(Expression::var("A"))
            .conjoin(Expression::var("B"))
            .conjoin(Expression::var("C"));
        assert_eq!(chain.to_string(), "A AND B AND C");
    }

    #[test]
    fn test_or_alternatives_are_parenthesised() {
        let or = Expression::or(vec![
            Expression::var("A"),
            Expression::and(vec![Expression::var("B"), Expression::not(Expression::var("C"))]),
        ]);
        assert_eq!(or.to_string(), "(A) OR (B AND NOT C)");
        let nested = Expression::and(vec![Expression::var("X"), or]);
        assert_eq!(nested.to_string(), "X AND ((A) OR (B AND NOT C))");
    }

    #[test]
    fn test_not_of_compound_is_parenthesised() {
        let not = Expression::not(Expression::and(vec![
            Expression::var("A"),
            Expression::var("B"),
        ]));
        assert_eq!(not.to_string(), "NOT (A AND B)");
    }

    #[test]
    fn test_compare_and_math() {
        let compare = Expression::Compare {
            op: CompareOp::Ne,
            left: Box::new(Expression::Math {
                op: ArithmeticOp::Mul,
                left: Box::new(Expression::var("Speed")),
                right: Box::new(Expression::operand("2")),
            }),
            right: Box::new(Expression::operand("Max")),
        };
        assert_eq!(compare.to_string(), "(Speed * 2) <> Max");
    }

    #[test]
    fn test_operand_literals() {
        assert_eq!(Expression::operand(" true "), Expression::Literal(true));
        assert_eq!(Expression::operand("FALSE"), Expression::Literal(false));
        assert_eq!(Expression::operand("-5"), Expression::Raw("-5".to_string()));
        assert_eq!(Expression::operand("T#2s"), Expression::Raw("T#2s".to_string()));
        assert_eq!(Expression::operand("Level"), Expression::var("Level"));
    }

    #[test]
    fn test_edge_predicates() {
        let rising = Expression::Edge {
            edge: Edge::Rising,
            operand: Box::new(Expression::var("A")),
        };
        assert_eq!(rising.to_string(), "R_EDGE(A)");
    }
}

#[cfg(test)]
mod statement_tests {
    use super::*;

    #[test]
    fn test_nested_conditional_indents() {
        let statement = Statement::when(
            Expression::var("A"),
            Statement::when(Expression::var("B"), Statement::Return),
        );
        let mut out = String::new();
        statement.render(4, &mut out);
        assert_eq!(
            out,
            "    IF A THEN\n        IF B THEN\n            RETURN;\n        END_IF;\n    END_IF;\n"
        );
    }

    #[test]
    fn test_label_is_never_indented() {
        let mut out = String::new();
        Statement::Label("Done".to_string()).render(8, &mut out);
        assert_eq!(out, "Done:\n");
    }
}

#[cfg(test)]
mod declaration_tests {
    use super::*;

    fn declarations(networks: Vec<NetworkDefinition>) -> Vec<Declaration> {
        compile(networks).declarations
    }

    fn declared(declarations: &[Declaration], name: &str) -> String {
        declarations
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.data_type.clone())
            .unwrap_or_else(|| panic!("'{}' not declared", name))
    }

    #[test]
    fn test_names_in_first_use_order() {
        let names: Vec<String> = declarations(vec![mixed_network()])
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["E", "A", "B", "C", "D"]);
    }

    #[test]
    fn test_shared_names_are_declared_once() {
        let found = declarations(vec![series_network(), parallel_network()]);
        let names: Vec<&str> = found.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        assert!(found.iter().all(|d| d.data_type == "BOOL"));
    }

    #[test]
    fn test_types_follow_usage() {
        let network = rung(1)
            .element(
                ElementDefinition::new("cmp", ElementKind::Comparison(CompareOp::Gt), "Level")
                    .with_property("right", "Limit"),
            )
            .element(
                ElementDefinition::new("T", ElementKind::Timer(TimerKind::Tof), "Hold")
                    .with_property("preset", "Delay"),
            )
            .element(coil("Alarm"))
            .wire("L", "cmp")
            .wire("cmp", "T")
            .wire("T", "Alarm")
            .wire("Alarm", "R");
        let found = declarations(vec![network]);
        assert_eq!(declared(&found, "Level"), "INT");
        assert_eq!(declared(&found, "Limit"), "INT");
        assert_eq!(declared(&found, "Hold"), "TOF");
        assert_eq!(declared(&found, "Delay"), "TIME");
        assert_eq!(declared(&found, "Alarm"), "BOOL");
    }

    #[test]
    fn test_numeric_type_is_configurable() {
        let network = rung(1)
            .element(
                ElementDefinition::new("cmp", ElementKind::Comparison(CompareOp::Lt), "Temp")
                    .with_property("right", "40"),
            )
            .element(coil("Fan"))
            .wire("L", "cmp")
            .wire("cmp", "Fan")
            .wire("Fan", "R");
        let compiled = Compiler::builder(ProgramDefinition::new("P").with_network(network))
            .with_numeric_type("REAL")
            .with_timestamp(Timestamp::Omit)
            .build()
            .compile();
        assert_eq!(declared(&compiled.declarations, "Temp"), "REAL");
    }

    #[test]
    fn test_addresses_become_at_clauses() {
        let network = rung(1)
            .element(no("Start").with_address("%IX0.0"))
            .element(coil("Motor").with_address("%QX0.0"))
            .wire("L", "Start")
            .wire("Start", "Motor")
            .wire("Motor", "R");
        let text = codegen::emit_declarations(&declarations(vec![network]));
        assert_eq!(
            text,
            "VAR\n    Motor AT %QX0.0 : BOOL;\n    Start AT %IX0.0 : BOOL;\nEND_VAR\n"
        );
    }

    #[test]
    fn test_identifiers() {
        assert!(codegen::is_identifier("Motor_1"));
        assert!(codegen::is_identifier("_tmp"));
        assert!(!codegen::is_identifier("1st"));
        assert!(!codegen::is_identifier("T1.Q"));
        assert!(!codegen::is_identifier("%IX0.0"));
        assert!(!codegen::is_identifier("TRUE"));
    }
}

#[cfg(test)]
mod emitter_tests {
    use super::*;

    #[test]
    fn test_program_layout() {
        let program = ProgramDefinition::new("Conveyor")
            .with_description("Belt control")
            .with_network(series_network());
        let compiled = Compiler::builder(program)
            .with_timestamp(Timestamp::Fixed("2024-01-01 00:00:00".to_string()))
            .build()
            .compile();
        let expected = "\
(*
 * Program: Conveyor
 * Description: Belt control
 * Generated from Ladder Diagram
 * Date: 2024-01-01 00:00:00
 *)

PROGRAM Conveyor
VAR
    C : BOOL;
    A : BOOL;
    B : BOOL;
END_VAR

(* Network 1 - Rung 1 *)
C := A AND NOT B;

END_PROGRAM
";
        assert_eq!(compiled.to_st(), expected);
    }

    #[test]
    fn test_untitled_network_heading() {
        let mut network = series_network();
        network.title = String::new();
        let text = compile(vec![network]).to_st();
        assert!(text.contains("(* Network 1 *)\n"));
        assert!(!text.contains("Date:"));
    }

    #[test]
    fn test_failed_network_is_a_single_comment() {
        let compiled = compile(vec![cyclic_network()]);
        let text = codegen::emit_network(&compiled.networks[0]);
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("(* Network 5 - Rung 5: not compiled: Network contains a feedback cycle"));
        assert!(text.ends_with(" *)\n"));
        assert!(compiled.declarations.is_empty());
    }

    #[test]
    fn test_target_errors_follow_the_statements() {
        let network = rung(1)
            .element(ElementDefinition::new("blank", ElementKind::NormallyOpenContact, ""))
            .element(coil("Y"))
            .wire("L", "blank")
            .wire("blank", "Y")
            .wire("Y", "R");
        let compiled = compile(vec![network]);
        let text = codegen::emit_network(&compiled.networks[0]);
        assert_eq!(
            text,
            "(* Network 1 - Rung 1 *)\n(* Error: Target 'Y' depends on element 'blank', which has no operand *)\n"
        );
    }

    #[test]
    fn test_comment_text_cannot_close_the_comment() {
        let mut network = series_network();
        network.title = "tricky *) title".to_string();
        let text = compile(vec![network]).to_st();
        assert!(text.contains("(* Network 1 - tricky * ) title *)"));
    }
}
