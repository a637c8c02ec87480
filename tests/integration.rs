//! Integration tests for Kairo
//!
//! End-to-end tests that load canonical program JSON, compile it and check
//! the emitted Structured Text.
//!
mod common;
use common::*;
use kairo::prelude::*;

const MOTOR_PROGRAM_JSON: &str = r#"{
  "name": "MotorControl",
  "description": "Start/stop with seal-in",
  "networks": [
    {
      "id": 1,
      "title": "Seal-in",
      "elements": [
        { "id": "L", "kind": "left_rail" },
        { "id": "start", "kind": "normally_open_contact", "variable_name": "Start", "address": "%IX0.0" },
        { "id": "seal", "kind": "normally_open_contact", "variable_name": "Motor" },
        { "id": "stop", "kind": "normally_closed_contact", "variable_name": "Stop", "address": "%IX0.1" },
        { "id": "motor", "kind": "output_coil", "variable_name": "Motor", "address": "%QX0.0" },
        { "id": "R", "kind": "right_rail" }
      ],
      "connections": [
        { "from_element": "L", "from_port": "OUT_0", "to_element": "start", "to_port": "IN" },
        { "from_element": "L", "from_port": "OUT_1", "to_element": "seal", "to_port": "IN" },
        { "from_element": "start", "from_port": "OUT", "to_element": "stop", "to_port": "IN" },
        { "from_element": "seal", "from_port": "OUT", "to_element": "stop", "to_port": "IN" },
        { "from_element": "stop", "from_port": "OUT", "to_element": "motor", "to_port": "IN" },
        { "from_element": "motor", "from_port": "OUT", "to_element": "R", "to_port": "IN_0" }
      ]
    },
    {
      "id": 2,
      "title": "Run timer",
      "elements": [
        { "id": "L", "kind": "left_rail" },
        { "id": "run", "kind": "normally_open_contact", "variable_name": "Motor" },
        { "id": "t", "kind": { "timer": "ton" }, "variable_name": "RunTimer", "properties": { "preset": "5000" } },
        { "id": "lamp", "kind": "output_coil", "variable_name": "Lamp" },
        { "id": "R", "kind": "right_rail" }
      ],
      "connections": [
        { "from_element": "L", "from_port": "OUT_0", "to_element": "run", "to_port": "IN" },
        { "from_element": "run", "from_port": "OUT", "to_element": "t", "to_port": "IN" },
        { "from_element": "t", "from_port": "OUT", "to_element": "lamp", "to_port": "IN" },
        { "from_element": "lamp", "from_port": "OUT", "to_element": "R", "to_port": "IN_0" }
      ]
    }
  ]
}"#;

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn compile_json(json: &str) -> CompiledProgram {
        let program = ProgramDefinition::from_json(json).expect("Failed to parse program");
        Compiler::builder(program)
            .with_timestamp(Timestamp::Omit)
            .build()
            .compile()
    }

    #[test]
    fn test_motor_program_end_to_end() {
        let compiled = compile_json(MOTOR_PROGRAM_JSON);
        assert!(compiled.is_success(), "errors: {:?}", compiled.errors());

        let expected = "\
(*
 * Program: MotorControl
 * Description: Start/stop with seal-in
 * Generated from Ladder Diagram
 *)

PROGRAM MotorControl
VAR
    Motor AT %QX0.0 : BOOL;
    Start AT %IX0.0 : BOOL;
    Stop AT %IX0.1 : BOOL;
    RunTimer : TON;
    Lamp : BOOL;
END_VAR

(* Network 1 - Seal-in *)
Motor := ((Start) OR (Motor)) AND NOT Stop;

(* Network 2 - Run timer *)
RunTimer(IN := Motor, PT := T#5000ms);
Lamp := RunTimer.Q;

END_PROGRAM
";
        assert_eq!(compiled.to_st(), expected);
    }

    #[test]
    fn test_groups_are_reported() {
        let compiled = compile_json(MOTOR_PROGRAM_JSON);
        let network = compiled.network(1).and_then(NetworkOutcome::compiled).unwrap();
        assert_eq!(network.groups.len(), 1);
        assert_eq!(network.groups[0].paths.len(), 2);
        assert_eq!(
            network.addresses.get("Start").map(String::as_str),
            Some("%IX0.0")
        );
    }

    #[test]
    fn test_defaults_fill_missing_program_fields() {
        let compiled = compile_json(r#"{ "networks": [] }"#);
        let text = compiled.to_st();
        assert!(text.contains(" * Program: MainProgram\n"));
        assert!(text.contains("PROGRAM MainProgram\nVAR\nEND_VAR\n"));
        assert!(text.ends_with("END_PROGRAM\n"));
    }

    #[test]
    fn test_broken_network_does_not_stop_the_rest() {
        let broken = NetworkDefinition::new(9, "No rails").element(no("A"));
        let compiled = compile(vec![broken, series_network(), cyclic_network()]);

        let outcomes: Vec<bool> = compiled
            .networks
            .iter()
            .map(|n| n.compiled().is_some())
            .collect();
        assert_eq!(outcomes, vec![false, true, false]);

        let failed: Vec<u32> = compiled.errors().iter().map(|(id, _)| *id).collect();
        assert_eq!(failed, vec![9, 5]);

        let text = compiled.to_st();
        assert!(text.contains("C := A AND NOT B;"));
        assert!(text.contains("(* Network 9 - No rails: not compiled: 2 structural issue(s)"));
        assert!(text.contains("(* Network 5 - Rung 5: not compiled: Network contains a feedback cycle"));
    }

    #[test]
    fn test_networks_keep_input_order() {
        let compiled = compile(vec![mixed_network(), series_network(), parallel_network()]);
        let ids: Vec<u32> = compiled.networks.iter().map(NetworkOutcome::id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        let text = compiled.to_st();
        let first = text.find("(* Network 3").unwrap();
        let second = text.find("(* Network 1").unwrap();
        let third = text.find("(* Network 2").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_compiling_twice_is_deterministic() {
        let first = compile_json(MOTOR_PROGRAM_JSON).to_st();
        let second = compile_json(MOTOR_PROGRAM_JSON).to_st();
        assert_eq!(first, second);
    }
}
