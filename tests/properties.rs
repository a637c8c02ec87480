//! Property tests over randomly shaped series-parallel rungs.
mod common;
use common::*;
use kairo::graph;
use kairo::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Shape {
    Contact,
    Series(Vec<Shape>),
    /// Every branch starts with its own contact.
    Parallel(Vec<Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
    Just(Shape::Contact).prop_recursive(2, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Shape::Series),
            prop::collection::vec(prop::collection::vec(inner, 0..3), 2..4).prop_map(
                |branches| {
                    Shape::Parallel(
                        branches
                            .into_iter()
                            .map(|rest| {
                                let mut series = vec![Shape::Contact];
                                series.extend(rest);
                                Shape::Series(series)
                            })
                            .collect(),
                    )
                }
            ),
        ]
    })
}

/// Lays a shape out as a rung ending in coil `Y`, tracking the expression
/// the coil should receive.
struct Layout {
    network: NetworkDefinition,
    next: usize,
    parallels: usize,
}

impl Layout {
    fn build(shape: &Shape) -> (NetworkDefinition, Expression, usize) {
        let mut layout = Layout {
            network: rung(1).element(coil("Y")),
            next: 0,
            parallels: 0,
        };
        let mut terms = Vec::new();
        let last = layout.lay(shape, "L".to_string(), &mut terms);
        layout.wire(&last, "Y");
        layout.wire("Y", "R");
        (layout.network, Expression::and(terms), layout.parallels)
    }

    fn lay(&mut self, shape: &Shape, from: String, terms: &mut Vec<Expression>) -> String {
        match shape {
            Shape::Contact => {
                let id = self.contact();
                self.wire(&from, &id);
                terms.push(Expression::var(&id));
                id
            }
            Shape::Series(parts) => parts
                .iter()
                .fold(from, |last, part| self.lay(part, last, terms)),
            Shape::Parallel(branches) => {
                self.parallels += 1;
                let mut ends = Vec::new();
                let mut alternatives = Vec::new();
                for branch in branches {
                    let mut branch_terms = Vec::new();
                    ends.push(self.lay(branch, from.clone(), &mut branch_terms));
                    alternatives.push(Expression::and(branch_terms));
                }
                let join = self.contact();
                for end in ends {
                    self.wire(&end, &join);
                }
                terms.push(Expression::or(alternatives));
                terms.push(Expression::var(&join));
                join
            }
        }
    }

    fn contact(&mut self) -> String {
        self.next += 1;
        let id = format!("X{}", self.next);
        self.network.elements.push(no(&id));
        id
    }

    fn wire(&mut self, from: &str, to: &str) {
        let network = std::mem::replace(&mut self.network, NetworkDefinition::new(0, ""));
        self.network = network.wire(from, to);
    }
}

/// A random rung of contacts `X0..Xn` feeding coil `Y`. Each contact is fed
/// by the rail or by earlier contacts and feeds later contacts or the coil.
#[derive(Debug, Clone)]
struct Rung {
    /// Sources of each contact: `0` is the rail, `k` is contact `X{k-1}`.
    feeds: Vec<Vec<usize>>,
    to_coil: Vec<bool>,
    inverted: Vec<bool>,
}

fn random_rung() -> impl Strategy<Value = Rung> {
    (2usize..7)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(any::<u8>(), n),
                prop::collection::vec(any::<bool>(), n),
                prop::collection::vec(any::<bool>(), n),
            )
        })
        .prop_map(|(masks, coil_bits, inverted)| {
            let feeds: Vec<Vec<usize>> = masks
                .iter()
                .enumerate()
                .map(|(j, mask)| {
                    let chosen: Vec<usize> = (0..=j).filter(|b| (*mask >> *b) & 1 == 1).collect();
                    if chosen.is_empty() { vec![j] } else { chosen }
                })
                .collect();
            let to_coil = coil_bits
                .iter()
                .enumerate()
                .map(|(j, bit)| *bit || !feeds[j + 1..].iter().any(|f| f.contains(&(j + 1))))
                .collect();
            Rung {
                feeds,
                to_coil,
                inverted,
            }
        })
}

impl Rung {
    fn definition(&self) -> NetworkDefinition {
        let source = |k: usize| {
            if k == 0 {
                "L".to_string()
            } else {
                format!("X{}", k - 1)
            }
        };
        let mut network = rung(1).element(coil("Y"));
        for (j, inverted) in self.inverted.iter().enumerate() {
            let id = format!("X{}", j);
            network = network.element(if *inverted { nc(&id) } else { no(&id) });
        }
        for (j, feeds) in self.feeds.iter().enumerate() {
            for k in feeds {
                network = network.wire(&source(*k), &format!("X{}", j));
            }
        }
        for (j, _) in self.to_coil.iter().enumerate().filter(|(_, c)| **c) {
            network = network.wire(&format!("X{}", j), "Y");
        }
        network.wire("Y", "R")
    }

    /// Whether power reaches `Y` with contact `Xj` reading bit `j` of `inputs`.
    fn powered(&self, inputs: u32) -> bool {
        let mut conducting = Vec::with_capacity(self.feeds.len());
        for (j, feeds) in self.feeds.iter().enumerate() {
            let closed = ((inputs >> j) & 1 == 1) != self.inverted[j];
            let fed = feeds.iter().any(|k| *k == 0 || conducting[*k - 1]);
            conducting.push(closed && fed);
        }
        conducting
            .iter()
            .zip(&self.to_coil)
            .any(|(on, coil)| *on && *coil)
    }
}

fn evaluate(expression: &Expression, inputs: u32) -> bool {
    match expression {
        Expression::Literal(value) => *value,
        Expression::Variable(name) => {
            let j: u32 = name[1..].parse().expect("contact operand");
            (inputs >> j) & 1 == 1
        }
        Expression::Not(inner) => !evaluate(inner, inputs),
        Expression::And(terms) => terms.iter().all(|t| evaluate(t, inputs)),
        Expression::Or(terms) => terms.iter().any(|t| evaluate(t, inputs)),
        other => panic!("unexpected term {}", other),
    }
}

proptest! {
    #[test]
    fn prop_order_respects_every_edge(shape in shape()) {
        let (definition, _, _) = Layout::build(&shape);
        let (network, order) = analyse(&definition);
        prop_assert_eq!(order.order().len(), network.len());
        for id in order.iter() {
            for successor in network.successors(id) {
                prop_assert!(order.position(id) < order.position(*successor));
            }
        }
    }

    #[test]
    fn prop_one_group_per_parallel_block(shape in shape()) {
        let (definition, _, parallels) = Layout::build(&shape);
        let (network, order) = analyse(&definition);
        let groups = graph::detect_parallel_groups(&network, &order, 256).unwrap();
        prop_assert_eq!(groups.len(), parallels);
    }

    #[test]
    fn prop_coil_gets_the_factored_expression(shape in shape()) {
        let (definition, expected, _) = Layout::build(&shape);
        let compiled = statements(definition);
        prop_assert_eq!(compiled, vec![format!("Y := {};", expected)]);
    }

    #[test]
    fn prop_exactly_one_rail_per_side(left in 0usize..4, right in 0usize..4) {
        let mut network = NetworkDefinition::new(1, "");
        for i in 0..left {
            network = network.element(ElementDefinition::left_rail(format!("L{}", i)));
        }
        for i in 0..right {
            network = network.element(ElementDefinition::right_rail(format!("R{}", i)));
        }
        let result = graph::ingest(&network, OrphanPolicy::Warn);
        prop_assert_eq!(result.is_ok(), left == 1 && right == 1);
    }

    #[test]
    fn prop_coil_matches_the_truth_table(sample in random_rung()) {
        let program = compile(vec![sample.definition()]);
        let network = program.network(1).and_then(NetworkOutcome::compiled);
        prop_assert!(network.is_some(), "{:?}", program.errors());
        let network = network.unwrap();
        if let Some(error) = network.errors.first() {
            let unmerged = matches!(error, SemanticError::AmbiguousFanIn { .. });
            prop_assert!(unmerged, "{}", error);
            return Ok(());
        }
        let value = match &network.statements[..] {
            [Statement::Assign { target, value }] if target == "Y" => value,
            other => panic!("unexpected statements {:?}", other),
        };
        for inputs in 0..1u32 << sample.feeds.len() {
            prop_assert_eq!(
                evaluate(value, inputs),
                sample.powered(inputs),
                "inputs {:b} gave {}",
                inputs,
                value
            );
        }
    }
}
