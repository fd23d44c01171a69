use crowd_graph::{
    compile, CompileError, DataType, Graph, GraphKind, InputOp, InputSource, MathOp, NodeId,
    NodeKind, OutputChannel, StepOp,
};
use proptest::prelude::*;

fn constant_brain(value: f32) -> Graph {
    let mut g = Graph::brain("simpleSim");
    let input = g.add_node(NodeKind::Input).unwrap();
    g.set_param(input, "InputSource", "CONSTANT").unwrap();
    g.set_param(input, "Constant", value).unwrap();
    let output = g.add_node(NodeKind::Output).unwrap();
    g.set_param(output, "Output", "PY").unwrap();
    g.connect(input, 0, output, 0).unwrap();
    g
}

#[test]
fn constant_brain_compiles_to_two_steps() {
    let plan = compile(&constant_brain(0.1)).unwrap();

    assert_eq!(plan.kind(), GraphKind::Brain);
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.step(0).op, StepOp::Input(InputOp::Constant(0.1)));
    assert_eq!(plan.step(1).op, StepOp::Output(OutputChannel::Py));
    assert_eq!(
        plan.step(1).inputs,
        vec![InputSource::Step { step: 0, output: 0 }]
    );
    assert_eq!(plan.sinks(), &[1]);
    assert!(plan.stateful_steps().is_empty());
}

#[test]
fn ties_break_by_creation_order_and_recompile_is_stable() {
    let mut g = Graph::brain("brain");
    // Created out of dependency order on purpose.
    let out = g.add_node(NodeKind::Output).unwrap();
    let math = g.add_node(NodeKind::Math).unwrap();
    let b = g.add_node(NodeKind::Input).unwrap();
    let a = g.add_node(NodeKind::Input).unwrap();
    g.connect(a, 0, math, 0).unwrap();
    g.connect(b, 0, math, 1).unwrap();
    g.connect(math, 0, out, 0).unwrap();

    let plan = compile(&g).unwrap();
    assert_eq!(plan.order(), vec![b, a, math, out]);
    assert_eq!(compile(&g).unwrap(), plan);
}

#[test]
fn unlinked_inputs_fall_back_to_socket_defaults() {
    let mut g = Graph::brain("brain");
    let math = g.add_node(NodeKind::Math).unwrap();
    g.set_param(math, "Operation", "mul").unwrap();
    let out = g.add_node(NodeKind::Output).unwrap();
    g.connect(math, 0, out, 0).unwrap();

    let plan = compile(&g).unwrap();
    assert_eq!(plan.step(0).op, StepOp::Math(MathOp::Mul));
    assert_eq!(
        plan.step(0).inputs,
        vec![InputSource::Literal(0.0), InputSource::Literal(0.0)]
    );
}

#[test]
fn feedback_cycle_is_rejected() {
    let mut g = Graph::brain("brain");
    let input = g.add_node(NodeKind::Input).unwrap();
    let m1 = g.add_node(NodeKind::Math).unwrap();
    let m2 = g.add_node(NodeKind::Math).unwrap();
    let out = g.add_node(NodeKind::Output).unwrap();
    g.connect(input, 0, m1, 0).unwrap();
    g.connect(m1, 0, m2, 0).unwrap();
    g.connect(m2, 0, m1, 1).unwrap();
    g.connect(m2, 0, out, 0).unwrap();

    match compile(&g) {
        Err(CompileError::Cycle { nodes, .. }) => {
            assert!(nodes.contains(&m1));
            assert!(nodes.contains(&m2));
            assert!(!nodes.contains(&input));
            assert!(!nodes.contains(&out));
        }
        other => panic!("expected a cycle error, got {other:?}"),
    }
}

#[test]
fn previous_node_breaks_frame_feedback() {
    // value(n) = previous(value(n-1)) + 1: looks cyclic, but the edge back is
    // carried as per-agent state rather than a same-frame dependency.
    let mut g = Graph::brain("counter");
    let prev = g.add_node(NodeKind::Previous).unwrap();
    let one = g.add_node(NodeKind::Input).unwrap();
    g.set_param(one, "Constant", 1.0).unwrap();
    let add = g.add_node(NodeKind::Math).unwrap();
    let out = g.add_node(NodeKind::Output).unwrap();
    g.connect(prev, 0, add, 0).unwrap();
    g.connect(one, 0, add, 1).unwrap();
    g.connect(add, 0, out, 0).unwrap();
    g.connect(add, 0, prev, 0).unwrap();

    let plan = compile(&g).unwrap();
    assert_eq!(plan.stateful_steps(), &[0]);
    assert_eq!(plan.step_of(prev), Some(0));
    let add_step = plan.step_of(add).unwrap();
    assert!(add_step > 0);
    assert_eq!(
        plan.step(0).inputs,
        vec![InputSource::Step {
            step: add_step,
            output: 0
        }]
    );
    assert_eq!(plan.step_of(out), Some(plan.len() - 1));
}

#[test]
fn cycle_error_lists_only_nodes_on_the_loop() {
    let mut g = Graph::brain("brain");
    let a = g.add_node(NodeKind::Math).unwrap();
    let b = g.add_node(NodeKind::Math).unwrap();
    let after = g.add_node(NodeKind::Map).unwrap();
    let out = g.add_node(NodeKind::Output).unwrap();
    g.connect(a, 0, b, 0).unwrap();
    g.connect(b, 0, a, 0).unwrap();
    g.connect(b, 0, after, 0).unwrap();
    g.connect(after, 0, out, 0).unwrap();

    assert_eq!(
        compile(&g),
        Err(CompileError::Cycle {
            graph: "brain".to_string(),
            nodes: vec![a, b],
        })
    );
}

#[test]
fn incompatible_link_types_are_rejected() {
    let mut g = Graph::generation("gen");
    let obj = g.add_node(NodeKind::ObjectInput).unwrap();
    g.set_param(obj, "inputObject", "Cube").unwrap();
    let tmpl = g.add_node(NodeKind::Template).unwrap();
    g.set_param(tmpl, "brainType", "simpleSim").unwrap();
    let rand = g.add_node(NodeKind::RandomPosition).unwrap();
    let tmpl2 = g.add_node(NodeKind::Template).unwrap();
    g.set_param(tmpl2, "brainType", "other").unwrap();
    let gen = g.add_node(NodeKind::Generate).unwrap();
    g.connect(obj, 0, tmpl, 0).unwrap();
    g.connect(tmpl, 0, rand, 0).unwrap();
    // An agent set cannot feed a template's object input.
    g.connect(rand, 0, tmpl2, 0).unwrap();
    g.connect(tmpl2, 0, gen, 0).unwrap();

    match compile(&g) {
        Err(CompileError::TypeMismatch {
            node,
            expected,
            found,
            ..
        }) => {
            assert_eq!(node, tmpl2);
            assert_eq!(expected, DataType::ObjectRef);
            assert_eq!(found, DataType::AgentSet);
        }
        other => panic!("expected a type mismatch, got {other:?}"),
    }
}

#[test]
fn object_reference_promotes_to_agent_set() {
    let mut g = Graph::generation("gen");
    let obj = g.add_node(NodeKind::ObjectInput).unwrap();
    g.set_param(obj, "inputObject", "Cube").unwrap();
    let gen = g.add_node(NodeKind::Generate).unwrap();
    g.connect(obj, 0, gen, 0).unwrap();

    assert!(compile(&g).is_ok());
}

#[test]
fn required_inputs_must_be_linked() {
    let mut g = Graph::brain("brain");
    let out = g.add_node(NodeKind::Output).unwrap();

    assert_eq!(
        compile(&g),
        Err(CompileError::UnresolvedInput {
            node: out,
            socket: "value"
        })
    );
}

#[test]
fn graph_without_sinks_is_rejected() {
    let mut g = Graph::brain("brain");
    g.add_node(NodeKind::Input).unwrap();
    assert!(matches!(compile(&g), Err(CompileError::NoSinks { .. })));
}

#[test]
fn unknown_enum_params_are_rejected() {
    let mut g = constant_brain(1.0);
    let input = g.node_by_name("Input").unwrap().id();
    g.set_param(input, "InputSource", "TELEPATHY").unwrap();

    assert!(matches!(
        compile(&g),
        Err(CompileError::InvalidParam {
            param: "InputSource",
            ..
        })
    ));
}

#[test]
fn empty_names_are_accepted_while_authoring_but_not_compiled() {
    let mut g = Graph::brain("brain");
    let input = g.add_node(NodeKind::Input).unwrap();
    let write = g.add_node(NodeKind::BlackboardWrite).unwrap();
    g.set_param(write, "Key", "").unwrap();
    g.connect(input, 0, write, 0).unwrap();

    assert!(matches!(
        compile(&g),
        Err(CompileError::InvalidParam { param: "Key", .. })
    ));
    g.set_param(write, "Key", "alarm").unwrap();
    assert!(compile(&g).is_ok());
}

#[test]
fn nodes_without_a_path_to_a_sink_are_pruned() {
    let mut g = constant_brain(1.0);
    let dangling = g.add_node(NodeKind::Noise).unwrap();
    let input = g.node_by_name("Input").unwrap().id();
    g.connect(input, 0, dangling, 0).unwrap();

    let plan = compile(&g).unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.pruned(), &[dangling]);
    assert_eq!(plan.step_of(dangling), None);
}

fn dag() -> impl Strategy<Value = (Vec<usize>, Vec<(usize, usize, usize)>)> {
    (2usize..12).prop_flat_map(|n| {
        let ranks = Just((0..n).collect::<Vec<_>>()).prop_shuffle();
        let edges = proptest::collection::vec((0..n, 0..n, 0..2usize), 0..n * 3);
        (ranks, edges)
    })
}

proptest! {
    #[test]
    fn acyclic_graphs_compile_in_dependency_order((ranks, edges) in dag()) {
        let mut g = Graph::brain("random");
        let ids: Vec<NodeId> = ranks
            .iter()
            .map(|_| g.add_node(NodeKind::Math).unwrap())
            .collect();

        for (a, b, slot) in edges {
            let (from, to) = match ranks[a].cmp(&ranks[b]) {
                core::cmp::Ordering::Less => (a, b),
                core::cmp::Ordering::Greater => (b, a),
                core::cmp::Ordering::Equal => continue,
            };
            // Occupied inputs are simply skipped.
            let _ = g.connect(ids[from], 0, ids[to], slot);
        }

        let last = (0..ranks.len()).max_by_key(|&i| ranks[i]).unwrap();
        let out = g.add_node(NodeKind::Output).unwrap();
        g.connect(ids[last], 0, out, 0).unwrap();

        let plan = compile(&g).unwrap();
        for link in g.links() {
            let (Some(from), Some(to)) = (plan.step_of(link.from.node), plan.step_of(link.to.node)) else {
                continue;
            };
            prop_assert!(from < to);
        }
        prop_assert_eq!(plan.step_of(out), Some(plan.len() - 1));
    }

    #[test]
    fn back_edges_always_fail_with_cycle(n in 2usize..10, back in 0usize..10) {
        let back = back % n;
        let mut g = Graph::brain("chain");
        let ids: Vec<NodeId> = (0..n).map(|_| g.add_node(NodeKind::Math).unwrap()).collect();
        for pair in ids.windows(2) {
            g.connect(pair[0], 0, pair[1], 0).unwrap();
        }
        g.connect(ids[n - 1], 0, ids[back], 1).unwrap();
        let out = g.add_node(NodeKind::Output).unwrap();
        g.connect(ids[n - 1], 0, out, 0).unwrap();

        let is_cycle = matches!(compile(&g), Err(CompileError::Cycle { .. }));
        prop_assert!(is_cycle);
    }

    #[test]
    fn back_edges_through_previous_compile(n in 2usize..10, back in 0usize..10) {
        let back = back % n;
        let mut g = Graph::brain("chain");
        let ids: Vec<NodeId> = (0..n).map(|_| g.add_node(NodeKind::Math).unwrap()).collect();
        for pair in ids.windows(2) {
            g.connect(pair[0], 0, pair[1], 0).unwrap();
        }
        let prev = g.add_node(NodeKind::Previous).unwrap();
        g.connect(ids[n - 1], 0, prev, 0).unwrap();
        g.connect(prev, 0, ids[back], 1).unwrap();
        let out = g.add_node(NodeKind::Output).unwrap();
        g.connect(ids[n - 1], 0, out, 0).unwrap();

        let plan = compile(&g).unwrap();
        prop_assert!(plan.step_of(prev).unwrap() < plan.step_of(ids[back]).unwrap());
        prop_assert_eq!(plan.stateful_steps().len(), 1);
    }
}
