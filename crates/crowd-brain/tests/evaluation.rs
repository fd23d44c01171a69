use std::collections::BTreeMap;
use std::sync::Arc;

use crowd_brain::{AgentView, BrainContext, InstantiateError, NodeEvaluationKind};
use crowd_core::{AgentId, FrameContext, Transform, Vec3};
use crowd_graph::{compile, EvaluationPlan, Graph, GraphKind, NodeId, NodeKind};

fn plan(graph: &Graph) -> Arc<EvaluationPlan> {
    Arc::new(compile(graph).unwrap())
}

fn input(g: &mut Graph, source: &str) -> NodeId {
    let id = g.add_node(NodeKind::Input).unwrap();
    g.set_param(id, "InputSource", source).unwrap();
    id
}

fn output(g: &mut Graph, channel: &str) -> NodeId {
    let id = g.add_node(NodeKind::Output).unwrap();
    g.set_param(id, "Output", channel).unwrap();
    id
}

fn view(id: u64) -> AgentView {
    AgentView {
        id: AgentId(id),
        transform: Transform::default(),
    }
}

fn empty() -> BTreeMap<String, f32> {
    BTreeMap::new()
}

#[test]
fn constant_output_moves_the_agent_every_frame() {
    let mut g = Graph::brain("simpleSim");
    let c = input(&mut g, "CONSTANT");
    g.set_param(c, "Constant", 0.5).unwrap();
    let out = output(&mut g, "PY");
    g.connect(c, 0, out, 0).unwrap();

    let mut ctx = BrainContext::instantiate(plan(&g)).unwrap();
    let mut agent = view(0);
    for frame in 1..=10 {
        let outputs = ctx
            .step(&FrameContext::new(frame, 1.0 / 24.0, 0), &agent, &empty())
            .unwrap();
        outputs.apply(&mut agent.transform);
    }
    assert_eq!(agent.transform.position, Vec3::new(0.0, 5.0, 0.0));
}

#[test]
fn outputs_on_one_channel_are_summed() {
    let mut g = Graph::brain("brain");
    let a = input(&mut g, "CONSTANT");
    g.set_param(a, "Constant", 1.0).unwrap();
    let b = input(&mut g, "CONSTANT");
    g.set_param(b, "Constant", 2.0).unwrap();
    let out_a = output(&mut g, "RZ");
    let out_b = output(&mut g, "RZ");
    g.connect(a, 0, out_a, 0).unwrap();
    g.connect(b, 0, out_b, 0).unwrap();

    let mut ctx = BrainContext::instantiate(plan(&g)).unwrap();
    let outputs = ctx
        .step(&FrameContext::new(1, 1.0, 0), &view(0), &empty())
        .unwrap();
    assert_eq!(outputs.rotation, Vec3::new(0.0, 0.0, 3.0));
    assert_eq!(outputs.translation, Vec3::ZERO);
}

#[test]
fn random_inputs_are_reproducible_per_agent_and_frame() {
    let mut g = Graph::brain("brain");
    let r = input(&mut g, "RANDOM");
    g.set_param(r, "Min", -2.0).unwrap();
    g.set_param(r, "Max", 2.0).unwrap();
    let out = output(&mut g, "PX");
    g.connect(r, 0, out, 0).unwrap();
    let plan = plan(&g);

    let run = |agent: u64, frame: u64| {
        let mut ctx = BrainContext::instantiate(plan.clone()).unwrap();
        ctx.step(&FrameContext::new(frame, 1.0, 42), &view(agent), &empty())
            .unwrap()
            .translation
            .x
    };

    for agent in 0..8 {
        for frame in 1..8 {
            let x = run(agent, frame);
            assert!((-2.0..2.0).contains(&x));
            assert_eq!(x, run(agent, frame));
        }
    }
    assert_ne!(run(0, 1), run(1, 1));
}

#[test]
fn previous_emits_last_frames_value() {
    let mut g = Graph::brain("brain");
    let f = input(&mut g, "FRAME");
    let prev = g.add_node(NodeKind::Previous).unwrap();
    g.set_param(prev, "Initial", -1.0).unwrap();
    let out = output(&mut g, "PX");
    g.connect(f, 0, prev, 0).unwrap();
    g.connect(prev, 0, out, 0).unwrap();

    let mut ctx = BrainContext::instantiate(plan(&g)).unwrap();
    let mut seen = Vec::new();
    for frame in 1..=3 {
        let outputs = ctx
            .step(&FrameContext::new(frame, 1.0, 0), &view(0), &empty())
            .unwrap();
        seen.push(outputs.translation.x);
    }
    assert_eq!(seen, vec![-1.0, 1.0, 2.0]);
    assert_eq!(ctx.state(), &[3.0]);

    ctx.reset();
    assert_eq!(ctx.state(), &[-1.0]);
}

#[test]
fn accumulate_integrates_over_dt() {
    let mut g = Graph::brain("brain");
    let c = input(&mut g, "CONSTANT");
    g.set_param(c, "Constant", 2.0).unwrap();
    let acc = g.add_node(NodeKind::Accumulate).unwrap();
    let out = output(&mut g, "PX");
    g.connect(c, 0, acc, 0).unwrap();
    g.connect(acc, 0, out, 0).unwrap();

    let mut ctx = BrainContext::instantiate(plan(&g)).unwrap();
    let xs: Vec<f32> = (1..=3)
        .map(|frame| {
            ctx.step(&FrameContext::new(frame, 0.5, 0), &view(0), &empty())
                .unwrap()
                .translation
                .x
        })
        .collect();
    assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    assert_eq!(ctx.state(), &[3.0]);
}

#[test]
fn loop_through_previous_counts_frames() {
    let mut g = Graph::brain("counter");
    let prev = g.add_node(NodeKind::Previous).unwrap();
    let one = input(&mut g, "CONSTANT");
    g.set_param(one, "Constant", 1.0).unwrap();
    let add = g.add_node(NodeKind::Math).unwrap();
    let out = output(&mut g, "PX");
    g.connect(prev, 0, add, 0).unwrap();
    g.connect(one, 0, add, 1).unwrap();
    g.connect(add, 0, out, 0).unwrap();
    g.connect(add, 0, prev, 0).unwrap();

    let mut ctx = BrainContext::instantiate(plan(&g)).unwrap();
    let counts: Vec<f32> = (1..=3)
        .map(|frame| {
            ctx.step(&FrameContext::new(frame, 1.0, 0), &view(0), &empty())
                .unwrap()
                .translation
                .x
        })
        .collect();
    assert_eq!(counts, vec![1.0, 2.0, 3.0]);
    assert_eq!(ctx.state(), &[3.0]);
}

#[test]
fn accumulate_can_integrate_its_own_output() {
    // x(n+1) = x(n) + (x(n) + 1) * dt
    let mut g = Graph::brain("growth");
    let acc = g.add_node(NodeKind::Accumulate).unwrap();
    let one = input(&mut g, "CONSTANT");
    g.set_param(one, "Constant", 1.0).unwrap();
    let add = g.add_node(NodeKind::Math).unwrap();
    let out = output(&mut g, "PX");
    g.connect(acc, 0, add, 0).unwrap();
    g.connect(one, 0, add, 1).unwrap();
    g.connect(add, 0, acc, 0).unwrap();
    g.connect(acc, 0, out, 0).unwrap();

    let mut ctx = BrainContext::instantiate(plan(&g)).unwrap();
    let xs: Vec<f32> = (1..=3)
        .map(|frame| {
            ctx.step(&FrameContext::new(frame, 1.0, 0), &view(0), &empty())
                .unwrap()
                .translation
                .x
        })
        .collect();
    assert_eq!(xs, vec![0.0, 1.0, 3.0]);
}

#[test]
fn failed_evaluation_leaves_state_untouched() {
    let mut g = Graph::brain("brain");
    let one = input(&mut g, "CONSTANT");
    g.set_param(one, "Constant", 1.0).unwrap();
    let acc = g.add_node(NodeKind::Accumulate).unwrap();
    g.set_param(acc, "Initial", 1.0).unwrap();
    let divisor = input(&mut g, "BLACKBOARD");
    g.set_param(divisor, "Key", "divisor").unwrap();
    let div = g.add_node(NodeKind::Math).unwrap();
    g.set_param(div, "Operation", "DIV").unwrap();
    let out = output(&mut g, "PX");
    g.connect(one, 0, acc, 0).unwrap();
    g.connect(acc, 0, div, 0).unwrap();
    g.connect(divisor, 0, div, 1).unwrap();
    g.connect(div, 0, out, 0).unwrap();

    let mut ctx = BrainContext::instantiate(plan(&g)).unwrap();
    let frame = FrameContext::new(7, 1.0, 0);

    let err = ctx.step(&frame, &view(3), &empty()).unwrap_err();
    assert_eq!(err.kind, NodeEvaluationKind::DivisionByZero);
    assert_eq!(err.node, div);
    assert_eq!(err.frame, 7);
    assert_eq!(err.agent, AgentId(3));
    assert_eq!(ctx.state(), &[1.0]);

    let mut bb = empty();
    bb.insert("divisor".to_string(), 2.0);
    let outputs = ctx.step(&frame, &view(3), &bb).unwrap();
    assert_eq!(outputs.translation.x, 0.5);
    assert_eq!(ctx.state(), &[2.0]);
}

#[test]
fn non_finite_values_are_rejected() {
    let mut g = Graph::brain("brain");
    let base = input(&mut g, "CONSTANT");
    g.set_param(base, "Constant", -8.0).unwrap();
    let exp = input(&mut g, "CONSTANT");
    g.set_param(exp, "Constant", 0.5).unwrap();
    let pow = g.add_node(NodeKind::Math).unwrap();
    g.set_param(pow, "Operation", "POW").unwrap();
    let out = output(&mut g, "PZ");
    g.connect(base, 0, pow, 0).unwrap();
    g.connect(exp, 0, pow, 1).unwrap();
    g.connect(pow, 0, out, 0).unwrap();

    let mut ctx = BrainContext::instantiate(plan(&g)).unwrap();
    let err = ctx
        .step(&FrameContext::new(1, 1.0, 0), &view(0), &empty())
        .unwrap_err();
    assert_eq!(err.kind, NodeEvaluationKind::NonFinite);
    assert_eq!(err.node, pow);
}

#[test]
fn blackboard_writes_are_returned_not_applied() {
    let mut g = Graph::brain("brain");
    let id = input(&mut g, "AGENT_ID");
    let write = g.add_node(NodeKind::BlackboardWrite).unwrap();
    g.set_param(write, "Key", "last").unwrap();
    g.connect(id, 0, write, 0).unwrap();

    let mut ctx = BrainContext::instantiate(plan(&g)).unwrap();
    let bb = empty();
    let outputs = ctx
        .step(&FrameContext::new(1, 1.0, 0), &view(9), &bb)
        .unwrap();
    assert_eq!(outputs.writes, vec![("last".to_string(), 9.0)]);
    assert!(bb.is_empty());
}

#[test]
fn generation_plans_cannot_drive_a_brain() {
    let mut g = Graph::generation("gen");
    let obj = g.add_node(NodeKind::ObjectInput).unwrap();
    g.set_param(obj, "inputObject", "Cube").unwrap();
    let gen = g.add_node(NodeKind::Generate).unwrap();
    g.connect(obj, 0, gen, 0).unwrap();

    let err = BrainContext::instantiate(plan(&g)).unwrap_err();
    assert_eq!(
        err,
        InstantiateError::NotABrain {
            graph: "gen".to_string(),
            kind: GraphKind::Generation,
        }
    );
}
