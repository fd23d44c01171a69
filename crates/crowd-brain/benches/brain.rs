use std::collections::BTreeMap;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crowd_brain::{AgentView, BrainContext};
use crowd_core::{AgentId, FrameContext, Transform, Vec3};
use crowd_graph::{compile, Graph, NodeKind};

/// Wander: noisy forward speed, heading drift from an accumulator, and a shared counter.
fn wander_brain() -> Graph {
    let mut g = Graph::brain("wander");
    let speed = g.add_node(NodeKind::Input).unwrap();
    g.set_param(speed, "InputSource", "CONSTANT").unwrap();
    g.set_param(speed, "Constant", 0.1).unwrap();
    let noise = g.add_node(NodeKind::Noise).unwrap();
    g.set_param(noise, "Amount", 0.05).unwrap();
    let forward = g.add_node(NodeKind::Output).unwrap();
    g.set_param(forward, "Output", "PY").unwrap();
    g.connect(speed, 0, noise, 0).unwrap();
    g.connect(noise, 0, forward, 0).unwrap();

    let jitter = g.add_node(NodeKind::Input).unwrap();
    g.set_param(jitter, "InputSource", "RANDOM").unwrap();
    g.set_param(jitter, "Min", -1.0).unwrap();
    let drift = g.add_node(NodeKind::Accumulate).unwrap();
    let turn = g.add_node(NodeKind::Output).unwrap();
    g.set_param(turn, "Output", "RZ").unwrap();
    g.connect(jitter, 0, drift, 0).unwrap();
    g.connect(drift, 0, turn, 0).unwrap();

    let crowd = g.add_node(NodeKind::Input).unwrap();
    g.set_param(crowd, "InputSource", "BLACKBOARD").unwrap();
    g.set_param(crowd, "Key", "crowd").unwrap();
    let write = g.add_node(NodeKind::BlackboardWrite).unwrap();
    g.set_param(write, "Key", "crowd").unwrap();
    g.connect(crowd, 0, write, 0).unwrap();
    g
}

fn bench_brain(c: &mut Criterion) {
    let plan = Arc::new(compile(&wander_brain()).unwrap());
    let blackboard = BTreeMap::from([("crowd".to_string(), 1.0)]);

    let mut group = c.benchmark_group("crowd-brain/step");

    for &n in &[1_000usize, 10_000usize] {
        let mut contexts: Vec<BrainContext> = (0..n)
            .map(|_| BrainContext::instantiate(plan.clone()).unwrap())
            .collect();
        let mut agents: Vec<AgentView> = (0..n)
            .map(|i| AgentView {
                id: AgentId(i as u64),
                transform: Transform::from_position(Vec3::new(i as f32, 0.0, 0.0)),
            })
            .collect();
        let mut frame = 0u64;
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &_n| {
            b.iter(|| {
                frame += 1;
                let ctx = FrameContext::new(frame, 1.0 / 24.0, 7);
                for (brain, agent) in contexts.iter_mut().zip(agents.iter_mut()) {
                    if let Ok(outputs) = brain.step(&ctx, agent, &blackboard) {
                        outputs.apply(&mut agent.transform);
                    }
                }
                black_box(agents[0].transform);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_brain);
criterion_main!(benches);
