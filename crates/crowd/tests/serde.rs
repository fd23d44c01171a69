#![cfg(all(feature = "serde", feature = "sim"))]

use crowd::core::{FrameRange, MemoryScene, Transform, Vec3};
use crowd::graph::GraphDocument;
use crowd::sim::{SimConfig, Simulation};

const SIMPLE_GEN: &str = include_str!("../../../demos/simple/graphs/simpleGen.json");
const SIMPLE_SIM: &str = include_str!("../../../demos/simple/graphs/simpleSim.json");

#[test]
fn json_graphs_drive_a_simulation_and_agents_serialize() {
    let generation = GraphDocument::from_json(SIMPLE_GEN)
        .unwrap()
        .into_graph()
        .unwrap();
    let brain = GraphDocument::from_json(SIMPLE_SIM)
        .unwrap()
        .into_graph()
        .unwrap();

    let scene = MemoryScene::new().with_object("Cube", Transform::from_position(Vec3::ZERO));
    let mut sim = Simulation::new(SimConfig::default(), scene);
    sim.add_brain(brain);
    sim.set_generation(generation);
    sim.start(FrameRange::new(1, 10)).unwrap();
    sim.run_to_end().unwrap();

    let json = serde_json::to_value(sim.agents()).unwrap();
    let agents = json.as_array().unwrap();
    assert_eq!(agents.len(), 25);
    assert_eq!(agents[0]["template"]["brain"], "simpleSim");
    assert_eq!(agents[0]["evaluations"], 10);
}
