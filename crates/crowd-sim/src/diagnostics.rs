use crowd_graph::{GraphKind, NodeKind};

pub const CONTROL_OPERATIONS: &[&str] = &[
    "start",
    "stop",
    "tick",
    "run_to_end",
    "remove_agent",
    "current_frame",
    "is_running",
];

pub const GENERATION_OPERATIONS: &[&str] = &["generate", "generate_from"];

/// Everything a host can drive or author, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub control: Vec<&'static str>,
    pub generation: Vec<&'static str>,
    pub brain_nodes: Vec<&'static str>,
    pub generation_nodes: Vec<&'static str>,
}

impl Capabilities {
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.control
            .iter()
            .chain(&self.generation)
            .chain(&self.brain_nodes)
            .chain(&self.generation_nodes)
            .copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }
}

pub fn capabilities() -> Capabilities {
    let nodes = |kind: GraphKind| -> Vec<&'static str> {
        NodeKind::for_graph(kind).map(NodeKind::name).collect()
    };
    Capabilities {
        control: CONTROL_OPERATIONS.to_vec(),
        generation: GENERATION_OPERATIONS.to_vec(),
        brain_nodes: nodes(GraphKind::Brain),
        generation_nodes: nodes(GraphKind::Generation),
    }
}
