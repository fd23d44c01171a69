use core::fmt;

use crowd_core::AgentId;
use crowd_graph::{GraphKind, NodeId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvaluationKind {
    DivisionByZero,
    /// A Map node whose input range has zero width.
    DegenerateRange,
    /// NaN or infinity produced by a node (e.g. `POW` of a negative base).
    NonFinite,
}

impl fmt::Display for NodeEvaluationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeEvaluationKind::DivisionByZero => "division by zero",
            NodeEvaluationKind::DegenerateRange => "degenerate input range",
            NodeEvaluationKind::NonFinite => "non-finite value",
        };
        f.write_str(s)
    }
}

/// A single node failed while evaluating one agent's brain for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("node {node} failed for {agent} at frame {frame}: {kind}")]
pub struct NodeEvaluationError {
    pub node: NodeId,
    pub frame: u64,
    pub agent: AgentId,
    pub kind: NodeEvaluationKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstantiateError {
    #[error("plan {graph:?} is a {kind} plan, not a brain")]
    NotABrain { graph: String, kind: GraphKind },
}
