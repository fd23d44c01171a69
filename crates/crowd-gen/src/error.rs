use crowd_core::ObjectRef;
use crowd_graph::{GraphKind, NodeId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("{node} generates agents without a Template upstream")]
    MissingTemplate { node: NodeId },

    #[error("{node}: invalid placement: {reason}")]
    InvalidPlacement { node: NodeId, reason: String },

    #[error("{node}: scene has no object named {name:?}")]
    UnknownObject { node: NodeId, name: ObjectRef },

    #[error("plan {graph:?} is a {kind} plan, not a generation plan")]
    WrongGraphKind { graph: String, kind: GraphKind },

    #[error("{node} is not a Generate node of this plan")]
    NotAGenerateNode { node: NodeId },

    #[error("{node} has no upstream agent set")]
    UnresolvedInput { node: NodeId },
}
