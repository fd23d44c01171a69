use thiserror::Error;

use crate::catalog::{DataType, NodeKind};
use crate::model::{GraphKind, LinkId, NodeId, SocketRef};

/// Authoring-time errors raised by [`crate::Graph`] mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("unknown link {0:?}")]
    UnknownLink(LinkId),

    #[error("{node} nodes cannot be added to a {graph} graph")]
    WrongGraphKind { node: NodeKind, graph: GraphKind },

    #[error("a node named {0:?} already exists")]
    DuplicateName(String),

    #[error("{kind} has no parameter {name:?}")]
    UnknownParam { kind: NodeKind, name: String },

    #[error("{kind}.{name} expects a {expected} literal, got {found}")]
    ParamType {
        kind: NodeKind,
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{} has no output socket {}", .0.node, .0.index)]
    NoSuchOutput(SocketRef),

    #[error("{} has no input socket {}", .0.node, .0.index)]
    NoSuchInput(SocketRef),

    #[error("input socket {} of {} is already linked", .0.index, .0.node)]
    InputOccupied(SocketRef),
}

/// Errors that prevent a graph from compiling into an evaluation plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("graph {graph:?} contains a dependency cycle through {nodes:?}")]
    Cycle { graph: String, nodes: Vec<NodeId> },

    #[error("link {link:?} connects a {found} output to {node}.{socket} ({expected} input)")]
    TypeMismatch {
        link: LinkId,
        node: NodeId,
        socket: &'static str,
        expected: DataType,
        found: DataType,
    },

    #[error("input {node}.{socket} has neither a link nor a default value")]
    UnresolvedInput { node: NodeId, socket: &'static str },

    #[error("{node}.{param}: {reason}")]
    InvalidParam {
        node: NodeId,
        param: &'static str,
        reason: String,
    },

    #[error("graph {graph:?} has no {kind} sink node")]
    NoSinks { graph: String, kind: GraphKind },
}
