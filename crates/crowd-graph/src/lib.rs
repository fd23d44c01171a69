//! Brain and generation node graphs, and their compiler.
//!
//! A [`Graph`] is plain authoring data: nodes from a fixed [`NodeKind`]
//! catalog, typed sockets and links. [`compile`] validates it and produces an
//! immutable [`EvaluationPlan`] shared by every runtime that executes it.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod compiler;
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub mod document;
pub mod error;
pub mod model;
pub mod plan;

pub use catalog::{DataType, NodeKind, ParamDefault, ParamSpec, SocketSpec};
pub use compiler::compile;
#[cfg(feature = "serde")]
pub use document::{DocumentError, GraphDocument};
pub use error::{CompileError, GraphError};
pub use model::{Graph, GraphKind, Link, LinkId, Literal, Node, NodeId, SocketRef};
pub use plan::{
    Axis, EvaluationPlan, InputOp, InputSource, LogicOp, MapRange, MathOp, OutputChannel,
    PlanStep, StepOp,
};
