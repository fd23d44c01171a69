//! Per-agent evaluation of compiled brain plans.
//!
//! One [`BrainContext`] exists per agent. It shares the immutable
//! [`EvaluationPlan`](crowd_graph::EvaluationPlan) with every other agent
//! running the same brain and owns only the agent's stateful node values.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod context;
pub mod error;
pub mod outputs;

pub use context::{AgentView, BrainContext};
pub use error::{InstantiateError, NodeEvaluationError, NodeEvaluationKind};
pub use outputs::BrainOutputs;
