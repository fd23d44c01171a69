//! Agent generation.
//!
//! A compiled generation plan is evaluated once, at simulation start, against
//! a read-only view of the host scene. Each Generate node turns the agent set
//! flowing into it into concrete [`Agent`](crowd_core::Agent)s bound to the
//! brain named by the nearest upstream Template node.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod error;
pub mod pipeline;
pub mod placement;

pub use error::GenerationError;
pub use pipeline::{generate, generate_from, AgentSet};
