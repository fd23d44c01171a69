//! Frame-synchronized shared state for crowd agents.
//!
//! Agent evaluations within a frame never observe each other's blackboard
//! writes. That keeps a frame's results independent of evaluation order and
//! lets the per-frame agent loop run in parallel without cross-agent locking.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod manager;

pub use blackboard::{SharedBlackboard, WriteOrigin};
pub use manager::{SyncError, SyncManager};
