//! Deterministic primitives shared by the crowd simulation crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod blackboard;
pub mod frame;
pub mod math;
pub mod rng;
pub mod scene;

pub use agent::{Agent, AgentId, TemplateBinding};
pub use blackboard::BlackboardRead;
pub use frame::{FrameContext, FrameRange};
pub use math::{Transform, Vec3};
pub use rng::{DeterministicRng, SplitMix64};
pub use scene::{MemoryScene, ObjectRef, SceneSink, SceneView};
