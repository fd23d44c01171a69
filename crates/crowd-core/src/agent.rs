use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ObjectRef, Transform};

/// Stable identifier for an agent.
///
/// Deterministic simulation relies on the ordering of ids (blackboard write
/// resolution, apply order) and on the numeric value (per-agent RNG seeding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentId(pub u64);

impl AgentId {
    pub fn stable_id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Which brain an agent runs and which host object it was instanced from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TemplateBinding {
    pub brain: String,
    pub source: ObjectRef,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Agent {
    pub id: AgentId,
    pub transform: Transform,
    pub template: TemplateBinding,
    pub alive: bool,
    /// Animation selector last requested by the agent's brain.
    pub animation: Option<u32>,
    /// Number of brain evaluations attempted for this agent, failed ones included.
    pub evaluations: u64,
    pub last_failed_frame: Option<u64>,
}

impl Agent {
    pub fn new(id: AgentId, transform: Transform, template: TemplateBinding) -> Self {
        Self {
            id,
            transform,
            template,
            alive: true,
            animation: None,
            evaluations: 0,
            last_failed_frame: None,
        }
    }

    pub fn brain(&self) -> &str {
        &self.template.brain
    }
}
