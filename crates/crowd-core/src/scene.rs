use core::fmt;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Agent, AgentId, Transform};

/// Opaque back-reference to an object owned by the host scene.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectRef(pub String);

impl ObjectRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only host scene access.
///
/// The core never owns host objects; it only resolves names to placements.
pub trait SceneView {
    fn resolve(&self, object: &ObjectRef) -> Option<Transform>;
}

/// Effect sink receiving computed agent state after each frame.
pub trait SceneSink {
    fn apply(&mut self, agent: &Agent);

    /// The agent was removed from the simulation and receives no further updates.
    fn remove(&mut self, _agent: AgentId) {}
}

/// In-memory scene, used by the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    objects: BTreeMap<ObjectRef, Transform>,
    applied: BTreeMap<AgentId, Transform>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, name: impl Into<String>, transform: Transform) -> Self {
        self.insert_object(name, transform);
        self
    }

    pub fn insert_object(&mut self, name: impl Into<String>, transform: Transform) {
        self.objects.insert(ObjectRef::new(name), transform);
    }

    /// Last transform applied for each agent.
    pub fn applied(&self) -> &BTreeMap<AgentId, Transform> {
        &self.applied
    }
}

impl SceneView for MemoryScene {
    fn resolve(&self, object: &ObjectRef) -> Option<Transform> {
        self.objects.get(object).copied()
    }
}

impl SceneSink for MemoryScene {
    fn apply(&mut self, agent: &Agent) {
        self.applied.insert(agent.id, agent.transform);
    }

    fn remove(&mut self, agent: AgentId) {
        self.applied.remove(&agent);
    }
}
