//! Simulation configuration loading.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use crowd_core::FrameRange;
use serde::{Deserialize, Serialize};

/// Run settings, usually loaded from the `sim:` section of a project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// First simulated frame
    #[serde(default = "default_start_frame")]
    pub start_frame: u64,

    /// Last simulated frame (inclusive)
    #[serde(default = "default_end_frame")]
    pub end_frame: u64,

    /// Global seed for generation and per-agent randomness
    pub seed: u64,

    /// Seconds per frame
    #[serde(default = "default_dt")]
    pub dt_seconds: f32,

    /// Evaluate agents on the rayon thread pool
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Warn when a frame takes longer than this; 0 disables the check
    #[serde(default = "default_frame_budget_ms")]
    pub frame_budget_ms: u64,

    /// Blackboard values present before the first frame
    pub blackboard: BTreeMap<String, f32>,
}

fn default_start_frame() -> u64 {
    1
}
fn default_end_frame() -> u64 {
    250
}
fn default_dt() -> f32 {
    1.0 / 24.0
}
fn default_true() -> bool {
    true
}
fn default_frame_budget_ms() -> u64 {
    40
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_frame: default_start_frame(),
            end_frame: default_end_frame(),
            seed: 0,
            dt_seconds: default_dt(),
            parallel: default_true(),
            frame_budget_ms: default_frame_budget_ms(),
            blackboard: BTreeMap::new(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sim config from {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse sim config from {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn frame_range(&self) -> FrameRange {
        FrameRange::new(self.start_frame, self.end_frame)
    }
}
