use crate::{rng, AgentId, SplitMix64};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub frame: u64,
    pub dt_seconds: f32,
    pub seed: u64,
}

impl FrameContext {
    pub fn new(frame: u64, dt_seconds: f32, seed: u64) -> Self {
        Self {
            frame,
            dt_seconds,
            seed,
        }
    }

    /// RNG private to one agent, one frame and one stream (usually a plan step).
    pub fn rng_for_agent(&self, agent: AgentId, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed, &[agent.stable_id(), self.frame, stream]);
        SplitMix64::new(seed)
    }
}

/// Inclusive frame range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameRange {
    pub start: u64,
    pub end: u64,
}

impl FrameRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn len(&self) -> u64 {
        if self.is_valid() {
            self.end - self.start + 1
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, frame: u64) -> bool {
        (self.start..=self.end).contains(&frame)
    }
}
