use std::collections::BTreeMap;

use crowd_core::BlackboardRead;
use thiserror::Error;

use crate::blackboard::{SharedBlackboard, WriteOrigin};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("frame {open} is still open")]
    FrameAlreadyOpen { open: u64 },

    #[error("no frame is open (tried to close frame {frame})")]
    FrameNotOpen { frame: u64 },

    #[error("tried to close frame {frame} while frame {open} is open")]
    FrameMismatch { frame: u64, open: u64 },

    #[error("frame {frame} does not follow already committed frame {last}")]
    FrameOutOfOrder { frame: u64, last: u64 },

    #[error("cannot seed values while frame {open} is open")]
    SeedDuringFrame { open: u64 },
}

/// Owns the shared blackboard for one running simulation and delimits frames.
///
/// Writes issued while frame `n` is open are staged and published by
/// `end_frame(n)`, so every read during frame `n` sees the state committed at
/// the end of frame `n - 1` regardless of agent evaluation order.
#[derive(Debug, Default)]
pub struct SyncManager {
    blackboard: SharedBlackboard,
    open: Option<u64>,
    last_committed: Option<u64>,
}

impl SyncManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self, frame: u64) -> Result<(), SyncError> {
        if let Some(open) = self.open {
            return Err(SyncError::FrameAlreadyOpen { open });
        }
        if let Some(last) = self.last_committed {
            if frame <= last {
                return Err(SyncError::FrameOutOfOrder { frame, last });
            }
        }
        self.open = Some(frame);
        Ok(())
    }

    /// Close `frame` and publish its staged writes. Returns the number of keys committed.
    pub fn end_frame(&mut self, frame: u64) -> Result<usize, SyncError> {
        match self.open {
            None => return Err(SyncError::FrameNotOpen { frame }),
            Some(open) if open != frame => return Err(SyncError::FrameMismatch { frame, open }),
            Some(_) => {}
        }
        let committed = self.blackboard.commit();
        self.open = None;
        self.last_committed = Some(frame);
        tracing::trace!(frame, committed, "frame committed");
        Ok(committed)
    }

    pub fn open_frame(&self) -> Option<u64> {
        self.open
    }

    pub fn last_committed(&self) -> Option<u64> {
        self.last_committed
    }

    /// Never blocks on in-frame writers.
    pub fn read(&self, key: &str) -> Option<f32> {
        self.blackboard.read(key)
    }

    /// Host-side write, visible from the next frame boundary.
    pub fn write(&self, key: &str, value: f32) {
        self.blackboard.stage(WriteOrigin::host(), key, value);
    }

    pub fn write_from(&self, origin: WriteOrigin, key: &str, value: f32) {
        self.blackboard.stage(origin, key, value);
    }

    /// Set an initial value, visible immediately. Only allowed between frames.
    pub fn seed(&self, key: &str, value: f32) -> Result<(), SyncError> {
        if let Some(open) = self.open {
            return Err(SyncError::SeedDuringFrame { open });
        }
        self.blackboard.insert_committed(key, value);
        Ok(())
    }

    pub fn snapshot(&self) -> BTreeMap<String, f32> {
        self.blackboard.snapshot()
    }

    pub fn blackboard(&self) -> &SharedBlackboard {
        &self.blackboard
    }
}

impl Drop for SyncManager {
    fn drop(&mut self) {
        let pending = self.blackboard.pending();
        if pending > 0 {
            tracing::debug!(pending, "discarding uncommitted blackboard writes");
            self.blackboard.discard_staged();
        }
    }
}

impl BlackboardRead for SyncManager {
    fn read(&self, key: &str) -> Option<f32> {
        SyncManager::read(self, key)
    }
}
