use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError, RwLock};

use crowd_core::{AgentId, BlackboardRead};

/// Who issued a staged write.
///
/// When several writes hit the same key within one frame, the greatest origin
/// wins. Host writes order below every agent, agents order by id, then by the
/// order of writes within one agent evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WriteOrigin {
    agent: Option<AgentId>,
    sequence: u32,
}

impl WriteOrigin {
    pub fn host() -> Self {
        Self {
            agent: None,
            sequence: 0,
        }
    }

    pub fn agent(agent: AgentId, sequence: u32) -> Self {
        Self {
            agent: Some(agent),
            sequence,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StagedWrite {
    origin: WriteOrigin,
    value: f32,
}

/// Double-buffered key/value store.
///
/// Reads only see committed values. Writes land in a staging map and become
/// visible together on [`SharedBlackboard::commit`]. The committed map is only
/// write-locked for the duration of a commit, which happens between frames.
#[derive(Debug, Default)]
pub struct SharedBlackboard {
    committed: RwLock<BTreeMap<String, f32>>,
    staged: Mutex<BTreeMap<String, StagedWrite>>,
}

impl SharedBlackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, key: &str) -> Option<f32> {
        self.committed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    pub fn stage(&self, origin: WriteOrigin, key: &str, value: f32) {
        let mut staged = self.staged.lock().unwrap_or_else(PoisonError::into_inner);
        match staged.get_mut(key) {
            Some(existing) if existing.origin > origin => {}
            Some(existing) => *existing = StagedWrite { origin, value },
            None => {
                staged.insert(key.to_string(), StagedWrite { origin, value });
            }
        }
    }

    /// Number of keys currently staged.
    pub fn pending(&self) -> usize {
        self.staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Publish every staged write at once; returns how many keys changed.
    pub fn commit(&self) -> usize {
        let staged = std::mem::take(&mut *self.staged.lock().unwrap_or_else(PoisonError::into_inner));
        if staged.is_empty() {
            return 0;
        }
        let count = staged.len();
        let mut committed = self
            .committed
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for (key, write) in staged {
            committed.insert(key, write.value);
        }
        count
    }

    /// Write straight into the committed map, bypassing staging.
    pub(crate) fn insert_committed(&self, key: &str, value: f32) {
        self.committed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    pub fn snapshot(&self) -> BTreeMap<String, f32> {
        self.committed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn discard_staged(&self) {
        self.staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl BlackboardRead for SharedBlackboard {
    fn read(&self, key: &str) -> Option<f32> {
        SharedBlackboard::read(self, key)
    }
}
