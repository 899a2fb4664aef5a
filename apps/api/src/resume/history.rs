use std::collections::VecDeque;

use crate::resume::models::Resume;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Append-only snapshot log for one resume, used for undo.
///
/// The oldest retained snapshot is the undo floor: the log never drops below
/// one entry. Once `limit` snapshots are held, each push evicts the oldest.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    snapshots: VecDeque<Resume>,
    limit: usize,
}

impl History {
    /// Starts a history at the post-creation snapshot.
    pub fn seeded(initial: Resume, limit: usize) -> Self {
        let mut snapshots = VecDeque::new();
        snapshots.push_back(initial);
        Self {
            snapshots,
            limit: limit.max(1),
        }
    }

    /// Rebuilds a history from persisted snapshots, oldest first.
    /// Returns `None` for an empty list.
    pub fn from_snapshots(snapshots: Vec<Resume>, limit: usize) -> Option<Self> {
        if snapshots.is_empty() {
            return None;
        }
        let mut history = Self {
            snapshots: snapshots.into(),
            limit: limit.max(1),
        };
        history.evict();
        Some(history)
    }

    pub fn push(&mut self, snapshot: Resume) {
        self.snapshots.push_back(snapshot);
        self.evict();
    }

    /// Drops the newest snapshot and returns the one that is now newest.
    /// `None` when only the floor snapshot remains.
    pub fn undo(&mut self) -> Option<&Resume> {
        if self.snapshots.len() <= 1 {
            return None;
        }
        self.snapshots.pop_back();
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<&Resume> {
        self.snapshots.back()
    }

    pub fn to_vec(&self) -> Vec<Resume> {
        self.snapshots.iter().cloned().collect()
    }

    fn evict(&mut self) {
        while self.snapshots.len() > self.limit {
            self.snapshots.pop_front();
        }
    }
}
