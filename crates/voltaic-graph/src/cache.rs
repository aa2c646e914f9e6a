use std::collections::HashMap;

use voltaic_core::pos::BlockPos;

use crate::path::PathResult;

/// Per-source route cache with a whole-graph version counter.
///
/// Any topology change calls [`PathCache::invalidate`], which drops every
/// entry and bumps the version. Entries are only ever inserted for the
/// current version, so a present entry is always fresh.
#[derive(Debug, Clone, Default)]
pub struct PathCache {
    entries: HashMap<BlockPos, Vec<PathResult>>,
    version: u64,
    valid: bool,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: BlockPos) -> Option<&[PathResult]> {
        self.entries.get(&source).map(Vec::as_slice)
    }

    pub fn contains(&self, source: BlockPos) -> bool {
        self.entries.contains_key(&source)
    }

    pub fn insert(&mut self, source: BlockPos, paths: Vec<PathResult>) {
        self.entries.insert(source, paths);
    }

    /// Drop all entries, mark invalid, bump the version.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.valid = false;
        self.version += 1;
    }

    pub fn mark_valid(&mut self) {
        self.valid = true;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of cached sources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
