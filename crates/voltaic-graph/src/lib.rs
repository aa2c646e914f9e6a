//! Cable topology graph for the Voltaic energy network.
//!
//! Tracks where cables, consumers and generators sit on the block grid and
//! answers "which consumers can this source reach, and at what cost" with a
//! breadth-first search over face-adjacent blocks. Answers are cached per
//! source and the whole cache is dropped on any topology change.
//!
//! # Design
//!
//! - All registries are keyed by [`BlockPos`]; cables and devices are keyed
//!   independently, so a device may sit next to (but not inside) a cable.
//! - Search structures (frontier, visited set, path lists) live only for the
//!   duration of a single query.
//! - The cache version increases on every call that changes a registry and
//!   never on a call that leaves the registries untouched.

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use voltaic_core::cable::{CableRecord, CableTable};
use voltaic_core::pos::BlockPos;

pub mod cache;
pub mod path;

pub use cache::PathCache;
pub use path::PathResult;

// ---------------------------------------------------------------------------
// Device nodes
// ---------------------------------------------------------------------------

/// A consumer as the graph sees it: a position and a voltage ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumerNode {
    pub position: BlockPos,
    pub max_voltage: f64,
}

/// A generator as the graph sees it: a position and its output voltage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorNode {
    pub position: BlockPos,
    /// Recorded for change detection only; routes never read it.
    pub output_voltage: f64,
}

/// A search frontier entry.
struct Frontier {
    position: BlockPos,
    distance: u32,
    cumulative_loss: f64,
    bottleneck_voltage: f64,
    path: Vec<BlockPos>,
}

// ---------------------------------------------------------------------------
// TopologyGraph
// ---------------------------------------------------------------------------

/// Placement registry plus cached reachability search.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    table: CableTable,
    cables: BTreeMap<BlockPos, CableRecord>,
    consumers: BTreeMap<BlockPos, ConsumerNode>,
    generators: BTreeMap<BlockPos, GeneratorNode>,
    cache: PathCache,
}

impl TopologyGraph {
    /// An empty graph using the stock cable table.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty graph resolving cable tags through `table`.
    pub fn with_cable_table(table: CableTable) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    pub fn cable_table(&self) -> &CableTable {
        &self.table
    }

    // -- Mutation --

    /// Place a cable of type `tag`. Unknown tags are rejected with `false`
    /// and leave the graph and cache untouched. Placing the same type again
    /// is accepted without invalidating; a different type overwrites.
    pub fn add_cable(&mut self, position: BlockPos, tag: &str) -> bool {
        let Some(record) = self.table.record(position, tag) else {
            debug!(%position, tag, "rejected unknown cable type");
            return false;
        };
        if self.cables.get(&position) != Some(&record) {
            self.cables.insert(position, record);
            self.invalidate_cache();
        }
        true
    }

    /// Remove the cable at `position`. Returns whether one existed.
    pub fn remove_cable(&mut self, position: BlockPos) -> bool {
        let removed = self.cables.remove(&position).is_some();
        if removed {
            self.invalidate_cache();
        }
        removed
    }

    /// Register or update a consumer.
    pub fn add_consumer(&mut self, position: BlockPos, max_voltage: f64) {
        let node = ConsumerNode {
            position,
            max_voltage,
        };
        if self.consumers.insert(position, node) != Some(node) {
            self.invalidate_cache();
        }
    }

    /// Unregister a consumer. Returns whether one existed.
    pub fn remove_consumer(&mut self, position: BlockPos) -> bool {
        let removed = self.consumers.remove(&position).is_some();
        if removed {
            self.invalidate_cache();
        }
        removed
    }

    /// Register or update a generator.
    pub fn add_generator(&mut self, position: BlockPos, output_voltage: f64) {
        let node = GeneratorNode {
            position,
            output_voltage,
        };
        if self.generators.insert(position, node) != Some(node) {
            self.invalidate_cache();
        }
    }

    /// Unregister a generator. Returns whether one existed.
    pub fn remove_generator(&mut self, position: BlockPos) -> bool {
        let removed = self.generators.remove(&position).is_some();
        if removed {
            self.invalidate_cache();
        }
        removed
    }

    // -- Cache --

    /// Drop every cached route and bump the cache version.
    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate();
        debug!(version = self.cache.version(), "path cache invalidated");
    }

    pub fn is_cache_valid(&self) -> bool {
        self.cache.is_valid()
    }

    pub fn cache_version(&self) -> u64 {
        self.cache.version()
    }

    /// Compute routes for every registered generator now rather than on
    /// first query. Leaves the cache valid.
    pub fn rebuild_cache(&mut self) {
        let sources: Vec<BlockPos> = self.generators.keys().copied().collect();
        for source in sources {
            self.find_paths(source);
        }
        self.cache.mark_valid();
    }

    fn refresh_validity(&mut self) {
        if self.generators.keys().all(|g| self.cache.contains(*g)) {
            self.cache.mark_valid();
        }
    }

    // -- Queries --

    /// Every consumer reachable from `source`, nearest first.
    ///
    /// Served from the cache when the topology has not changed since the
    /// last search from `source`.
    pub fn find_paths(&mut self, source: BlockPos) -> &[PathResult] {
        if !self.cache.contains(source) {
            let paths = self.search(source);
            trace!(%source, found = paths.len(), version = self.cache.version(), "computed paths");
            self.cache.insert(source, paths);
            self.refresh_validity();
        }
        self.cache.get(source).unwrap_or_default()
    }

    /// The nearest route from `source` able to carry `voltage`.
    pub fn best_path(&mut self, source: BlockPos, voltage: f64) -> Option<PathResult> {
        self.find_paths(source)
            .iter()
            .find(|p| p.can_carry(voltage))
            .cloned()
    }

    /// Positions of every consumer reachable from `source`, nearest first.
    pub fn reachable_consumers(&mut self, source: BlockPos) -> Vec<BlockPos> {
        self.find_paths(source).iter().map(|p| p.target).collect()
    }

    /// Breadth-first search from `source` across cables.
    ///
    /// `source` itself is a virtual frontier entry with no loss and no
    /// ceiling, so its direct neighbours get exactly the seeding rules:
    /// an adjacent consumer is reached at distance 1 with zero loss and its
    /// own ceiling, an adjacent cable starts a route with its own loss and
    /// capacity. Consumers end a route; cables extend it.
    fn search(&self, source: BlockPos) -> Vec<PathResult> {
        let mut results = Vec::new();
        let mut visited: HashSet<BlockPos> = HashSet::new();
        visited.insert(source);

        let mut frontier = VecDeque::new();
        frontier.push_back(Frontier {
            position: source,
            distance: 0,
            cumulative_loss: 0.0,
            bottleneck_voltage: f64::INFINITY,
            path: vec![source],
        });

        while let Some(current) = frontier.pop_front() {
            for neighbor in current.position.neighbors() {
                if visited.contains(&neighbor) {
                    continue;
                }

                if let Some(consumer) = self.consumers.get(&neighbor) {
                    visited.insert(neighbor);
                    let mut path = current.path.clone();
                    path.push(neighbor);
                    results.push(PathResult {
                        target: neighbor,
                        distance: current.distance + 1,
                        cumulative_loss: current.cumulative_loss,
                        bottleneck_voltage: current.bottleneck_voltage.min(consumer.max_voltage),
                        path,
                    });
                } else if let Some(cable) = self.cables.get(&neighbor) {
                    visited.insert(neighbor);
                    let mut path = current.path.clone();
                    path.push(neighbor);
                    frontier.push_back(Frontier {
                        position: neighbor,
                        distance: current.distance + 1,
                        cumulative_loss: current.cumulative_loss + cable.loss_per_block,
                        bottleneck_voltage: current.bottleneck_voltage.min(cable.capacity),
                        path,
                    });
                }
            }
        }

        results
    }

    // -- Listing --

    /// All cables in ascending position order.
    pub fn get_cables(&self) -> Vec<&CableRecord> {
        self.cables.values().collect()
    }

    /// All consumers in ascending position order.
    pub fn get_consumers(&self) -> Vec<ConsumerNode> {
        self.consumers.values().copied().collect()
    }

    /// All generators in ascending position order.
    pub fn get_generators(&self) -> Vec<GeneratorNode> {
        self.generators.values().copied().collect()
    }

    pub fn cable_at(&self, position: BlockPos) -> Option<&CableRecord> {
        self.cables.get(&position)
    }

    pub fn has_consumer(&self, position: BlockPos) -> bool {
        self.consumers.contains_key(&position)
    }

    pub fn has_generator(&self, position: BlockPos) -> bool {
        self.generators.contains_key(&position)
    }

    pub fn cable_count(&self) -> usize {
        self.cables.len()
    }

    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    pub fn generator_count(&self) -> usize {
        self.generators.len()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
