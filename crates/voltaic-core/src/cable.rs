//! Cable types and their capacity/loss table.
//!
//! A cable is described entirely by its tag. The tag resolves through a
//! [`CableTable`] into a [`CableSpec`]: the highest voltage the cable
//! carries without burning, and the EU lost per block travelled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pos::BlockPos;

pub const TIN: &str = "tin";
pub const COPPER: &str = "copper";
pub const GOLD: &str = "gold";
pub const IRON_HV: &str = "iron-hv";
pub const GLASS_FIBRE: &str = "glass-fibre";

/// Errors from building a cable table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CableTableError {
    #[error("cable '{tag}' has invalid capacity {capacity} (must be positive)")]
    InvalidCapacity { tag: String, capacity: f64 },
    #[error("cable '{tag}' has invalid loss {loss} (must be finite and non-negative)")]
    InvalidLoss { tag: String, loss: f64 },
    #[error("cable tag must not be empty")]
    EmptyTag,
    #[error("duplicate cable tag '{0}'")]
    DuplicateTag(String),
}

// ---------------------------------------------------------------------------
// Specs and records
// ---------------------------------------------------------------------------

/// Electrical properties of one cable type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CableSpec {
    /// Voltage ceiling. Packets above this burn the cable.
    pub capacity: f64,
    /// EU lost per block of cable travelled.
    pub loss_per_block: f64,
}

impl CableSpec {
    pub const fn new(capacity: f64, loss_per_block: f64) -> Self {
        Self {
            capacity,
            loss_per_block,
        }
    }
}

/// A placed cable segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableRecord {
    pub position: BlockPos,
    pub tag: String,
    pub capacity: f64,
    pub loss_per_block: f64,
}

impl CableRecord {
    /// Whether a packet at `voltage` exceeds this cable's ceiling.
    pub fn is_overloaded_by(&self, voltage: f64) -> bool {
        voltage > self.capacity
    }
}

// ---------------------------------------------------------------------------
// CableTable
// ---------------------------------------------------------------------------

/// Lookup table from cable tag to [`CableSpec`].
///
/// [`CableTable::standard`] (also the `Default`) holds the five stock
/// cables. Custom tables are built with [`CableTable::insert`] or loaded
/// from data files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableTable {
    specs: BTreeMap<String, CableSpec>,
}

impl Default for CableTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl CableTable {
    /// A table with no cable types.
    pub fn empty() -> Self {
        Self {
            specs: BTreeMap::new(),
        }
    }

    /// The stock cable set.
    pub fn standard() -> Self {
        let specs = [
            (TIN, CableSpec::new(32.0, 0.025)),
            (COPPER, CableSpec::new(128.0, 0.2)),
            (GOLD, CableSpec::new(512.0, 0.4)),
            (IRON_HV, CableSpec::new(2048.0, 0.8)),
            (GLASS_FIBRE, CableSpec::new(8192.0, 0.025)),
        ]
        .into_iter()
        .map(|(tag, spec)| (tag.to_string(), spec))
        .collect();
        Self { specs }
    }

    /// Build a table from `(tag, spec)` pairs, rejecting duplicates.
    pub fn from_specs<I, S>(entries: I) -> Result<Self, CableTableError>
    where
        I: IntoIterator<Item = (S, CableSpec)>,
        S: Into<String>,
    {
        let mut table = Self::empty();
        for (tag, spec) in entries {
            let tag = tag.into();
            if table.contains(&tag) {
                return Err(CableTableError::DuplicateTag(tag));
            }
            table.insert(tag, spec)?;
        }
        Ok(table)
    }

    /// Add or replace a cable type after validating it.
    pub fn insert(&mut self, tag: impl Into<String>, spec: CableSpec) -> Result<(), CableTableError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(CableTableError::EmptyTag);
        }
        if spec.capacity.is_nan() || spec.capacity <= 0.0 {
            return Err(CableTableError::InvalidCapacity {
                tag,
                capacity: spec.capacity,
            });
        }
        if !spec.loss_per_block.is_finite() || spec.loss_per_block < 0.0 {
            return Err(CableTableError::InvalidLoss {
                tag,
                loss: spec.loss_per_block,
            });
        }
        self.specs.insert(tag, spec);
        Ok(())
    }

    pub fn get(&self, tag: &str) -> Option<CableSpec> {
        self.specs.get(tag).copied()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.specs.contains_key(tag)
    }

    /// Build the record for a cable of type `tag` placed at `position`.
    /// Returns `None` for unknown tags.
    pub fn record(&self, position: BlockPos, tag: &str) -> Option<CableRecord> {
        self.get(tag).map(|spec| CableRecord {
            position,
            tag: tag.to_string(),
            capacity: spec.capacity,
            loss_per_block: spec.loss_per_block,
        })
    }

    /// Known tags in ascending order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Voltage tiers
// ---------------------------------------------------------------------------

/// Named voltage ceilings shared by cables and machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VoltageTier {
    Low,
    Medium,
    High,
    Extreme,
    Insane,
}

impl VoltageTier {
    pub const ALL: [VoltageTier; 5] = [
        VoltageTier::Low,
        VoltageTier::Medium,
        VoltageTier::High,
        VoltageTier::Extreme,
        VoltageTier::Insane,
    ];

    /// Highest voltage this tier tolerates.
    pub fn max_voltage(self) -> f64 {
        match self {
            VoltageTier::Low => 32.0,
            VoltageTier::Medium => 128.0,
            VoltageTier::High => 512.0,
            VoltageTier::Extreme => 2048.0,
            VoltageTier::Insane => 8192.0,
        }
    }

    /// Lowest tier able to carry `voltage`, or `None` above the top tier.
    pub fn for_voltage(voltage: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| voltage <= t.max_voltage())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
