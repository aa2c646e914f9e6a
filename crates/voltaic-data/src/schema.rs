//! Serde structs for network data files.
//!
//! Two files describe a network: a cable table (`cables.*`) listing cable
//! types, and a layout (`layout.*`) placing cables, consumers and
//! generators. Positions are written as `"x,y,z"` keys. Both files may be
//! RON, JSON or TOML.

use serde::{Deserialize, Serialize};

// ===========================================================================
// Cable table
// ===========================================================================

/// One cable type in a cable table file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableData {
    pub tag: String,
    pub capacity: f64,
    pub loss_per_block: f64,
}

// ===========================================================================
// Layout
// ===========================================================================

/// A placed cable segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CablePlacement {
    pub at: String,
    pub tag: String,
}

/// A consumer and the buffer that backs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerData {
    pub at: String,
    pub max_voltage: f64,
    pub max_input: f64,
    pub capacity: f64,
    #[serde(default)]
    pub stored: f64,
}

/// A generator and the buffer it drains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorData {
    pub at: String,
    pub output_voltage: f64,
    pub packet_size: f64,
    pub capacity: f64,
    #[serde(default)]
    pub stored: f64,
}

/// Everything placed in one network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutData {
    #[serde(default)]
    pub cables: Vec<CablePlacement>,
    #[serde(default)]
    pub consumers: Vec<ConsumerData>,
    #[serde(default)]
    pub generators: Vec<GeneratorData>,
}

impl LayoutData {
    /// Total number of placements of any kind.
    pub fn len(&self) -> usize {
        self.cables.len() + self.consumers.len() + self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
