//! Packet formulas and delivery outcomes.
//!
//! A packet is a bounded amount of EU tagged with a voltage. These pure
//! functions decide how much survives the trip and whether the voltage
//! destroys whatever it reaches.

use serde::{Deserialize, Serialize};

use crate::pos::BlockPos;

/// Voltage is divided by this to get the explosion force.
pub const EXPLOSION_FORCE_DIVISOR: f64 = 20.0;

/// EU left after travelling `distance` blocks at `loss_per_block`:
/// `max(0, start_energy - loss_per_block * distance)`.
#[inline]
pub fn apply_loss(start_energy: f64, loss_per_block: f64, distance: u32) -> f64 {
    (start_energy - loss_per_block * f64::from(distance)).max(0.0)
}

/// Whether `voltage` exceeds a ceiling of `max_voltage`.
#[inline]
pub fn should_explode(voltage: f64, max_voltage: f64) -> bool {
    voltage > max_voltage
}

/// Explosion force caused by an overvoltage at `voltage`.
#[inline]
pub fn explosion_force(voltage: f64) -> f64 {
    voltage / EXPLOSION_FORCE_DIVISOR
}

/// A bounded amount of EU moving at one voltage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub energy: f64,
    pub voltage: f64,
}

impl Packet {
    pub const fn new(energy: f64, voltage: f64) -> Self {
        Self { energy, voltage }
    }

    /// Whether the packet carries any energy at all. NaN counts as empty.
    pub fn is_empty(&self) -> bool {
        self.energy.is_nan() || self.energy <= 0.0
    }

    /// The same voltage with a different energy amount.
    pub fn with_energy(self, energy: f64) -> Self {
        Self { energy, ..self }
    }
}

/// Outcome of one delivery attempt against one block.
///
/// Exactly one of three shapes:
/// - delivered: `accepted`, `eu_delivered > 0`
/// - nothing happened: `!accepted`, `eu_delivered == 0`, `!exploded`
/// - exploded: `exploded`, `explosion_force` set, nothing delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketResult {
    /// The consumer that received the packet, or the cable/consumer that burned.
    pub target: BlockPos,
    /// Grid steps from the source to `target`.
    pub hops: u32,
    pub accepted: bool,
    pub eu_delivered: f64,
    pub exploded: bool,
    pub explosion_force: Option<f64>,
}

impl PacketResult {
    /// A delivery of `applied` EU. Zero or less counts as not accepted.
    pub fn delivered(target: BlockPos, hops: u32, applied: f64) -> Self {
        let applied = applied.max(0.0);
        Self {
            target,
            hops,
            accepted: applied > 0.0,
            eu_delivered: applied,
            exploded: false,
            explosion_force: None,
        }
    }

    /// Nothing was delivered and nothing broke.
    pub fn nothing(target: BlockPos, hops: u32) -> Self {
        Self::delivered(target, hops, 0.0)
    }

    /// `target` was destroyed by a packet at `voltage`.
    pub fn exploded(target: BlockPos, hops: u32, voltage: f64) -> Self {
        Self {
            target,
            hops,
            accepted: false,
            eu_delivered: 0.0,
            exploded: true,
            explosion_force: Some(explosion_force(voltage)),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
