//! Voltaic Core -- shared building blocks for the energy network engine.
//!
//! This crate holds everything the topology graph and the transmission
//! network agree on: how blocks are addressed, which cable types exist and
//! what they can carry, how devices expose their energy buffers, and the
//! pure formulas that decide what a packet delivers or destroys.
//!
//! # Key Types
//!
//! - [`pos::BlockPos`] -- integer block coordinates, the key of every registry.
//! - [`pos::Direction`] -- the six axis-aligned neighbours (+X, -X, +Y, -Y, +Z, -Z).
//! - [`cable::CableTable`] -- capacity/loss lookup keyed by cable tag.
//! - [`device::EnergyDevice`] -- capability trait for anything that stores EU.
//! - [`device::DeviceRegistry`] -- slotmap-backed owner of boxed devices.
//! - [`packet::Packet`] -- an energy amount tagged with a voltage.
//! - [`packet::PacketResult`] -- the outcome of a single delivery attempt.
//!
//! # Formulas
//!
//! ```
//! use voltaic_core::packet::{apply_loss, explosion_force, should_explode};
//!
//! assert_eq!(apply_loss(32.0, 0.0, 4), 32.0);
//! assert!(should_explode(129.0, 128.0));
//! assert_eq!(explosion_force(512.0), 25.6);
//! ```

pub mod cable;
pub mod device;
pub mod id;
pub mod packet;
pub mod pos;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
