//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::device::{DeviceRegistry, EnergyBuffer};
use crate::id::DeviceId;
use crate::pos::BlockPos;

// ===========================================================================
// Positions
// ===========================================================================

pub fn pos(x: i32, y: i32, z: i32) -> BlockPos {
    BlockPos::new(x, y, z)
}

/// Blocks `(from_x..=to_x, 0, 0)` along the X axis.
pub fn x_line(from_x: i32, to_x: i32) -> Vec<BlockPos> {
    (from_x..=to_x).map(|x| pos(x, 0, 0)).collect()
}

/// A `width` x `depth` sheet of positions on the Y=0 plane.
pub fn flat_grid(width: i32, depth: i32) -> Vec<BlockPos> {
    (0..depth)
        .flat_map(|z| (0..width).map(move |x| pos(x, 0, z)))
        .collect()
}

// ===========================================================================
// Devices
// ===========================================================================

/// An empty machine buffer.
pub fn machine(registry: &mut DeviceRegistry, capacity: f64) -> DeviceId {
    registry.insert(EnergyBuffer::new(capacity))
}

/// A buffer that starts with `stored` EU, typically a generator.
pub fn charged(registry: &mut DeviceRegistry, capacity: f64, stored: f64) -> DeviceId {
    registry.insert(EnergyBuffer::with_energy(capacity, stored))
}

/// Compare two EU amounts with a tolerance suited to summed cable losses.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_line_is_inclusive() {
        let line = x_line(0, 4);
        assert_eq!(line.len(), 5);
        assert_eq!(line[0], pos(0, 0, 0));
        assert_eq!(line[4], pos(4, 0, 0));
    }

    #[test]
    fn flat_grid_size() {
        assert_eq!(flat_grid(3, 4).len(), 12);
    }

    #[test]
    fn device_helpers() {
        let mut reg = DeviceRegistry::new();
        let m = machine(&mut reg, 100.0);
        let g = charged(&mut reg, 100.0, 60.0);
        assert_eq!(reg.stored_energy(m), Some(0.0));
        assert_eq!(reg.stored_energy(g), Some(60.0));
    }
}
