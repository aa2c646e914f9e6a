//! Device energy capability.
//!
//! Generators and machines share nothing except an energy buffer, so the
//! engine talks to them through the [`EnergyDevice`] trait and reaches them
//! by [`DeviceId`] through [`DeviceAccess`]. Records in the graph and the
//! network only ever hold the id.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::id::DeviceId;

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Anything that stores EU.
pub trait EnergyDevice {
    /// EU currently stored.
    fn stored_energy(&self) -> f64;

    /// Maximum EU the device can hold.
    fn capacity(&self) -> f64;

    /// Store up to `amount` EU. Returns what was actually added, which is
    /// clamped to the remaining capacity.
    fn add_energy(&mut self, amount: f64) -> f64;

    /// Drain up to `amount` EU. Returns what was actually removed.
    fn remove_energy(&mut self, amount: f64) -> f64;

    fn remaining_capacity(&self) -> f64 {
        (self.capacity() - self.stored_energy()).max(0.0)
    }
}

/// Lookup from [`DeviceId`] to a live device.
pub trait DeviceAccess {
    fn device(&self, id: DeviceId) -> Option<&dyn EnergyDevice>;
    fn device_mut(&mut self, id: DeviceId) -> Option<&mut dyn EnergyDevice>;
}

impl<D: EnergyDevice + 'static> DeviceAccess for SlotMap<DeviceId, D> {
    fn device(&self, id: DeviceId) -> Option<&dyn EnergyDevice> {
        let device = self.get(id)?;
        Some(device)
    }

    fn device_mut(&mut self, id: DeviceId) -> Option<&mut dyn EnergyDevice> {
        let device = self.get_mut(id)?;
        Some(device)
    }
}

// ---------------------------------------------------------------------------
// EnergyBuffer
// ---------------------------------------------------------------------------

/// A plain clamped EU store. Suitable as the buffer of a machine or as a
/// stand-in device in tests and demos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyBuffer {
    stored: f64,
    capacity: f64,
}

impl EnergyBuffer {
    /// An empty buffer. Negative capacities are treated as zero.
    pub fn new(capacity: f64) -> Self {
        Self {
            stored: 0.0,
            capacity: capacity.max(0.0),
        }
    }

    /// A buffer pre-filled with `stored` EU (clamped to `[0, capacity]`).
    pub fn with_energy(capacity: f64, stored: f64) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            stored: stored.clamp(0.0, capacity),
            capacity,
        }
    }

    pub fn is_full(&self) -> bool {
        self.stored >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.stored <= 0.0
    }
}

impl EnergyDevice for EnergyBuffer {
    fn stored_energy(&self) -> f64 {
        self.stored
    }

    fn capacity(&self) -> f64 {
        self.capacity
    }

    fn add_energy(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let added = amount.min(self.remaining_capacity());
        self.stored += added;
        added
    }

    fn remove_energy(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let removed = amount.min(self.stored);
        self.stored -= removed;
        removed
    }
}

// ---------------------------------------------------------------------------
// DeviceRegistry
// ---------------------------------------------------------------------------

/// Owner of heterogeneous devices, keyed by [`DeviceId`].
#[derive(Default)]
pub struct DeviceRegistry {
    devices: SlotMap<DeviceId, Box<dyn EnergyDevice>>,
}

impl std::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("devices", &self.devices.len())
            .finish()
    }
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<D: EnergyDevice + 'static>(&mut self, device: D) -> DeviceId {
        self.devices.insert(Box::new(device))
    }

    pub fn remove(&mut self, id: DeviceId) -> Option<Box<dyn EnergyDevice>> {
        self.devices.remove(id)
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        self.devices.contains_key(id)
    }

    /// Stored EU of a device, or `None` if the id is stale.
    pub fn stored_energy(&self, id: DeviceId) -> Option<f64> {
        self.devices.get(id).map(|d| d.stored_energy())
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl DeviceAccess for DeviceRegistry {
    fn device(&self, id: DeviceId) -> Option<&dyn EnergyDevice> {
        let device = self.devices.get(id)?;
        Some(&**device)
    }

    fn device_mut(&mut self, id: DeviceId) -> Option<&mut dyn EnergyDevice> {
        let device = self.devices.get_mut(id)?;
        Some(&mut **device)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
