//! Packet transmission for the Voltaic energy network.
//!
//! Holds the authoritative consumer, generator and cable records and moves
//! energy between them in packets. Delivery is a bounded local walk: a
//! packet reaches consumers touching the source directly, or consumers
//! touching a cable that touches the source. Full multi-hop routes come from
//! [`voltaic_graph::TopologyGraph`] and are delivered with
//! [`TransmissionNetwork::send_along_path`].
//!
//! # Design
//!
//! - Records hold a [`DeviceId`]; the energy itself lives in devices reached
//!   through [`DeviceAccess`], passed into every delivery call.
//! - Overvoltage is an outcome, not an error. An exploded cable or consumer
//!   is reported in the [`PacketResult`] and the caller destroys the block.
//! - A packet is one energy budget. Each delivery is offered what is left
//!   and the budget shrinks by what the consumer actually accepted.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use voltaic_core::cable::{CableRecord, CableTable};
use voltaic_core::device::DeviceAccess;
use voltaic_core::id::DeviceId;
use voltaic_core::packet::{Packet, PacketResult, apply_loss, should_explode};
use voltaic_core::pos::BlockPos;
use voltaic_graph::PathResult;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Routing descriptor for a machine that accepts energy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumerRecord {
    pub position: BlockPos,
    /// Packets above this voltage destroy the consumer.
    pub max_voltage: f64,
    /// Most EU accepted from a single packet.
    pub max_input: f64,
    pub device: DeviceId,
}

/// Routing descriptor for a machine that emits energy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorRecord {
    pub position: BlockPos,
    /// Voltage of every packet this generator sends.
    pub output_voltage: f64,
    /// Most EU pulled from the device per distribution pass.
    pub packet_size: f64,
    pub device: DeviceId,
}

impl ConsumerRecord {
    /// Deliver `packet` to this consumer after `total_loss * distance` EU
    /// of transit loss.
    ///
    /// Overvoltage is checked first and leaves the device untouched.
    /// Otherwise the post-loss energy is clamped to `max_input` and to the
    /// device's free space, and the device's `add_energy` has the final
    /// word on what is applied. A stale device id delivers nothing.
    pub fn receive_packet<D: DeviceAccess + ?Sized>(
        &self,
        packet: Packet,
        total_loss: f64,
        distance: u32,
        hops: u32,
        devices: &mut D,
    ) -> PacketResult {
        if should_explode(packet.voltage, self.max_voltage) {
            warn!(
                position = %self.position,
                voltage = packet.voltage,
                max_voltage = self.max_voltage,
                "consumer overvolted"
            );
            return PacketResult::exploded(self.position, hops, packet.voltage);
        }

        let Some(device) = devices.device_mut(self.device) else {
            debug!(position = %self.position, "consumer has no live device");
            return PacketResult::nothing(self.position, hops);
        };

        let offered = apply_loss(packet.energy, total_loss, distance)
            .min(self.max_input)
            .min(device.remaining_capacity());
        let applied = if offered > 0.0 {
            device.add_energy(offered)
        } else {
            0.0
        };

        trace!(position = %self.position, offered, applied, hops, "packet received");
        PacketResult::delivered(self.position, hops, applied)
    }
}

/// Offer the remaining `budget` of `packet` to `consumer`.
///
/// A spent budget only reaches a consumer the packet's voltage destroys;
/// anyone else gets no result.
fn deliver<D: DeviceAccess + ?Sized>(
    consumer: &ConsumerRecord,
    packet: Packet,
    budget: f64,
    loss_per_block: f64,
    hops: u32,
    devices: &mut D,
) -> Option<PacketResult> {
    if budget <= 0.0 && !should_explode(packet.voltage, consumer.max_voltage) {
        return None;
    }
    let packet = packet.with_energy(budget.max(0.0));
    Some(consumer.receive_packet(packet, loss_per_block, 1, hops, devices))
}

// ---------------------------------------------------------------------------
// Distribution outcome
// ---------------------------------------------------------------------------

/// What one generator did during [`TransmissionNetwork::distribute_energy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionOutcome {
    pub source: BlockPos,
    /// EU put into the packet: `min(stored, packet_size)`.
    pub offered: f64,
    /// EU actually removed from the generator.
    pub debited: f64,
    pub results: Vec<PacketResult>,
}

impl DistributionOutcome {
    /// Total EU accepted by consumers.
    pub fn delivered(&self) -> f64 {
        self.results.iter().map(|r| r.eu_delivered).sum()
    }

    /// Results for blocks destroyed by this generator's packet.
    pub fn explosions(&self) -> impl Iterator<Item = &PacketResult> {
        self.results.iter().filter(|r| r.exploded)
    }
}

// ---------------------------------------------------------------------------
// TransmissionNetwork
// ---------------------------------------------------------------------------

/// Registry of devices and cables plus the packet delivery protocol.
#[derive(Debug, Clone, Default)]
pub struct TransmissionNetwork {
    table: CableTable,
    cables: BTreeMap<BlockPos, CableRecord>,
    consumers: BTreeMap<BlockPos, ConsumerRecord>,
    generators: BTreeMap<BlockPos, GeneratorRecord>,
}

impl TransmissionNetwork {
    /// An empty network using the stock cable table.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cable_table(table: CableTable) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    pub fn cable_table(&self) -> &CableTable {
        &self.table
    }

    // -- Registration --

    /// Place a cable. Unknown tags are rejected with `false`.
    pub fn add_cable(&mut self, position: BlockPos, tag: &str) -> bool {
        let Some(record) = self.table.record(position, tag) else {
            debug!(%position, tag, "rejected unknown cable type");
            return false;
        };
        self.cables.insert(position, record);
        true
    }

    pub fn remove_cable(&mut self, position: BlockPos) -> bool {
        self.cables.remove(&position).is_some()
    }

    /// Register or replace the consumer at `position`.
    pub fn register_consumer(
        &mut self,
        position: BlockPos,
        max_voltage: f64,
        max_input: f64,
        device: DeviceId,
    ) {
        self.consumers.insert(
            position,
            ConsumerRecord {
                position,
                max_voltage,
                max_input,
                device,
            },
        );
    }

    pub fn unregister_consumer(&mut self, position: BlockPos) -> Option<ConsumerRecord> {
        self.consumers.remove(&position)
    }

    /// Register or replace the generator at `position`.
    pub fn register_generator(
        &mut self,
        position: BlockPos,
        output_voltage: f64,
        packet_size: f64,
        device: DeviceId,
    ) {
        self.generators.insert(
            position,
            GeneratorRecord {
                position,
                output_voltage,
                packet_size,
                device,
            },
        );
    }

    pub fn unregister_generator(&mut self, position: BlockPos) -> Option<GeneratorRecord> {
        self.generators.remove(&position)
    }

    // -- Delivery --

    /// Send `energy` EU at `voltage` out of `source`.
    ///
    /// Neighbours are visited in fixed direction order. A consumer receives
    /// directly with no loss. A cable whose capacity is below `voltage`
    /// explodes and carries nothing further; otherwise every consumer
    /// touching the cable receives with one block of that cable's loss.
    /// Each consumer is served once per packet. Once the budget is spent
    /// the walk still visits every neighbour: overloaded cables and
    /// overvolted consumers are reported, the rest are passed over.
    /// Non-positive `energy` returns no results.
    pub fn send_packet<D: DeviceAccess + ?Sized>(
        &self,
        source: BlockPos,
        energy: f64,
        voltage: f64,
        devices: &mut D,
    ) -> Vec<PacketResult> {
        let packet = Packet::new(energy, voltage);
        if packet.is_empty() {
            return Vec::new();
        }

        let mut budget = energy;
        let mut served: HashSet<BlockPos> = HashSet::new();
        let mut results = Vec::new();

        for neighbor in source.neighbors() {
            if let Some(consumer) = self.consumers.get(&neighbor) {
                if !served.insert(neighbor) {
                    continue;
                }
                if let Some(result) = deliver(consumer, packet, budget, 0.0, 1, devices) {
                    budget -= result.eu_delivered;
                    results.push(result);
                }
                continue;
            }

            let Some(cable) = self.cables.get(&neighbor) else {
                continue;
            };
            if cable.is_overloaded_by(voltage) {
                warn!(
                    position = %neighbor,
                    voltage,
                    capacity = cable.capacity,
                    "cable overvolted"
                );
                results.push(PacketResult::exploded(neighbor, 1, voltage));
                continue;
            }

            for far in neighbor.neighbors() {
                if far == source {
                    continue;
                }
                let Some(consumer) = self.consumers.get(&far) else {
                    continue;
                };
                if !served.insert(far) {
                    continue;
                }
                if let Some(result) =
                    deliver(consumer, packet, budget, cable.loss_per_block, 2, devices)
                {
                    budget -= result.eu_delivered;
                    results.push(result);
                }
            }
        }

        results
    }

    /// Deliver along a route computed by the topology graph.
    ///
    /// The first cable on the route that cannot carry `voltage` explodes.
    /// Otherwise the target consumer receives `energy` less the route's
    /// cumulative loss. A route that no longer matches the registered
    /// cables or consumer delivers nothing.
    pub fn send_along_path<D: DeviceAccess + ?Sized>(
        &self,
        path: &PathResult,
        energy: f64,
        voltage: f64,
        devices: &mut D,
    ) -> PacketResult {
        let packet = Packet::new(energy, voltage);
        if packet.is_empty() {
            return PacketResult::nothing(path.target, path.distance);
        }

        for (step, position) in (1u32..).zip(path.cables()) {
            let Some(cable) = self.cables.get(position) else {
                debug!(%position, target = %path.target, "route crosses a missing cable");
                return PacketResult::nothing(path.target, path.distance);
            };
            if cable.is_overloaded_by(voltage) {
                warn!(
                    position = %position,
                    voltage,
                    capacity = cable.capacity,
                    "cable overvolted"
                );
                return PacketResult::exploded(*position, step, voltage);
            }
        }

        match self.consumers.get(&path.target) {
            Some(consumer) => {
                consumer.receive_packet(packet, path.cumulative_loss, 1, path.distance, devices)
            }
            None => PacketResult::nothing(path.target, path.distance),
        }
    }

    /// Run every generator once, in position order.
    ///
    /// Each generator offers `min(stored, packet_size)` EU through
    /// [`send_packet`](Self::send_packet) and is debited exactly what its
    /// consumers accepted. Generators with nothing stored, no live device
    /// or nobody to deliver to are skipped.
    pub fn distribute_energy<D: DeviceAccess + ?Sized>(
        &self,
        devices: &mut D,
    ) -> Vec<DistributionOutcome> {
        let mut outcomes = Vec::new();

        for generator in self.generators.values() {
            let Some(stored) = devices.device(generator.device).map(|d| d.stored_energy()) else {
                debug!(position = %generator.position, "generator has no live device");
                continue;
            };
            let offered = stored.min(generator.packet_size);
            if offered.is_nan() || offered <= 0.0 {
                continue;
            }

            let results =
                self.send_packet(generator.position, offered, generator.output_voltage, devices);
            if results.is_empty() {
                continue;
            }

            let accepted: f64 = results.iter().map(|r| r.eu_delivered).sum();
            let debited = match devices.device_mut(generator.device) {
                Some(device) if accepted > 0.0 => device.remove_energy(accepted),
                _ => 0.0,
            };
            debug!(
                position = %generator.position,
                offered,
                debited,
                deliveries = results.len(),
                "generator distributed"
            );

            outcomes.push(DistributionOutcome {
                source: generator.position,
                offered,
                debited,
                results,
            });
        }

        outcomes
    }

    // -- Observers --

    /// All cables in ascending position order.
    pub fn get_cables(&self) -> Vec<&CableRecord> {
        self.cables.values().collect()
    }

    /// All consumers in ascending position order.
    pub fn get_consumers(&self) -> Vec<&ConsumerRecord> {
        self.consumers.values().collect()
    }

    /// All generators in ascending position order.
    pub fn get_generators(&self) -> Vec<&GeneratorRecord> {
        self.generators.values().collect()
    }

    pub fn cable_at(&self, position: BlockPos) -> Option<&CableRecord> {
        self.cables.get(&position)
    }

    pub fn consumer_at(&self, position: BlockPos) -> Option<&ConsumerRecord> {
        self.consumers.get(&position)
    }

    pub fn generator_at(&self, position: BlockPos) -> Option<&GeneratorRecord> {
        self.generators.get(&position)
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
