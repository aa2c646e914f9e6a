//! Cable network example: routing, delivery, loss and an overvoltage.
//!
//! Builds a small network by hand, prints the routes the topology graph
//! finds, runs a few distribution ticks, then overloads a tin cable.
//!
//! Run with: `RUST_LOG=debug cargo run -p voltaic-examples --example cable_network`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voltaic_core::cable::{COPPER, GOLD, TIN, VoltageTier};
use voltaic_core::device::{DeviceAccess, DeviceRegistry, EnergyBuffer};
use voltaic_core::pos::BlockPos;
use voltaic_graph::TopologyGraph;
use voltaic_transmission::TransmissionNetwork;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut graph = TopologyGraph::new();
    let mut network = TransmissionNetwork::new();
    let mut devices = DeviceRegistry::new();

    // --- Layout ---
    //
    //   generator (0,0,0) -- copper (1,0,0) -- macerator (2,0,0)
    //                     \- gold (0,1,0) ---- gold (0,2,0) -- furnace (0,3,0)

    let generator_pos = BlockPos::new(0, 0, 0);
    let generator = devices.insert(EnergyBuffer::with_energy(4000.0, 1000.0));
    graph.add_generator(generator_pos, VoltageTier::Low.max_voltage());
    network.register_generator(generator_pos, VoltageTier::Low.max_voltage(), 32.0, generator);

    for (pos, tag) in [
        (BlockPos::new(1, 0, 0), COPPER),
        (BlockPos::new(0, 1, 0), GOLD),
        (BlockPos::new(0, 2, 0), GOLD),
    ] {
        graph.add_cable(pos, tag);
        network.add_cable(pos, tag);
    }

    let macerator_pos = BlockPos::new(2, 0, 0);
    let macerator = devices.insert(EnergyBuffer::new(800.0));
    graph.add_consumer(macerator_pos, VoltageTier::Low.max_voltage());
    network.register_consumer(macerator_pos, VoltageTier::Low.max_voltage(), 32.0, macerator);

    let furnace_pos = BlockPos::new(0, 3, 0);
    let furnace = devices.insert(EnergyBuffer::new(800.0));
    graph.add_consumer(furnace_pos, VoltageTier::Low.max_voltage());
    network.register_consumer(furnace_pos, VoltageTier::Low.max_voltage(), 32.0, furnace);

    // --- Routes ---

    println!("=== Routes from {generator_pos} ===");
    for path in graph.find_paths(generator_pos) {
        println!(
            "  -> {}: {} hops, loss {:.3} EU, safe up to {} V",
            path.target, path.distance, path.cumulative_loss, path.bottleneck_voltage
        );
    }
    println!("  cache version {}, valid: {}", graph.cache_version(), graph.is_cache_valid());

    // --- Local delivery ---
    //
    // The macerator sits one cable away and is fed every tick. The furnace is
    // two cables away, so it only gets energy along the graph's route.

    println!("\n=== Distribution ===");
    for tick in 1..=3 {
        let outcomes = network.distribute_energy(&mut devices);
        let delivered: f64 = outcomes.iter().map(|o| o.delivered()).sum();
        println!("  tick {tick}: delivered {delivered:.3} EU");
    }

    let furnace_route = graph
        .find_paths(generator_pos)
        .iter()
        .find(|p| p.target == furnace_pos)
        .cloned();
    if let Some(path) = furnace_route {
        let voltage = VoltageTier::Low.max_voltage();
        let result = network.send_along_path(&path, 32.0, voltage, &mut devices);
        if let Some(source) = devices.device_mut(generator) {
            source.remove_energy(result.eu_delivered);
        }
        println!("  routed to furnace: {:.3} EU", result.eu_delivered);
    }

    print_stored("generator", &devices, generator);
    print_stored("macerator", &devices, macerator);
    print_stored("furnace", &devices, furnace);

    // --- Overvoltage ---

    println!("\n=== Overvoltage ===");
    let tin_pos = BlockPos::new(-1, 0, 0);
    graph.add_cable(tin_pos, TIN);
    network.add_cable(tin_pos, TIN);
    println!("  placed tin cable at {tin_pos}; cache valid: {}", graph.is_cache_valid());

    let voltage = VoltageTier::Medium.max_voltage();
    let results = network.send_packet(generator_pos, 100.0, voltage, &mut devices);
    for result in results.iter().filter(|r| r.exploded) {
        println!(
            "  {} exploded with force {:.1}",
            result.target,
            result.explosion_force.unwrap_or_default()
        );
        graph.remove_cable(result.target);
        network.remove_cable(result.target);
        graph.remove_consumer(result.target);
        network.unregister_consumer(result.target);
    }
    println!("  cables left: {}", network.cable_count());
}

fn print_stored(name: &str, devices: &DeviceRegistry, id: voltaic_core::id::DeviceId) {
    if let Some(stored) = devices.stored_energy(id) {
        println!("  {name}: {stored:.3} EU stored");
    }
}
