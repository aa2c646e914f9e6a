//! Data-driven example: load a cable table and layout, then run it.
//!
//! Reads `data/workshop/` (or the directory given as the first argument),
//! delivers along every route the graph finds, and reports what burned.
//!
//! Run with: `cargo run -p voltaic-examples --example workshop_layout [dir]`

use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voltaic_core::device::DeviceAccess;
use voltaic_data::build_from_dir;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/workshop"));

    let mut built = build_from_dir(&dir)?;
    tracing::info!(dir = %dir.display(), "layout built");
    println!("Loaded {}", dir.display());
    println!(
        "  {} cable types, {} cables, {} consumers, {} generators",
        built.network.cable_table().len(),
        built.network.cable_count(),
        built.network.consumer_count(),
        built.network.generator_count()
    );

    let generators: Vec<_> = built.network.get_generators().into_iter().copied().collect();
    for generator in generators {
        println!("\n=== Generator at {} ({} V) ===", generator.position, generator.output_voltage);

        let paths = built.graph.find_paths(generator.position).to_vec();
        for path in &paths {
            let result = built.network.send_along_path(
                path,
                generator.packet_size,
                generator.output_voltage,
                &mut built.devices,
            );
            if let Some(device) = built.devices.device_mut(generator.device) {
                device.remove_energy(result.eu_delivered);
            }

            if result.exploded {
                println!(
                    "  {} BURNED (force {:.1})",
                    result.target,
                    result.explosion_force.unwrap_or_default()
                );
            } else {
                println!(
                    "  {} <- {:.3} EU over {} hops (loss {:.3})",
                    result.target, result.eu_delivered, path.distance, path.cumulative_loss
                );
            }
        }

        if let Some(stored) = built.devices.stored_energy(generator.device) {
            println!("  generator has {stored:.3} EU left");
        }
    }

    Ok(())
}
