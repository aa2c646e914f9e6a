//! Turns loaded data into live engine objects.
//!
//! A layout is applied to a fresh [`TopologyGraph`] and
//! [`TransmissionNetwork`] sharing one cable table, with an
//! [`EnergyBuffer`] created in a [`DeviceRegistry`] for every consumer and
//! generator.

use std::path::Path;

use tracing::info;
use voltaic_core::cable::CableTable;
use voltaic_core::device::{DeviceRegistry, EnergyBuffer};
use voltaic_graph::TopologyGraph;
use voltaic_transmission::TransmissionNetwork;

use crate::loader::{DataLoadError, NetworkData, load_from_dir, parse_position};
use crate::schema::LayoutData;

/// A graph, network and device store built from one layout.
#[derive(Debug)]
pub struct BuiltNetwork {
    pub graph: TopologyGraph,
    pub network: TransmissionNetwork,
    pub devices: DeviceRegistry,
}

impl LayoutData {
    /// Place everything in this layout. `file` is only used in errors.
    ///
    /// Fails on the first malformed position or unknown cable tag; nothing
    /// partially built is returned.
    pub fn build(&self, table: &CableTable, file: &Path) -> Result<BuiltNetwork, DataLoadError> {
        let mut graph = TopologyGraph::with_cable_table(table.clone());
        let mut network = TransmissionNetwork::with_cable_table(table.clone());
        let mut devices = DeviceRegistry::new();

        for cable in &self.cables {
            let position = parse_position(&cable.at, file)?;
            if !graph.add_cable(position, &cable.tag) {
                return Err(DataLoadError::UnknownCableTag {
                    file: file.to_path_buf(),
                    tag: cable.tag.clone(),
                    position,
                });
            }
            network.add_cable(position, &cable.tag);
        }

        for consumer in &self.consumers {
            let position = parse_position(&consumer.at, file)?;
            let device = devices.insert(EnergyBuffer::with_energy(consumer.capacity, consumer.stored));
            graph.add_consumer(position, consumer.max_voltage);
            network.register_consumer(position, consumer.max_voltage, consumer.max_input, device);
        }

        for generator in &self.generators {
            let position = parse_position(&generator.at, file)?;
            let device =
                devices.insert(EnergyBuffer::with_energy(generator.capacity, generator.stored));
            graph.add_generator(position, generator.output_voltage);
            network.register_generator(
                position,
                generator.output_voltage,
                generator.packet_size,
                device,
            );
        }

        info!(
            cables = network.cable_count(),
            consumers = network.consumer_count(),
            generators = network.generator_count(),
            "network built"
        );

        Ok(BuiltNetwork {
            graph,
            network,
            devices,
        })
    }
}

impl NetworkData {
    pub fn build(&self) -> Result<BuiltNetwork, DataLoadError> {
        self.layout.build(&self.table, &self.layout_path)
    }
}

/// Load a directory and build it in one step.
pub fn build_from_dir(dir: &Path) -> Result<BuiltNetwork, DataLoadError> {
    load_from_dir(dir)?.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CablePlacement, ConsumerData, GeneratorData};
    use voltaic_core::pos::BlockPos;

    fn layout() -> LayoutData {
        LayoutData {
            cables: vec![CablePlacement {
                at: "0,0,0".into(),
                tag: "copper".into(),
            }],
            consumers: vec![ConsumerData {
                at: "1,0,0".into(),
                max_voltage: 128.0,
                max_input: 32.0,
                capacity: 1000.0,
                stored: 0.0,
            }],
            generators: vec![GeneratorData {
                at: "-1,0,0".into(),
                output_voltage: 32.0,
                packet_size: 32.0,
                capacity: 500.0,
                stored: 200.0,
            }],
        }
    }

    #[test]
    fn builds_both_views() {
        let built = layout()
            .build(&CableTable::standard(), Path::new("layout.ron"))
            .unwrap();

        assert_eq!(built.graph.cable_count(), 1);
        assert_eq!(built.network.cable_count(), 1);
        assert!(built.graph.has_consumer(BlockPos::new(1, 0, 0)));
        assert!(built.graph.has_generator(BlockPos::new(-1, 0, 0)));
        assert_eq!(built.devices.len(), 2);

        let generator = built.network.generator_at(BlockPos::new(-1, 0, 0)).unwrap();
        assert_eq!(built.devices.stored_energy(generator.device), Some(200.0));
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let mut data = layout();
        data.cables[0].tag = "mithril".into();

        let err = data
            .build(&CableTable::standard(), Path::new("layout.ron"))
            .unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::UnknownCableTag { ref tag, position, .. }
                if tag == "mithril" && position == BlockPos::ORIGIN
        ));
    }

    #[test]
    fn bad_position_is_an_error() {
        let mut data = layout();
        data.consumers[0].at = "1;0;0".into();

        let err = data
            .build(&CableTable::standard(), Path::new("layout.ron"))
            .unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidPosition { .. }));
    }

    #[test]
    fn custom_table_limits_tags() {
        let table = CableTable::empty();
        assert!(matches!(
            layout().build(&table, Path::new("layout.ron")),
            Err(DataLoadError::UnknownCableTag { .. })
        ));
    }
}
