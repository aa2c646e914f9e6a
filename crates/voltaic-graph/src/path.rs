//! Route descriptions produced by the topology search.

use serde::{Deserialize, Serialize};
use voltaic_core::pos::BlockPos;

/// One reachable consumer and what it costs to get there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    /// The consumer at the end of the route.
    pub target: BlockPos,
    /// Grid steps: every cable segment plus the final step into the consumer.
    pub distance: u32,
    /// Sum of the loss-per-block of every cable on the route.
    pub cumulative_loss: f64,
    /// Lowest voltage ceiling on the route, including the consumer's own.
    ///
    /// The source generator's output voltage is not folded in, so a route
    /// stays the same whatever generator uses it. Compare the output with
    /// [`can_carry`](Self::can_carry) before sending.
    pub bottleneck_voltage: f64,
    /// Every block from the source to `target`, both inclusive.
    pub path: Vec<BlockPos>,
}

impl PathResult {
    /// The position the search started from.
    pub fn source(&self) -> BlockPos {
        self.path.first().copied().unwrap_or(self.target)
    }

    /// Cable segments between the source and the consumer.
    pub fn cables(&self) -> &[BlockPos] {
        match self.path.len() {
            0..=2 => &[],
            n => &self.path[1..n - 1],
        }
    }

    pub fn cable_count(&self) -> usize {
        self.cables().len()
    }

    /// Whether a packet at `voltage` crosses the whole route intact.
    pub fn can_carry(&self, voltage: f64) -> bool {
        voltage <= self.bottleneck_voltage
    }

    /// EU that reaches the consumer when `amount` is sent down this route.
    pub fn energy_after_loss(&self, amount: f64) -> f64 {
        (amount - self.cumulative_loss).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PathResult {
        PathResult {
            target: BlockPos::new(3, 0, 0),
            distance: 3,
            cumulative_loss: 0.4,
            bottleneck_voltage: 128.0,
            path: vec![
                BlockPos::new(0, 0, 0),
                BlockPos::new(1, 0, 0),
                BlockPos::new(2, 0, 0),
                BlockPos::new(3, 0, 0),
            ],
        }
    }

    #[test]
    fn source_and_cables() {
        let p = sample();
        assert_eq!(p.source(), BlockPos::ORIGIN);
        assert_eq!(p.cables(), &[BlockPos::new(1, 0, 0), BlockPos::new(2, 0, 0)]);
        assert_eq!(p.cable_count(), 2);
    }

    #[test]
    fn direct_route_has_no_cables() {
        let p = PathResult {
            target: BlockPos::new(1, 0, 0),
            distance: 1,
            cumulative_loss: 0.0,
            bottleneck_voltage: 32.0,
            path: vec![BlockPos::ORIGIN, BlockPos::new(1, 0, 0)],
        };
        assert!(p.cables().is_empty());
        assert_eq!(p.energy_after_loss(32.0), 32.0);
    }

    #[test]
    fn carry_and_loss() {
        let p = sample();
        assert!(p.can_carry(128.0));
        assert!(!p.can_carry(129.0));
        assert_eq!(p.energy_after_loss(10.0), 9.6);
        assert_eq!(p.energy_after_loss(0.1), 0.0);
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["distance"], 3);
        assert_eq!(json["target"]["x"], 3);
        assert_eq!(json["path"].as_array().unwrap().len(), 4);
    }
}
