//! Property-based tests for the packet formulas and position keys.
//!
//! Uses proptest to generate random energies, losses, voltages and
//! coordinates, then verify the closed-form contracts hold.

use proptest::prelude::*;
use voltaic_core::device::{EnergyBuffer, EnergyDevice};
use voltaic_core::packet::*;
use voltaic_core::pos::BlockPos;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_energy() -> impl Strategy<Value = f64> {
    0.0..100_000.0f64
}

fn arb_loss() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(0.025), Just(0.2), Just(0.4), Just(0.8), 0.0..5.0f64]
}

fn arb_voltage() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(32.0),
        Just(128.0),
        Just(512.0),
        Just(2048.0),
        Just(8192.0),
        0.0..10_000.0f64
    ]
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// delivered == max(0, start - loss * distance)
    #[test]
    fn loss_formula_closed_form(start in arb_energy(), loss in arb_loss(), distance in 0u32..64) {
        let delivered = apply_loss(start, loss, distance);
        prop_assert_eq!(delivered, (start - loss * distance as f64).max(0.0));
        prop_assert!(delivered >= 0.0);
        prop_assert!(delivered <= start);
    }

    /// No distance or no loss means nothing is lost.
    #[test]
    fn lossless_edges(start in arb_energy(), loss in arb_loss(), distance in 0u32..64) {
        prop_assert_eq!(apply_loss(start, loss, 0), start);
        prop_assert_eq!(apply_loss(start, 0.0, distance), start);
    }

    /// should_explode is exactly strict greater-than.
    #[test]
    fn overvoltage_is_strict(voltage in arb_voltage(), max in arb_voltage()) {
        prop_assert_eq!(should_explode(voltage, max), voltage > max);
    }

    /// force == voltage / 20, bit for bit.
    #[test]
    fn explosion_force_exact(voltage in arb_voltage()) {
        prop_assert_eq!(explosion_force(voltage), voltage / 20.0);
        let result = PacketResult::exploded(BlockPos::ORIGIN, 1, voltage);
        prop_assert_eq!(result.explosion_force, Some(voltage / 20.0));
    }

    /// Flooring then keying then parsing recovers the floored integers.
    #[test]
    fn position_key_round_trip(x in -1.0e6..1.0e6f64, y in -512.0..512.0f64, z in -1.0e6..1.0e6f64) {
        let pos = BlockPos::from_world(x, y, z);
        prop_assert_eq!(pos.x, x.floor() as i32);
        prop_assert_eq!(BlockPos::parse_key(&pos.key()).unwrap(), pos);
    }

    /// A buffer never leaves [0, capacity] and reports exactly what moved.
    #[test]
    fn buffer_stays_in_bounds(
        capacity in 0.0..10_000.0f64,
        ops in proptest::collection::vec((any::<bool>(), 0.0..5_000.0f64), 1..40),
    ) {
        let mut buf = EnergyBuffer::new(capacity);
        for (add, amount) in ops {
            let before = buf.stored_energy();
            if add {
                let added = buf.add_energy(amount);
                prop_assert!(added <= amount);
                prop_assert_eq!(buf.stored_energy(), before + added);
            } else {
                let removed = buf.remove_energy(amount);
                prop_assert!(removed <= amount);
                prop_assert_eq!(buf.stored_energy(), before - removed);
            }
            prop_assert!(buf.stored_energy() >= 0.0);
            prop_assert!(buf.stored_energy() <= capacity + 1e-9);
        }
    }
}
