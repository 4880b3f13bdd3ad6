//! Dead-time accounting integration tests.
//!
//! The deterministic (non-interleave) mode is checked against a direct
//! reference model over arbitrary ordered timestamp sequences; the
//! interleave mode is driven with scripted draws.

use proptest::prelude::*;

use trigger_core::{
    DeadtimeConfig, LivetimeAccumulator, LivetimeState, ScriptedDraws,
};

const SHORT: f64 = 26.45e-6;
const LONG: f64 = 65.4e-6;

fn flight_accumulator() -> LivetimeAccumulator {
    LivetimeAccumulator::new(DeadtimeConfig::default())
}

#[test]
fn test_flight_deadtime_constants() {
    let config = DeadtimeConfig::default();
    assert_eq!(config.short, SHORT);
    assert_eq!(config.long, LONG);
    assert_eq!(config.deadzone, 2.0e-6);
    assert_eq!(config.clock_hz, 20.0e6);
    assert!(!config.interleave);
}

#[test]
fn test_state_machine_walkthrough() {
    let mut acc = flight_accumulator();
    let mut draws = ScriptedDraws::new();

    // Fresh accumulator is live everywhere.
    assert_eq!(acc.check_state(0.0), LivetimeState::Live);
    assert!(acc.try_register(0.0, false, &mut draws));

    // Immediately after the trigger: deadzone, then busy, then live.
    assert_eq!(acc.check_state(1.0e-6), LivetimeState::Deadzone);
    assert_eq!(acc.check_state(10.0e-6), LivetimeState::Busy);
    assert_eq!(acc.check_state(30.0e-6), LivetimeState::Live);

    // Losses are classified by where in the window they fall.
    assert!(!acc.try_register(1.0e-6, false, &mut draws));
    assert!(!acc.try_register(10.0e-6, false, &mut draws));
    assert_eq!(acc.deadzone_count(), 1);
    assert_eq!(acc.busy_count(), 1);

    assert!(acc.try_register(30.0e-6, false, &mut draws));
    assert_eq!(acc.accepted(), 2);
    assert_eq!(acc.total(), 4);
}

#[test]
fn test_long_readout_stretches_the_window() {
    let mut acc = flight_accumulator();
    let mut draws = ScriptedDraws::new();

    assert!(acc.try_register(0.0, true, &mut draws));
    // 40us: clear of the short window, inside the long one.
    assert_eq!(acc.check_state(40.0e-6), LivetimeState::Busy);
    assert!(!acc.try_register(40.0e-6, false, &mut draws));
    assert!(acc.try_register(70.0e-6, false, &mut draws));
    // The second accept used a short readout, so the window shrank back.
    assert_eq!(acc.check_state(70.0e-6 + 30.0e-6), LivetimeState::Live);
}

#[test]
fn test_livetime_excludes_consumed_window() {
    let mut acc = flight_accumulator();
    let mut draws = ScriptedDraws::new();

    assert!(acc.try_register(0.0, false, &mut draws));
    assert!(acc.try_register(1.0e-3, false, &mut draws));
    assert!(acc.try_register(2.0e-3, true, &mut draws));
    assert!(acc.try_register(3.0e-3, false, &mut draws));

    // Three accepted intervals of 1ms; two charged at the short window,
    // one (following the long-readout accept) at the long window.
    let expected = 3.0e-3 - 2.0 * SHORT - LONG;
    assert!((acc.livetime() - expected).abs() < 1e-12);
    assert!((acc.elapsed() - 3.0e-3).abs() < 1e-12);
}

#[test]
fn test_interleave_run_with_scripted_draws() {
    let config = DeadtimeConfig {
        interleave: true,
        ..DeadtimeConfig::default()
    };
    let mut acc = LivetimeAccumulator::new(config);

    // Three offered triggers: gate pass, gate fail, gate pass.
    let mut draws = ScriptedDraws::new()
        .with_uniforms([0.1, 0.999, 0.1])
        .with_poissons([2]);
    assert!(acc.try_register(0.0, false, &mut draws));
    assert!(!acc.try_register(0.5, false, &mut draws));
    assert!(acc.try_register(1.0, false, &mut draws));

    assert_eq!(acc.invisible_count(), 2);
    let expected = 1.0 - 2.0 * SHORT;
    assert!((acc.livetime() - expected).abs() < 1e-12);
}

proptest! {
    /// Deterministic mode against a reference model: acceptance iff the
    /// gap since the last accepted trigger reaches the dead time, and
    /// livetime equal to the accepted intervals minus the window.
    #[test]
    fn prop_matches_reference_model(
        gaps in prop::collection::vec(1.0e-6f64..100.0e-6, 1..60),
    ) {
        let mut acc = flight_accumulator();
        let mut draws = ScriptedDraws::new();

        let mut t = 0.0f64;
        let mut last_accepted: Option<f64> = None;
        let mut expected_livetime = 0.0f64;
        let mut expected_accepted = 0u64;

        for gap in gaps {
            t += gap;
            let expect = match last_accepted {
                None => true,
                Some(last) => t - last >= SHORT,
            };
            prop_assert_eq!(acc.try_register(t, false, &mut draws), expect);
            if expect {
                if let Some(last) = last_accepted {
                    expected_livetime += t - last - SHORT;
                }
                last_accepted = Some(t);
                expected_accepted += 1;
            }
        }

        prop_assert_eq!(acc.accepted(), expected_accepted);
        prop_assert!((acc.livetime() - expected_livetime).abs() < 1e-9);
    }

    #[test]
    fn prop_ticks_monotonic(mut times in prop::collection::vec(0.0f64..1.0e4, 2..50)) {
        let acc = flight_accumulator();
        times.sort_by(f64::total_cmp);
        let ticks: Vec<u64> = times.iter().map(|&t| acc.ticks(t)).collect();
        for pair in ticks.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        prop_assert_eq!(acc.ticks(0.0), 0);
    }
}
