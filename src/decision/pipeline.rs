//! The trigger-decision pipeline.
//!
//! Per event, in order: fold in the spatial shield veto, reconcile the
//! recomputed condition word against replayed hardware data, offer the
//! trigger to the dead-time state machine, then run the configured
//! prescale strategy. Dead-time and prescale state both depend on event
//! order, so one pipeline instance must see its events in arrival order;
//! share across threads only behind external serialization.

use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::config::TriggerConfig;
use crate::core::{bits, ConditionWord, ConfigError, TriggerRng};
use crate::engine::{build_strategy, DecisionStrategy};
use crate::livetime::LivetimeAccumulator;
use crate::throttle::{RoiResult, ThrottleMap, TileBitmaps};

use super::input::EventInput;
use super::word::{derive_hardware_summary, HardwareSummary, TriggerWord};

/// Why an event was or was not accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerdictStatus {
    /// Accepted; the trigger word is final.
    Accepted,
    /// Rejected by the dead-time state machine.
    RejectedDead,
    /// Offered to the prescale strategy and discarded.
    RejectedPrescale,
}

/// Outcome of one event.
#[derive(Clone, Copy, Debug)]
pub struct Verdict {
    pub status: VerdictStatus,
    /// Packed trigger word (populated for rejected events too, for
    /// diagnostics).
    pub word: TriggerWord,
    /// Priority index of the engine that handled the word.
    pub engine: u8,
    /// Spatial-veto outcome, with the per-tower set.
    pub roi: RoiResult,
    /// Accumulated livetime after this event.
    pub livetime: f64,
    /// Electronics-state record, accepted events only.
    pub summary: Option<HardwareSummary>,
}

impl Verdict {
    /// True if the event was accepted.
    #[must_use]
    pub fn accepted(&self) -> bool {
        self.status == VerdictStatus::Accepted
    }
}

/// Number of replay mismatches logged individually before switching to
/// sampled logging.
const MISMATCH_LOG_LIMIT: u64 = 10;

/// One trigger-decision pipeline instance.
///
/// Owns all per-event mutable state: the strategy's prescale counters,
/// the dead-time accumulators, and the deterministic RNG.
pub struct TriggerDecision {
    config: TriggerConfig,
    strategy: Box<dyn DecisionStrategy + Send>,
    livetime: LivetimeAccumulator,
    throttle: ThrottleMap,
    rng: TriggerRng,
    counts: FxHashMap<u8, u64>,
    accepted_counts: FxHashMap<u8, u64>,
    processed: u64,
    triggered: u64,
    deadtime_rejects: u64,
    mismatches: u64,
}

impl TriggerDecision {
    /// Build a pipeline from a validated configuration. Any
    /// configuration defect is fatal here; event processing itself has
    /// no error path.
    pub fn new(config: TriggerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let strategy = build_strategy(&config, Vec::new())?;
        let livetime = LivetimeAccumulator::new(config.deadtime);
        let throttle = ThrottleMap::new(config.roi_coverage);
        let rng = TriggerRng::new(config.rng_seed);
        Ok(Self {
            config,
            strategy,
            livetime,
            throttle,
            rng,
            counts: FxHashMap::default(),
            accepted_counts: FxHashMap::default(),
            processed: 0,
            triggered: 0,
            deadtime_rejects: 0,
            mismatches: 0,
        })
    }

    /// Swap in a new configuration. A key equal to the current one is a
    /// no-op; otherwise prescale state resets and the dispatch tables
    /// are rebuilt. The livetime accumulators deliberately survive the
    /// swap.
    pub fn set_config(&mut self, config: TriggerConfig) -> Result<(), ConfigError> {
        if config.key == self.config.key {
            return Ok(());
        }
        config.validate()?;
        info!(
            "trigger configuration changed, key {} -> {}",
            self.config.key, config.key
        );
        if config.strategy == self.config.strategy {
            self.strategy.on_config_change(&config)?;
        } else {
            self.strategy = build_strategy(&config, Vec::new())?;
        }
        self.throttle = ThrottleMap::new(config.roi_coverage);
        self.config = config;
        Ok(())
    }

    /// Process one event and produce its verdict. Events must arrive in
    /// non-decreasing timestamp order.
    pub fn process(&mut self, event: &EventInput) -> Verdict {
        let mut condition = event.condition;

        // Spatial veto first, so the ROI bit feeds the engine match.
        let tiles = TileBitmaps::from_tiles(&event.tiles);
        let roi = self.throttle.roi(event.triggered_towers, &tiles);
        if roi.throttled {
            condition = condition.with(bits::ROI);
        }

        // Replayed hardware data is authoritative; a disagreement with
        // the recomputed word is a diagnostic, never fatal.
        let derived = derive_hardware_summary(condition);
        let hardware = match event.replay_summary {
            Some(replayed) => {
                if replayed != derived {
                    self.note_mismatch(replayed, derived);
                }
                replayed
            }
            None => derived,
        };
        let decision_word =
            ConditionWord::new((condition.raw() & bits::RESERVED_MASK) | hardware);

        self.processed += 1;
        *self.counts.entry(condition.raw()).or_default() += 1;

        let engine = self.strategy.engine_number(decision_word) as u8;
        let four_range = self.strategy.four_range(decision_word);

        // Capture the saturating tick deltas before this trigger moves
        // the reference points.
        let delta_event_ticks = self.livetime.delta_event_ticks(event.time);
        let delta_window_ticks = self.livetime.delta_window_ticks(event.time);
        if condition.intersects(self.config.window_open_mask) {
            self.livetime.note_window_open(event.time);
        }

        let word = TriggerWord::pack(condition, hardware, engine);

        if !self.livetime.try_register(event.time, four_range, &mut self.rng) {
            self.deadtime_rejects += 1;
            return Verdict {
                status: VerdictStatus::RejectedDead,
                word,
                engine,
                roi,
                livetime: self.livetime.livetime(),
                summary: None,
            };
        }

        if !self.strategy.decide(decision_word) {
            return Verdict {
                status: VerdictStatus::RejectedPrescale,
                word,
                engine,
                roi,
                livetime: self.livetime.livetime(),
                summary: None,
            };
        }

        self.triggered += 1;
        *self.accepted_counts.entry(condition.raw()).or_default() += 1;

        Verdict {
            status: VerdictStatus::Accepted,
            word,
            engine,
            roi,
            livetime: self.livetime.livetime(),
            summary: Some(HardwareSummary {
                condition_summary: hardware,
                delta_event_ticks,
                delta_window_ticks,
                busy_count: self.livetime.busy_count(),
                deadzone_count: self.livetime.deadzone_count(),
            }),
        }
    }

    fn note_mismatch(&mut self, replayed: u8, derived: u8) {
        self.mismatches += 1;
        if self.mismatches <= MISMATCH_LOG_LIMIT || self.mismatches % 1000 == 0 {
            warn!(
                "replayed condition summary {replayed:#04x} disagrees with \
                 recomputed {derived:#04x} ({} so far)",
                self.mismatches
            );
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// The dead-time state machine.
    #[must_use]
    pub fn livetime(&self) -> &LivetimeAccumulator {
        &self.livetime
    }

    /// Events processed.
    #[must_use]
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Events accepted.
    #[must_use]
    pub fn triggered(&self) -> u64 {
        self.triggered
    }

    /// Events rejected by dead time.
    #[must_use]
    pub fn deadtime_rejects(&self) -> u64 {
        self.deadtime_rejects
    }

    /// Replay mismatches seen.
    #[must_use]
    pub fn mismatches(&self) -> u64 {
        self.mismatches
    }

    /// Per-bit assertion counts over all processed events.
    #[must_use]
    pub fn bit_frequencies(&self) -> [u64; 8] {
        Self::tally(&self.counts)
    }

    /// Per-bit assertion counts over accepted events.
    #[must_use]
    pub fn accepted_bit_frequencies(&self) -> [u64; 8] {
        Self::tally(&self.accepted_counts)
    }

    fn tally(counts: &FxHashMap<u8, u64>) -> [u64; 8] {
        let mut totals = [0u64; 8];
        for (&word, &n) in counts {
            for (bit, total) in totals.iter_mut().enumerate() {
                if word & (1 << bit) != 0 {
                    *total += n;
                }
            }
        }
        totals
    }

    /// Bit-frequency table as text, one row per condition-word value.
    #[must_use]
    pub fn report(&self, label: &str) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        let _ = writeln!(out, "bit frequency: {label}");
        let _ = write!(out, "{:>12}{:>8}", "value", "count");
        for bit in (0..8).rev() {
            let _ = write!(out, "{:>8}", ConditionWord::bit_name(bit));
        }
        let _ = writeln!(out);

        let mut words: Vec<_> = self.counts.iter().collect();
        words.sort();
        for (&word, &n) in words {
            let _ = write!(out, "{:>12}{:>8}", word, n);
            for bit in (0..8).rev() {
                let m = if word & (1 << bit) != 0 { n } else { 0 };
                let _ = write!(out, "{m:>8}");
            }
            let _ = writeln!(out);
        }

        let totals = self.bit_frequencies();
        let _ = write!(out, "{:>12}{:>8}", "tot:", self.processed);
        for bit in (0..8).rev() {
            let _ = write!(out, "{:>8}", totals[bit as usize]);
        }
        let _ = writeln!(out);
        out
    }

    /// Emit the end-of-run statistics through the logger.
    pub fn log_summary(&self) {
        info!(
            "processed {} events, accepted {}, {} rejected by deadtime, livetime {:.6}s",
            self.processed,
            self.triggered,
            self.deadtime_rejects,
            self.livetime.livetime()
        );
        info!("{}", self.report("all events"));
        if self.mismatches > 0 {
            info!("{} replay mismatches", self.mismatches);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TowerSet;
    use crate::throttle::{ShieldFace, TileId};

    fn pipeline() -> TriggerDecision {
        TriggerDecision::new(TriggerConfig::default_flight()).unwrap()
    }

    fn physics_event(time: f64, mask: u8) -> EventInput {
        EventInput::new(time).with_condition(ConditionWord::new(mask))
    }

    #[test]
    fn test_accepts_open_engine() {
        let mut pipeline = pipeline();
        let verdict = pipeline.process(&physics_event(
            0.0,
            bits::ROI | bits::TRACK | bits::CAL_LO,
        ));
        assert!(verdict.accepted());
        assert_eq!(verdict.engine, 8);
        assert_eq!(verdict.word.condition().raw(), 0b0000_0111);
        assert_eq!(verdict.word.hardware(), 0b0000_0111);
        assert_eq!(pipeline.triggered(), 1);
    }

    #[test]
    fn test_rejects_disabled_engine() {
        let mut pipeline = pipeline();
        let verdict = pipeline.process(&physics_event(0.0, bits::CAL_LO));
        assert_eq!(verdict.status, VerdictStatus::RejectedPrescale);
        assert_eq!(verdict.engine, 11);
        assert_eq!(pipeline.triggered(), 0);
    }

    #[test]
    fn test_deadtime_rejection() {
        let mut pipeline = pipeline();
        let mask = bits::ROI | bits::TRACK | bits::CAL_LO;
        assert!(pipeline.process(&physics_event(0.0, mask)).accepted());
        let verdict = pipeline.process(&physics_event(10.0e-6, mask));
        assert_eq!(verdict.status, VerdictStatus::RejectedDead);
        assert_eq!(pipeline.deadtime_rejects(), 1);
        assert!(pipeline.process(&physics_event(30.0e-6, mask)).accepted());
        assert!((pipeline.livetime().livetime() - 3.55e-6).abs() < 1e-12);
    }

    #[test]
    fn test_roi_bit_folds_into_decision() {
        let mut pipeline = pipeline();
        // Tracker trigger in tower 0 next to a struck tile: the ROI bit
        // turns TKR-without-ROI (engine 7) into TKR+ROI (engine 10).
        let event = EventInput::new(0.0)
            .with_condition(ConditionWord::new(bits::TRACK))
            .with_towers(TowerSet::from_mask(1))
            .with_tile(TileId::new(ShieldFace::Top, 0, 0));
        let verdict = pipeline.process(&event);
        assert!(verdict.roi.throttled);
        assert_eq!(verdict.engine, 10);
        assert!(verdict.word.condition().has(bits::ROI));
    }

    #[test]
    fn test_replay_summary_is_authoritative() {
        let mut pipeline = pipeline();
        // Recomputed word says pure CAL-LO (vetoed engine); hardware
        // says CAL-HI. The hardware word drives the decision.
        let event = physics_event(0.0, bits::CAL_LO).with_replay_summary(bits::CAL_HI);
        let verdict = pipeline.process(&event);
        assert!(verdict.accepted());
        assert_eq!(verdict.engine, 6);
        assert_eq!(verdict.word.hardware(), bits::CAL_HI);
        assert_eq!(pipeline.mismatches(), 1);
    }

    #[test]
    fn test_agreeing_replay_is_not_a_mismatch() {
        let mut pipeline = pipeline();
        let mask = bits::ROI | bits::TRACK | bits::CAL_LO;
        let event = physics_event(0.0, mask).with_replay_summary(mask);
        assert!(pipeline.process(&event).accepted());
        assert_eq!(pipeline.mismatches(), 0);
    }

    #[test]
    fn test_empty_event_hits_catch_all() {
        let mut pipeline = pipeline();
        // No subsystem input at all: engine 9, prescale 0, accepted.
        let verdict = pipeline.process(&EventInput::new(0.0));
        assert!(verdict.accepted());
        assert_eq!(verdict.engine, 9);
    }

    #[test]
    fn test_summary_deltas() {
        let mut pipeline = pipeline();
        let mask = bits::ROI | bits::TRACK | bits::CAL_LO;
        let first = pipeline.process(&physics_event(0.0, mask));
        let summary = first.summary.unwrap();
        assert_eq!(summary.delta_event_ticks, u16::MAX);

        let second = pipeline.process(&physics_event(100.0e-6, mask));
        let summary = second.summary.unwrap();
        assert_eq!(summary.delta_event_ticks, 2000);
        assert_eq!(summary.delta_window_ticks, 2000);
    }

    #[test]
    fn test_config_swap_resets_prescales_only() {
        let mut pipeline = pipeline();
        let mask = bits::ROI | bits::TRACK | bits::CAL_LO;
        assert!(pipeline.process(&physics_event(0.0, mask)).accepted());

        let swapped = TriggerConfig::default_flight().with_key(1);
        pipeline.set_config(swapped).unwrap();
        assert_eq!(pipeline.config().key, 1);
        // Livetime state survived: still inside the dead-time window.
        let verdict = pipeline.process(&physics_event(5.0e-6, mask));
        assert_eq!(verdict.status, VerdictStatus::RejectedDead);
    }

    #[test]
    fn test_config_swap_same_key_is_noop() {
        let mut pipeline = pipeline();
        let same = TriggerConfig::default_flight();
        pipeline.set_config(same).unwrap();
        assert_eq!(pipeline.config().key, 0);
    }

    #[test]
    fn test_bit_frequencies() {
        let mut pipeline = pipeline();
        let mask = bits::ROI | bits::TRACK | bits::CAL_LO;
        for i in 0..3 {
            pipeline.process(&physics_event(i as f64, mask));
        }
        pipeline.process(&physics_event(10.0, bits::CAL_HI));

        let totals = pipeline.bit_frequencies();
        assert_eq!(totals[0], 3);
        assert_eq!(totals[1], 3);
        assert_eq!(totals[2], 3);
        assert_eq!(totals[3], 1);
        assert_eq!(totals[4], 0);

        let report = pipeline.report("all events");
        assert!(report.contains("CALHI"));
        assert!(report.contains("tot:"));
    }
}
