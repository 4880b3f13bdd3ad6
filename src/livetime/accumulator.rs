//! Dead-time and live-time accounting.
//!
//! After every accepted trigger the electronics are unable to accept
//! another for a fixed window: a short "deadzone" immediately after the
//! trigger, then a busy period whose length depends on whether the
//! accepted event required the long (four-range) readout. The
//! accumulator tracks that window, the running live and elapsed time,
//! and converts timestamps to elapsed-clock ticks.
//!
//! Two modes:
//! - **non-interleave**: fully deterministic; used when replaying data
//!   the hardware already triggered on.
//! - **interleave**: models invisible background triggers statistically,
//!   gating acceptance on an efficiency draw and charging livetime for a
//!   Poisson-distributed count of unseen triggers.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::DeadtimeConfig;
use crate::core::DeadtimeDraws;

/// Phase of the post-trigger window at a given time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LivetimeState {
    /// Ready to accept a trigger.
    Live,
    /// Inside the short settling window right after a trigger.
    Deadzone,
    /// Past the deadzone but still inside the dead-time window.
    Busy,
}

/// Running dead-time state machine and live/elapsed-time accumulators.
///
/// Timestamps are seconds and must be fed in non-decreasing order;
/// prescale and dead-time state both depend on event order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LivetimeAccumulator {
    deadtime: DeadtimeConfig,
    /// 1 − short-deadtime × background rate; interleave acceptance gate.
    efficiency: f64,
    /// Dead-time window the *next* event sees; set by the readout length
    /// of the last accepted trigger.
    current_window: f64,
    last_trigger: Option<f64>,
    last_window_open: Option<f64>,
    livetime: f64,
    elapsed: f64,
    accepted: u64,
    total: u64,
    busy: u64,
    deadzone: u64,
    /// Interleave mode: background triggers charged but never seen.
    invisible: u64,
}

impl LivetimeAccumulator {
    /// Create from a deadtime configuration.
    #[must_use]
    pub fn new(deadtime: DeadtimeConfig) -> Self {
        Self {
            deadtime,
            efficiency: 1.0 - deadtime.short * deadtime.background_rate,
            current_window: deadtime.short,
            last_trigger: None,
            last_window_open: None,
            livetime: 0.0,
            elapsed: 0.0,
            accepted: 0,
            total: 0,
            busy: 0,
            deadzone: 0,
            invisible: 0,
        }
    }

    /// True iff a trigger at `t` would be accepted. With dead-time
    /// disabled (window ≤ 0) always true; in interleave mode the window
    /// check is followed by a uniform draw against the efficiency.
    pub fn is_live(&self, t: f64, draws: &mut dyn DeadtimeDraws) -> bool {
        if self.deadtime.short <= 0.0 {
            return true;
        }
        let window_clear = match self.last_trigger {
            None => true,
            Some(last) => t - last >= self.current_window,
        };
        if !window_clear {
            return false;
        }
        if self.deadtime.interleave {
            draws.uniform() < self.efficiency
        } else {
            true
        }
    }

    /// Phase of the post-trigger window at `t`.
    #[must_use]
    pub fn check_state(&self, t: f64) -> LivetimeState {
        let Some(last) = self.last_trigger else {
            return LivetimeState::Live;
        };
        let dt = t - last;
        if dt <= self.deadtime.deadzone {
            LivetimeState::Deadzone
        } else if dt <= self.current_window {
            LivetimeState::Busy
        } else {
            LivetimeState::Live
        }
    }

    /// Offer a trigger at `t`. On acceptance, charge the elapsed
    /// interval minus the consumed dead time to the livetime, advance
    /// the accumulators, and arm the window the next event will see
    /// (`long_readout` selects the four-range window). Returns whether
    /// the trigger was accepted.
    pub fn try_register(
        &mut self,
        t: f64,
        long_readout: bool,
        draws: &mut dyn DeadtimeDraws,
    ) -> bool {
        self.total += 1;
        if !self.is_live(t, draws) {
            match self.check_state(t) {
                LivetimeState::Deadzone => self.deadzone += 1,
                _ => self.busy += 1,
            }
            return false;
        }

        if let Some(last) = self.last_trigger {
            let interval = t - last;
            self.elapsed += interval;
            if self.deadtime.interleave {
                let unseen = draws.poisson(interval * self.deadtime.background_rate);
                self.invisible += unseen;
                self.livetime += interval - unseen as f64 * self.current_window;
            } else {
                self.livetime += interval - self.current_window;
            }
        } else {
            debug!("first trigger at t={t:.6e}s, no livetime charged");
        }

        self.last_trigger = Some(t);
        self.current_window = if long_readout {
            self.deadtime.long
        } else {
            self.deadtime.short
        };
        self.accepted += 1;
        true
    }

    /// Record the readout-window-open time for an event whose condition
    /// word asserts a window-opening bit.
    pub fn note_window_open(&mut self, t: f64) {
        self.last_window_open = Some(t);
    }

    /// Hot-update the background trigger rate, recomputing the
    /// interleave efficiency. Returns the previous rate.
    pub fn set_trigger_rate(&mut self, rate: f64) -> f64 {
        let previous = self.deadtime.background_rate;
        self.deadtime.background_rate = rate;
        self.efficiency = 1.0 - self.deadtime.short * rate;
        previous
    }

    /// Timestamp in elapsed-clock ticks (default 20 MHz). Negative times
    /// clamp to zero.
    #[must_use]
    pub fn ticks(&self, t: f64) -> u64 {
        if t <= 0.0 {
            0
        } else {
            (t * self.deadtime.clock_hz).floor() as u64
        }
    }

    /// Ticks since the last accepted trigger, saturated to 16 bits;
    /// `0xffff` when no trigger has been accepted.
    #[must_use]
    pub fn delta_event_ticks(&self, t: f64) -> u16 {
        self.delta_ticks(self.last_trigger, t)
    }

    /// Ticks since the last window-open time, saturated to 16 bits;
    /// `0xffff` when no window has opened.
    #[must_use]
    pub fn delta_window_ticks(&self, t: f64) -> u16 {
        self.delta_ticks(self.last_window_open, t)
    }

    fn delta_ticks(&self, since: Option<f64>, t: f64) -> u16 {
        match since {
            None => u16::MAX,
            Some(s) => {
                let ticks = self.ticks(t).saturating_sub(self.ticks(s));
                u16::try_from(ticks).unwrap_or(u16::MAX)
            }
        }
    }

    /// Accumulated time the instrument could accept triggers.
    #[must_use]
    pub fn livetime(&self) -> f64 {
        self.livetime
    }

    /// Accumulated elapsed time between accepted triggers.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Interleave acceptance efficiency.
    #[must_use]
    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    /// Dead-time window the next event will see.
    #[must_use]
    pub fn current_window(&self) -> f64 {
        self.current_window
    }

    /// Timestamp of the last accepted trigger.
    #[must_use]
    pub fn last_trigger(&self) -> Option<f64> {
        self.last_trigger
    }

    /// Accepted-trigger count.
    #[must_use]
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Offered-trigger count (accepted plus rejected).
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Triggers rejected while busy.
    #[must_use]
    pub fn busy_count(&self) -> u64 {
        self.busy
    }

    /// Triggers lost in the deadzone.
    #[must_use]
    pub fn deadzone_count(&self) -> u64 {
        self.deadzone
    }

    /// Invisible background triggers charged in interleave mode.
    #[must_use]
    pub fn invisible_count(&self) -> u64 {
        self.invisible
    }
}
