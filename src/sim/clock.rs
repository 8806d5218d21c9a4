//! Round clock
//!
//! One frame-driven clock feeding two logical cadences: the fixed-rate
//! simulation step and the 1 Hz countdown. Each cadence keeps its own
//! accumulator, so the order of events inside a frame is fully determined
//! by elapsed time.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Slack when comparing accumulated time against a period
const EPSILON: f64 = 1e-9;

/// Clock rates and frame limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockTuning {
    /// Simulation steps per second
    pub sim_hz: u32,
    /// Seconds between countdown ticks
    pub countdown_interval: f32,
    /// Longest frame accounted for
    pub max_frame_dt: f32,
    /// Simulation steps allowed per frame
    pub max_substeps: u32,
}

impl Default for ClockTuning {
    fn default() -> Self {
        Self {
            sim_hz: SIM_HZ,
            countdown_interval: COUNTDOWN_INTERVAL,
            max_frame_dt: MAX_FRAME_DT,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

impl ClockTuning {
    pub fn sim_dt(&self) -> f64 {
        1.0 / f64::from(self.sim_hz.max(1))
    }

    /// Rates and caps the clock can always run with: at least one step per
    /// frame, no more than `SUBSTEP_LIMIT`, a finite positive frame cap and a
    /// countdown no faster than the simulation step.
    pub fn sanitized(self) -> Self {
        let sim_hz = self.sim_hz.max(1);
        let sim_dt = 1.0 / sim_hz as f32;
        let countdown_interval = if self.countdown_interval.is_finite() {
            self.countdown_interval.max(sim_dt)
        } else {
            COUNTDOWN_INTERVAL
        };
        let max_frame_dt = if self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0 {
            self.max_frame_dt
        } else {
            MAX_FRAME_DT
        };
        Self {
            sim_hz,
            countdown_interval,
            max_frame_dt,
            max_substeps: self.max_substeps.clamp(1, SUBSTEP_LIMIT),
        }
    }
}

/// A cadence that fell due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// One-second countdown tick
    Countdown,
    /// One fixed simulation step
    Simulation,
}

/// Accumulator clock. Stopped clocks produce nothing.
#[derive(Debug, Clone)]
pub struct RoundClock {
    tuning: ClockTuning,
    sim_acc: f64,
    countdown_acc: f64,
    running: bool,
    /// Simulation steps dropped by the substep cap
    dropped_steps: u64,
}

impl Default for RoundClock {
    fn default() -> Self {
        Self::new(ClockTuning::default())
    }
}

impl RoundClock {
    /// Out-of-range tuning is pulled back to something the clock can run
    pub fn new(tuning: ClockTuning) -> Self {
        Self {
            tuning: tuning.sanitized(),
            sim_acc: 0.0,
            countdown_acc: 0.0,
            running: false,
            dropped_steps: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn dropped_steps(&self) -> u64 {
        self.dropped_steps
    }

    /// Start both cadences from zero
    pub fn start(&mut self) {
        self.sim_acc = 0.0;
        self.countdown_acc = 0.0;
        self.running = true;
    }

    /// Halt both cadences and discard any partially accumulated time
    pub fn stop(&mut self) {
        self.sim_acc = 0.0;
        self.countdown_acc = 0.0;
        self.running = false;
    }

    /// Account for `frame_dt` seconds and return the cadences that fell due,
    /// oldest first. On a tie the countdown comes first.
    ///
    /// At most `max_substeps` simulation steps and `MAX_COUNTDOWNS_PER_FRAME`
    /// countdowns come out of one frame; time past either cap is dropped.
    pub fn advance(&mut self, frame_dt: f32) -> Vec<Cadence> {
        let mut due = Vec::new();
        if !self.running {
            return due;
        }

        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, self.tuning.max_frame_dt)
        } else {
            0.0
        };
        let sim_dt = self.tuning.sim_dt();
        let interval = f64::from(self.tuning.countdown_interval);

        let mut remaining = f64::from(frame_dt);
        let mut substeps = 0;
        let mut countdowns = 0;
        loop {
            let to_countdown = if countdowns < MAX_COUNTDOWNS_PER_FRAME {
                (interval - self.countdown_acc).max(0.0)
            } else {
                f64::INFINITY
            };
            let to_sim = if substeps < self.tuning.max_substeps {
                (sim_dt - self.sim_acc).max(0.0)
            } else {
                f64::INFINITY
            };
            let next = to_countdown.min(to_sim);
            if next > remaining + EPSILON {
                break;
            }

            remaining = (remaining - next).max(0.0);
            self.countdown_acc += next;
            self.sim_acc += next;

            if countdowns < MAX_COUNTDOWNS_PER_FRAME && self.countdown_acc + EPSILON >= interval {
                self.countdown_acc = (self.countdown_acc - interval).max(0.0);
                due.push(Cadence::Countdown);
                countdowns += 1;
            }
            if substeps < self.tuning.max_substeps && self.sim_acc + EPSILON >= sim_dt {
                self.sim_acc = (self.sim_acc - sim_dt).max(0.0);
                due.push(Cadence::Simulation);
                substeps += 1;
            }
        }

        self.countdown_acc += remaining;
        self.sim_acc += remaining;

        if self.sim_acc + EPSILON >= sim_dt {
            let dropped = (self.sim_acc / sim_dt).floor().max(1.0);
            self.sim_acc = (self.sim_acc - dropped * sim_dt).max(0.0);
            self.dropped_steps = self.dropped_steps.saturating_add(dropped as u64);
            log::warn!(
                "Dropped {} simulation steps (substep cap {})",
                dropped,
                self.tuning.max_substeps
            );
        }
        if self.countdown_acc > interval {
            // Due again at the start of the next frame
            self.countdown_acc = interval;
            log::warn!("Countdown fell behind (cap {} per frame)", MAX_COUNTDOWNS_PER_FRAME);
        }
        due
    }
}
