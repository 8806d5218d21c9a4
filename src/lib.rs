//! Bomb Catcher - a falling-bomb arcade round
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, physics, collisions, round state)
//! - `game`: Session driver (lifecycle commands, frame clock, feedback dispatch)
//! - `settings`: Data-driven tuning loaded from JSON
//!
//! The playfield is measured in percent: `x` runs 0..100 left to right,
//! `y` runs 0..100 top to bottom.

pub mod game;
pub mod settings;
pub mod sim;

pub use game::{FeedbackError, FeedbackListener, Game};
pub use settings::{RulesPreset, Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Simulation rate (ticks per second)
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Countdown cadence in seconds
    pub const COUNTDOWN_INTERVAL: f32 = 1.0;
    /// Longest frame the clock will account for (longer frames are truncated)
    pub const MAX_FRAME_DT: f32 = 0.25;
    /// Maximum simulation substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Upper bound for a configured substep cap
    pub const SUBSTEP_LIMIT: u32 = 240;
    /// Countdown ticks allowed out of one frame
    pub const MAX_COUNTDOWNS_PER_FRAME: u32 = 4;

    /// Round rules
    pub const STARTING_LIVES: u32 = 3;
    pub const ROUND_DURATION_SECS: u32 = 30;
    pub const LIFE_COST_PER_MISS: u32 = 1;
    pub const POINTS_PER_CATCH: u64 = 1;

    /// Chance per simulation tick that a bomb spawns
    pub const SPAWN_CHANCE: f32 = 0.05;
    /// Horizontal spawn range - kept off the edges so every bomb is reachable
    pub const SPAWN_MIN_X: f32 = 10.0;
    pub const SPAWN_MAX_X: f32 = 90.0;

    /// Base fall speed (percent of playfield height per tick)
    pub const BASE_FALL_SPEED: f32 = 0.4;
    /// Fall speed jitter: speed = base * (MIN + random * SPAN), i.e. +/-20%
    pub const FALL_SPEED_JITTER_MIN: f32 = 0.8;
    pub const FALL_SPEED_JITTER_SPAN: f32 = 0.4;

    /// Catcher sprite half width (percent of playfield width)
    pub const CATCHER_HALF_WIDTH: f32 = 8.0;
    /// Fraction of the sprite width that actually catches
    pub const CATCH_WIDTH_FRACTION: f32 = 0.8;
    /// Gap between the catcher's bottom edge and the bottom of the playfield
    pub const CATCHER_BOTTOM_OFFSET: f32 = 8.0;
    /// Catcher sprite height (percent of playfield height)
    pub const CATCHER_HEIGHT: f32 = 8.0;
    /// Fraction of the sprite height, from its top edge, that actually catches
    pub const CATCH_HEIGHT_FRACTION: f32 = 0.5;
    /// Catcher position at round start
    pub const CATCHER_START_POSITION: f32 = 50.0;
}

/// Clamp a playfield coordinate to [0, 100]. NaN maps to the centre.
#[inline]
pub fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        return consts::CATCHER_START_POSITION;
    }
    value.clamp(0.0, 100.0)
}
